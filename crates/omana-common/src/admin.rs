//! Administrative hierarchy: regions, sectors and zones (blocks).
//!
//! Zones are static configuration. They are rectangles in the planar
//! coordinate space used by the grid locator and never change at runtime.

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, OmanaError, OmanaResult};

/// Sector letters the local address schema can encode.
pub const LOCAL_SECTOR_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// A wilayat within a governorate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Three-letter governorate code (e.g. "MSC")
    pub code: String,
    /// Wilayat display name
    pub name: String,
    /// Governorate display name
    pub governorate: String,
    /// Two-digit wilayat index within the governorate
    pub wilayat_number: u32,
}

/// A lettered sector inside a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub code: String,
    /// Local address schema letter, one of A, B, C or D
    pub letter: char,
    pub name: String,
    /// Code of the owning region
    pub region: String,
    /// Numeric sector index used by the national schema
    #[serde(default = "default_sector_number")]
    pub number: u32,
    /// Street names houses in this sector are assigned from
    #[serde(default)]
    pub streets: Vec<String>,
}

fn default_sector_number() -> u32 {
    1
}

/// A rectangular block used as the unit of plot numbering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub code: String,
    pub name: String,
    /// Code of the owning sector
    pub sector: String,
    /// Numeric block index used by the national schema
    #[serde(default = "default_block_number")]
    pub number: u32,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

fn default_block_number() -> u32 {
    1
}

impl Zone {
    /// Inclusive containment on all four edges.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.start_x <= x && x <= self.end_x && self.start_y <= y && y <= self.end_y
    }

    pub fn width(&self) -> f64 {
        self.end_x - self.start_x
    }

    pub fn height(&self) -> f64 {
        self.end_y - self.start_y
    }

    pub fn rect(&self) -> BoundingBox {
        BoundingBox::new(self.start_x, self.start_y, self.end_x, self.end_y)
    }
}

/// The full region → sector → zone configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminLayout {
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub sectors: Vec<Sector>,
    #[serde(default)]
    pub zones: Vec<Zone>,
}

impl AdminLayout {
    pub fn region(&self, code: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.code == code)
    }

    pub fn sector(&self, code: &str) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.code == code)
    }

    pub fn sector_by_letter(&self, letter: char) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.letter == letter)
    }

    pub fn zone(&self, code: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.code == code)
    }

    /// Zones belonging to a sector, in configuration order.
    pub fn zones_in_sector<'a>(&'a self, sector: &'a str) -> impl Iterator<Item = &'a Zone> + 'a {
        self.zones.iter().filter(move |z| z.sector == sector)
    }

    /// Resolve the sector and region owning a zone.
    pub fn lineage(&self, zone: &Zone) -> OmanaResult<(&Sector, &Region)> {
        let sector = self
            .sector(&zone.sector)
            .ok_or_else(|| OmanaError::SectorNotFound(zone.sector.clone()))?;
        let region = self
            .region(&sector.region)
            .ok_or_else(|| OmanaError::RegionNotFound(sector.region.clone()))?;
        Ok((sector, region))
    }

    /// Check referential integrity and geometry of the layout.
    pub fn validate(&self) -> OmanaResult<()> {
        if self.zones.is_empty() {
            return Err(OmanaError::ConfigError("layout has no zones".to_string()));
        }

        for region in &self.regions {
            if region.code.len() != 3 || !region.code.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(OmanaError::ConfigError(format!(
                    "region code '{}' must be three upper-case letters",
                    region.code
                )));
            }
        }

        let mut letters = Vec::with_capacity(self.sectors.len());
        for sector in &self.sectors {
            if !LOCAL_SECTOR_LETTERS.contains(&sector.letter) {
                return Err(OmanaError::ConfigError(format!(
                    "sector '{}' letter '{}' must be one of A, B, C or D",
                    sector.code, sector.letter
                )));
            }
            if letters.contains(&sector.letter) {
                return Err(OmanaError::ConfigError(format!(
                    "sector letter '{}' is used more than once",
                    sector.letter
                )));
            }
            letters.push(sector.letter);
            if self.region(&sector.region).is_none() {
                return Err(OmanaError::RegionNotFound(sector.region.clone()));
            }
        }

        for zone in &self.zones {
            if self.sector(&zone.sector).is_none() {
                return Err(OmanaError::SectorNotFound(zone.sector.clone()));
            }
            let corners = [zone.start_x, zone.start_y, zone.end_x, zone.end_y];
            if !corners.iter().all(|v| v.is_finite()) {
                return Err(OmanaError::ConfigError(format!(
                    "zone '{}' has a non-finite corner",
                    zone.code
                )));
            }
            if zone.width() <= 0.0 || zone.height() <= 0.0 {
                return Err(OmanaError::ConfigError(format!(
                    "zone '{}' has a degenerate rectangle",
                    zone.code
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> AdminLayout {
        AdminLayout {
            regions: vec![Region {
                code: "MSC".into(),
                name: "Bawshar".into(),
                governorate: "Muscat".into(),
                wilayat_number: 3,
            }],
            sectors: vec![Sector {
                code: "S-A".into(),
                letter: 'A',
                name: "Al Khuwair".into(),
                region: "MSC".into(),
                number: 1,
                streets: vec![],
            }],
            zones: vec![Zone {
                code: "B-001".into(),
                name: "Block 1".into(),
                sector: "S-A".into(),
                number: 1,
                start_x: 100.0,
                start_y: 100.0,
                end_x: 400.0,
                end_y: 300.0,
            }],
        }
    }

    #[test]
    fn test_zone_contains_edges() {
        let zone = &layout().zones[0];
        assert!(zone.contains(100.0, 100.0));
        assert!(zone.contains(400.0, 300.0));
        assert!(!zone.contains(99.9, 200.0));
        assert!(!zone.contains(200.0, 300.1));
    }

    #[test]
    fn test_lineage() {
        let layout = layout();
        let (sector, region) = layout.lineage(&layout.zones[0]).unwrap();
        assert_eq!(sector.letter, 'A');
        assert_eq!(region.code, "MSC");
    }

    #[test]
    fn test_validate_rejects_unknown_sector() {
        let mut layout = layout();
        layout.zones[0].sector = "S-Z".into();
        assert!(matches!(
            layout.validate(),
            Err(OmanaError::SectorNotFound(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_letter() {
        let mut layout = layout();
        let mut dup = layout.sectors[0].clone();
        dup.code = "S-A2".into();
        layout.sectors.push(dup);
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_letter_outside_local_schema() {
        let mut layout = layout();
        layout.sectors[0].letter = 'E';
        assert!(matches!(layout.validate(), Err(OmanaError::ConfigError(_))));
        layout.sectors[0].letter = 'D';
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_finite_zone() {
        let mut layout = layout();
        layout.zones[0].end_x = f64::INFINITY;
        assert!(layout.validate().is_err());

        let mut layout = self::layout();
        layout.zones[0].end_y = f64::NAN;
        assert!(layout.validate().is_err());

        let mut layout = self::layout();
        layout.zones[0].start_x = f64::NEG_INFINITY;
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_degenerate_zone() {
        let mut layout = layout();
        layout.zones[0].end_x = layout.zones[0].start_x;
        assert!(layout.validate().is_err());
    }
}
