//! Map configuration: administrative layout plus view, fetch and tile settings.
//!
//! Loaded from YAML. Every section except the layout has defaults, and
//! `MapConfig::builtin()` provides a complete demo configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::{AdminLayout, BoundingBox, OmanaError, OmanaResult, Region, Sector, Zone};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(flatten)]
    pub layout: AdminLayout,

    #[serde(default)]
    pub map: MapSettings,

    #[serde(default)]
    pub overpass: OverpassSettings,

    #[serde(default)]
    pub tiles: TileSettings,
}

/// Drawing surface and interaction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapSettings {
    /// Geographic extent shown on the surface
    #[serde(default = "default_bounds")]
    pub bounds: BoundingBox,
    #[serde(default = "default_surface_width")]
    pub surface_width: f64,
    #[serde(default = "default_surface_height")]
    pub surface_height: f64,
    #[serde(default)]
    pub margin_x: f64,
    #[serde(default)]
    pub margin_y: f64,
    /// Plot grid subdivision per zone side
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,
    /// Pixel radius for feature picking
    #[serde(default = "default_hit_threshold")]
    pub hit_threshold: f64,
    /// Snapping cell for drawn elements, in pixels
    #[serde(default = "default_snap_cell")]
    pub snap_cell: f64,
}

fn default_bounds() -> BoundingBox {
    // Central Muscat
    BoundingBox::from_edges(58.30, 23.55, 58.50, 23.65)
}

fn default_surface_width() -> f64 {
    1000.0
}

fn default_surface_height() -> f64 {
    800.0
}

fn default_grid_size() -> u32 {
    10
}

fn default_hit_threshold() -> f64 {
    12.0
}

fn default_snap_cell() -> f64 {
    10.0
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            bounds: default_bounds(),
            surface_width: default_surface_width(),
            surface_height: default_surface_height(),
            margin_x: 0.0,
            margin_y: 0.0,
            grid_size: default_grid_size(),
            hit_threshold: default_hit_threshold(),
            snap_cell: default_snap_cell(),
        }
    }
}

/// Overpass API client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverpassSettings {
    #[serde(default = "default_overpass_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_overpass_timeout")]
    pub timeout_secs: u64,
}

fn default_overpass_endpoint() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_overpass_timeout() -> u64 {
    60
}

impl Default for OverpassSettings {
    fn default() -> Self {
        Self {
            endpoint: default_overpass_endpoint(),
            timeout_secs: default_overpass_timeout(),
        }
    }
}

/// Base-map tile settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileSettings {
    /// URL template with `{z}`, `{x}`, `{y}` placeholders
    #[serde(default = "default_osm_template")]
    pub osm_template: String,
    #[serde(default = "default_mapbox_style")]
    pub mapbox_style: String,
    /// Never committed to config files; usually supplied via MAPBOX_TOKEN
    #[serde(default, skip_serializing)]
    pub mapbox_token: Option<String>,
}

fn default_osm_template() -> String {
    "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

fn default_mapbox_style() -> String {
    "mapbox/streets-v12".to_string()
}

impl Default for TileSettings {
    fn default() -> Self {
        Self {
            osm_template: default_osm_template(),
            mapbox_style: default_mapbox_style(),
            mapbox_token: None,
        }
    }
}

impl MapConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> OmanaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            OmanaError::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml(&content)?;
        info!(
            path = %path.display(),
            zones = config.layout.zones.len(),
            "Loaded map configuration"
        );
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> OmanaResult<Self> {
        let config: MapConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> OmanaResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> OmanaResult<()> {
        fn positive(v: f64) -> bool {
            v.is_finite() && v > 0.0
        }
        fn non_negative(v: f64) -> bool {
            v.is_finite() && v >= 0.0
        }

        self.layout.validate()?;

        let map = &self.map;
        if !map.bounds.is_valid() {
            return Err(OmanaError::InvalidBounds(format!("{:?}", map.bounds)));
        }
        if !(positive(map.surface_width) && positive(map.surface_height)) {
            return Err(OmanaError::ConfigError(
                "surface dimensions must be positive and finite".to_string(),
            ));
        }
        if !(non_negative(map.margin_x) && non_negative(map.margin_y)) {
            return Err(OmanaError::ConfigError(
                "margins must be non-negative and finite".to_string(),
            ));
        }
        if map.grid_size == 0 {
            return Err(OmanaError::ConfigError("grid_size must be at least 1".to_string()));
        }
        if !non_negative(map.hit_threshold) {
            return Err(OmanaError::ConfigError(
                "hit_threshold must be non-negative and finite".to_string(),
            ));
        }
        if map.snap_cell.is_nan() {
            return Err(OmanaError::ConfigError("snap_cell must be a number".to_string()));
        }
        if self.overpass.timeout_secs == 0 {
            return Err(OmanaError::ConfigError(
                "overpass.timeout_secs must be positive".to_string(),
            ));
        }

        debug!("Map configuration validated");
        Ok(())
    }

    /// Demo layout: one wilayat in Muscat with sectors A-D, two blocks each.
    pub fn builtin() -> Self {
        let regions = vec![Region {
            code: "MSC".to_string(),
            name: "Bawshar".to_string(),
            governorate: "Muscat".to_string(),
            wilayat_number: 3,
        }];

        let sector_specs: [(char, &str, [&str; 3]); 4] = [
            ('A', "Al Khuwair", ["Way 3021", "Way 3023", "Way 3025"]),
            ('B', "Al Ghubrah", ["Way 3401", "Way 3403", "Way 3405"]),
            ('C', "Al Azaiba", ["Way 2710", "Way 2712", "Way 2714"]),
            ('D', "Bawshar Heights", ["Way 4601", "Way 4603", "Way 4605"]),
        ];

        let mut sectors = Vec::new();
        let mut zones = Vec::new();
        for (idx, (letter, name, streets)) in sector_specs.iter().enumerate() {
            let code = format!("S-{}", letter);
            sectors.push(Sector {
                code: code.clone(),
                letter: *letter,
                name: name.to_string(),
                region: "MSC".to_string(),
                number: idx as u32 + 1,
                streets: streets.iter().map(|s| s.to_string()).collect(),
            });

            // Sectors are laid out in a 2x2 arrangement of 500x400 quadrants,
            // each split into two 250x400 blocks.
            let origin_x = (idx % 2) as f64 * 500.0;
            let origin_y = (idx / 2) as f64 * 400.0;
            for block in 0..2u32 {
                let start_x = origin_x + block as f64 * 250.0;
                zones.push(Zone {
                    code: format!("{}-{:03}", letter, block + 1),
                    name: format!("{} Block {}", name, block + 1),
                    sector: code.clone(),
                    number: block + 1,
                    start_x,
                    start_y: origin_y,
                    end_x: start_x + 250.0,
                    end_y: origin_y + 400.0,
                });
            }
        }

        Self {
            layout: AdminLayout {
                regions,
                sectors,
                zones,
            },
            map: MapSettings::default(),
            overpass: OverpassSettings::default(),
            tiles: TileSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_valid() {
        let config = MapConfig::builtin();
        config.validate().unwrap();
        assert_eq!(config.layout.sectors.len(), 4);
        assert_eq!(config.layout.zones.len(), 8);
        assert_eq!(config.layout.zones[0].code, "A-001");
    }

    #[test]
    fn test_yaml_defaults() {
        let yaml = r#"
regions:
  - code: MSC
    name: Seeb
    governorate: Muscat
    wilayat_number: 4
sectors:
  - code: S-A
    letter: A
    name: Mabelah
    region: MSC
zones:
  - code: A-001
    name: Block 1
    sector: S-A
    start_x: 100
    start_y: 100
    end_x: 400
    end_y: 300
"#;
        let config = MapConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.map.grid_size, 10);
        assert_eq!(config.map.hit_threshold, 12.0);
        assert_eq!(config.overpass.endpoint, "https://overpass-api.de/api/interpreter");
        assert_eq!(config.layout.sectors[0].number, 1);
        assert!(config.tiles.mapbox_token.is_none());
    }

    #[test]
    fn test_rejects_zero_grid() {
        let mut config = MapConfig::builtin();
        config.map.grid_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_not_serialized() {
        let mut config = MapConfig::builtin();
        config.tiles.mapbox_token = Some("pk.secret".to_string());
        let yaml = config.to_yaml().unwrap();
        assert!(!yaml.contains("pk.secret"));
        let reparsed = MapConfig::from_yaml(&yaml).unwrap();
        assert_eq!(reparsed.layout, config.layout);
    }
}
