//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// A geographic or planar bounding box.
///
/// For geographic use, `min_x`/`max_x` are west/east longitudes and
/// `min_y`/`max_y` are south/north latitudes, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create a geographic box from its four edges.
    pub fn from_edges(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self::new(west, south, east, north)
    }

    /// Parse a bbox string: "west,south,east,north"
    pub fn from_bbox_string(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))?;
        }

        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn enclosing(points: impl IntoIterator<Item = GeoPoint>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self::new(first.lng, first.lat, first.lng, first.lat);
        for p in iter {
            bbox.expand_to(p);
        }
        Some(bbox)
    }

    pub fn west(&self) -> f64 {
        self.min_x
    }

    pub fn south(&self) -> f64 {
        self.min_y
    }

    pub fn east(&self) -> f64 {
        self.max_x
    }

    pub fn north(&self) -> f64 {
        self.max_y
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True when both spans are strictly positive and finite.
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0 && self.width().is_finite() && self.height().is_finite()
    }

    /// Center point of the box.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_y + self.max_y) / 2.0,
            (self.min_x + self.max_x) / 2.0,
        )
    }

    /// Grow the box so it contains `point`.
    pub fn expand_to(&mut self, point: GeoPoint) {
        self.min_x = self.min_x.min(point.lng);
        self.max_x = self.max_x.max(point.lng);
        self.min_y = self.min_y.min(point.lat);
        self.max_y = self.max_y.max(point.lat);
    }

    /// Check if this bbox intersects another. Touching edges count.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Compute the intersection of two bounding boxes.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }

        Some(BoundingBox {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        })
    }

    /// Check if a point is contained within this bbox (edges inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Check if a geographic point is contained within this bbox.
    pub fn contains(&self, point: GeoPoint) -> bool {
        self.contains_point(point.lng, point.lat)
    }

    /// Format for an Overpass QL bbox filter: "south,west,north,east"
    pub fn to_overpass_string(&self) -> String {
        format!(
            "{:.7},{:.7},{:.7},{:.7}",
            self.min_y, self.min_x, self.max_y, self.max_x
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid BBOX format: {0}. Expected 'west,south,east,north'")]
    InvalidFormat(String),

    #[error("Invalid number in BBOX: {0}")]
    InvalidNumber(String),
}
