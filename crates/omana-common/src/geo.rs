//! Point types for geographic and screen space.

use serde::{Deserialize, Serialize};

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// GeoJSON coordinate order: `[lng, lat]`.
    pub fn to_lng_lat(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    pub fn from_lng_lat(coord: [f64; 2]) -> Self {
        Self::new(coord[1], coord[0])
    }
}

/// A position on a drawing surface in pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in pixels.
    pub fn distance_to(&self, other: ScreenPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Conversion between geographic and screen space.
///
/// Implemented by the projection crate; kept here so model types can
/// convert themselves without depending on a concrete projector.
pub trait ScreenTransform {
    fn to_screen(&self, point: GeoPoint) -> ScreenPoint;
    fn to_geo(&self, point: ScreenPoint) -> GeoPoint;
}
