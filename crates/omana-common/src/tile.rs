//! Web Mercator (XYZ) tile coordinates for the OSM base layer.

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, GeoPoint};

/// Maximum zoom served by the public OSM tile servers.
pub const MAX_ZOOM: u32 = 19;

/// Latitude limit of the Web Mercator square.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y), 0 at the top
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Path fragment used in tile URLs.
    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.z, self.x, self.y)
    }

    /// Whether x and y exist at this zoom.
    pub fn is_valid(&self) -> bool {
        if self.z > MAX_ZOOM {
            return false;
        }
        let n = 1u32 << self.z;
        self.x < n && self.y < n
    }

    /// Get the parent tile (zoom - 1).
    pub fn parent(&self) -> Option<TileCoord> {
        if self.z == 0 {
            return None;
        }
        Some(TileCoord {
            z: self.z - 1,
            x: self.x / 2,
            y: self.y / 2,
        })
    }
}

/// Convert lat/lon to Web Mercator tile coordinates.
///
/// Latitudes are clamped to the Mercator limit and the result to the
/// tile range, so any finite input yields a valid tile.
pub fn latlon_to_tile(lat: f64, lon: f64, zoom: u32) -> TileCoord {
    let zoom = zoom.min(MAX_ZOOM);
    let n = (1u32 << zoom) as f64;
    let max_index = (1u32 << zoom) - 1;

    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let x = ((lon + 180.0) / 360.0 * n).floor().max(0.0) as u32;
    let lat_rad = lat.to_radians();
    let y = ((1.0 - lat_rad.tan().asinh() / std::f64::consts::PI) / 2.0 * n)
        .floor()
        .max(0.0) as u32;

    TileCoord {
        z: zoom,
        x: x.min(max_index),
        y: y.min(max_index),
    }
}

/// Convert Web Mercator tile coordinates to lat/lon bounds.
pub fn tile_to_latlon_bounds(coord: &TileCoord) -> BoundingBox {
    let n = (1u32 << coord.z) as f64;

    let lon_min = coord.x as f64 / n * 360.0 - 180.0;
    let lon_max = (coord.x + 1) as f64 / n * 360.0 - 180.0;

    let lat_max = (std::f64::consts::PI * (1.0 - 2.0 * coord.y as f64 / n))
        .sinh()
        .atan()
        .to_degrees();
    let lat_min = (std::f64::consts::PI * (1.0 - 2.0 * (coord.y + 1) as f64 / n))
        .sinh()
        .atan()
        .to_degrees();

    BoundingBox::new(lon_min, lat_min, lon_max, lat_max)
}

/// All tiles at `zoom` covering `bounds`, row-major from the north-west.
pub fn tiles_covering(bounds: &BoundingBox, zoom: u32) -> Vec<TileCoord> {
    let top_left = latlon_to_tile(bounds.north(), bounds.west(), zoom);
    let bottom_right = latlon_to_tile(bounds.south(), bounds.east(), zoom);

    let mut tiles = Vec::new();
    for y in top_left.y..=bottom_right.y {
        for x in top_left.x..=bottom_right.x {
            tiles.push(TileCoord::new(top_left.z, x, y));
        }
    }
    tiles
}

/// Tile containing a geographic point.
pub fn tile_for_point(point: GeoPoint, zoom: u32) -> TileCoord {
    latlon_to_tile(point.lat, point.lng, zoom)
}
