//! Common types and utilities shared across the Omana map crates.

pub mod admin;
pub mod bbox;
pub mod config;
pub mod crs;
pub mod drawing;
pub mod error;
pub mod feature;
pub mod geo;
pub mod layer;
pub mod tile;

pub use admin::{AdminLayout, Region, Sector, Zone, LOCAL_SECTOR_LETTERS};
pub use bbox::BoundingBox;
pub use config::{MapConfig, MapSettings, OverpassSettings, TileSettings};
pub use crs::CrsCode;
pub use drawing::{snap_to_grid, ElementKind, MapElement};
pub use error::{OmanaError, OmanaResult};
pub use feature::{Feature, FeatureStyle, Geometry, PropertyValue};
pub use geo::{GeoPoint, ScreenPoint, ScreenTransform};
pub use layer::{Layer, LayerId, Project, ProjectMetadata};
pub use tile::TileCoord;
