//! OpenStreetMap access for the address map.
//!
//! Building footprints come from the Overpass API; base-map imagery is
//! referenced by URL only.

pub mod governorate;
pub mod overpass;
pub mod tiles;

pub use governorate::{Governorate, GOVERNORATES};
pub use overpass::{parse_overpass, OverpassClient, OverpassQuery};
pub use tiles::{mapbox_static_url, osm_tile_url, TileUrls};
