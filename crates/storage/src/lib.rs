//! Persistence for user map state.
//!
//! Provides:
//! - [`LocalStore`]: a directory of JSON blobs addressed by key
//! - [`MapState`]: drawn elements, house notes and civil-number links,
//!   loaded and saved explicitly through a store

pub mod local_store;
pub mod state;

pub use local_store::LocalStore;
pub use state::{HouseNote, IdHouseMapping, MapState, HOUSE_NOTES_KEY, ID_HOUSE_MAPPINGS_KEY, USER_MAP_KEY};
