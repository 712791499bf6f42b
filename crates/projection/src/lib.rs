//! Coordinate projection for the map surface.
//!
//! Implements the plain linear lat/lng to pixel mapping used for both
//! drawing and pointer hit-testing, plus the shared picking routine.

pub mod hit_test;
pub mod linear;

pub use hit_test::{features_within, pick_feature, screen_distance, Hit, DEFAULT_HIT_THRESHOLD};
pub use linear::LinearProjector;
