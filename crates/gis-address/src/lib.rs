//! Address assignment for gridded Omani blocks.
//!
//! - [`locator`]: point to zone and plot number
//! - [`code`]: Local and National address code schemas
//! - [`generator`]: batch address generation with collision reporting
//! - [`civil`]: civil numbers and mock ID cards

pub mod civil;
pub mod code;
pub mod generator;
pub mod locator;

pub use civil::{CivilNumber, Gender, IdCard};
pub use code::{AddressCode, LocalCode, NationalCode};
pub use generator::{find_collisions, Address, AddressGenerator, AddressKey, BatchReport, Collision};
pub use locator::{house_number, locate, locate_or, plot_number, ZoneMatch, DEFAULT_GRID_SIZE};
