//! Core types, constants and geodesy for the distance tracker

pub mod types;
pub mod constants;
pub mod geodesy;

pub use types::*;
pub use constants::*;
pub use geodesy::{EarthModel, great_circle_distance_m};
