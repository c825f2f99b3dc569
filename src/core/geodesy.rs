//! Great-circle distance on a spherical Earth
//!
//! Distances come from `geo`'s haversine measure and are rescaled to the model's radius.

use crate::core::constants::MEAN_EARTH_RADIUS_M;
use crate::core::types::GeoPosition;
use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// Spherical Earth model used for distance computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarthModel {
    /// Sphere radius (meters)
    pub mean_radius_m: f64,
}

impl EarthModel {
    /// IUGG mean radius sphere
    pub fn iugg_mean() -> Self {
        Self {
            mean_radius_m: MEAN_EARTH_RADIUS_M,
        }
    }

    /// Great-circle distance between two positions (meters)
    pub fn distance_m(&self, a: &GeoPosition, b: &GeoPosition) -> f64 {
        let mean_sphere_m: f64 = Haversine::distance(point(a), point(b));
        mean_sphere_m * (self.mean_radius_m / MEAN_EARTH_RADIUS_M)
    }
}

impl Default for EarthModel {
    fn default() -> Self {
        Self::iugg_mean()
    }
}

/// Great-circle distance on the IUGG mean sphere (meters)
pub fn great_circle_distance_m(a: &GeoPosition, b: &GeoPosition) -> f64 {
    EarthModel::iugg_mean().distance_m(a, b)
}

// geo points are (x, y) = (longitude, latitude)
fn point(pos: &GeoPosition) -> Point<f64> {
    Point::new(pos.longitude(), pos.latitude())
}
