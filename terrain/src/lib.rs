//! # Terrain
//!
//! `terrain` provides the geometric primitives shared by every
//! propagation study: ellipsoidal geodesics, radial generation and
//! elevation profiles sampled along a path.

mod error;
pub mod geodesic;
mod math;
mod profile;

pub use crate::{
    error::TerrainError,
    math::{earth_bulge_m, linspace},
    profile::{ElevationProfile, ElevationSource, Profile, ProfileBuilder},
};
pub use geo;

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Standard atmosphere effective earth radius factor.
pub const K_FACTOR: f64 = 4.0 / 3.0;
