use crate::EARTH_RADIUS_M;

/// Returns the height (meters) the earth bulges above the chord
/// joining both ends of a `total_m` long path, `d_m` meters from the
/// start.
///
/// `k_factor` is the effective earth radius factor, where `4/3`
/// models a standard atmosphere.
pub fn earth_bulge_m(d_m: f64, total_m: f64, k_factor: f64) -> f64 {
    d_m * (total_m - d_m) / (2.0 * k_factor * EARTH_RADIUS_M)
}
