//! Fresnel zone geometry.

use crate::C;

/// Returns the wavelength (meters) of a signal at `freq_mhz`.
pub fn wavelength_m(freq_mhz: f64) -> f64 {
    C / (freq_mhz * 1e6)
}

/// Returns the radius of the nth fresnel zone at a point `d1_m`
/// meters from one end of a link and `d2_m` meters from the other.
///
/// The radius is zero at (or beyond) either end of the link.
pub fn fresnel_radius_m(zone: u8, wavelength_m: f64, d1_m: f64, d2_m: f64) -> f64 {
    if d1_m <= 0.0 || d2_m <= 0.0 {
        return 0.0;
    }
    (f64::from(zone) * wavelength_m * d1_m * d2_m / (d1_m + d2_m)).sqrt()
}

/// Returns the Fresnel-Kirchhoff diffraction parameter, ν, of an
/// obstacle `h_m` meters above the line of sight.
///
/// Negative `h_m` (the obstacle is below the line of sight) yields a
/// negative ν. Points at either end of the link have ν = 0.
pub fn kirchhoff_nu(h_m: f64, d1_m: f64, d2_m: f64, wavelength_m: f64) -> f64 {
    if d1_m <= 0.0 || d2_m <= 0.0 {
        return 0.0;
    }
    h_m * (2.0 * (d1_m + d2_m) / (wavelength_m * d1_m * d2_m)).sqrt()
}
