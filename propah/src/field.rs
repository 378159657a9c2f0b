//! Effective radiated power and field strength.
//!
//! "No signal" is represented by negative infinity in the dB domain
//! and a point coinciding with its source by positive infinity. Both
//! are legitimate results, never errors, and comparisons against a
//! threshold rely on their IEEE-754 ordering.

use crate::PropahError;

/// Field strength (dBµV/m) produced by 1 kW ERP at 1 km.
pub const E_1KW_1KM_DBUVM: f64 = 106.92;

pub fn db_to_linear(db: f64) -> f64 {
    10_f64.powf(db / 10.0)
}

/// Returns `linear` in dB, or negative infinity when `linear <= 0`.
pub fn linear_to_db(linear: f64) -> f64 {
    if linear <= 0.0 {
        return f64::NEG_INFINITY;
    }
    10.0 * linear.log10()
}

/// Returns effective radiated power in dBW.
///
/// Negative infinity when `tx_power_w <= 0`.
pub fn erp_dbw(tx_power_w: f64, antenna_gain_dbd: f64, total_losses_db: f64) -> f64 {
    if !(tx_power_w > 0.0) {
        return f64::NEG_INFINITY;
    }
    linear_to_db(tx_power_w) + antenna_gain_dbd - total_losses_db
}

/// Returns the field strength (dBµV/m) `distance_km` away from a
/// source radiating `erp_dbw`, following an inverse-square law.
///
/// - `+∞` when `distance_km <= 0`
/// - `−∞` when the source radiates no power
pub fn field_strength_dbuvm(erp_dbw: f64, distance_km: f64) -> f64 {
    if distance_km <= 0.0 {
        return f64::INFINITY;
    }
    let erp_kw = db_to_linear(erp_dbw) / 1000.0;
    if erp_kw <= 0.0 {
        return f64::NEG_INFINITY;
    }
    E_1KW_1KM_DBUVM + 10.0 * erp_kw.log10() - 20.0 * distance_km.log10()
}

/// Field strength as a function of radiated power and distance.
///
/// Contour generation and interference evaluation are written against
/// this trait so that a statistical model can replace the closed-form
/// law without touching them.
pub trait FieldModel {
    fn field_strength_dbuvm(&self, erp_dbw: f64, distance_km: f64) -> Result<f64, PropahError>;
}

/// The closed-form inverse-square law, see [`field_strength_dbuvm`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FreeSpace;

impl FieldModel for FreeSpace {
    fn field_strength_dbuvm(&self, erp_dbw: f64, distance_km: f64) -> Result<f64, PropahError> {
        Ok(field_strength_dbuvm(erp_dbw, distance_km))
    }
}
