//! Radiation exposure compliance distances.
//!
//! Uses the far-field point-source estimate of power density,
//! `S = 30·EIRP·k / r²`, solved for `r`.

use crate::{field::db_to_linear, PropahError, StationSetup};
use geo::{LineString, Point, Polygon};
use log::debug;
use rayon::prelude::*;
use terrain::geodesic;

/// Default ground reflection factor (1.6²).
pub const K_REFLECTION: f64 = 2.56;

/// Default azimuth step of a compliance zone polygon (degrees).
pub const ZONE_STEP_DEG: i32 = 5;

/// Returns ERP in linear watts, 0 when the station radiates nothing.
pub fn eirp_w(erp_dbw: f64) -> f64 {
    if erp_dbw == f64::NEG_INFINITY {
        return 0.0;
    }
    db_to_linear(erp_dbw)
}

/// Returns the distance (meters) beyond which power density stays
/// under `s_limit_w_m2`.
///
/// 0 when either `eirp_w` or `s_limit_w_m2` is not positive.
pub fn compliance_radius_m(eirp_w: f64, k_reflection: f64, s_limit_w_m2: f64) -> f64 {
    if eirp_w <= 0.0 || s_limit_w_m2 <= 0.0 {
        return 0.0;
    }
    (30.0 * eirp_w * k_reflection / s_limit_w_m2).sqrt()
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneKind {
    Public,
    Occupational,
}

/// Power density limits (W/m²).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureLimits {
    pub public_w_m2: f64,
    pub occupational_w_m2: f64,
}

/// A circle of `radius_m` around the transmitter, as a polygon with
/// one vertex per radial.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceZone {
    pub kind: ZoneKind,
    pub radius_m: f64,
    pub ring: LineString<f64>,
}

impl ComplianceZone {
    pub fn new(
        kind: ZoneKind,
        origin: Point<f64>,
        radius_m: f64,
        step_deg: i32,
    ) -> Result<Self, PropahError> {
        let vertices: Vec<Point<f64>> = geodesic::radials(step_deg)?
            .par_iter()
            .map(|&azimuth| geodesic::destination(origin, f64::from(azimuth), radius_m / 1e3))
            .collect();
        let ring = geodesic::closed_ring(&vertices)?;
        Ok(Self {
            kind,
            radius_m,
            ring,
        })
    }

    pub fn polygon(&self) -> Polygon<f64> {
        Polygon::new(self.ring.clone(), vec![])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceAssessment {
    pub eirp_w: f64,
    pub k_reflection: f64,
    pub limits: ExposureLimits,
    pub r_public_m: f64,
    pub r_occupational_m: f64,
    pub public: ComplianceZone,
    pub occupational: ComplianceZone,
}

/// Computes both exposure zones of a transmitter at `origin`
/// radiating `erp_dbw`.
///
/// `k_reflection` must be a finite, non-negative factor.
pub fn assess_compliance(
    origin: Point<f64>,
    erp_dbw: f64,
    limits: &ExposureLimits,
    k_reflection: f64,
    zone_step_deg: i32,
) -> Result<ComplianceAssessment, PropahError> {
    if !(k_reflection >= 0.0) || !k_reflection.is_finite() {
        return Err(PropahError::InvalidArgument(format!(
            "reflection factor must be non-negative, got {k_reflection}"
        )));
    }
    let eirp_w = eirp_w(erp_dbw);
    let r_public_m = compliance_radius_m(eirp_w, k_reflection, limits.public_w_m2);
    let r_occupational_m = compliance_radius_m(eirp_w, k_reflection, limits.occupational_w_m2);
    debug!(
        "compliance; eirp: {eirp_w:.1} W, public: {r_public_m:.2} m, occupational: {r_occupational_m:.2} m"
    );

    Ok(ComplianceAssessment {
        eirp_w,
        k_reflection,
        limits: *limits,
        r_public_m,
        r_occupational_m,
        public: ComplianceZone::new(ZoneKind::Public, origin, r_public_m, zone_step_deg)?,
        occupational: ComplianceZone::new(
            ZoneKind::Occupational,
            origin,
            r_occupational_m,
            zone_step_deg,
        )?,
    })
}

/// Computes both exposure zones of a station.
pub fn station_compliance(
    setup: Option<&StationSetup>,
    limits: &ExposureLimits,
    k_reflection: f64,
    zone_step_deg: i32,
) -> Result<ComplianceAssessment, PropahError> {
    let setup = setup.ok_or(PropahError::Precondition("station data"))?;
    assess_compliance(
        setup.station.location(),
        setup.erp_dbw(),
        limits,
        k_reflection,
        zone_step_deg,
    )
}
