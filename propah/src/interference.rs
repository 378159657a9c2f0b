use crate::{contour::Contour, field::FieldModel, PropahError, StationSetup};
use geo::Point;
use log::debug;
use terrain::geodesic;

/// An interference case between a desired (protected) station and an
/// undesired one.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct InterferenceCase {
    /// Reference of the station being protected.
    pub victim_ref: String,

    /// Channel relationship, e.g. "co-channel" or "adjacent".
    pub relationship: String,

    /// Required desired-to-undesired ratio (dB).
    pub required_ratio_db: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterferenceTestPoint {
    pub lat: f64,
    pub lon: f64,

    /// Desired field (dBµV/m).
    pub desired_dbuvm: f64,

    /// Undesired field (dBµV/m).
    pub undesired_dbuvm: f64,

    /// `(desired - undesired) - required ratio`.
    pub margin_db: f64,

    pub passed: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct InterferenceResult {
    pub points: Vec<InterferenceTestPoint>,

    /// True only when every point passes.
    pub passed: bool,

    pub worst_margin_db: f64,
}

/// Tests every point of the desired station's protected `contour`
/// against the field of the `undesired` station.
///
/// Inside the contour the desired field is the contour threshold.
pub fn evaluate_interference<M: FieldModel>(
    contour: Option<&Contour>,
    undesired: Option<&StationSetup>,
    case: &InterferenceCase,
    model: &M,
) -> Result<InterferenceResult, PropahError> {
    let contour = contour.ok_or(PropahError::Precondition("protected contour"))?;
    if contour.points.is_empty() {
        return Err(PropahError::Precondition("contour points"));
    }
    let undesired = undesired.ok_or(PropahError::Precondition("station data"))?;

    let desired_dbuvm = contour.params.threshold_dbuvm;
    let source = undesired.station.location();
    let erp_dbw = undesired.erp_dbw();

    let mut points = Vec::with_capacity(contour.points.len());
    for contour_point in &contour.points {
        let target: Point<f64> = contour_point.location();
        let undesired_dbuvm =
            model.field_strength_dbuvm(erp_dbw, geodesic::distance_km(source, target))?;
        let margin_db = (desired_dbuvm - undesired_dbuvm) - case.required_ratio_db;
        points.push(InterferenceTestPoint {
            lat: contour_point.lat,
            lon: contour_point.lon,
            desired_dbuvm,
            undesired_dbuvm,
            margin_db,
            passed: margin_db >= 0.0,
        });
    }

    let passed = points.iter().all(|p| p.passed);
    let worst_margin_db = points
        .iter()
        .map(|p| p.margin_db)
        .fold(f64::INFINITY, f64::min);
    debug!(
        "interference; victim: {}, points: {}, worst: {worst_margin_db:.2} dB, passed: {passed}",
        case.victim_ref,
        points.len()
    );

    Ok(InterferenceResult {
        points,
        passed,
        worst_margin_db,
    })
}
