//! Coverage contours.
//!
//! A contour is found by walking outward along equally spaced radials
//! and keeping, for each one, the farthest sample whose field strength
//! still meets the threshold.

use crate::{field::FieldModel, PropahError, StationSetup};
use geo::{LineString, Point, Polygon};
use log::{debug, warn};
use rayon::prelude::*;
use terrain::geodesic;

/// Default azimuth step between radials (degrees).
pub const DEFAULT_STEP_DEG: i32 = 5;

/// Default distance step along a radial (km).
pub const DEFAULT_STEP_KM: f64 = 0.1;

/// Default radial length (km).
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 200.0;

/// Contour search parameters, kept with the result for audit.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourParams {
    /// Protected field strength (dBµV/m).
    pub threshold_dbuvm: f64,

    /// Azimuth step between radials, must divide 360.
    pub step_deg: i32,

    /// Distance between samples along a radial (km).
    pub step_km: f64,

    /// Radial length (km).
    pub max_distance_km: f64,
}

impl ContourParams {
    pub fn new(threshold_dbuvm: f64) -> Self {
        Self {
            threshold_dbuvm,
            step_deg: DEFAULT_STEP_DEG,
            step_km: DEFAULT_STEP_KM,
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
        }
    }

    /// Returns the number of samples along each radial.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn samples_per_radial(&self) -> Result<usize, PropahError> {
        if !(self.step_km > 0.0) || !self.step_km.is_finite() {
            return Err(PropahError::InvalidArgument(format!(
                "radial step must be positive, got {} km",
                self.step_km
            )));
        }
        if !(self.max_distance_km >= 0.0) || !self.max_distance_km.is_finite() {
            return Err(PropahError::InvalidArgument(format!(
                "max distance must be non-negative, got {} km",
                self.max_distance_km
            )));
        }
        // Absorb representation error so that e.g. 200 / 0.1 scans 2000
        // samples, not 1999.
        Ok((self.max_distance_km / self.step_km + 1e-9).floor() as usize)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourPoint {
    pub azimuth_deg: u16,

    /// Distance from the transmitter, rounded to 0.1 m.
    pub distance_km: f64,

    pub lat: f64,
    pub lon: f64,

    /// Position of this point in the ring.
    pub order_idx: usize,
}

impl ContourPoint {
    pub fn location(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

/// A protected contour: one point per radial, in azimuth order, and
/// the closed ring through them.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub params: ContourParams,
    pub erp_dbw: f64,
    pub points: Vec<ContourPoint>,
    pub ring: LineString<f64>,
}

impl Contour {
    pub fn polygon(&self) -> Polygon<f64> {
        Polygon::new(self.ring.clone(), vec![])
    }
}

/// Computes the contour where `model`'s field strength for a source
/// radiating `erp_dbw` at `origin` falls below the threshold.
///
/// Every radial is scanned to its full length; a model which is not
/// monotonic therefore yields the farthest qualifying sample. Radials
/// with no qualifying sample collapse onto `origin`.
pub fn compute_contour<M>(
    origin: Point<f64>,
    erp_dbw: f64,
    params: &ContourParams,
    model: &M,
) -> Result<Contour, PropahError>
where
    M: FieldModel + Sync,
{
    let radials = geodesic::radials(params.step_deg)?;
    let n_samples = params.samples_per_radial()?;

    let now = std::time::Instant::now();
    let points = radials
        .par_iter()
        .enumerate()
        .map(|(order_idx, &azimuth)| {
            let distance_km = farthest_qualifying_km(erp_dbw, params, n_samples, model)?;
            let location = if distance_km > 0.0 {
                geodesic::destination(origin, f64::from(azimuth), distance_km)
            } else {
                origin
            };
            Ok(ContourPoint {
                azimuth_deg: azimuth,
                distance_km: (distance_km * 1e4).round() / 1e4,
                lat: location.y(),
                lon: location.x(),
                order_idx,
            })
        })
        .collect::<Result<Vec<ContourPoint>, PropahError>>()?;

    let collapsed = points.iter().filter(|p| p.distance_km == 0.0).count();
    if collapsed > 0 {
        warn!(
            "contour; {collapsed}/{} radials never reach {} dBµV/m",
            points.len(),
            params.threshold_dbuvm
        );
    }

    let locations: Vec<Point<f64>> = points.iter().map(ContourPoint::location).collect();
    let ring = geodesic::closed_ring(&locations)?;
    debug!(
        "contour; radials: {}, samples: {n_samples}, erp: {erp_dbw:.2} dBW, exec: {:?}",
        points.len(),
        now.elapsed()
    );

    Ok(Contour {
        params: *params,
        erp_dbw,
        points,
        ring,
    })
}

#[allow(clippy::cast_precision_loss)]
fn farthest_qualifying_km<M: FieldModel>(
    erp_dbw: f64,
    params: &ContourParams,
    n_samples: usize,
    model: &M,
) -> Result<f64, PropahError> {
    let mut farthest_km = 0.0;
    for i in 1..=n_samples {
        let distance_km = i as f64 * params.step_km;
        if model.field_strength_dbuvm(erp_dbw, distance_km)? >= params.threshold_dbuvm {
            farthest_km = distance_km;
        }
    }
    Ok(farthest_km)
}

/// Computes the protected contour of a station.
pub fn station_contour<M>(
    setup: Option<&StationSetup>,
    params: &ContourParams,
    model: &M,
) -> Result<Contour, PropahError>
where
    M: FieldModel + Sync,
{
    let setup = setup.ok_or(PropahError::Precondition("station data"))?;
    compute_contour(setup.station.location(), setup.erp_dbw(), params, model)
}
