//! Aerodrome proximity screening.

use crate::{PropahError, Station};
use geo::Point;
use log::debug;
use terrain::geodesic;

/// Stations this close to an aerodrome need a shadow study.
pub const AERODROME_RADIUS_KM: f64 = 20.0;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aerodrome {
    /// Aerodrome designator, e.g. an ICAO code.
    pub reference: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl Aerodrome {
    pub fn location(&self) -> Option<Point<f64>> {
        Some(Point::new(self.lon?, self.lat?))
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AerodromeOutcome {
    Ok,
    NeedsShadowStudy,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AerodromeAssessment {
    pub aerodrome_ref: Option<String>,
    pub within_20km: bool,
    pub outcome: AerodromeOutcome,
}

/// Screens `station` against `aerodrome`.
///
/// An aerodrome without coordinates is never considered close.
pub fn aerodrome_check(
    station: Option<&Station>,
    aerodrome: Option<&Aerodrome>,
) -> Result<AerodromeAssessment, PropahError> {
    let station = station.ok_or(PropahError::Precondition("station data"))?;
    let within_20km = aerodrome
        .and_then(Aerodrome::location)
        .map_or(false, |location| {
            let distance_km = geodesic::distance_km(station.location(), location);
            debug!("aerodrome; distance: {distance_km:.3} km");
            distance_km <= AERODROME_RADIUS_KM
        });
    Ok(AerodromeAssessment {
        aerodrome_ref: aerodrome.and_then(|a| a.reference.clone()),
        within_20km,
        outcome: if within_20km {
            AerodromeOutcome::NeedsShadowStudy
        } else {
            AerodromeOutcome::Ok
        },
    })
}
