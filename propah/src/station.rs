//! Station technical data and the radiating chain.

use crate::field::{db_to_linear, erp_dbw};
use geo::Point;
use terrain::ElevationProfile;

/// Start of the terrain window averaged for effective antenna height.
pub const HEFF_WINDOW_START_M: f64 = 3_000.0;

/// End of the terrain window averaged for effective antenna height.
pub const HEFF_WINDOW_END_M: f64 = 15_000.0;

/// Transmitting site geometry.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Station {
    /// Transmitter latitude (degrees).
    pub lat: f64,

    /// Transmitter longitude (degrees).
    pub lon: f64,

    /// Ground elevation above mean sea level (meters).
    pub ground_elevation_m: Option<f64>,

    /// Antenna height above ground (meters).
    pub structure_height_m: Option<f64>,

    pub frequency_mhz: Option<f64>,
}

impl Station {
    pub fn location(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }

    /// Antenna height above mean sea level (meters).
    pub fn antenna_amsl_m(&self) -> f64 {
        self.ground_elevation_m.unwrap_or(0.0) + self.structure_height_m.unwrap_or(0.0)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transmitter {
    /// Transmitter output power (watts).
    pub power_w: f64,

    pub internal_losses_db: Option<f64>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Antenna {
    /// Gain relative to a half-wave dipole.
    pub gain_dbd: Option<f64>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Feedline {
    pub length_m: Option<f64>,
    pub attn_db_per_100m: Option<f64>,
    pub connector_losses_db: Option<f64>,
}

/// Returns the total losses (dB) between transmitter output and
/// antenna input.
///
/// Every absent term counts as 0 dB.
pub fn system_losses_db(transmitter: Option<&Transmitter>, feedline: Option<&Feedline>) -> f64 {
    let internal = transmitter
        .and_then(|tx| tx.internal_losses_db)
        .unwrap_or(0.0);
    let (cable, connectors) = feedline.map_or((0.0, 0.0), |feedline| {
        let cable = match (feedline.length_m, feedline.attn_db_per_100m) {
            (Some(length_m), Some(attn)) => length_m / 100.0 * attn,
            _ => 0.0,
        };
        (cable, feedline.connector_losses_db.unwrap_or(0.0))
    });
    internal + cable + connectors
}

/// A station together with its radiating chain, as fetched for a
/// single study revision.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationSetup {
    pub station: Station,
    pub transmitter: Option<Transmitter>,
    pub antenna: Option<Antenna>,
    pub feedline: Option<Feedline>,
}

impl StationSetup {
    pub fn system_losses_db(&self) -> f64 {
        system_losses_db(self.transmitter.as_ref(), self.feedline.as_ref())
    }

    /// Effective radiated power (dBW), negative infinity without a
    /// transmitter.
    pub fn erp_dbw(&self) -> f64 {
        let Some(transmitter) = self.transmitter else {
            return f64::NEG_INFINITY;
        };
        let gain_dbd = self.antenna.and_then(|a| a.gain_dbd).unwrap_or(0.0);
        erp_dbw(transmitter.power_w, gain_dbd, self.system_losses_db())
    }

    /// Effective radiated power in linear watts, 0 when the station
    /// radiates nothing.
    pub fn erp_w(&self) -> f64 {
        let erp = self.erp_dbw();
        if erp == f64::NEG_INFINITY {
            return 0.0;
        }
        db_to_linear(erp)
    }

    /// Effective antenna height (meters) along one radial: antenna
    /// height above sea level minus the mean terrain 3 to 15 km out.
    ///
    /// `None` when the radial profile has no sample in that window.
    pub fn effective_height_m(&self, radial: &ElevationProfile) -> Option<f64> {
        let mean = radial.mean_elevation_between(HEFF_WINDOW_START_M, HEFF_WINDOW_END_M)?;
        let ground = self
            .station
            .ground_elevation_m
            .unwrap_or(radial.elevations_m()[0]);
        Some(ground + self.station.structure_height_m.unwrap_or(0.0) - mean)
    }
}
