//! Call contract for ITU-R P.1546 style point-to-area models.
//!
//! The model numerics live elsewhere; this module only fixes what goes
//! in and what comes out, and adapts any compliant model into a
//! [`FieldModel`].

use crate::{
    field::{db_to_linear, FieldModel},
    PropahError, StationSetup,
};
use terrain::ElevationProfile;

/// Transmitter-side representative clutter height (meters).
pub const TX_CLUTTER_HEIGHT_M: f64 = 10.0;

/// Receiving environment.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Rural,
    Urban,
    DenseUrban,
}

impl Environment {
    /// Representative clutter height around the receiver (meters).
    pub fn clutter_height_m(self) -> f64 {
        match self {
            Self::Rural => 10.0,
            Self::Urban => 20.0,
            Self::DenseUrban => 30.0,
        }
    }
}

/// Propagation path medium.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathKind {
    #[default]
    Land,
    Sea,
    Warm,
    Cold,
}

/// A single point-to-area prediction request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct P1546Query {
    pub freq_mhz: f64,

    /// Percentage of time (1 to 50).
    pub time_pct: f64,

    /// Transmitter effective height (meters), see
    /// [`StationSetup::effective_height_m`](crate::StationSetup::effective_height_m).
    pub tx_eff_height_m: f64,

    /// Receiver antenna height above ground (meters).
    pub rx_height_m: f64,

    /// Representative clutter height around the transmitter (meters).
    pub tx_clutter_m: f64,

    /// Representative clutter height around the receiver (meters).
    pub rx_clutter_m: f64,

    pub distance_km: f64,
    pub environment: Environment,
    pub path: PathKind,

    /// Percentage of locations (1 to 99).
    pub location_pct: f64,

    pub erp_kw: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldEstimate {
    pub field_strength_dbuvm: f64,
    pub path_loss_db: f64,
}

/// A point-to-area propagation model.
pub trait PointToArea {
    fn estimate(&self, query: &P1546Query) -> Result<FieldEstimate, PropahError>;
}

/// Everything in a [`P1546Query`] but the distance and power, which
/// vary per sample.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct P1546Settings {
    pub freq_mhz: f64,
    pub time_pct: f64,
    pub tx_eff_height_m: f64,
    pub rx_height_m: f64,
    pub environment: Environment,
    pub path: PathKind,
    pub location_pct: f64,
}

impl P1546Settings {
    /// Median (50% time, 50% locations) settings for a 10 m receiver
    /// over rural land.
    pub fn new(freq_mhz: f64, tx_eff_height_m: f64) -> Self {
        Self {
            freq_mhz,
            time_pct: 50.0,
            tx_eff_height_m,
            rx_height_m: 10.0,
            environment: Environment::Rural,
            path: PathKind::Land,
            location_pct: 50.0,
        }
    }

    /// Median settings for `setup`, with the effective height taken
    /// along `radial`.
    pub fn for_station(
        setup: &StationSetup,
        radial: &ElevationProfile,
    ) -> Result<Self, PropahError> {
        let freq_mhz = setup
            .station
            .frequency_mhz
            .ok_or(PropahError::Precondition("station frequency"))?;
        let tx_eff_height_m = setup.effective_height_m(radial).ok_or_else(|| {
            PropahError::InvalidArgument(format!(
                "radial of {:.1} km has no terrain between 3 and 15 km",
                radial.distance_m() / 1e3
            ))
        })?;
        Ok(Self::new(freq_mhz, tx_eff_height_m))
    }

    pub fn query(&self, distance_km: f64, erp_kw: f64) -> P1546Query {
        P1546Query {
            freq_mhz: self.freq_mhz,
            time_pct: self.time_pct,
            tx_eff_height_m: self.tx_eff_height_m,
            rx_height_m: self.rx_height_m,
            tx_clutter_m: TX_CLUTTER_HEIGHT_M,
            rx_clutter_m: self.environment.clutter_height_m(),
            distance_km,
            environment: self.environment,
            path: self.path,
            location_pct: self.location_pct,
            erp_kw,
        }
    }
}

/// Adapts a [`PointToArea`] model into a [`FieldModel`].
///
/// The sentinel semantics of the closed-form law are kept: the model
/// is never asked about zero distance or zero power.
#[derive(Debug, Clone)]
pub struct PointToAreaField<M> {
    model: M,
    settings: P1546Settings,
}

impl<M> PointToAreaField<M> {
    pub fn new(model: M, settings: P1546Settings) -> Self {
        Self { model, settings }
    }

    pub fn settings(&self) -> &P1546Settings {
        &self.settings
    }
}

impl<M: PointToArea> FieldModel for PointToAreaField<M> {
    fn field_strength_dbuvm(&self, erp_dbw: f64, distance_km: f64) -> Result<f64, PropahError> {
        if distance_km <= 0.0 {
            return Ok(f64::INFINITY);
        }
        let erp_kw = db_to_linear(erp_dbw) / 1000.0;
        if erp_kw <= 0.0 {
            return Ok(f64::NEG_INFINITY);
        }
        let estimate = self
            .model
            .estimate(&self.settings.query(distance_km, erp_kw))?;
        Ok(estimate.field_strength_dbuvm)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{
        Environment, FieldEstimate, P1546Query, P1546Settings, PointToArea, PointToAreaField,
    };
    use crate::{field::FieldModel, PropahError, Station, StationSetup};
    use approx::assert_relative_eq;
    use std::sync::Mutex;
    use terrain::ElevationProfile;

    /// Remembers the last query it was asked.
    #[derive(Default)]
    struct Recorder(Mutex<Option<P1546Query>>);

    impl PointToArea for Recorder {
        fn estimate(&self, q: &P1546Query) -> Result<FieldEstimate, PropahError> {
            if let Ok(mut last) = self.0.lock() {
                *last = Some(*q);
            }
            SteepModel.estimate(q)
        }
    }

    /// Stand-in model: 1 kW reference field falling 30 dB per decade,
    /// which refuses distances beyond 1000 km like a real model does.
    pub(crate) struct SteepModel;

    impl PointToArea for SteepModel {
        fn estimate(&self, q: &P1546Query) -> Result<FieldEstimate, PropahError> {
            if q.distance_km > 1000.0 {
                return Err(PropahError::Model(format!(
                    "distance {} km out of range",
                    q.distance_km
                )));
            }
            let field = 106.92 + 10.0 * q.erp_kw.log10() - 30.0 * q.distance_km.log10();
            Ok(FieldEstimate {
                field_strength_dbuvm: field,
                path_loss_db: 139.3 - field + 20.0 * q.freq_mhz.log10(),
            })
        }
    }

    #[test]
    fn test_clutter_heights() {
        assert_eq!(Environment::Rural.clutter_height_m(), 10.0);
        assert_eq!(Environment::Urban.clutter_height_m(), 20.0);
        assert_eq!(Environment::DenseUrban.clutter_height_m(), 30.0);
    }

    #[test]
    fn test_adapter_forwards_query() {
        let settings = P1546Settings {
            environment: Environment::Urban,
            ..P1546Settings::new(100.0, 150.0)
        };
        let model = PointToAreaField::new(Recorder::default(), settings);
        assert_relative_eq!(
            model.field_strength_dbuvm(30.0, 10.0).unwrap(),
            76.92,
            epsilon = 1e-9
        );

        let query = model.model.0.lock().unwrap().take().unwrap();
        assert_eq!(query.freq_mhz, 100.0);
        assert_eq!(query.tx_eff_height_m, 150.0);
        assert_eq!(query.distance_km, 10.0);
        assert_relative_eq!(query.erp_kw, 1.0, max_relative = 1e-12);
        assert_eq!(query.tx_clutter_m, 10.0);
        assert_eq!(query.rx_clutter_m, 20.0);
    }

    #[test]
    fn test_settings_for_station() {
        let setup = StationSetup {
            station: Station {
                lat: -23.0,
                lon: -47.0,
                ground_elevation_m: Some(700.0),
                structure_height_m: Some(50.0),
                frequency_mhz: Some(98.1),
            },
            transmitter: None,
            antenna: None,
            feedline: None,
        };
        let radial = ElevationProfile::uniform(20e3, 21, |_, _| 600.0).unwrap();
        let settings = P1546Settings::for_station(&setup, &radial).unwrap();
        assert_eq!(settings.freq_mhz, 98.1);
        assert_relative_eq!(settings.tx_eff_height_m, 150.0, epsilon = 1e-9);

        let short = ElevationProfile::uniform(2e3, 3, |_, _| 600.0).unwrap();
        assert!(P1546Settings::for_station(&setup, &short)
            .unwrap_err()
            .is_invalid_argument());

        let untuned = StationSetup {
            station: Station {
                frequency_mhz: None,
                ..setup.station
            },
            ..setup
        };
        assert_eq!(
            P1546Settings::for_station(&untuned, &radial),
            Err(PropahError::Precondition("station frequency"))
        );
    }

    #[test]
    fn test_adapter_sentinels() {
        let model = PointToAreaField::new(SteepModel, P1546Settings::new(100.0, 150.0));
        assert_eq!(model.field_strength_dbuvm(30.0, 0.0), Ok(f64::INFINITY));
        assert_eq!(
            model.field_strength_dbuvm(f64::NEG_INFINITY, 10.0),
            Ok(f64::NEG_INFINITY)
        );
    }

    #[test]
    fn test_adapter_surfaces_model_errors() {
        let model = PointToAreaField::new(SteepModel, P1546Settings::new(100.0, 150.0));
        assert!(matches!(
            model.field_strength_dbuvm(30.0, 2000.0),
            Err(PropahError::Model(_))
        ));
    }
}
