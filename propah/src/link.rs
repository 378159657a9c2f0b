use crate::{
    error::PropahError,
    fresnel::{fresnel_radius_m, wavelength_m},
};
use geo::Point;
use terrain::{earth_bulge_m, geodesic, ElevationProfile, K_FACTOR};

/// Line-of-sight and first fresnel zone clearance along a link.
///
/// All vectors are indexed like the source profile and are expressed
/// in a flat-earth frame: the earth bulge has been added to terrain,
/// so the line of sight is a straight line.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkProfile {
    /// Distance of each sample from the transmitter (meters).
    pub distances_m: Vec<f64>,

    /// Earth bulge at each sample.
    pub bulge_m: Vec<f64>,

    /// Ground elevation plus earth bulge.
    pub terrain_elev_m: Vec<f64>,

    /// A straight line from the transmitting antenna to the receiving
    /// antenna.
    pub los_elev_m: Vec<f64>,

    /// First fresnel zone radius.
    pub fresnel_zone_m: Vec<f64>,
}

/// The point where the first fresnel zone is most obstructed.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstruction {
    /// True when terrain intrudes into the first fresnel zone.
    pub exists: bool,

    pub at_m: f64,

    /// `los - r1 - terrain` at `at_m`, negative when obstructed.
    pub clearance_min_m: f64,

    /// Clearance in units of the local first fresnel zone radius.
    pub worst_f1: f64,
}

/// Summary figures shown alongside a link profile.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkMetrics {
    pub distance_m: f64,

    /// Initial azimuth from transmitter to receiver (degrees).
    pub azimuth_deg: f64,

    /// Elevation angle of the line of sight (degrees).
    pub elevation_angle_deg: f64,

    pub obstruction: Obstruction,
}

impl LinkProfile {
    pub fn builder() -> LinkProfileBuilder {
        LinkProfileBuilder {
            freq_mhz: None,
            start_alt_m: 0.0,
            end_alt_m: 0.0,
            k_factor: K_FACTOR,
        }
    }

    pub fn distance_m(&self) -> f64 {
        self.distances_m[self.distances_m.len() - 1]
    }

    pub fn obstruction(&self) -> Obstruction {
        let (idx, clearance_min_m) = self
            .los_elev_m
            .iter()
            .zip(&self.fresnel_zone_m)
            .zip(&self.terrain_elev_m)
            .map(|((los, r1), terrain)| los - r1 - terrain)
            .enumerate()
            .fold((0, f64::INFINITY), |worst, (idx, clearance)| {
                if clearance < worst.1 {
                    (idx, clearance)
                } else {
                    worst
                }
            });
        let r1 = self.fresnel_zone_m[idx];
        let denom = if r1 == 0.0 { 1e-9 } else { r1 };
        Obstruction {
            exists: clearance_min_m < 0.0,
            at_m: self.distances_m[idx],
            clearance_min_m,
            worst_f1: clearance_min_m / denom,
        }
    }

    /// Returns header metrics for a link from `tx` to `rx`.
    pub fn metrics(&self, tx: Point<f64>, rx: Point<f64>) -> LinkMetrics {
        let distance_m = self.distance_m();
        let last = self.los_elev_m.len() - 1;
        let rise_m = self.los_elev_m[last] - self.los_elev_m[0];
        LinkMetrics {
            distance_m,
            azimuth_deg: geodesic::azimuth_deg(tx, rx),
            elevation_angle_deg: rise_m.atan2(distance_m).to_degrees(),
            obstruction: self.obstruction(),
        }
    }
}

pub struct LinkProfileBuilder {
    /// Carrier frequency (MHz, required).
    freq_mhz: Option<f64>,

    /// Transmitting antenna height above ground (meters, defaults to 0).
    start_alt_m: f64,

    /// Receiving antenna height above ground (meters, defaults to 0).
    end_alt_m: f64,

    /// Effective earth radius factor (defaults to 4/3).
    k_factor: f64,
}

impl LinkProfileBuilder {
    /// Carrier frequency (MHz, required).
    #[must_use]
    pub fn freq(mut self, freq_mhz: f64) -> Self {
        self.freq_mhz = Some(freq_mhz);
        self
    }

    /// Transmitting antenna height above ground (meters, defaults to 0).
    #[must_use]
    pub fn start_alt(mut self, meters: f64) -> Self {
        self.start_alt_m = meters;
        self
    }

    /// Receiving antenna height above ground (meters, defaults to 0).
    #[must_use]
    pub fn end_alt(mut self, meters: f64) -> Self {
        self.end_alt_m = meters;
        self
    }

    /// Effective earth radius factor (defaults to 4/3).
    #[must_use]
    pub fn k_factor(mut self, k_factor: f64) -> Self {
        self.k_factor = k_factor;
        self
    }

    pub fn build(&self, profile: &ElevationProfile) -> Result<LinkProfile, PropahError> {
        let freq_mhz = self.freq_mhz.ok_or(PropahError::Builder("freq"))?;
        if !(freq_mhz > 0.0) {
            return Err(PropahError::InvalidArgument(format!(
                "frequency must be positive, got {freq_mhz} MHz"
            )));
        }
        if !(self.k_factor > 0.0) {
            return Err(PropahError::InvalidArgument(format!(
                "k-factor must be positive, got {}",
                self.k_factor
            )));
        }

        let origin_m = profile.distances_m()[0];
        let distances_m: Vec<f64> = profile.distances_m().iter().map(|d| d - origin_m).collect();
        let total_m = profile.distance_m();
        let ground_m = profile.elevations_m();
        let last = ground_m.len() - 1;

        let bulge_m: Vec<f64> = distances_m
            .iter()
            .map(|&d| earth_bulge_m(d, total_m, self.k_factor))
            .collect();
        let terrain_elev_m: Vec<f64> = ground_m.iter().zip(&bulge_m).map(|(g, b)| g + b).collect();

        let tx_m = bulge_m[0] + ground_m[0] + self.start_alt_m;
        let rx_m = bulge_m[last] + ground_m[last] + self.end_alt_m;
        let los_elev_m = distances_m
            .iter()
            .map(|&d| tx_m + (rx_m - tx_m) * (d / total_m))
            .collect();

        let wavelen = wavelength_m(freq_mhz);
        let fresnel_zone_m = distances_m
            .iter()
            .map(|&d1| fresnel_radius_m(1, wavelen, d1, total_m - d1))
            .collect();

        Ok(LinkProfile {
            distances_m,
            bulge_m,
            terrain_elev_m,
            los_elev_m,
            fresnel_zone_m,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::LinkProfile;
    use crate::PropahError;
    use approx::assert_relative_eq;
    use geo::point;
    use terrain::ElevationProfile;

    #[test]
    fn test_clear_link() {
        let profile = ElevationProfile::uniform(1_000.0, 11, |_, _| 100.0).unwrap();
        let link = LinkProfile::builder()
            .freq(900.0)
            .start_alt(30.0)
            .end_alt(30.0)
            .build(&profile)
            .unwrap();

        assert_eq!(link.fresnel_zone_m[0], 0.0);
        assert_eq!(link.fresnel_zone_m[10], 0.0);
        assert_relative_eq!(link.fresnel_zone_m[5], 9.125_551_094_469_735, max_relative = 1e-9);
        assert_relative_eq!(link.los_elev_m[0], 130.0);
        assert_relative_eq!(link.los_elev_m[10], 130.0);

        let obstruction = link.obstruction();
        assert!(!obstruction.exists);
        assert!(obstruction.clearance_min_m > 0.0);
    }

    #[test]
    fn test_obstructed_link() {
        let profile =
            ElevationProfile::uniform(1_000.0, 11, |idx, _| if idx == 4 { 125.0 } else { 100.0 })
                .unwrap();
        let link = LinkProfile::builder()
            .freq(900.0)
            .start_alt(30.0)
            .end_alt(30.0)
            .build(&profile)
            .unwrap();
        let obstruction = link.obstruction();
        assert!(obstruction.exists);
        assert_relative_eq!(obstruction.at_m, 400.0, epsilon = 1e-9);
        assert!(obstruction.clearance_min_m < 0.0);
        assert!(obstruction.worst_f1 < 0.0 && obstruction.worst_f1 > -1.0);
    }

    #[test]
    fn test_metrics() {
        let profile = ElevationProfile::uniform(10_000.0, 101, |_, _| 0.0).unwrap();
        let link = LinkProfile::builder()
            .freq(100.0)
            .start_alt(10.0)
            .end_alt(110.0)
            .build(&profile)
            .unwrap();
        let metrics = link.metrics(point!(x: 0.0, y: 0.0), point!(x: 0.0, y: 0.09));
        assert_relative_eq!(metrics.azimuth_deg, 0.0, epsilon = 1e-9);
        assert_relative_eq!(
            metrics.elevation_angle_deg,
            100_f64.atan2(10_000.0).to_degrees(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_builder_errors() {
        let profile = ElevationProfile::uniform(1_000.0, 11, |_, _| 0.0).unwrap();
        assert_eq!(
            LinkProfile::builder().build(&profile),
            Err(PropahError::Builder("freq"))
        );
        assert!(LinkProfile::builder()
            .freq(-1.0)
            .build(&profile)
            .unwrap_err()
            .is_invalid_argument());
    }
}
