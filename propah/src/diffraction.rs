//! Terrain diffraction loss by Deygout's worst-obstacle cascade.
//!
//! The profile is first lifted by the earth bulge so that the ray
//! between both ends can be treated as a straight line over flat
//! earth. The cascade then finds the single most obstructive sample,
//! costs it as a knife edge, and recurses on both sub-paths it
//! creates. Losses are summed.
//!
//! # References
//!
//! 1. J. Deygout, "Multiple knife-edge diffraction of microwaves",
//!    IEEE Trans. Antennas Propag., 1966.
//! 1. [ITU-R P.526](https://www.itu.int/rec/R-REC-P.526), single knife-edge approximation.

use crate::{fresnel::kirchhoff_nu, PropahError, Station};
use log::{debug, trace};
use terrain::{ElevationProfile, K_FACTOR};

/// At or below this ν the first fresnel zone is clear enough for the
/// obstacle to be ignored.
pub const NU_CLEAR: f64 = -0.78;

/// Sub-paths spanning more samples than this are split across
/// threads.
const PAR_SPAN: usize = 4096;

/// Antenna heights used when a station does not record its own.
pub const DEFAULT_TX_HEIGHT_M: f64 = 30.0;
pub const DEFAULT_RX_HEIGHT_M: f64 = 10.0;
pub const DEFAULT_FREQ_MHZ: f64 = 100.0;

/// Returns the knife-edge diffraction loss (dB) for parameter `nu`.
///
/// Never negative.
pub fn knife_edge_loss_db(nu: f64) -> f64 {
    if nu <= NU_CLEAR {
        0.0
    } else if nu < 1.0 {
        let v = nu - 0.1;
        (6.9 + 20.0 * ((v * v + 1.0).sqrt() + v).log10()).max(0.0)
    } else {
        13.0 + 20.0 * nu.log10()
    }
}

/// Radio parameters of a point-to-point link.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub freq_mhz: f64,

    /// Transmitter antenna height above ground (meters).
    pub tx_height_agl_m: f64,

    /// Receiver antenna height above ground (meters).
    pub rx_height_agl_m: f64,

    /// Effective earth radius factor.
    pub k_factor: f64,
}

impl Link {
    pub fn new(freq_mhz: f64, tx_height_agl_m: f64, rx_height_agl_m: f64) -> Self {
        Self {
            freq_mhz,
            tx_height_agl_m,
            rx_height_agl_m,
            k_factor: K_FACTOR,
        }
    }

    #[must_use]
    pub fn k_factor(mut self, k_factor: f64) -> Self {
        self.k_factor = k_factor;
        self
    }

    /// Wavelength in meters, using the rounded `c = 3e8 m/s` of the
    /// diffraction literature.
    fn wavelength_m(&self) -> f64 {
        300.0 / self.freq_mhz
    }

    fn validate(&self) -> Result<(), PropahError> {
        if !(self.freq_mhz > 0.0) {
            return Err(PropahError::InvalidArgument(format!(
                "frequency must be positive, got {} MHz",
                self.freq_mhz
            )));
        }
        if !(self.k_factor > 0.0) {
            return Err(PropahError::InvalidArgument(format!(
                "k-factor must be positive, got {}",
                self.k_factor
            )));
        }
        Ok(())
    }
}

/// Returns the diffraction loss (dB) over `profile`.
pub fn deygout_loss_db(profile: &ElevationProfile, link: &Link) -> Result<f64, PropahError> {
    link.validate()?;
    let heights_m = profile.with_earth_bulge(link.k_factor);
    let last = heights_m.len() - 1;
    let h_tx = heights_m[0] + link.tx_height_agl_m;
    let h_rx = heights_m[last] + link.rx_height_agl_m;

    let now = std::time::Instant::now();
    let cascade = Cascade {
        distances_m: profile.distances_m(),
        heights_m: &heights_m,
        wavelength_m: link.wavelength_m(),
    };
    let loss_db = cascade.loss_db(0, last, h_tx, h_rx);
    debug!(
        "deygout; len: {}, loss: {loss_db:.2} dB, exec: {:?}",
        profile.len(),
        now.elapsed()
    );
    Ok(loss_db)
}

/// Like [`deygout_loss_db`], for raw samples handed over by a
/// raster-sampling collaborator.
///
/// Fewer than two samples is a degenerate path with no loss.
pub fn deygout_loss_db_from_samples(
    distances_m: &[f64],
    elevations_m: &[f64],
    link: &Link,
) -> Result<f64, PropahError> {
    if distances_m.len() == elevations_m.len() && distances_m.len() < 2 {
        link.validate()?;
        return Ok(0.0);
    }
    let profile = ElevationProfile::new(distances_m.to_vec(), elevations_m.to_vec())?;
    deygout_loss_db(&profile, link)
}

/// Result of a station-to-station diffraction study.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkLoss {
    pub loss_db: f64,
    pub distance_km: f64,
    pub sample_count: usize,
}

/// Diffraction loss between two stations over an externally sampled
/// `profile`.
///
/// Missing or zero frequency and antenna heights fall back to 100 MHz,
/// 30 m at the transmitter and 10 m at the receiver.
pub fn station_link_loss(
    tx: Option<&Station>,
    rx: Option<&Station>,
    profile: Option<&ElevationProfile>,
) -> Result<LinkLoss, PropahError> {
    let tx = tx.ok_or(PropahError::Precondition("transmitting station"))?;
    let rx = rx.ok_or(PropahError::Precondition("receiving station"))?;
    let profile = profile.ok_or(PropahError::Precondition("elevation profile"))?;
    let given = |value: Option<f64>| value.filter(|v| *v > 0.0);
    let link = Link::new(
        given(tx.frequency_mhz).unwrap_or(DEFAULT_FREQ_MHZ),
        given(tx.structure_height_m).unwrap_or(DEFAULT_TX_HEIGHT_M),
        given(rx.structure_height_m).unwrap_or(DEFAULT_RX_HEIGHT_M),
    );
    Ok(LinkLoss {
        loss_db: deygout_loss_db(profile, &link)?,
        distance_km: profile.distance_m() / 1e3,
        sample_count: profile.len(),
    })
}

struct Cascade<'a> {
    distances_m: &'a [f64],

    /// Bulge-corrected terrain heights.
    heights_m: &'a [f64],

    wavelength_m: f64,
}

impl Cascade<'_> {
    /// Loss over samples `start..=end`, where the path endpoints sit at
    /// `h_start` and `h_end` meters.
    fn loss_db(&self, start: usize, end: usize, h_start: f64, h_end: f64) -> f64 {
        if end - start < 2 {
            return 0.0;
        }
        let d_start = self.distances_m[start];
        let d_total = self.distances_m[end] - d_start;
        if d_total <= 1e-3 {
            return 0.0;
        }

        let (idx, nu) = self.worst_obstacle(start, end, h_start, h_end, d_total);
        if nu <= NU_CLEAR {
            return 0.0;
        }

        let h_obstacle = self.heights_m[idx];
        trace!("deygout; span: {start}..={end}, obstacle: {idx}, nu: {nu:.3}");
        let (left, right) = if end - start > PAR_SPAN {
            rayon::join(
                || self.loss_db(start, idx, h_start, h_obstacle),
                || self.loss_db(idx, end, h_obstacle, h_end),
            )
        } else {
            (
                self.loss_db(start, idx, h_start, h_obstacle),
                self.loss_db(idx, end, h_obstacle, h_end),
            )
        };
        knife_edge_loss_db(nu) + left + right
    }

    /// Returns the index and ν of the interior sample with the highest
    /// ν, the earliest one on ties.
    fn worst_obstacle(
        &self,
        start: usize,
        end: usize,
        h_start: f64,
        h_end: f64,
        d_total: f64,
    ) -> (usize, f64) {
        let d_start = self.distances_m[start];
        let mut worst = (start + 1, f64::NEG_INFINITY);
        for idx in start + 1..end {
            let d1 = self.distances_m[idx] - d_start;
            let d2 = d_total - d1;
            let h_los = h_start + (h_end - h_start) * (d1 / d_total);
            let nu = kirchhoff_nu(self.heights_m[idx] - h_los, d1, d2, self.wavelength_m);
            if nu > worst.1 {
                worst = (idx, nu);
            }
        }
        worst
    }
}

#[cfg(test)]
mod tests {
    use super::{
        deygout_loss_db, deygout_loss_db_from_samples, knife_edge_loss_db, station_link_loss,
        Link,
    };
    use crate::{PropahError, Station};
    use approx::assert_relative_eq;
    use terrain::ElevationProfile;

    #[test]
    fn test_knife_edge_regions() {
        assert_eq!(knife_edge_loss_db(-5.0), 0.0);
        assert_eq!(knife_edge_loss_db(-0.78), 0.0);
        assert_relative_eq!(knife_edge_loss_db(-0.5), 1.959_249_706_228_176_2, epsilon = 1e-9);
        assert_relative_eq!(knife_edge_loss_db(0.0), 6.032_852_208_563_606, epsilon = 1e-9);
        assert_relative_eq!(knife_edge_loss_db(0.5), 10.287_803_742_475_84, epsilon = 1e-9);
        assert_relative_eq!(knife_edge_loss_db(1.0), 13.0);
        assert_relative_eq!(knife_edge_loss_db(2.0), 19.020_599_913_279_625, epsilon = 1e-9);
        assert_relative_eq!(knife_edge_loss_db(10.0), 33.0);
    }

    #[test]
    fn test_knife_edge_never_negative() {
        assert!((-200..=200)
            .map(|i| f64::from(i) * 0.01)
            .all(|nu| knife_edge_loss_db(nu) >= 0.0));
    }

    #[test]
    fn test_flat_clear_path_has_no_loss() {
        let profile = ElevationProfile::uniform(1_000.0, 1000, |_, _| 100.0).unwrap();
        let loss = deygout_loss_db(&profile, &Link::new(100.0, 30.0, 10.0)).unwrap();
        assert_eq!(loss, 0.0);
    }

    #[test]
    fn test_single_obstacle() {
        let profile = ElevationProfile::uniform(50e3, 1000, |idx, _| {
            if idx == 500 {
                300.0
            } else {
                100.0
            }
        })
        .unwrap();
        let loss = deygout_loss_db(&profile, &Link::new(100.0, 30.0, 10.0)).unwrap();
        assert!(loss > 0.0);
        assert_relative_eq!(loss, 4_518.077_148_543_095, max_relative = 1e-9);
    }

    #[test]
    fn test_three_sample_knife_edge() {
        let loss = deygout_loss_db_from_samples(
            &[0.0, 500.0, 1000.0],
            &[0.0, 50.0, 0.0],
            &Link::new(100.0, 10.0, 10.0),
        )
        .unwrap();
        assert_relative_eq!(loss, 19.304_081_908_379_597, max_relative = 1e-9);
    }

    #[test]
    fn test_obstacle_adds_loss() {
        let flat = ElevationProfile::uniform(1_000.0, 101, |_, _| 100.0).unwrap();
        let ridge =
            ElevationProfile::uniform(1_000.0, 101, |idx, _| if idx == 40 { 160.0 } else { 100.0 })
                .unwrap();
        let link = Link::new(450.0, 20.0, 20.0);
        let clear = deygout_loss_db(&flat, &link).unwrap();
        let blocked = deygout_loss_db(&ridge, &link).unwrap();
        assert_eq!(clear, 0.0);
        assert!(blocked > clear);
    }

    #[test]
    fn test_degenerate_samples() {
        let link = Link::new(100.0, 30.0, 10.0);
        assert_eq!(deygout_loss_db_from_samples(&[], &[], &link), Ok(0.0));
        assert_eq!(deygout_loss_db_from_samples(&[0.0], &[5.0], &link), Ok(0.0));
        assert!(matches!(
            deygout_loss_db_from_samples(&[0.0, 1.0], &[5.0], &link),
            Err(PropahError::Terrain(_))
        ));
    }

    #[test]
    fn test_invalid_frequency() {
        let profile = ElevationProfile::uniform(1_000.0, 10, |_, _| 0.0).unwrap();
        let err = deygout_loss_db(&profile, &Link::new(0.0, 30.0, 10.0)).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_station_link_loss() {
        let tx = Station {
            lat: -23.0,
            lon: -47.0,
            ground_elevation_m: None,
            structure_height_m: None,
            frequency_mhz: None,
        };
        let profile = ElevationProfile::uniform(1_000.0, 1000, |_, _| 100.0).unwrap();
        let result = station_link_loss(Some(&tx), Some(&tx), Some(&profile)).unwrap();
        assert_eq!(result.loss_db, 0.0);
        assert_eq!(result.sample_count, 1000);
        assert_relative_eq!(result.distance_km, 1.0, epsilon = 1e-9);

        assert_eq!(
            station_link_loss(Some(&tx), Some(&tx), None),
            Err(PropahError::Precondition("elevation profile"))
        );
    }

    #[test]
    fn test_station_link_loss_zero_means_default() {
        let unset = Station {
            lat: -23.0,
            lon: -47.0,
            ground_elevation_m: None,
            structure_height_m: None,
            frequency_mhz: None,
        };
        let zeroed = Station {
            structure_height_m: Some(0.0),
            frequency_mhz: Some(0.0),
            ..unset
        };
        let profile =
            ElevationProfile::uniform(10_000.0, 101, |idx, _| if idx == 50 { 80.0 } else { 0.0 })
                .unwrap();

        let expected = deygout_loss_db(&profile, &Link::new(100.0, 30.0, 10.0)).unwrap();
        assert!(expected > 0.0);
        let result = station_link_loss(Some(&zeroed), Some(&zeroed), Some(&profile)).unwrap();
        assert_relative_eq!(result.loss_db, expected);
        assert_eq!(
            station_link_loss(Some(&unset), Some(&unset), Some(&profile)),
            Ok(result)
        );
    }
}
