use crate::{earth_bulge_m, geodesic::GeodesicIter, linspace, TerrainError};
use geo::geometry::Point;
use log::debug;

/// Ground elevation sampled along a straight path between two
/// endpoints.
///
/// Distances are strictly increasing and there are always at least
/// two samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationProfile {
    /// Distance of each sample from the start of the path (meters).
    distances_m: Vec<f64>,

    /// Ground elevation above mean sea level at each sample (meters).
    elevations_m: Vec<f64>,
}

impl ElevationProfile {
    pub fn new(distances_m: Vec<f64>, elevations_m: Vec<f64>) -> Result<Self, TerrainError> {
        if distances_m.len() != elevations_m.len() {
            return Err(TerrainError::ProfileShape {
                distances: distances_m.len(),
                elevations: elevations_m.len(),
            });
        }
        if distances_m.len() < 2 {
            return Err(TerrainError::ProfileLen(distances_m.len()));
        }
        if let Some(idx) = distances_m
            .windows(2)
            .position(|w| !(w[1] > w[0]))
            .map(|idx| idx + 1)
        {
            return Err(TerrainError::ProfileOrder(idx));
        }
        Ok(Self {
            distances_m,
            elevations_m,
        })
    }

    /// Builds a profile from `(distance_m, elevation_m)` pairs.
    pub fn from_samples<I>(samples: I) -> Result<Self, TerrainError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let (distances_m, elevations_m) = samples.into_iter().unzip();
        Self::new(distances_m, elevations_m)
    }

    /// Builds a profile of `n` evenly spaced samples over
    /// `distance_m`, with elevations supplied by `elevation`.
    pub fn uniform<F>(distance_m: f64, n: usize, elevation: F) -> Result<Self, TerrainError>
    where
        F: Fn(usize, f64) -> f64,
    {
        Self::from_samples(
            linspace(0.0, distance_m, n)
                .enumerate()
                .map(|(idx, d)| (d, elevation(idx, d))),
        )
    }

    pub fn distances_m(&self) -> &[f64] {
        &self.distances_m
    }

    pub fn elevations_m(&self) -> &[f64] {
        &self.elevations_m
    }

    pub fn len(&self) -> usize {
        self.distances_m.len()
    }

    /// Always false, a profile has at least two samples.
    pub fn is_empty(&self) -> bool {
        self.distances_m.is_empty()
    }

    /// Path length from first to last sample (meters).
    pub fn distance_m(&self) -> f64 {
        self.distances_m[self.len() - 1] - self.distances_m[0]
    }

    /// Returns `(distance_m, elevation_m)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.distances_m
            .iter()
            .copied()
            .zip(self.elevations_m.iter().copied())
    }

    /// Returns the elevations with the earth bulge added, turning a
    /// curved-earth/straight-ray geometry into a flat-earth one.
    pub fn with_earth_bulge(&self, k_factor: f64) -> Vec<f64> {
        let start_m = self.distances_m[0];
        let total_m = self.distance_m();
        self.iter()
            .map(|(d, elev)| elev + earth_bulge_m(d - start_m, total_m, k_factor))
            .collect()
    }

    /// Mean elevation of the samples whose distance falls within
    /// `[start_m, end_m]`, or `None` if there are none.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_elevation_between(&self, start_m: f64, end_m: f64) -> Option<f64> {
        let (sum, count) = self
            .iter()
            .filter(|(d, _)| (start_m..=end_m).contains(d))
            .fold((0.0, 0_usize), |(sum, count), (_, elev)| {
                (sum + elev, count + 1)
            });
        (count > 0).then(|| sum / count as f64)
    }
}

/// A source of ground elevation, typically backed by DEM rasters.
///
/// `None` means the source has no data for `point`; profiles treat
/// such samples as sea level, the same way a missing raster tile is
/// treated.
pub trait ElevationSource {
    fn elevation_m(&self, point: Point<f64>) -> Option<f64>;
}

impl<F> ElevationSource for F
where
    F: Fn(Point<f64>) -> Option<f64>,
{
    fn elevation_m(&self, point: Point<f64>) -> Option<f64> {
        self(point)
    }
}

/// An elevation profile together with the path it was sampled along.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Location of each step along the geodesic from `start` to
    /// `end`.
    pub great_circle: Vec<Point<f64>>,

    /// Terrain elevation at each step.
    pub terrain: ElevationProfile,
}

impl Profile {
    pub fn builder() -> ProfileBuilder {
        ProfileBuilder {
            start: None,
            max_step_m: None,
            end: None,
        }
    }
}

pub struct ProfileBuilder {
    start: Option<Point<f64>>,

    /// Maximum distance between samples (meters).
    max_step_m: Option<f64>,

    end: Option<Point<f64>>,
}

impl ProfileBuilder {
    /// Start point of the path (required).
    #[must_use]
    pub fn start(mut self, point: Point<f64>) -> Self {
        self.start = Some(point);
        self
    }

    /// Maximum distance between samples (meters, required).
    #[must_use]
    pub fn max_step(mut self, meters: f64) -> Self {
        self.max_step_m = Some(meters);
        self
    }

    /// End point of the path (required).
    #[must_use]
    pub fn end(mut self, point: Point<f64>) -> Self {
        self.end = Some(point);
        self
    }

    pub fn build<S>(&self, source: &S) -> Result<Profile, TerrainError>
    where
        S: ElevationSource + ?Sized,
    {
        let start = self.start.ok_or(TerrainError::Builder("start"))?;
        let max_step_m = self.max_step_m.ok_or(TerrainError::Builder("max_step"))?;
        let end = self.end.ok_or(TerrainError::Builder("end"))?;
        if !(max_step_m > 0.0) {
            return Err(TerrainError::InvalidArgument(format!(
                "max_step must be positive, got {max_step_m}"
            )));
        }

        let now = std::time::Instant::now();
        let path = GeodesicIter::new(start, max_step_m, end);
        let mut great_circle = Vec::with_capacity(path.len());
        let mut distances_m = Vec::with_capacity(path.len());
        let mut elevations_m = Vec::with_capacity(path.len());
        let mut missing = 0_usize;
        for (d_m, point) in path {
            let elevation = source.elevation_m(point).unwrap_or_else(|| {
                missing += 1;
                0.0
            });
            great_circle.push(point);
            distances_m.push(d_m);
            elevations_m.push(elevation);
        }
        let terrain = ElevationProfile::new(distances_m, elevations_m)?;

        debug!(
            "profile; len: {}, missing: {}, exec: {:?}",
            great_circle.len(),
            missing,
            now.elapsed()
        );

        Ok(Profile {
            great_circle,
            terrain,
        })
    }
}
