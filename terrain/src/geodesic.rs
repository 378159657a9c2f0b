//! Ellipsoidal (WGS84) geodesic routines.
//!
//! Spherical approximations accumulate hundreds of meters of error
//! over a 200 km radial, so every forward/inverse problem here is
//! solved on the ellipsoid.
//!
//! Points follow the [geo] convention: `x` is longitude and `y` is
//! latitude, both in degrees.

use crate::TerrainError;
use geo::{Coord, LineString, Point};
use geographiclib_rs::{DirectGeodesic, Geodesic, InverseGeodesic};
use std::sync::OnceLock;

fn wgs84() -> &'static Geodesic {
    static WGS84: OnceLock<Geodesic> = OnceLock::new();
    WGS84.get_or_init(Geodesic::wgs84)
}

/// Returns the point reached after travelling `distance_km` from
/// `origin` with initial azimuth `azimuth_deg` (clockwise from north).
pub fn destination(origin: Point<f64>, azimuth_deg: f64, distance_km: f64) -> Point<f64> {
    let (lat, lon): (f64, f64) =
        wgs84().direct(origin.y(), origin.x(), azimuth_deg, distance_km * 1e3);
    Point::new(lon, lat)
}

/// Returns the geodesic distance in kilometers between `a` and `b`.
pub fn distance_km(a: Point<f64>, b: Point<f64>) -> f64 {
    let s12_m: f64 = wgs84().inverse(a.y(), a.x(), b.y(), b.x());
    s12_m / 1e3
}

/// Returns the initial azimuth, in degrees `[0, 360)`, of the
/// geodesic from `a` to `b`.
pub fn azimuth_deg(a: Point<f64>, b: Point<f64>) -> f64 {
    let (_s12, azi1, _azi2, _a12): (f64, f64, f64, f64) =
        wgs84().inverse(a.y(), a.x(), b.y(), b.x());
    azi1.rem_euclid(360.0)
}

/// Returns every `step_deg`-th azimuth in `[0, 360)`, ascending.
///
/// `step_deg` must evenly divide 360 so that the full circle is
/// covered without a residual wedge.
pub fn radials(step_deg: i32) -> Result<Vec<u16>, TerrainError> {
    if step_deg <= 0 || 360 % step_deg != 0 {
        return Err(TerrainError::RadialStep(step_deg));
    }
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let step = step_deg as u16;
    Ok((0..360).step_by(step.into()).collect())
}

/// Returns a closed ring through `points`, in order.
///
/// The first point is repeated at the end unless `points` is already
/// closed.
pub fn closed_ring(points: &[Point<f64>]) -> Result<LineString<f64>, TerrainError> {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(TerrainError::EmptyRing),
    };
    let mut coords: Vec<Coord<f64>> = points.iter().map(|p| p.0).collect();
    if first != last {
        coords.push(first.0);
    }
    Ok(LineString::new(coords))
}

/// An iterator over equally spaced points along the geodesic between
/// two endpoints, yielding `(distance_m, point)` pairs.
///
/// Both endpoints are always included.
pub struct GeodesicIter {
    start: Point<f64>,
    azimuth_deg: f64,
    step_m: f64,
    total_m: f64,
    current: usize,
    len: usize,
}

impl GeodesicIter {
    /// Returns a new iterator whose steps are no longer than
    /// `max_step_m`.
    ///
    /// A step that is not a positive number yields only the two
    /// endpoints.
    pub fn new(start: Point<f64>, max_step_m: f64, end: Point<f64>) -> Self {
        let (total_m, azi1, _azi2, _a12): (f64, f64, f64, f64) =
            wgs84().inverse(start.y(), start.x(), end.y(), end.x());
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let steps = if max_step_m > 0.0 {
            ((total_m / max_step_m).ceil() as usize).max(1)
        } else {
            1
        };
        #[allow(clippy::cast_precision_loss)]
        let step_m = total_m / steps as f64;
        Self {
            start,
            azimuth_deg: azi1,
            step_m,
            total_m,
            current: 0,
            len: steps.saturating_add(1),
        }
    }

    /// Distance between consecutive points in meters.
    pub fn step_m(&self) -> f64 {
        self.step_m
    }

    /// Total path length in meters.
    pub fn total_m(&self) -> f64 {
        self.total_m
    }
}

impl Iterator for GeodesicIter {
    type Item = (f64, Point<f64>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.len {
            return None;
        }
        // Pin the last sample to the exact path length to avoid
        // accumulating rounding error in the final distance.
        #[allow(clippy::cast_precision_loss)]
        let d_m = if self.current + 1 == self.len {
            self.total_m
        } else {
            self.current as f64 * self.step_m
        };
        self.current += 1;
        Some((d_m, destination(self.start, self.azimuth_deg, d_m / 1e3)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.current;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GeodesicIter {}

#[cfg(test)]
mod tests {
    use super::{azimuth_deg, closed_ring, destination, distance_km, radials, GeodesicIter};
    use crate::TerrainError;
    use approx::assert_relative_eq;
    use geo::point;

    // a * pi / 180 for the WGS84 semi-major axis.
    const EQUATOR_DEG_KM: f64 = 111.319_490_793_273_57;
    // Meridian arc from the equator to 1°N on WGS84.
    const MERIDIAN_DEG_KM: f64 = 110.574_388_557_797_53;

    #[test]
    fn test_distance_is_ellipsoidal() {
        let origin = point!(x: 0.0, y: 0.0);
        assert_relative_eq!(
            distance_km(origin, point!(x: 1.0, y: 0.0)),
            EQUATOR_DEG_KM,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            distance_km(origin, point!(x: 0.0, y: 1.0)),
            MERIDIAN_DEG_KM,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_destination() {
        let origin = point!(x: 0.0, y: 0.0);
        let east = destination(origin, 90.0, EQUATOR_DEG_KM);
        assert_relative_eq!(east.x(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(east.y(), 0.0, epsilon = 1e-9);

        let north = destination(origin, 0.0, MERIDIAN_DEG_KM);
        assert_relative_eq!(north.x(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(north.y(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_destination_inverts_distance() {
        // 200 km radial out of Sao Paulo; sub-meter agreement.
        let origin = point!(x: -46.633, y: -23.55);
        for azimuth in [10.0, 37.0, 145.0, 270.0] {
            let dest = destination(origin, azimuth, 200.0);
            assert_relative_eq!(distance_km(origin, dest), 200.0, epsilon = 1e-6);
            assert_relative_eq!(azimuth_deg(origin, dest), azimuth, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_zero_distance_destination() {
        let origin = point!(x: -47.0, y: -23.0);
        let dest = destination(origin, 123.0, 0.0);
        assert_relative_eq!(dest.x(), origin.x(), epsilon = 1e-12);
        assert_relative_eq!(dest.y(), origin.y(), epsilon = 1e-12);
    }

    #[test]
    fn test_radials() {
        let r = radials(10).unwrap();
        assert_eq!(r.len(), 36);
        assert_eq!(r.first(), Some(&0));
        assert_eq!(r.last(), Some(&350));
        assert!(r.windows(2).all(|w| w[1] - w[0] == 10));

        for step in [1, 2, 3, 4, 5, 6, 8, 9, 12, 15, 20, 24, 30, 45, 60, 90, 120, 180, 360] {
            assert_eq!(radials(step).unwrap().len(), 360 / step as usize);
        }
        assert_eq!(radials(360).unwrap(), vec![0]);
    }

    #[test]
    fn test_invalid_radials() {
        assert_eq!(radials(0), Err(TerrainError::RadialStep(0)));
        assert_eq!(radials(-5), Err(TerrainError::RadialStep(-5)));
        assert_eq!(radials(7), Err(TerrainError::RadialStep(7)));
        assert_eq!(radials(720), Err(TerrainError::RadialStep(720)));
    }

    #[test]
    fn test_closed_ring() {
        let pts = [
            point!(x: 0.0, y: 0.0),
            point!(x: 1.0, y: 0.0),
            point!(x: 1.0, y: 1.0),
        ];
        let ring = closed_ring(&pts).unwrap();
        assert_eq!(ring.0.len(), 4);
        assert!(ring.is_closed());

        let already_closed = [pts[0], pts[1], pts[2], pts[0]];
        assert_eq!(closed_ring(&already_closed).unwrap().0.len(), 4);

        assert_eq!(closed_ring(&[]), Err(TerrainError::EmptyRing));
    }

    #[test]
    fn test_geodesic_iter() {
        let start = point!(x: 0.0, y: 0.0);
        let end = point!(x: 1.0, y: 0.0);
        let iter = GeodesicIter::new(start, 10_000.0, end);
        assert_eq!(iter.len(), 13);
        assert_relative_eq!(iter.total_m(), EQUATOR_DEG_KM * 1e3, max_relative = 1e-9);
        assert_relative_eq!(iter.step_m(), EQUATOR_DEG_KM * 1e3 / 12.0, max_relative = 1e-9);
        let samples: Vec<_> = iter.collect();
        assert_eq!(samples[0].0, 0.0);
        assert_relative_eq!(samples[12].1.x(), 1.0, epsilon = 1e-9);
        assert!(samples.windows(2).all(|w| w[1].0 > w[0].0));
    }

    #[test]
    fn test_geodesic_iter_degenerate_step() {
        let start = point!(x: 0.0, y: 0.0);
        let end = point!(x: 1.0, y: 0.0);
        for step in [0.0, -5.0, f64::NAN] {
            let samples: Vec<_> = GeodesicIter::new(start, step, end).collect();
            assert_eq!(samples.len(), 2);
            assert_eq!(samples[0].0, 0.0);
            assert_relative_eq!(samples[1].1.x(), 1.0, epsilon = 1e-9);
        }

        let iter = GeodesicIter::new(start, f64::MIN_POSITIVE, end);
        assert_eq!(iter.len(), usize::MAX);
    }
}
