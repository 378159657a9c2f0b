use anyhow::{anyhow, Error as AnyError};
use clap::{Parser, Subcommand, ValueEnum};
use propah::{compliance, contour, geo::Point, terrain::K_FACTOR};
use std::{path::PathBuf, str::FromStr};

/// Run radio station licensing studies.
///
/// Station, case and aerodrome data are read from JSON files; results
/// are written to stdout.
#[derive(Parser, Debug, Clone)]
pub struct Cli {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Csv,

    /// Plot to terminal.
    Plot,
}

/// Radial search parameters shared by contour based studies.
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct Radials {
    /// Protected field strength, in dBµV/m.
    #[arg(short, long)]
    pub threshold: f64,

    /// Azimuth step between radials, in degrees. Must divide 360.
    #[arg(long, default_value_t = contour::DEFAULT_STEP_DEG)]
    pub step_deg: i32,

    /// Distance step along each radial, in km.
    #[arg(long, default_value_t = contour::DEFAULT_STEP_KM)]
    pub step_km: f64,

    /// Radial length, in km.
    #[arg(long, default_value_t = contour::DEFAULT_MAX_DISTANCE_KM)]
    pub max_distance: f64,
}

impl From<Radials> for contour::ContourParams {
    fn from(radials: Radials) -> Self {
        Self {
            threshold_dbuvm: radials.threshold,
            step_deg: radials.step_deg,
            step_km: radials.step_km,
            max_distance_km: radials.max_distance,
        }
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Compute a station's protected contour.
    Contour {
        /// Station setup JSON.
        #[arg(short, long)]
        station: PathBuf,

        #[command(flatten)]
        radials: Radials,
    },

    /// Compute public and occupational exposure compliance zones.
    Compliance {
        /// Station setup JSON.
        #[arg(short, long)]
        station: PathBuf,

        /// Public exposure power density limit, in W/m².
        #[arg(long)]
        public_limit: f64,

        /// Occupational exposure power density limit, in W/m².
        #[arg(long)]
        occupational_limit: f64,

        /// Ground reflection factor.
        #[arg(short, long, default_value_t = compliance::K_REFLECTION)]
        k_reflection: f64,

        /// Azimuth step of the zone polygons, in degrees.
        #[arg(long, default_value_t = compliance::ZONE_STEP_DEG)]
        zone_step: i32,
    },

    /// Test a desired station's protected contour against an
    /// undesired station.
    Interference {
        /// Desired (protected) station setup JSON.
        #[arg(long)]
        desired: PathBuf,

        /// Undesired station setup JSON.
        #[arg(long)]
        undesired: PathBuf,

        /// Interference case JSON.
        #[arg(long)]
        case: PathBuf,

        #[command(flatten)]
        radials: Radials,
    },

    /// Screen a station against a nearby aerodrome.
    Aerodrome {
        /// Station setup JSON.
        #[arg(short, long)]
        station: PathBuf,

        /// Aerodrome JSON.
        #[arg(short, long)]
        aerodrome: Option<PathBuf>,
    },

    /// Analyze fresnel clearance and diffraction loss along a link.
    Link {
        /// Terrain profile JSON, an array of `[distance_m, elevation_m]`.
        #[arg(short, long)]
        profile: PathBuf,

        /// Start "lat,lon,alt", where 'alt' is meters above ground.
        #[arg(long)]
        start: LatLonAlt,

        /// Destination "lat,lon,alt", where 'alt' is meters above ground.
        #[arg(long)]
        dest: LatLonAlt,

        /// Carrier frequency, in MHz.
        #[arg(long, default_value_t = 100.0)]
        frequency: f64,

        /// Effective earth radius factor.
        #[arg(short, long, default_value_t = K_FACTOR)]
        k_factor: f64,
    },
}

#[derive(Clone, Debug, Copy)]
pub struct LatLonAlt(pub Point<f64>, pub f64);

impl FromStr for LatLonAlt {
    type Err = AnyError;
    fn from_str(s: &str) -> Result<Self, AnyError> {
        let mut parts = s.splitn(3, ',');
        let mut next = || parts.next().ok_or_else(|| anyhow!("not a valid lat,lon,alt"));
        let lat = f64::from_str(next()?.trim())?;
        let lon = f64::from_str(next()?.trim())?;
        let alt = f64::from_str(next()?.trim())?;
        Ok(Self(Point::new(lon, lat), alt))
    }
}
