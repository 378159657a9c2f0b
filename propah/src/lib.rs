//! # Radio Frequency Propagation
//!
//! `propah` provides the propagation and licensing routines behind a
//! broadcast station study: radiated power, field strength, terrain
//! diffraction, coverage contours, exposure compliance zones,
//! interference margins and aerodrome screening.

pub mod aerodrome;
pub mod compliance;
pub mod contour;
pub mod diffraction;
mod error;
pub mod field;
pub mod fresnel;
pub mod interference;
pub mod link;
pub mod p1546;
mod station;

pub use {
    crate::{
        aerodrome::{aerodrome_check, Aerodrome, AerodromeAssessment, AerodromeOutcome},
        compliance::{assess_compliance, station_compliance, ComplianceAssessment, ExposureLimits},
        contour::{compute_contour, station_contour, Contour, ContourParams, ContourPoint},
        diffraction::{deygout_loss_db, station_link_loss, Link, LinkLoss},
        error::PropahError,
        field::{FieldModel, FreeSpace},
        interference::{evaluate_interference, InterferenceCase, InterferenceResult},
        link::{LinkMetrics, LinkProfile, Obstruction},
        station::{Antenna, Feedline, Station, StationSetup, Transmitter},
    },
    geo, terrain,
};

/// Speed of light in m/s
const C: f64 = 299_792_458.0;
