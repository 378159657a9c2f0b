#![allow(clippy::cast_possible_truncation)]

mod options;

use anyhow::{Context, Error as AnyError};
use clap::Parser;
use itertools::Itertools;
use log::info;
use options::{Cli, Command as CliCmd, Format, LatLonAlt};
use propah::{
    aerodrome_check, deygout_loss_db, evaluate_interference,
    geo::{LineString, Point},
    station_compliance, station_contour,
    terrain::ElevationProfile,
    Aerodrome, ComplianceAssessment, Contour, ContourParams, ContourPoint, FreeSpace,
    InterferenceCase, InterferenceResult, Link, LinkMetrics, LinkProfile, StationSetup,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, io::Write, path::Path};
use textplots::{Chart, Plot, Shape};

fn main() -> Result<(), AnyError> {
    let Cli { format, cmd } = Cli::parse();

    env_logger::init();

    match cmd {
        CliCmd::Contour { station, radials } => {
            let setup: StationSetup = read_json(&station)?;
            let contour = station_contour(Some(&setup), &radials.into(), &FreeSpace)?;
            print_contour(format, &contour)?;
        }
        CliCmd::Compliance {
            station,
            public_limit,
            occupational_limit,
            k_reflection,
            zone_step,
        } => {
            let setup: StationSetup = read_json(&station)?;
            let limits = propah::ExposureLimits {
                public_w_m2: public_limit,
                occupational_w_m2: occupational_limit,
            };
            let assessment = station_compliance(Some(&setup), &limits, k_reflection, zone_step)?;
            print_compliance(format, &assessment)?;
        }
        CliCmd::Interference {
            desired,
            undesired,
            case,
            radials,
        } => {
            let desired: StationSetup = read_json(&desired)?;
            let undesired: StationSetup = read_json(&undesired)?;
            let case: InterferenceCase = read_json(&case)?;
            let params: ContourParams = radials.into();
            let contour = station_contour(Some(&desired), &params, &FreeSpace)?;
            let result =
                evaluate_interference(Some(&contour), Some(&undesired), &case, &FreeSpace)?;
            info!(
                "interference; case: {}, passed: {}",
                case.relationship, result.passed
            );
            print_interference(format, &result)?;
        }
        CliCmd::Aerodrome { station, aerodrome } => {
            let setup: StationSetup = read_json(&station)?;
            let aerodrome = aerodrome
                .as_deref()
                .map(read_json::<Aerodrome>)
                .transpose()?;
            let assessment = aerodrome_check(Some(&setup.station), aerodrome.as_ref())?;
            print_json(&assessment)?;
        }
        CliCmd::Link {
            profile,
            start,
            dest,
            frequency,
            k_factor,
        } => {
            let samples: Vec<(f64, f64)> = read_json(&profile)?;
            let terrain = ElevationProfile::from_samples(samples)?;
            print_link(format, &terrain, start, dest, frequency, k_factor)?;
        }
    };
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AnyError> {
    let file = fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let value = serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(value)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AnyError> {
    let json = serde_json::to_string(value)?;
    println!("{json}");
    Ok(())
}

fn ring_coords(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.points().map(|p: Point<f64>| [p.x(), p.y()]).collect()
}

fn print_contour(format: Format, contour: &Contour) -> Result<(), AnyError> {
    #[derive(Serialize)]
    struct JsonContour<'a> {
        params: &'a ContourParams,
        erp_dbw: f64,
        points: &'a [ContourPoint],
        polygon: Vec<[f64; 2]>,
    }

    match format {
        Format::Json => print_json(&JsonContour {
            params: &contour.params,
            erp_dbw: contour.erp_dbw,
            points: &contour.points,
            polygon: ring_coords(&contour.ring),
        }),
        Format::Csv => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "Order,Azimuth,Distance,Latitude,Longitude")?;
            for p in &contour.points {
                let row = [
                    p.order_idx.to_string(),
                    p.azimuth_deg.to_string(),
                    p.distance_km.to_string(),
                    p.lat.to_string(),
                    p.lon.to_string(),
                ];
                writeln!(stdout, "{}", row.iter().join(","))?;
            }
            Ok(())
        }
        Format::Plot => {
            let plot_data: Vec<(f32, f32)> = contour
                .points
                .iter()
                .map(|p| (f32::from(p.azimuth_deg), p.distance_km as f32))
                .collect();
            Chart::new(300, 150, 0.0, 360.0)
                .lineplot(&Shape::Steps(&plot_data))
                .display();
            Ok(())
        }
    }
}

fn print_compliance(format: Format, assessment: &ComplianceAssessment) -> Result<(), AnyError> {
    #[derive(Serialize)]
    struct JsonZone {
        kind: propah::compliance::ZoneKind,
        radius_m: f64,
        polygon: Vec<[f64; 2]>,
    }

    #[derive(Serialize)]
    struct JsonAssessment {
        eirp_w: f64,
        k_reflection: f64,
        limits: propah::ExposureLimits,
        zones: [JsonZone; 2],
    }

    let zones = [&assessment.public, &assessment.occupational];
    match format {
        Format::Json => print_json(&JsonAssessment {
            eirp_w: assessment.eirp_w,
            k_reflection: assessment.k_reflection,
            limits: assessment.limits,
            zones: zones.map(|zone| JsonZone {
                kind: zone.kind,
                radius_m: zone.radius_m,
                polygon: ring_coords(&zone.ring),
            }),
        }),
        Format::Csv | Format::Plot => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "Zone,Radius,Longitude,Latitude")?;
            for zone in zones {
                for [lon, lat] in ring_coords(&zone.ring) {
                    writeln!(stdout, "{:?},{},{lon},{lat}", zone.kind, zone.radius_m)?;
                }
            }
            Ok(())
        }
    }
}

fn print_interference(format: Format, result: &InterferenceResult) -> Result<(), AnyError> {
    match format {
        Format::Json => print_json(result),
        Format::Csv => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "Latitude,Longitude,Desired,Undesired,Margin,Passed")?;
            for p in &result.points {
                writeln!(
                    stdout,
                    "{},{},{},{},{},{}",
                    p.lat, p.lon, p.desired_dbuvm, p.undesired_dbuvm, p.margin_db, p.passed
                )?;
            }
            Ok(())
        }
        Format::Plot => {
            #[allow(clippy::cast_precision_loss)]
            let plot_data: Vec<(f32, f32)> = result
                .points
                .iter()
                .enumerate()
                .map(|(idx, p)| (idx as f32, p.margin_db as f32))
                .collect();
            #[allow(clippy::cast_precision_loss)]
            Chart::new(300, 150, 0.0, plot_data.len() as f32)
                .lineplot(&Shape::Lines(&plot_data))
                .display();
            Ok(())
        }
    }
}

fn print_link(
    format: Format,
    terrain: &ElevationProfile,
    LatLonAlt(start, start_alt): LatLonAlt,
    LatLonAlt(dest, dest_alt): LatLonAlt,
    frequency: f64,
    k_factor: f64,
) -> Result<(), AnyError> {
    let link_profile = LinkProfile::builder()
        .freq(frequency)
        .start_alt(start_alt)
        .end_alt(dest_alt)
        .k_factor(k_factor)
        .build(terrain)?;
    let link = Link::new(frequency, start_alt, dest_alt).k_factor(k_factor);
    let loss_db = deygout_loss_db(terrain, &link)?;

    match format {
        Format::Json => {
            #[derive(Serialize)]
            struct JsonLink<'a> {
                metrics: LinkMetrics,
                diffraction_loss_db: f64,
                distances_m: &'a [f64],
                terrain_elev_m: &'a [f64],
                los_elev_m: &'a [f64],
                fresnel_zone_m: &'a [f64],
            }
            print_json(&JsonLink {
                metrics: link_profile.metrics(start, dest),
                diffraction_loss_db: loss_db,
                distances_m: &link_profile.distances_m,
                terrain_elev_m: &link_profile.terrain_elev_m,
                los_elev_m: &link_profile.los_elev_m,
                fresnel_zone_m: &link_profile.fresnel_zone_m,
            })
        }
        Format::Csv => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "Distance,Bulge,Elevation,LOS,Fresnel")?;
            for ((((distance, bulge), elevation), los), fresnel) in link_profile
                .distances_m
                .iter()
                .zip(link_profile.bulge_m.iter())
                .zip(link_profile.terrain_elev_m.iter())
                .zip(link_profile.los_elev_m.iter())
                .zip(link_profile.fresnel_zone_m.iter())
            {
                writeln!(stdout, "{distance},{bulge},{elevation},{los},{fresnel}")?;
            }
            Ok(())
        }
        Format::Plot => {
            let series = |values: &[f64]| -> Vec<(f32, f32)> {
                link_profile
                    .distances_m
                    .iter()
                    .zip(values)
                    .map(|(d, v)| ((*d / 1e3) as f32, *v as f32))
                    .collect()
            };
            let terrain_data = series(&link_profile.terrain_elev_m);
            let los_data = series(&link_profile.los_elev_m);
            let lower_fresnel: Vec<f64> = link_profile
                .los_elev_m
                .iter()
                .zip(&link_profile.fresnel_zone_m)
                .map(|(los, r1)| los - r1)
                .collect();
            let fresnel_data = series(&lower_fresnel);
            Chart::new(300, 150, 0.0, (link_profile.distance_m() / 1e3) as f32)
                .lineplot(&Shape::Lines(&terrain_data))
                .lineplot(&Shape::Lines(&los_data))
                .lineplot(&Shape::Lines(&fresnel_data))
                .display();
            println!("diffraction loss: {loss_db:.2} dB");
            Ok(())
        }
    }
}
