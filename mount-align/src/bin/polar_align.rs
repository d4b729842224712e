//! Run a polar alignment session against the simulated observatory.

use anyhow::bail;
use clap::Parser;

use mount_align::simulate::SimulatedObservatory;
use mount_align::{SessionConfig, SessionEvent, SessionHandle, SessionOutcome};

#[derive(Parser, Debug)]
#[command(name = "polar-align", about = "Polar alignment dry run on a simulated mount")]
struct Args {
    /// Site latitude in degrees, negative in the southern hemisphere
    #[arg(long, default_value_t = 50.0)]
    latitude: f64,

    /// Site longitude in degrees, negative west of Greenwich
    #[arg(long, default_value_t = 0.0)]
    longitude: f64,

    /// Simulated axis altitude error in degrees
    #[arg(long, default_value_t = 0.7)]
    alt_error: f64,

    /// Simulated axis azimuth error in degrees
    #[arg(long, default_value_t = -1.2)]
    az_error: f64,

    /// Declination of both baseline points in degrees
    #[arg(long, default_value_t = 60.0)]
    declination: f64,

    /// Hour angle of the first baseline point in hours
    #[arg(long, default_value_t = 1.0)]
    first_hour_angle: f64,

    /// Hour angle of the second baseline point in hours
    #[arg(long, default_value_t = 5.0)]
    second_hour_angle: f64,

    /// Exposure length per image in seconds
    #[arg(long, default_value_t = 4.0)]
    exposure: f64,

    /// Camera binning for alignment images
    #[arg(long, default_value_t = 4)]
    binning: u32,

    /// Image scale for the plate solver in arcsec per pixel
    #[arg(long, default_value_t = 6.872)]
    solve_scale: f64,

    /// Filter to select by name
    #[arg(long)]
    filter: Option<String>,

    /// Number of refinement images before stopping
    #[arg(long, default_value_t = 5)]
    refine_limit: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = SessionConfig {
        declination_degrees: args.declination,
        first_hour_angle_hours: args.first_hour_angle,
        second_hour_angle_hours: args.second_hour_angle,
        exposure_seconds: args.exposure,
        binning: args.binning,
        solve_scale_arcsec_per_pixel: args.solve_scale,
        filter: args.filter,
        refine_limit: Some(args.refine_limit),
    };
    let observatory =
        SimulatedObservatory::new(args.latitude, args.longitude, args.alt_error, args.az_error);

    let (handle, events) = SessionHandle::spawn(config, observatory);
    for event in events {
        match event {
            SessionEvent::Adjustment {
                tilt_degrees,
                swing_degrees,
            } => println!("ADJUST tilt {tilt_degrees:+.4} swing {swing_degrees:+.4}"),
            SessionEvent::Info(message) => println!("{message}"),
            SessionEvent::Warning(message) => eprintln!("warning: {message}"),
            SessionEvent::Error(message) => eprintln!("error: {message}"),
        }
    }

    match handle.join()? {
        SessionOutcome::Completed => Ok(()),
        SessionOutcome::Cancelled => bail!("session cancelled"),
    }
}
