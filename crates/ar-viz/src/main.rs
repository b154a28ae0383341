//! AR Editor Simulation
//!
//! Run with: cargo run -p ar-viz
//!
//! Examples:
//!   cargo run -p ar-viz -- --plane-delay 3
//!   cargo run -p ar-viz -- --camera "FaceTime HD Camera:front" --camera "USB Camera"
//!   cargo run -p ar-viz -- --config ar.toml --seed 7

use ar_core::{ArConfig, SyntheticCameraSource};
use ar_events::CameraDevice;
use ar_viz::session::DEFAULT_CAMERA_DEVICE;
use ar_viz::{ArSession, ArSimPlugin};
use bevy::prelude::*;
use clap::Parser;
use std::path::PathBuf;

/// AR Editor Simulation
#[derive(Parser, Debug)]
#[command(name = "ar-viz")]
#[command(about = "Simulated AR session with plane visualization")]
struct Args {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the simulated point cloud
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated camera as `name` or `name:front` (repeatable)
    #[arg(long = "camera", value_name = "DEVICE")]
    cameras: Vec<CameraDevice>,

    /// Start with no cameras plugged in
    #[arg(long, conflicts_with = "cameras")]
    no_camera: bool,

    /// Seconds to wait before each simulated plane appears
    #[arg(long)]
    plane_delay: Option<f32>,
}

fn load_config(args: &Args) -> ArConfig {
    let mut config = match &args.config {
        Some(path) => ArConfig::from_file(path).unwrap_or_else(|e| {
            eprintln!(
                "Warning: Could not load {}: {}. Using defaults.",
                path.display(),
                e
            );
            ArConfig::default()
        }),
        None => ArConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(delay) = args.plane_delay {
        config.planes.delay_seconds = delay;
    }
    if let Err(e) = config.validate() {
        eprintln!("Warning: {}. Using defaults.", e);
        config = ArConfig::default();
    }
    config
}

fn camera_devices(args: &Args) -> Vec<CameraDevice> {
    if args.no_camera {
        Vec::new()
    } else if args.cameras.is_empty() {
        vec![CameraDevice::back(DEFAULT_CAMERA_DEVICE)]
    } else {
        args.cameras.clone()
    }
}

fn main() {
    let args = Args::parse();
    let config = load_config(&args);
    let devices = SyntheticCameraSource::new(camera_devices(&args));

    App::new()
        .insert_resource(ArSession::editor(config.clone(), devices))
        .insert_resource(config)
        .add_plugins(ArSimPlugin)
        .run();
}
