// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

use crate::config::{ColorMode, ConvertConfig, DEFAULT_HAND_COLOR, DEFAULT_OBJECT_COLOR};
use crate::math::parse_color;

#[derive(Parser, Debug, Clone)]
#[command(name = "grasp-glb")]
#[command(about = "Combine a hand mesh and an object mesh into one GLB for web viewers", long_about = None)]
pub struct Cli {
    /// Hand mesh (.ply, .glb or .gltf)
    #[arg(long)]
    pub hand: PathBuf,

    /// Object mesh (.ply, .glb or .gltf)
    #[arg(long)]
    pub object: PathBuf,

    /// Output GLB path; missing directories are created
    #[arg(long)]
    pub out: PathBuf,

    /// Inputs are in millimeters (scale by 0.001)
    #[arg(long)]
    pub mm: bool,

    /// Recenter both meshes on their combined bounding box (default)
    #[arg(long, overrides_with = "no_center")]
    pub center: bool,

    /// Keep the original placement
    #[arg(long = "no-center", overrides_with = "center")]
    pub no_center: bool,

    /// Scale so the combined bounding box's longest side is 1.0 (default)
    #[arg(long, overrides_with = "no_unit_scale")]
    pub unit_scale: bool,

    /// Keep the original size
    #[arg(long = "no-unit-scale", overrides_with = "unit_scale")]
    pub no_unit_scale: bool,

    /// Whether existing vertex colors survive
    #[arg(long, value_enum, default_value_t = ColorMode::Conditional)]
    pub color_mode: ColorMode,

    /// Solid hand color as r,g,b[,a]
    #[arg(long, default_value = "184,184,209,255")]
    pub hand_color: String,

    /// Solid object color as r,g,b[,a]
    #[arg(long, default_value = "200,225,204,255")]
    pub obj_color: String,

    /// Print a JSON report instead of the confirmation line
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn to_config(&self) -> ConvertConfig {
        ConvertConfig {
            hand: self.hand.clone(),
            object: self.object.clone(),
            out: self.out.clone(),
            convert_mm: self.mm,
            center: !self.no_center,
            unit_scale: !self.no_unit_scale,
            color_mode: self.color_mode,
            hand_color: parse_color(&self.hand_color, DEFAULT_HAND_COLOR),
            obj_color: parse_color(&self.obj_color, DEFAULT_OBJECT_COLOR),
        }
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
