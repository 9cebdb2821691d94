// config.rs - Options consumed by the conversion pipeline
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::math::Rgba;

pub const DEFAULT_HAND_COLOR: Rgba = Rgba::new(184, 184, 209, 255);
pub const DEFAULT_OBJECT_COLOR: Rgba = Rgba::new(200, 225, 204, 255);

/// How solid colors are applied to the loaded meshes
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Paint only meshes that carry no per-vertex colors
    #[default]
    Conditional,
    /// Replace any colors, materials or textures with the solid color
    Forced,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConvertConfig {
    pub hand: PathBuf,
    pub object: PathBuf,
    pub out: PathBuf,
    /// Inputs are in millimeters
    pub convert_mm: bool,
    pub center: bool,
    pub unit_scale: bool,
    pub color_mode: ColorMode,
    pub hand_color: Rgba,
    pub obj_color: Rgba,
}

impl ConvertConfig {
    /// Config with the tool's defaults: centered, unit-scaled, conditional coloring.
    pub fn new(hand: impl Into<PathBuf>, object: impl Into<PathBuf>, out: impl Into<PathBuf>) -> Self {
        Self {
            hand: hand.into(),
            object: object.into(),
            out: out.into(),
            convert_mm: false,
            center: true,
            unit_scale: true,
            color_mode: ColorMode::Conditional,
            hand_color: DEFAULT_HAND_COLOR,
            obj_color: DEFAULT_OBJECT_COLOR,
        }
    }
}
