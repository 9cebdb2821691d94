use serde::{Deserialize, Serialize};

/// 8-bit RGBA color, laid out exactly as a glTF `COLOR_0` element.
#[repr(transparent)]
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable, Serialize, Deserialize,
)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    /// Converts a normalized float channel, clamping to [0, 1].
    pub fn channel_from_f32(v: f32) -> u8 {
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "{},{},{},{}", r, g, b, a)
    }
}

/// Parses `"r,g,b"` or `"r,g,b,a"`; anything else yields `default`.
pub fn parse_color(raw: &str, default: Rgba) -> Rgba {
    match try_parse_color(raw) {
        Some(color) => color,
        None => {
            log::debug!("Unparseable color {:?}, using {}", raw, default);
            default
        }
    }
}

fn try_parse_color(raw: &str) -> Option<Rgba> {
    let channels = raw
        .split(',')
        .map(|c| c.trim().parse::<u8>().ok())
        .collect::<Option<Vec<u8>>>()?;

    match channels.as_slice() {
        &[r, g, b] => Some(Rgba::opaque(r, g, b)),
        &[r, g, b, a] => Some(Rgba::new(r, g, b, a)),
        _ => None,
    }
}
