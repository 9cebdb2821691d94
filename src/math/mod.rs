mod aabb;
mod color;

pub use aabb::AABB;
pub use color::{parse_color, Rgba};
