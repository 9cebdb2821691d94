pub mod glb;

pub use glb::{encode_glb, write_glb, GENERATOR};
