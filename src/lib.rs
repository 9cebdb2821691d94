pub mod cli;
pub mod coloring;
pub mod config;
pub mod error;
pub mod export;
pub mod loaders;
pub mod math;
pub mod mesh;
pub mod normalize;
pub mod pipeline;
pub mod scene;

pub use config::{ColorMode, ConvertConfig};
pub use error::ConvertError;
pub use mesh::{Mesh, Visual};
pub use pipeline::{run, ConversionReport};
pub use scene::Scene;
