pub mod color;
pub mod surface;
#[cfg(feature = "vectors")]
pub mod vector;

pub use color::{Color, ColorParseError};
pub use surface::Surface;
#[cfg(feature = "vectors")]
pub use vector::{BlendBatch, VectorSurface, VectorVertex};
