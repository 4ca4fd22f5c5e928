pub mod api;
pub mod core;
pub mod systems;
pub mod renderer;
pub mod input;

pub use glam;

// Re-export key types at crate root for convenience
pub use api::config::{Config, ConfigError, ConfigUpdate, MAX_TRAIL_LENGTH};
pub use api::types::{BlendMode, Shape, Span};
pub use core::particle::{Particle, Trail, TrailPoint};
pub use core::rng::Rng;
pub use input::pointer::PointerState;
pub use input::queue::{InputEvent, InputQueue};
pub use renderer::{Color, ColorParseError, Surface};
pub use systems::backdrop::{Backdrop, FlowField, MorphingBackground};
pub use systems::connections::{ConnectionGraph, Edge};
pub use systems::controller::{MotionGraphicsController, MOBILE_BREAKPOINT};
pub use systems::particle_system::{Lifecycle, ParticleSystem};

#[cfg(feature = "vectors")]
pub use renderer::{BlendBatch, VectorSurface, VectorVertex};
