use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::types::{BlendMode, Shape, Span};
use crate::renderer::color::Color;

/// Longest trail a particle may keep.
pub const MAX_TRAIL_LENGTH: usize = 64;

/// Why a configuration was rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("palette must contain at least one color")]
    EmptyPalette,
    #[error("{field}: min {min} is greater than max {max}")]
    InvertedRange { field: &'static str, min: f64, max: f64 },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must not be negative")]
    Negative { field: &'static str },
    #[error("particle life must be at least one frame (got min {min})")]
    ZeroLife { min: i64 },
    #[error("opacity range must lie within [0, 1] (got {min}..{max})")]
    OpacityOutOfBounds { min: f64, max: f64 },
    #[error("trail length {0} exceeds the maximum of {max}", max = MAX_TRAIL_LENGTH)]
    TrailTooLong(usize),
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration of one particle system.
///
/// Field names serialize in camelCase; the `mouse*` spellings are accepted as aliases
/// so host pages can pass their existing option objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Number of particles created per batch.
    pub particle_count: usize,
    /// Radius range at creation, in CSS pixels.
    pub particle_size: Span<f64>,
    /// Colors picked from at creation.
    #[serde(rename = "particleColor")]
    pub palette: Vec<Color>,
    /// Initial speed range per axis.
    pub particle_speed: Span<f64>,
    /// Lifetime range in frames.
    pub particle_life: Span<i64>,
    /// Added to vertical velocity every frame.
    pub gravity: f64,
    /// Added to horizontal velocity every frame.
    pub wind: f64,
    /// Whether pointer events move particles and clicks explode.
    pub interactive: bool,
    /// Radius of the pointer repulsion field.
    #[serde(alias = "mouseRadius")]
    pub pointer_radius: f64,
    /// Peak velocity change applied at the pointer position.
    #[serde(alias = "mouseForce")]
    pub pointer_force: f64,
    /// Pairs closer than this are joined by a line.
    pub connection_distance: f64,
    pub show_connections: bool,
    /// Reinitialize dead particles in place instead of removing them.
    pub respawn: bool,
    pub shape: Shape,
    pub blend_mode: BlendMode,
    /// Opacity range; `opacity.max` also caps the life-derived opacity.
    pub opacity: Span<f64>,
    /// Positions remembered per particle for trail rendering.
    pub trail_length: usize,
    /// A pointer that has not moved for this long stops repelling.
    pub pointer_idle_ms: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            particle_count: 100,
            particle_size: Span::new(1.0, 4.0),
            palette: vec![
                Color::rgb8(0x66, 0x7e, 0xea),
                Color::rgb8(0x76, 0x4b, 0xa2),
                Color::rgb8(0xf0, 0x93, 0xfb),
                Color::rgb8(0xf5, 0x57, 0x6c),
            ],
            particle_speed: Span::new(0.5, 2.0),
            particle_life: Span::new(3000, 8000),
            gravity: 0.1,
            wind: 0.02,
            interactive: true,
            pointer_radius: 100.0,
            pointer_force: 0.2,
            connection_distance: 120.0,
            show_connections: true,
            respawn: true,
            shape: Shape::Circle,
            blend_mode: BlendMode::Normal,
            opacity: Span::new(0.3, 0.8),
            trail_length: 5,
            pointer_idle_ms: 100.0,
        }
    }
}

impl Config {
    /// Dense, interactive field for a page's hero region.
    pub fn hero() -> Self {
        Self {
            particle_count: 60,
            particle_size: Span::new(2.0, 6.0),
            palette: vec![
                Color::rgba8(255, 255, 255, 204),
                Color::rgba8(102, 126, 234, 153),
                Color::rgba8(240, 147, 251, 153),
            ],
            particle_speed: Span::new(0.2, 1.0),
            gravity: 0.02,
            wind: 0.005,
            interactive: true,
            pointer_radius: 120.0,
            show_connections: true,
            connection_distance: 100.0,
            shape: Shape::Circle,
            ..Self::default()
        }
    }

    /// Sparse, calm, non-interactive field for a loading indicator.
    pub fn loading() -> Self {
        Self {
            particle_count: 30,
            particle_size: Span::new(1.0, 3.0),
            palette: vec![Color::rgba8(255, 255, 255, 230)],
            particle_speed: Span::new(0.5, 1.5),
            gravity: 0.0,
            wind: 0.0,
            interactive: false,
            show_connections: false,
            shape: Shape::Circle,
            ..Self::default()
        }
    }

    /// Slowly rising specks behind a skill card.
    pub fn skill() -> Self {
        Self {
            particle_count: 15,
            particle_size: Span::new(1.0, 2.0),
            palette: vec![
                Color::rgba8(102, 126, 234, 102),
                Color::rgba8(118, 75, 162, 102),
            ],
            particle_speed: Span::new(0.1, 0.5),
            gravity: -0.01,
            wind: 0.0,
            interactive: false,
            show_connections: false,
            shape: Shape::Circle,
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) JSON object over the defaults, then validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `update` on top of this configuration and validate the result.
    /// `self` is never modified; the caller swaps the returned value in.
    pub fn merged(&self, update: &ConfigUpdate) -> Result<Config, ConfigError> {
        let mut next = self.clone();
        update.apply_to(&mut next);
        next.validate()?;
        Ok(next)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        check_span("particleSize", self.particle_size)?;
        if self.particle_size.min < 0.0 {
            return Err(ConfigError::Negative { field: "particleSize" });
        }
        check_span("particleSpeed", self.particle_speed)?;
        check_span("opacity", self.opacity)?;
        if self.opacity.min < 0.0 || self.opacity.max > 1.0 {
            return Err(ConfigError::OpacityOutOfBounds {
                min: self.opacity.min,
                max: self.opacity.max,
            });
        }
        if self.particle_life.min < 1 {
            return Err(ConfigError::ZeroLife { min: self.particle_life.min });
        }
        if !self.particle_life.is_ordered() {
            return Err(ConfigError::InvertedRange {
                field: "particleLife",
                min: self.particle_life.min as f64,
                max: self.particle_life.max as f64,
            });
        }
        for (field, value) in [
            ("gravity", self.gravity),
            ("wind", self.wind),
            ("pointerRadius", self.pointer_radius),
            ("pointerForce", self.pointer_force),
            ("connectionDistance", self.connection_distance),
            ("pointerIdleMs", self.pointer_idle_ms),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field });
            }
        }
        for (field, value) in [
            ("pointerRadius", self.pointer_radius),
            ("connectionDistance", self.connection_distance),
            ("pointerIdleMs", self.pointer_idle_ms),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Negative { field });
            }
        }
        if self.trail_length > MAX_TRAIL_LENGTH {
            return Err(ConfigError::TrailTooLong(self.trail_length));
        }
        Ok(())
    }
}

fn check_span(field: &'static str, span: Span<f64>) -> Result<(), ConfigError> {
    if !span.is_finite() {
        return Err(ConfigError::NotFinite { field });
    }
    if !span.is_ordered() {
        return Err(ConfigError::InvertedRange { field, min: span.min, max: span.max });
    }
    Ok(())
}

/// A partial configuration: only the fields that are `Some` are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub particle_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub particle_size: Option<Span<f64>>,
    #[serde(rename = "particleColor", skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<Color>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub particle_speed: Option<Span<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub particle_life: Option<Span<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive: Option<bool>,
    #[serde(alias = "mouseRadius", skip_serializing_if = "Option::is_none")]
    pub pointer_radius: Option<f64>,
    #[serde(alias = "mouseForce", skip_serializing_if = "Option::is_none")]
    pub pointer_force: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_connections: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respawn: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blend_mode: Option<BlendMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Span<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trail_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer_idle_ms: Option<f64>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    // -- Builder pattern --

    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = Some(count);
        self
    }

    pub fn with_show_connections(mut self, show: bool) -> Self {
        self.show_connections = Some(show);
        self
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_palette(mut self, palette: Vec<Color>) -> Self {
        self.palette = Some(palette);
        self
    }

    fn apply_to(&self, config: &mut Config) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = &self.$field {
                    config.$field = value.clone();
                })*
            };
        }
        merge!(
            particle_count, particle_size, palette, particle_speed, particle_life,
            gravity, wind, interactive, pointer_radius, pointer_force,
            connection_distance, show_connections, respawn, shape, blend_mode,
            opacity, trail_length, pointer_idle_ms,
        );
    }
}
