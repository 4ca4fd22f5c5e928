use serde::{Deserialize, Serialize};

/// Closed set of particle outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Filled disc with a radial glow.
    #[default]
    Circle,
    Square,
    Triangle,
    Star,
    Diamond,
}

/// Compositing mode applied while a particle is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Standard alpha blending (source-over).
    #[default]
    #[serde(alias = "source-over")]
    Normal,
    /// Additive blending for glow effects.
    #[serde(alias = "additive")]
    Lighter,
    Screen,
    Multiply,
    Overlay,
}

impl BlendMode {
    /// Canvas `globalCompositeOperation` name.
    pub fn composite_operation(self) -> &'static str {
        match self {
            Self::Normal => "source-over",
            Self::Lighter => "lighter",
            Self::Screen => "screen",
            Self::Multiply => "multiply",
            Self::Overlay => "overlay",
        }
    }
}

/// Inclusive min/max pair used by the configuration ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span<T> {
    pub min: T,
    pub max: T,
}

impl<T> Span<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: PartialOrd> Span<T> {
    /// True when `min <= max`.
    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

impl Span<f64> {
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}
