//! RGBA colors, parsed from and printed as CSS color strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a CSS color string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("empty color string")]
    Empty,
    #[error("malformed hex color `{0}`")]
    Hex(String),
    #[error("malformed functional color `{0}`")]
    Functional(String),
    #[error("unsupported color syntax `{0}`")]
    Unsupported(String),
}

/// RGBA color, each channel in 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create a color from RGBA components (0.0 - 1.0).
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a fully opaque color from RGB components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from RGB u8 values (0-255) with full opacity.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba8(r, g, b, 255)
    }

    /// Create a color from RGBA u8 values (0-255).
    pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Create a color from hue (degrees), saturation and lightness (0.0 - 1.0).
    pub fn hsla(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = lightness - c / 2.0;
        Self::new(r + m, g + m, b + m, alpha)
    }

    /// Create a color with the given alpha value.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Scale the alpha channel, as a canvas global alpha would.
    pub fn fade(self, factor: f32) -> Self {
        Self { a: self.a * factor.clamp(0.0, 1.0), ..self }
    }

    /// CSS `rgba(...)` representation, accepted by canvas fill/stroke styles.
    pub fn to_css(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "rgba({}, {}, {}, {})",
            channel(self.r),
            channel(self.g),
            channel(self.b),
            trim_float(self.a.clamp(0.0, 1.0)),
        )
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(...)`, `rgba(...)` or `transparent`.
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ColorParseError::Empty);
        }
        if s.eq_ignore_ascii_case("transparent") {
            return Ok(Self::TRANSPARENT);
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorParseError::Hex(s.to_string()));
        }
        let lower = s.to_ascii_lowercase();
        let args = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| ColorParseError::Unsupported(s.to_string()))?;
        parse_functional(args).ok_or_else(|| ColorParseError::Functional(s.to_string()))
    }

    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_css()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

fn trim_float(v: f32) -> String {
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() { "0".to_string() } else { s.to_string() }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Color::rgb8(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Color::rgba8(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Color::rgb8(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn parse_functional(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |p: &str| -> Option<f32> {
        let v: f32 = match p.strip_suffix('%') {
            Some(pct) => pct.trim().parse::<f32>().ok()? * 2.55,
            None => p.parse().ok()?,
        };
        v.is_finite().then(|| (v / 255.0).clamp(0.0, 1.0))
    };
    let alpha = match parts.get(3) {
        Some(p) => {
            let v: f32 = match p.strip_suffix('%') {
                Some(pct) => pct.trim().parse::<f32>().ok()? / 100.0,
                None => p.parse().ok()?,
            };
            if !v.is_finite() {
                return None;
            }
            v.clamp(0.0, 1.0)
        }
        None => 1.0,
    };
    Some(Color::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha))
}
