//! Per-particle draw routines: shape dispatch, glow and motion trails.

use std::f64::consts::TAU;

use glam::DVec2;

use crate::api::types::{BlendMode, Shape};
use crate::core::particle::{Particle, Trail};
use crate::renderer::color::Color;
use crate::renderer::surface::Surface;

/// Glow radius as a multiple of the particle size.
pub const GLOW_SCALE: f64 = 2.0;
/// Opacity multiplier of the newest trail segment.
pub const TRAIL_OPACITY: f64 = 0.3;
pub const TRAIL_WIDTH: f64 = 1.0;

/// Vertex templates for a unit-size particle, centered on the origin.
const SQUARE: [DVec2; 4] = [
    DVec2::new(-0.5, -0.5),
    DVec2::new(0.5, -0.5),
    DVec2::new(0.5, 0.5),
    DVec2::new(-0.5, 0.5),
];
const TRIANGLE: [DVec2; 3] = [
    DVec2::new(0.0, -1.0),
    DVec2::new(-1.0, 1.0),
    DVec2::new(1.0, 1.0),
];
const DIAMOND: [DVec2; 4] = [
    DVec2::new(0.0, -1.0),
    DVec2::new(1.0, 0.0),
    DVec2::new(0.0, 1.0),
    DVec2::new(-1.0, 0.0),
];
const STAR_SPIKES: usize = 5;
const STAR_INNER_RADIUS: f64 = 0.5;

fn star_template() -> [DVec2; STAR_SPIKES * 2] {
    std::array::from_fn(|i| {
        let radius = if i % 2 == 0 { 1.0 } else { STAR_INNER_RADIUS };
        let angle = i as f64 / (STAR_SPIKES * 2) as f64 * TAU;
        DVec2::from_angle(angle) * radius
    })
}

/// Polygon outline of `shape` scaled by `size`, or `None` for the circle.
pub fn outline(shape: Shape, size: f64) -> Option<Vec<DVec2>> {
    let scale = |template: &[DVec2]| -> Vec<DVec2> { template.iter().map(|v| *v * size).collect() };
    match shape {
        Shape::Circle => None,
        Shape::Square => Some(scale(&SQUARE)),
        Shape::Triangle => Some(scale(&TRIANGLE)),
        Shape::Diamond => Some(scale(&DIAMOND)),
        Shape::Star => Some(scale(&star_template())),
    }
}

/// Draw one particle in its own rotated frame, then its trail.
pub fn draw_particle<S: Surface + ?Sized>(
    surface: &mut S,
    particle: &Particle,
    shape: Shape,
    blend: BlendMode,
    bounds: DVec2,
) {
    surface.save();
    surface.set_blend_mode(blend);
    surface.set_alpha(particle.opacity);
    surface.translate(particle.position);
    surface.rotate(particle.angle);
    match outline(shape, particle.size) {
        Some(points) => surface.fill_polygon(&points, particle.color),
        None => draw_circle(surface, particle.size, particle.color),
    }
    surface.restore();

    if particle.trail.len() >= 2 {
        draw_trail(surface, &particle.trail, particle.color, bounds);
    }
}

fn draw_circle<S: Surface + ?Sized>(surface: &mut S, size: f64, color: Color) {
    surface.fill_circle(DVec2::ZERO, size, color);
    surface.fill_glow(DVec2::ZERO, size * GLOW_SCALE, color);
}

/// Stroke consecutive trail points, fading toward the oldest.
/// Segments that jump across a wrapped edge are skipped.
pub fn draw_trail<S: Surface + ?Sized>(surface: &mut S, trail: &Trail, color: Color, bounds: DVec2) {
    let len = trail.len();
    if len < 2 {
        return;
    }
    let half = bounds * 0.5;
    surface.save();
    for i in 1..len {
        let (Some(prev), Some(cur)) = (trail.get(i - 1), trail.get(i)) else {
            break;
        };
        let jump = (cur.position - prev.position).abs();
        if jump.x > half.x || jump.y > half.y {
            continue;
        }
        surface.set_alpha(trail_segment_opacity(i, len, cur.opacity));
        surface.stroke_line(prev.position, cur.position, TRAIL_WIDTH, color);
    }
    surface.restore();
}

/// Opacity of the segment ending at trail index `i` of `len`.
#[inline]
pub fn trail_segment_opacity(i: usize, len: usize, point_opacity: f64) -> f64 {
    (i as f64 / len as f64) * point_opacity * TRAIL_OPACITY
}
