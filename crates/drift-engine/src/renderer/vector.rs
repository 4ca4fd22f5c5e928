//! Lyon-based headless surface.
//!
//! Tessellates every fill and stroke on the CPU into a flat RGBA vertex
//! buffer (triangle list), split into batches by blend mode. Used for
//! native/offscreen rendering and to exercise the engine without a browser.

use bytemuck::{Pod, Zeroable};
use glam::{DAffine2, DVec2};
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, FillVertexConstructor,
    StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor, VertexBuffers,
};

use crate::api::types::BlendMode;
use crate::renderer::color::Color;
use crate::renderer::surface::Surface;

/// Segments used to approximate a radial glow.
const GLOW_SEGMENTS: usize = 24;

/// Per-vertex data for vector/polygon rendering.
/// 6 floats = 24 bytes per vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VectorVertex {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl VectorVertex {
    /// Number of floats per vertex.
    pub const FLOATS: usize = 6;
    /// Stride in bytes.
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4; // 24

    fn at(p: DVec2, color: Color) -> Self {
        Self {
            x: p.x as f32,
            y: p.y as f32,
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        }
    }
}

/// A run of vertices drawn with one blend mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendBatch {
    pub mode: BlendMode,
    /// First vertex index.
    pub start: usize,
    /// One past the last vertex index.
    pub end: usize,
}

struct VertexCtor {
    color: Color,
}

impl FillVertexConstructor<VectorVertex> for VertexCtor {
    fn new_vertex(&mut self, vertex: FillVertex) -> VectorVertex {
        let p = vertex.position();
        VectorVertex::at(DVec2::new(p.x as f64, p.y as f64), self.color)
    }
}

impl StrokeVertexConstructor<VectorVertex> for VertexCtor {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> VectorVertex {
        let p = vertex.position();
        VectorVertex::at(DVec2::new(p.x as f64, p.y as f64), self.color)
    }
}

#[derive(Debug, Clone, Copy)]
struct DrawState {
    transform: DAffine2,
    alpha: f64,
    blend: BlendMode,
}

/// Headless `Surface` producing tessellated triangles.
pub struct VectorSurface {
    container: Option<DVec2>,
    pixel_ratio: f64,
    backing: DVec2,
    state: DrawState,
    stack: Vec<DrawState>,
    fill_tess: FillTessellator,
    stroke_tess: StrokeTessellator,
    geometry: VertexBuffers<VectorVertex, u32>,
    vertices: Vec<VectorVertex>,
    batches: Vec<BlendBatch>,
    attached: bool,
}

impl VectorSurface {
    /// A surface bound to a virtual container of the given CSS size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            container: Some(DVec2::new(width, height)),
            pixel_ratio: 1.0,
            backing: DVec2::ZERO,
            state: DrawState {
                transform: DAffine2::IDENTITY,
                alpha: 1.0,
                blend: BlendMode::Normal,
            },
            stack: Vec::new(),
            fill_tess: FillTessellator::new(),
            stroke_tess: StrokeTessellator::new(),
            geometry: VertexBuffers::new(),
            vertices: Vec::with_capacity(16384),
            batches: Vec::new(),
            attached: true,
        }
    }

    pub fn with_pixel_ratio(mut self, ratio: f64) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    /// Resize the virtual container; takes effect at the engine's next resize.
    pub fn set_container_size(&mut self, width: f64, height: f64) {
        self.container = Some(DVec2::new(width, height));
    }

    /// Simulate the container disappearing from the page.
    pub fn remove_container(&mut self) {
        self.container = None;
    }

    /// Backing-store size in physical pixels.
    pub fn backing_size(&self) -> DVec2 {
        self.backing
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn vertices(&self) -> &[VectorVertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn batches(&self) -> &[BlendBatch] {
        &self.batches
    }

    /// The vertex buffer as raw floats, ready for upload.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    fn device(&self, p: DVec2) -> DVec2 {
        self.state.transform.transform_point2(p)
    }

    /// Uniform scale of the current transform, for stroke widths.
    fn scale(&self) -> f64 {
        self.state.transform.matrix2.determinant().abs().sqrt()
    }

    fn shade(&self, color: Color) -> Color {
        color.fade(self.state.alpha as f32)
    }

    fn emit(&mut self, vertices: impl IntoIterator<Item = VectorVertex>) {
        let start = self.vertices.len();
        self.vertices.extend(vertices);
        let end = self.vertices.len();
        if end == start {
            return;
        }
        let mode = self.state.blend;
        if let Some(batch) = self.batches.last_mut() {
            if batch.mode == mode && batch.end == start {
                batch.end = end;
                return;
            }
        }
        self.batches.push(BlendBatch { mode, start, end });
    }

    /// Flush indexed geometry as a triangle list.
    fn flush_geometry(&mut self) {
        let expanded: Vec<VectorVertex> = self
            .geometry
            .indices
            .iter()
            .map(|idx| self.geometry.vertices[*idx as usize])
            .collect();
        self.geometry.vertices.clear();
        self.geometry.indices.clear();
        self.emit(expanded);
    }

    fn device_path(&self, points: &[DVec2], closed: bool) -> Path {
        let mut builder = Path::builder();
        let first = self.device(points[0]);
        builder.begin(point(first.x as f32, first.y as f32));
        for p in &points[1..] {
            let d = self.device(*p);
            builder.line_to(point(d.x as f32, d.y as f32));
        }
        builder.end(closed);
        builder.build()
    }

    fn fill_path(&mut self, path: &Path, color: Color) {
        let result = self.fill_tess.tessellate_path(
            path,
            &FillOptions::tolerance(0.5),
            &mut BuffersBuilder::new(&mut self.geometry, VertexCtor { color }),
        );
        if result.is_ok() {
            self.flush_geometry();
        } else {
            self.geometry.vertices.clear();
            self.geometry.indices.clear();
        }
    }

    fn stroke_path(&mut self, path: &Path, width: f64, color: Color) {
        let result = self.stroke_tess.tessellate_path(
            path,
            &StrokeOptions::tolerance(0.5).with_line_width(width as f32),
            &mut BuffersBuilder::new(&mut self.geometry, VertexCtor { color }),
        );
        if result.is_ok() {
            self.flush_geometry();
        } else {
            self.geometry.vertices.clear();
            self.geometry.indices.clear();
        }
    }
}

impl Surface for VectorSurface {
    fn container_size(&self) -> Option<DVec2> {
        if self.attached { self.container } else { None }
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn configure(&mut self, logical_size: DVec2, pixel_ratio: f64) {
        self.backing = logical_size * pixel_ratio;
        self.stack.clear();
        self.state.transform = DAffine2::from_scale(DVec2::splat(pixel_ratio));
    }

    fn clear(&mut self) {
        self.vertices.clear();
        self.batches.clear();
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn translate(&mut self, offset: DVec2) {
        self.state.transform = self.state.transform * DAffine2::from_translation(offset);
    }

    fn rotate(&mut self, radians: f64) {
        self.state.transform = self.state.transform * DAffine2::from_angle(radians);
    }

    fn fill_polygon(&mut self, points: &[DVec2], color: Color) {
        if points.len() < 3 {
            return;
        }
        let path = self.device_path(points, true);
        let color = self.shade(color);
        self.fill_path(&path, color);
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Color) {
        if radius <= 0.0 {
            return;
        }
        let c = self.device(center);
        let mut builder = Path::builder();
        builder.add_circle(
            point(c.x as f32, c.y as f32),
            (radius * self.scale()) as f32,
            lyon::path::Winding::Positive,
        );
        let path = builder.build();
        let color = self.shade(color);
        self.fill_path(&path, color);
    }

    fn fill_glow(&mut self, center: DVec2, radius: f64, color: Color) {
        if radius <= 0.0 {
            return;
        }
        // Triangle fan: opaque hub, transparent rim.
        let inner = self.shade(color);
        let outer = inner.with_alpha(0.0);
        let hub = VectorVertex::at(self.device(center), inner);
        let rim: Vec<VectorVertex> = (0..=GLOW_SEGMENTS)
            .map(|i| {
                let angle = i as f64 / GLOW_SEGMENTS as f64 * std::f64::consts::TAU;
                VectorVertex::at(self.device(center + DVec2::from_angle(angle) * radius), outer)
            })
            .collect();
        let fan: Vec<VectorVertex> = rim
            .windows(2)
            .flat_map(|pair| [hub, pair[0], pair[1]])
            .collect();
        self.emit(fan);
    }

    fn stroke_polyline(&mut self, points: &[DVec2], width: f64, color: Color) {
        if points.len() < 2 || width <= 0.0 {
            return;
        }
        let path = self.device_path(points, false);
        let color = self.shade(color);
        let width = width * self.scale();
        self.stroke_path(&path, width, color);
    }

    fn detach(&mut self) {
        self.attached = false;
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn vector_vertex_is_24_bytes() {
        assert_eq!(size_of::<VectorVertex>(), 24);
        assert_eq!(VectorVertex::STRIDE_BYTES, 24);
    }

    #[test]
    fn fill_triangle_produces_one_triangle() {
        let mut s = VectorSurface::new(100.0, 100.0);
        s.fill_polygon(
            &[DVec2::new(0.0, 0.0), DVec2::new(100.0, 0.0), DVec2::new(50.0, 100.0)],
            Color::WHITE,
        );
        assert_eq!(s.vertex_count(), 3);
        assert_eq!(s.as_floats().len(), 3 * VectorVertex::FLOATS);
    }

    #[test]
    fn degenerate_input_produces_nothing() {
        let mut s = VectorSurface::new(100.0, 100.0);
        s.fill_polygon(&[DVec2::ZERO, DVec2::ONE], Color::WHITE);
        s.fill_circle(DVec2::ZERO, 0.0, Color::WHITE);
        s.stroke_polyline(&[DVec2::ZERO], 1.0, Color::WHITE);
        assert_eq!(s.vertex_count(), 0);
        assert!(s.batches().is_empty());
    }

    #[test]
    fn transform_stack_applies_translation() {
        let mut s = VectorSurface::new(100.0, 100.0);
        s.save();
        s.translate(DVec2::new(10.0, 20.0));
        s.fill_polygon(
            &[DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(0.0, 1.0)],
            Color::WHITE,
        );
        s.restore();
        assert!(s.vertices().iter().all(|v| v.x >= 10.0 && v.y >= 20.0));
    }

    #[test]
    fn configure_scales_by_pixel_ratio_without_accumulating() {
        let mut s = VectorSurface::new(100.0, 50.0);
        s.configure(DVec2::new(100.0, 50.0), 2.0);
        s.configure(DVec2::new(100.0, 50.0), 2.0);
        assert_eq!(s.backing_size(), DVec2::new(200.0, 100.0));
        s.fill_polygon(
            &[DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0), DVec2::new(0.0, 10.0)],
            Color::WHITE,
        );
        let max_x = s.vertices().iter().map(|v| v.x).fold(0.0, f32::max);
        assert_eq!(max_x, 20.0);
    }

    #[test]
    fn alpha_fades_vertex_colors() {
        let mut s = VectorSurface::new(100.0, 100.0);
        s.set_alpha(0.5);
        s.fill_polygon(
            &[DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(0.0, 1.0)],
            Color::WHITE.with_alpha(0.8),
        );
        assert!(s.vertices().iter().all(|v| (v.a - 0.4).abs() < 1e-6));
    }

    #[test]
    fn glow_fades_to_transparent_rim() {
        let mut s = VectorSurface::new(100.0, 100.0);
        s.fill_glow(DVec2::new(50.0, 50.0), 10.0, Color::WHITE);
        assert_eq!(s.vertex_count(), GLOW_SEGMENTS * 3);
        assert!(s.vertices().iter().any(|v| v.a == 1.0));
        assert!(s.vertices().iter().any(|v| v.a == 0.0));
    }

    #[test]
    fn blend_changes_open_new_batches() {
        let mut s = VectorSurface::new(100.0, 100.0);
        let tri = [DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(0.0, 1.0)];
        s.fill_polygon(&tri, Color::WHITE);
        s.fill_polygon(&tri, Color::WHITE);
        s.set_blend_mode(BlendMode::Lighter);
        s.fill_polygon(&tri, Color::WHITE);
        assert_eq!(
            s.batches(),
            &[
                BlendBatch { mode: BlendMode::Normal, start: 0, end: 6 },
                BlendBatch { mode: BlendMode::Lighter, start: 6, end: 9 },
            ]
        );
    }

    #[test]
    fn stroke_produces_vertices_and_detach_clears() {
        let mut s = VectorSurface::new(100.0, 100.0);
        s.stroke_line(DVec2::ZERO, DVec2::new(50.0, 50.0), 1.0, Color::WHITE);
        assert!(s.vertex_count() > 0);
        s.detach();
        assert_eq!(s.vertex_count(), 0);
        assert!(s.container_size().is_none());
    }
}
