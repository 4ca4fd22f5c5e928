//! The drawable-surface seam between the engine and a host.
//!
//! The engine never talks to a browser directly. A host supplies a `Surface`
//! (an HTML canvas in `drift-web`, a lyon tessellator for headless runs) and
//! the engine issues canvas-style draw calls against it.

use glam::DVec2;

use crate::api::types::BlendMode;
use crate::renderer::color::Color;

/// A 2D drawing target bound to a container on the host page.
///
/// Coordinates are in CSS pixels; implementations apply the device pixel
/// ratio themselves after `configure`. `save`/`restore` bracket the
/// transform, alpha and blend state, like a canvas context.
pub trait Surface {
    /// Size of the backing container, or `None` once it has been removed.
    fn container_size(&self) -> Option<DVec2>;

    /// Physical pixels per CSS pixel.
    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }

    /// Size the backing store to `logical_size * pixel_ratio` and reset the base
    /// transform to a `pixel_ratio` scale. Must be safe to call repeatedly.
    fn configure(&mut self, logical_size: DVec2, pixel_ratio: f64);

    /// Erase the whole surface.
    fn clear(&mut self);

    fn save(&mut self);
    fn restore(&mut self);
    fn set_blend_mode(&mut self, mode: BlendMode);
    /// Global alpha multiplied into every following fill and stroke.
    fn set_alpha(&mut self, alpha: f64);
    fn translate(&mut self, offset: DVec2);
    fn rotate(&mut self, radians: f64);

    /// Fill a closed polygon.
    fn fill_polygon(&mut self, points: &[DVec2], color: Color);
    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Color);
    /// Radial gradient from `color` at `center` to transparent at `radius`.
    fn fill_glow(&mut self, center: DVec2, radius: f64, color: Color);
    /// Stroke an open polyline.
    fn stroke_polyline(&mut self, points: &[DVec2], width: f64, color: Color);

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Color) {
        self.stroke_polyline(&[from, to], width, color);
    }

    /// Remove the surface from its container. No draw calls follow.
    fn detach(&mut self);
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// One recorded surface call.
    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawCall {
        Configure { size: DVec2, ratio: f64 },
        Clear,
        Save,
        Restore,
        Blend(BlendMode),
        Alpha(f64),
        Translate(DVec2),
        Rotate(f64),
        Polygon { points: Vec<DVec2>, color: Color },
        Circle { center: DVec2, radius: f64, color: Color },
        Glow { center: DVec2, radius: f64, color: Color },
        Polyline { points: Vec<DVec2>, width: f64, color: Color },
        Detach,
    }

    /// Surface that records every call, for asserting on render passes.
    #[derive(Debug)]
    pub struct RecordingSurface {
        pub size: Option<DVec2>,
        pub ratio: f64,
        pub calls: Vec<DrawCall>,
        pub detached: bool,
        /// Calls of any kind made after `detach`.
        pub after_detach: Cell<usize>,
        /// Shared flag set by `detach`; outlives the surface.
        pub detach_seen: Rc<Cell<bool>>,
    }

    impl RecordingSurface {
        pub fn new(width: f64, height: f64) -> Self {
            Self {
                size: Some(DVec2::new(width, height)),
                ratio: 1.0,
                calls: Vec::new(),
                detached: false,
                after_detach: Cell::new(0),
                detach_seen: Rc::new(Cell::new(false)),
            }
        }

        /// A surface whose container could not be found.
        pub fn missing() -> Self {
            Self { size: None, ..Self::new(0.0, 0.0) }
        }

        pub fn count(&self, pred: impl Fn(&DrawCall) -> bool) -> usize {
            self.calls.iter().filter(|c| pred(c)).count()
        }

        pub fn lines(&self) -> Vec<&DrawCall> {
            self.calls
                .iter()
                .filter(|c| matches!(c, DrawCall::Polyline { .. }))
                .collect()
        }

        fn touch(&self) {
            if self.detached {
                self.after_detach.set(self.after_detach.get() + 1);
            }
        }

        fn record(&mut self, call: DrawCall) {
            self.touch();
            self.calls.push(call);
        }
    }

    impl Surface for RecordingSurface {
        fn container_size(&self) -> Option<DVec2> {
            self.touch();
            self.size
        }

        fn device_pixel_ratio(&self) -> f64 {
            self.touch();
            self.ratio
        }

        fn configure(&mut self, size: DVec2, ratio: f64) {
            self.record(DrawCall::Configure { size, ratio });
        }

        fn clear(&mut self) {
            self.record(DrawCall::Clear);
        }

        fn save(&mut self) {
            self.record(DrawCall::Save);
        }

        fn restore(&mut self) {
            self.record(DrawCall::Restore);
        }

        fn set_blend_mode(&mut self, mode: BlendMode) {
            self.record(DrawCall::Blend(mode));
        }

        fn set_alpha(&mut self, alpha: f64) {
            self.record(DrawCall::Alpha(alpha));
        }

        fn translate(&mut self, offset: DVec2) {
            self.record(DrawCall::Translate(offset));
        }

        fn rotate(&mut self, radians: f64) {
            self.record(DrawCall::Rotate(radians));
        }

        fn fill_polygon(&mut self, points: &[DVec2], color: Color) {
            self.record(DrawCall::Polygon { points: points.to_vec(), color });
        }

        fn fill_circle(&mut self, center: DVec2, radius: f64, color: Color) {
            self.record(DrawCall::Circle { center, radius, color });
        }

        fn fill_glow(&mut self, center: DVec2, radius: f64, color: Color) {
            self.record(DrawCall::Glow { center, radius, color });
        }

        fn stroke_polyline(&mut self, points: &[DVec2], width: f64, color: Color) {
            self.record(DrawCall::Polyline { points: points.to_vec(), width, color });
        }

        fn detach(&mut self) {
            self.record(DrawCall::Detach);
            self.detached = true;
            self.detach_seen.set(true);
            self.size = None;
        }
    }
}
