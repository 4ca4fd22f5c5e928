use std::f64::consts::TAU;

use drift_engine::glam::DVec2;
use drift_engine::{BlendMode, Color, Surface};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, Window};

/// Inline style for a particle region's canvas.
pub fn region_css(interactive: bool) -> String {
    format!(
        "position: absolute; top: 0; left: 0; width: 100%; height: 100%; \
         pointer-events: {}; z-index: 1;",
        if interactive { "auto" } else { "none" }
    )
}

/// Inline style for a backdrop canvas drawn under the page content.
pub fn backdrop_css(opacity: f64) -> String {
    format!(
        "position: absolute; top: 0; left: 0; width: 100%; height: 100%; \
         pointer-events: none; z-index: 0; opacity: {};",
        opacity
    )
}

/// `Surface` over a `<canvas>` appended to a container element.
pub struct CanvasSurface {
    window: Window,
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// Backing-store size in device pixels.
    backing: DVec2,
    attached: bool,
}

impl CanvasSurface {
    /// Create a canvas styled with `css` and append it to `container`.
    pub fn attach(container: &HtmlElement, css: &str) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;

        canvas.style().set_css_text(css);
        container.style().set_property("position", "relative")?;
        container.append_child(&canvas)?;

        Ok(Self {
            window,
            container: container.clone(),
            canvas,
            ctx,
            backing: DVec2::ZERO,
            attached: true,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn path(&self, points: &[DVec2], close: bool) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for p in rest {
            self.ctx.line_to(p.x, p.y);
        }
        if close {
            self.ctx.close_path();
        }
    }
}

/// Canvas calls only throw on invalid arguments; a bad frame is not worth surfacing.
fn soft(result: Result<(), JsValue>) {
    if let Err(err) = result {
        log::trace!("canvas call failed: {:?}", err);
    }
}

impl Surface for CanvasSurface {
    fn container_size(&self) -> Option<DVec2> {
        if !self.attached || !self.container.is_connected() {
            return None;
        }
        let rect = self.container.get_bounding_client_rect();
        Some(DVec2::new(rect.width(), rect.height()))
    }

    fn device_pixel_ratio(&self) -> f64 {
        let ratio = self.window.device_pixel_ratio();
        if ratio > 0.0 { ratio } else { 1.0 }
    }

    fn configure(&mut self, logical_size: DVec2, pixel_ratio: f64) {
        self.backing = (logical_size * pixel_ratio).round();
        self.canvas.set_width(self.backing.x as u32);
        self.canvas.set_height(self.backing.y as u32);
        let style = self.canvas.style();
        soft(style.set_property("width", &format!("{}px", logical_size.x)));
        soft(style.set_property("height", &format!("{}px", logical_size.y)));
        // Resizing the backing store resets the context, so this never accumulates.
        soft(self.ctx.set_transform(pixel_ratio, 0.0, 0.0, pixel_ratio, 0.0, 0.0));
    }

    fn clear(&mut self) {
        self.ctx.save();
        soft(self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0));
        self.ctx.clear_rect(0.0, 0.0, self.backing.x, self.backing.y);
        self.ctx.restore();
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        soft(self.ctx.set_global_composite_operation(mode.composite_operation()));
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }

    fn translate(&mut self, offset: DVec2) {
        soft(self.ctx.translate(offset.x, offset.y));
    }

    fn rotate(&mut self, radians: f64) {
        soft(self.ctx.rotate(radians));
    }

    fn fill_polygon(&mut self, points: &[DVec2], color: Color) {
        self.path(points, true);
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill();
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Color) {
        self.ctx.begin_path();
        soft(self.ctx.arc(center.x, center.y, radius.max(0.0), 0.0, TAU));
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill();
    }

    fn fill_glow(&mut self, center: DVec2, radius: f64, color: Color) {
        let radius = radius.max(0.0);
        let gradient = match self
            .ctx
            .create_radial_gradient(center.x, center.y, 0.0, center.x, center.y, radius)
        {
            Ok(gradient) => gradient,
            Err(err) => {
                log::trace!("radial gradient failed: {:?}", err);
                return;
            }
        };
        soft(gradient.add_color_stop(0.0, &color.to_css()));
        soft(gradient.add_color_stop(1.0, "transparent"));
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.begin_path();
        soft(self.ctx.arc(center.x, center.y, radius, 0.0, TAU));
        self.ctx.fill();
    }

    fn stroke_polyline(&mut self, points: &[DVec2], width: f64, color: Color) {
        if points.len() < 2 {
            return;
        }
        self.path(points, false);
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width);
        self.ctx.stroke();
    }

    fn detach(&mut self) {
        if self.attached {
            self.canvas.remove();
            self.attached = false;
        }
    }
}
