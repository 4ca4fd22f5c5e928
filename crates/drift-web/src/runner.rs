use std::collections::BTreeMap;

use drift_engine::{Backdrop, Config, InputEvent, MotionGraphicsController};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::events::EventListener;
use crate::surface::CanvasSurface;

/// Page-wide runner: owns the controller, its DOM listeners and the
/// `requestAnimationFrame` loop that ticks every region.
///
/// wasm-bindgen cannot export generic structs, so the bridge keeps one of
/// these in a `thread_local!` and exposes free functions over it.
pub struct PageRunner {
    window: Window,
    controller: MotionGraphicsController<CanvasSurface>,
    /// Listeners owned by a region; dropped (unregistered) with it.
    region_listeners: BTreeMap<String, Vec<EventListener>>,
    page_listeners: Vec<EventListener>,
    on_frame: Closure<dyn FnMut(f64)>,
    scheduled: bool,
}

impl PageRunner {
    pub fn new(window: Window, seed: u64, on_frame: Closure<dyn FnMut(f64)>) -> Self {
        Self {
            window,
            controller: MotionGraphicsController::with_seed(seed),
            region_listeners: BTreeMap::new(),
            page_listeners: Vec::new(),
            on_frame,
            scheduled: false,
        }
    }

    pub fn controller(&self) -> &MotionGraphicsController<CanvasSurface> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut MotionGraphicsController<CanvasSurface> {
        &mut self.controller
    }

    /// Keep a page-level listener alive for the runner's lifetime.
    pub fn keep(&mut self, listener: EventListener) {
        self.page_listeners.push(listener);
    }

    /// Add a particle region and the listeners that feed it.
    /// Returns whether the new system is alive.
    pub fn add_region(
        &mut self,
        name: &str,
        surface: CanvasSurface,
        config: Config,
        listeners: Vec<EventListener>,
    ) -> bool {
        let alive = self.controller.add_system(name, surface, config).is_alive();
        self.region_listeners.insert(name.to_string(), listeners);
        self.schedule();
        alive
    }

    pub fn add_backdrop(&mut self, name: &str, backdrop: impl Into<Backdrop<CanvasSurface>>) {
        self.controller.add_backdrop(name, backdrop);
        self.schedule();
    }

    /// Attach extra listeners to an existing region (e.g. hover on a parent card).
    pub fn listen(&mut self, name: &str, listener: EventListener) {
        self.region_listeners.entry(name.to_string()).or_default().push(listener);
    }

    pub fn remove_region(&mut self, name: &str) -> bool {
        self.region_listeners.remove(name);
        self.controller.remove_system(name) | self.controller.remove_backdrop(name)
    }

    pub fn dispatch(&mut self, name: &str, event: InputEvent) {
        self.controller.dispatch(name, event);
    }

    pub fn viewport_resized(&mut self) {
        if let Some(width) = self.window.inner_width().ok().and_then(|w| w.as_f64()) {
            self.controller.apply_viewport(width);
        }
        self.controller.resize_all();
        self.schedule();
    }

    pub fn visibility_changed(&mut self, hidden: bool) {
        self.controller.visibility_changed(hidden);
        if !hidden {
            self.schedule();
        }
    }

    pub fn pause_all(&mut self) {
        self.controller.pause_all();
    }

    pub fn resume_all(&mut self) {
        self.controller.resume_all();
        self.schedule();
    }

    pub fn destroy_all(&mut self) {
        self.region_listeners.clear();
        self.controller.destroy_all();
    }

    /// Request a frame unless one is already pending.
    pub fn schedule(&mut self) {
        if self.scheduled {
            return;
        }
        match self.window.request_animation_frame(self.on_frame.as_ref().unchecked_ref()) {
            Ok(_) => self.scheduled = true,
            Err(err) => log::error!("requestAnimationFrame failed: {:?}", err),
        }
    }

    /// One animation frame. The loop idles once nothing is running and is
    /// restarted by the next operation that can make something run.
    pub fn tick(&mut self, now_ms: f64) {
        self.scheduled = false;
        if self.controller.frame(now_ms) {
            self.schedule();
        }
    }
}
