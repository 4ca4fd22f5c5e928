//! Ambient backdrops that sit behind particle regions: a flow-field tracer
//! and three morphing glow blobs. Same run/destroy contract as a particle system.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use glam::DVec2;

use crate::core::forces::wrap;
use crate::core::rng::Rng;
use crate::renderer::color::Color;
use crate::renderer::surface::Surface;
use crate::systems::particle_system::Lifecycle;

pub const FLOW_TRACERS: usize = 100;
pub const FLOW_HISTORY: usize = 20;
pub const FLOW_SPEED: f64 = 0.5;
pub const FLOW_STROKE: Color = Color::new(102.0 / 255.0, 126.0 / 255.0, 234.0 / 255.0, 0.5);
/// Translucent wash laid over the previous frame so old strokes fade out.
pub const FLOW_WASH: Color = Color::new(0.0, 0.0, 0.0, 0.02);

pub const MORPH_BLOBS: usize = 3;

/// Heading of the flow field at `position` after `tick` frames.
pub fn flow_angle(position: DVec2, tick: u64) -> f64 {
    (position.x * 0.01).sin() * (position.y * 0.01).cos() + tick as f64 * 0.01
}

/// Bookkeeping shared by both backdrops.
struct Stage<S: Surface> {
    surface: S,
    size: DVec2,
    lifecycle: Lifecycle,
    running: bool,
}

impl<S: Surface> Stage<S> {
    fn open(mut surface: S, what: &str) -> Self {
        let (size, lifecycle) = match surface.container_size() {
            Some(size) => {
                let ratio = surface.device_pixel_ratio();
                surface.configure(size, ratio);
                (size, Lifecycle::Active)
            }
            None => {
                log::error!("{} container not found", what);
                (DVec2::ZERO, Lifecycle::Inert)
            }
        };
        Stage { surface, size, lifecycle, running: lifecycle == Lifecycle::Active }
    }

    /// Liveness gate run at the top of every frame.
    fn ready(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Active || !self.running {
            return false;
        }
        if self.surface.container_size().is_none() {
            self.running = false;
            return false;
        }
        true
    }

    fn resize(&mut self) {
        if self.lifecycle != Lifecycle::Active {
            return;
        }
        if let Some(size) = self.surface.container_size() {
            let ratio = self.surface.device_pixel_ratio();
            self.size = size;
            self.surface.configure(size, ratio);
        }
    }

    fn resume(&mut self) {
        if self.lifecycle == Lifecycle::Active {
            self.running = true;
        }
    }

    fn destroy(&mut self) {
        self.running = false;
        if self.lifecycle == Lifecycle::Active {
            self.surface.detach();
        }
        self.lifecycle = Lifecycle::Destroyed;
    }
}

struct Tracer {
    position: DVec2,
    history: VecDeque<DVec2>,
}

/// Tracer points advected along a slowly rotating angle field.
pub struct FlowField<S: Surface> {
    stage: Stage<S>,
    tracers: Vec<Tracer>,
    tick: u64,
}

impl<S: Surface> FlowField<S> {
    pub fn new(surface: S, seed: u64) -> Self {
        let stage = Stage::open(surface, "flow field");
        let mut rng = Rng::new(seed);
        let tracers = if stage.lifecycle == Lifecycle::Active {
            (0..FLOW_TRACERS)
                .map(|_| Tracer {
                    position: DVec2::new(rng.next_f64() * stage.size.x, rng.next_f64() * stage.size.y),
                    history: VecDeque::with_capacity(FLOW_HISTORY),
                })
                .collect()
        } else {
            Vec::new()
        };
        FlowField { stage, tracers, tick: 0 }
    }

    pub fn frame(&mut self, _now_ms: f64) -> bool {
        if !self.stage.ready() {
            return false;
        }
        self.step();
        self.render();
        true
    }

    pub fn step(&mut self) {
        let bounds = self.stage.size;
        for tracer in &mut self.tracers {
            let velocity = DVec2::from_angle(flow_angle(tracer.position, self.tick)) * FLOW_SPEED;
            tracer.position = wrap(tracer.position + velocity, bounds);
            if tracer.history.len() == FLOW_HISTORY {
                tracer.history.pop_front();
            }
            tracer.history.push_back(tracer.position);
        }
        self.tick += 1;
    }

    fn render(&mut self) {
        let size = self.stage.size;
        let surface = &mut self.stage.surface;
        surface.fill_polygon(
            &[DVec2::ZERO, DVec2::new(size.x, 0.0), size, DVec2::new(0.0, size.y)],
            FLOW_WASH,
        );

        let half = size * 0.5;
        let mut run: Vec<DVec2> = Vec::with_capacity(FLOW_HISTORY);
        for tracer in &self.tracers {
            run.clear();
            for &point in &tracer.history {
                if let Some(&last) = run.last() {
                    let jump = (point - last).abs();
                    if jump.x > half.x || jump.y > half.y {
                        if run.len() >= 2 {
                            surface.stroke_polyline(&run, 1.0, FLOW_STROKE);
                        }
                        run.clear();
                    }
                }
                run.push(point);
            }
            if run.len() >= 2 {
                surface.stroke_polyline(&run, 1.0, FLOW_STROKE);
            }
        }
    }

    pub fn tracer_positions(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.tracers.iter().map(|t| t.position)
    }

    pub fn resize(&mut self) {
        self.stage.resize();
    }

    pub fn pause(&mut self) {
        self.stage.running = false;
    }

    pub fn resume(&mut self) {
        self.stage.resume();
    }

    pub fn destroy(&mut self) {
        self.stage.destroy();
        self.tracers = Vec::new();
    }

    pub fn is_running(&self) -> bool {
        self.stage.running
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.stage.lifecycle
    }

    pub fn surface(&self) -> &S {
        &self.stage.surface
    }
}

impl<S: Surface> Drop for FlowField<S> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Center, radius and color of blob `index` after `tick` frames.
pub fn morph_blob(index: usize, tick: u64, center: DVec2) -> (DVec2, f64, Color) {
    let t = tick as f64;
    let k = index as f64 * TAU / MORPH_BLOBS as f64;
    let position = center + DVec2::new((t * 0.01 + k).sin() * 100.0, (t * 0.008 + k).cos() * 80.0);
    let radius = 50.0 + (t * 0.02 + k).sin() * 30.0;
    let color = Color::hsla(240.0 + 60.0 * index as f32, 0.7, 0.6, 0.3);
    (position, radius, color)
}

/// Soft glow blobs orbiting the surface center.
pub struct MorphingBackground<S: Surface> {
    stage: Stage<S>,
    tick: u64,
}

impl<S: Surface> MorphingBackground<S> {
    pub fn new(surface: S) -> Self {
        MorphingBackground { stage: Stage::open(surface, "morphing background"), tick: 0 }
    }

    pub fn frame(&mut self, _now_ms: f64) -> bool {
        if !self.stage.ready() {
            return false;
        }
        let center = self.stage.size * 0.5;
        let surface = &mut self.stage.surface;
        surface.clear();
        for i in 0..MORPH_BLOBS {
            let (position, radius, color) = morph_blob(i, self.tick, center);
            surface.fill_glow(position, radius, color);
        }
        self.tick += 1;
        true
    }

    pub fn resize(&mut self) {
        self.stage.resize();
    }

    pub fn pause(&mut self) {
        self.stage.running = false;
    }

    pub fn resume(&mut self) {
        self.stage.resume();
    }

    pub fn destroy(&mut self) {
        self.stage.destroy();
    }

    pub fn is_running(&self) -> bool {
        self.stage.running
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.stage.lifecycle
    }

    pub fn surface(&self) -> &S {
        &self.stage.surface
    }
}

impl<S: Surface> Drop for MorphingBackground<S> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Any backdrop the controller can own.
pub enum Backdrop<S: Surface> {
    FlowField(FlowField<S>),
    Morphing(MorphingBackground<S>),
}

impl<S: Surface> Backdrop<S> {
    pub fn frame(&mut self, now_ms: f64) -> bool {
        match self {
            Backdrop::FlowField(b) => b.frame(now_ms),
            Backdrop::Morphing(b) => b.frame(now_ms),
        }
    }

    pub fn resize(&mut self) {
        match self {
            Backdrop::FlowField(b) => b.resize(),
            Backdrop::Morphing(b) => b.resize(),
        }
    }

    pub fn pause(&mut self) {
        match self {
            Backdrop::FlowField(b) => b.pause(),
            Backdrop::Morphing(b) => b.pause(),
        }
    }

    pub fn resume(&mut self) {
        match self {
            Backdrop::FlowField(b) => b.resume(),
            Backdrop::Morphing(b) => b.resume(),
        }
    }

    pub fn destroy(&mut self) {
        match self {
            Backdrop::FlowField(b) => b.destroy(),
            Backdrop::Morphing(b) => b.destroy(),
        }
    }

    pub fn is_running(&self) -> bool {
        match self {
            Backdrop::FlowField(b) => b.is_running(),
            Backdrop::Morphing(b) => b.is_running(),
        }
    }
}

impl<S: Surface> From<FlowField<S>> for Backdrop<S> {
    fn from(field: FlowField<S>) -> Self {
        Backdrop::FlowField(field)
    }
}

impl<S: Surface> From<MorphingBackground<S>> for Backdrop<S> {
    fn from(morph: MorphingBackground<S>) -> Self {
        Backdrop::Morphing(morph)
    }
}
