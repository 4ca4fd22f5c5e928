//! The particle engine: one particle collection bound to one surface.
//!
//! Frame-driven and single-threaded. The host calls `frame` once per display
//! refresh while `is_running()`; forwarded events are queued with
//! `push_input` and consumed at the top of the next frame, never rendered
//! synchronously.

use std::f64::consts::TAU;

use glam::DVec2;

use crate::api::config::{Config, ConfigError, ConfigUpdate};
use crate::core::forces::{field_delta, inflated_size, pointer_repulsion, wrap};
use crate::core::particle::{Particle, Trail, TrailPoint};
use crate::core::rng::Rng;
use crate::input::pointer::PointerState;
use crate::input::queue::{InputEvent, InputQueue};
use crate::renderer::surface::Surface;
use crate::systems::connections::ConnectionGraph;
use crate::systems::shapes::draw_particle;

/// Particles in one explosion ring.
pub const EXPLOSION_COUNT: usize = 15;
pub const EXPLOSION_SPEED: f64 = 5.0;
pub const EXPLOSION_LIFE_FACTOR: f64 = 0.5;
pub const EXPLOSION_SIZE_FACTOR: f64 = 1.5;
/// Burst size used when the host does not choose one.
pub const DEFAULT_BURST_COUNT: usize = 10;
pub const BURST_SPEED_MIN: f64 = 1.0;
pub const BURST_SPEED_MAX: f64 = 4.0;

const DEFAULT_SEED: u64 = 0x5eed_d21f7;

/// Whether a system can still be operated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Construction failed; every operation is a no-op.
    Inert,
    Active,
    /// `destroy` was called. Terminal.
    Destroyed,
}

pub struct ParticleSystem<S: Surface> {
    surface: S,
    config: Config,
    particles: Vec<Particle>,
    pointer: PointerState,
    input: InputQueue,
    connections: ConnectionGraph,
    /// Scratch buffer of live positions for the connection pass.
    positions: Vec<DVec2>,
    rng: Rng,
    /// Surface size in CSS pixels.
    size: DVec2,
    lifecycle: Lifecycle,
    running: bool,
    resize_pending: bool,
}

impl<S: Surface> ParticleSystem<S> {
    /// Bind a new system to `surface` and start it.
    ///
    /// A surface without a container, or an invalid configuration, is logged
    /// and yields an inert system rather than an error.
    pub fn new(surface: S, config: Config) -> Self {
        Self::with_seed(surface, config, DEFAULT_SEED)
    }

    pub fn with_seed(surface: S, config: Config, seed: u64) -> Self {
        let mut system = ParticleSystem {
            surface,
            config,
            particles: Vec::new(),
            pointer: PointerState::new(),
            input: InputQueue::new(),
            connections: ConnectionGraph::new(),
            positions: Vec::new(),
            rng: Rng::new(seed),
            size: DVec2::ZERO,
            lifecycle: Lifecycle::Inert,
            running: false,
            resize_pending: false,
        };

        if let Err(err) = system.config.validate() {
            log::warn!("particle system disabled, invalid configuration: {}", err);
            return system;
        }
        if system.surface.container_size().is_none() {
            log::error!("particle container not found");
            return system;
        }

        system.lifecycle = Lifecycle::Active;
        system.resize();
        system.create_particles();
        system.start();
        system
    }

    // -- Frame loop --

    /// Run one scheduled frame: consume input, step, render.
    /// Returns whether the host should schedule another frame.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if !self.is_alive() || !self.running {
            return false;
        }
        if self.surface.container_size().is_none() {
            log::debug!("particle surface lost its container, stopping");
            self.running = false;
            return false;
        }

        for event in self.input.drain() {
            self.apply_input(event);
        }
        if self.resize_pending {
            self.resize();
        }
        self.step(now_ms);
        self.render();
        self.running
    }

    /// Queue a forwarded host event for the next frame.
    pub fn push_input(&mut self, event: InputEvent) {
        if !self.is_alive() {
            return;
        }
        match event {
            InputEvent::Resize => self.resize_pending = true,
            _ if !self.running || !self.config.interactive => {}
            _ => self.input.push(event),
        }
    }

    fn apply_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { x, y, time_ms } => self.pointer.moved(DVec2::new(x, y), time_ms),
            InputEvent::PointerLeave => self.pointer.left(),
            InputEvent::Click { x, y } => self.explode_at(x, y),
            InputEvent::Resize => self.resize_pending = true,
        }
    }

    /// Advance every particle by one frame.
    ///
    /// Particles left dead by the previous step are removed first (non-respawn
    /// policy). The per-particle order is fixed: fields, pointer force,
    /// integrate, rotate, trail, life/opacity, wrap, respawn.
    pub fn step(&mut self, now_ms: f64) {
        if !self.is_alive() {
            return;
        }
        if !self.config.respawn {
            self.particles.retain(|p| !p.is_dead());
        }

        let config = &self.config;
        let fields = field_delta(config.gravity, config.wind);
        let pointer_active = config.interactive && self.pointer.is_moving(now_ms, config.pointer_idle_ms);
        let pointer = self.pointer.position;
        let bounds = self.size;
        let max_opacity = config.opacity.max;

        for p in &mut self.particles {
            p.velocity += fields;

            let repulsion = if pointer_active {
                pointer_repulsion(p.position, pointer, config.pointer_radius, config.pointer_force)
            } else {
                None
            };
            if let Some(r) = &repulsion {
                p.velocity += r.delta;
            }
            p.size = inflated_size(p.base_size, repulsion.as_ref());

            p.position += p.velocity;
            p.angle += p.rotation_speed;
            p.trail.push(TrailPoint { position: p.position, opacity: p.opacity });

            p.life -= 1;
            p.opacity = p.life_ratio() * max_opacity;

            p.position = wrap(p.position, bounds);

            if p.is_dead() && config.respawn {
                p.respawn(config, bounds, &mut self.rng);
            }
        }
    }

    /// Clear the surface and draw every live particle, then the connections.
    pub fn render(&mut self) {
        if !self.is_alive() {
            return;
        }
        self.surface.clear();

        let shape = self.config.shape;
        let blend = self.config.blend_mode;
        for p in self.particles.iter().filter(|p| !p.is_dead()) {
            draw_particle(&mut self.surface, p, shape, blend, self.size);
        }

        if self.config.show_connections {
            let threshold = self.config.connection_distance;
            self.positions.clear();
            self.positions
                .extend(self.particles.iter().filter(|p| !p.is_dead()).map(|p| p.position));
            self.connections.rebuild(&self.positions, threshold);
            self.connections.draw(&mut self.surface, &self.positions, threshold);
        }
    }

    // -- Interaction --

    /// Ring of fast, short-lived, enlarged particles at `(x, y)`.
    /// Evicts the oldest particles when the population passes twice the configured count.
    pub fn explode_at(&mut self, x: f64, y: f64) {
        if !self.is_alive() {
            return;
        }
        let center = DVec2::new(x, y);
        for i in 0..EXPLOSION_COUNT {
            let angle = i as f64 / EXPLOSION_COUNT as f64 * TAU;
            let mut p = Particle::spawn(&self.config, self.size, Some(center), &mut self.rng);
            p.velocity = DVec2::from_angle(angle) * EXPLOSION_SPEED;
            p.life = (p.max_life as f64 * EXPLOSION_LIFE_FACTOR) as i64;
            p.max_life = p.life.max(1);
            p.base_size *= EXPLOSION_SIZE_FACTOR;
            p.size = p.base_size;
            self.particles.push(p);
        }

        let cap = self.config.particle_count * 2;
        let len = self.particles.len();
        if len > cap {
            let evict = (len - cap).max(EXPLOSION_COUNT).min(len);
            self.particles.drain(..evict);
        }
    }

    /// `count` particles at `(x, y)` with random directions and speeds.
    /// The population is not capped; bounding it is the caller's job.
    pub fn add_burst(&mut self, x: f64, y: f64, count: usize) {
        if !self.is_alive() {
            return;
        }
        let center = DVec2::new(x, y);
        self.particles.reserve(count);
        for _ in 0..count {
            let angle = self.rng.angle();
            let speed = self.rng.range(BURST_SPEED_MIN, BURST_SPEED_MAX);
            let mut p = Particle::spawn(&self.config, self.size, Some(center), &mut self.rng);
            p.velocity = DVec2::from_angle(angle) * speed;
            self.particles.push(p);
        }
    }

    /// Burst from the middle of the surface.
    pub fn burst_at_center(&mut self, count: usize) {
        let center = self.size * 0.5;
        self.add_burst(center.x, center.y, count);
    }

    /// Re-read the container size and reconfigure the surface. Idempotent.
    pub fn resize(&mut self) {
        if !self.is_alive() {
            return;
        }
        self.resize_pending = false;
        match self.surface.container_size() {
            Some(size) => {
                let ratio = self.surface.device_pixel_ratio();
                self.size = size;
                self.surface.configure(size, ratio);
            }
            None => log::debug!("resize skipped, particle container is gone"),
        }
    }

    // -- Configuration --

    /// Merge `update` into the live configuration.
    ///
    /// The merged result is validated before it replaces the current one; on
    /// error nothing changes. A new particle count recreates the collection.
    pub fn update_config(&mut self, update: &ConfigUpdate) -> Result<(), ConfigError> {
        if !self.is_alive() {
            return Ok(());
        }
        let next = self.config.merged(update).map_err(|err| {
            log::warn!("rejected particle configuration update: {}", err);
            err
        })?;
        self.swap_config(next);
        Ok(())
    }

    /// Replace the configuration wholesale, after validation.
    pub fn replace_config(&mut self, config: Config) -> Result<(), ConfigError> {
        if !self.is_alive() {
            return Ok(());
        }
        config.validate()?;
        self.swap_config(config);
        Ok(())
    }

    fn swap_config(&mut self, next: Config) {
        let recreate = next.particle_count != self.config.particle_count;
        let retrail = next.trail_length != self.config.trail_length;
        self.config = next;
        if recreate {
            self.create_particles();
        } else if retrail {
            let capacity = self.config.trail_length;
            for p in &mut self.particles {
                p.trail = Trail::with_capacity(capacity);
            }
        }
    }

    fn create_particles(&mut self) {
        let count = self.config.particle_count;
        let mut particles = Vec::with_capacity(count);
        for _ in 0..count {
            particles.push(Particle::spawn(&self.config, self.size, None, &mut self.rng));
        }
        self.particles = particles;
    }

    // -- Run state --

    pub fn start(&mut self) {
        if self.is_alive() {
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn pause(&mut self) {
        self.stop();
    }

    /// Restart only if stopped.
    pub fn resume(&mut self) {
        if !self.running {
            self.start();
        }
    }

    /// Drop every particle and blank the surface; the system stays usable.
    pub fn clear(&mut self) {
        if !self.is_alive() {
            return;
        }
        self.particles.clear();
        self.surface.clear();
    }

    /// Stop, detach the surface and release all particle state. Terminal.
    pub fn destroy(&mut self) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }
        self.running = false;
        if self.lifecycle == Lifecycle::Active {
            self.surface.detach();
        }
        self.particles = Vec::new();
        self.positions = Vec::new();
        self.input.clear();
        self.lifecycle = Lifecycle::Destroyed;
    }

    // -- Accessors --

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Surface size in CSS pixels.
    pub fn size(&self) -> DVec2 {
        self.size
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_alive(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<S: Surface> Drop for ParticleSystem<S> {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Shape, Span};
    use crate::renderer::surface::recording::{DrawCall, RecordingSurface};

    fn calm(count: usize) -> Config {
        Config {
            particle_count: count,
            gravity: 0.0,
            wind: 0.0,
            ..Config::default()
        }
    }

    fn system(config: Config) -> ParticleSystem<RecordingSurface> {
        ParticleSystem::with_seed(RecordingSurface::new(400.0, 300.0), config, 42)
    }

    #[test]
    fn construction_sizes_surface_and_starts() {
        let mut surface = RecordingSurface::new(400.0, 300.0);
        surface.ratio = 2.0;
        let sys = ParticleSystem::new(surface, calm(12));
        assert!(sys.is_alive());
        assert!(sys.is_running());
        assert_eq!(sys.particles().len(), 12);
        assert_eq!(sys.size(), DVec2::new(400.0, 300.0));
        assert_eq!(
            sys.surface().calls[0],
            DrawCall::Configure { size: DVec2::new(400.0, 300.0), ratio: 2.0 }
        );
    }

    #[test]
    fn missing_container_yields_inert_system() {
        let mut sys = ParticleSystem::new(RecordingSurface::missing(), calm(10));
        assert_eq!(sys.lifecycle(), Lifecycle::Inert);
        assert!(!sys.is_running());
        sys.explode_at(1.0, 1.0);
        sys.add_burst(1.0, 1.0, 5);
        sys.start();
        assert!(!sys.frame(16.0));
        assert!(sys.particles().is_empty());
        assert!(sys.update_config(&ConfigUpdate::new().with_particle_count(3)).is_ok());
        assert!(sys.surface().calls.is_empty());
    }

    #[test]
    fn invalid_config_yields_inert_system() {
        let config = Config { palette: Vec::new(), ..Config::default() };
        let sys = system(config);
        assert_eq!(sys.lifecycle(), Lifecycle::Inert);
    }

    #[test]
    fn population_is_invariant_under_respawn() {
        let config = Config {
            particle_life: Span::new(1, 5),
            ..calm(25)
        };
        let mut sys = system(config);
        for frame in 0..200 {
            assert!(sys.frame(frame as f64 * 16.0));
            assert_eq!(sys.particles().len(), 25);
        }
    }

    #[test]
    fn opacity_stays_within_bounds() {
        let config = Config {
            particle_life: Span::new(1, 30),
            opacity: Span::new(0.1, 0.6),
            ..Config::default()
        };
        let mut sys = system(config);
        sys.explode_at(100.0, 100.0);
        sys.add_burst(50.0, 50.0, 10);
        for frame in 0..100 {
            sys.step(frame as f64);
            for p in sys.particles() {
                assert!(p.opacity >= 0.0 && p.opacity <= 0.6, "opacity {}", p.opacity);
            }
        }
    }

    #[test]
    fn particles_wrap_across_edges() {
        let mut sys = system(calm(1));
        {
            let p = &mut sys.particles[0];
            p.position = DVec2::new(400.0 - 0.25, 150.0);
            p.velocity = DVec2::new(1.0, 0.0);
        }
        sys.step(0.0);
        let x = sys.particles()[0].position.x;
        assert!(x >= 0.0 && x < 1.0, "x wrapped to {}", x);

        {
            let p = &mut sys.particles[0];
            p.position = DVec2::new(10.0, 0.5);
            p.velocity = DVec2::new(0.0, -1.0);
        }
        sys.step(0.0);
        let y = sys.particles()[0].position.y;
        assert!(y < 300.0 && y > 299.0, "y wrapped to {}", y);
    }

    #[test]
    fn pointer_inflation_relaxes_to_base_size() {
        let config = Config {
            pointer_radius: 50.0,
            pointer_force: 0.5,
            ..calm(1)
        };
        let mut sys = system(config);
        {
            let p = &mut sys.particles[0];
            p.position = DVec2::new(200.0, 150.0);
            p.velocity = DVec2::ZERO;
        }
        let base = sys.particles()[0].base_size;

        sys.push_input(InputEvent::PointerMove { x: 210.0, y: 150.0, time_ms: 0.0 });
        sys.frame(5.0);
        let inflated = sys.particles()[0].size;
        assert!(inflated > base);
        assert!(sys.particles()[0].velocity.x < 0.0, "pushed away from the pointer");

        // Pointer now far away: size is recomputed, not accumulated.
        sys.push_input(InputEvent::PointerMove { x: 0.0, y: 0.0, time_ms: 10.0 });
        sys.frame(20.0);
        assert_eq!(sys.particles()[0].size, base);
    }

    #[test]
    fn idle_pointer_stops_repelling() {
        let config = Config { pointer_radius: 500.0, ..calm(1) };
        let mut sys = system(config);
        sys.particles[0].velocity = DVec2::ZERO;
        sys.push_input(InputEvent::PointerMove { x: 1.0, y: 1.0, time_ms: 0.0 });
        sys.frame(500.0);
        assert_eq!(sys.particles()[0].velocity, DVec2::ZERO);
        assert_eq!(sys.particles()[0].size, sys.particles()[0].base_size);
    }

    #[test]
    fn non_interactive_systems_ignore_pointer() {
        let config = Config { interactive: false, ..calm(4) };
        let mut sys = system(config);
        sys.push_input(InputEvent::Click { x: 10.0, y: 10.0 });
        sys.frame(0.0);
        assert_eq!(sys.particles().len(), 4);
    }

    #[test]
    fn click_explodes_on_next_frame() {
        let mut sys = system(calm(10));
        sys.push_input(InputEvent::Click { x: 100.0, y: 80.0 });
        assert_eq!(sys.particles().len(), 10);
        sys.frame(0.0);
        assert_eq!(sys.particles().len(), 10 + EXPLOSION_COUNT);
    }

    #[test]
    fn explosion_ring_is_even_and_fast() {
        let mut sys = system(calm(10));
        sys.explode_at(50.0, 60.0);
        let ring = &sys.particles()[10..];
        assert_eq!(ring.len(), EXPLOSION_COUNT);
        for (i, p) in ring.iter().enumerate() {
            assert_eq!(p.position, DVec2::new(50.0, 60.0));
            assert!((p.velocity.length() - EXPLOSION_SPEED).abs() < 1e-9);
            let expected = DVec2::from_angle(i as f64 / EXPLOSION_COUNT as f64 * TAU);
            assert!((p.velocity.normalize() - expected).length() < 1e-9);
            assert_eq!(p.life, p.max_life);
            assert!(p.max_life <= (Config::default().particle_life.max as f64 * 0.5) as i64);
            assert_eq!(p.size, p.base_size);
        }
    }

    #[test]
    fn explosions_never_exceed_twice_the_count() {
        let mut sys = system(calm(20));
        for i in 0..30 {
            sys.explode_at(i as f64, i as f64);
            assert!(sys.particles().len() <= 40, "population {}", sys.particles().len());
        }
    }

    #[test]
    fn explosion_evicts_oldest_first() {
        let mut sys = system(calm(10));
        sys.explode_at(1.0, 1.0);
        sys.explode_at(2.0, 2.0);
        // Each ring overshoots the cap of 20 by 5, so a full ring's worth of the oldest goes.
        assert_eq!(sys.particles().len(), 10);
        assert!(sys.particles().iter().all(|p| p.position == DVec2::new(2.0, 2.0)));
    }

    #[test]
    fn burst_is_uncapped() {
        let mut sys = system(calm(2));
        sys.add_burst(10.0, 10.0, 50);
        assert_eq!(sys.particles().len(), 52);
        for p in &sys.particles()[2..] {
            let speed = p.velocity.length();
            assert!(speed > BURST_SPEED_MIN - 1e-9 && speed < BURST_SPEED_MAX + 1e-9);
        }
        sys.burst_at_center(3);
        assert_eq!(sys.particles()[52].position, DVec2::new(200.0, 150.0));
    }

    #[test]
    fn dead_particles_are_removed_without_respawn() {
        let config = Config {
            respawn: false,
            particle_life: Span::new(2, 2),
            ..calm(3)
        };
        let mut sys = system(config);
        sys.step(0.0);
        sys.render();
        sys.step(16.0);
        assert_eq!(sys.particles().len(), 3);
        assert!(sys.particles().iter().all(|p| p.life == 0));
        sys.render();
        sys.step(32.0);
        assert!(sys.particles().is_empty());
    }

    #[test]
    fn render_draws_shapes_trails_and_connections() {
        let config = Config {
            shape: Shape::Diamond,
            connection_distance: 1000.0,
            ..calm(3)
        };
        let mut sys = system(config);
        sys.surface_mut().calls.clear();
        sys.frame(0.0);
        sys.frame(16.0);
        let calls = &sys.surface().calls;
        assert_eq!(calls.iter().filter(|c| **c == DrawCall::Clear).count(), 2);
        assert_eq!(sys.surface().count(|c| matches!(c, DrawCall::Polygon { .. })), 6);
        // Three pairs connect every frame; trails add one segment per particle on frame two.
        assert!(sys.surface().lines().len() >= 6);
    }

    #[test]
    fn connections_can_be_disabled() {
        let config = Config { show_connections: false, connection_distance: 1000.0, ..calm(5) };
        let mut sys = system(config);
        sys.surface_mut().calls.clear();
        sys.frame(0.0);
        assert!(sys.surface().lines().is_empty());
    }

    #[test]
    fn update_config_recreates_on_new_count() {
        let mut sys = system(calm(10));
        sys.explode_at(5.0, 5.0);
        sys.update_config(&ConfigUpdate::new().with_particle_count(4)).unwrap();
        assert_eq!(sys.particles().len(), 4);

        sys.add_burst(1.0, 1.0, 2);
        sys.update_config(&ConfigUpdate::new().with_shape(Shape::Star)).unwrap();
        assert_eq!(sys.particles().len(), 6);
        assert_eq!(sys.config().shape, Shape::Star);
    }

    #[test]
    fn rejected_update_keeps_live_config() {
        let mut sys = system(calm(10));
        let before = sys.config().clone();
        let update = ConfigUpdate::new().with_palette(Vec::new()).with_particle_count(2);
        assert!(matches!(sys.update_config(&update), Err(ConfigError::EmptyPalette)));
        assert_eq!(sys.config(), &before);
        assert_eq!(sys.particles().len(), 10);
    }

    #[test]
    fn replace_config_swaps_wholesale() {
        let mut sys = system(calm(10));
        sys.replace_config(Config::loading()).unwrap();
        assert_eq!(sys.config(), &Config::loading());
        assert_eq!(sys.particles().len(), 30);
    }

    #[test]
    fn resize_is_idempotent_and_tracks_container() {
        let mut sys = system(calm(1));
        sys.surface_mut().size = Some(DVec2::new(800.0, 600.0));
        sys.push_input(InputEvent::Resize);
        sys.frame(0.0);
        sys.resize();
        sys.resize();
        assert_eq!(sys.size(), DVec2::new(800.0, 600.0));
        let configures: Vec<&DrawCall> = sys
            .surface()
            .calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Configure { .. }))
            .collect();
        assert_eq!(configures.len(), 4);
        assert!(configures[1..]
            .iter()
            .all(|c| **c == DrawCall::Configure { size: DVec2::new(800.0, 600.0), ratio: 1.0 }));
    }

    #[test]
    fn run_controls() {
        let mut sys = system(calm(3));
        sys.pause();
        assert!(!sys.is_running());
        assert!(!sys.frame(0.0));
        sys.push_input(InputEvent::Click { x: 1.0, y: 1.0 });
        sys.resume();
        sys.resume();
        assert!(sys.is_running());
        sys.frame(16.0);
        assert_eq!(sys.particles().len(), 3, "clicks while paused are discarded");
        sys.stop();
        sys.start();
        assert!(sys.frame(32.0));
    }

    #[test]
    fn clear_keeps_system_usable() {
        let mut sys = system(calm(8));
        sys.clear();
        assert!(sys.particles().is_empty());
        assert!(sys.is_alive());
        sys.add_burst(1.0, 1.0, 2);
        assert_eq!(sys.particles().len(), 2);
    }

    #[test]
    fn lost_container_stops_the_loop() {
        let mut sys = system(calm(3));
        sys.surface_mut().size = None;
        sys.surface_mut().calls.clear();
        assert!(!sys.frame(0.0));
        assert!(!sys.is_running());
        assert!(sys.surface().calls.is_empty());
    }

    #[test]
    fn destroyed_system_never_touches_surface() {
        let mut sys = system(calm(5));
        sys.destroy();
        assert_eq!(sys.lifecycle(), Lifecycle::Destroyed);
        assert!(sys.surface().detached);
        assert!(sys.particles().is_empty());

        sys.start();
        sys.push_input(InputEvent::Resize);
        assert!(!sys.frame(16.0));
        sys.step(16.0);
        sys.render();
        sys.resize();
        sys.clear();
        sys.explode_at(1.0, 1.0);
        sys.destroy();
        assert_eq!(sys.surface().after_detach.get(), 0);
        assert!(sys.particles().is_empty());
    }

    #[cfg(feature = "vectors")]
    #[test]
    fn renders_onto_vector_surface() {
        use crate::renderer::vector::VectorSurface;

        let mut sys = ParticleSystem::with_seed(VectorSurface::new(320.0, 200.0).with_pixel_ratio(2.0), calm(20), 7);
        assert!(sys.frame(0.0));
        assert_eq!(sys.surface().backing_size(), DVec2::new(640.0, 400.0));
        assert!(sys.surface().vertex_count() > 0);

        sys.surface_mut().remove_container();
        assert!(!sys.frame(16.0));
        sys.destroy();
        assert!(!sys.surface().is_attached());
    }
}
