//! Particle record and its bounded trail history.

use std::collections::VecDeque;

use glam::DVec2;

use crate::api::config::Config;
use crate::core::rng::Rng;
use crate::renderer::color::Color;

/// A remembered position, with the opacity the particle had when it was there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub position: DVec2,
    pub opacity: f64,
}

/// Fixed-capacity history of recent positions. Oldest entries are evicted first.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    points: VecDeque<TrailPoint>,
    capacity: usize,
}

impl Trail {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, point: TrailPoint) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }

    pub fn get(&self, index: usize) -> Option<&TrailPoint> {
        self.points.get(index)
    }
}

/// A single particle. Owned by exactly one `ParticleSystem`.
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: DVec2,
    pub velocity: DVec2,
    /// Rendered radius, recomputed from `base_size` every step.
    pub size: f64,
    pub base_size: f64,
    /// Picked once at creation.
    pub color: Color,
    pub opacity: f64,
    /// Frames left.
    pub life: i64,
    pub max_life: i64,
    pub angle: f64,
    pub rotation_speed: f64,
    pub trail: Trail,
}

impl Particle {
    /// Spawn a particle with random fields drawn from `config`.
    /// `at` pins the position; otherwise it is uniform over `bounds`.
    pub fn spawn(config: &Config, bounds: DVec2, at: Option<DVec2>, rng: &mut Rng) -> Self {
        let position = at.unwrap_or_else(|| {
            DVec2::new(rng.next_f64() * bounds.x, rng.next_f64() * bounds.y)
        });
        let velocity = DVec2::new(
            axis_speed(config, rng),
            axis_speed(config, rng),
        );
        let size = rng.range(config.particle_size.min, config.particle_size.max);
        let color = config.palette[rng.pick(config.palette.len())];
        let opacity = rng.range(config.opacity.min, config.opacity.max);
        let life = rng.range_i64(config.particle_life.min, config.particle_life.max);

        Particle {
            position,
            velocity,
            size,
            base_size: size,
            color,
            opacity,
            life,
            max_life: life,
            angle: rng.angle(),
            rotation_speed: (rng.next_f64() - 0.5) * 0.1,
            trail: Trail::with_capacity(config.trail_length),
        }
    }

    /// Reinitialize this record in place with fresh random values.
    pub fn respawn(&mut self, config: &Config, bounds: DVec2, rng: &mut Rng) {
        *self = Particle::spawn(config, bounds, None, rng);
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0
    }

    /// `life / max_life`, clamped to [0, 1].
    pub fn life_ratio(&self) -> f64 {
        if self.max_life <= 0 {
            return 0.0;
        }
        (self.life as f64 / self.max_life as f64).clamp(0.0, 1.0)
    }
}

// Centered on `min`, not on zero, so fields drift toward +x/+y.
fn axis_speed(config: &Config, rng: &mut Rng) -> f64 {
    let speed = config.particle_speed;
    (rng.next_f64() - 0.5) * (speed.max - speed.min) + speed.min
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Span;

    fn point(x: f64) -> TrailPoint {
        TrailPoint { position: DVec2::new(x, 0.0), opacity: 1.0 }
    }

    #[test]
    fn trail_evicts_oldest() {
        let mut trail = Trail::with_capacity(3);
        for x in 0..5 {
            trail.push(point(x as f64));
        }
        assert_eq!(trail.len(), 3);
        let xs: Vec<f64> = trail.iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn zero_capacity_trail_stays_empty() {
        let mut trail = Trail::with_capacity(0);
        trail.push(point(1.0));
        assert!(trail.is_empty());
    }

    #[test]
    fn spawn_respects_config_ranges() {
        let config = Config {
            particle_size: Span::new(2.0, 3.0),
            particle_life: Span::new(10, 20),
            opacity: Span::new(0.1, 0.4),
            ..Config::default()
        };
        let mut rng = Rng::new(3);
        for _ in 0..100 {
            let p = Particle::spawn(&config, DVec2::new(200.0, 100.0), None, &mut rng);
            assert!(p.position.x >= 0.0 && p.position.x < 200.0);
            assert!(p.position.y >= 0.0 && p.position.y < 100.0);
            assert!(p.size >= 2.0 && p.size < 3.0);
            assert_eq!(p.size, p.base_size);
            assert!((10..=20).contains(&p.life));
            assert_eq!(p.life, p.max_life);
            assert!(p.opacity >= 0.1 && p.opacity < 0.4);
            assert!(config.palette.contains(&p.color));
            assert_eq!(p.trail.capacity(), config.trail_length);
        }
    }

    #[test]
    fn spawn_at_fixed_point() {
        let mut rng = Rng::new(9);
        let p = Particle::spawn(&Config::default(), DVec2::new(10.0, 10.0), Some(DVec2::new(3.0, 4.0)), &mut rng);
        assert_eq!(p.position, DVec2::new(3.0, 4.0));
    }

    #[test]
    fn life_ratio_is_clamped() {
        let mut rng = Rng::new(1);
        let mut p = Particle::spawn(&Config::default(), DVec2::ONE, None, &mut rng);
        p.life = -3;
        assert_eq!(p.life_ratio(), 0.0);
        p.life = p.max_life;
        assert_eq!(p.life_ratio(), 1.0);
    }
}
