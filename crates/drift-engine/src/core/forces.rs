//! Stateless per-step velocity deltas.

use glam::DVec2;

/// Velocity change from the constant fields: wind on x, gravity on y.
#[inline]
pub fn field_delta(gravity: f64, wind: f64) -> DVec2 {
    DVec2::new(wind, gravity)
}

/// Result of the pointer repulsion field acting on one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Repulsion {
    /// Velocity change pushing the particle away from the pointer.
    pub delta: DVec2,
    /// Linear falloff in (0, 1]: 1 at the pointer, 0 at the radius boundary.
    pub force: f64,
}

/// Repulsion from a pointer at `pointer` on a particle at `position`.
/// Returns `None` at or beyond `radius`.
pub fn pointer_repulsion(position: DVec2, pointer: DVec2, radius: f64, magnitude: f64) -> Option<Repulsion> {
    let offset = pointer - position;
    let distance = offset.length();
    if !(distance < radius) {
        return None;
    }
    let force = (radius - distance) / radius;
    // atan2 keeps a well-defined direction when the particle sits on the pointer.
    let direction = DVec2::from_angle(offset.y.atan2(offset.x));
    Some(Repulsion {
        delta: -direction * force * magnitude,
        force,
    })
}

/// Size of a particle under `repulsion`, recomputed from its base size.
#[inline]
pub fn inflated_size(base_size: f64, repulsion: Option<&Repulsion>) -> f64 {
    match repulsion {
        Some(r) => base_size * (1.0 + r.force),
        None => base_size,
    }
}

/// Wrap `position` onto the torus `[0, bounds.x) × [0, bounds.y)`.
pub fn wrap(position: DVec2, bounds: DVec2) -> DVec2 {
    let axis = |v: f64, extent: f64| {
        if extent > 0.0 {
            // rem_euclid rounds tiny negatives up to `extent` itself
            let r = v.rem_euclid(extent);
            if r >= extent { 0.0 } else { r }
        } else {
            0.0
        }
    };
    DVec2::new(axis(position.x, bounds.x), axis(position.y, bounds.y))
}
