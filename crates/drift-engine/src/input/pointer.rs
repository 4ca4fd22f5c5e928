use glam::DVec2;

/// Last known pointer position and whether it moved recently.
///
/// Written only by forwarded pointer events; the physics step reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub position: DVec2,
    /// Timestamp of the last move, cleared when the pointer leaves.
    last_move_ms: Option<f64>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn moved(&mut self, position: DVec2, time_ms: f64) {
        self.position = position;
        self.last_move_ms = Some(time_ms);
    }

    pub fn left(&mut self) {
        self.last_move_ms = None;
    }

    /// True while the last move is younger than `idle_ms` at time `now_ms`.
    pub fn is_moving(&self, now_ms: f64, idle_ms: f64) -> bool {
        match self.last_move_ms {
            Some(t) => now_ms - t < idle_ms,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moving_flag_expires_after_idle_window() {
        let mut p = PointerState::new();
        assert!(!p.is_moving(0.0, 100.0));
        p.moved(DVec2::new(4.0, 5.0), 1000.0);
        assert!(p.is_moving(1050.0, 100.0));
        assert!(!p.is_moving(1100.0, 100.0));
        assert_eq!(p.position, DVec2::new(4.0, 5.0));
    }

    #[test]
    fn leaving_clears_moving() {
        let mut p = PointerState::new();
        p.moved(DVec2::ZERO, 10.0);
        p.left();
        assert!(!p.is_moving(10.0, 100.0));
    }
}
