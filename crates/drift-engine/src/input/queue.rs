/// Events a host page forwards to a particle system.
/// Coordinates are relative to the system's surface, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// The pointer moved over the surface. `time_ms` shares the frame clock.
    PointerMove { x: f64, y: f64, time_ms: f64 },
    /// The pointer left the surface.
    PointerLeave,
    /// A click on the surface.
    Click { x: f64, y: f64 },
    /// The viewport (and possibly the container) changed size.
    Resize,
}

/// Pending forwarded events.
/// Handlers push; the next frame drains.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop every pending event.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
