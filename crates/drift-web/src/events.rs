use drift_engine::InputEvent;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, HtmlCanvasElement, MouseEvent};

use crate::with_runner;

/// A DOM listener that unregisters itself when dropped.
pub struct EventListener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    pub fn new(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        Ok(Self { target: target.clone(), kind, closure })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

/// Pointer position relative to the canvas' top-left corner.
fn canvas_point(canvas: &HtmlCanvasElement, event: &MouseEvent) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    (event.client_x() as f64 - rect.left(), event.client_y() as f64 - rect.top())
}

/// Forward pointer-move, pointer-leave and click on `canvas` to system `name`.
pub fn pointer_listeners(name: &str, canvas: &HtmlCanvasElement) -> Result<Vec<EventListener>, JsValue> {
    let target: &EventTarget = canvas.as_ref();

    let (region, surface) = (name.to_string(), canvas.clone());
    let on_move = EventListener::new(target, "mousemove", move |event| {
        let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let (x, y) = canvas_point(&surface, mouse);
        let time_ms = event.time_stamp();
        with_runner(|r| r.dispatch(&region, InputEvent::PointerMove { x, y, time_ms }));
    })?;

    let region = name.to_string();
    let on_leave = EventListener::new(target, "mouseleave", move |_| {
        with_runner(|r| r.dispatch(&region, InputEvent::PointerLeave));
    })?;

    let (region, surface) = (name.to_string(), canvas.clone());
    let on_click = EventListener::new(target, "click", move |event| {
        let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let (x, y) = canvas_point(&surface, mouse);
        with_runner(|r| r.dispatch(&region, InputEvent::Click { x, y }));
    })?;

    Ok(vec![on_move, on_leave, on_click])
}
