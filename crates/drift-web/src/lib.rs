//! Browser bridge for drift-engine.
//!
//! Call `motion_init()` once, then register regions by element id (or let
//! `motion_install_regions()` find the standard ones). Every region is ticked
//! from a single `requestAnimationFrame` loop.

pub mod events;
pub mod runner;
pub mod surface;

use std::cell::RefCell;

use drift_engine::systems::backdrop::{FlowField, MorphingBackground};
use drift_engine::systems::controller::{skill_region, HERO_REGION, LOADING_REGION};
use drift_engine::{Config, ConfigUpdate};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

pub use events::EventListener;
pub use runner::PageRunner;
pub use surface::CanvasSurface;

/// Particles added around the center of a skill card on hover.
const SKILL_HOVER_BURST: usize = 5;
const MORPH_OPACITY: f64 = 0.3;
const FLOW_OPACITY: f64 = 0.2;

thread_local! {
    static RUNNER: RefCell<Option<PageRunner>> = const { RefCell::new(None) };
}

/// Run `f` against the page runner. `None` before `motion_init()`, or when
/// called re-entrantly from inside another runner call.
pub(crate) fn with_runner<R>(f: impl FnOnce(&mut PageRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let mut borrow = cell.try_borrow_mut().ok()?;
        borrow.as_mut().map(f)
    })
}

fn not_initialized() -> JsValue {
    JsValue::from_str("motion graphics not initialized, call motion_init() first")
}

/// Fail before touching the DOM, so no orphan canvas is left behind.
fn ensure_initialized() -> Result<(), JsValue> {
    with_runner(|_| ()).ok_or_else(not_initialized)
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn element_by_id(id: &str) -> Result<Option<HtmlElement>, JsValue> {
    match document()?.get_element_by_id(id) {
        Some(element) => Ok(Some(element.dyn_into::<HtmlElement>()?)),
        None => Ok(None),
    }
}

fn random_seed() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}

fn parse_config(json: Option<String>) -> Result<Config, JsValue> {
    match json {
        Some(json) => Config::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string())),
        None => Ok(Config::default()),
    }
}

/// Install the panic hook and logger, start listening for page resize and
/// visibility changes. Safe to call more than once.
#[wasm_bindgen]
pub fn motion_init() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    if with_runner(|_| ()).is_some() {
        return Ok(());
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = document()?;

    let on_frame = Closure::<dyn FnMut(f64)>::new(|now: f64| {
        with_runner(|r| r.tick(now));
    });
    let mut runner = PageRunner::new(window.clone(), random_seed(), on_frame);

    runner.keep(EventListener::new(window.as_ref(), "resize", |_| {
        with_runner(|r| r.viewport_resized());
    })?);
    let page = document.clone();
    runner.keep(EventListener::new(document.as_ref(), "visibilitychange", move |_| {
        let hidden = page.hidden();
        with_runner(|r| r.visibility_changed(hidden));
    })?);

    if let Some(width) = window.inner_width()?.as_f64() {
        runner.controller_mut().apply_viewport(width);
    }

    RUNNER.with(|cell| *cell.borrow_mut() = Some(runner));
    log::info!("drift: initialized");
    Ok(())
}

/// Add (or replace) a particle region inside `container`.
/// `config_json` is a partial camelCase configuration object.
/// Returns false when the system came up inert.
#[wasm_bindgen]
pub fn motion_add_system_to(
    name: &str,
    container: &HtmlElement,
    config_json: Option<String>,
) -> Result<bool, JsValue> {
    add_region(name, container, parse_config(config_json)?)
}

fn add_region(name: &str, container: &HtmlElement, config: Config) -> Result<bool, JsValue> {
    ensure_initialized()?;
    let surface = CanvasSurface::attach(container, &surface::region_css(config.interactive))?;
    let listeners = if config.interactive {
        events::pointer_listeners(name, surface.canvas())?
    } else {
        Vec::new()
    };
    with_runner(|r| r.add_region(name, surface, config, listeners)).ok_or_else(not_initialized)
}

/// `motion_add_system_to` for the element with id `container_id`.
#[wasm_bindgen]
pub fn motion_add_system(name: &str, container_id: &str, config_json: Option<String>) -> Result<bool, JsValue> {
    match element_by_id(container_id)? {
        Some(container) => motion_add_system_to(name, &container, config_json),
        None => {
            log::error!("particle container '#{}' not found", container_id);
            Ok(false)
        }
    }
}

#[wasm_bindgen]
pub fn motion_remove_system(name: &str) -> bool {
    with_runner(|r| r.remove_region(name)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn motion_has_system(name: &str) -> bool {
    with_runner(|r| r.controller().get_system(name).is_some_and(|s| s.is_alive())).unwrap_or(false)
}

#[wasm_bindgen]
pub fn motion_particle_count(name: &str) -> Option<u32> {
    with_runner(|r| r.controller().get_system(name).map(|s| s.particles().len() as u32)).flatten()
}

#[wasm_bindgen]
pub fn motion_pause_all() {
    with_runner(|r| r.pause_all());
}

#[wasm_bindgen]
pub fn motion_resume_all() {
    with_runner(|r| r.resume_all());
}

#[wasm_bindgen]
pub fn motion_destroy_all() {
    with_runner(|r| r.destroy_all());
}

#[wasm_bindgen]
pub fn motion_explode_at(name: &str, x: f64, y: f64) {
    with_runner(|r| {
        if let Some(system) = r.controller_mut().get_system_mut(name) {
            system.explode_at(x, y);
        }
        r.schedule();
    });
}

#[wasm_bindgen]
pub fn motion_add_burst(name: &str, x: f64, y: f64, count: Option<u32>) {
    let count = count.map_or(drift_engine::systems::particle_system::DEFAULT_BURST_COUNT, |c| c as usize);
    with_runner(|r| {
        if let Some(system) = r.controller_mut().get_system_mut(name) {
            system.add_burst(x, y, count);
        }
        r.schedule();
    });
}

/// Merge a partial configuration into a live system. Rejected updates leave it unchanged.
#[wasm_bindgen]
pub fn motion_update_config(name: &str, update_json: &str) -> Result<(), JsValue> {
    let update = ConfigUpdate::from_json(update_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let result = with_runner(|r| match r.controller_mut().get_system_mut(name) {
        Some(system) => system.update_config(&update).map_err(|e| JsValue::from_str(&e.to_string())),
        None => Err(JsValue::from_str(&format!("no particle system named '{}'", name))),
    });
    result.ok_or_else(not_initialized)?
}

#[wasm_bindgen]
pub fn motion_add_flow_field(name: &str, container_id: &str) -> Result<bool, JsValue> {
    let Some(container) = element_by_id(container_id)? else {
        return Ok(false);
    };
    ensure_initialized()?;
    let surface = CanvasSurface::attach(&container, &surface::backdrop_css(FLOW_OPACITY))?;
    let field = FlowField::new(surface, random_seed());
    with_runner(|r| r.add_backdrop(name, field)).ok_or_else(not_initialized)?;
    Ok(true)
}

#[wasm_bindgen]
pub fn motion_add_morphing(name: &str, container_id: &str) -> Result<bool, JsValue> {
    let Some(container) = element_by_id(container_id)? else {
        return Ok(false);
    };
    add_morphing_to(name, &container)?;
    Ok(true)
}

fn add_morphing_to(name: &str, container: &HtmlElement) -> Result<(), JsValue> {
    ensure_initialized()?;
    let surface = CanvasSurface::attach(container, &surface::backdrop_css(MORPH_OPACITY))?;
    let morph = MorphingBackground::new(surface);
    with_runner(|r| r.add_backdrop(name, morph)).ok_or_else(not_initialized)
}

/// Find and register the standard page regions: `#heroParticles`,
/// `#loadingParticles`, every `.skill-category` card, morphing backdrops
/// behind `.hero-section, .ar-vr-section` and a flow field behind `#portfolio`.
#[wasm_bindgen]
pub fn motion_install_regions() -> Result<(), JsValue> {
    ensure_initialized()?;
    let document = document()?;

    if let Some(hero) = element_by_id("heroParticles")? {
        add_region(HERO_REGION, &hero, Config::hero())?;
    }
    if let Some(loading) = element_by_id("loadingParticles")? {
        add_region(LOADING_REGION, &loading, Config::loading())?;
    }

    let cards = document.query_selector_all(".skill-category")?;
    for i in 0..cards.length() {
        let Some(card) = cards.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
            continue;
        };
        install_skill_card(&document, &card, i as usize)?;
    }

    let sections = document.query_selector_all(".hero-section, .ar-vr-section")?;
    for i in 0..sections.length() {
        if let Some(section) = sections.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) {
            add_morphing_to(&format!("morph-{}", i), &section)?;
        }
    }

    motion_add_flow_field("portfolio-flow", "portfolio")?;
    Ok(())
}

/// Skill cards get a hidden overlay that fades in and bursts on hover.
fn install_skill_card(document: &Document, card: &HtmlElement, index: usize) -> Result<(), JsValue> {
    let overlay: HtmlElement = document.create_element("div")?.dyn_into()?;
    overlay.set_class_name("skill-particles");
    overlay.style().set_css_text(
        "position: absolute; top: 0; left: 0; width: 100%; height: 100%; \
         pointer-events: none; opacity: 0; transition: opacity 0.3s ease;",
    );
    card.style().set_property("position", "relative")?;
    card.append_child(&overlay)?;

    let name = skill_region(index);
    add_region(&name, &overlay, Config::skill())?;

    let (region, shown) = (name.clone(), overlay.clone());
    let enter = EventListener::new(card.as_ref(), "mouseenter", move |_| {
        let _ = shown.style().set_property("opacity", "1");
        with_runner(|r| {
            if let Some(system) = r.controller_mut().get_system_mut(&region) {
                system.burst_at_center(SKILL_HOVER_BURST);
            }
            r.schedule();
        });
    })?;
    let hidden = overlay.clone();
    let leave = EventListener::new(card.as_ref(), "mouseleave", move |_| {
        let _ = hidden.style().set_property("opacity", "0");
    })?;

    with_runner(|r| {
        r.listen(&name, enter);
        r.listen(&name, leave);
    })
    .ok_or_else(not_initialized)
}
