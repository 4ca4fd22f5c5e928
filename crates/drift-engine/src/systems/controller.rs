//! Owns every particle region and backdrop on a page.

use std::collections::BTreeMap;

use crate::api::config::{Config, ConfigUpdate};
use crate::input::queue::InputEvent;
use crate::renderer::surface::Surface;
use crate::systems::backdrop::Backdrop;
use crate::systems::particle_system::ParticleSystem;

/// Viewports narrower than this (CSS pixels) get the reduced-cost profile.
pub const MOBILE_BREAKPOINT: f64 = 768.0;

pub const HERO_REGION: &str = "hero";
pub const LOADING_REGION: &str = "loading";

/// Name of the `index`-th skill card region.
pub fn skill_region(index: usize) -> String {
    format!("skill-{}", index)
}

/// Named particle systems plus backdrops, driven from one frame callback.
pub struct MotionGraphicsController<S: Surface> {
    systems: BTreeMap<String, ParticleSystem<S>>,
    backdrops: BTreeMap<String, Backdrop<S>>,
    degraded: bool,
    hidden: bool,
    seed: u64,
}

impl<S: Surface> MotionGraphicsController<S> {
    pub fn new() -> Self {
        Self::with_seed(0x9e37_79b9_7f4a_7c15)
    }

    /// Each added system gets a distinct seed derived from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        MotionGraphicsController {
            systems: BTreeMap::new(),
            backdrops: BTreeMap::new(),
            degraded: false,
            hidden: false,
            seed,
        }
    }

    fn next_seed(&mut self) -> u64 {
        // splitmix64 increment keeps sibling streams apart
        self.seed = self.seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
        self.seed
    }

    // -- Systems --

    /// Create a system on `surface` under `name`, replacing (and destroying) any
    /// previous one. Degraded or hidden state is applied on insertion.
    pub fn add_system(&mut self, name: &str, surface: S, config: Config) -> &mut ParticleSystem<S> {
        let seed = self.next_seed();
        let mut system = ParticleSystem::with_seed(surface, config, seed);
        if self.degraded {
            degrade(name, &mut system);
        }
        if self.hidden {
            system.pause();
        }
        log::debug!("particle system '{}' added", name);

        if let Some(mut old) = self.systems.remove(name) {
            old.destroy();
        }
        self.systems.entry(name.to_string()).or_insert(system)
    }

    pub fn get_system(&self, name: &str) -> Option<&ParticleSystem<S>> {
        self.systems.get(name)
    }

    pub fn get_system_mut(&mut self, name: &str) -> Option<&mut ParticleSystem<S>> {
        self.systems.get_mut(name)
    }

    /// Destroy and forget `name`. Returns whether it existed.
    pub fn remove_system(&mut self, name: &str) -> bool {
        match self.systems.remove(name) {
            Some(mut system) => {
                system.destroy();
                log::debug!("particle system '{}' removed", name);
                true
            }
            None => false,
        }
    }

    pub fn system_names(&self) -> impl Iterator<Item = &str> {
        self.systems.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Forward an event to one system. Returns false for unknown names.
    pub fn dispatch(&mut self, name: &str, event: InputEvent) -> bool {
        match self.systems.get_mut(name) {
            Some(system) => {
                system.push_input(event);
                true
            }
            None => false,
        }
    }

    /// Viewport resize: every system and backdrop re-reads its container.
    pub fn resize_all(&mut self) {
        for system in self.systems.values_mut() {
            system.push_input(InputEvent::Resize);
        }
        for backdrop in self.backdrops.values_mut() {
            backdrop.resize();
        }
    }

    // -- Backdrops --

    pub fn add_backdrop(&mut self, name: &str, backdrop: impl Into<Backdrop<S>>) {
        let mut backdrop = backdrop.into();
        if self.hidden {
            backdrop.pause();
        }
        if let Some(mut old) = self.backdrops.insert(name.to_string(), backdrop) {
            old.destroy();
        }
    }

    pub fn get_backdrop(&self, name: &str) -> Option<&Backdrop<S>> {
        self.backdrops.get(name)
    }

    pub fn remove_backdrop(&mut self, name: &str) -> bool {
        match self.backdrops.remove(name) {
            Some(mut backdrop) => {
                backdrop.destroy();
                true
            }
            None => false,
        }
    }

    // -- Page-wide control --

    pub fn pause_all(&mut self) {
        for system in self.systems.values_mut() {
            system.pause();
        }
        for backdrop in self.backdrops.values_mut() {
            backdrop.pause();
        }
    }

    pub fn resume_all(&mut self) {
        for system in self.systems.values_mut() {
            system.resume();
        }
        for backdrop in self.backdrops.values_mut() {
            backdrop.resume();
        }
    }

    pub fn destroy_all(&mut self) {
        for (_, mut system) in std::mem::take(&mut self.systems) {
            system.destroy();
        }
        for (_, mut backdrop) in std::mem::take(&mut self.backdrops) {
            backdrop.destroy();
        }
    }

    /// Page visibility changed.
    pub fn visibility_changed(&mut self, hidden: bool) {
        self.hidden = hidden;
        if hidden {
            self.pause_all();
        } else {
            self.resume_all();
        }
    }

    /// Degrade every system once the viewport is narrower than
    /// [`MOBILE_BREAKPOINT`]. One-way: widening again never restores.
    /// Returns true when this call applied the degradation.
    pub fn apply_viewport(&mut self, width: f64) -> bool {
        if self.degraded || width >= MOBILE_BREAKPOINT {
            return false;
        }
        self.degraded = true;
        for (name, system) in self.systems.iter_mut() {
            degrade(name, system);
        }
        log::info!("narrow viewport ({}px): particle counts halved, connections off", width);
        true
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Build the standard page regions from whichever surfaces exist.
    pub fn install_regions(
        &mut self,
        hero: Option<S>,
        loading: Option<S>,
        skills: impl IntoIterator<Item = S>,
    ) {
        if let Some(surface) = hero {
            self.add_system(HERO_REGION, surface, Config::hero());
        }
        if let Some(surface) = loading {
            self.add_system(LOADING_REGION, surface, Config::loading());
        }
        for (i, surface) in skills.into_iter().enumerate() {
            self.add_system(&skill_region(i), surface, Config::skill());
        }
    }

    /// Tick every system and backdrop once. Returns whether any wants another frame.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        let mut any = false;
        for system in self.systems.values_mut() {
            any |= system.frame(now_ms);
        }
        for backdrop in self.backdrops.values_mut() {
            any |= backdrop.frame(now_ms);
        }
        any
    }
}

impl<S: Surface> Default for MotionGraphicsController<S> {
    fn default() -> Self {
        Self::new()
    }
}

fn degrade<S: Surface>(name: &str, system: &mut ParticleSystem<S>) {
    let count = system.config().particle_count / 2;
    let update = ConfigUpdate::new().with_particle_count(count).with_show_connections(false);
    if let Err(err) = system.update_config(&update) {
        log::warn!("could not degrade particle system '{}': {}", name, err);
    }
}
