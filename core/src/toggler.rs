//! The toggler: runtime, rules and activation state in one place.

use toggler_types::{Category, RuleBook};

use crate::context::{GameHost, InteriorSnapshot, TimeSnapshot, WeatherSnapshot};
use crate::engine::{Evaluation, ToggleEngine};
use crate::preset::{PresetError, PresetStore};
use crate::runtime::{self, EffectRuntime};

/// Owns everything the evaluators touch. Lives on the thread that owns the
/// effect runtime.
pub struct Toggler<R: EffectRuntime> {
    runtime: R,
    rules: RuleBook,
    engine: ToggleEngine,
}

impl<R: EffectRuntime> Toggler<R> {
    pub fn new(runtime: R) -> Self {
        Self::with_rules(runtime, RuleBook::new())
    }

    pub fn with_rules(runtime: R, rules: RuleBook) -> Self {
        Self {
            runtime,
            rules,
            engine: ToggleEngine::new(),
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    /// Edit rules in place. Active effects are not reverted; use
    /// [`Toggler::replace_rules`] to swap the whole book.
    pub fn rules_mut(&mut self) -> &mut RuleBook {
        &mut self.rules
    }

    pub fn engine(&self) -> &ToggleEngine {
        &self.engine
    }

    pub fn on_menu_event(&mut self, menu: &str, opening: bool) -> Evaluation {
        self.engine
            .on_menu_event(menu, opening, &mut self.rules, &mut self.runtime)
    }

    pub fn process_weather(&mut self, snapshot: &WeatherSnapshot) -> Evaluation {
        self.engine
            .evaluate_weather(snapshot, &mut self.rules, &mut self.runtime)
    }

    pub fn process_time(&mut self, snapshot: &TimeSnapshot) -> Evaluation {
        self.engine
            .evaluate_time(snapshot, &mut self.rules, &mut self.runtime)
    }

    pub fn process_interior(&mut self, snapshot: &InteriorSnapshot) -> Evaluation {
        self.engine
            .evaluate_interior(snapshot, &mut self.rules, &mut self.runtime)
    }

    /// Evaluate one polled category against the host's current state.
    ///
    /// Menus are event driven and are skipped here.
    pub fn process<H: GameHost + ?Sized>(&mut self, category: Category, host: &H) -> Evaluation {
        match category {
            Category::Menu => Evaluation::skipped(),
            Category::Weather => self.process_weather(&WeatherSnapshot::capture(host)),
            Category::Time => self.process_time(&TimeSnapshot::capture(host)),
            Category::Interior => self.process_interior(&InteriorSnapshot::capture(host)),
        }
    }

    /// Drive an effect directly, outside of any rule.
    pub fn toggle_effect(&mut self, effect: &str, enabled: bool) {
        tracing::debug!(effect, enabled, "Direct toggle");
        runtime::toggle_effect(&mut self.runtime, effect, enabled);
    }

    pub fn effect_exists(&self, effect: &str) -> bool {
        runtime::effect_exists(&self.runtime, effect)
    }

    pub fn effect_names(&self) -> Vec<String> {
        runtime::effect_names(&self.runtime)
    }

    /// Revert every active rule and forget all activation state.
    pub fn release_all(&mut self) -> usize {
        let reverted = self.engine.release_all(&mut self.rules, &mut self.runtime);
        self.engine = ToggleEngine::new();
        reverted
    }

    /// Swap in a new rule book, reverting what the old one had active.
    pub fn replace_rules(&mut self, rules: RuleBook) -> RuleBook {
        self.release_all();
        let mut previous = std::mem::replace(&mut self.rules, rules);
        previous.reset_runtime();
        self.rules.reset_runtime();
        previous
    }

    /// Load a preset over the current rules.
    ///
    /// Active effects are reverted first. On [`PresetError::Incomplete`] the
    /// categories that did decode are already in place.
    pub fn load_preset(&mut self, store: &PresetStore, name: &str) -> Result<(), PresetError> {
        self.release_all();
        self.rules.reset_runtime();
        store.load_into(name, &mut self.rules)
    }

    pub fn save_preset(
        &self,
        store: &PresetStore,
        name: &str,
    ) -> Result<std::path::PathBuf, PresetError> {
        store.save(name, &self.rules)
    }
}
