//! Toggle engine
//!
//! Decides which effects to switch from the observed game context. The menu
//! evaluator reacts to open/close events; weather, time and interior rules are
//! polled and share one context-scoped evaluator (see [`scoped`]).

mod cache;
mod interior;
mod menu;
mod scoped;
mod time;
mod weather;


pub use cache::{ActivationCache, RuleIdGenerator};
pub use menu::MenuEvaluator;
pub use scoped::{Evaluation, Transition};

use toggler_types::{Category, InteriorRule, RuleBook, RuleSet, TimeRule, ToggleRule, WeatherRule};

use self::interior::InteriorScope;
use self::scoped::{ScopeInput, evaluate_scoped, leave_context};
use self::time::TimeScope;
use self::weather::WeatherScope;
use crate::context::{InteriorSnapshot, TimeSnapshot, WeatherSnapshot};
use crate::runtime::EffectRuntime;

/// Activation state of all four evaluators
#[derive(Debug, Clone, Default)]
pub struct ToggleEngine {
    ids: RuleIdGenerator,
    menu: MenuEvaluator,
    weather: ActivationCache<WeatherRule>,
    time: ActivationCache<TimeRule>,
    interior: ActivationCache<InteriorRule>,
}

impl ToggleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn menu(&self) -> &MenuEvaluator {
        &self.menu
    }

    pub fn weather_cache(&self) -> &ActivationCache<WeatherRule> {
        &self.weather
    }

    pub fn time_cache(&self) -> &ActivationCache<TimeRule> {
        &self.time
    }

    pub fn interior_cache(&self) -> &ActivationCache<InteriorRule> {
        &self.interior
    }

    pub fn on_menu_event<R: EffectRuntime + ?Sized>(
        &mut self,
        menu: &str,
        opening: bool,
        rules: &mut RuleBook,
        runtime: &mut R,
    ) -> Evaluation {
        self.menu.on_event(menu, opening, &mut rules.menu, runtime)
    }

    pub fn evaluate_weather<R: EffectRuntime + ?Sized>(
        &mut self,
        snapshot: &WeatherSnapshot,
        rules: &mut RuleBook,
        runtime: &mut R,
    ) -> Evaluation {
        let Some(weather) = snapshot.weather.as_deref() else {
            return Evaluation::skipped();
        };
        if snapshot.paused || rules.weather.is_empty() {
            return Evaluation::skipped();
        }

        let outcome = evaluate_scoped(
            &WeatherScope { weather },
            ScopeInput {
                current: snapshot.worldspace.as_ref(),
            },
            &mut rules.weather,
            &mut self.weather,
            &mut self.ids,
            runtime,
        );
        log_outcome(Category::Weather, &outcome);
        outcome
    }

    pub fn evaluate_time<R: EffectRuntime + ?Sized>(
        &mut self,
        snapshot: &TimeSnapshot,
        rules: &mut RuleBook,
        runtime: &mut R,
    ) -> Evaluation {
        let Some(clock) = snapshot.clock else {
            return Evaluation::skipped();
        };
        if snapshot.paused || rules.time.is_empty() {
            return Evaluation::skipped();
        }

        let outcome = evaluate_scoped(
            &TimeScope {
                now: clock.encoded(),
            },
            ScopeInput {
                current: snapshot.context.as_ref(),
            },
            &mut rules.time,
            &mut self.time,
            &mut self.ids,
            runtime,
        );
        log_outcome(Category::Time, &outcome);
        outcome
    }

    pub fn evaluate_interior<R: EffectRuntime + ?Sized>(
        &mut self,
        snapshot: &InteriorSnapshot,
        rules: &mut RuleBook,
        runtime: &mut R,
    ) -> Evaluation {
        if rules.interior.is_empty() {
            return Evaluation::skipped();
        }

        let current = snapshot.cell.as_ref().filter(|_| snapshot.interior);
        let outcome = evaluate_scoped(
            &InteriorScope,
            ScopeInput { current },
            &mut rules.interior,
            &mut self.interior,
            &mut self.ids,
            runtime,
        );
        log_outcome(Category::Interior, &outcome);
        outcome
    }

    /// Revert every active rule and clear all counters and caches.
    ///
    /// Returns the number of revert calls issued.
    pub fn release_all<R: EffectRuntime + ?Sized>(
        &mut self,
        rules: &mut RuleBook,
        runtime: &mut R,
    ) -> usize {
        let mut reverted = self.menu.release(&mut rules.menu, runtime);
        reverted += release_cache(
            Category::Weather,
            &mut self.weather,
            &mut rules.weather,
            runtime,
        );
        reverted += release_cache(Category::Time, &mut self.time, &mut rules.time, runtime);
        reverted += release_cache(
            Category::Interior,
            &mut self.interior,
            &mut rules.interior,
            runtime,
        );

        tracing::info!(reverted, "Released all active rules");
        reverted
    }
}

fn release_cache<T, R>(
    category: Category,
    cache: &mut ActivationCache<T>,
    rules: &mut RuleSet<T>,
    runtime: &mut R,
) -> usize
where
    T: ToggleRule,
    R: EffectRuntime + ?Sized,
{
    let mut outcome = Evaluation::default();
    if cache.context().is_some() {
        leave_context(
            category,
            Transition::Lost,
            None,
            |_, _| false,
            rules,
            cache,
            runtime,
            &mut outcome,
        );
    }
    for rule in rules.values_mut().flatten() {
        rule.base_mut().is_toggled = false;
    }
    outcome.reverted
}

fn log_outcome(category: Category, outcome: &Evaluation) {
    if outcome.enabled == 0 && outcome.reverted == 0 && outcome.transition.is_none() {
        return;
    }
    tracing::debug!(
        %category,
        transition = ?outcome.transition,
        enabled = outcome.enabled,
        reverted = outcome.reverted,
        suppressed = outcome.suppressed,
        "Evaluated rules"
    );
}
