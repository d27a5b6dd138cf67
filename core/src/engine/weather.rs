//! Weather evaluator
//!
//! Rules are keyed by worldspace; each one names the weather it reacts to.

use toggler_types::{Category, WeatherRule};

use super::scoped::ScopeStrategy;

pub(crate) struct WeatherScope<'a> {
    pub weather: &'a str,
}

impl ScopeStrategy for WeatherScope<'_> {
    type Rule = WeatherRule;

    const CATEGORY: Category = Category::Weather;
    const HALT_ON_TRANSITION: bool = true;
    const PIN_CONTEXT: bool = false;

    fn matches(&self, rule: &WeatherRule) -> bool {
        rule.weather == self.weather
    }

    fn carries_over(&self, cached: &WeatherRule, candidate: &WeatherRule) -> bool {
        cached.base.same_target(&candidate.base) && cached.weather == candidate.weather
    }
}
