//! Time-of-day evaluator
//!
//! Rules are keyed by worldspace, or by cell when the player has no
//! worldspace. Times use the `HH.MM` encoding from [`toggler_types::clock`].

use toggler_types::{Category, TimeRule};

use super::scoped::ScopeStrategy;

pub(crate) struct TimeScope {
    pub now: f32,
}

impl ScopeStrategy for TimeScope {
    type Rule = TimeRule;

    const CATEGORY: Category = Category::Time;
    const HALT_ON_TRANSITION: bool = true;
    const PIN_CONTEXT: bool = false;

    fn matches(&self, rule: &TimeRule) -> bool {
        rule.contains(self.now)
    }

    // The candidate must be live right now, not merely cover the same window
    fn carries_over(&self, cached: &TimeRule, candidate: &TimeRule) -> bool {
        cached.base.same_target(&candidate.base) && candidate.contains(self.now)
    }
}
