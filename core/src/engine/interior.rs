//! Interior evaluator
//!
//! Every rule of the current interior cell applies while the player is in it.

use toggler_types::{Category, InteriorRule};

use super::scoped::ScopeStrategy;

pub(crate) struct InteriorScope;

impl ScopeStrategy for InteriorScope {
    type Rule = InteriorRule;

    const CATEGORY: Category = Category::Interior;
    const HALT_ON_TRANSITION: bool = false;
    const PIN_CONTEXT: bool = true;

    fn matches(&self, _rule: &InteriorRule) -> bool {
        true
    }

    fn carries_over(&self, cached: &InteriorRule, candidate: &InteriorRule) -> bool {
        cached.base.same_target(&candidate.base)
    }
}
