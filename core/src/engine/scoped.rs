//! Context-scoped rule activation
//!
//! Weather, time and interior rules all follow the same cycle:
//!
//! 1. If the tracked context was lost or switched identity, revert every
//!    cached rule (unless an equivalent rule keeps the effect alive in the new
//!    context) and clear the cache.
//! 2. Look up the rules of the current context.
//! 3. Activate matching rules, revert previously toggled ones that stopped
//!    matching, keep the cache in sync.
//! 4. Push every rule's uniform overrides.
//!
//! A [`ScopeStrategy`] supplies the per-category pieces.

use toggler_types::{Category, RuleSet, ToggleRule};

use super::cache::{ActivationCache, RuleIdGenerator};
use crate::context::FormRef;
use crate::runtime::{EffectRuntime, toggle_effect};
use crate::uniform;

/// Why a cached context was left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No current context (indoors, unloaded, not in an interior)
    Lost,
    /// A different context than the cached one
    Switched,
}

/// What one evaluation did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Preconditions failed (paused, no data, no rules); nothing ran
    pub skipped: bool,
    pub transition: Option<Transition>,
    /// "Enable to desired state" calls issued
    pub enabled: usize,
    /// "Enable to reverted state" calls issued
    pub reverted: usize,
    /// Cached rules kept alive across a transition
    pub suppressed: usize,
}

impl Evaluation {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Per-category behaviour plugged into [`evaluate_scoped`]
pub(crate) trait ScopeStrategy {
    type Rule: ToggleRule;

    const CATEGORY: Category;

    /// Stop the cycle right after leaving a context
    const HALT_ON_TRANSITION: bool;

    /// Record the current context even when no rule matched
    const PIN_CONTEXT: bool;

    /// Whether the rule applies right now
    fn matches(&self, rule: &Self::Rule) -> bool;

    /// Whether `candidate` (in the new context) keeps `cached`'s effect alive
    fn carries_over(&self, cached: &Self::Rule, candidate: &Self::Rule) -> bool;
}

/// Current context of one evaluation
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScopeInput<'a> {
    pub current: Option<&'a FormRef>,
}

pub(crate) fn evaluate_scoped<S, R>(
    strategy: &S,
    input: ScopeInput<'_>,
    rules: &mut RuleSet<S::Rule>,
    cache: &mut ActivationCache<S::Rule>,
    ids: &mut RuleIdGenerator,
    runtime: &mut R,
) -> Evaluation
where
    S: ScopeStrategy,
    R: EffectRuntime + ?Sized,
{
    let mut outcome = Evaluation::default();
    let current = input.current;

    let lost = current.is_none();
    let switched = matches!(
        (current, cache.context()),
        (Some(now), Some(cached)) if !now.same_identity(cached)
    );

    if lost || switched {
        if cache.context().is_some() {
            let kind = if lost {
                Transition::Lost
            } else {
                Transition::Switched
            };
            let candidates = match kind {
                Transition::Switched => current,
                Transition::Lost => None,
            };
            leave_context(
                S::CATEGORY,
                kind,
                candidates,
                |cached, candidate| strategy.carries_over(cached, candidate),
                rules,
                cache,
                runtime,
                &mut outcome,
            );
        }
        if S::HALT_ON_TRANSITION {
            return outcome;
        }
    }

    let Some(current) = current else {
        return outcome;
    };
    let Some(list) = rules.get_mut(&current.key) else {
        return outcome;
    };

    for rule in list.iter_mut() {
        ids.assign(rule);

        if strategy.matches(rule) {
            let base = rule.base_mut();
            toggle_effect(runtime, &base.effect_name, base.desired_state);
            // Pinned scopes match every rule, so nothing reads the flag back
            if !S::PIN_CONTEXT {
                base.is_toggled = true;
            }
            outcome.enabled += 1;

            cache.set_context(current);
            cache.upsert(rule);
        } else if rule.base().is_toggled {
            let base = rule.base_mut();
            toggle_effect(runtime, &base.effect_name, !base.desired_state);
            base.is_toggled = false;
            outcome.reverted += 1;

            cache.remove(base.id);
        }

        let base = rule.base_mut();
        uniform::push_all(runtime, &base.effect_name, &mut base.uniforms);
    }

    if S::PIN_CONTEXT {
        cache.set_context(current);
    }

    outcome
}

/// Revert the cached rules of the context being left and clear the cache.
///
/// With `candidates` set, a cached rule whose effect is kept alive by one of
/// the candidate context's rules is left as is.
pub(crate) fn leave_context<T, R, F>(
    category: Category,
    kind: Transition,
    candidates: Option<&FormRef>,
    carries_over: F,
    rules: &mut RuleSet<T>,
    cache: &mut ActivationCache<T>,
    runtime: &mut R,
    outcome: &mut Evaluation,
) where
    T: ToggleRule,
    R: EffectRuntime + ?Sized,
    F: Fn(&T, &T) -> bool,
{
    let (previous, cached) = cache.take();
    let next_rules = candidates.and_then(|context| rules.get(&context.key));

    for rule in &cached {
        let base = rule.base();
        let kept = next_rules
            .is_some_and(|list| list.iter().any(|candidate| carries_over(rule, candidate)));

        if kept {
            tracing::debug!(
                %category,
                effect = %base.effect_name,
                "Effect carried over to new context"
            );
            outcome.suppressed += 1;
        } else {
            toggle_effect(runtime, &base.effect_name, !base.desired_state);
            outcome.reverted += 1;
        }
    }

    if let Some(previous) = &previous {
        tracing::debug!(
            %category,
            context = %previous.key,
            ?kind,
            reverted = outcome.reverted,
            "Left context"
        );
        if let Some(list) = rules.get_mut(&previous.key) {
            for rule in list.iter_mut() {
                let id = rule.base().id;
                if cached.iter().any(|c| c.base().id == id) {
                    rule.base_mut().is_toggled = false;
                }
            }
        }
    }

    outcome.transition = Some(kind);
}
