//! Activation caches and rule identities

use toggler_types::{RuleId, ToggleRule};

use crate::context::FormRef;

/// Hands out rule identities, starting at 1.
#[derive(Debug, Clone)]
pub struct RuleIdGenerator {
    next: u64,
}

impl Default for RuleIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleIdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Give `rule` an identity if it does not have one yet
    pub fn assign<R: ToggleRule>(&mut self, rule: &mut R) -> RuleId {
        let base = rule.base_mut();
        if !base.id.is_assigned() {
            base.id = RuleId(self.next);
            self.next += 1;
        }
        base.id
    }
}

/// Which context was last active and which of its rules are toggled on.
#[derive(Debug, Clone)]
pub struct ActivationCache<R> {
    context: Option<FormRef>,
    rules: Vec<R>,
}

impl<R> Default for ActivationCache<R> {
    fn default() -> Self {
        Self {
            context: None,
            rules: Vec::new(),
        }
    }
}

impl<R: ToggleRule> ActivationCache<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> Option<&FormRef> {
        self.context.as_ref()
    }

    pub fn rules(&self) -> &[R] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.context.is_none() && self.rules.is_empty()
    }

    pub fn contains(&self, id: RuleId) -> bool {
        self.rules.iter().any(|r| r.base().id == id)
    }

    pub(crate) fn set_context(&mut self, context: &FormRef) {
        if self.context.as_ref() != Some(context) {
            self.context = Some(context.clone());
        }
    }

    /// Replace the entry with the same id, or append
    pub(crate) fn upsert(&mut self, rule: &R) {
        let id = rule.base().id;
        match self.rules.iter_mut().find(|r| r.base().id == id) {
            Some(existing) => *existing = rule.clone(),
            None => self.rules.push(rule.clone()),
        }
    }

    pub(crate) fn remove(&mut self, id: RuleId) {
        self.rules.retain(|r| r.base().id != id);
    }

    /// Empty the cache, returning what it held
    pub(crate) fn take(&mut self) -> (Option<FormRef>, Vec<R>) {
        (self.context.take(), std::mem::take(&mut self.rules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toggler_types::InteriorRule;

    #[test]
    fn test_ids_are_monotonic_and_sticky() {
        let mut ids = RuleIdGenerator::new();
        let mut a = InteriorRule::new("A", true);
        let mut b = InteriorRule::new("B", true);

        assert_eq!(ids.assign(&mut a), RuleId(1));
        assert_eq!(ids.assign(&mut b), RuleId(2));
        assert_eq!(ids.assign(&mut a), RuleId(1));
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let mut ids = RuleIdGenerator::new();
        let mut cache = ActivationCache::new();
        let mut rule = InteriorRule::new("Fog", true);
        ids.assign(&mut rule);

        cache.upsert(&rule);
        rule.base.is_toggled = true;
        cache.upsert(&rule);

        assert_eq!(cache.rules().len(), 1);
        assert!(cache.rules()[0].base.is_toggled);

        cache.remove(rule.base.id);
        assert!(!cache.contains(rule.base.id));
    }

    #[test]
    fn test_take_clears() {
        let mut cache: ActivationCache<InteriorRule> = ActivationCache::new();
        cache.set_context(&FormRef::from_key(1, "cell"));
        cache.upsert(&InteriorRule::new("Fog", true));

        let (context, rules) = cache.take();
        assert_eq!(context.unwrap().form_id, 1);
        assert_eq!(rules.len(), 1);
        assert!(cache.is_empty());
    }
}
