//! Menu evaluator
//!
//! Several menus may request the same effect. A per-effect counter tracks how
//! many open menus currently hold it: the effect is driven to its desired
//! state when the first one opens and reverted when the last one closes.

use hashbrown::HashMap;
use toggler_types::{MenuRule, RuleSet};

use super::scoped::Evaluation;
use crate::runtime::{EffectRuntime, toggle_effect};
use crate::uniform;

#[derive(Debug, Clone, Default)]
pub struct MenuEvaluator {
    usage: HashMap<String, u16>,
}

impl MenuEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open menus holding `effect`
    pub fn usage(&self, effect: &str) -> u16 {
        self.usage.get(effect).copied().unwrap_or(0)
    }

    /// Effects currently held by at least one menu
    pub fn held_effects(&self) -> usize {
        self.usage.len()
    }

    /// Apply a menu open or close event.
    pub fn on_event<R: EffectRuntime + ?Sized>(
        &mut self,
        menu: &str,
        opening: bool,
        rules: &mut RuleSet<MenuRule>,
        runtime: &mut R,
    ) -> Evaluation {
        let mut outcome = Evaluation::default();
        let Some(list) = rules.get_mut(menu) else {
            return outcome;
        };

        for rule in list.iter_mut() {
            let base = &mut rule.base;

            if opening {
                if !base.is_toggled {
                    let count = self.usage.entry(base.effect_name.clone()).or_insert(0);
                    if *count == 0 {
                        toggle_effect(runtime, &base.effect_name, base.desired_state);
                        outcome.enabled += 1;
                    }
                    *count = count.saturating_add(1);
                    base.is_toggled = true;
                }
            } else if base.is_toggled {
                let remaining = match self.usage.get_mut(&base.effect_name) {
                    Some(count) => {
                        *count = count.saturating_sub(1);
                        *count
                    }
                    None => 0,
                };
                if remaining == 0 {
                    toggle_effect(runtime, &base.effect_name, !base.desired_state);
                    self.usage.remove(&base.effect_name);
                    outcome.reverted += 1;
                }
                base.is_toggled = false;
            }

            uniform::push_all(runtime, &base.effect_name, &mut base.uniforms);
        }

        tracing::debug!(
            menu,
            opening,
            enabled = outcome.enabled,
            reverted = outcome.reverted,
            "Menu event"
        );
        outcome
    }

    /// Revert every effect still held by an open menu and forget all counts.
    pub fn release<R: EffectRuntime + ?Sized>(
        &mut self,
        rules: &mut RuleSet<MenuRule>,
        runtime: &mut R,
    ) -> usize {
        let mut reverted = 0;
        for rule in rules.values_mut().flatten() {
            let base = &mut rule.base;
            if !base.is_toggled {
                continue;
            }
            if self.usage.remove(&base.effect_name).is_some() {
                toggle_effect(runtime, &base.effect_name, !base.desired_state);
                reverted += 1;
            }
            base.is_toggled = false;
        }
        self.usage.clear();
        reverted
    }

    pub fn reset(&mut self) {
        self.usage.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MemoryRuntime;

    fn runtime() -> MemoryRuntime {
        let mut runtime = MemoryRuntime::new();
        runtime.add_technique("Bloom", "BloomPass");
        runtime.add_technique("DOF", "DOFPass");
        runtime
    }

    fn rules() -> RuleSet<MenuRule> {
        let mut rules = RuleSet::new();
        rules.insert(
            "MapMenu".to_string(),
            vec![MenuRule::new("Bloom", "MapMenu", false)],
        );
        rules.insert(
            "InventoryMenu".to_string(),
            vec![
                MenuRule::new("Bloom", "InventoryMenu", false),
                MenuRule::new("DOF", "InventoryMenu", true),
            ],
        );
        rules
    }

    #[test]
    fn test_unknown_menu_is_noop() {
        let mut runtime = runtime();
        let mut rules = rules();
        let mut menus = MenuEvaluator::new();

        let outcome = menus.on_event("Console", true, &mut rules, &mut runtime);
        assert_eq!(outcome, Evaluation::default());
        assert!(runtime.calls().is_empty());
    }

    #[test]
    fn test_shared_effect_enabled_once_reverted_once() {
        let mut runtime = runtime();
        let mut rules = rules();
        let mut menus = MenuEvaluator::new();

        menus.on_event("MapMenu", true, &mut rules, &mut runtime);
        menus.on_event("InventoryMenu", true, &mut rules, &mut runtime);
        assert_eq!(menus.usage("Bloom"), 2);
        assert_eq!(runtime.toggles_for("Bloom"), vec![false]);

        menus.on_event("MapMenu", false, &mut rules, &mut runtime);
        assert_eq!(menus.usage("Bloom"), 1);
        assert_eq!(runtime.toggles_for("Bloom"), vec![false]);

        menus.on_event("InventoryMenu", false, &mut rules, &mut runtime);
        assert_eq!(menus.usage("Bloom"), 0);
        assert_eq!(runtime.toggles_for("Bloom"), vec![false, true]);
        assert_eq!(runtime.toggles_for("DOF"), vec![true, false]);
        assert_eq!(menus.held_effects(), 0);
    }

    #[test]
    fn test_repeated_open_does_not_double_count() {
        let mut runtime = runtime();
        let mut rules = rules();
        let mut menus = MenuEvaluator::new();

        menus.on_event("MapMenu", true, &mut rules, &mut runtime);
        menus.on_event("MapMenu", true, &mut rules, &mut runtime);
        assert_eq!(menus.usage("Bloom"), 1);

        menus.on_event("MapMenu", false, &mut rules, &mut runtime);
        menus.on_event("MapMenu", false, &mut rules, &mut runtime);
        assert_eq!(menus.usage("Bloom"), 0);
        assert_eq!(runtime.toggles_for("Bloom"), vec![false, true]);
    }

    #[test]
    fn test_close_with_missing_counter_reverts() {
        let mut runtime = runtime();
        let mut rules = rules();
        let mut menus = MenuEvaluator::new();

        menus.on_event("MapMenu", true, &mut rules, &mut runtime);
        menus.reset();
        menus.on_event("MapMenu", false, &mut rules, &mut runtime);

        assert_eq!(menus.usage("Bloom"), 0);
        assert_eq!(runtime.toggles_for("Bloom"), vec![false, true]);
        assert!(!rules["MapMenu"][0].base.is_toggled);
    }

    #[test]
    fn test_release_reverts_held_effects() {
        let mut runtime = runtime();
        let mut rules = rules();
        let mut menus = MenuEvaluator::new();

        menus.on_event("MapMenu", true, &mut rules, &mut runtime);
        menus.on_event("InventoryMenu", true, &mut rules, &mut runtime);

        let reverted = menus.release(&mut rules, &mut runtime);
        assert_eq!(reverted, 2);
        assert_eq!(runtime.toggles_for("Bloom"), vec![false, true]);
        assert_eq!(runtime.toggles_for("DOF"), vec![true, false]);
        assert!(rules.values().flatten().all(|r| !r.base.is_toggled));
    }
}
