//! Static checks on a rule book
//!
//! Decoding accepts anything structurally valid; lint reports rules that load
//! but will never behave as intended.

use std::fmt;

use toggler_types::clock::{format_time, is_valid_time};
use toggler_types::{
    Category, ENTIRE_RESHADE, MAX_UNIFORM_ELEMENTS, RuleBase, RuleBook, RuleSet, TimeRule,
    ToggleRule,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LintIssue {
    pub severity: Severity,
    pub category: Category,
    /// Context key the rule is stored under
    pub context: String,
    pub effect: String,
    pub message: String,
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: [{}] {} '{}': {}",
            self.severity, self.category, self.context, self.effect, self.message
        )
    }
}

/// Check every rule. With `known_effects`, also flag effects the runtime
/// does not provide.
pub fn lint(book: &RuleBook, known_effects: Option<&[String]>) -> Vec<LintIssue> {
    let mut issues = Vec::new();

    lint_set(Category::Menu, &book.menu, known_effects, &mut issues);
    lint_set(Category::Weather, &book.weather, known_effects, &mut issues);
    lint_set(
        Category::Interior,
        &book.interior,
        known_effects,
        &mut issues,
    );
    lint_set(Category::Time, &book.time, known_effects, &mut issues);

    for (context, rules) in &book.time {
        for rule in rules {
            lint_time_window(context, rule, &mut issues);
        }
    }

    issues
}

fn lint_set<R: ToggleRule>(
    category: Category,
    set: &RuleSet<R>,
    known_effects: Option<&[String]>,
    issues: &mut Vec<LintIssue>,
) {
    for (context, rules) in set {
        for rule in rules {
            let base = rule.base();
            let mut report = |severity, message: String| {
                issues.push(LintIssue {
                    severity,
                    category,
                    context: context.clone(),
                    effect: base.effect_name.clone(),
                    message,
                });
            };

            if base.effect_name.is_empty() {
                report(Severity::Error, "rule has no effect name".to_string());
            } else if let Some(known) = known_effects {
                if base.effect_name != ENTIRE_RESHADE && !known.contains(&base.effect_name) {
                    report(Severity::Warning, "effect is not loaded".to_string());
                }
            }

            lint_uniforms(base, &mut report);
        }
    }
}

fn lint_uniforms(base: &RuleBase, report: &mut impl FnMut(Severity, String)) {
    for (index, uniform) in base.uniforms.iter().enumerate() {
        let name = &uniform.name;
        if name.is_empty() {
            report(Severity::Error, format!("uniform #{index} has no name"));
        }
        if base.uniforms[..index].iter().any(|u| &u.name == name) {
            report(
                Severity::Warning,
                format!("uniform '{name}' is listed twice"),
            );
        }

        match uniform.populated_slots() {
            0 => report(Severity::Warning, format!("uniform '{name}' has no value")),
            1 => {}
            n => report(
                Severity::Warning,
                format!("uniform '{name}' sets {n} value types, only one is applied"),
            ),
        }

        let len = uniform.max_len();
        if len > MAX_UNIFORM_ELEMENTS {
            report(
                Severity::Error,
                format!("uniform '{name}' carries {len} values, at most {MAX_UNIFORM_ELEMENTS} are allowed"),
            );
        }
    }
}

fn lint_time_window(context: &str, rule: &TimeRule, issues: &mut Vec<LintIssue>) {
    let mut report = |severity, message: String| {
        issues.push(LintIssue {
            severity,
            category: Category::Time,
            context: context.to_string(),
            effect: rule.base.effect_name.clone(),
            message,
        });
    };

    let mut valid = true;
    for (label, value) in [("start", rule.start_time), ("stop", rule.stop_time)] {
        if !is_valid_time(value) {
            report(
                Severity::Error,
                format!("{label} time {value} is not a time of day"),
            );
            valid = false;
        }
    }

    if valid && !rule.is_valid_range() {
        report(
            Severity::Warning,
            format!(
                "window {} - {} starts after it stops and never matches",
                format_time(rule.start_time),
                format_time(rule.stop_time)
            ),
        );
    }
}
