//! Toggle rule definitions
//!
//! Rules are grouped into four fixed categories. Each category is stored as a
//! [`RuleSet`] keyed by its context: menu name for menu rules, worldspace (or
//! cell) key for weather and time rules, interior cell key for interior rules.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clock;
use crate::uniform::EffectUniform;

/// Effect name reserved for toggling the whole effect runtime at once.
pub const ENTIRE_RESHADE: &str = "EntireReShade";

/// Context key → rules for that context, ordered by key.
pub type RuleSet<R> = BTreeMap<String, Vec<R>>;

/// The four fixed rule categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Menu,
    Time,
    Weather,
    Interior,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Menu,
        Category::Time,
        Category::Weather,
        Category::Interior,
    ];

    /// Name used as the category's key in preset documents and work queues
    pub fn name(&self) -> &'static str {
        match self {
            Self::Menu => "Menu",
            Self::Time => "Time",
            Self::Weather => "Weather",
            Self::Interior => "Interior",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Stable rule identity, assigned on first activation. `0` means unassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct RuleId(pub u64);

impl RuleId {
    pub const UNASSIGNED: Self = Self(0);

    pub fn is_assigned(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Fields shared by every rule category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleBase {
    #[serde(default)]
    pub effect_name: String,

    /// State the effect is driven to while the rule's context is active
    #[serde(rename = "state", default = "default_state")]
    pub desired_state: bool,

    #[serde(default)]
    pub uniforms: Vec<EffectUniform>,

    #[serde(skip)]
    pub id: RuleId,

    /// Whether this rule currently holds its effect in the desired state
    #[serde(skip)]
    pub is_toggled: bool,
}

fn default_state() -> bool {
    true
}

impl RuleBase {
    pub fn new(effect_name: impl Into<String>, desired_state: bool) -> Self {
        Self {
            effect_name: effect_name.into(),
            desired_state,
            uniforms: Vec::new(),
            id: RuleId::UNASSIGNED,
            is_toggled: false,
        }
    }

    /// Same effect driven to the same state
    pub fn same_target(&self, other: &RuleBase) -> bool {
        self.effect_name == other.effect_name && self.desired_state == other.desired_state
    }

    /// Clear runtime-only state (identity, toggle flag, resolved handles)
    pub fn reset_runtime(&mut self) {
        self.id = RuleId::UNASSIGNED;
        self.is_toggled = false;
        for uniform in &mut self.uniforms {
            uniform.handle = Default::default();
            uniform.prefetched = false;
        }
    }

    /// First uniform holding a NaN or infinite float, as `uniforms/<name>`
    pub fn non_finite_field(&self) -> Option<String> {
        self.uniforms
            .iter()
            .find(|u| u.float_values.iter().any(|v| !v.is_finite()))
            .map(|u| format!("uniforms/{}", u.name))
    }
}

/// Access to the shared part of a rule
pub trait ToggleRule: Clone {
    fn base(&self) -> &RuleBase;
    fn base_mut(&mut self) -> &mut RuleBase;

    /// Field that JSON cannot represent, if any
    fn non_finite_field(&self) -> Option<String> {
        self.base().non_finite_field()
    }
}

/// Toggle an effect while a menu is open
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuRule {
    #[serde(flatten)]
    pub base: RuleBase,
    #[serde(default)]
    pub menu_name: String,
}

impl MenuRule {
    pub fn new(effect_name: impl Into<String>, menu_name: impl Into<String>, state: bool) -> Self {
        Self {
            base: RuleBase::new(effect_name, state),
            menu_name: menu_name.into(),
        }
    }
}

/// Toggle an effect while a weather is active in a worldspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRule {
    #[serde(flatten)]
    pub base: RuleBase,
    /// Weather context key
    #[serde(default)]
    pub weather: String,
}

impl WeatherRule {
    pub fn new(effect_name: impl Into<String>, weather: impl Into<String>, state: bool) -> Self {
        Self {
            base: RuleBase::new(effect_name, state),
            weather: weather.into(),
        }
    }
}

/// Toggle an effect during a window of in-game time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRule {
    #[serde(flatten)]
    pub base: RuleBase,
    /// `HH.MM` float, see [`crate::clock`]
    #[serde(default)]
    pub start_time: f32,
    #[serde(default)]
    pub stop_time: f32,
}

impl TimeRule {
    pub fn new(
        effect_name: impl Into<String>,
        start_time: f32,
        stop_time: f32,
        state: bool,
    ) -> Self {
        Self {
            base: RuleBase::new(effect_name, state),
            start_time,
            stop_time,
        }
    }

    /// Whether `now` (in `HH.MM` form) lies inside this rule's window
    pub fn contains(&self, now: f32) -> bool {
        clock::within_range(self.start_time, self.stop_time, now)
    }

    /// Windows starting after they stop are kept but never match
    pub fn is_valid_range(&self) -> bool {
        match (clock::hundredths(self.start_time), clock::hundredths(self.stop_time)) {
            (Some(start), Some(stop)) => start <= stop,
            _ => false,
        }
    }
}

/// Toggle an effect while the player is inside a cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteriorRule {
    #[serde(flatten)]
    pub base: RuleBase,
}

impl InteriorRule {
    pub fn new(effect_name: impl Into<String>, state: bool) -> Self {
        Self {
            base: RuleBase::new(effect_name, state),
        }
    }
}

impl ToggleRule for MenuRule {
    fn base(&self) -> &RuleBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut RuleBase {
        &mut self.base
    }
}

impl ToggleRule for WeatherRule {
    fn base(&self) -> &RuleBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut RuleBase {
        &mut self.base
    }
}

impl ToggleRule for TimeRule {
    fn base(&self) -> &RuleBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut RuleBase {
        &mut self.base
    }
    fn non_finite_field(&self) -> Option<String> {
        if !self.start_time.is_finite() {
            return Some("startTime".to_string());
        }
        if !self.stop_time.is_finite() {
            return Some("stopTime".to_string());
        }
        self.base.non_finite_field()
    }
}

impl ToggleRule for InteriorRule {
    fn base(&self) -> &RuleBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut RuleBase {
        &mut self.base
    }
}

/// The complete rule model: one rule set per category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleBook {
    pub menu: RuleSet<MenuRule>,
    pub time: RuleSet<TimeRule>,
    pub weather: RuleSet<WeatherRule>,
    pub interior: RuleSet<InteriorRule>,
}

impl RuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.menu.is_empty()
            && self.time.is_empty()
            && self.weather.is_empty()
            && self.interior.is_empty()
    }

    /// Total number of rules across all categories
    pub fn rule_count(&self) -> usize {
        count(&self.menu) + count(&self.time) + count(&self.weather) + count(&self.interior)
    }

    /// Clear runtime-only state on every rule
    pub fn reset_runtime(&mut self) {
        reset(&mut self.menu);
        reset(&mut self.time);
        reset(&mut self.weather);
        reset(&mut self.interior);
    }
}

fn count<R>(set: &RuleSet<R>) -> usize {
    set.values().map(Vec::len).sum()
}

fn reset<R: ToggleRule>(set: &mut RuleSet<R>) {
    for rule in set.values_mut().flatten() {
        rule.base_mut().reset_runtime();
    }
}
