//! Shared types for the effect toggler.
//!
//! Pure data: rule definitions, uniform overrides, persisted settings and the
//! `HH.MM` game-clock encoding. Behaviour lives in `toggler-core`.

pub mod clock;
pub mod rules;
pub mod settings;
pub mod uniform;

pub use clock::GameClock;
pub use rules::{
    Category, ENTIRE_RESHADE, InteriorRule, MenuRule, RuleBase, RuleBook, RuleId, RuleSet, TimeRule,
    ToggleRule, WeatherRule,
};
pub use settings::{PresetSettings, ToggleSettings, TogglerSettings};
pub use uniform::{
    EffectUniform, MAX_UNIFORM_ELEMENTS, StagedValues, UNSET_BOOL, UniformHandle, UniformKind,
    UniformValue,
};
