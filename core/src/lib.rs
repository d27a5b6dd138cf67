pub mod context;
pub mod engine;
pub mod preset;
pub mod runtime;
pub mod scheduler;
pub mod settings;
pub mod toggler;
pub mod uniform;

// Re-exports for convenience
pub use context::{FormRef, GameHost, InteriorSnapshot, TimeSnapshot, WeatherSnapshot};
pub use engine::{Evaluation, ToggleEngine, Transition};
pub use preset::{LintIssue, PresetError, PresetStore, Severity};
pub use runtime::{EffectRuntime, MemoryRuntime};
pub use scheduler::{Job, Ticker, WorkQueue};
pub use settings::SettingsError;
pub use toggler::Toggler;
pub use toggler_types::*;
