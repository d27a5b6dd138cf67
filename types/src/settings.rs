//! Persisted toggler settings
//!
//! Stored as a small key/value file:
//!
//! ```toml
//! [Preset]
//! LastPreset = "Default.json"
//!
//! [Toggles]
//! EnableMenus = true
//! TimeUpdateIntervalSecs = 5
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TogglerSettings {
    #[serde(rename = "Preset", default)]
    pub preset: PresetSettings,
    #[serde(rename = "Toggles", default)]
    pub toggles: ToggleSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PresetSettings {
    /// Preset loaded at startup; empty when none has been used yet
    #[serde(rename = "LastPreset", default)]
    pub last_preset: String,
}

/// Which categories the background ticker evaluates and how often
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ToggleSettings {
    pub enable_menus: bool,
    pub enable_time: bool,
    pub enable_interior: bool,
    pub enable_weather: bool,
    pub time_update_interval_secs: u64,
    pub interior_update_interval_secs: u64,
    pub weather_update_interval_secs: u64,
}

impl Default for ToggleSettings {
    fn default() -> Self {
        Self {
            enable_menus: true,
            enable_time: true,
            enable_interior: true,
            enable_weather: true,
            time_update_interval_secs: 5,
            interior_update_interval_secs: 3,
            weather_update_interval_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let json = r#"{"Preset":{"LastPreset":"Night.json"},"Toggles":{"EnableWeather":false}}"#;
        let settings: TogglerSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.preset.last_preset, "Night.json");
        assert!(!settings.toggles.enable_weather);
        assert!(settings.toggles.enable_time);
        assert_eq!(settings.toggles.time_update_interval_secs, 5);
    }
}
