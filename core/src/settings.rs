//! Settings file
//!
//! [`TogglerSettings`] persisted as TOML through `confy`. A missing file is
//! created with defaults on first load.

use std::path::{Path, PathBuf};

use thiserror::Error;
use toggler_types::TogglerSettings;

pub const APP_NAME: &str = "effect-toggler";
const FILE_NAME: &str = "settings.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings from {}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: confy::ConfyError,
    },

    #[error("Failed to store settings to {}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: confy::ConfyError,
    },
}

/// `<config_dir>/effect-toggler/settings.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(FILE_NAME))
}

pub fn load(path: &Path) -> Result<TogglerSettings, SettingsError> {
    confy::load_path(path).map_err(|source| SettingsError::Load {
        path: path.to_path_buf(),
        source,
    })
}

/// Load settings, falling back to defaults when the file is unreadable.
pub fn load_or_default(path: &Path) -> TogglerSettings {
    match load(path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(error = %e, "Using default settings");
            TogglerSettings::default()
        }
    }
}

pub fn store(path: &Path, settings: &TogglerSettings) -> Result<(), SettingsError> {
    confy::store_path(path, settings).map_err(|source| SettingsError::Store {
        path: path.to_path_buf(),
        source,
    })
}

/// Remember `preset` as the one to load next time.
pub fn record_last_preset(
    path: &Path,
    settings: &mut TogglerSettings,
    preset: &str,
) -> Result<(), SettingsError> {
    if settings.preset.last_preset == preset {
        return Ok(());
    }
    settings.preset.last_preset = preset.to_string();
    store(path, settings)?;
    tracing::debug!(preset, "Recorded last preset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults_and_is_created() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(FILE_NAME);

        let settings = load(&path).unwrap();
        assert_eq!(settings, TogglerSettings::default());
        assert!(path.exists());
    }

    #[test]
    fn test_record_last_preset_persists() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(FILE_NAME);
        let mut settings = load(&path).unwrap();

        record_last_preset(&path, &mut settings, "Night.json").unwrap();
        assert_eq!(load(&path).unwrap().preset.last_preset, "Night.json");
    }

    #[test]
    fn test_file_layout() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(FILE_NAME);
        let mut settings = TogglerSettings::default();
        settings.preset.last_preset = "Default.json".to_string();
        settings.toggles.enable_weather = false;
        store(&path, &settings).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let table: toml::Table = toml::from_str(&text).unwrap();
        assert_eq!(table["Preset"]["LastPreset"].as_str(), Some("Default.json"));
        assert_eq!(table["Toggles"]["EnableWeather"].as_bool(), Some(false));
        assert_eq!(
            table["Toggles"]["TimeUpdateIntervalSecs"].as_integer(),
            Some(5)
        );
    }

    #[test]
    fn test_unreadable_file_falls_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(FILE_NAME);
        std::fs::write(&path, "Preset = [").unwrap();

        assert!(load(&path).is_err());
        assert_eq!(load_or_default(&path), TogglerSettings::default());
    }
}
