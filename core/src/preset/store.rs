//! Preset directory

use std::fs;
use std::path::{Path, PathBuf};

use toggler_types::RuleBook;

use super::{PresetError, codec};

const EXTENSION: &str = "json";

/// A directory of preset documents
#[derive(Debug, Clone)]
pub struct PresetStore {
    dir: PathBuf,
}

impl PresetStore {
    /// Open a preset directory, creating it if absent.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PresetError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| PresetError::Write {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// `<config_dir>/effect-toggler/presets`
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("effect-toggler").join("presets"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File names of all presets, sorted
    pub fn list(&self) -> Result<Vec<String>, PresetError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| PresetError::FileUnavailable {
            path: self.dir.clone(),
            source,
        })?;

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.extension().is_some_and(|ext| ext == EXTENSION))
            .filter_map(|path| path.file_name()?.to_str().map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Path of a preset, adding the `.json` extension if missing
    pub fn path_for(&self, name: &str) -> PathBuf {
        let has_extension = Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION));
        if has_extension {
            self.dir.join(name)
        } else {
            self.dir.join(format!("{name}.{EXTENSION}"))
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    /// Read a preset into `book`. See [`codec::decode`] for partial loads.
    pub fn load_into(&self, name: &str, book: &mut RuleBook) -> Result<(), PresetError> {
        let path = self.path_for(name);
        let text = fs::read_to_string(&path).map_err(|source| PresetError::FileUnavailable {
            path: path.clone(),
            source,
        })?;

        codec::decode(&text, book)?;
        tracing::info!(path = %path.display(), rules = book.rule_count(), "Loaded preset");
        Ok(())
    }

    /// Write a preset, returning its path.
    ///
    /// The document is written even when some categories failed to encode;
    /// those are reported afterwards as [`PresetError::Incomplete`].
    pub fn save(&self, name: &str, book: &RuleBook) -> Result<PathBuf, PresetError> {
        let path = self.path_for(name);
        let encoded = codec::encode(book)?;

        fs::write(&path, &encoded.document).map_err(|source| PresetError::Write {
            path: path.clone(),
            source,
        })?;

        if !encoded.is_complete() {
            return Err(PresetError::Incomplete(encoded.failures));
        }
        tracing::info!(path = %path.display(), rules = book.rule_count(), "Saved preset");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use toggler_types::{EffectUniform, InteriorRule, MenuRule};

    fn make_store() -> (TempDir, PresetStore) {
        let temp = TempDir::new().unwrap();
        let store = PresetStore::open(temp.path().join("presets")).unwrap();
        (temp, store)
    }

    #[test]
    fn test_open_creates_directory() {
        let (_temp, store) = make_store();
        assert!(store.dir().is_dir());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_path_for_appends_extension_once() {
        let (_temp, store) = make_store();
        assert_eq!(store.path_for("Night"), store.dir().join("Night.json"));
        assert_eq!(store.path_for("Night.json"), store.dir().join("Night.json"));
    }

    #[test]
    fn test_save_then_load() {
        let (_temp, store) = make_store();
        let mut book = RuleBook::new();
        book.menu.insert(
            "MapMenu".into(),
            vec![MenuRule::new("Bloom", "MapMenu", false)],
        );
        book.interior
            .insert("cell".into(), vec![InteriorRule::new("Candle", true)]);

        let path = store.save("Evening", &book).unwrap();
        assert!(path.ends_with("Evening.json"));
        assert!(store.exists("Evening"));

        let mut loaded = RuleBook::new();
        store.load_into("Evening", &mut loaded).unwrap();
        assert_eq!(loaded, book);
    }

    #[test]
    fn test_save_with_nan_reports_and_keeps_other_categories() {
        let (_temp, store) = make_store();
        let mut book = RuleBook::new();
        book.menu.insert(
            "MapMenu".into(),
            vec![MenuRule::new("Bloom", "MapMenu", false)],
        );
        let mut candle = InteriorRule::new("Candle", true);
        candle.base.uniforms.push(EffectUniform::with_floats("Tint", &[f32::NAN]));
        book.interior.insert("cell".into(), vec![candle]);

        let err = store.save("Broken", &book).unwrap_err();
        assert_eq!(err.failures().len(), 1);
        assert!(matches!(err.failures()[0].error, PresetError::NonFinite { .. }));

        // Only the unwritten category is missing on the way back
        let mut loaded = RuleBook::new();
        let err = store.load_into("Broken", &mut loaded).unwrap_err();
        assert_eq!(err.failures().len(), 1);
        let failure = &err.failures()[0].error;
        assert!(matches!(failure, PresetError::MissingKey(_)));
        assert_eq!(loaded.menu, book.menu);
    }

    #[test]
    fn test_list_sorted_json_only() {
        let (_temp, store) = make_store();
        store.save("b", &RuleBook::new()).unwrap();
        store.save("a", &RuleBook::new()).unwrap();
        fs::write(store.dir().join("notes.txt"), "x").unwrap();
        fs::create_dir(store.dir().join("sub.json")).unwrap();

        assert_eq!(store.list().unwrap(), vec!["a.json", "b.json"]);
    }

    #[test]
    fn test_missing_preset_is_unavailable() {
        let (_temp, store) = make_store();
        let mut book = RuleBook::new();
        let err = store.load_into("nope", &mut book).unwrap_err();
        assert!(matches!(err, PresetError::FileUnavailable { .. }));
    }
}
