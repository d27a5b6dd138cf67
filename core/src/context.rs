//! Game context observed by the evaluators
//!
//! Worldspaces, cells and weathers are identified two ways: by their numeric
//! form id (identity within a session) and by a composite string key that is
//! stable across sessions and is what rule sets are keyed by.

use toggler_types::GameClock;

/// A host world object (worldspace, cell, weather)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FormRef {
    pub form_id: u32,
    pub key: String,
}

impl FormRef {
    /// Build the persistent key `"{form_id:08X}|{editor_id}|{mod_name}"`.
    pub fn new(form_id: u32, editor_id: &str, mod_name: &str) -> Self {
        Self {
            form_id,
            key: format_key(form_id, editor_id, mod_name),
        }
    }

    /// Wrap an already-built key
    pub fn from_key(form_id: u32, key: impl Into<String>) -> Self {
        Self {
            form_id,
            key: key.into(),
        }
    }

    /// Same object in the current session
    pub fn same_identity(&self, other: &FormRef) -> bool {
        self.form_id == other.form_id
    }
}

/// Persistent context key for a world object
pub fn format_key(form_id: u32, editor_id: &str, mod_name: &str) -> String {
    format!("{:08X}|{}|{}", form_id, editor_id, mod_name)
}

/// Read access to the host game's current state.
///
/// Enumeration methods default to empty lists; hosts that back an editor UI
/// override them.
pub trait GameHost {
    /// Current worldspace, `None` when indoors or not loaded
    fn worldspace(&self) -> Option<FormRef>;

    /// Cell the player stands in
    fn parent_cell(&self) -> Option<FormRef>;

    fn is_interior(&self) -> bool;

    /// Current weather, `None` when the sky has no active weather
    fn weather(&self) -> Option<FormRef>;

    /// Current in-game time, `None` when the calendar is unavailable
    fn clock(&self) -> Option<GameClock>;

    fn is_paused(&self) -> bool;

    fn menus(&self) -> Vec<String> {
        Vec::new()
    }

    fn worldspaces(&self) -> Vec<String> {
        Vec::new()
    }

    fn interior_cells(&self) -> Vec<String> {
        Vec::new()
    }

    fn weathers(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Inputs of one weather evaluation
#[derive(Debug, Clone, Default)]
pub struct WeatherSnapshot {
    pub worldspace: Option<FormRef>,
    /// Weather key
    pub weather: Option<String>,
    pub paused: bool,
}

impl WeatherSnapshot {
    pub fn capture<H: GameHost + ?Sized>(host: &H) -> Self {
        Self {
            worldspace: host.worldspace(),
            weather: host.weather().map(|w| w.key),
            paused: host.is_paused(),
        }
    }
}

/// Inputs of one time evaluation
#[derive(Debug, Clone, Default)]
pub struct TimeSnapshot {
    /// Worldspace, or the player's cell when there is none
    pub context: Option<FormRef>,
    pub clock: Option<GameClock>,
    pub paused: bool,
}

impl TimeSnapshot {
    pub fn capture<H: GameHost + ?Sized>(host: &H) -> Self {
        Self {
            context: host.worldspace().or_else(|| host.parent_cell()),
            clock: host.clock(),
            paused: host.is_paused(),
        }
    }
}

/// Inputs of one interior evaluation
#[derive(Debug, Clone, Default)]
pub struct InteriorSnapshot {
    pub interior: bool,
    pub cell: Option<FormRef>,
}

impl InteriorSnapshot {
    pub fn capture<H: GameHost + ?Sized>(host: &H) -> Self {
        Self {
            interior: host.is_interior(),
            cell: host.parent_cell(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Outdoors;

    impl GameHost for Outdoors {
        fn worldspace(&self) -> Option<FormRef> {
            None
        }
        fn parent_cell(&self) -> Option<FormRef> {
            Some(FormRef::new(0x1A2B, "SolitudeBluffs", "Skyrim.esm"))
        }
        fn is_interior(&self) -> bool {
            false
        }
        fn weather(&self) -> Option<FormRef> {
            Some(FormRef::new(0x81A, "SkyrimClear", "Skyrim.esm"))
        }
        fn clock(&self) -> Option<GameClock> {
            Some(GameClock::new(21, 15))
        }
        fn is_paused(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_key_format() {
        let form = FormRef::new(0x3C, "Tamriel", "Skyrim.esm");
        assert_eq!(form.key, "0000003C|Tamriel|Skyrim.esm");
    }

    #[test]
    fn test_identity_ignores_key() {
        let a = FormRef::from_key(7, "a");
        let b = FormRef::from_key(7, "b");
        assert!(a.same_identity(&b));
        assert!(!a.same_identity(&FormRef::from_key(8, "a")));
    }

    #[test]
    fn test_time_snapshot_falls_back_to_cell() {
        let snapshot = TimeSnapshot::capture(&Outdoors);
        assert_eq!(
            snapshot.context.unwrap().key,
            "00001A2B|SolitudeBluffs|Skyrim.esm"
        );
        assert_eq!(snapshot.clock, Some(GameClock::new(21, 15)));

        let weather = WeatherSnapshot::capture(&Outdoors);
        assert_eq!(
            weather.weather.as_deref(),
            Some("0000081A|SkyrimClear|Skyrim.esm")
        );
        assert!(weather.worldspace.is_none());
        assert!(Outdoors.menus().is_empty());
    }
}
