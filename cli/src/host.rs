//! Game host driven by REPL commands

use std::collections::BTreeMap;

use toggler_core::{FormRef, GameHost};
use toggler_types::GameClock;

pub const DEFAULT_PLUGIN: &str = "Skyrim.esm";

/// First form id handed out to names without an explicit id
const FIRST_FORM_ID: u32 = 0x800;

#[derive(Debug, Clone)]
pub struct ScriptedHost {
    pub worldspace: Option<FormRef>,
    /// Worldspace to return to after leaving an interior
    pub last_worldspace: Option<FormRef>,
    pub cell: Option<FormRef>,
    pub interior: bool,
    pub weather: Option<FormRef>,
    pub clock: Option<GameClock>,
    pub paused: bool,
    forms: BTreeMap<String, FormRef>,
    next_id: u32,
}

impl Default for ScriptedHost {
    fn default() -> Self {
        Self {
            worldspace: None,
            last_worldspace: None,
            cell: None,
            interior: false,
            weather: None,
            clock: Some(GameClock::new(12, 0)),
            paused: false,
            forms: BTreeMap::new(),
            next_id: FIRST_FORM_ID,
        }
    }
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up or register a form by editor id.
    ///
    /// An explicit `form_id` re-registers the name under that id.
    pub fn form(&mut self, editor_id: &str, form_id: Option<u32>, plugin: Option<&str>) -> FormRef {
        if form_id.is_none()
            && plugin.is_none()
            && let Some(form) = self.forms.get(editor_id)
        {
            return form.clone();
        }

        let id = form_id.unwrap_or_else(|| {
            let id = self.next_id;
            self.next_id += 1;
            id
        });
        let form = FormRef::new(id, editor_id, plugin.unwrap_or(DEFAULT_PLUGIN));
        self.forms.insert(editor_id.to_string(), form.clone());
        form
    }

    pub fn enter_worldspace(&mut self, world: FormRef) {
        self.interior = false;
        self.cell = None;
        self.last_worldspace = Some(world.clone());
        self.worldspace = Some(world);
    }

    pub fn enter_interior(&mut self, cell: FormRef) {
        if self.worldspace.is_some() {
            self.last_worldspace = self.worldspace.take();
        }
        self.interior = true;
        self.cell = Some(cell);
    }

    /// Step outside, back into `world` or the last worldspace visited
    pub fn leave_interior(&mut self, world: Option<FormRef>) {
        self.interior = false;
        self.cell = None;
        self.worldspace = world.or_else(|| self.last_worldspace.clone());
    }
}

impl GameHost for ScriptedHost {
    fn worldspace(&self) -> Option<FormRef> {
        self.worldspace.clone()
    }

    fn parent_cell(&self) -> Option<FormRef> {
        self.cell.clone()
    }

    fn is_interior(&self) -> bool {
        self.interior
    }

    fn weather(&self) -> Option<FormRef> {
        self.weather.clone()
    }

    fn clock(&self) -> Option<GameClock> {
        self.clock
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}
