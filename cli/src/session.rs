//! State shared by the REPL and the jobs the ticker queues

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use toggler_core::runtime::MemoryRuntime;
use toggler_core::{Evaluation, Job, PresetStore, Toggler};
use toggler_types::{Category, TogglerSettings};

use crate::host::ScriptedHost;

pub struct Session {
    pub toggler: Toggler<MemoryRuntime>,
    pub host: ScriptedHost,
    pub store: PresetStore,
    pub settings: TogglerSettings,
    pub settings_path: PathBuf,
    /// Read by the ticker thread to hold back weather evaluations
    pub indoors: Arc<AtomicBool>,
}

impl Session {
    pub fn new(
        runtime: MemoryRuntime,
        store: PresetStore,
        settings: TogglerSettings,
        settings_path: PathBuf,
    ) -> Self {
        Self {
            toggler: Toggler::new(runtime),
            host: ScriptedHost::new(),
            store,
            settings,
            settings_path,
            indoors: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn evaluate(&mut self, category: Category) -> Evaluation {
        self.toggler.process(category, &self.host)
    }

    /// Publish the host's interior flag to the ticker
    pub fn sync_indoors(&self) {
        self.indoors.store(self.host.interior, Ordering::Release);
    }
}

/// Job the ticker submits for a due category
pub fn evaluation_job(category: Category) -> Job<Session> {
    Box::new(move |session: &mut Session| {
        let outcome = session.evaluate(category);
        if let Some(transition) = outcome.transition {
            tracing::info!(
                %category,
                ?transition,
                reverted = outcome.reverted,
                "Context changed"
            );
        }
    })
}
