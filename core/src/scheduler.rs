//! Background scheduling
//!
//! Evaluations must run on the thread that owns the effect runtime. A
//! [`Ticker`] thread only decides *when* a category is due and submits a job
//! to a [`WorkQueue`]; the owning thread calls [`WorkQueue::drain`] from its
//! own loop.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use toggler_types::{Category, ToggleSettings};

/// Deferred work run against the owner's state
pub type Job<T> = Box<dyn FnOnce(&mut T) + Send>;

/// How often the ticker wakes to check deadlines
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Pending jobs, at most one per category.
pub struct WorkQueue<T> {
    jobs: Mutex<BTreeMap<Category, Job<T>>>,
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self {
            jobs: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a job, replacing any job already pending for `category`.
    pub fn submit(&self, category: Category, job: Job<T>) {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        if jobs.insert(category, job).is_some() {
            tracing::trace!(%category, "Replaced pending job");
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_pending(&self, category: Category) -> bool {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&category)
    }

    /// Run every pending job. Returns how many ran.
    ///
    /// The lock is released before the jobs run, so a job may submit more
    /// work; that work runs on the next drain.
    pub fn drain(&self, target: &mut T) -> usize {
        let jobs = std::mem::take(&mut *self.jobs.lock().unwrap_or_else(PoisonError::into_inner));
        let count = jobs.len();
        for (_, job) in jobs {
            job(target);
        }
        count
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Ticker
// ─────────────────────────────────────────────────────────────────────────────

/// Per-category deadlines for the polled evaluators
#[derive(Debug, Clone)]
pub struct Schedule {
    entries: Vec<(Category, Duration, Instant)>,
}

impl Schedule {
    /// Every enabled category is due immediately at `start`.
    pub fn new(settings: &ToggleSettings, start: Instant) -> Self {
        let candidates = [
            (
                Category::Time,
                settings.enable_time,
                settings.time_update_interval_secs,
            ),
            (
                Category::Weather,
                settings.enable_weather,
                settings.weather_update_interval_secs,
            ),
            (
                Category::Interior,
                settings.enable_interior,
                settings.interior_update_interval_secs,
            ),
        ];

        let entries = candidates
            .into_iter()
            .filter(|(_, enabled, _)| *enabled)
            .map(|(category, _, secs)| (category, Duration::from_secs(secs.max(1)), start))
            .collect();
        Self { entries }
    }

    pub fn categories(&self) -> Vec<Category> {
        self.entries.iter().map(|(category, _, _)| *category).collect()
    }

    /// Categories due at `now`, pushing their deadlines forward.
    ///
    /// Weather is held back while `indoors` is set; it stays due and fires
    /// once the player is outside again.
    pub fn due(&mut self, now: Instant, indoors: bool) -> Vec<Category> {
        let mut due = Vec::new();
        for (category, interval, deadline) in &mut self.entries {
            if now < *deadline {
                continue;
            }
            if *category == Category::Weather && indoors {
                continue;
            }
            *deadline = now + *interval;
            due.push(*category);
        }
        due
    }
}

/// Background thread submitting evaluation jobs on a schedule
pub struct Ticker {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Start ticking. `make_job` builds the job submitted for a due category.
    pub fn spawn<T, F>(
        queue: Arc<WorkQueue<T>>,
        settings: &ToggleSettings,
        indoors: Arc<AtomicBool>,
        make_job: F,
    ) -> std::io::Result<Self>
    where
        T: 'static,
        F: Fn(Category) -> Job<T> + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let mut schedule = Schedule::new(settings, Instant::now());
        tracing::info!(categories = ?schedule.categories(), "Starting ticker");

        let flag = running.clone();
        let handle = thread::Builder::new()
            .name("toggler-ticker".to_string())
            .spawn(move || {
                while flag.load(Ordering::Acquire) {
                    let now = Instant::now();
                    for category in schedule.due(now, indoors.load(Ordering::Acquire)) {
                        queue.submit(category, make_job(category));
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                tracing::debug!("Ticker stopped");
            })?;

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Clear the running flag and wait for the thread to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::error!("Ticker thread panicked");
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
