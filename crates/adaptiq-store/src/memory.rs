//! In-memory store, for simulations and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

use adaptiq_core::error::StoreError;
use adaptiq_core::progress::QuizProgress;
use adaptiq_core::state::AdaptiveState;
use adaptiq_core::traits::StateStore;

/// Keeps serialized blobs in a map, so every load goes through the same
/// JSON path as a real store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Learner → serialized state.
    blobs: Mutex<HashMap<String, String>>,
    /// Learner → serialized quiz progress.
    progress: Mutex<HashMap<String, String>>,
    /// Number of successful state writes.
    write_count: AtomicU32,
    /// When set, every write fails.
    fail_writes: AtomicBool,
    /// When set, every read fails.
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn blobs(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.blobs.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn progress_blobs(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.progress.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_readable(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "reads disabled",
            )));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Io(std::io::Error::other("writes disabled")));
        }
        Ok(())
    }

    /// Store a raw blob verbatim, e.g. a corrupt one.
    pub fn insert_raw(&self, learner: &str, raw: impl Into<String>) {
        self.blobs().insert(learner.to_string(), raw.into());
    }

    /// The raw blob stored for `learner`.
    pub fn raw(&self, learner: &str) -> Option<String> {
        self.blobs().get(learner).cloned()
    }

    pub fn write_count(&self) -> u32 {
        self.write_count.load(Ordering::Relaxed)
    }

    /// Make subsequent writes fail with an I/O error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Make subsequent reads fail with an I/O error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    /// Learners with stored state, sorted.
    pub fn learners(&self) -> Vec<String> {
        let mut learners: Vec<String> = self.blobs().keys().cloned().collect();
        learners.sort();
        learners
    }
}

impl StateStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch(&self, learner: &str) -> Result<Option<AdaptiveState>, StoreError> {
        self.check_readable()?;
        match self.raw(learner) {
            Some(raw) => AdaptiveState::from_json(&raw).map(Some),
            None => Ok(None),
        }
    }

    fn persist(&self, learner: &str, state: &AdaptiveState) -> Result<(), StoreError> {
        self.check_writable()?;
        let json = state.to_json()?;
        self.blobs().insert(learner.to_string(), json);
        self.write_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn discard(&self, learner: &str) -> Result<(), StoreError> {
        self.blobs().remove(learner);
        self.progress_blobs().remove(learner);
        Ok(())
    }

    fn fetch_progress(&self, learner: &str) -> Result<Option<QuizProgress>, StoreError> {
        self.check_readable()?;
        let raw = self.progress_blobs().get(learner).cloned();
        raw.map(|raw| QuizProgress::from_json(&raw)).transpose()
    }

    fn persist_progress(&self, learner: &str, progress: &QuizProgress) -> Result<(), StoreError> {
        self.check_writable()?;
        let json = progress.to_json()?;
        self.progress_blobs().insert(learner.to_string(), json);
        Ok(())
    }
}
