//! Core trait definitions for state persistence and randomness.
//!
//! State stores are implemented by the `adaptiq-store` crate; randomness is
//! any `rand` generator.

use crate::error::StoreError;
use crate::progress::QuizProgress;
use crate::state::AdaptiveState;

// ---------------------------------------------------------------------------
// State store trait
// ---------------------------------------------------------------------------

/// Persistence backend for per-learner adaptive state.
///
/// Implementors provide raw `fetch`/`persist`/`discard` plus the progress
/// counterparts. The provided `load`/`save`/`reset` apply the recovery
/// policy: a missing or corrupt blob becomes a fresh state, and write
/// failures are logged, never raised. `try_load` is the variant for callers
/// about to overwrite the blob: a storage failure comes back as an error.
pub trait StateStore: Send + Sync {
    /// Human-readable store name (e.g. "json-file").
    fn name(&self) -> &str;

    /// Read the stored state for `learner`, `None` if nothing is stored.
    fn fetch(&self, learner: &str) -> Result<Option<AdaptiveState>, StoreError>;

    /// Replace the stored state for `learner` in a single write.
    fn persist(&self, learner: &str, state: &AdaptiveState) -> Result<(), StoreError>;

    /// Remove any stored state and progress for `learner`.
    fn discard(&self, learner: &str) -> Result<(), StoreError>;

    /// Read the stored quiz progress for `learner`, `None` if nothing is stored.
    fn fetch_progress(&self, learner: &str) -> Result<Option<QuizProgress>, StoreError>;

    /// Replace the stored quiz progress for `learner`.
    fn persist_progress(&self, learner: &str, progress: &QuizProgress) -> Result<(), StoreError>;

    /// Load a learner's state. Missing, corrupt and outdated blobs become a
    /// fresh state; storage failures are returned.
    fn try_load(&self, learner: &str) -> Result<AdaptiveState, StoreError> {
        match self.fetch(learner) {
            Ok(Some(state)) => Ok(state),
            Ok(None) => Ok(AdaptiveState::new()),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(store = self.name(), learner, "discarding stored state: {e}");
                Ok(AdaptiveState::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Load a learner's state, degrading to a fresh state on any failure.
    fn load(&self, learner: &str) -> AdaptiveState {
        self.try_load(learner).unwrap_or_else(|e| {
            tracing::error!(store = self.name(), learner, "failed to load state: {e}");
            AdaptiveState::new()
        })
    }

    /// Persist a learner's state. Failures are logged and swallowed.
    fn save(&self, learner: &str, state: &AdaptiveState) {
        if let Err(e) = self.persist(learner, state) {
            tracing::warn!(store = self.name(), learner, "failed to save state: {e}");
        }
    }

    /// Progress counterpart of [`StateStore::try_load`].
    fn try_load_progress(&self, learner: &str) -> Result<QuizProgress, StoreError> {
        match self.fetch_progress(learner) {
            Ok(progress) => Ok(progress.unwrap_or_default()),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(store = self.name(), learner, "discarding stored progress: {e}");
                Ok(QuizProgress::default())
            }
            Err(e) => Err(e),
        }
    }

    fn load_progress(&self, learner: &str) -> QuizProgress {
        self.try_load_progress(learner).unwrap_or_else(|e| {
            tracing::error!(store = self.name(), learner, "failed to load progress: {e}");
            QuizProgress::default()
        })
    }

    fn save_progress(&self, learner: &str, progress: &QuizProgress) {
        if let Err(e) = self.persist_progress(learner, progress) {
            tracing::warn!(store = self.name(), learner, "failed to save progress: {e}");
        }
    }

    /// Discard a learner's state and progress and return the fresh default.
    fn reset(&self, learner: &str) -> AdaptiveState {
        if let Err(e) = self.discard(learner) {
            tracing::warn!(store = self.name(), learner, "failed to discard state: {e}");
        }
        AdaptiveState::new()
    }
}

// ---------------------------------------------------------------------------
// Randomness
// ---------------------------------------------------------------------------

/// Uniform random source for session selection.
///
/// Every call must be an independent draw from `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

impl<R: rand::Rng + ?Sized> RandomSource for R {
    fn next_f64(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Mutex;

    #[test]
    fn rng_draws_are_unit_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1_000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }

    struct FlakyStore {
        blob: Mutex<Option<Result<AdaptiveState, &'static str>>>,
        unreadable: bool,
    }

    impl StateStore for FlakyStore {
        fn name(&self) -> &str {
            "flaky"
        }

        fn fetch(&self, _: &str) -> Result<Option<AdaptiveState>, StoreError> {
            if self.unreadable {
                return Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "denied",
                )));
            }
            match self.blob.lock().unwrap().clone() {
                None => Ok(None),
                Some(Ok(s)) => Ok(Some(s)),
                Some(Err(msg)) => Err(StoreError::Corrupt(msg.into())),
            }
        }

        fn persist(&self, _: &str, _: &AdaptiveState) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }

        fn discard(&self, _: &str) -> Result<(), StoreError> {
            *self.blob.lock().unwrap() = None;
            Ok(())
        }

        fn fetch_progress(&self, _: &str) -> Result<Option<QuizProgress>, StoreError> {
            Err(StoreError::Corrupt("not json".into()))
        }

        fn persist_progress(&self, _: &str, _: &QuizProgress) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn corrupt_blob_loads_as_fresh_state() {
        let store = FlakyStore {
            blob: Mutex::new(Some(Err("truncated"))),
            unreadable: false,
        };
        assert_eq!(store.load("ana"), AdaptiveState::new());
    }

    #[test]
    fn save_failure_is_swallowed_and_reset_clears() {
        let mut stored = AdaptiveState::new();
        stored.last_session_number = 4;
        let store = FlakyStore {
            blob: Mutex::new(Some(Ok(stored.clone()))),
            unreadable: false,
        };

        store.save("ana", &stored);
        assert_eq!(store.load("ana").last_session_number, 4);

        assert_eq!(store.reset("ana"), AdaptiveState::new());
        assert_eq!(store.load("ana"), AdaptiveState::new());
    }

    #[test]
    fn unreadable_store_fails_try_load_but_load_degrades() {
        let mut stored = AdaptiveState::new();
        stored.student.total_sessions = 40;
        let store = FlakyStore {
            blob: Mutex::new(Some(Ok(stored))),
            unreadable: true,
        };

        assert!(matches!(store.try_load("ana"), Err(StoreError::Io(_))));
        assert_eq!(store.load("ana"), AdaptiveState::new());
    }

    #[test]
    fn corrupt_blob_is_not_a_try_load_error() {
        let store = FlakyStore {
            blob: Mutex::new(Some(Err("truncated"))),
            unreadable: false,
        };
        assert_eq!(store.try_load("ana").unwrap(), AdaptiveState::new());
        assert_eq!(store.try_load_progress("ana").unwrap(), QuizProgress::default());
        store.save_progress("ana", &QuizProgress::default());
    }
}
