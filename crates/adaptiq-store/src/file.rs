//! JSON file store: one state file per learner in a directory.

use std::fmt::Write as _;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use adaptiq_core::error::StoreError;
use adaptiq_core::progress::QuizProgress;
use adaptiq_core::state::AdaptiveState;
use adaptiq_core::traits::StateStore;

/// Stores each learner's state as `<dir>/adaptive_state_<learner>.json` and
/// quiz progress as `<dir>/quiz_progress_<learner>.json`.
///
/// Writes land in a temp file in the same directory and are renamed over
/// the target, so readers see the old blob or the new one, never a mix.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `learner`'s state.
    pub fn path_for(&self, learner: &str) -> PathBuf {
        self.dir
            .join(format!("adaptive_state_{}.json", sanitize_learner_id(learner)))
    }

    /// File holding `learner`'s quiz progress.
    pub fn progress_path_for(&self, learner: &str) -> PathBuf {
        self.dir
            .join(format!("quiz_progress_{}.json", sanitize_learner_id(learner)))
    }

    fn write_atomic(&self, path: &Path, json: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;

        tracing::debug!(path = %path.display(), bytes = json.len(), "blob written");
        Ok(())
    }
}

/// Read a file, `None` if it does not exist.
fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn remove_optional(path: &Path) -> Result<(), StoreError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Map a learner id onto `[A-Za-z0-9_-]`, hex-escaping every other byte as
/// `%xx`. Distinct ids map to distinct names.
pub fn sanitize_learner_id(learner: &str) -> String {
    let mut out = String::with_capacity(learner.len());
    for b in learner.bytes() {
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' {
            out.push(b as char);
        } else {
            let _ = write!(out, "%{b:02x}");
        }
    }
    out
}

impl StateStore for JsonFileStore {
    fn name(&self) -> &str {
        "json-file"
    }

    fn fetch(&self, learner: &str) -> Result<Option<AdaptiveState>, StoreError> {
        read_optional(&self.path_for(learner))?
            .map(|raw| AdaptiveState::from_json(&raw))
            .transpose()
    }

    fn persist(&self, learner: &str, state: &AdaptiveState) -> Result<(), StoreError> {
        self.write_atomic(&self.path_for(learner), &state.to_json()?)
    }

    fn discard(&self, learner: &str) -> Result<(), StoreError> {
        remove_optional(&self.path_for(learner))?;
        remove_optional(&self.progress_path_for(learner))
    }

    fn fetch_progress(&self, learner: &str) -> Result<Option<QuizProgress>, StoreError> {
        read_optional(&self.progress_path_for(learner))?
            .map(|raw| QuizProgress::from_json(&raw))
            .transpose()
    }

    fn persist_progress(&self, learner: &str, progress: &QuizProgress) -> Result<(), StoreError> {
        self.write_atomic(&self.progress_path_for(learner), &progress.to_json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adaptiq_core::model::QuestionId;
    use adaptiq_core::state::QuestionState;
    use chrono::DateTime;

    fn sample_state() -> AdaptiveState {
        let mut state = AdaptiveState::new();
        // Millisecond precision, so the JSON roundtrip is exact.
        let at = DateTime::from_timestamp_millis(1_717_171_717_000).unwrap();
        let q = QuestionState::fresh(QuestionId::regular(2), 0.1).with_attempt(true, 1, at);
        state.questions.insert(q.id.clone(), q);
        state.last_session_number = 1;
        state.student.theta = 0.75;
        state
    }

    #[test]
    fn sanitize_keeps_safe_ids_and_escapes_the_rest() {
        assert_eq!(sanitize_learner_id("ana_01-b"), "ana_01-b");
        assert_eq!(sanitize_learner_id("../etc/passwd"), "%2e%2e%2fetc%2fpasswd");
        assert_eq!(sanitize_learner_id("a b"), "a%20b");
        assert_ne!(sanitize_learner_id("a/b"), sanitize_learner_id("a%2fb"));
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.fetch("nobody").unwrap().is_none());
        assert_eq!(store.load("nobody"), AdaptiveState::new());
    }

    #[test]
    fn persist_then_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));
        let state = sample_state();

        store.persist("ana", &state).unwrap();
        assert!(store.path_for("ana").ends_with("adaptive_state_ana.json"));
        assert_eq!(store.fetch("ana").unwrap(), Some(state.clone()));

        // No temp files are left behind.
        let files: Vec<_> = std::fs::read_dir(store.dir()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn overwrite_replaces_whole_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.persist("ana", &sample_state()).unwrap();
        store.persist("ana", &AdaptiveState::new()).unwrap();
        assert_eq!(store.fetch("ana").unwrap(), Some(AdaptiveState::new()));
    }

    #[test]
    fn corrupt_file_degrades_to_fresh_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(store.path_for("ana"), "{\"version\": 1, \"stud").unwrap();

        let err = store.fetch("ana").unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(store.load("ana"), AdaptiveState::new());
    }

    #[test]
    fn discard_removes_file_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.persist("ana", &sample_state()).unwrap();

        assert_eq!(store.reset("ana"), AdaptiveState::new());
        assert!(!store.path_for("ana").exists());
        store.discard("ana").unwrap();
    }

    #[test]
    fn progress_lives_beside_state_and_resets_with_it() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let at = DateTime::from_timestamp_millis(1_717_171_717_000).unwrap();
        let progress = QuizProgress::default().with_attempt(6, at);

        assert!(store.fetch_progress("ana").unwrap().is_none());
        store.persist("ana", &sample_state()).unwrap();
        store.persist_progress("ana", &progress).unwrap();
        assert!(store.progress_path_for("ana").ends_with("quiz_progress_ana.json"));
        assert_eq!(store.load_progress("ana"), progress);
        assert_eq!(store.fetch("ana").unwrap(), Some(sample_state()));

        store.reset("ana");
        assert!(!store.path_for("ana").exists());
        assert!(!store.progress_path_for("ana").exists());
        assert_eq!(store.load_progress("ana"), QuizProgress::default());
    }

    #[test]
    fn corrupt_progress_degrades_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(store.progress_path_for("ana"), "[1, 2").unwrap();
        assert_eq!(store.try_load_progress("ana").unwrap(), QuizProgress::default());
    }

    #[test]
    fn unreadable_state_is_an_error_for_try_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        // A directory where the file should be fails to read with an I/O error.
        std::fs::create_dir_all(store.path_for("ana")).unwrap();

        let err = store.try_load("ana").unwrap_err();
        assert!(!err.is_recoverable());
        assert_eq!(store.load("ana"), AdaptiveState::new());
    }

    #[test]
    fn learners_do_not_share_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.persist("ana", &sample_state()).unwrap();
        assert!(store.fetch("ben").unwrap().is_none());
    }
}
