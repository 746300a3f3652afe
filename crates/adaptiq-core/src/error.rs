//! Error types for state persistence and session submission.
//!
//! Defined in `adaptiq-core` so the engine can classify store failures
//! (recover with a fresh state vs. report) without string matching.

use thiserror::Error;

/// Errors that can occur when reading or writing a learner's adaptive state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying storage could not be read or written.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored blob exists but is not a valid adaptive state.
    #[error("stored state is corrupt: {0}")]
    Corrupt(String),

    /// The stored blob was written by an incompatible schema version.
    #[error("unsupported state version {found} (expected {expected})")]
    UnsupportedVersion { found: u64, expected: u32 },

    /// The state could not be serialized.
    #[error("failed to serialize state: {0}")]
    Serialize(String),
}

impl StoreError {
    /// Returns `true` if the stored blob may be replaced by a fresh default state.
    ///
    /// Corrupt or outdated data is never fatal. I/O failures are: the blob
    /// itself may be intact and must not be overwritten.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StoreError::Corrupt(_) | StoreError::UnsupportedVersion { .. }
        )
    }
}

/// Errors raised when submitting answers for a session plan.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The plan's results were already recorded.
    #[error("session {0} was already submitted")]
    AlreadySubmitted(uuid::Uuid),

    /// The number of answers does not match the number of planned questions.
    #[error("expected {expected} answers, got {got}")]
    AnswerCountMismatch { expected: usize, got: usize },

    /// The learner's stored state could not be read; nothing was recorded.
    #[error("could not read stored state: {0}")]
    StateUnavailable(String),
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        SessionError::StateUnavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_and_version_errors_are_recoverable() {
        assert!(StoreError::Corrupt("eof".into()).is_recoverable());
        assert!(StoreError::UnsupportedVersion {
            found: 7,
            expected: 1
        }
        .is_recoverable());
    }

    #[test]
    fn io_errors_are_not_recoverable() {
        let err = StoreError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn store_errors_convert_to_session_errors() {
        let err = SessionError::from(StoreError::from(std::io::Error::other("eio")));
        assert!(matches!(&err, SessionError::StateUnavailable(msg) if msg.contains("eio")));
    }
}
