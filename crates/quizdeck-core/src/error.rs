//! Session error types.
//!
//! These are the conditions a presentation layer has to act on: missing
//! prerequisite state ends the flow and asks the user to start over, and
//! storage failures surface as-is. Malformed question data never shows up
//! here; the engine absorbs it.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised around a test session's stored state.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No settings were stored before the session was begun.
    #[error("test settings not found, start a new test first")]
    MissingSettings,

    /// No question set was stored before the session was begun.
    #[error("test questions not found, start a new test first")]
    MissingQuestions,

    /// The stored session was already finished.
    #[error("this test has already been completed, start a new test")]
    AlreadyCompleted,

    /// The results view found nothing to show.
    #[error("test results not found, take the test first")]
    MissingResults,

    /// The backing store could not be read or written.
    #[error("session storage error at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored value failed to encode or decode.
    #[error("stored value for '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl SessionError {
    /// Returns `true` if the only way forward is to start a new test.
    pub fn requires_restart(&self) -> bool {
        matches!(
            self,
            SessionError::MissingSettings
                | SessionError::MissingQuestions
                | SessionError::AlreadyCompleted
        )
    }
}
