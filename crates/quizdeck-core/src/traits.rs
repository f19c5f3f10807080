//! Core trait definitions for external collaborators.

use crate::error::SessionError;

/// String-keyed durable storage used to hand session state between
/// invocations. Values are JSON documents.
///
/// Implemented by [`crate::store::MemoryStore`] and
/// [`crate::store::FileStore`]; typed access goes through
/// [`crate::session::Session`].
pub trait SessionStore {
    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String) -> Result<(), SessionError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), SessionError>;
}
