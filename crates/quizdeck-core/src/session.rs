//! Typed session state over a [`SessionStore`].
//!
//! Each stored key has one accessor pair. The flow operations (`prepare`,
//! `begin`, `complete`, `load_results`, `restart`) are the hand-offs between
//! starting a test, taking it, and viewing its results.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::engine::TestEngine;
use crate::error::SessionError;
use crate::model::{Question, TestSettings};
use crate::report::ResultRecord;
use crate::traits::SessionStore;

pub const SETTINGS_KEY: &str = "testSettings";
pub const QUESTIONS_KEY: &str = "testQuestions";
pub const RESULTS_KEY: &str = "testResults";
pub const COMPLETED_KEY: &str = "testCompleted";

/// Typed access to one test session's stored state.
#[derive(Debug)]
pub struct Session<S> {
    store: S,
}

impl<S: SessionStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SessionError> {
        self.store
            .get(key)?
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|source| SessionError::Corrupt {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), SessionError> {
        let raw = serde_json::to_string(value).map_err(|source| SessionError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, raw)
    }

    // -----------------------------------------------------------------------
    // Per-key accessors
    // -----------------------------------------------------------------------

    pub fn settings(&self) -> Result<Option<TestSettings>, SessionError> {
        self.read(SETTINGS_KEY)
    }

    pub fn set_settings(&mut self, settings: &TestSettings) -> Result<(), SessionError> {
        self.write(SETTINGS_KEY, settings)
    }

    pub fn questions(&self) -> Result<Option<Vec<Question>>, SessionError> {
        self.read(QUESTIONS_KEY)
    }

    pub fn set_questions(&mut self, questions: &[Question]) -> Result<(), SessionError> {
        self.write(QUESTIONS_KEY, questions)
    }

    pub fn results(&self) -> Result<Option<ResultRecord>, SessionError> {
        self.read(RESULTS_KEY)
    }

    pub fn set_results(&mut self, record: &ResultRecord) -> Result<(), SessionError> {
        self.write(RESULTS_KEY, record)
    }

    /// Flag the stored session as finished.
    pub fn mark_completed(&mut self) -> Result<(), SessionError> {
        self.write(COMPLETED_KEY, &true)
    }

    /// Read and clear the completion flag.
    pub fn take_completed(&mut self) -> Result<bool, SessionError> {
        let completed = self.store.get(COMPLETED_KEY)?.is_some();
        if completed {
            self.store.remove(COMPLETED_KEY)?;
        }
        Ok(completed)
    }

    // -----------------------------------------------------------------------
    // Flow
    // -----------------------------------------------------------------------

    /// Store the settings and question set for a new session, discarding
    /// the previous session's results and completion flag.
    pub fn prepare(
        &mut self,
        settings: &TestSettings,
        questions: &[Question],
    ) -> Result<(), SessionError> {
        self.set_settings(settings)?;
        self.set_questions(questions)?;
        self.store.remove(RESULTS_KEY)?;
        self.store.remove(COMPLETED_KEY)?;
        tracing::info!(questions = questions.len(), "test prepared");
        Ok(())
    }

    /// Build an engine from the stored settings and questions.
    ///
    /// Fails with [`SessionError::AlreadyCompleted`] when the stored session
    /// was already finished; the flag is cleared so the next attempt to
    /// begin starts the stored test afresh.
    pub fn begin(&mut self) -> Result<TestEngine, SessionError> {
        let settings = self.settings()?.ok_or(SessionError::MissingSettings)?;
        let questions = self.questions()?.ok_or(SessionError::MissingQuestions)?;

        if self.take_completed()? {
            tracing::warn!("refusing to re-enter a completed test");
            return Err(SessionError::AlreadyCompleted);
        }

        Ok(TestEngine::new(questions, settings))
    }

    /// Finish `engine`, then store its result record and the completion flag.
    ///
    /// The flag is only written once the results are stored, so a failed
    /// write never leaves a completed session without results.
    pub fn complete(&mut self, engine: &mut TestEngine) -> Result<ResultRecord, SessionError> {
        let record = engine.finish().clone();
        self.set_results(&record)?;
        self.mark_completed()?;
        Ok(record)
    }

    pub fn load_results(&self) -> Result<ResultRecord, SessionError> {
        self.results()?.ok_or(SessionError::MissingResults)
    }

    /// Forget everything about the current session.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        for key in [RESULTS_KEY, SETTINGS_KEY, QUESTIONS_KEY, COMPLETED_KEY] {
            self.store.remove(key)?;
        }
        tracing::info!("session cleared");
        Ok(())
    }
}
