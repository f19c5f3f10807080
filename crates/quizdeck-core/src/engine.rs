//! Test-session engine.
//!
//! Owns one attempt at a test: the presented question order, the current
//! position, the answer sheet, the countdown, and scoring. The engine never
//! renders anything; a presentation layer reads snapshots and writes only
//! through the operations below.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::model::{Answer, Question, TestSettings};
use crate::report::{FinishReason, ResultRecord};
use crate::timer::{format_time, Countdown, Ticks, TICK_PERIOD};

/// Lifecycle of a test session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    Running,
    Finished,
}

/// What a single countdown tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Time remains; carries the formatted remaining time.
    Tick(String),
    /// This tick used up the time limit and finished the test.
    TimeUp,
    /// The test had already finished; nothing changed.
    Stopped,
}

/// Presentation callbacks for the countdown.
pub trait TimerObserver {
    fn on_tick(&mut self, formatted: &str);
    fn on_time_up(&mut self);
}

/// No-op timer observer.
pub struct NoopObserver;

impl TimerObserver for NoopObserver {
    fn on_tick(&mut self, _: &str) {}
    fn on_time_up(&mut self) {}
}

/// The test-session engine.
#[derive(Debug)]
pub struct TestEngine {
    questions: Vec<Question>,
    settings: TestSettings,
    current_index: usize,
    user_answers: BTreeMap<u64, Answer>,
    started_at: DateTime<Utc>,
    remaining_secs: u64,
    countdown: Option<Countdown>,
    state: SessionState,
    result: Option<ResultRecord>,
}

impl TestEngine {
    /// Start a session over `questions` using the thread-local RNG for
    /// shuffling.
    pub fn new(questions: Vec<Question>, settings: TestSettings) -> Self {
        Self::with_rng(questions, settings, &mut rand::thread_rng())
    }

    /// Start a session, shuffling with `rng`.
    pub fn with_rng<R: Rng + ?Sized>(
        questions: Vec<Question>,
        settings: TestSettings,
        rng: &mut R,
    ) -> Self {
        let mut engine = Self {
            questions,
            settings,
            current_index: 0,
            user_answers: BTreeMap::new(),
            started_at: Utc::now(),
            remaining_secs: settings.time_limit_secs(),
            countdown: None,
            state: SessionState::Initializing,
            result: None,
        };
        engine.apply_settings(rng);
        engine.state = SessionState::Running;

        tracing::debug!(
            questions = engine.questions.len(),
            time_limit_minutes = settings.time_limit_minutes,
            shuffle_questions = settings.shuffle_questions,
            shuffle_answers = settings.shuffle_answers,
            "test session started"
        );
        engine
    }

    fn apply_settings<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.settings.shuffle_questions {
            self.questions.shuffle(rng);
        }
        if self.settings.shuffle_answers {
            for question in &mut self.questions {
                question.shuffle_answers(rng);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Timer
    // -----------------------------------------------------------------------

    /// Start the one-second countdown on the current tokio runtime.
    ///
    /// Feed every tick received from the returned channel to [`Self::tick`].
    /// Returns `None` if the session is not running or a countdown was
    /// already started.
    pub fn start_timer(&mut self) -> Option<Ticks> {
        if self.state != SessionState::Running || self.countdown.is_some() {
            return None;
        }
        let (countdown, ticks) = Countdown::spawn(TICK_PERIOD);
        self.countdown = Some(countdown);
        Some(ticks)
    }

    /// Apply one countdown tick.
    pub fn tick(&mut self, observer: &mut dyn TimerObserver) -> TickOutcome {
        if self.state != SessionState::Running {
            return TickOutcome::Stopped;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            tracing::info!("time limit reached");
            self.finish_with(FinishReason::TimeUp);
            observer.on_time_up();
            return TickOutcome::TimeUp;
        }

        let formatted = self.formatted_time();
        observer.on_tick(&formatted);
        TickOutcome::Tick(formatted)
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Remaining time as `M:SS`.
    pub fn formatted_time(&self) -> String {
        format_time(self.remaining_secs)
    }

    // -----------------------------------------------------------------------
    // Answers and navigation
    // -----------------------------------------------------------------------

    /// Record `answer` for `question_id`, replacing any earlier answer.
    ///
    /// The answer's shape is not checked against the question; a mismatched
    /// answer simply scores as incorrect. Returns `false` once the test has
    /// finished.
    pub fn save_answer(&mut self, question_id: u64, answer: Answer) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        self.user_answers.insert(question_id, answer);
        true
    }

    /// Forget the answer for `question_id`. Returns `false` once finished.
    pub fn clear_answer(&mut self, question_id: u64) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        self.user_answers.remove(&question_id);
        true
    }

    /// Jump to the question at `index`. Out-of-range targets leave the
    /// position unchanged and return `false`.
    pub fn move_to_question(&mut self, index: usize) -> bool {
        if self.state != SessionState::Running || index >= self.questions.len() {
            return false;
        }
        self.current_index = index;
        true
    }

    pub fn next(&mut self) -> bool {
        self.move_to_question(self.current_index + 1)
    }

    pub fn previous(&mut self) -> bool {
        match self.current_index.checked_sub(1) {
            Some(index) => self.move_to_question(index),
            None => false,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question at the current position (`None` for an empty test).
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// Questions in presented order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn settings(&self) -> &TestSettings {
        &self.settings
    }

    pub fn user_answers(&self) -> &BTreeMap<u64, Answer> {
        &self.user_answers
    }

    pub fn answer_for(&self, question_id: u64) -> Option<&Answer> {
        self.user_answers.get(&question_id)
    }

    /// Whether a non-empty answer is recorded for `question_id`.
    pub fn is_answered(&self, question_id: u64) -> bool {
        self.answer_for(question_id).is_some_and(Answer::is_answered)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    // -----------------------------------------------------------------------
    // Scoring and completion
    // -----------------------------------------------------------------------

    /// Count correctly answered questions. Recomputed on every call.
    pub fn calculate_score(&self) -> u32 {
        self.questions
            .iter()
            .filter(|q| q.is_answered_correctly(self.user_answers.get(&q.id)))
            .count() as u32
    }

    pub fn total(&self) -> u32 {
        self.questions.len() as u32
    }

    /// Finish the test and return its result record.
    ///
    /// Stops the countdown. Calling this again returns the same record.
    pub fn finish(&mut self) -> &ResultRecord {
        self.finish_with(FinishReason::Manual)
    }

    /// The result record, once finished.
    pub fn result(&self) -> Option<&ResultRecord> {
        self.result.as_ref()
    }

    fn finish_with(&mut self, reason: FinishReason) -> &ResultRecord {
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.cancel();
        }
        let record = match self.result.take() {
            Some(record) => record,
            None => self.build_result(reason),
        };
        self.state = SessionState::Finished;
        self.result.insert(record)
    }

    fn build_result(&self, reason: FinishReason) -> ResultRecord {
        let score = self.calculate_score();
        let total = self.total();
        let time_spent_secs = self
            .settings
            .time_limit_secs()
            .saturating_sub(self.remaining_secs);

        tracing::info!(score, total, time_spent_secs, ?reason, "test finished");

        ResultRecord {
            id: Uuid::new_v4(),
            questions: self.questions.clone(),
            user_answers: self.user_answers.clone(),
            score,
            total,
            time_spent_secs,
            started_at: self.started_at,
            finished_at: Utc::now(),
            finish_reason: reason,
        }
    }
}
