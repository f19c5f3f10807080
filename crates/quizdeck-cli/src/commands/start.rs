//! The `quizdeck start` command.

use std::path::PathBuf;

use anyhow::Result;

use quizdeck_core::config::QuizdeckConfig;
use quizdeck_core::parser;
use quizdeck_core::timer::format_time;

use super::open_session;

pub fn execute(
    config: &QuizdeckConfig,
    questions: Option<PathBuf>,
    time_limit: Option<u32>,
    shuffle_questions: bool,
    shuffle_answers: bool,
) -> Result<()> {
    let path = questions.unwrap_or_else(|| config.questions_path.clone());
    let bank = parser::parse_question_bank(&path)?;
    anyhow::ensure!(!bank.is_empty(), "question bank is empty: {}", path.display());

    for w in parser::validate_question_bank(&bank) {
        match w.question_id {
            Some(id) => eprintln!("Warning: [{id}] {}", w.message),
            None => eprintln!("Warning: {}", w.message),
        }
    }

    let mut settings = config.default_settings();
    if let Some(minutes) = time_limit {
        settings.time_limit_minutes = minutes;
    }
    settings.shuffle_questions |= shuffle_questions;
    settings.shuffle_answers |= shuffle_answers;

    let mut session = open_session(config)?;
    session.prepare(&settings, &bank)?;

    println!(
        "Test ready: {} questions, time limit {}.",
        bank.len(),
        format_time(settings.time_limit_secs())
    );
    println!("Run: quizdeck take");

    Ok(())
}
