//! The `quizdeck validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizdeck_core::config::QuizdeckConfig;
use quizdeck_core::parser;

pub fn execute(config: &QuizdeckConfig, questions: Option<PathBuf>) -> Result<()> {
    let path = questions.unwrap_or_else(|| config.questions_path.clone());
    let bank = parser::parse_question_bank(&path)?;

    println!("Question bank: {} ({} questions)", path.display(), bank.len());

    let warnings = parser::validate_question_bank(&bank);
    for w in &warnings {
        let prefix = w
            .question_id
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Question bank valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
