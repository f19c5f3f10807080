//! Result records with JSON persistence and per-question breakdowns.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Answer, Question, QuestionKind};

/// Why a test attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FinishReason {
    /// The test taker submitted.
    #[default]
    Manual,
    /// The countdown reached zero.
    TimeUp,
}

/// The final, immutable outcome of one test attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    /// Unique record identifier.
    #[serde(default)]
    pub id: Uuid,
    /// Questions in the order they were presented.
    pub questions: Vec<Question>,
    /// Answers keyed by question id.
    #[serde(default)]
    pub user_answers: BTreeMap<u64, Answer>,
    /// Number of correctly answered questions.
    pub score: u32,
    /// Number of questions.
    pub total: u32,
    /// Seconds of the time limit that were used.
    #[serde(rename = "timeSpent", alias = "timeSpentSeconds", default)]
    pub time_spent_secs: u64,
    #[serde(default)]
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: DateTime<Utc>,
    #[serde(default)]
    pub finish_reason: FinishReason,
}

/// One row of a results breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    /// 1-based position as presented.
    pub number: usize,
    pub question_id: u64,
    pub text: String,
    /// Rendered user answer; `None` when unanswered.
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub correct: bool,
    /// Each selected option of a multiple-choice answer, in the order given.
    /// Empty for other question kinds.
    #[serde(default)]
    pub selections: Vec<SelectedOption>,
}

/// One option picked in a multiple-choice answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option text, or the raw id when no option matches.
    pub label: String,
    /// Whether the option is marked correct.
    pub correct: bool,
}

fn selected_options(question: &Question, answer: Option<&Answer>) -> Vec<SelectedOption> {
    let (QuestionKind::Multiple, Some(Answer::Multiple(ids))) = (question.kind, answer) else {
        return Vec::new();
    };
    ids.iter()
        .map(|id| match question.answers.iter().find(|a| a.id == *id) {
            Some(option) => SelectedOption {
                label: option.text.clone(),
                correct: option.correct,
            },
            None => SelectedOption {
                label: id.clone(),
                correct: false,
            },
        })
        .collect()
}

impl ResultRecord {
    /// Per-question breakdown in presented order.
    pub fn outcomes(&self) -> Vec<QuestionOutcome> {
        self.questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let answer = self
                    .user_answers
                    .get(&question.id)
                    .filter(|a| a.is_answered());
                QuestionOutcome {
                    number: index + 1,
                    question_id: question.id,
                    text: question.text.clone(),
                    user_answer: answer.map(|a| question.answer_label(a)),
                    correct_answer: question.correct_answer_text(),
                    correct: question.is_answered_correctly(answer),
                    selections: selected_options(question, answer),
                }
            })
            .collect()
    }

    /// Score as a percentage of the total (0 for an empty test).
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.score) / f64::from(self.total) * 100.0
        }
    }

    /// Save the record as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize results")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
        Ok(())
    }

    /// Load a record from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read results from {}", path.display()))?;
        let record: ResultRecord =
            serde_json::from_str(&content).context("failed to parse results JSON")?;
        Ok(record)
    }

    /// Format the breakdown as a markdown table.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Score:** {}/{} ({:.1}%) in {}\n\n",
            self.score,
            self.total,
            self.percentage(),
            crate::timer::format_time(self.time_spent_secs)
        ));

        md.push_str("| # | Question | Your answer | Correct answer | Points |\n");
        md.push_str("|---|----------|-------------|----------------|--------|\n");
        for row in self.outcomes() {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                row.number,
                escape_cell(&row.text),
                escape_cell(row.user_answer.as_deref().unwrap_or("No answer")),
                escape_cell(&row.correct_answer),
                u8::from(row.correct)
            ));
        }

        md
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}
