//! Question bank parser.
//!
//! Loads question banks from JSON or TOML files and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::model::{Question, QuestionKind};

/// On-disk format of a question bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankFormat {
    Json,
    Toml,
}

impl BankFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(BankFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(BankFormat::Toml),
            _ => anyhow::bail!(
                "unsupported question bank format (expected .json or .toml): {}",
                path.display()
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TomlBankFile {
    #[serde(default)]
    questions: Vec<Question>,
}

/// Parse a question bank file.
pub fn parse_question_bank(path: &Path) -> Result<Vec<Question>> {
    let format = BankFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_question_bank_str(&content, format)
        .with_context(|| format!("failed to parse question bank: {}", path.display()))
}

/// Parse question bank content (useful for testing).
///
/// JSON banks are either `{"questions": [...]}` or a bare array; TOML banks
/// use `[[questions]]` tables.
pub fn parse_question_bank_str(content: &str, format: BankFormat) -> Result<Vec<Question>> {
    match format {
        BankFormat::Json => {
            let value: Value = serde_json::from_str(content).context("invalid JSON")?;
            let questions = match value {
                Value::Array(items) => Value::Array(items),
                Value::Object(mut map) => map
                    .remove("questions")
                    .ok_or_else(|| anyhow::anyhow!("missing `questions` array"))?,
                _ => anyhow::bail!("expected an object with `questions` or an array"),
            };
            serde_json::from_value(questions).context("invalid question record")
        }
        BankFormat::Toml => {
            let parsed: TomlBankFile = toml::from_str(content).context("invalid TOML")?;
            Ok(parsed.questions)
        }
    }
}

/// A warning from question bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<u64>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn for_question(id: u64, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id),
            message: message.into(),
        }
    }
}

/// Validate a question bank for common data problems.
///
/// None of these stop a test from running; they point at questions that
/// can never be answered correctly or would confuse the answer sheet.
pub fn validate_question_bank(questions: &[Question]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "question bank is empty".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for q in questions {
        if !seen_ids.insert(q.id) {
            warnings.push(ValidationWarning::for_question(
                q.id,
                format!("duplicate question ID: {}", q.id),
            ));
        }
    }

    for q in questions {
        if q.text.trim().is_empty() {
            warnings.push(ValidationWarning::for_question(q.id, "question text is empty"));
        }

        let correct = q.answers.iter().filter(|a| a.correct).count();
        match q.kind {
            QuestionKind::Single | QuestionKind::Dropdown => {
                if correct != 1 {
                    warnings.push(ValidationWarning::for_question(
                        q.id,
                        format!(
                            "{} question should have exactly one correct option, found {correct}",
                            q.kind
                        ),
                    ));
                }
            }
            QuestionKind::Multiple => {
                if q.answers.is_empty() {
                    warnings.push(ValidationWarning::for_question(
                        q.id,
                        "multiple question has no options",
                    ));
                }
            }
            QuestionKind::Text => {
                if q
                    .correct_answer
                    .as_deref()
                    .map_or(true, |a| a.trim().is_empty())
                {
                    warnings.push(ValidationWarning::for_question(
                        q.id,
                        "text question has no correctAnswer",
                    ));
                }
            }
            QuestionKind::Unknown => {
                warnings.push(ValidationWarning::for_question(
                    q.id,
                    "unknown question type, it will never score",
                ));
            }
        }

        let mut option_ids = HashSet::new();
        for option in &q.answers {
            if !option_ids.insert(option.id.as_str()) {
                warnings.push(ValidationWarning::for_question(
                    q.id,
                    format!("duplicate option ID: {}", option.id),
                ));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_JSON: &str = r#"{
  "questions": [
    {
      "id": 1,
      "text": "Which planet is known as the Red Planet?",
      "type": "single",
      "answers": [
        {"id": "a", "text": "Venus"},
        {"id": "b", "text": "Mars", "correct": true}
      ]
    },
    {
      "id": 2,
      "text": "Capital of France?",
      "type": "text",
      "correctAnswer": "Paris"
    }
  ]
}"#;

    const VALID_TOML: &str = r#"
[[questions]]
id = 1
text = "Which of these are prime?"
type = "multiple"

[[questions.answers]]
id = "x"
text = "2"
correct = true

[[questions.answers]]
id = "y"
text = "4"

[[questions]]
id = 2
text = "Capital of France?"
type = "text"
correctAnswer = "Paris"
"#;

    #[test]
    fn parse_json_bank() {
        let questions = parse_question_bank_str(VALID_JSON, BankFormat::Json).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].kind, QuestionKind::Single);
        assert_eq!(questions[0].correct_answer_text(), "Mars");
        assert_eq!(questions[1].correct_answer.as_deref(), Some("Paris"));
        assert!(validate_question_bank(&questions).is_empty());
    }

    #[test]
    fn parse_bare_json_array() {
        let json = r#"[{"id": 5, "text": "t", "type": "text", "correctAnswer": "x"}]"#;
        let questions = parse_question_bank_str(json, BankFormat::Json).unwrap();
        assert_eq!(questions[0].id, 5);
    }

    #[test]
    fn parse_toml_bank() {
        let questions = parse_question_bank_str(VALID_TOML, BankFormat::Toml).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].kind, QuestionKind::Multiple);
        assert_eq!(questions[0].answers.len(), 2);
        assert!(questions[0].answers[0].correct);
        assert!(!questions[0].answers[1].correct);
        assert!(validate_question_bank(&questions).is_empty());
    }

    #[test]
    fn parse_malformed_json() {
        assert!(parse_question_bank_str("{not json", BankFormat::Json).is_err());
        assert!(parse_question_bank_str(r#"{"items": []}"#, BankFormat::Json).is_err());
        assert!(parse_question_bank_str("42", BankFormat::Json).is_err());
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            BankFormat::from_path(&PathBuf::from("bank.JSON")).unwrap(),
            BankFormat::Json
        );
        assert_eq!(
            BankFormat::from_path(&PathBuf::from("bank.toml")).unwrap(),
            BankFormat::Toml
        );
        assert!(BankFormat::from_path(&PathBuf::from("bank.yaml")).is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");
        std::fs::write(&path, VALID_JSON).unwrap();

        let questions = parse_question_bank(&path).unwrap();
        assert_eq!(questions.len(), 2);
    }

    #[test]
    fn missing_file_error_names_path() {
        let err = parse_question_bank(&PathBuf::from("no/such/bank.json")).unwrap_err();
        assert!(format!("{err:#}").contains("no/such/bank.json"));
    }

    #[test]
    fn validate_flags_data_problems() {
        let json = r#"[
            {"id": 1, "text": "no correct", "type": "single",
             "answers": [{"id": "a", "text": "A"}]},
            {"id": 1, "text": "dupe", "type": "dropdown", "answers": [
                {"id": "a", "text": "A", "correct": true},
                {"id": "a", "text": "B", "correct": true}
            ]},
            {"id": 2, "text": "", "type": "text"},
            {"id": 3, "text": "empty", "type": "multiple"},
            {"id": 4, "text": "matrix", "type": "matrix"}
        ]"#;
        let questions = parse_question_bank_str(json, BankFormat::Json).unwrap();
        let warnings = validate_question_bank(&questions);
        let has = |needle: &str| warnings.iter().any(|w| w.message.contains(needle));

        assert!(has("duplicate question ID: 1"));
        assert!(has("exactly one correct option, found 0"));
        assert!(has("exactly one correct option, found 2"));
        assert!(has("duplicate option ID: a"));
        assert!(has("question text is empty"));
        assert!(has("no correctAnswer"));
        assert!(has("has no options"));
        assert!(has("unknown question type"));
    }

    #[test]
    fn validate_empty_bank() {
        let warnings = validate_question_bank(&[]);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].question_id.is_none());
    }
}
