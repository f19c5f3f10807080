//! Core data model types for quizdeck.
//!
//! These are the question, answer, and settings types that the engine, the
//! session store, and the question bank loader all share. Field names follow
//! the camelCase JSON shape of question banks and stored session records.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

/// One selectable choice of a single, multiple, or dropdown question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Option identifier, unique within its question.
    pub id: String,
    /// Text shown to the test taker.
    pub text: String,
    /// Whether choosing this option is (part of) the correct answer.
    #[serde(default)]
    pub correct: bool,
}

impl AnswerOption {
    pub fn new(id: impl Into<String>, text: impl Into<String>, correct: bool) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            correct,
        }
    }
}

/// Input modality of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Single,
    Multiple,
    Text,
    Dropdown,
    /// Any type string this build does not recognise.
    #[serde(other)]
    Unknown,
}

impl QuestionKind {
    /// Kinds whose answer options are permuted when answer shuffling is on.
    pub fn is_shuffle_eligible(self) -> bool {
        matches!(
            self,
            QuestionKind::Single | QuestionKind::Multiple | QuestionKind::Dropdown
        )
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Single => write!(f, "single"),
            QuestionKind::Multiple => write!(f, "multiple"),
            QuestionKind::Text => write!(f, "text"),
            QuestionKind::Dropdown => write!(f, "dropdown"),
            QuestionKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// A single test question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Identifier, unique within a test session.
    pub id: u64,
    /// Question prompt.
    pub text: String,
    /// Input modality.
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// Answer options in display order. Unused for text questions.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub answers: Vec<AnswerOption>,
    /// Expected free-text answer. Only used for text questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<AnswerOption>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<AnswerOption>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Question {
    /// The first option marked correct, if any.
    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.answers.iter().find(|a| a.correct)
    }

    /// Check a user answer against this question's answer model.
    ///
    /// Malformed answers (a list for a single-choice question, a string for
    /// a multiple-choice one) evaluate to `false` rather than erroring.
    pub fn check_answer(&self, answer: &Answer) -> bool {
        match self.kind {
            QuestionKind::Single | QuestionKind::Dropdown => {
                let Some(given) = answer.as_text() else {
                    return false;
                };
                match self.correct_option() {
                    Some(correct) => correct.id == given,
                    None => false,
                }
            }
            QuestionKind::Multiple => {
                let Some(given) = answer.as_ids() else {
                    return false;
                };
                let mut expected: Vec<&str> = self
                    .answers
                    .iter()
                    .filter(|a| a.correct)
                    .map(|a| a.id.as_str())
                    .collect();
                let mut given: Vec<&str> = given.iter().map(String::as_str).collect();
                expected.sort_unstable();
                given.sort_unstable();
                expected == given
            }
            QuestionKind::Text => {
                let Some(given) = answer.as_text() else {
                    return false;
                };
                let Some(expected) = self.correct_answer.as_deref() else {
                    return false;
                };
                given.trim().to_lowercase() == expected.to_lowercase()
            }
            QuestionKind::Unknown => false,
        }
    }

    /// Whether `answer` is present, non-empty, and correct. This is the
    /// per-question scoring rule.
    pub fn is_answered_correctly(&self, answer: Option<&Answer>) -> bool {
        answer.is_some_and(|a| a.is_answered() && self.check_answer(a))
    }

    /// Human-readable correct answer for results views.
    pub fn correct_answer_text(&self) -> String {
        match self.kind {
            QuestionKind::Single | QuestionKind::Dropdown => self
                .correct_option()
                .map(|a| a.text.clone())
                .unwrap_or_default(),
            QuestionKind::Multiple => self
                .answers
                .iter()
                .filter(|a| a.correct)
                .map(|a| a.text.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            QuestionKind::Text => self.correct_answer.clone().unwrap_or_default(),
            QuestionKind::Unknown => String::new(),
        }
    }

    /// Human-readable rendering of a user answer. Option ids are replaced by
    /// their text; ids that match no option are shown as given.
    pub fn answer_label(&self, answer: &Answer) -> String {
        match (self.kind, answer) {
            (QuestionKind::Multiple, Answer::Multiple(ids)) => ids
                .iter()
                .map(|id| self.option_label(id))
                .collect::<Vec<_>>()
                .join(", "),
            (QuestionKind::Single | QuestionKind::Dropdown, _) => match answer.as_text() {
                Some(id) => self.option_label(id),
                None => answer.to_string(),
            },
            _ => answer.to_string(),
        }
    }

    fn option_label(&self, id: &str) -> String {
        self.answers
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.text.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Permute the answer options in place with a fair (Fisher–Yates)
    /// shuffle. Text and unknown questions are left untouched.
    pub fn shuffle_answers<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.kind.is_shuffle_eligible() {
            self.answers.shuffle(rng);
        }
    }
}

/// A user's answer to one question.
///
/// Serialized untagged: a JSON string or an array of strings. A string read
/// back from storage always comes back as [`Answer::Single`]; the owning
/// question's kind decides how it is interpreted, so that is harmless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Selected option ids (multiple choice).
    Multiple(Vec<String>),
    /// Selected option id (single choice or dropdown).
    Single(String),
    /// Free text as typed.
    Text(String),
}

impl Answer {
    pub fn single(id: impl Into<String>) -> Self {
        Answer::Single(id.into())
    }

    pub fn multiple<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Answer::Multiple(ids.into_iter().map(Into::into).collect())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Answer::Text(text.into())
    }

    /// Build an answer from raw user input for a question of `kind`.
    ///
    /// Multiple-choice input is a comma-separated list of option ids. Free
    /// text is kept verbatim; option ids are trimmed.
    pub fn from_input(kind: QuestionKind, input: &str) -> Self {
        match kind {
            QuestionKind::Multiple => Answer::Multiple(
                input
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            QuestionKind::Text => Answer::Text(input.to_string()),
            _ => Answer::Single(input.trim().to_string()),
        }
    }

    /// The string value of a single or text answer.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Single(s) | Answer::Text(s) => Some(s),
            Answer::Multiple(_) => None,
        }
    }

    /// The id list of a multiple-choice answer.
    pub fn as_ids(&self) -> Option<&[String]> {
        match self {
            Answer::Multiple(ids) => Some(ids),
            _ => None,
        }
    }

    /// An empty string or empty list counts as unanswered.
    pub fn is_answered(&self) -> bool {
        match self {
            Answer::Single(s) | Answer::Text(s) => !s.is_empty(),
            Answer::Multiple(ids) => !ids.is_empty(),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Single(s) | Answer::Text(s) => write!(f, "{s}"),
            Answer::Multiple(ids) => write!(f, "{}", ids.join(", ")),
        }
    }
}

/// Settings chosen before a test starts. Immutable once the session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSettings {
    /// Time limit in whole minutes. Anything non-numeric reads as 0.
    #[serde(
        rename = "timeLimit",
        alias = "timeLimitMinutes",
        default,
        deserialize_with = "lenient_minutes"
    )]
    pub time_limit_minutes: u32,
    /// Present questions in random order.
    #[serde(default)]
    pub shuffle_questions: bool,
    /// Present each choice question's options in random order.
    #[serde(default)]
    pub shuffle_answers: bool,
}

impl TestSettings {
    pub fn time_limit_secs(&self) -> u64 {
        u64::from(self.time_limit_minutes) * 60
    }
}

/// Accept a number, a numeric string (leading digits only), or anything else
/// as zero.
fn lenient_minutes<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    let minutes = match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|m| m.is_finite() && *m >= 0.0)
                    .map(|m| m as u64)
            })
            .unwrap_or(0),
        Value::String(s) => {
            let digits: String = s.trim().chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        }
        _ => 0,
    };
    Ok(u32::try_from(minutes).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn single() -> Question {
        Question {
            id: 1,
            text: "Pick b".into(),
            kind: QuestionKind::Single,
            answers: vec![
                AnswerOption::new("a", "Alpha", false),
                AnswerOption::new("b", "Bravo", true),
                AnswerOption::new("c", "Charlie", false),
            ],
            correct_answer: None,
        }
    }

    fn multiple() -> Question {
        Question {
            id: 2,
            text: "Pick a and c".into(),
            kind: QuestionKind::Multiple,
            answers: vec![
                AnswerOption::new("a", "Alpha", true),
                AnswerOption::new("b", "Bravo", false),
                AnswerOption::new("c", "Charlie", true),
            ],
            correct_answer: None,
        }
    }

    fn text() -> Question {
        Question {
            id: 3,
            text: "Capital of France?".into(),
            kind: QuestionKind::Text,
            answers: vec![],
            correct_answer: Some("Paris".into()),
        }
    }

    #[test]
    fn single_matches_correct_id_only() {
        let q = single();
        assert!(q.check_answer(&Answer::single("b")));
        assert!(!q.check_answer(&Answer::single("a")));
        assert!(!q.check_answer(&Answer::multiple(["b"])));
    }

    #[test]
    fn single_without_correct_option_is_unmatchable() {
        let mut q = single();
        for option in &mut q.answers {
            option.correct = false;
        }
        assert!(!q.check_answer(&Answer::single("b")));
        assert_eq!(q.correct_answer_text(), "");
    }

    #[test]
    fn dropdown_behaves_like_single() {
        let mut q = single();
        q.kind = QuestionKind::Dropdown;
        assert!(q.check_answer(&Answer::single("b")));
        assert_eq!(q.correct_answer_text(), "Bravo");
    }

    #[test]
    fn multiple_is_order_insensitive() {
        let q = multiple();
        assert!(q.check_answer(&Answer::multiple(["c", "a"])));
        assert!(q.check_answer(&Answer::multiple(["a", "c"])));
        assert!(!q.check_answer(&Answer::multiple(["a"])));
        assert!(!q.check_answer(&Answer::multiple(["a", "b", "c"])));
    }

    #[test]
    fn multiple_ignores_storage_order() {
        let mut q = multiple();
        q.answers.reverse();
        assert!(q.check_answer(&Answer::multiple(["a", "c"])));
    }

    #[test]
    fn multiple_rejects_string_answer() {
        assert!(!multiple().check_answer(&Answer::single("a")));
    }

    #[test]
    fn text_trims_and_ignores_case() {
        let q = text();
        assert!(q.check_answer(&Answer::text("  Paris ")));
        assert!(q.check_answer(&Answer::text("paris")));
        assert!(q.check_answer(&Answer::single("PARIS")));
        assert!(!q.check_answer(&Answer::text("Pa ris")));
        assert!(!q.check_answer(&Answer::multiple(["paris"])));
    }

    #[test]
    fn text_without_expected_answer_never_matches() {
        let mut q = text();
        q.correct_answer = None;
        assert!(!q.check_answer(&Answer::text("Paris")));
        assert_eq!(q.correct_answer_text(), "");
    }

    #[test]
    fn check_answer_is_deterministic() {
        let q = multiple();
        let answer = Answer::multiple(["c", "a"]);
        assert_eq!(q.check_answer(&answer), q.check_answer(&answer));
    }

    #[test]
    fn unknown_kind_is_never_correct() {
        let mut q = single();
        q.kind = QuestionKind::Unknown;
        assert!(!q.check_answer(&Answer::single("b")));
        assert_eq!(q.correct_answer_text(), "");
    }

    #[test]
    fn empty_answers_are_not_scored() {
        let mut q = text();
        q.correct_answer = Some(String::new());
        assert!(q.check_answer(&Answer::text("")));
        assert!(!q.is_answered_correctly(Some(&Answer::text(""))));
        assert!(!q.is_answered_correctly(None));

        let mut m = multiple();
        for option in &mut m.answers {
            option.correct = false;
        }
        assert!(m.check_answer(&Answer::Multiple(vec![])));
        assert!(!m.is_answered_correctly(Some(&Answer::Multiple(vec![]))));
    }

    #[test]
    fn correct_answer_text_per_kind() {
        assert_eq!(single().correct_answer_text(), "Bravo");
        assert_eq!(multiple().correct_answer_text(), "Alpha, Charlie");
        assert_eq!(text().correct_answer_text(), "Paris");
    }

    #[test]
    fn answer_labels_use_option_text() {
        assert_eq!(single().answer_label(&Answer::single("a")), "Alpha");
        assert_eq!(single().answer_label(&Answer::single("zz")), "zz");
        assert_eq!(
            multiple().answer_label(&Answer::multiple(["c", "b"])),
            "Charlie, Bravo"
        );
        assert_eq!(text().answer_label(&Answer::text(" paris")), " paris");
    }

    #[test]
    fn shuffle_answers_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut q = multiple();
        q.answers.extend((0..20).map(|i| AnswerOption::new(format!("o{i}"), "", false)));
        let mut before: Vec<String> = q.answers.iter().map(|a| a.id.clone()).collect();
        q.shuffle_answers(&mut rng);
        let mut after: Vec<String> = q.answers.iter().map(|a| a.id.clone()).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn shuffle_skips_text_questions() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut q = text();
        q.answers = (0..10)
            .map(|i| AnswerOption::new(i.to_string(), "", false))
            .collect();
        let before = q.answers.clone();
        q.shuffle_answers(&mut rng);
        assert_eq!(q.answers, before);
    }

    #[test]
    fn answer_from_input() {
        assert_eq!(
            Answer::from_input(QuestionKind::Multiple, "y, x,,"),
            Answer::multiple(["y", "x"])
        );
        assert_eq!(
            Answer::from_input(QuestionKind::Single, " b "),
            Answer::single("b")
        );
        assert_eq!(
            Answer::from_input(QuestionKind::Text, " Paris "),
            Answer::text(" Paris ")
        );
    }

    #[test]
    fn question_json_shape() {
        let json = r#"{
            "id": 7,
            "text": "Pick one",
            "type": "dropdown",
            "answers": [{"id": "a", "text": "A", "correct": true}, {"id": "b", "text": "B"}]
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.kind, QuestionKind::Dropdown);
        assert!(q.answers[0].correct);
        assert!(!q.answers[1].correct);
        assert!(q.correct_answer.is_none());

        let text: Question = serde_json::from_str(
            r#"{"id": 8, "text": "t", "type": "text", "answers": null, "correctAnswer": "42"}"#,
        )
        .unwrap();
        assert!(text.answers.is_empty());
        assert_eq!(text.correct_answer.as_deref(), Some("42"));
    }

    #[test]
    fn unrecognised_type_reads_as_unknown() {
        let q: Question =
            serde_json::from_str(r#"{"id": 1, "text": "t", "type": "matrix"}"#).unwrap();
        assert_eq!(q.kind, QuestionKind::Unknown);
    }

    #[test]
    fn settings_time_limit_is_lenient() {
        let s: TestSettings =
            serde_json::from_str(r#"{"timeLimit": 5, "shuffleQuestions": true}"#).unwrap();
        assert_eq!(s.time_limit_minutes, 5);
        assert!(s.shuffle_questions);
        assert!(!s.shuffle_answers);

        let s: TestSettings = serde_json::from_str(r#"{"timeLimit": "12min"}"#).unwrap();
        assert_eq!(s.time_limit_minutes, 12);

        let s: TestSettings = serde_json::from_str(r#"{"timeLimit": "soon"}"#).unwrap();
        assert_eq!(s.time_limit_minutes, 0);

        let s: TestSettings = serde_json::from_str(r#"{"timeLimit": null}"#).unwrap();
        assert_eq!(s.time_limit_minutes, 0);

        let s: TestSettings = serde_json::from_str(r#"{"timeLimitMinutes": 2}"#).unwrap();
        assert_eq!(s.time_limit_secs(), 120);
    }

    #[test]
    fn answers_read_back_untagged() {
        let a: Answer = serde_json::from_str(r#"["x","y"]"#).unwrap();
        assert_eq!(a, Answer::multiple(["x", "y"]));
        let a: Answer = serde_json::from_str(r#""b""#).unwrap();
        assert_eq!(a.as_text(), Some("b"));
    }
}
