//! HTML results page generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use quizdeck_core::report::{FinishReason, QuestionOutcome, ResultRecord};
use quizdeck_core::timer::format_time;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML results page from a result record.
pub fn generate_html(record: &ResultRecord) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>quizdeck results: {}/{}</title>\n",
        record.score, record.total
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Test results</h1>\n");
    let reason = match record.finish_reason {
        FinishReason::Manual => "submitted",
        FinishReason::TimeUp => "time ran out",
    };
    html.push_str(&format!(
        "<p class=\"meta\">{} questions | time spent {} | {} | {}</p>\n",
        record.total,
        format_time(record.time_spent_secs),
        reason,
        record.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str(&format!(
        "<p class=\"score\">Score: <strong id=\"total-score\">{}</strong> / {} ({:.1}%)</p>\n",
        record.score,
        record.total,
        record.percentage()
    ));
    html.push_str(&generate_score_bar(record.percentage()));
    html.push_str("</section>\n");

    // Per-question breakdown
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Answers</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">#</th><th onclick=\"sortTable(1)\">Question</th><th onclick=\"sortTable(2)\">Your answer</th><th onclick=\"sortTable(3)\">Correct answer</th><th onclick=\"sortTable(4)\">Points</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for row in record.outcomes() {
        html.push_str(&outcome_row(&row));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(record).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

fn outcome_row(row: &QuestionOutcome) -> String {
    let class = if row.correct { "correct" } else { "incorrect" };
    let answer_class = if row.correct {
        "correct-answer"
    } else {
        "wrong-answer"
    };
    let user_answer = match &row.user_answer {
        Some(_) if !row.selections.is_empty() => row
            .selections
            .iter()
            .map(|option| {
                let class = if option.correct {
                    "correct-answer"
                } else {
                    "wrong-answer"
                };
                format!(
                    "<span class=\"{class}\">{}</span>",
                    html_escape(&option.label)
                )
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(answer) => format!(
            "<span class=\"{answer_class}\">{}</span>",
            html_escape(answer)
        ),
        None => "<span class=\"wrong-answer\">No answer</span>".to_string(),
    };

    format!(
        "<tr class=\"{class}\"><td>{}</td><td>{}</td><td>{}</td><td><span class=\"correct-answer\">{}</span></td><td>{}</td></tr>\n",
        row.number,
        html_escape(&row.text),
        user_answer,
        html_escape(&row.correct_answer),
        u8::from(row.correct)
    )
}

/// Write an HTML results page to a file.
pub fn write_html_report(record: &ResultRecord, path: &Path) -> Result<()> {
    let html = generate_html(record);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML results to {}", path.display()))?;
    Ok(())
}

fn generate_score_bar(percentage: f64) -> String {
    let bar_height = 30;
    let max_width = 400;

    let width = (percentage / 100.0 * max_width as f64).clamp(0.0, max_width as f64) as usize;
    let color = if percentage >= 80.0 {
        "#22c55e"
    } else if percentage >= 50.0 {
        "#eab308"
    } else {
        "#ef4444"
    };

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        max_width + 60,
        bar_height
    );
    svg.push_str(&format!(
        "  <rect x=\"0\" y=\"0\" width=\"{max_width}\" height=\"{bar_height}\" fill=\"var(--border)\" rx=\"4\"/>\n"
    ));
    svg.push_str(&format!(
        "  <rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{bar_height}\" fill=\"{color}\" rx=\"4\"/>\n"
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}%</text>\n",
        max_width + 8,
        bar_height / 2,
        percentage
    ));
    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.score { font-size: 1.25rem; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
tr.correct { background: var(--pass); }
tr.incorrect { background: var(--fail); }
.correct-answer { font-weight: 600; }
.wrong-answer { text-decoration: line-through; opacity: 0.8; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb, undefined, {numeric: true}) : vb.localeCompare(va, undefined, {numeric: true});
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use quizdeck_core::model::{Answer, AnswerOption, Question, QuestionKind};
    use std::collections::BTreeMap;

    fn make_test_record() -> ResultRecord {
        let questions = vec![
            Question {
                id: 1,
                text: "Is <b>bold</b> & safe?".into(),
                kind: QuestionKind::Single,
                answers: vec![
                    AnswerOption::new("y", "Yes", true),
                    AnswerOption::new("n", "No <script>", false),
                ],
                correct_answer: None,
            },
            Question {
                id: 2,
                text: "Capital of France?".into(),
                kind: QuestionKind::Text,
                answers: vec![],
                correct_answer: Some("Paris".into()),
            },
        ];
        let mut user_answers = BTreeMap::new();
        user_answers.insert(1, Answer::single("n"));

        ResultRecord {
            id: uuid::Uuid::nil(),
            questions,
            user_answers,
            score: 0,
            total: 2,
            time_spent_secs: 95,
            started_at: chrono::Utc::now(),
            finished_at: chrono::Utc::now(),
            finish_reason: FinishReason::TimeUp,
        }
    }

    #[test]
    fn html_report_contains_required_elements() {
        let html = generate_html(&make_test_record());

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Capital of France?"));
        assert!(html.contains("Paris"));
        assert!(html.contains("No answer"));
        assert!(html.contains("1:35"));
        assert!(html.contains("time ran out"));
        assert!(html.contains("class=\"incorrect\""));
    }

    #[test]
    fn html_report_escapes_user_text() {
        let html = generate_html(&make_test_record());

        assert!(html.contains("Is &lt;b&gt;bold&lt;/b&gt; &amp; safe?"));
        assert!(html.contains("No &lt;script&gt;"));
        assert!(!html.contains("No <script>"));
    }

    #[test]
    fn html_report_marks_correct_rows() {
        let mut record = make_test_record();
        record.user_answers.insert(1, Answer::single("y"));
        record.score = 1;
        let html = generate_html(&record);

        assert!(html.contains("<tr class=\"correct\">"));
        assert!(html.contains("50.0%"));
    }

    #[test]
    fn html_report_marks_each_selected_option() {
        let mut record = make_test_record();
        record.questions.push(Question {
            id: 3,
            text: "Primes?".into(),
            kind: QuestionKind::Multiple,
            answers: vec![
                AnswerOption::new("x", "2", true),
                AnswerOption::new("z", "4 & up", false),
            ],
            correct_answer: None,
        });
        record.user_answers.insert(3, Answer::multiple(["x", "z"]));
        record.total = 3;
        let html = generate_html(&record);

        assert!(html.contains(concat!(
            "<span class=\"correct-answer\">2</span>, ",
            "<span class=\"wrong-answer\">4 &amp; up</span>"
        )));
    }

    #[test]
    fn html_report_write_to_file() {
        let record = make_test_record();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/results.html");

        write_html_report(&record, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
