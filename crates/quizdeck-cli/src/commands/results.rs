//! The `quizdeck results` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, Table};

use quizdeck_core::config::QuizdeckConfig;
use quizdeck_core::report::ResultRecord;
use quizdeck_core::timer::format_time;
use quizdeck_report::html::write_html_report;

use super::open_session;

pub fn execute(config: &QuizdeckConfig, format: &str, output: Option<PathBuf>) -> Result<()> {
    let session = open_session(config)?;
    let record = session
        .load_results()
        .map_err(anyhow::Error::new)
        .context("no results to show, run `quizdeck start` and `quizdeck take` first")?;

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&record)?;
            emit(&json, output)?;
        }
        "markdown" | "md" => {
            emit(&record.to_markdown(), output)?;
        }
        "html" => {
            let path = output.unwrap_or_else(|| {
                config.output_dir.join(format!(
                    "results-{}.html",
                    record.finished_at.format("%Y-%m-%dT%H%M%S")
                ))
            });
            write_html_report(&record, &path)?;
            println!("HTML report: {}", path.display());
        }
        "text" => {
            let text = render_text(&record);
            emit(&text, output)?;
        }
        other => anyhow::bail!("unknown format '{other}' (expected text, json, markdown, html)"),
    }

    Ok(())
}

fn emit(content: &str, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, content)
                .with_context(|| format!("failed to write results to {}", path.display()))?;
            println!("Results saved to: {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}

fn render_text(record: &ResultRecord) -> String {
    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Your answer", "Correct answer", "Result"]);

    for row in record.outcomes() {
        let result = if row.correct {
            Cell::new("correct").fg(Color::Green)
        } else {
            Cell::new("wrong").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(row.number),
            Cell::new(&row.text),
            Cell::new(row.user_answer.as_deref().unwrap_or("No answer")),
            Cell::new(&row.correct_answer),
            result,
        ]);
    }

    format!(
        "{table}\n\nScore: {}/{} ({:.1}%)\nTime spent: {}",
        record.score,
        record.total,
        record.percentage(),
        format_time(record.time_spent_secs)
    )
}
