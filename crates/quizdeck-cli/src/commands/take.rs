//! The `quizdeck take` command.
//!
//! Runs one test session over stdin. Input lines and countdown ticks are
//! consumed by a single loop, so every engine mutation happens in arrival
//! order on this task.

use std::io::BufRead;

use anyhow::Result;
use tokio::sync::mpsc;

use quizdeck_core::config::QuizdeckConfig;
use quizdeck_core::engine::{TestEngine, TickOutcome, TimerObserver};
use quizdeck_core::model::{Answer, Question, QuestionKind};
use quizdeck_core::report::FinishReason;
use quizdeck_core::timer::{format_time, Ticks};

use super::open_session;

/// Prints the remaining time on whole minutes and during the last ten seconds.
struct ConsoleObserver;

impl TimerObserver for ConsoleObserver {
    fn on_tick(&mut self, formatted: &str) {
        if formatted.ends_with(":00") || formatted.starts_with("0:0") {
            println!("  [{formatted} remaining]");
        }
    }

    fn on_time_up(&mut self) {
        println!("\nTime is up!");
    }
}

/// What the input loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Finish,
}

pub async fn execute(config: &QuizdeckConfig) -> Result<()> {
    let mut session = open_session(config)?;
    let mut engine = session.begin().map_err(|e| {
        let hint = if e.requires_restart() {
            "cannot take the test (run `quizdeck start`)"
        } else {
            "cannot take the test"
        };
        anyhow::Error::new(e).context(hint)
    })?;

    let order = if engine.settings().shuffle_questions {
        "shuffled"
    } else {
        "in order"
    };
    println!(
        "{} questions ({order}), {} on the clock. Type `help` for commands.\n",
        engine.total(),
        engine.formatted_time()
    );
    print_question(&engine);

    let mut input = spawn_stdin_reader();
    let mut ticks = engine.start_timer();
    let mut observer = ConsoleObserver;

    loop {
        tokio::select! {
            line = input.recv() => {
                let Some(line) = line else {
                    tracing::debug!("end of input, finishing test");
                    break;
                };
                if handle_command(&mut engine, &line) == Flow::Finish {
                    break;
                }
            }
            _ = next_tick(&mut ticks) => {
                if engine.tick(&mut observer) == TickOutcome::TimeUp {
                    break;
                }
            }
        }
    }

    let record = session.complete(&mut engine)?;

    let reason = match record.finish_reason {
        FinishReason::Manual => "submitted",
        FinishReason::TimeUp => "time ran out",
    };
    println!(
        "\nTest finished ({reason}). Score: {}/{} ({:.1}%) in {}",
        record.score,
        record.total,
        record.percentage(),
        format_time(record.time_spent_secs)
    );
    println!("Run: quizdeck results");

    Ok(())
}

/// Read stdin lines on a plain thread. A blocking read cannot be cancelled,
/// so it must stay off the runtime or shutdown would wait for it.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Wait for the next countdown tick. Pends forever without a countdown.
async fn next_tick(ticks: &mut Option<Ticks>) {
    if let Some(rx) = ticks {
        if rx.recv().await.is_some() {
            return;
        }
        *ticks = None;
    }
    std::future::pending::<()>().await
}

fn handle_command(engine: &mut TestEngine, line: &str) -> Flow {
    let line = line.trim_start();
    let (command, arg) = match line.split_once(' ') {
        Some((command, arg)) => (command, arg),
        None => (line.trim_end(), ""),
    };

    match command {
        "" => {}
        "next" | "n" => {
            if engine.next() {
                print_question(engine);
            } else {
                println!("Already at the last question. Type `finish` to submit.");
            }
        }
        "prev" | "p" => {
            if engine.previous() {
                print_question(engine);
            } else {
                println!("Already at the first question.");
            }
        }
        "goto" | "g" => match arg.trim().parse::<usize>() {
            Ok(n) if n >= 1 && engine.move_to_question(n - 1) => print_question(engine),
            _ => println!("No question {}. Pick 1-{}.", arg.trim(), engine.total()),
        },
        "answer" | "a" => answer_current(engine, arg),
        "clear" => {
            if let Some(id) = engine.current_question().map(|q| q.id) {
                engine.clear_answer(id);
                println!("Answer cleared.");
            }
        }
        "show" => print_question(engine),
        "list" => print_list(engine),
        "time" => println!("{} remaining", engine.formatted_time()),
        "finish" | "submit" => return Flow::Finish,
        "help" | "?" => print_help(),
        other => println!("Unknown command `{other}`. Type `help` for commands."),
    }

    Flow::Continue
}

fn answer_current(engine: &mut TestEngine, input: &str) {
    let Some(question) = engine.current_question() else {
        return;
    };
    let answer = Answer::from_input(question.kind, input);

    if !answer.is_answered() {
        println!("Usage: answer <value>");
        return;
    }
    if let Some(unknown) = unknown_option(question, &answer) {
        println!("No option `{unknown}` for this question.");
        return;
    }

    let id = question.id;
    let label = question.answer_label(&answer);
    engine.save_answer(id, answer);
    println!("Saved: {label}");
}

/// The first selected option id that the question does not offer.
fn unknown_option<'a>(question: &Question, answer: &'a Answer) -> Option<&'a str> {
    if question.kind == QuestionKind::Text || question.kind == QuestionKind::Unknown {
        return None;
    }
    let selected: Vec<&str> = match answer {
        Answer::Multiple(ids) => ids.iter().map(String::as_str).collect(),
        Answer::Single(id) | Answer::Text(id) => vec![id.as_str()],
    };
    selected
        .into_iter()
        .find(|id| !question.answers.iter().any(|a| a.id == *id))
}

fn print_question(engine: &TestEngine) {
    let Some(question) = engine.current_question() else {
        println!("This test has no questions. Type `finish` to submit.");
        return;
    };

    println!(
        "Question {}/{} [{}]",
        engine.current_index() + 1,
        engine.total(),
        question.kind
    );
    println!("{}", question.text);

    match question.kind {
        QuestionKind::Text => println!("  (type: answer <text>)"),
        QuestionKind::Multiple => {
            for option in &question.answers {
                println!("  {}) {}", option.id, option.text);
            }
            println!("  (select several: answer id,id)");
        }
        _ => {
            for option in &question.answers {
                println!("  {}) {}", option.id, option.text);
            }
        }
    }

    if let Some(answer) = engine.answer_for(question.id) {
        println!("Your answer: {}", question.answer_label(answer));
    }
}

fn print_list(engine: &TestEngine) {
    for (index, question) in engine.questions().iter().enumerate() {
        let marker = if engine.is_answered(question.id) {
            "x"
        } else {
            " "
        };
        let cursor = if index == engine.current_index() {
            ">"
        } else {
            " "
        };
        println!("{cursor} [{marker}] {}. {}", index + 1, question.text);
    }
}

fn print_help() {
    println!("Commands:");
    println!("  next, n          go to the next question");
    println!("  prev, p          go to the previous question");
    println!("  goto N           jump to question N");
    println!("  answer, a VALUE  answer the current question (ids comma-separated for multiple)");
    println!("  clear            remove the current answer");
    println!("  show             show the current question");
    println!("  list             list all questions");
    println!("  time             show the remaining time");
    println!("  finish           submit the test");
}
