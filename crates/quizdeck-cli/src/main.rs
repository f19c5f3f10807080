//! The quizdeck command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizdeck", version, about = "Timed quiz taker")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and sample question bank
    Init,

    /// Validate a question bank
    Validate {
        /// Path to a .json or .toml question bank
        #[arg(long)]
        questions: Option<PathBuf>,
    },

    /// Prepare a new test from a question bank
    Start {
        /// Path to a .json or .toml question bank
        #[arg(long)]
        questions: Option<PathBuf>,

        /// Time limit in minutes
        #[arg(long)]
        time_limit: Option<u32>,

        /// Present questions in random order
        #[arg(long)]
        shuffle_questions: bool,

        /// Shuffle the options of choice questions
        #[arg(long)]
        shuffle_answers: bool,
    },

    /// Take the prepared test interactively
    Take,

    /// Show the results of the last completed test
    Results {
        /// Output format: text, json, markdown, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Discard the current test and its results
    Restart,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizdeck=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = run(cli.command, cli.config).await;

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(command: Commands, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = quizdeck_core::config::load_config_from(config_path.as_deref())?;

    match command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { questions } => commands::validate::execute(&config, questions),
        Commands::Start {
            questions,
            time_limit,
            shuffle_questions,
            shuffle_answers,
        } => commands::start::execute(
            &config,
            questions,
            time_limit,
            shuffle_questions,
            shuffle_answers,
        ),
        Commands::Take => commands::take::execute(&config).await,
        Commands::Results { format, output } => {
            commands::results::execute(&config, &format, output)
        }
        Commands::Restart => commands::restart::execute(&config),
    }
}
