//! quizdeck configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::TestSettings;

/// Top-level quizdeck configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizdeckConfig {
    /// File holding the session store.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Default question bank.
    #[serde(default = "default_questions_path")]
    pub questions_path: PathBuf,
    /// Default time limit in minutes.
    #[serde(default = "default_time_limit")]
    pub time_limit_minutes: u32,
    /// Shuffle question order by default.
    #[serde(default)]
    pub shuffle_questions: bool,
    /// Shuffle answer options by default.
    #[serde(default)]
    pub shuffle_answers: bool,
    /// Output directory for exported results.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".quizdeck/session.json")
}
fn default_questions_path() -> PathBuf {
    PathBuf::from("questions.json")
}
fn default_time_limit() -> u32 {
    10
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizdeck-results")
}

impl Default for QuizdeckConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            questions_path: default_questions_path(),
            time_limit_minutes: default_time_limit(),
            shuffle_questions: false,
            shuffle_answers: false,
            output_dir: default_output_dir(),
        }
    }
}

impl QuizdeckConfig {
    /// Test settings from the configured defaults.
    pub fn default_settings(&self) -> TestSettings {
        TestSettings {
            time_limit_minutes: self.time_limit_minutes,
            shuffle_questions: self.shuffle_questions,
            shuffle_answers: self.shuffle_answers,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `quizdeck.toml` in the current directory
/// 2. `~/.config/quizdeck/config.toml`
///
/// Environment variable override: `QUIZDECK_STORE` replaces `store_path`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizdeckConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizdeck.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizdeckConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizdeckConfig::default(),
    };

    if let Ok(store) = std::env::var("QUIZDECK_STORE") {
        if !store.is_empty() {
            config.store_path = PathBuf::from(store);
        }
    }

    config.store_path = resolve_path(&config.store_path);
    config.questions_path = resolve_path(&config.questions_path);
    config.output_dir = resolve_path(&config.output_dir);

    tracing::debug!(
        source = ?config_path,
        store = %config.store_path.display(),
        "configuration loaded"
    );
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizdeck"))
}
