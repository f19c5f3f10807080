//! The `quizdeck restart` command.

use anyhow::Result;

use quizdeck_core::config::QuizdeckConfig;

use super::open_session;

pub fn execute(config: &QuizdeckConfig) -> Result<()> {
    let mut session = open_session(config)?;
    session.restart()?;
    println!("Session cleared. Run: quizdeck start");
    Ok(())
}
