pub mod init;
pub mod restart;
pub mod results;
pub mod start;
pub mod take;
pub mod validate;

use anyhow::{Context, Result};

use quizdeck_core::config::QuizdeckConfig;
use quizdeck_core::session::Session;
use quizdeck_core::store::FileStore;

/// Open the session stored at the configured store path.
pub fn open_session(config: &QuizdeckConfig) -> Result<Session<FileStore>> {
    let store = FileStore::open(&config.store_path).with_context(|| {
        format!(
            "failed to open session store: {}",
            config.store_path.display()
        )
    })?;
    Ok(Session::new(store))
}
