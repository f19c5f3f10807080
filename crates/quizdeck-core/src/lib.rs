//! Test-session engine, scoring, and session storage.
//!
//! This crate defines the question model, the timed test engine, and the
//! typed session store that the quizdeck CLI and report renderer build on.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod session;
pub mod store;
pub mod timer;
pub mod traits;
