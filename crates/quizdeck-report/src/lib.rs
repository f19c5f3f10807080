//! HTML rendering of quizdeck test results.

pub mod html;

pub use html::{generate_html, write_html_report};
