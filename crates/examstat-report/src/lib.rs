//! Report generation for examstat analyses.
//!
//! Markdown and JSON output live on [`examstat_core::AnalysisResult`] itself;
//! this crate adds the self-contained HTML report.

pub mod html;

pub use html::{generate_html, write_html_report};
