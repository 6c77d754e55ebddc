// src/lib.rs
// =============================================================================
// bookmark-analyzer as a library: the binary in main.rs is a thin CLI on top.
//
// Modules:
// - checker: probe bookmarks concurrently and sort them into buckets
// - ingest: the snapshot file and the endpoint the extension posts to
// - extension: the companion browser extension and its zip packaging
// - summarize: language-model explanations and grouping
// - wizard: the interactive step-by-step mode
// - report: tables and JSON output
// - config / error: settings and the shared error type
// =============================================================================

pub mod checker;
pub mod cli;
pub mod config;
pub mod error;
pub mod extension;
pub mod ingest;
pub mod report;
pub mod summarize;
pub mod wizard;

pub use config::AppConfig;
pub use error::{Error, Result};
