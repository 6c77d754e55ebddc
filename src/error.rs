// src/error.rs
// =============================================================================
// Error type shared by the orchestration modules (config, snapshot, ingest,
// extension packaging, summarizer, wizard).
//
// Probing a bookmark never produces one of these: a failed probe is turned
// into a "Dead" ProbeResult instead. These errors are for the glue around it.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("summarizer error: {0}")]
    Summarizer(String),

    #[error("no transition from {state} on {event}")]
    InvalidTransition { state: String, event: String },
}

pub type Result<T> = std::result::Result<T, Error>;
