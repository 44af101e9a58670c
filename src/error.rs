//! Error types for the tweet source.
//!
//! `InvalidInput` is raised before any I/O happens. Everything coming out of the
//! search or text-cleaning collaborators is carried through unchanged.

use reqwest::StatusCode;
use thiserror::Error;
use tokio_cron_scheduler::JobSchedulerError;

/// Errors produced while looking up and normalizing tweets.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("credentials error: {0}")]
    Credentials(String),
    #[error("unable to read credentials file: {0}")]
    CredentialsFile(std::io::Error),
    #[error("unable to parse credentials file: {0}")]
    CredentialsFormat(#[from] toml::de::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Twitter API returned status {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("invalid JSON in search response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed record: {0}")]
    MalformedRecord(String),
    #[error("scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),
}

impl SourceError {
    pub fn api_status(status: StatusCode, body: String) -> Self {
        SourceError::Api { status, body }
    }

    /// Whether the error was raised before any collaborator was called.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, SourceError::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, SourceError>;
