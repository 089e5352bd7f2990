//! Error type shared by the release client, the host probe and the ctmod layer

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CtModError {
    /// Request could not be sent or the server answered with an unreadable body
    #[error("HTTP request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Tag does not carry a " (wow64)" or " (amd64)" suffix
    #[error("Invalid tag '{0}'. Must contain amd64 or wow64")]
    InvalidTag(String),

    #[error("Unexpected ldd output: {0:?}")]
    LddOutput(String),

    #[error("{command} failed with exit code: {code:?}")]
    CommandFailed { command: String, code: Option<i32> },

    #[error("{command} timed out after {secs} seconds")]
    Timeout { command: String, secs: u64 },
}
