//! Error types for jira-relay
//!
//! Every component classifies failures into a single taxonomy so callers and
//! the retry layer can treat errors uniformly. Uses thiserror for ergonomic
//! error handling.

use thiserror::Error;

/// Result type alias for jira-relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Error taxonomy shared by every component.
///
/// The first five variants are the classification surfaced to tool callers;
/// the remainder cover ambient concerns (configuration, transport plumbing,
/// serialization) that stay inside the process.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Malformed or missing input detected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced team, alias, or remote entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend-reported authentication or authorization failure; never retried
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Network/timeout/5xx/backend-throttle; retried internally, surfaced
    /// only when retries exhaust
    #[error("Transient backend error: {0}")]
    Transient(String),

    /// The local limiter timed out waiting for a permit
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Short kind label used in bulk-operation failure rows
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Validation(_) => "validation",
            RelayError::NotFound(_) => "not_found",
            RelayError::Permission(_) => "permission",
            RelayError::Transient(_) => "transient",
            RelayError::RateLimitExceeded(_) => "rate_limit_exceeded",
            RelayError::Config(_) => "config",
            RelayError::Http(_) => "http",
            RelayError::Json(_) => "json",
            RelayError::Yaml(_) => "yaml",
            RelayError::Io(_) => "io",
        }
    }
}

impl crate::retry::RetryableError for RelayError {
    fn retry_decision(&self) -> crate::retry::RetryDecision {
        use crate::retry::RetryDecision;
        use std::time::Duration;

        match self {
            RelayError::Transient(msg) => {
                // Backend throttle responses carry the server's Retry-After
                // hint in the message; honor it when present.
                if let Some(secs) = extract_retry_after(msg) {
                    RetryDecision::RetryAfter(Duration::from_secs(secs))
                } else {
                    RetryDecision::Retry
                }
            }
            RelayError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    RetryDecision::Retry
                } else if let Some(status) = e.status() {
                    match status.as_u16() {
                        429 => RetryDecision::RetryAfter(Duration::from_secs(60)),
                        500..=599 => RetryDecision::Retry,
                        _ => RetryDecision::NoRetry,
                    }
                } else {
                    RetryDecision::Retry
                }
            }
            // Local limiter timeouts already waited their full budget
            RelayError::RateLimitExceeded(_) => RetryDecision::NoRetry,
            RelayError::Validation(_)
            | RelayError::NotFound(_)
            | RelayError::Permission(_)
            | RelayError::Config(_)
            | RelayError::Json(_)
            | RelayError::Yaml(_)
            | RelayError::Io(_) => RetryDecision::NoRetry,
        }
    }
}

/// Extract retry-after seconds from an error message
fn extract_retry_after(msg: &str) -> Option<u64> {
    let msg_lower = msg.to_lowercase();
    let pos = msg_lower.find("retry after")?;
    let after_text = &msg[pos + 11..];
    let num_str: String = after_text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    num_str.parse().ok()
}
