//! crates/eer_net/src/error.rs

use thiserror::Error;

/// Failures of classifier and geocoder calls, and of client setup.
/// Submission failures are not errors; see `eer_form::SubmitOutcome`.
#[derive(Debug, Error)]
pub enum NetError {
    /// The request did not complete (connect, DNS, TLS, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("http status {status}: {body}")]
    Http { status: u16, body: String },

    /// The server answered, but not in the agreed shape.
    #[error("unexpected response: {0}")]
    Integration(String),

    /// Missing credentials, malformed URLs, unreadable config.
    #[error("config error: {0}")]
    Config(String),
}

pub type NetResult<T> = Result<T, NetError>;

impl From<reqwest::Error> for NetError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return NetError::Integration(e.to_string());
        }
        match e.status() {
            Some(s) => NetError::Http { status: s.as_u16(), body: e.to_string() },
            None => NetError::Network(e.to_string()),
        }
    }
}
