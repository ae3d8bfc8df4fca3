//! Failures surfaced by the pull request fetch path.

use thiserror::Error;

/// Errors raised while listing pull requests from GitHub.
///
/// Each variant is a distinct condition the caller can react to: the
/// dashboard shows a "try again later" hint for [`FetchError::RateLimited`]
/// and the CLI maps every variant to its own exit code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("network error talking to GitHub: {0}")]
    Network(String),

    /// GitHub answered 403, which on the unauthenticated API means the rate
    /// limit is exhausted.
    #[error("GitHub API rate limit exceeded. Wait a few minutes and try again.")]
    RateLimited {
        /// `message` field of the response body, when one was sent.
        message: Option<String>,
    },

    /// Any other non-success status.
    #[error("GitHub API error: {status} {reason}")]
    Api {
        /// Numeric HTTP status.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
    },

    /// The body was not the JSON array the listing endpoint returns.
    #[error("unexpected response from GitHub: {0}")]
    Decode(String),

    /// The repository identifier is not of the form `owner/name`.
    #[error("invalid repository '{0}': expected owner/name")]
    InvalidRepository(String),
}

impl FetchError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited { .. })
    }
}
