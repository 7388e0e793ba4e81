//! Error types for the OpenStack gateway.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by authentication, catalog parsing, and request dispatch.
#[derive(Debug, Error)]
pub enum Error {
    /// The auth endpoint rejected the supplied credentials (HTTP 401).
    #[error("Invalid credentials: authentication endpoint returned 401")]
    InvalidCredentials,

    /// The auth endpoint answered with something the protocol does not allow:
    /// an unexpected status, an unparsable body, or a body missing required keys.
    #[error("Malformed response: {detail}")]
    MalformedResponse { detail: String },

    /// The response carried no content-type header at all.
    #[error("Missing content-type header in response")]
    MissingContentType,

    /// Programmer or operator error: unknown auth version, missing auth URL,
    /// unresolvable endpoint configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token accessed before the first successful authentication.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Transport-level failure from the HTTP client.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl Error {
    /// Build a [`Error::MalformedResponse`] from a free-form detail.
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            detail: detail.into(),
        }
    }

    /// Build a [`Error::MalformedResponse`] for an unexpected HTTP status,
    /// keeping the status and body available for diagnosis.
    pub fn unexpected_status(status: u16, body: &str) -> Self {
        Self::MalformedResponse {
            detail: format!("code: {} body: {}", status, body),
        }
    }
}
