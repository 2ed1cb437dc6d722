//! Construction errors for [`crate::RestClient`].
//!
//! Request-time failures are reported as [`model::DomainError`]; only building
//! the client can fail with [`HttpClientError`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The correlation header name is not a valid HTTP header name.
    #[error("Invalid correlation header name '{name}'")]
    InvalidHeaderName { name: String },

    /// `max_connections` must be at least one.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// The underlying `reqwest` client could not be built (e.g. TLS backend
    /// initialisation failed).
    #[error("HTTP client could not be built: {0}")]
    Build(#[from] reqwest::Error),
}
