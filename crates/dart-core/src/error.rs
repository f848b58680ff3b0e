//! Error types for filing retrieval and metrics operations.
//!
//! This module defines [`DataError`]. Parse failures on individual amounts are
//! not errors: they resolve to a missing value on the affected field. Only
//! request validation, credential problems, and provider communication
//! failures surface as a [`DataError`].

use thiserror::Error;

/// Errors that can occur while talking to providers or stores.
#[derive(Error, Debug)]
pub enum DataError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The requested corporation was not found in the directory.
    #[error("Corporation not found: {0}")]
    CorpNotFound(String),

    /// Error parsing a response body from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error interacting with the corp-code store.
    #[error("Store error: {0}")]
    Store(String),

    /// The requested provider is not configured.
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// An invalid or missing request parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A required credential (API key) was not supplied.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// The provider rejected the supplied credentials.
    #[error("Authentication failed for provider {0}")]
    AuthenticationFailed(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl DataError {
    /// Returns true for errors caused by the caller's input rather than the upstream.
    ///
    /// These are surfaced immediately and never masked by a fallback.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter(_) | Self::MissingCredentials(_) | Self::AuthenticationFailed(_)
        )
    }
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;
