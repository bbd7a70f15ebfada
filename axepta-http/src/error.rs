//! Error types for the HTTP edge.

use axepta::GatewayError;

/// Errors raised while building redirects or reading callbacks.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HttpError {
    /// The transaction rejected a value or lacked a required one.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// The gateway URL could not be parsed.
    #[error("invalid gateway URL: {0}")]
    Url(#[from] url::ParseError),

    /// The transaction has not been encrypted yet.
    #[error("the transaction has no encrypted payload")]
    NotEncrypted,

    /// A custom field index outside `1..=14`.
    #[error("custom field {0} does not exist")]
    CustomFieldIndex(usize),
}
