//! Error types for the Axepta transaction engine.

use crate::cipher::CipherError;
use crate::field::Field;

/// Errors raised by the parameter registry, the typed setters and the
/// outbound signing/encryption passes.
///
/// Inbound parsing never produces these: a malformed gateway payload is
/// reported through [`Transaction::is_valid`](crate::Transaction::is_valid)
/// returning `false`.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// A write or lookup used a name outside the allow-list.
    #[error("Parameter {0} does not exist.")]
    UnknownField(String),

    /// A read targeted a field that was never set.
    #[error("Parameter {0} is not set.")]
    MissingField(Field),

    /// A required field was empty when signing or encrypting.
    #[error("{0} can not be empty")]
    RequiredFieldEmpty(Field),

    /// A typed setter rejected its input.
    #[error("Invalid {field}: {reason}")]
    InvalidInput {
        /// Name of the field or setting being validated.
        field: &'static str,
        /// What was wrong with the value.
        reason: &'static str,
    },

    /// The payload length was queried before an encryption pass.
    #[error("The length is missing. Encrypt the payload first.")]
    LengthMissing,

    /// The encryption key or a cipher operation was rejected.
    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),
}

impl GatewayError {
    /// Shorthand for [`GatewayError::InvalidInput`].
    #[must_use]
    pub const fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidInput { field, reason }
    }
}
