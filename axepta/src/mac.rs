//! HMAC-SHA-256 signing over an ordered subset of parameters.
//!
//! The signed string is built by [`compose`]: field values only, in list
//! order, separated by `*`. A separator follows every list position except
//! the last one whether or not the field contributed a value, so
//! `PayID, TransID, MerchantID, Amount, Currency` with no `PayID` set yields
//! `*ORDER-42*M1*1000*EUR`. The gateway builds the identical string.

use std::fmt::{self, Debug, Formatter};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::field::Field;
use crate::params::TransactionParameters;

type HmacSha256 = Hmac<Sha256>;

const SEPARATOR: char = '*';

/// Builds the string to sign from `params`, following `order`.
#[must_use]
pub fn compose(params: &TransactionParameters, order: &[Field]) -> String {
    let mut composed = String::new();
    let last = order.len().saturating_sub(1);

    for (position, field) in order.iter().enumerate() {
        if let Some(value) = params.non_empty(*field) {
            composed.push_str(&value.to_wire());
        }
        if position != last {
            composed.push(SEPARATOR);
        }
    }

    composed
}

/// The HMAC signing secret.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MacKey(Vec<u8>);

impl MacKey {
    /// Wraps a signing secret.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    /// Returns the lowercase hex HMAC-SHA-256 of `message`.
    #[must_use]
    pub fn sign(&self, message: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.0).expect("HMAC accepts keys of any length");
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Composes `order` over `params` and signs the result.
    #[must_use]
    pub fn sign_fields(&self, params: &TransactionParameters, order: &[Field]) -> String {
        self.sign(&compose(params, order))
    }
}

impl Debug for MacKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("MacKey([REDACTED])")
    }
}

/// Compares a received digest with a computed one without early exit on the
/// first differing byte.
#[must_use]
pub fn digests_match(received: &str, computed: &str) -> bool {
    received.as_bytes().ct_eq(computed.as_bytes()).into()
}
