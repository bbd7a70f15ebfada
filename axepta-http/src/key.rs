//! Random transaction keys.
//!
//! A key ties a gateway redirect back to the merchant's order, for example
//! on the cancel URL built by [`cancel_url`]. It carries no secret.

use rand::RngCore;
use url::Url;

use crate::constants::{CANCEL_KEY_PARAM, KEY_BYTES};
use crate::error::HttpError;

/// Returns a fresh 32-character lowercase hex key.
#[must_use]
pub fn generate_key() -> String {
    let mut bytes = [0_u8; KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Appends `key` to a cancel URL as the `o` query parameter, keeping any
/// query the URL already has. The result is meant for `URLBack`.
///
/// # Errors
///
/// Returns [`HttpError::Url`] if `base` does not parse.
pub fn cancel_url(base: &str, key: &str) -> Result<Url, HttpError> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut().append_pair(CANCEL_KEY_PARAM, key);
    Ok(url)
}
