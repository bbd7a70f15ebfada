//! Blowfish-ECB payload cipher.
//!
//! The gateway mandates Blowfish in ECB mode with no authentication. Two
//! quirks are part of the protocol and reproduced as-is:
//!
//! - **Key stretching**: a key shorter than 16 bytes is repeated whole until
//!   it reaches at least 16 bytes (`"abc"` becomes 18 bytes, not 16).
//! - **Zero padding**: plaintext is padded with NUL bytes to the next multiple
//!   of 8, and every trailing NUL is stripped after decryption. A plaintext
//!   that really ends in NUL bytes loses them on the round trip.

use std::fmt::{self, Debug, Formatter};

use blowfish::Blowfish;
use blowfish::cipher::generic_array::GenericArray;
use blowfish::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use zeroize::Zeroize;

/// Blowfish block size in bytes.
pub const BLOCK_LEN: usize = 8;

/// Keys shorter than this are stretched by repetition.
pub const MIN_KEY_LEN: usize = 16;

/// Longest key Blowfish accepts.
pub const MAX_KEY_LEN: usize = 56;

/// Errors raised by the payload cipher.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CipherError {
    /// The encryption key is empty.
    #[error("encryption key is empty")]
    EmptyKey,
    /// The encryption key is longer than 56 bytes. Blowfish's key schedule
    /// takes at most 56 bytes, and the `blowfish` crate rejects longer keys
    /// rather than ignoring the excess the way some other implementations do.
    #[error("encryption key is {0} bytes, Blowfish accepts at most {MAX_KEY_LEN}")]
    KeyTooLong(usize),
    /// The ciphertext is not a whole number of blocks.
    #[error("ciphertext length {0} is not a multiple of {BLOCK_LEN}")]
    BlockLength(usize),
    /// The ciphertext is not valid hex.
    #[error("invalid hex ciphertext: {0}")]
    Hex(#[from] hex::FromHexError),
    /// The decrypted payload is not valid UTF-8.
    #[error("decrypted payload is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Repeats a short key end-to-end until it is at least [`MIN_KEY_LEN`]
/// bytes long. Longer keys are returned unchanged.
///
/// # Errors
///
/// Returns [`CipherError::EmptyKey`] for an empty key and
/// [`CipherError::KeyTooLong`] for keys beyond [`MAX_KEY_LEN`].
pub fn stretch_key(key: &[u8]) -> Result<Vec<u8>, CipherError> {
    if key.is_empty() {
        return Err(CipherError::EmptyKey);
    }
    let stretched = if key.len() < MIN_KEY_LEN {
        key.repeat(MIN_KEY_LEN.div_ceil(key.len()))
    } else {
        key.to_vec()
    };
    if stretched.len() > MAX_KEY_LEN {
        return Err(CipherError::KeyTooLong(stretched.len()));
    }
    Ok(stretched)
}

/// Blowfish-ECB cipher keyed with a stretched encryption secret.
pub struct PayloadCipher {
    cipher: Blowfish,
}

impl PayloadCipher {
    /// Builds a cipher from the raw encryption secret.
    ///
    /// # Errors
    ///
    /// Returns a [`CipherError`] if the key is empty or too long.
    pub fn new(key: &[u8]) -> Result<Self, CipherError> {
        let mut stretched = stretch_key(key)?;
        let cipher = <Blowfish as KeyInit>::new_from_slice(&stretched)
            .map_err(|_| CipherError::KeyTooLong(stretched.len()));
        stretched.zeroize();
        Ok(Self { cipher: cipher? })
    }

    /// NUL-pads `plaintext` to a block boundary and encrypts it.
    #[must_use]
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let mut buffer = plaintext.to_vec();
        let remainder = buffer.len() % BLOCK_LEN;
        if remainder != 0 {
            buffer.resize(buffer.len() + BLOCK_LEN - remainder, 0);
        }
        for block in buffer.chunks_exact_mut(BLOCK_LEN) {
            self.cipher.encrypt_block(GenericArray::from_mut_slice(block));
        }
        buffer
    }

    /// Decrypts `ciphertext` and strips every trailing NUL byte.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::BlockLength`] if the input is not a whole
    /// number of blocks.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        if ciphertext.len() % BLOCK_LEN != 0 {
            return Err(CipherError::BlockLength(ciphertext.len()));
        }
        let mut buffer = ciphertext.to_vec();
        for block in buffer.chunks_exact_mut(BLOCK_LEN) {
            self.cipher.decrypt_block(GenericArray::from_mut_slice(block));
        }
        let end = buffer.iter().rposition(|byte| *byte != 0).map_or(0, |i| i + 1);
        buffer.truncate(end);
        Ok(buffer)
    }

    /// Encrypts a text payload and returns lowercase hex.
    #[must_use]
    pub fn encrypt_hex(&self, plaintext: &str) -> String {
        hex::encode(self.encrypt(plaintext.as_bytes()))
    }

    /// Decodes hex (either case) and decrypts it to text.
    ///
    /// # Errors
    ///
    /// Returns a [`CipherError`] for bad hex, a partial block, or a
    /// plaintext that is not UTF-8.
    pub fn decrypt_hex(&self, ciphertext: &str) -> Result<String, CipherError> {
        let bytes = hex::decode(ciphertext)?;
        Ok(String::from_utf8(self.decrypt(&bytes)?)?)
    }
}

impl Debug for PayloadCipher {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadCipher").finish_non_exhaustive()
    }
}
