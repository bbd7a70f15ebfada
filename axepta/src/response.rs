//! Inbound gateway responses: ingestion, verification and classification.
//!
//! The gateway answers either with a plaintext parameter set or with a
//! single encrypted `Data` field (when the request asked for
//! `Response=encrypt`). [`Transaction::set_response`] accepts both shapes;
//! [`Transaction::is_valid`] then checks the gateway's signature and
//! [`Transaction::is_successful`] reads the outcome.
//!
//! ```rust
//! use axepta::{Field, Transaction};
//!
//! let mut tx = Transaction::new("hmac-secret", "crypt-key")?;
//! tx.set_response([
//!     ("mid", "M1"),
//!     ("PayID", "P1"),
//!     ("TransID", "ORDER-42"),
//!     ("Status", "OK"),
//!     ("Code", "00000000"),
//!     ("MAC", "not-a-valid-mac"),
//! ]);
//! assert_eq!(tx.param(Field::MerchantId)?.as_text(), Some("M1"));
//! assert!(tx.is_successful());
//! assert!(!tx.is_valid());
//! # Ok::<(), axepta::GatewayError>(())
//! ```

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::field::{Field, RESPONSE_MAC_FIELDS};
use crate::mac;
use crate::payload;
use crate::transaction::Transaction;

/// Outcome reported in a response's `Status` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    /// `OK`: the payment went through.
    Ok,
    /// `AUTHORIZED`: the amount is reserved for a later capture.
    Authorized,
    /// `FAILED`: the payment was declined or aborted.
    Failed,
    /// Any other status, verbatim.
    Other(String),
}

impl PaymentStatus {
    /// Returns `true` for `OK` and `AUTHORIZED`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Ok | Self::Authorized)
    }

    /// Returns the status as sent by the gateway.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ok => "OK",
            Self::Authorized => "AUTHORIZED",
            Self::Failed => "FAILED",
            Self::Other(status) => status,
        }
    }
}

impl From<&str> for PaymentStatus {
    fn from(status: &str) -> Self {
        match status {
            "OK" => Self::Ok,
            "AUTHORIZED" => Self::Authorized,
            "FAILED" => Self::Failed,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(status: String) -> Self {
        Self::from(status.as_str())
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.as_str().to_owned()
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Transaction {
    /// Ingests the gateway's response parameters.
    ///
    /// If `raw` carries a non-empty `Data` entry, it is decrypted and the
    /// parameters are read from the plaintext; otherwise the entries of
    /// `raw` are taken as the parameters. Either way the plaintext body is
    /// stored under `Debug`, the gateway's `mid` is stored as `MerchantID`,
    /// and names outside the allow-list are kept aside in
    /// [`extra`](Self::extra). Entries merge into the current parameters.
    ///
    /// A `Data` entry that cannot be decrypted leaves only `Data` and an
    /// empty `Debug` behind and makes [`is_valid`](Self::is_valid) return
    /// `false`.
    pub fn set_response<I, K, V>(&mut self, raw: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let raw: Vec<(String, String)> = raw
            .into_iter()
            .map(|(name, value)| (name.as_ref().to_owned(), value.as_ref().to_owned()))
            .collect();
        self.inbound_error = None;

        let data = raw
            .iter()
            .rev()
            .find(|(name, value)| name == Field::Data.as_str() && !value.is_empty())
            .map(|(_, value)| value.clone());

        let Some(data) = data else {
            let debug = raw
                .iter()
                .map(|(_, value)| value.as_str())
                .collect::<Vec<_>>()
                .join("&");
            self.params.set(Field::Debug, debug);

            #[cfg(feature = "telemetry")]
            tracing::debug!(entries = raw.len(), "axepta.response_plain");

            for (name, value) in raw {
                self.store_inbound(&name, value);
            }
            return;
        };

        self.params.set(Field::Data, data.as_str());
        match self.cipher.decrypt_hex(&data) {
            Ok(plaintext) => {
                let pairs = payload::parse(&plaintext);

                #[cfg(feature = "telemetry")]
                tracing::debug!(entries = pairs.len(), "axepta.response_decrypted");

                self.params.set(Field::Debug, plaintext);
                for (name, value) in pairs {
                    self.store_inbound(&name, value);
                }
            }
            Err(err) => {
                #[cfg(feature = "telemetry")]
                tracing::warn!(error = %err, "axepta.response_undecryptable");

                self.params.set(Field::Debug, "");
                self.inbound_error = Some(err.to_string());
            }
        }
    }

    fn store_inbound(&mut self, name: &str, value: String) {
        match Field::from_inbound(name) {
            Ok(field) => self.params.set(field, value),
            Err(_) => {
                self.extra.insert(name.to_owned(), value);
            }
        }
    }

    /// Recomputes the response signature and compares it with the received
    /// `MAC`.
    ///
    /// The signature covers `PayID`, `TransID`, `MerchantID`, `Status` and
    /// `Code`. The comparison is exact, so a `MAC` in a different letter case
    /// does not match. Returns `false` when no `MAC` was received or the last
    /// response could not be decrypted. Nothing is modified.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if self.inbound_error.is_some() {
            return false;
        }
        let Some(received) = self.params.text(Field::Mac).filter(|mac| !mac.is_empty()) else {
            return false;
        };
        let computed = self.mac_key.sign_fields(&self.params, RESPONSE_MAC_FIELDS);
        let valid = mac::digests_match(received, &computed);

        #[cfg(feature = "telemetry")]
        if !valid {
            tracing::warn!("axepta.response_mac_mismatch");
        }

        valid
    }

    /// Returns `true` when `Status` is exactly `OK` or `AUTHORIZED`.
    ///
    /// This does not check the signature; pair it with
    /// [`is_valid`](Self::is_valid).
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.status().is_some_and(|status| status.is_success())
    }

    /// Returns the received `Status`, if any.
    #[must_use]
    pub fn status(&self) -> Option<PaymentStatus> {
        self.params
            .text(Field::Status)
            .filter(|status| !status.is_empty())
            .map(PaymentStatus::from)
    }

    /// Returns the last four characters of `Code`, the gateway's error
    /// number. Shorter codes are returned whole.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        let code = self.params.text(Field::Code).filter(|code| !code.is_empty())?;
        Some(
            code.char_indices()
                .rev()
                .nth(3)
                .map_or(code, |(start, _)| &code[start..]),
        )
    }

    /// Returns the received `Description`.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.params.text(Field::Description)
    }

    /// Returns the gateway's payment id.
    #[must_use]
    pub fn pay_id(&self) -> Option<&str> {
        self.params.text(Field::PayId)
    }

    /// Returns the merchant reference echoed back, under `refnr` or `RefNr`.
    #[must_use]
    pub fn ref_nr(&self) -> Option<&str> {
        self.params
            .text(Field::RefNrAlias)
            .filter(|ref_nr| !ref_nr.is_empty())
            .or_else(|| self.params.text(Field::RefNr))
    }

    /// Returns inbound entries whose names are not allow-listed.
    #[must_use]
    pub const fn extra(&self) -> &BTreeMap<String, String> {
        &self.extra
    }

    /// Returns why the last encrypted response could not be read.
    #[must_use]
    pub fn response_error(&self) -> Option<&str> {
        self.inbound_error.as_deref()
    }
}
