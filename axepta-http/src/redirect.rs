//! Redirect URL to the hosted payment page.
//!
//! After a transaction has been signed and encrypted, the customer's browser
//! is sent to the gateway with the merchant id, the encrypted payload and its
//! length, the cancel URL and any custom display fields as query parameters.
//!
//! ```rust
//! use axepta::Transaction;
//! use axepta_http::RedirectRequest;
//!
//! let mut tx = Transaction::new("hmac-secret", "crypt-key")?;
//! tx.set_merchant_id("M1");
//! tx.set_trans_id("ORDER-42")?;
//! tx.set_amount(1000)?;
//! tx.set_currency("EUR")?;
//! tx.set_order_desc("Test");
//! tx.sign_request()?;
//! tx.encrypt_payload()?;
//!
//! let url = RedirectRequest::from_transaction(&tx)?
//!     .custom_field(2, "Demo shop")?
//!     .to_url()?;
//! assert!(url.as_str().starts_with("https://paymentpage.axepta.bnpparibas/payssl.aspx?MerchantID=M1&Data="));
//! # Ok::<(), axepta_http::HttpError>(())
//! ```

use axepta::{Field, Transaction};
use url::Url;

use crate::constants::CUSTOM_FIELD_COUNT;
use crate::error::HttpError;

/// Query parameters for the gateway redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRequest {
    gateway_url: String,
    merchant_id: String,
    data: String,
    len: i64,
    url_back: Option<String>,
    custom_fields: [Option<String>; CUSTOM_FIELD_COUNT],
}

impl RedirectRequest {
    /// Collects the redirect parameters from an encrypted transaction.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::NotEncrypted`] before
    /// [`Transaction::encrypt_payload`] has run, or [`HttpError::Gateway`]
    /// when `MerchantID` is empty.
    pub fn from_transaction(tx: &Transaction) -> Result<Self, HttpError> {
        let params = tx.params();
        let merchant_id = params
            .text(Field::MerchantId)
            .filter(|id| !id.is_empty())
            .ok_or(axepta::GatewayError::RequiredFieldEmpty(Field::MerchantId))?;
        let data = params
            .text(Field::Data)
            .filter(|data| !data.is_empty())
            .ok_or(HttpError::NotEncrypted)?;
        let len = tx.payload_len().map_err(|_| HttpError::NotEncrypted)?;

        Ok(Self {
            gateway_url: tx.url().to_owned(),
            merchant_id: merchant_id.to_owned(),
            data: data.to_owned(),
            len,
            url_back: params
                .text(Field::UrlBack)
                .filter(|url| !url.is_empty())
                .map(str::to_owned),
            custom_fields: Default::default(),
        })
    }

    /// Sets `CustomField{index}`, with `index` in `1..=14`. Empty values are
    /// left out of the URL.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::CustomFieldIndex`] for any other index.
    pub fn custom_field(mut self, index: usize, value: impl Into<String>) -> Result<Self, HttpError> {
        let slot = index
            .checked_sub(1)
            .and_then(|i| self.custom_fields.get_mut(i))
            .ok_or(HttpError::CustomFieldIndex(index))?;
        *slot = Some(value.into());
        Ok(self)
    }

    /// Returns the value of `CustomField{index}`, if set.
    #[must_use]
    pub fn custom_field_value(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.custom_fields.get(i))
            .and_then(Option::as_deref)
    }

    /// Returns the query parameters in the order they are sent.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            (Field::MerchantId.as_str().to_owned(), self.merchant_id.clone()),
            (Field::Data.as_str().to_owned(), self.data.clone()),
            (Field::Len.as_str().to_owned(), self.len.to_string()),
        ];
        if let Some(url_back) = &self.url_back {
            pairs.push((Field::UrlBack.as_str().to_owned(), url_back.clone()));
        }
        for (field, value) in Field::CUSTOM_FIELDS.iter().zip(&self.custom_fields) {
            if let Some(value) = value.as_ref().filter(|value| !value.is_empty()) {
                pairs.push((field.as_str().to_owned(), value.clone()));
            }
        }
        pairs
    }

    /// Builds the form-urlencoded redirect URL.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Url`] if the transaction's gateway URL does not
    /// parse.
    pub fn to_url(&self) -> Result<Url, HttpError> {
        let mut url = Url::parse(&self.gateway_url)?;
        url.query_pairs_mut().extend_pairs(self.query_pairs());

        #[cfg(feature = "telemetry")]
        tracing::debug!(
            host = url.host_str().unwrap_or_default(),
            len = self.len,
            "axepta.redirect_built"
        );

        Ok(url)
    }
}
