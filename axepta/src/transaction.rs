//! The gateway transaction engine.
//!
//! A [`Transaction`] covers exactly one logical exchange with the gateway:
//! either one outbound request (populate, sign, encrypt) or one inbound
//! response (parse, verify, classify). It owns its parameter set and both
//! secrets, performs no I/O and holds no locks; concurrent exchanges each use
//! their own instance.
//!
//! # Outbound
//!
//! ```rust
//! use axepta::Transaction;
//!
//! let mut tx = Transaction::new("hmac-secret", "crypt-key")?;
//! tx.set_merchant_id("M1");
//! tx.set_trans_id("ORDER-42")?;
//! tx.set_amount(1000)?;
//! tx.set_currency("EUR")?;
//! tx.set_order_desc("Test");
//!
//! let mac = tx.sign_request()?;
//! let data = tx.encrypt_payload()?;
//! assert_eq!(mac.len(), 64);
//! assert!(!data.is_empty());
//! assert_eq!(tx.payload_len()?, tx.debug().len() as i64);
//! # Ok::<(), axepta::GatewayError>(())
//! ```

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use url::Url;

use crate::amount;
use crate::cipher::PayloadCipher;
use crate::endpoint::Endpoint;
use crate::error::GatewayError;
use crate::field::{
    DEFAULT_LANGUAGE, Field, LANGUAGES, PAYLOAD_FIELDS, REQUEST_MAC_FIELDS,
};
use crate::mac::MacKey;
use crate::params::TransactionParameters;
use crate::payload;
use crate::value::ParamValue;

/// Longest URL the gateway accepts.
pub const MAX_URL_LEN: usize = 200;

/// Longest `fraudData.bypass3DS` value.
pub const MAX_BYPASS_3DS_LEN: usize = 128;

/// Longest `merchantWalletId` value.
pub const MAX_WALLET_ID_LEN: usize = 21;

/// Largest accepted capture delay, in days.
pub const MAX_CAPTURE_DAY: u8 = 9;

/// 3-D Secure message version sent by default.
pub const DEFAULT_MSG_VER: &str = "2.0";

/// `Response` value asking the gateway for an encrypted answer.
pub const RESPONSE_ENCRYPT: &str = "encrypt";

static TRANS_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid TransID pattern"));

/// The parameter set and secrets of one gateway exchange.
#[derive(Debug)]
pub struct Transaction {
    pub(crate) params: TransactionParameters,
    pub(crate) mac_key: MacKey,
    pub(crate) cipher: PayloadCipher,
    url: String,
    /// Inbound names outside the allow-list, as received.
    pub(crate) extra: BTreeMap<String, String>,
    /// Why the last inbound payload could not be read, if it could not.
    pub(crate) inbound_error: Option<String>,
}

impl Transaction {
    /// Creates an engine with its signing secret and encryption secret.
    ///
    /// The endpoint defaults to [`Endpoint::PaySsl`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Cipher`] if the encryption secret is empty or
    /// longer than Blowfish accepts.
    pub fn new(hmac_key: impl Into<Vec<u8>>, crypt_key: impl AsRef<[u8]>) -> Result<Self, GatewayError> {
        Ok(Self {
            params: TransactionParameters::new(),
            mac_key: MacKey::new(hmac_key),
            cipher: PayloadCipher::new(crypt_key.as_ref())?,
            url: Endpoint::default().as_str().to_owned(),
            extra: BTreeMap::new(),
            inbound_error: None,
        })
    }

    /// Clears all parameters and inbound state, keeping the secrets and URL.
    pub fn reset(&mut self) {
        self.params.clear();
        self.extra.clear();
        self.inbound_error = None;
    }

    // Registry access

    /// Stores `value` under `field`.
    pub fn set_param(&mut self, field: Field, value: impl Into<ParamValue>) {
        self.params.set(field, value);
    }

    /// Stores `value` under the field named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownField`] if `name` is not allow-listed.
    pub fn set_param_named(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<(), GatewayError> {
        self.params.set_named(name, value)
    }

    /// Returns the value under `field`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingField`] if the field was never set.
    pub fn param(&self, field: Field) -> Result<&ParamValue, GatewayError> {
        self.params.get(field)
    }

    /// Returns the value under the field named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownField`] or [`GatewayError::MissingField`].
    pub fn param_named(&self, name: &str) -> Result<&ParamValue, GatewayError> {
        self.params.get_named(name)
    }

    /// Returns every stored parameter.
    #[must_use]
    pub const fn params(&self) -> &TransactionParameters {
        &self.params
    }

    /// Checks that every required field is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RequiredFieldEmpty`] for the first empty one.
    pub fn validate_required(&self) -> Result<(), GatewayError> {
        self.params.validate_required()
    }

    // Typed setters

    /// Sets `MerchantID`.
    pub fn set_merchant_id(&mut self, merchant_id: impl Into<String>) {
        self.params.set(Field::MerchantId, merchant_id.into());
    }

    /// Sets `TransID`, which may only contain ASCII letters, digits, `_`
    /// and `-`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] for any other character or an
    /// empty id.
    pub fn set_trans_id(&mut self, trans_id: &str) -> Result<(), GatewayError> {
        if !TRANS_ID.is_match(trans_id) {
            return Err(GatewayError::invalid(
                "TransID",
                "TransactionReference cannot contain special characters",
            ));
        }
        self.params.set(Field::TransId, trans_id);
        Ok(())
    }

    /// Sets `Amount` in minor currency units, e.g. EUR 12.34 as `1234`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] unless `amount` is positive.
    pub fn set_amount(&mut self, amount: i64) -> Result<(), GatewayError> {
        if amount <= 0 {
            return Err(GatewayError::invalid("Amount", "Amount must be a positive number"));
        }
        self.params.set(Field::Amount, amount);
        Ok(())
    }

    /// Sets `Amount` from a decimal order total, truncated to minor units.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] unless the total converts to a
    /// positive amount.
    pub fn set_total(&mut self, total: Decimal) -> Result<(), GatewayError> {
        self.set_amount(amount::to_minor_units(total)?)
    }

    /// Sets `Currency` to an ISO 4217 code.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] unless the code is 3 bytes.
    pub fn set_currency(&mut self, currency: &str) -> Result<(), GatewayError> {
        if currency.len() != 3 {
            return Err(GatewayError::invalid("Currency", "Currency must be ISO 4217"));
        }
        self.params.set(Field::Currency, currency);
        Ok(())
    }

    /// Sets `Language`, lower-cased, falling back to [`DEFAULT_LANGUAGE`]
    /// for languages the payment page does not offer.
    pub fn set_language(&mut self, language: &str) {
        let language = language.to_lowercase();
        let language = if LANGUAGES.contains(&language.as_str()) {
            language
        } else {
            DEFAULT_LANGUAGE.to_owned()
        };
        self.params.set(Field::Language, language);
    }

    /// Sets `OrderDesc`.
    pub fn set_order_desc(&mut self, description: impl Into<String>) {
        self.params.set(Field::OrderDesc, description.into());
    }

    /// Sets `RefNr`, the merchant's own reference.
    pub fn set_ref_nr(&mut self, ref_nr: impl Into<ParamValue>) {
        self.params.set(Field::RefNr, ref_nr);
    }

    /// Sets `URLSuccess`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] for invalid or overlong URLs.
    pub fn set_url_success(&mut self, url: &str) -> Result<(), GatewayError> {
        self.set_url_field(Field::UrlSuccess, url)
    }

    /// Sets `URLFailure`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] for invalid or overlong URLs.
    pub fn set_url_failure(&mut self, url: &str) -> Result<(), GatewayError> {
        self.set_url_field(Field::UrlFailure, url)
    }

    /// Sets `URLNotify`, the webhook target.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] for invalid or overlong URLs.
    pub fn set_url_notify(&mut self, url: &str) -> Result<(), GatewayError> {
        self.set_url_field(Field::UrlNotify, url)
    }

    /// Sets `URLBack`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] for invalid or overlong URLs.
    pub fn set_url_back(&mut self, url: &str) -> Result<(), GatewayError> {
        self.set_url_field(Field::UrlBack, url)
    }

    fn set_url_field(&mut self, field: Field, url: &str) -> Result<(), GatewayError> {
        validate_url(field.as_str(), url)?;
        self.params.set(field, url);
        Ok(())
    }

    /// Sets the gateway URL the request is sent to.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] for invalid or overlong URLs.
    pub fn set_url(&mut self, url: &str) -> Result<(), GatewayError> {
        validate_url("url", url)?;
        url.clone_into(&mut self.url);
        Ok(())
    }

    /// Targets one of the fixed gateway endpoints.
    pub fn set_endpoint(&mut self, endpoint: Endpoint) {
        endpoint.as_str().clone_into(&mut self.url);
    }

    /// Returns the gateway URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sets `captureDay`, the deferred capture delay.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] above [`MAX_CAPTURE_DAY`].
    pub fn set_capture_day(&mut self, days: u8) -> Result<(), GatewayError> {
        if days > MAX_CAPTURE_DAY {
            return Err(GatewayError::invalid("captureDay", "captureDay is too long"));
        }
        self.params.set(Field::CaptureDay, i64::from(days));
        Ok(())
    }

    /// Sets `fraudData.bypass3DS`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] above [`MAX_BYPASS_3DS_LEN`]
    /// bytes.
    pub fn set_fraud_data_bypass_3ds(&mut self, value: &str) -> Result<(), GatewayError> {
        if value.len() > MAX_BYPASS_3DS_LEN {
            return Err(GatewayError::invalid(
                "fraudData.bypass3DS",
                "fraudData.bypass3DS is too long",
            ));
        }
        self.params.set(Field::FraudDataBypass3Ds, value);
        Ok(())
    }

    /// Sets `merchantWalletId` for one-click payments.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] above [`MAX_WALLET_ID_LEN`]
    /// bytes.
    pub fn set_merchant_wallet_id(&mut self, wallet: &str) -> Result<(), GatewayError> {
        if wallet.len() > MAX_WALLET_ID_LEN {
            return Err(GatewayError::invalid(
                "merchantWalletId",
                "merchantWalletId is too long",
            ));
        }
        self.params.set(Field::MerchantWalletId, wallet);
        Ok(())
    }

    /// Sets `MsgVer`; see [`DEFAULT_MSG_VER`].
    pub fn set_msg_ver(&mut self, version: &str) {
        self.params.set(Field::MsgVer, version);
    }

    /// Sets `Response`; see [`RESPONSE_ENCRYPT`].
    pub fn set_response_param(&mut self, response: &str) {
        self.params.set(Field::Response, response);
    }

    /// Sets the structured `billingAddress`.
    pub fn set_billing_address(&mut self, address: serde_json::Value) {
        self.params.set(Field::BillingAddress, ParamValue::Structured(address));
    }

    /// Sets the structured `shippingAddress`.
    pub fn set_shipping_address(&mut self, address: serde_json::Value) {
        self.params.set(Field::ShippingAddress, ParamValue::Structured(address));
    }

    /// Sets the structured `billToCustomer`.
    pub fn set_bill_to_customer(&mut self, customer: serde_json::Value) {
        self.params.set(Field::BillToCustomer, ParamValue::Structured(customer));
    }

    /// Sets the structured `shipToCustomer`.
    pub fn set_ship_to_customer(&mut self, customer: serde_json::Value) {
        self.params.set(Field::ShipToCustomer, ParamValue::Structured(customer));
    }

    /// Sets the structured `Card` data.
    pub fn set_card(&mut self, card: serde_json::Value) {
        self.params.set(Field::Card, ParamValue::Structured(card));
    }

    // Outbound

    /// Signs the request fields and stores the digest under `MAC`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RequiredFieldEmpty`] if a required field is
    /// empty.
    pub fn sign_request(&mut self) -> Result<String, GatewayError> {
        self.params.validate_required()?;
        let mac = self.mac_key.sign_fields(&self.params, REQUEST_MAC_FIELDS);
        self.params.set(Field::Mac, mac.clone());

        #[cfg(feature = "telemetry")]
        tracing::debug!(fields = REQUEST_MAC_FIELDS.len(), "axepta.request_signed");

        Ok(mac)
    }

    /// Serializes the payload fields, encrypts them and stores the results
    /// under `Debug` (plaintext), `Len` (byte length) and `Data` (hex
    /// ciphertext). Returns the hex ciphertext.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RequiredFieldEmpty`] if a required field is
    /// empty.
    pub fn encrypt_payload(&mut self) -> Result<String, GatewayError> {
        self.params.validate_required()?;
        let body = payload::compose(&self.params, PAYLOAD_FIELDS);
        let len = i64::try_from(body.len())
            .map_err(|_| GatewayError::invalid("Len", "payload is too large"))?;
        let data = self.cipher.encrypt_hex(&body);

        #[cfg(feature = "telemetry")]
        tracing::debug!(len, "axepta.payload_encrypted");

        self.params.set(Field::Debug, body);
        self.params.set(Field::Len, len);
        self.params.set(Field::Data, data.clone());
        Ok(data)
    }

    /// Returns the plaintext payload length recorded by
    /// [`encrypt_payload`](Self::encrypt_payload).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::LengthMissing`] before an encryption pass.
    pub fn payload_len(&self) -> Result<i64, GatewayError> {
        self.params
            .non_empty(Field::Len)
            .and_then(ParamValue::as_integer)
            .ok_or(GatewayError::LengthMissing)
    }

    /// Returns the plaintext of the last payload built or received, or an
    /// empty string.
    #[must_use]
    pub fn debug(&self) -> &str {
        self.params.text(Field::Debug).unwrap_or_default()
    }
}

fn validate_url(field: &'static str, url: &str) -> Result<(), GatewayError> {
    let parsed = Url::parse(url).map_err(|_| GatewayError::invalid(field, "Uri is not valid"))?;
    if parsed.cannot_be_a_base() {
        return Err(GatewayError::invalid(field, "Uri is not valid"));
    }
    if url.len() > MAX_URL_LEN {
        return Err(GatewayError::invalid(field, "Uri is too long"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::PayloadCipher;
    use serde_json::json;

    fn engine() -> Transaction {
        Transaction::new("hmac-secret", "0123456789").unwrap()
    }

    fn populated() -> Transaction {
        let mut tx = engine();
        tx.set_merchant_id("M1");
        tx.set_trans_id("ORDER-42").unwrap();
        tx.set_amount(1000).unwrap();
        tx.set_currency("EUR").unwrap();
        tx.set_order_desc("Test");
        tx
    }

    #[test]
    fn test_new_rejects_empty_crypt_key() {
        assert!(matches!(
            Transaction::new("hmac", ""),
            Err(GatewayError::Cipher(_))
        ));
    }

    #[test]
    fn test_trans_id_character_class() {
        let mut tx = engine();
        assert!(tx.set_trans_id("abc_XYZ-019").is_ok());
        for bad in ["", "a b", "order#1", "é", "a/b", "a.b"] {
            assert!(
                matches!(tx.set_trans_id(bad), Err(GatewayError::InvalidInput { field: "TransID", .. })),
                "{bad:?} accepted"
            );
        }
        assert_eq!(tx.param(Field::TransId).unwrap().as_text(), Some("abc_XYZ-019"));
    }

    #[test]
    fn test_amount_must_be_positive() {
        let mut tx = engine();
        assert!(tx.set_amount(0).is_err());
        assert!(tx.set_amount(-5).is_err());
        tx.set_amount(1).unwrap();
        assert_eq!(tx.param(Field::Amount).unwrap(), &ParamValue::Integer(1));
    }

    #[test]
    fn test_set_total_truncates_to_minor_units() {
        let mut tx = engine();
        tx.set_total(rust_decimal_macros::dec!(19.999)).unwrap();
        assert_eq!(tx.param(Field::Amount).unwrap(), &ParamValue::Integer(1999));
        assert!(tx.set_total(rust_decimal_macros::dec!(0.004)).is_err());
    }

    #[test]
    fn test_currency_length() {
        let mut tx = engine();
        assert!(tx.set_currency("EU").is_err());
        assert!(tx.set_currency("EURO").is_err());
        tx.set_currency("USD").unwrap();
    }

    #[test]
    fn test_language_lowercases_and_falls_back() {
        let mut tx = engine();
        tx.set_language("FR");
        assert_eq!(tx.param(Field::Language).unwrap().as_text(), Some("fr"));
        tx.set_language("pt");
        assert_eq!(tx.param(Field::Language).unwrap().as_text(), Some("en"));
    }

    #[test]
    fn test_url_setters_validate() {
        let mut tx = engine();
        tx.set_url_success("https://shop.example/axepta/success").unwrap();
        tx.set_url_notify("https://shop.example/axepta/webhook?x=1").unwrap();

        assert!(tx.set_url_failure("not a url").is_err());
        assert!(tx.set_url_failure("/relative/path").is_err());
        assert!(tx.set_url_back("mailto:someone@example.com").is_err());

        let long = format!("https://shop.example/{}", "a".repeat(MAX_URL_LEN));
        assert!(matches!(
            tx.set_url_back(&long),
            Err(GatewayError::InvalidInput { reason: "Uri is too long", .. })
        ));
        assert!(!tx.params().contains(Field::UrlBack));
    }

    #[test]
    fn test_endpoint_url() {
        let mut tx = engine();
        assert_eq!(tx.url(), crate::endpoint::PAYSSL_URL);
        tx.set_endpoint(Endpoint::Direct);
        assert_eq!(tx.url(), crate::endpoint::DIRECT_URL);
        tx.set_url("https://test.example/payssl.aspx").unwrap();
        assert_eq!(tx.url(), "https://test.example/payssl.aspx");
        assert!(tx.set_url("payssl.aspx").is_err());
    }

    #[test]
    fn test_length_limited_setters() {
        let mut tx = engine();
        tx.set_capture_day(9).unwrap();
        assert!(tx.set_capture_day(10).is_err());

        tx.set_fraud_data_bypass_3ds(&"x".repeat(128)).unwrap();
        assert!(tx.set_fraud_data_bypass_3ds(&"x".repeat(129)).is_err());

        tx.set_merchant_wallet_id(&"w".repeat(21)).unwrap();
        assert!(tx.set_merchant_wallet_id(&"w".repeat(22)).is_err());
    }

    #[test]
    fn test_set_param_named_rejects_unknown() {
        let mut tx = engine();
        tx.set_param_named("UserData", "abc").unwrap();
        assert!(matches!(
            tx.set_param_named("userdata", "abc"),
            Err(GatewayError::UnknownField(_))
        ));
        assert!(matches!(
            tx.param_named("PayID"),
            Err(GatewayError::MissingField(Field::PayId))
        ));
    }

    #[test]
    fn test_sign_request_requires_fields() {
        let mut tx = engine();
        tx.set_merchant_id("M1");
        assert!(matches!(
            tx.sign_request(),
            Err(GatewayError::RequiredFieldEmpty(Field::TransId))
        ));
        assert!(!tx.params().contains(Field::Mac));
    }

    #[test]
    fn test_sign_request_scenario() {
        let mut tx = populated();
        let mac = tx.sign_request().unwrap();
        assert_eq!(mac.len(), 64);
        assert!(mac.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(tx.param(Field::Mac).unwrap().as_text(), Some(mac.as_str()));
        assert_eq!(tx.sign_request().unwrap(), mac);

        let expected = MacKey::new("hmac-secret").sign("*ORDER-42*M1*1000*EUR");
        assert_eq!(mac, expected);
    }

    #[test]
    fn test_payload_len_before_encryption() {
        let tx = populated();
        assert!(matches!(tx.payload_len(), Err(GatewayError::LengthMissing)));
        assert_eq!(tx.debug(), "");
    }

    #[test]
    fn test_encrypt_payload_records_debug_len_and_data() {
        let mut tx = populated();
        tx.set_ref_nr("100000042");
        let data = tx.encrypt_payload().unwrap();

        let body = "TransID=ORDER-42&Amount=1000&Currency=EUR&RefNr=100000042&OrderDesc=Test";
        assert_eq!(tx.debug(), body);
        assert_eq!(tx.payload_len().unwrap(), body.len() as i64);
        assert_eq!(tx.param(Field::Data).unwrap().as_text(), Some(data.as_str()));

        let cipher = PayloadCipher::new(b"0123456789").unwrap();
        assert_eq!(cipher.decrypt_hex(&data).unwrap(), body);
    }

    #[test]
    fn test_encrypt_payload_includes_signature_and_structured_fields() {
        let mut tx = populated();
        tx.set_msg_ver(DEFAULT_MSG_VER);
        tx.set_response_param(RESPONSE_ENCRYPT);
        tx.set_billing_address(json!({"city": "Paris"}));
        let mac = tx.sign_request().unwrap();
        tx.encrypt_payload().unwrap();

        let debug = tx.debug();
        assert!(debug.contains(&format!("MAC={mac}")));
        assert!(debug.contains("Response=encrypt"));
        assert!(debug.ends_with("MsgVer=2.0&billingAddress=eyJjaXR5IjoiUGFyaXMifQ=="));
    }

    #[test]
    fn test_encrypt_payload_requires_fields() {
        let mut tx = engine();
        assert!(matches!(
            tx.encrypt_payload(),
            Err(GatewayError::RequiredFieldEmpty(Field::MerchantId))
        ));
    }

    #[test]
    fn test_reset_clears_parameters() {
        let mut tx = populated();
        tx.reset();
        assert!(tx.params().is_empty());
        assert_eq!(tx.url(), crate::endpoint::PAYSSL_URL);
    }
}
