#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Request and response codec for the Axepta (BNP Paribas) payment gateway.
//!
//! This crate builds the parameters a merchant sends to the gateway and
//! checks the parameters the gateway sends back. It performs no network I/O:
//! callers move the produced strings over HTTP themselves (see the
//! `axepta-http` crate for redirect and callback helpers).
//!
//! # Overview
//!
//! A payment starts with an outbound request. The merchant fills a
//! [`Transaction`] with allow-listed parameters, signs the identifying fields
//! with HMAC-SHA-256 and encrypts the payload with Blowfish. The customer is
//! then redirected to the gateway, which later reports the outcome with a
//! signed, optionally encrypted, response that the merchant verifies with the
//! same engine.
//!
//! # Modules
//!
//! - [`amount`] - Decimal totals to minor currency units
//! - [`cipher`] - Blowfish-ECB payload cipher with key stretching
//! - [`config`] - Merchant settings loaded from TOML
//! - [`endpoint`] - Fixed gateway URLs
//! - [`field`] - The allow-listed parameter names and field orders
//! - [`mac`] - `*`-separated composition and HMAC signing
//! - [`params`] - The per-transaction parameter registry
//! - [`payload`] - The `key=value&...` body inside `Data`
//! - [`response`] - Inbound parsing and verification
//! - [`transaction`] - The transaction engine
//! - [`value`] - Parameter values
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod amount;
pub mod cipher;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod field;
pub mod mac;
pub mod params;
pub mod payload;
pub mod response;
pub mod transaction;
pub mod value;

pub use config::{ConfigError, GatewayConfig};
pub use endpoint::Endpoint;
pub use error::GatewayError;
pub use field::Field;
pub use params::TransactionParameters;
pub use response::PaymentStatus;
pub use transaction::Transaction;
pub use value::ParamValue;
