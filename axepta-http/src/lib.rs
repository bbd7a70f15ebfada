//! Transport-edge helpers for the Axepta payment gateway.
//!
//! The `axepta` crate produces and verifies gateway parameters; this crate
//! turns them into the redirect URL a customer follows and reads the
//! gateway's callbacks back from raw query strings and form bodies. Neither
//! crate sends requests itself.
//!
//! # Modules
//!
//! - [`allow`] - Customer email allow-list
//! - [`constants`] - Query parameter names and limits
//! - [`custom_fields`] - Display values for the hosted payment page
//! - [`error`] - HTTP edge error types
//! - [`inbound`] - Callback extraction and classification
//! - [`key`] - Random transaction keys and the cancel URL carrying them
//! - [`redirect`] - Redirect URL to the hosted payment page

pub mod allow;
pub mod constants;
pub mod custom_fields;
pub mod error;
pub mod inbound;
pub mod key;
pub mod redirect;

pub use error::HttpError;
pub use inbound::CallbackOutcome;
pub use redirect::RedirectRequest;
