//! Merchant configuration.
//!
//! Loads the merchant account settings from a TOML file with support for
//! environment variable expansion in string values. Variables use `$VAR` or
//! `${VAR}` syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! merchant_id = "BNP_DEMO_AXEPTA"
//! hmac_key = "$AXEPTA_HMAC"
//! crypt_key = "${AXEPTA_BLOWFISH}"
//! endpoint = "payssl"
//! language = "fr"
//! order_desc = "Demo shop order"
//! allowed_emails = ["qa@shop.example"]
//! ```
//!
//! # Environment Variables
//!
//! - `AXEPTA_CONFIG`: path to the configuration file (default: `axepta.toml`)
//! - `AXEPTA_MERCHANT_ID`, `AXEPTA_HMAC_KEY`, `AXEPTA_CRYPT_KEY`: override
//!   the file values
//! - any variable referenced by `$VAR` in the file

use std::fmt::{self, Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Deserialize;

use crate::endpoint::Endpoint;
use crate::error::GatewayError;
use crate::field::DEFAULT_LANGUAGE;
use crate::transaction::Transaction;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_VAR: &str = "AXEPTA_CONFIG";

/// Configuration file used when [`CONFIG_PATH_VAR`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "axepta.toml";

const MERCHANT_ID_VAR: &str = "AXEPTA_MERCHANT_ID";
const HMAC_KEY_VAR: &str = "AXEPTA_HMAC_KEY";
const CRYPT_KEY_VAR: &str = "AXEPTA_CRYPT_KEY";

static ENV_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("Invalid environment reference pattern")
});

/// Errors raised while loading the configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The configuration is not valid TOML for [`GatewayConfig`].
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A mandatory setting is empty after expansion and overrides.
    #[error("missing setting: {0}")]
    MissingSetting(&'static str),
}

/// Merchant account settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Merchant identifier assigned by the gateway.
    pub merchant_id: String,

    /// HMAC signing secret.
    pub hmac_key: String,

    /// Blowfish encryption secret.
    pub crypt_key: String,

    /// Gateway entry point (default: `payssl`).
    pub endpoint: Endpoint,

    /// Full gateway URL, e.g. a test environment. Takes precedence over
    /// `endpoint`.
    pub url: Option<String>,

    /// Payment page language (default: `en`).
    pub language: String,

    /// Order description sent with every request.
    pub order_desc: Option<String>,

    /// Customer emails allowed to use the gateway. Empty means everyone.
    pub allowed_emails: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            merchant_id: String::new(),
            hmac_key: String::new(),
            crypt_key: String::new(),
            endpoint: Endpoint::default(),
            url: None,
            language: DEFAULT_LANGUAGE.to_owned(),
            order_desc: None,
            allowed_emails: Vec::new(),
        }
    }
}

impl Debug for GatewayConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("merchant_id", &self.merchant_id)
            .field("hmac_key", &"[REDACTED]")
            .field("crypt_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("url", &self.url)
            .field("language", &self.language)
            .field("order_desc", &self.order_desc)
            .field("allowed_emails", &self.allowed_emails)
            .finish()
    }
}

impl GatewayConfig {
    /// Loads configuration from the path given by `AXEPTA_CONFIG`, falling
    /// back to `axepta.toml` in the current directory.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed, or if
    /// the merchant id or a secret ends up empty.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        Self::load_from(path)
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file is treated as empty, leaving the environment overrides
    /// to supply every setting.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed, or if
    /// the merchant id or a secret ends up empty.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = if path.exists() {
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            String::new()
        };

        #[cfg(feature = "telemetry")]
        tracing::debug!(path = %path.display(), found = !content.is_empty(), "axepta.config_loading");

        Self::parse_with(&content, |name| std::env::var(name).ok())
    }

    /// Parses `content`, expanding variables and applying overrides through
    /// `lookup` instead of the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] on invalid TOML or missing settings.
    pub fn parse_with<F>(content: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = expand_vars(content, &lookup);
        let mut config: Self = toml::from_str(&expanded)?;

        for (var, target) in [
            (MERCHANT_ID_VAR, &mut config.merchant_id),
            (HMAC_KEY_VAR, &mut config.hmac_key),
            (CRYPT_KEY_VAR, &mut config.crypt_key),
        ] {
            if let Some(value) = lookup(var).filter(|value| !value.is_empty()) {
                *target = value;
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.merchant_id.is_empty() {
            return Err(ConfigError::MissingSetting("merchant_id"));
        }
        if self.hmac_key.is_empty() {
            return Err(ConfigError::MissingSetting("hmac_key"));
        }
        if self.crypt_key.is_empty() {
            return Err(ConfigError::MissingSetting("crypt_key"));
        }
        Ok(())
    }

    /// Returns the gateway URL requests go to.
    #[must_use]
    pub fn gateway_url(&self) -> &str {
        self.url.as_deref().unwrap_or_else(|| self.endpoint.as_str())
    }

    /// Builds a transaction preloaded with the merchant id, language, order
    /// description and gateway URL.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the encryption secret or the URL is
    /// rejected.
    pub fn transaction(&self) -> Result<Transaction, GatewayError> {
        let mut tx = Transaction::new(self.hmac_key.as_bytes(), &self.crypt_key)?;
        tx.set_merchant_id(self.merchant_id.as_str());
        tx.set_language(&self.language);
        tx.set_endpoint(self.endpoint);
        if let Some(url) = &self.url {
            tx.set_url(url)?;
        }
        if let Some(order_desc) = &self.order_desc {
            tx.set_order_desc(order_desc.as_str());
        }
        Ok(tx)
    }
}

/// Expands `$VAR` and `${VAR}` references through `lookup`.
///
/// Unresolved references are left as-is.
fn expand_vars<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ENV_REFERENCE
        .replace_all(input, |caps: &Captures<'_>| {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            lookup(name).unwrap_or_else(|| caps[0].to_owned())
        })
        .into_owned()
}
