//! Gateway entry points.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Hosted payment page.
pub const PAYSSL_URL: &str = "https://paymentpage.axepta.bnpparibas/payssl.aspx";

/// Server-to-server card payment.
pub const DIRECT_URL: &str = "https://paymentpage.axepta.bnpparibas/direct.aspx";

/// Credit (refund) operations.
pub const CREDIT_URL: &str = "https://paymentpage.axepta.bnpparibas/credit.aspx";

/// One of the gateway's fixed entry points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// The hosted payment page the customer is redirected to.
    #[default]
    PaySsl,
    /// Direct card payment.
    Direct,
    /// Credit operations.
    Credit,
}

impl Endpoint {
    /// Returns the endpoint URL.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PaySsl => PAYSSL_URL,
            Self::Direct => DIRECT_URL,
            Self::Credit => CREDIT_URL,
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
