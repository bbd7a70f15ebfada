//! Gateway callbacks: extraction and classification.
//!
//! The gateway reports a payment on three URLs (`URLSuccess`, `URLFailure`
//! and the `URLNotify` webhook), either as a POST form body or as a query
//! string. The parameters are read with [`extract`], fed to
//! [`Transaction::set_response`] and turned into a [`CallbackOutcome`].

use axepta::Transaction;
use url::form_urlencoded;

/// Decodes an `application/x-www-form-urlencoded` string into ordered
/// pairs. A leading `?` is ignored.
#[must_use]
pub fn parse_form(input: &str) -> Vec<(String, String)> {
    let input = input.strip_prefix('?').unwrap_or(input);
    form_urlencoded::parse(input.as_bytes())
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect()
}

/// Returns the callback parameters, preferring a non-empty POST body over
/// the query string.
#[must_use]
pub fn extract(query: Option<&str>, body: Option<&str>) -> Vec<(String, String)> {
    let from_body = body.map(parse_form).unwrap_or_default();
    if !from_body.is_empty() {
        return from_body;
    }
    query.map(parse_form).unwrap_or_default()
}

/// What a merchant should do with a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Signed by the gateway and successful: settle the order.
    Approved {
        /// Gateway payment id.
        pay_id: Option<String>,
        /// Merchant reference echoed back.
        ref_nr: Option<String>,
    },
    /// Signed by the gateway but not successful: cancel the order.
    Denied {
        /// Gateway payment id.
        pay_id: Option<String>,
        /// Merchant reference echoed back.
        ref_nr: Option<String>,
        /// Short error number, the last four characters of `Code`.
        error_code: Option<String>,
        /// Gateway explanation.
        description: Option<String>,
    },
    /// The signature did not verify; nothing should change.
    Rejected,
}

impl CallbackOutcome {
    /// Classifies the response currently held by `tx`.
    #[must_use]
    pub fn classify(tx: &Transaction) -> Self {
        let pay_id = tx.pay_id().map(str::to_owned);
        let ref_nr = tx.ref_nr().map(str::to_owned);
        let outcome = if !tx.is_valid() {
            Self::Rejected
        } else if tx.is_successful() {
            Self::Approved { pay_id, ref_nr }
        } else {
            Self::Denied {
                pay_id,
                ref_nr,
                error_code: tx.error_code().map(str::to_owned),
                description: tx.description().map(str::to_owned),
            }
        };

        #[cfg(feature = "telemetry")]
        tracing::info!(outcome = outcome.label(), "axepta.callback_classified");

        outcome
    }

    /// Short name of the outcome, for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Approved { .. } => "approved",
            Self::Denied { .. } => "denied",
            Self::Rejected => "rejected",
        }
    }

    /// Returns `"{error_code} - {description}"` for a denial.
    #[must_use]
    pub fn denial_summary(&self) -> Option<String> {
        match self {
            Self::Denied {
                error_code,
                description,
                ..
            } => Some(format!(
                "{} - {}",
                error_code.as_deref().unwrap_or_default(),
                description.as_deref().unwrap_or_default()
            )),
            _ => None,
        }
    }
}

/// Extracts the callback parameters, loads them into `tx` and classifies
/// the result.
pub fn handle_callback(tx: &mut Transaction, query: Option<&str>, body: Option<&str>) -> CallbackOutcome {
    tx.set_response(extract(query, body));
    CallbackOutcome::classify(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axepta::cipher::PayloadCipher;
    use axepta::mac::MacKey;

    const HMAC: &str = "hmac-secret";
    const CRYPT: &str = "0123456789";

    fn engine() -> Transaction {
        Transaction::new(HMAC, CRYPT).unwrap()
    }

    fn encrypted_body(status: &str, code: &str) -> String {
        let mac = MacKey::new(HMAC).sign(&format!("P1*ORDER-42*M1*{status}*{code}"));
        let plain = format!(
            "mid=M1&PayID=P1&TransID=ORDER-42&Status={status}&Code={code}&MAC={mac}&Description=Card declined&refnr=7"
        );
        let data = PayloadCipher::new(CRYPT.as_bytes()).unwrap().encrypt_hex(&plain);
        format!("Data={data}&Len={}", plain.len())
    }

    #[test]
    fn test_parse_form_decodes() {
        assert_eq!(
            parse_form("?a=1&b=x+y%26z&c"),
            vec![
                ("a".to_owned(), "1".to_owned()),
                ("b".to_owned(), "x y&z".to_owned()),
                ("c".to_owned(), String::new()),
            ]
        );
        assert!(parse_form("").is_empty());
    }

    #[test]
    fn test_extract_prefers_body() {
        assert_eq!(extract(Some("a=1"), Some("b=2")), vec![("b".to_owned(), "2".to_owned())]);
        assert_eq!(extract(Some("a=1"), Some("")), vec![("a".to_owned(), "1".to_owned())]);
        assert_eq!(extract(Some("a=1"), None), vec![("a".to_owned(), "1".to_owned())]);
        assert!(extract(None, None).is_empty());
    }

    #[test]
    fn test_approved_callback() {
        let mut tx = engine();
        let outcome = handle_callback(&mut tx, None, Some(&encrypted_body("OK", "00000000")));
        assert_eq!(
            outcome,
            CallbackOutcome::Approved {
                pay_id: Some("P1".to_owned()),
                ref_nr: Some("7".to_owned()),
            }
        );
        assert_eq!(outcome.denial_summary(), None);
    }

    #[test]
    fn test_denied_callback_from_query() {
        let mut tx = engine();
        let query = encrypted_body("FAILED", "21000005");
        let outcome = handle_callback(&mut tx, Some(&query), Some(""));
        assert_eq!(outcome.label(), "denied");
        assert_eq!(outcome.denial_summary().as_deref(), Some("0005 - Card declined"));
    }

    #[test]
    fn test_forged_callback_is_rejected() {
        let mut tx = engine();
        let outcome = handle_callback(
            &mut tx,
            Some("PayID=P1&TransID=ORDER-42&mid=M1&Status=OK&Code=0&MAC=deadbeef"),
            None,
        );
        assert_eq!(outcome, CallbackOutcome::Rejected);
        assert!(tx.is_successful());
    }
}
