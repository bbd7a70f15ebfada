//! The `key=value&...` body carried inside the encrypted `Data` field.

use crate::field::{Field, MERCHANT_ID_ALIAS};
use crate::params::TransactionParameters;

/// Serializes the non-empty fields of `params` in `order` as
/// `name=value` pairs joined by `&`.
///
/// Values are written verbatim, without URL encoding; the whole body is
/// encrypted afterwards. Trailing `&` characters are trimmed from the body,
/// including any the last value itself ends with.
#[must_use]
pub fn compose(params: &TransactionParameters, order: &[Field]) -> String {
    let body = order
        .iter()
        .filter_map(|field| {
            params
                .non_empty(*field)
                .map(|value| format!("{}={}", field.as_str(), value.to_wire()))
        })
        .collect::<Vec<_>>()
        .join("&");
    body.trim_end_matches('&').to_owned()
}

/// Splits a decrypted body into `(name, value)` pairs, in order.
///
/// Pairs are separated by `&` and split on the first `=`, so values may
/// contain `=`. A segment without `=` yields an empty value and empty
/// segments are skipped. The gateway's `mid` name is returned as
/// `MerchantID`.
#[must_use]
pub fn parse(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (name, value) = segment.split_once('=').unwrap_or((segment, ""));
            (canonical_name(name).to_owned(), value.to_owned())
        })
        .collect()
}

/// Maps the gateway's `mid` name to `MerchantID`; other names pass through.
#[must_use]
pub fn canonical_name(raw: &str) -> &str {
    if raw == MERCHANT_ID_ALIAS {
        Field::MerchantId.as_str()
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::PAYLOAD_FIELDS;

    #[test]
    fn test_compose_follows_order_and_skips_empty() {
        let mut params = TransactionParameters::new();
        params.set(Field::OrderDesc, "Test");
        params.set(Field::Currency, "EUR");
        params.set(Field::TransId, "ORDER-42");
        params.set(Field::Amount, 1000_i64);
        params.set(Field::PayId, "");
        params.set(Field::MerchantId, "M1");

        assert_eq!(
            compose(&params, PAYLOAD_FIELDS),
            "TransID=ORDER-42&Amount=1000&Currency=EUR&OrderDesc=Test"
        );
    }

    #[test]
    fn test_compose_repeats_duplicated_positions() {
        let mut params = TransactionParameters::new();
        params.set(Field::Plain, "p");
        assert_eq!(compose(&params, PAYLOAD_FIELDS), "Plain=p&Plain=p");
    }

    #[test]
    fn test_compose_trims_trailing_ampersands() {
        let mut params = TransactionParameters::new();
        params.set(Field::TransId, "ORDER-42");
        params.set(Field::MsgVer, "2.0&&");
        assert_eq!(
            compose(&params, PAYLOAD_FIELDS),
            "TransID=ORDER-42&MsgVer=2.0"
        );

        params.set(Field::TransId, "A&B");
        assert!(compose(&params, PAYLOAD_FIELDS).starts_with("TransID=A&B&"));
    }

    #[test]
    fn test_compose_empty_set() {
        assert_eq!(compose(&TransactionParameters::new(), PAYLOAD_FIELDS), "");
    }

    #[test]
    fn test_parse_splits_on_first_equals() {
        let pairs = parse("mid=M1&PayID=abc&UserData=a=b&Flag&&Code=00000000");
        assert_eq!(
            pairs,
            vec![
                ("MerchantID".to_owned(), "M1".to_owned()),
                ("PayID".to_owned(), "abc".to_owned()),
                ("UserData".to_owned(), "a=b".to_owned()),
                ("Flag".to_owned(), String::new()),
                ("Code".to_owned(), "00000000".to_owned()),
            ]
        );
    }

    #[test]
    fn test_parse_empty_body() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("mid"), "MerchantID");
        assert_eq!(canonical_name("MID"), "MID");
        assert_eq!(canonical_name("Status"), "Status");
    }
}
