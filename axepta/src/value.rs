//! Parameter values and their wire rendering.

use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};

use base64::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A value stored under a [`Field`](crate::Field).
///
/// Values are never coerced: an amount set as an integer stays an integer
/// and a currency set as text stays text.
///
/// Structured values (addresses, customer blocks, card data) are rendered on
/// the wire as standard base64 of their compact JSON encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// An integer, e.g. an amount in minor currency units.
    Integer(i64),
    /// Plain text.
    Text(String),
    /// A nested JSON object or array.
    Structured(Value),
}

impl ParamValue {
    /// Returns `true` for values that count as absent when signing,
    /// serializing or checking required fields.
    ///
    /// Empty text, the text `"0"`, integer zero, `null`, and empty JSON
    /// strings, arrays and objects are empty. Inbound values always arrive as
    /// text, so a gateway `Code=0` is left out of the response MAC.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Integer(n) => *n == 0,
            Self::Text(s) => is_empty_text(s),
            Self::Structured(v) => match v {
                Value::Null => true,
                Value::String(s) => is_empty_text(s),
                Value::Array(a) => a.is_empty(),
                Value::Object(o) => o.is_empty(),
                Value::Bool(_) | Value::Number(_) => false,
            },
        }
    }

    /// Returns the text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer content, if this is an integer value.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string the gateway sees for this value.
    #[must_use]
    pub fn to_wire(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            Self::Integer(n) => Cow::Owned(n.to_string()),
            Self::Structured(v) => Cow::Owned(BASE64_STANDARD.encode(v.to_string())),
        }
    }
}

fn is_empty_text(s: &str) -> bool {
    s.is_empty() || s == "0"
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Structured(Value::Number(n)),
            },
            other => Self::Structured(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_emptiness() {
        assert!(ParamValue::from("").is_empty());
        assert!(ParamValue::from(0_i64).is_empty());
        assert!(ParamValue::Structured(Value::Null).is_empty());
        assert!(ParamValue::Structured(json!({})).is_empty());
        assert!(ParamValue::Structured(json!([])).is_empty());

        assert!(ParamValue::from("0").is_empty());
        assert!(ParamValue::Structured(json!("0")).is_empty());

        assert!(!ParamValue::from("00").is_empty());
        assert!(!ParamValue::from(" 0").is_empty());
        assert!(!ParamValue::from(1000_i64).is_empty());
        assert!(!ParamValue::Structured(json!({"city": "Paris"})).is_empty());
    }

    #[test]
    fn test_wire_rendering() {
        assert_eq!(ParamValue::from("EUR").to_wire(), "EUR");
        assert_eq!(ParamValue::from(1000_i64).to_wire(), "1000");
        let address = ParamValue::from(json!({"city": "Paris"}));
        assert_eq!(address.to_wire(), "eyJjaXR5IjoiUGFyaXMifQ==");
    }

    #[test]
    fn test_from_json_value_normalizes_scalars() {
        assert_eq!(ParamValue::from(json!("abc")), ParamValue::Text("abc".into()));
        assert_eq!(ParamValue::from(json!(42)), ParamValue::Integer(42));
        assert_eq!(
            ParamValue::from(json!([1, 2])),
            ParamValue::Structured(json!([1, 2]))
        );
    }

    #[test]
    fn test_untagged_serde() {
        let values: Vec<ParamValue> = serde_json::from_str(r#"[12, "x", {"a": 1}]"#).unwrap();
        assert_eq!(values[0], ParamValue::Integer(12));
        assert_eq!(values[1], ParamValue::Text("x".into()));
        assert_eq!(values[2], ParamValue::Structured(json!({"a": 1})));
    }
}
