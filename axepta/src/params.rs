//! The parameter registry of one transaction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::field::{Field, REQUIRED_FIELDS};
use crate::value::ParamValue;

/// The key/value set of a single transaction, keyed by allow-listed
/// [`Field`]s.
///
/// Serializes as a JSON object keyed by wire names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionParameters(BTreeMap<Field, ParamValue>);

impl TransactionParameters {
    /// Creates an empty parameter set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Stores `value` under `field`, replacing any previous value.
    pub fn set(&mut self, field: Field, value: impl Into<ParamValue>) {
        self.0.insert(field, value.into());
    }

    /// Stores `value` under the field named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownField`] if `name` is not allow-listed.
    pub fn set_named(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<(), GatewayError> {
        let field = name.parse()?;
        self.set(field, value);
        Ok(())
    }

    /// Returns the value stored under `field`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingField`] if the field was never set.
    pub fn get(&self, field: Field) -> Result<&ParamValue, GatewayError> {
        self.0.get(&field).ok_or(GatewayError::MissingField(field))
    }

    /// Returns the value stored under the field named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownField`] for names outside the
    /// allow-list and [`GatewayError::MissingField`] for unset fields.
    pub fn get_named(&self, name: &str) -> Result<&ParamValue, GatewayError> {
        self.get(name.parse()?)
    }

    /// Returns the value under `field` unless it is unset or empty.
    #[must_use]
    pub fn non_empty(&self, field: Field) -> Option<&ParamValue> {
        self.0.get(&field).filter(|value| !value.is_empty())
    }

    /// Returns the text value under `field`, if set and textual.
    #[must_use]
    pub fn text(&self, field: Field) -> Option<&str> {
        self.0.get(&field).and_then(ParamValue::as_text)
    }

    /// Returns `true` if `field` has been set, even to an empty value.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Removes and returns the value under `field`.
    pub fn remove(&mut self, field: Field) -> Option<ParamValue> {
        self.0.remove(&field)
    }

    /// Checks that every required field holds a non-empty value.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RequiredFieldEmpty`] naming the first empty
    /// field in [`REQUIRED_FIELDS`] order.
    pub fn validate_required(&self) -> Result<(), GatewayError> {
        match REQUIRED_FIELDS.iter().find(|field| self.non_empty(**field).is_none()) {
            Some(field) => Err(GatewayError::RequiredFieldEmpty(*field)),
            None => Ok(()),
        }
    }

    /// Iterates over the stored fields in [`Field`] declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &ParamValue)> {
        self.0.iter().map(|(field, value)| (*field, value))
    }

    /// Returns the number of stored fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no field is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Removes every stored field.
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> TransactionParameters {
        let mut params = TransactionParameters::new();
        params.set(Field::MerchantId, "M1");
        params.set(Field::TransId, "ORDER-42");
        params.set(Field::Amount, 1000_i64);
        params.set(Field::Currency, "EUR");
        params.set(Field::OrderDesc, "Test");
        params
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let mut params = TransactionParameters::new();
        params.set(Field::RefNr, "0001");
        assert_eq!(params.get(Field::RefNr).unwrap(), &ParamValue::from("0001"));

        params.set(Field::RefNr, "0002");
        assert_eq!(params.get(Field::RefNr).unwrap().as_text(), Some("0002"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_get_unset_field_fails() {
        let params = TransactionParameters::new();
        assert!(matches!(
            params.get(Field::PayId),
            Err(GatewayError::MissingField(Field::PayId))
        ));
    }

    #[test]
    fn test_named_access_checks_allow_list() {
        let mut params = TransactionParameters::new();
        params.set_named("Currency", "EUR").unwrap();
        assert_eq!(params.get_named("Currency").unwrap().as_text(), Some("EUR"));

        assert!(matches!(
            params.set_named("Secret", "x"),
            Err(GatewayError::UnknownField(name)) if name == "Secret"
        ));
        assert!(matches!(
            params.get_named("Secret"),
            Err(GatewayError::UnknownField(_))
        ));
        assert!(matches!(
            params.get_named("Amount"),
            Err(GatewayError::MissingField(Field::Amount))
        ));
    }

    #[test]
    fn test_validate_required_accepts_complete_set() {
        assert!(complete().validate_required().is_ok());
    }

    #[test]
    fn test_validate_required_names_first_empty_field() {
        let empty = TransactionParameters::new();
        assert!(matches!(
            empty.validate_required(),
            Err(GatewayError::RequiredFieldEmpty(Field::MerchantId))
        ));

        let mut params = complete();
        params.set(Field::OrderDesc, "");
        params.remove(Field::Amount);
        assert!(matches!(
            params.validate_required(),
            Err(GatewayError::RequiredFieldEmpty(Field::Amount))
        ));
    }

    #[test]
    fn test_non_empty_skips_empty_values() {
        let mut params = TransactionParameters::new();
        params.set(Field::PayId, "");
        assert!(params.contains(Field::PayId));
        assert!(params.non_empty(Field::PayId).is_none());
        assert!(params.non_empty(Field::Code).is_none());
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let json = serde_json::to_value(complete()).unwrap();
        assert_eq!(json["MerchantID"], "M1");
        assert_eq!(json["Amount"], 1000);

        let back: TransactionParameters = serde_json::from_value(json).unwrap();
        assert_eq!(back, complete());
    }
}
