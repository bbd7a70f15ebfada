//! Display values for the hosted payment page.
//!
//! The payment page shows up to fourteen `CustomFieldN` values. Multi-part
//! values are joined with `|`, which the page renders as line breaks, so a
//! `|` inside a part is replaced by `-`.

use rust_decimal::Decimal;

use crate::constants::{CUSTOM_FIELD_SEPARATOR, CUSTOM_FIELD_SEPARATOR_REPLACEMENT};

/// A postal address as shown on the payment page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    /// Company name.
    pub company: Option<String>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Street lines.
    pub street: Vec<String>,
    /// Postal code.
    pub postcode: String,
    /// City.
    pub city: String,
}

/// One ordered product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// Ordered quantity.
    pub quantity: u32,
    /// Product name.
    pub name: String,
}

fn sanitize(part: &str) -> String {
    part.replace(CUSTOM_FIELD_SEPARATOR, CUSTOM_FIELD_SEPARATOR_REPLACEMENT)
}

fn join_parts<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .map(|part| sanitize(part.as_ref()))
        .collect::<Vec<_>>()
        .join(CUSTOM_FIELD_SEPARATOR)
}

/// Renders an address as company, full name, street lines and
/// `postcode city`, skipping blank parts.
#[must_use]
pub fn address(address: &Address) -> String {
    let name = format!("{} {}", address.first_name, address.last_name);
    let locality = format!("{} {}", address.postcode, address.city);

    let parts = address
        .company
        .iter()
        .map(String::as_str)
        .chain([name.trim()])
        .chain(address.street.iter().map(String::as_str))
        .chain([locality.trim()])
        .filter(|part| !part.trim().is_empty());

    join_parts(parts)
}

/// Renders the cart as `x{quantity} - {name}` lines.
#[must_use]
pub fn cart<'a>(lines: impl IntoIterator<Item = &'a CartLine>) -> String {
    join_parts(
        lines
            .into_iter()
            .map(|line| format!("x{} - {}", line.quantity, line.name)),
    )
}

/// Renders an amount in minor units as `12.34 EUR`.
#[must_use]
pub fn total(minor_units: i64, currency: &str) -> String {
    format!("{} {currency}", Decimal::new(minor_units, 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_address() -> Address {
        Address {
            company: Some("Acme | Sons".to_owned()),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            street: vec!["12 rue de la Paix".to_owned(), String::new()],
            postcode: "75002".to_owned(),
            city: "Paris".to_owned(),
        }
    }

    #[test]
    fn test_address_block() {
        assert_eq!(
            address(&sample_address()),
            "Acme - Sons|Ada Lovelace|12 rue de la Paix|75002 Paris"
        );
    }

    #[test]
    fn test_address_without_company_or_locality() {
        let address_value = Address {
            company: None,
            postcode: String::new(),
            city: String::new(),
            ..sample_address()
        };
        assert_eq!(address(&address_value), "Ada Lovelace|12 rue de la Paix");
        assert_eq!(address(&Address::default()), "");
    }

    #[test]
    fn test_cart_lines() {
        let lines = [
            CartLine { quantity: 2, name: "Mug".to_owned() },
            CartLine { quantity: 1, name: "T-shirt | XL".to_owned() },
        ];
        assert_eq!(cart(&lines), "x2 - Mug|x1 - T-shirt - XL");
        assert_eq!(cart(std::iter::empty()), "");
    }

    #[test]
    fn test_total() {
        assert_eq!(total(1000, "EUR"), "10.00 EUR");
        assert_eq!(total(1234, "USD"), "12.34 USD");
        assert_eq!(total(5, "EUR"), "0.05 EUR");
    }
}
