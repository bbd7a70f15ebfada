//! HTTP-facing constants for the Axepta gateway.

/// Number of `CustomFieldN` slots shown on the hosted payment page.
pub const CUSTOM_FIELD_COUNT: usize = 14;

/// Separator between parts of a custom field value.
pub const CUSTOM_FIELD_SEPARATOR: &str = "|";

/// Replacement for a separator found inside a part.
pub const CUSTOM_FIELD_SEPARATOR_REPLACEMENT: &str = "-";

/// Query parameter carrying the transaction key on the cancel URL.
pub const CANCEL_KEY_PARAM: &str = "o";

/// Random bytes in a transaction key.
pub const KEY_BYTES: usize = 16;
