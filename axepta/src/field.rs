//! Known gateway field names and the ordered field lists of the protocol.
//!
//! [`Field`] is the allow-list: every parameter stored in a
//! [`TransactionParameters`](crate::params::TransactionParameters) is keyed by
//! one of its variants, so an unknown name can only enter through
//! [`Field::from_str`], which rejects it.
//!
//! The field lists below are load-bearing protocol data. The gateway rebuilds
//! the same strings on its side, so their order must not change.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GatewayError;

macro_rules! known_fields {
    ($( $(#[$meta:meta])* $variant:ident => $wire:literal, )+) => {
        /// A parameter name accepted by the gateway.
        ///
        /// Wire names are case-sensitive: [`Field::Mid`] (`MID`) and
        /// [`Field::MidAlias`] (`mid`) are distinct fields.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Field {
            $( $(#[$meta])* $variant, )+
        }

        impl Field {
            /// Every known field, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the exact wire spelling of the field.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl FromStr for Field {
            type Err = GatewayError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(GatewayError::UnknownField(s.to_owned())),
                }
            }
        }
    };
}

known_fields! {
    /// Plaintext of the last payload built or decrypted.
    Debug => "Debug",
    /// Gateway-assigned payment identifier.
    PayId => "PayID",
    /// Merchant transaction identifier.
    TransId => "TransID",
    /// Merchant account identifier.
    MerchantId => "MerchantID",
    /// Amount in minor currency units.
    Amount => "Amount",
    /// ISO 4217 currency code.
    Currency => "Currency",
    /// Hex HMAC-SHA-256 digest.
    Mac => "MAC",
    /// Merchant reference number.
    RefNr => "RefNr",
    /// Amount authenticated by 3-D Secure.
    Amount3D => "Amount3D",
    /// Return URL after a successful payment.
    UrlSuccess => "URLSuccess",
    /// Return URL after a failed payment.
    UrlFailure => "URLFailure",
    /// Asynchronous notification URL.
    UrlNotify => "URLNotify",
    /// Response format requested from the gateway.
    Response => "Response",
    /// Free merchant data echoed back.
    UserData => "UserData",
    /// Capture mode.
    Capture => "Capture",
    /// Order description shown to the customer.
    OrderDesc => "OrderDesc",
    /// Idempotency request identifier.
    ReqId => "ReqID",
    /// Unencrypted passthrough value.
    Plain => "Plain",
    /// Merchant custom value.
    Custom => "Custom",
    /// Payment page expiry.
    ExpirationTime => "expirationTime",
    /// Account verification flag.
    AccVerify => "AccVerify",
    /// Recurring transaction flag.
    Rtf => "RTF",
    /// Card holder statement descriptor.
    ChDesc => "ChDesc",
    /// Byte length of the plaintext payload.
    Len => "Len",
    /// Hex Blowfish ciphertext.
    Data => "Data",
    /// Payment page template.
    Template => "Template",
    /// Payment page language.
    Language => "Language",
    /// Payment page background.
    Background => "Background",
    /// URL of the "back to shop" link.
    UrlBack => "URLBack",
    /// Card brand preselection.
    CcSelect => "CCSelect",
    /// Sub-merchant identifier.
    Mid => "MID",
    /// Lower-case merchant id sent back by the gateway.
    MidAlias => "mid",
    /// Lower-case reference number sent back by the gateway.
    RefNrAlias => "refnr",
    /// 3-D Secure transaction identifier.
    Xid => "XID",
    /// Payment status.
    Status => "Status",
    /// Human readable status description.
    Description => "Description",
    /// Gateway result code.
    Code => "Code",
    /// Pseudo card number.
    PcNr => "PCNr",
    /// Card number.
    CcNr => "CCNr",
    /// Card verification code.
    CcCvc => "CCCVC",
    /// Card brand.
    CcBrand => "CCBrand",
    /// Card expiry (`YYYYMM`).
    CcExpiry => "CCExpiry",
    /// 3-D Secure term URL.
    TermUrl => "TermURL",
    /// Customer browser user agent.
    UserAgent => "UserAgent",
    /// Customer browser accept header.
    HttpAccept => "HTTPAccept",
    /// Subscription identifier.
    AboId => "AboID",
    /// ACS transaction identifier.
    AcsXid => "ACSXID",
    /// Masked card number.
    MaskedPan => "MaskedPan",
    /// Cardholder authentication verification value.
    Cavv => "CAVV",
    /// Electronic commerce indicator.
    Eci => "ECI",
    /// 3-D Secure device data.
    Ddd => "DDD",
    /// Card type.
    Type => "Type",
    /// Passthrough display field 1.
    CustomField1 => "CustomField1",
    /// Passthrough display field 2.
    CustomField2 => "CustomField2",
    /// Passthrough display field 3.
    CustomField3 => "CustomField3",
    /// Passthrough display field 4.
    CustomField4 => "CustomField4",
    /// Passthrough display field 5.
    CustomField5 => "CustomField5",
    /// Passthrough display field 6.
    CustomField6 => "CustomField6",
    /// Passthrough display field 7.
    CustomField7 => "CustomField7",
    /// Passthrough display field 8.
    CustomField8 => "CustomField8",
    /// Passthrough display field 9.
    CustomField9 => "CustomField9",
    /// Passthrough display field 10.
    CustomField10 => "CustomField10",
    /// Passthrough display field 11.
    CustomField11 => "CustomField11",
    /// Passthrough display field 12.
    CustomField12 => "CustomField12",
    /// Passthrough display field 13.
    CustomField13 => "CustomField13",
    /// Passthrough display field 14.
    CustomField14 => "CustomField14",
    /// 3-D Secure message version.
    MsgVer => "MsgVer",
    /// Structured billing address.
    BillingAddress => "billingAddress",
    /// Structured shipping address.
    ShippingAddress => "shippingAddress",
    /// Structured billing customer.
    BillToCustomer => "billToCustomer",
    /// Structured shipping customer.
    ShipToCustomer => "shipToCustomer",
    /// Structured card data.
    Card => "Card",
    /// Deferred capture delay in days.
    CaptureDay => "captureDay",
    /// 3-D Secure bypass fraud data.
    FraudDataBypass3Ds => "fraudData.bypass3DS",
    /// One-click wallet identifier.
    MerchantWalletId => "merchantWalletId",
}

impl Field {
    /// The passthrough display fields, `CustomField1` to `CustomField14`.
    pub const CUSTOM_FIELDS: [Self; 14] = [
        Self::CustomField1,
        Self::CustomField2,
        Self::CustomField3,
        Self::CustomField4,
        Self::CustomField5,
        Self::CustomField6,
        Self::CustomField7,
        Self::CustomField8,
        Self::CustomField9,
        Self::CustomField10,
        Self::CustomField11,
        Self::CustomField12,
        Self::CustomField13,
        Self::CustomField14,
    ];

    /// Resolves an inbound raw name, mapping the gateway's `mid` alias to
    /// [`Field::MerchantId`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownField`] for names outside the allow-list.
    pub fn from_inbound(raw: &str) -> Result<Self, GatewayError> {
        if raw == MERCHANT_ID_ALIAS {
            return Ok(Self::MerchantId);
        }
        raw.parse()
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Raw inbound name the gateway uses for the merchant id.
pub const MERCHANT_ID_ALIAS: &str = "mid";

/// Fields signed on an outbound request, in signing order.
pub const REQUEST_MAC_FIELDS: &[Field] = &[
    Field::PayId,
    Field::TransId,
    Field::MerchantId,
    Field::Amount,
    Field::Currency,
];

/// Fields signed by the gateway on a response, in signing order.
pub const RESPONSE_MAC_FIELDS: &[Field] = &[
    Field::PayId,
    Field::TransId,
    Field::MerchantId,
    Field::Status,
    Field::Code,
];

/// Fields serialized into the encrypted payload, in order.
///
/// `Plain` and `Custom` appear twice; the gateway expects both occurrences.
pub const PAYLOAD_FIELDS: &[Field] = &[
    Field::PayId,
    Field::TransId,
    Field::Amount,
    Field::Currency,
    Field::Mac,
    Field::RefNr,
    Field::Amount3D,
    Field::UrlSuccess,
    Field::UrlFailure,
    Field::UrlNotify,
    Field::Response,
    Field::UserData,
    Field::Capture,
    Field::OrderDesc,
    Field::ReqId,
    Field::Plain,
    Field::Custom,
    Field::ExpirationTime,
    Field::AccVerify,
    Field::Rtf,
    Field::ChDesc,
    Field::Mid,
    Field::Xid,
    Field::Status,
    Field::Description,
    Field::Code,
    Field::PcNr,
    Field::CcNr,
    Field::CcCvc,
    Field::CcBrand,
    Field::CcExpiry,
    Field::TermUrl,
    Field::UserAgent,
    Field::HttpAccept,
    Field::AboId,
    Field::AcsXid,
    Field::MaskedPan,
    Field::Cavv,
    Field::Eci,
    Field::Ddd,
    Field::Type,
    Field::Plain,
    Field::Custom,
    Field::MsgVer,
    Field::BillingAddress,
    Field::ShippingAddress,
    Field::BillToCustomer,
    Field::ShipToCustomer,
    Field::Card,
];

/// Fields that must be non-empty before signing or encrypting, checked in
/// this order.
pub const REQUIRED_FIELDS: &[Field] = &[
    Field::MerchantId,
    Field::TransId,
    Field::Amount,
    Field::Currency,
    Field::OrderDesc,
];

/// Payment page languages the gateway accepts.
pub const LANGUAGES: &[&str] = &["nl", "fr", "de", "it", "es", "cy", "en"];

/// Language used when the requested one is not in [`LANGUAGES`].
pub const DEFAULT_LANGUAGE: &str = "en";
