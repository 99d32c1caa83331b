//! Attribute values exchanged with the document store.
//!
//! [`NativeValue`] is the application-side representation; [`WireValue`] is
//! the tagged union the store accepts. [`encode`] and [`decode`] translate
//! between them and are pure.
//!
//! # Set contract
//!
//! A sequence whose elements are all strings, all numbers or all byte strings
//! is stored as a set. Sets do not keep duplicates or the original order, so
//! such a sequence decodes back sorted and de-duplicated. Only mixed
//! sequences (stored as lists) keep order and duplicates.
//!
//! # Dates
//!
//! [`NativeValue::Date`] is stored as an ISO-8601 string with millisecond
//! precision and decodes back as [`NativeValue::String`].

mod codec;
mod number;
mod serde_bridge;
mod tagged_json;
mod value;

pub use codec::{decode, decode_item, encode, encode_item, format_timestamp};
pub use number::{F64_SIGNIFICANT_DIGITS, Number};
pub use serde_bridge::{from_native, to_native};
pub use value::{Item, NativeValue, WireItem, WireValue};

use crate::domain::ports::define_port_error;

define_port_error! {
    /// Errors raised while converting attribute values.
    pub enum CodecError {
        /// The value has no attribute representation.
        UnsupportedType { type_name: String } =>
            "unsupported type for attribute encoding: {type_name}",
        /// A stored value does not follow the wire format.
        MalformedWireValue { reason: String } => "malformed wire value: {reason}",
    }
}
