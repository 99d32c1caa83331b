//! Conversion between serde data types and [`NativeValue`].
//!
//! Entity mappers use these helpers for nested records instead of building
//! mappings by hand.

use std::any::type_name;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{CodecError, NativeValue, Number, format_timestamp};

/// Convert any serialisable value into a [`NativeValue`].
///
/// Floats are rounded to the codec's declared precision. Values the JSON
/// data model cannot express fail with `UnsupportedType` naming `T`.
///
/// # Examples
/// ```
/// use lottery_backend::domain::attribute::{NativeValue, to_native};
///
/// #[derive(serde::Serialize)]
/// struct Prize { winners: u32 }
///
/// let native = to_native(&Prize { winners: 3 }).expect("serialisable");
/// assert!(matches!(native, NativeValue::Mapping(_)));
/// ```
pub fn to_native<T: Serialize + ?Sized>(value: &T) -> Result<NativeValue, CodecError> {
    let json = serde_json::to_value(value)
        .map_err(|_| CodecError::unsupported_type(type_name::<T>()))?;
    json_to_native(json).map_err(|err| match err {
        CodecError::UnsupportedType { type_name: inner } => {
            CodecError::unsupported_type(format!("{} ({inner})", type_name::<T>()))
        }
        other => other,
    })
}

/// Rebuild a deserialisable value from a [`NativeValue`].
///
/// Failures are reported as `MalformedWireValue` since the input came from
/// the store.
pub fn from_native<T: DeserializeOwned>(value: &NativeValue) -> Result<T, CodecError> {
    serde_json::from_value(native_to_json(value)).map_err(|err| {
        CodecError::malformed_wire_value(format!(
            "cannot read {} from stored value: {err}",
            type_name::<T>()
        ))
    })
}

fn json_to_native(value: Value) -> Result<NativeValue, CodecError> {
    let native = match value {
        Value::Null => NativeValue::Null,
        Value::Bool(flag) => NativeValue::Boolean(flag),
        Value::Number(number) => NativeValue::Number(json_number(&number)?),
        Value::String(text) => NativeValue::String(text),
        Value::Array(values) => NativeValue::Sequence(
            values
                .into_iter()
                .map(json_to_native)
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(entries) => NativeValue::Mapping(
            entries
                .into_iter()
                .map(|(name, value)| Ok((name, json_to_native(value)?)))
                .collect::<Result<_, CodecError>>()?,
        ),
    };
    Ok(native)
}

fn json_number(number: &serde_json::Number) -> Result<Number, CodecError> {
    if let Some(value) = number.as_i64() {
        return Ok(Number::from(value));
    }
    if let Some(value) = number.as_u64() {
        return Ok(Number::from(value));
    }
    let value = number
        .as_f64()
        .ok_or_else(|| CodecError::unsupported_type(format!("json number {number}")))?;
    Number::try_from(value)
}

fn native_to_json(value: &NativeValue) -> Value {
    match value {
        NativeValue::Null => Value::Null,
        NativeValue::String(text) => Value::String(text.clone()),
        NativeValue::Number(number) => number_to_json(number),
        NativeValue::Boolean(flag) => Value::Bool(*flag),
        NativeValue::Date(at) => Value::String(format_timestamp(at)),
        NativeValue::Bytes(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
        NativeValue::Sequence(values) => Value::Array(values.iter().map(native_to_json).collect()),
        NativeValue::Mapping(entries) => Value::Object(
            entries
                .iter()
                .map(|(name, value)| (name.clone(), native_to_json(value)))
                .collect(),
        ),
    }
}

fn number_to_json(number: &Number) -> Value {
    if let Some(value) = number.to_i64() {
        return Value::from(value);
    }
    if let Some(value) = number.to_u64() {
        return Value::from(value);
    }
    number
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map_or_else(|| Value::String(number.as_str().to_owned()), Value::Number)
}
