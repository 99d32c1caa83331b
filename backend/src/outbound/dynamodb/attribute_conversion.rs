//! Conversion between [`WireValue`] and the SDK's `AttributeValue`.

use std::collections::HashMap;

use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;

use crate::domain::attribute::{CodecError, Number, WireItem, WireValue};

pub(crate) fn to_sdk(value: &WireValue) -> AttributeValue {
    match value {
        WireValue::String(text) => AttributeValue::S(text.clone()),
        WireValue::Number(number) => AttributeValue::N(number.as_str().to_owned()),
        WireValue::Boolean(flag) => AttributeValue::Bool(*flag),
        WireValue::Null => AttributeValue::Null(true),
        WireValue::Binary(bytes) => AttributeValue::B(Blob::new(bytes.clone())),
        WireValue::StringSet(set) => AttributeValue::Ss(set.iter().cloned().collect()),
        WireValue::NumberSet(set) => {
            AttributeValue::Ns(set.iter().map(|n| n.as_str().to_owned()).collect())
        }
        WireValue::BinarySet(set) => {
            AttributeValue::Bs(set.iter().cloned().map(Blob::new).collect())
        }
        WireValue::List(values) => AttributeValue::L(values.iter().map(to_sdk).collect()),
        WireValue::Map(entries) => AttributeValue::M(to_sdk_item(entries)),
    }
}

pub(crate) fn to_sdk_item(item: &WireItem) -> HashMap<String, AttributeValue> {
    item.iter()
        .map(|(name, value)| (name.clone(), to_sdk(value)))
        .collect()
}

pub(crate) fn from_sdk(value: &AttributeValue) -> Result<WireValue, CodecError> {
    let wire = match value {
        AttributeValue::S(text) => WireValue::String(text.clone()),
        AttributeValue::N(raw) => WireValue::Number(raw.parse()?),
        AttributeValue::Bool(flag) => WireValue::Boolean(*flag),
        AttributeValue::Null(true) => WireValue::Null,
        AttributeValue::Null(false) => {
            return Err(CodecError::malformed_wire_value("`NULL` must hold `true`"));
        }
        AttributeValue::B(blob) => WireValue::Binary(blob.as_ref().to_vec()),
        AttributeValue::Ss(values) => WireValue::StringSet(values.iter().cloned().collect()),
        AttributeValue::Ns(values) => WireValue::NumberSet(
            values
                .iter()
                .map(|raw| raw.parse::<Number>())
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::Bs(values) => {
            WireValue::BinarySet(values.iter().map(|blob| blob.as_ref().to_vec()).collect())
        }
        AttributeValue::L(values) => {
            WireValue::List(values.iter().map(from_sdk).collect::<Result<_, _>>()?)
        }
        AttributeValue::M(entries) => WireValue::Map(from_sdk_item(entries)?),
        other => {
            return Err(CodecError::malformed_wire_value(format!(
                "unrecognised attribute value {other:?}"
            )));
        }
    };
    Ok(wire)
}

pub(crate) fn from_sdk_item(
    item: &HashMap<String, AttributeValue>,
) -> Result<WireItem, CodecError> {
    item.iter()
        .map(|(name, value)| Ok((name.clone(), from_sdk(value)?)))
        .collect()
}
