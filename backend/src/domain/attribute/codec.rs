//! Recursive translation between [`NativeValue`] and [`WireValue`].

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};

use super::{CodecError, Item, NativeValue, WireItem, WireValue};

/// ISO-8601 text with millisecond precision and a `Z` suffix.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use lottery_backend::domain::attribute::format_timestamp;
///
/// let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).single().expect("valid");
/// assert_eq!(format_timestamp(&at), "2024-05-01T12:30:00.000Z");
/// ```
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Encode a native value into its wire form.
///
/// Sequences whose elements are all strings, all numbers or all byte strings
/// become sets and lose ordering and duplicates. Empty sequences become empty
/// lists.
pub fn encode(value: &NativeValue) -> WireValue {
    match value {
        NativeValue::Null => WireValue::Null,
        NativeValue::String(text) => WireValue::String(text.clone()),
        NativeValue::Number(number) => WireValue::Number(number.clone()),
        NativeValue::Boolean(flag) => WireValue::Boolean(*flag),
        NativeValue::Date(at) => WireValue::String(format_timestamp(at)),
        NativeValue::Bytes(bytes) => WireValue::Binary(bytes.clone()),
        NativeValue::Sequence(values) => encode_sequence(values),
        NativeValue::Mapping(entries) => WireValue::Map(encode_item(entries)),
    }
}

fn encode_sequence(values: &[NativeValue]) -> WireValue {
    if values.is_empty() {
        return WireValue::List(Vec::new());
    }
    if let Some(set) = collect_set(values, |value| value.as_str().map(str::to_owned)) {
        return WireValue::StringSet(set);
    }
    if let Some(set) = collect_set(values, |value| value.as_number().cloned()) {
        return WireValue::NumberSet(set);
    }
    if let Some(set) = collect_set(values, |value| match value {
        NativeValue::Bytes(bytes) => Some(bytes.clone()),
        _ => None,
    }) {
        return WireValue::BinarySet(set);
    }
    WireValue::List(values.iter().map(encode).collect())
}

fn collect_set<T: Ord>(
    values: &[NativeValue],
    pick: impl Fn(&NativeValue) -> Option<T>,
) -> Option<BTreeSet<T>> {
    values.iter().map(pick).collect()
}

/// Decode a wire value back into a native value.
///
/// Sets decode as sequences in sorted order. Empty sets are rejected because
/// the store never produces them.
pub fn decode(value: &WireValue) -> Result<NativeValue, CodecError> {
    let native = match value {
        WireValue::String(text) => NativeValue::String(text.clone()),
        WireValue::Number(number) => NativeValue::Number(number.clone()),
        WireValue::Boolean(flag) => NativeValue::Boolean(*flag),
        WireValue::Null => NativeValue::Null,
        WireValue::Binary(bytes) => NativeValue::Bytes(bytes.clone()),
        WireValue::StringSet(set) => {
            non_empty(set, "SS")?;
            NativeValue::Sequence(set.iter().cloned().map(NativeValue::String).collect())
        }
        WireValue::NumberSet(set) => {
            non_empty(set, "NS")?;
            NativeValue::Sequence(set.iter().cloned().map(NativeValue::Number).collect())
        }
        WireValue::BinarySet(set) => {
            non_empty(set, "BS")?;
            NativeValue::Sequence(set.iter().cloned().map(NativeValue::Bytes).collect())
        }
        WireValue::List(values) => {
            NativeValue::Sequence(values.iter().map(decode).collect::<Result<_, _>>()?)
        }
        WireValue::Map(entries) => NativeValue::Mapping(decode_item(entries)?),
    };
    Ok(native)
}

fn non_empty<T>(set: &BTreeSet<T>, tag: &str) -> Result<(), CodecError> {
    if set.is_empty() {
        return Err(CodecError::malformed_wire_value(format!(
            "`{tag}` set must not be empty"
        )));
    }
    Ok(())
}

/// Encode every attribute of a record.
pub fn encode_item(item: &Item) -> WireItem {
    item.iter()
        .map(|(name, value)| (name.clone(), encode(value)))
        .collect()
}

/// Decode every attribute of a stored record.
pub fn decode_item(item: &WireItem) -> Result<Item, CodecError> {
    item.iter()
        .map(|(name, value)| Ok((name.clone(), decode(value)?)))
        .collect()
}
