//! Typed field readers for decoded store items.
//!
//! Missing or mistyped fields are reported as malformed wire values naming
//! the field.

use chrono::{DateTime, Utc};

use crate::domain::DomainError;
use crate::domain::attribute::{CodecError, Item, NativeValue};

fn malformed(field: &str, expected: &str) -> DomainError {
    CodecError::malformed_wire_value(format!("`{field}` must be {expected}")).into()
}

pub(crate) fn field<'a>(item: &'a Item, name: &str) -> Result<&'a NativeValue, DomainError> {
    item.get(name)
        .ok_or_else(|| CodecError::malformed_wire_value(format!("`{name}` is missing")).into())
}

pub(crate) fn string(item: &Item, name: &str) -> Result<String, DomainError> {
    field(item, name)?
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| malformed(name, "a string"))
}

pub(crate) fn boolean(item: &Item, name: &str) -> Result<bool, DomainError> {
    field(item, name)?
        .as_bool()
        .ok_or_else(|| malformed(name, "a boolean"))
}

pub(crate) fn unsigned(item: &Item, name: &str) -> Result<u32, DomainError> {
    field(item, name)?
        .as_number()
        .and_then(|number| number.to_u64())
        .and_then(|value| u32::try_from(value).ok())
        .ok_or_else(|| malformed(name, "a non-negative 32-bit integer"))
}

pub(crate) fn float(item: &Item, name: &str) -> Result<f64, DomainError> {
    field(item, name)?
        .as_number()
        .and_then(|number| number.to_f64())
        .ok_or_else(|| malformed(name, "a number"))
}

/// Timestamps are stored as ISO-8601 strings and decode as plain strings.
pub(crate) fn timestamp(item: &Item, name: &str) -> Result<DateTime<Utc>, DomainError> {
    parse_timestamp(field(item, name)?, name)
}

/// Absent and null both read as `None`.
pub(crate) fn optional_timestamp(
    item: &Item,
    name: &str,
) -> Result<Option<DateTime<Utc>>, DomainError> {
    match item.get(name) {
        None | Some(NativeValue::Null) => Ok(None),
        Some(value) => parse_timestamp(value, name).map(Some),
    }
}

fn parse_timestamp(value: &NativeValue, name: &str) -> Result<DateTime<Utc>, DomainError> {
    match value {
        NativeValue::Date(at) => Ok(*at),
        NativeValue::String(text) => DateTime::parse_from_rfc3339(text)
            .map(|at| at.with_timezone(&Utc))
            .map_err(|_| malformed(name, "an ISO-8601 timestamp")),
        _ => Err(malformed(name, "an ISO-8601 timestamp")),
    }
}

/// String sets decode as sequences of strings in sorted order.
pub(crate) fn strings(item: &Item, name: &str) -> Result<Vec<String>, DomainError> {
    field(item, name)?
        .as_sequence()
        .and_then(|values| {
            values
                .iter()
                .map(|value| value.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or_else(|| malformed(name, "a set of strings"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use crate::domain::attribute::Number;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn item() -> Item {
        let mut item = Item::new();
        item.insert("name".into(), "Ada".into());
        item.insert("contest".into(), NativeValue::Number(Number::from(3_001_u32)));
        item.insert("createdAt".into(), "2024-01-01T00:00:00.000Z".into());
        item.insert("deletedAt".into(), NativeValue::Null);
        item.insert("numbers".into(), vec!["01".to_owned(), "02".to_owned()].into());
        item
    }

    #[rstest]
    fn reads_typed_fields(item: Item) {
        assert_eq!(string(&item, "name").expect("string"), "Ada");
        assert_eq!(unsigned(&item, "contest").expect("number"), 3_001);
        assert_eq!(
            timestamp(&item, "createdAt").expect("timestamp"),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .expect("valid")
        );
        assert_eq!(optional_timestamp(&item, "deletedAt").expect("null"), None);
        assert_eq!(optional_timestamp(&item, "absent").expect("absent"), None);
        assert_eq!(strings(&item, "numbers").expect("set"), ["01", "02"]);
    }

    #[rstest]
    #[case("missing")]
    #[case("contest")]
    fn wrong_or_missing_fields_are_malformed(item: Item, #[case] name: &str) {
        let err = string(&item, name).expect_err("not a string");
        assert_eq!(err.kind(), ErrorKind::MalformedWireValue);
        assert!(err.message().contains(name));
    }
}
