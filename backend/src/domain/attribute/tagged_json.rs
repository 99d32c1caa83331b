//! Store tagged-JSON representation of [`WireValue`].
//!
//! Every value is an object with exactly one type tag, e.g. `{"S": "x"}` or
//! `{"NS": ["1", "2.5"]}`. Numbers travel as strings; binary data as
//! standard base64.

use std::collections::{BTreeMap, BTreeSet};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::{CodecError, Number, WireValue};

impl WireValue {
    /// Render the value in tagged-JSON form.
    ///
    /// # Examples
    /// ```
    /// use lottery_backend::domain::attribute::WireValue;
    /// use serde_json::json;
    ///
    /// let value = WireValue::Boolean(true);
    /// assert_eq!(value.to_tagged_json(), json!({ "BOOL": true }));
    /// ```
    pub fn to_tagged_json(&self) -> Value {
        let body = match self {
            Self::String(text) => Value::String(text.clone()),
            Self::Number(number) => Value::String(number.as_str().to_owned()),
            Self::Boolean(flag) => Value::Bool(*flag),
            Self::Null => Value::Bool(true),
            Self::Binary(bytes) => Value::String(STANDARD.encode(bytes)),
            Self::StringSet(set) => Value::Array(set.iter().cloned().map(Value::String).collect()),
            Self::NumberSet(set) => Value::Array(
                set.iter()
                    .map(|number| Value::String(number.as_str().to_owned()))
                    .collect(),
            ),
            Self::BinarySet(set) => Value::Array(
                set.iter()
                    .map(|bytes| Value::String(STANDARD.encode(bytes)))
                    .collect(),
            ),
            Self::List(values) => Value::Array(values.iter().map(Self::to_tagged_json).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_tagged_json()))
                    .collect(),
            ),
        };
        let mut object = Map::new();
        object.insert(self.tag().to_owned(), body);
        Value::Object(object)
    }

    /// Parse a tagged-JSON value, enforcing the exactly-one-tag rule.
    pub fn from_tagged_json(value: &Value) -> Result<Self, CodecError> {
        let object = value
            .as_object()
            .ok_or_else(|| CodecError::malformed_wire_value("attribute value must be an object"))?;
        let mut entries = object.iter();
        let (tag, body) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            (None, _) => return Err(CodecError::malformed_wire_value("no type tag")),
            (Some(_), Some(_)) => {
                return Err(CodecError::malformed_wire_value(format!(
                    "expected one type tag, found {}",
                    object.len()
                )));
            }
        };

        let parsed = match tag.as_str() {
            "S" => Self::String(text(tag, body)?.to_owned()),
            "N" => Self::Number(text(tag, body)?.parse::<Number>()?),
            "BOOL" => Self::Boolean(
                body.as_bool()
                    .ok_or_else(|| wrong_body(tag, "a boolean"))?,
            ),
            "NULL" => match body.as_bool() {
                Some(true) => Self::Null,
                _ => return Err(wrong_body(tag, "`true`")),
            },
            "B" => Self::Binary(base64(text(tag, body)?)?),
            "SS" => Self::StringSet(
                array(tag, body)?
                    .iter()
                    .map(|item| text(tag, item).map(str::to_owned))
                    .collect::<Result<BTreeSet<_>, _>>()?,
            ),
            "NS" => Self::NumberSet(
                array(tag, body)?
                    .iter()
                    .map(|item| text(tag, item).and_then(|raw| raw.parse::<Number>()))
                    .collect::<Result<BTreeSet<_>, _>>()?,
            ),
            "BS" => Self::BinarySet(
                array(tag, body)?
                    .iter()
                    .map(|item| base64(text(tag, item)?))
                    .collect::<Result<BTreeSet<_>, _>>()?,
            ),
            "L" => Self::List(
                array(tag, body)?
                    .iter()
                    .map(Self::from_tagged_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            "M" => Self::Map(
                body.as_object()
                    .ok_or_else(|| wrong_body(tag, "an object"))?
                    .iter()
                    .map(|(name, value)| Ok((name.clone(), Self::from_tagged_json(value)?)))
                    .collect::<Result<BTreeMap<_, _>, CodecError>>()?,
            ),
            other => {
                return Err(CodecError::malformed_wire_value(format!(
                    "unrecognised type tag `{other}`"
                )));
            }
        };
        Ok(parsed)
    }
}

fn wrong_body(tag: &str, expected: &str) -> CodecError {
    CodecError::malformed_wire_value(format!("`{tag}` must hold {expected}"))
}

fn text<'a>(tag: &str, body: &'a Value) -> Result<&'a str, CodecError> {
    body.as_str().ok_or_else(|| wrong_body(tag, "a string"))
}

fn array<'a>(tag: &str, body: &'a Value) -> Result<&'a Vec<Value>, CodecError> {
    body.as_array().ok_or_else(|| wrong_body(tag, "an array"))
}

fn base64(encoded: &str) -> Result<Vec<u8>, CodecError> {
    STANDARD
        .decode(encoded)
        .map_err(|err| CodecError::malformed_wire_value(format!("invalid base64: {err}")))
}

impl Serialize for WireValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_tagged_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WireValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_tagged_json(&value).map_err(serde::de::Error::custom)
    }
}
