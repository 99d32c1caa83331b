//! Native and wire attribute value types.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use super::Number;

/// A record as seen by the application: attribute name to native value.
pub type Item = BTreeMap<String, NativeValue>;

/// A record in store form: attribute name to wire value.
pub type WireItem = BTreeMap<String, WireValue>;

/// Application-side attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeValue {
    Null,
    String(String),
    Number(Number),
    Boolean(bool),
    /// Encoded as an ISO-8601 string; decodes back as [`NativeValue::String`].
    Date(DateTime<Utc>),
    Bytes(Vec<u8>),
    Sequence(Vec<NativeValue>),
    Mapping(BTreeMap<String, NativeValue>),
}

impl NativeValue {
    /// Byte-string value.
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(value.into())
    }

    /// Name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::Date(_) => "date",
            Self::Bytes(_) => "bytes",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[NativeValue]> {
        match self {
            Self::Sequence(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, NativeValue>> {
        match self {
            Self::Mapping(values) => Some(values),
            _ => None,
        }
    }
}

impl From<&str> for NativeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for NativeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for NativeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Number> for NativeValue {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<DateTime<Utc>> for NativeValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl From<Vec<NativeValue>> for NativeValue {
    fn from(value: Vec<NativeValue>) -> Self {
        Self::Sequence(value)
    }
}

impl From<Vec<String>> for NativeValue {
    fn from(value: Vec<String>) -> Self {
        Self::Sequence(value.into_iter().map(Self::String).collect())
    }
}

impl From<Item> for NativeValue {
    fn from(value: Item) -> Self {
        Self::Mapping(value)
    }
}

impl<T: Into<NativeValue>> From<Option<T>> for NativeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

macro_rules! native_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for NativeValue {
                fn from(value: $ty) -> Self {
                    Self::Number(Number::from(value))
                }
            }
        )*
    };
}

native_from_integer!(i32, i64, u32, u64, usize);

/// Store-side attribute value: a tagged union with exactly one variant.
///
/// ## Invariants
/// - Set variants are homogeneous by construction and never empty when
///   produced by the codec.
/// - Map keys are unique by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    String(String),
    Number(Number),
    Boolean(bool),
    Null,
    Binary(Vec<u8>),
    StringSet(BTreeSet<String>),
    NumberSet(BTreeSet<Number>),
    BinarySet(BTreeSet<Vec<u8>>),
    List(Vec<WireValue>),
    Map(BTreeMap<String, WireValue>),
}

impl WireValue {
    /// Store type tag of this variant (`S`, `N`, `BOOL`, ...).
    pub fn tag(&self) -> &'static str {
        match self {
            Self::String(_) => "S",
            Self::Number(_) => "N",
            Self::Boolean(_) => "BOOL",
            Self::Null => "NULL",
            Self::Binary(_) => "B",
            Self::StringSet(_) => "SS",
            Self::NumberSet(_) => "NS",
            Self::BinarySet(_) => "BS",
            Self::List(_) => "L",
            Self::Map(_) => "M",
        }
    }
}
