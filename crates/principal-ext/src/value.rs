//! Extension attribute values
//!
//! A closed set of value kinds the directory store understands. A
//! multi-valued attribute is a `Vec<ExtensionValue>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generalized time layout used by Active Directory (`20240131235959.0Z`).
const GENERALIZED_TIME_FORMAT: &str = "%Y%m%d%H%M%S.0Z";

/// A single raw value stored under an extension attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ExtensionValue {
    /// Directory string.
    String(String),
    /// Integer (INTEGER / Large-Integer syntaxes).
    Integer(i64),
    /// Boolean, stored as `TRUE` / `FALSE`.
    Boolean(bool),
    /// Octet string (base64 encoded in JSON).
    Binary(#[serde(with = "base64_bytes")] Vec<u8>),
    /// Generalized time.
    DateTime(DateTime<Utc>),
    /// GUID such as `objectGUID`.
    Guid(Uuid),
}

impl ExtensionValue {
    /// The declared type matching this value's kind.
    pub fn value_type(&self) -> ValueType {
        match self {
            ExtensionValue::String(_) => ValueType::String,
            ExtensionValue::Integer(_) => ValueType::Integer,
            ExtensionValue::Boolean(_) => ValueType::Boolean,
            ExtensionValue::Binary(_) => ValueType::Binary,
            ExtensionValue::DateTime(_) => ValueType::DateTime,
            ExtensionValue::Guid(_) => ValueType::Guid,
        }
    }

    /// Get as a string if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ExtensionValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as an integer if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ExtensionValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as a boolean if this is a boolean value.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            ExtensionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the raw bytes if this is a binary value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ExtensionValue::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            ExtensionValue::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_guid(&self) -> Option<&Uuid> {
        match self {
            ExtensionValue::Guid(g) => Some(g),
            _ => None,
        }
    }

    /// Whether this is the `"*"` wildcard used by presence filters.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, ExtensionValue::String(s) if s == "*")
    }
}

/// Format a timestamp as generalized time.
pub fn to_generalized_time(dt: &DateTime<Utc>) -> String {
    dt.format(GENERALIZED_TIME_FORMAT).to_string()
}

impl std::fmt::Display for ExtensionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtensionValue::String(s) => write!(f, "{s}"),
            ExtensionValue::Integer(i) => write!(f, "{i}"),
            ExtensionValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            ExtensionValue::Binary(b) => write!(
                f,
                "{}",
                base64::Engine::encode(&base64::engine::general_purpose::STANDARD, b)
            ),
            ExtensionValue::DateTime(dt) => write!(f, "{}", to_generalized_time(dt)),
            ExtensionValue::Guid(g) => write!(f, "{g}"),
        }
    }
}

impl From<String> for ExtensionValue {
    fn from(s: String) -> Self {
        ExtensionValue::String(s)
    }
}

impl From<&str> for ExtensionValue {
    fn from(s: &str) -> Self {
        ExtensionValue::String(s.to_string())
    }
}

impl From<i64> for ExtensionValue {
    fn from(i: i64) -> Self {
        ExtensionValue::Integer(i)
    }
}

impl From<i32> for ExtensionValue {
    fn from(i: i32) -> Self {
        ExtensionValue::Integer(i64::from(i))
    }
}

impl From<u32> for ExtensionValue {
    fn from(i: u32) -> Self {
        ExtensionValue::Integer(i64::from(i))
    }
}

impl From<bool> for ExtensionValue {
    fn from(b: bool) -> Self {
        ExtensionValue::Boolean(b)
    }
}

impl From<Vec<u8>> for ExtensionValue {
    fn from(bytes: Vec<u8>) -> Self {
        ExtensionValue::Binary(bytes)
    }
}

impl From<&[u8]> for ExtensionValue {
    fn from(bytes: &[u8]) -> Self {
        ExtensionValue::Binary(bytes.to_vec())
    }
}

impl From<DateTime<Utc>> for ExtensionValue {
    fn from(dt: DateTime<Utc>) -> Self {
        ExtensionValue::DateTime(dt)
    }
}

impl From<Uuid> for ExtensionValue {
    fn from(g: Uuid) -> Self {
        ExtensionValue::Guid(g)
    }
}

/// Declared type of a filter predicate's comparison value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    #[default]
    String,
    Integer,
    Boolean,
    Binary,
    DateTime,
    Guid,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Boolean => "boolean",
            ValueType::Binary => "binary",
            ValueType::DateTime => "datetime",
            ValueType::Guid => "guid",
        };
        write!(f, "{name}")
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
