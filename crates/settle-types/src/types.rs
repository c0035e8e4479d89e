use crate::Entity;
use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of an entity tree
///
/// Serialises untagged, as the plain JSON value. Deserialising tries integers
/// before floats, and strings are never read back as `Date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityValue {
    /// String value
    String(String),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Ordered collection of nodes
    Array(Vec<EntityValue>),
    /// Keyed structure
    Object(Entity),
    /// UTC date/time value
    Date(DateTime<Utc>),
    /// Explicit null. A present `Null` is data; an absent field is not.
    Null,
}

// -------------------------------------------------------------------------------------------------
// Conversions between `EntityValue` and `serde_json::Value`. Hydration results usually arrive as
// JSON documents, so the mapping lives next to the data type.
// -------------------------------------------------------------------------------------------------

impl From<EntityValue> for serde_json::Value {
    fn from(value: EntityValue) -> Self {
        match value {
            EntityValue::String(s) => Self::String(s),
            EntityValue::Integer(i) => Self::Number(serde_json::Number::from(i)),
            EntityValue::Float(f) => {
                serde_json::Number::from_f64(f).map_or(Self::Null, Self::Number)
            }
            EntityValue::Boolean(b) => Self::Bool(b),
            EntityValue::Array(arr) => Self::Array(arr.into_iter().map(Into::into).collect()),
            EntityValue::Object(entity) => Self::Object(
                entity
                    .into_iter()
                    .map(|(k, v)| (k, v.into()))
                    .collect::<serde_json::Map<String, Self>>(),
            ),
            EntityValue::Date(dt) => Self::String(dt.to_rfc3339()),
            EntityValue::Null => Self::Null,
        }
    }
}

impl TryFrom<&serde_json::Value> for EntityValue {
    type Error = anyhow::Error;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            serde_json::Value::String(s) => Self::String(s.clone()),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    return Err(anyhow!("Unsupported number value: {}", n));
                }
            }
            serde_json::Value::Bool(b) => Self::Boolean(*b),
            serde_json::Value::Array(arr) => Self::Array(
                arr.iter().map(Self::from_json).collect::<Result<Vec<_>, _>>()?,
            ),
            serde_json::Value::Object(map) => {
                let mut entity = Entity::new();
                for (k, v) in map {
                    entity.insert(k.clone(), Self::from_json(v)?);
                }
                Self::Object(entity)
            }
            serde_json::Value::Null => Self::Null,
        })
    }
}

impl TryFrom<serde_json::Value> for EntityValue {
    type Error = anyhow::Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

impl std::hash::Hash for EntityValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Self::String(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            Self::Integer(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            Self::Float(f) => {
                2u8.hash(state);
                float_bits(*f).hash(state);
            }
            Self::Boolean(b) => {
                3u8.hash(state);
                b.hash(state);
            }
            Self::Array(arr) => {
                4u8.hash(state);
                arr.hash(state);
            }
            Self::Object(entity) => {
                5u8.hash(state);
                // Sort keys for consistent hashing
                let mut sorted_pairs: Vec<_> = entity.iter().collect();
                sorted_pairs.sort_by_key(|(k, _)| *k);
                for (key, value) in sorted_pairs {
                    key.hash(state);
                    value.hash(state);
                }
            }
            Self::Date(dt) => {
                6u8.hash(state);
                dt.timestamp().hash(state);
            }
            Self::Null => {
                7u8.hash(state);
            }
        }
    }
}

// Identity and equality for floats: `-0.0` equals `0.0` and every NaN equals
// every other NaN, so `Eq` stays reflexive and agrees with `Hash`.
fn float_bits(f: f64) -> u64 {
    if f == 0.0 {
        0.0_f64.to_bits()
    } else if f.is_nan() {
        f64::NAN.to_bits()
    } else {
        f.to_bits()
    }
}

impl PartialEq for EntityValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => float_bits(*a) == float_bits(*b),
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Null, Self::Null) => true,
            _ => false,
        }
    }
}

impl Eq for EntityValue {}

impl fmt::Display for EntityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(fl) => write!(f, "{fl}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Array(arr) => {
                let items: Vec<String> = arr.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Self::Object(entity) => {
                let mut pairs: Vec<String> =
                    entity.iter().map(|(k, v)| format!("\"{k}\": {v}")).collect();
                pairs.sort();
                write!(f, "{{{}}}", pairs.join(", "))
            }
            Self::Date(dt) => write!(f, "\"{}\"", dt.to_rfc3339()),
            Self::Null => write!(f, "null"),
        }
    }
}

impl From<String> for EntityValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for EntityValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for EntityValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for EntityValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for EntityValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<DateTime<Utc>> for EntityValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl From<Entity> for EntityValue {
    fn from(value: Entity) -> Self {
        Self::Object(value)
    }
}

impl From<Vec<EntityValue>> for EntityValue {
    fn from(value: Vec<EntityValue>) -> Self {
        Self::Array(value)
    }
}

impl EntityValue {
    /// Type name used in log lines and error messages
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Date(_) => "date",
            Self::Null => "null",
        }
    }

    /// Arrays and keyed structures are merged recursively; everything else is a leaf
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Object(_))
    }

    /// Whether the value is `Null`
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the string if this is a `String`
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The integer if this is an `Integer`
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Convenience accessor returning an `f64` representation if this value is numeric.
    /// Returns `None` when the variant is not `Integer` or `Float`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Borrow the elements if this is an `Array`
    #[must_use]
    pub fn as_array(&self) -> Option<&[EntityValue]> {
        match self {
            Self::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Borrow the entity if this is an `Object`
    #[must_use]
    pub const fn as_object(&self) -> Option<&Entity> {
        match self {
            Self::Object(entity) => Some(entity),
            _ => None,
        }
    }

    /// Follow a path of field names through nested objects
    #[must_use]
    pub fn pointer(&self, path: &[&str]) -> Option<&EntityValue> {
        path.iter().try_fold(self, |node, key| node.as_object()?.get(key))
    }

    /// The identity of this node when it is a keyed structure carrying `key`
    #[must_use]
    pub fn identity(&self, key: &str) -> Option<&EntityValue> {
        self.as_object()?.identity(key)
    }

    /// Convert a JSON document into an entity tree
    ///
    /// # Errors
    ///
    /// Fails for numbers that fit neither `i64` nor `f64`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        <Self as TryFrom<&serde_json::Value>>::try_from(value)
    }

    /// Parse an RFC 3339 timestamp into a `Date`
    ///
    /// # Errors
    ///
    /// Returns a `chrono::ParseError` if the string cannot be parsed.
    pub fn date_from_iso(iso_string: &str) -> Result<Self, chrono::ParseError> {
        Ok(Self::Date(DateTime::parse_from_rfc3339(iso_string)?.with_timezone(&Utc)))
    }
}
