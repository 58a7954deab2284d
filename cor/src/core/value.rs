//! Dynamic values consumed and produced by field operations.

use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::tag::Tag;
use crate::record::Record;

/// Ordered field-name to value mapping.
///
/// Used both for construction input and for record field storage.
pub type Fields = IndexMap<String, Value>;

/// A user-defined scalar carried through records untouched.
///
/// Implement this for domain values produced by custom conversions (addresses,
/// identifiers, ...) so they can live inside a [`Value`].
pub trait CustomValue: fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Name of the concrete type, used for diagnostics.
    fn type_name(&self) -> &str;

    /// Access to the concrete value for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Basic representation of the value.
    fn to_basic(&self) -> serde_json::Value {
        serde_json::Value::String(self.to_string())
    }

    /// Equality against another custom value.
    fn eq_value(&self, other: &dyn CustomValue) -> bool {
        self.type_name() == other.type_name() && self.to_string() == other.to_string()
    }
}

/// Discriminant of a [`Value`], checked by type guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// The null sentinel.
    Null,
    /// Boolean.
    Bool,
    /// Signed integer.
    Int,
    /// Floating point number.
    Float,
    /// UTF-8 string.
    Str,
    /// Raw bytes.
    Bytes,
    /// Ordered list of values.
    List,
    /// Ordered mapping.
    Map,
    /// Enumerated constant.
    Tag,
    /// Sealed record instance.
    Record,
    /// User-defined scalar.
    Custom,
}

impl ValueKind {
    /// Returns the short type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Bytes => "bytes",
            Self::List => "list",
            Self::Map => "map",
            Self::Tag => "tag",
            Self::Record => "record",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dynamically typed value.
#[derive(Debug, Clone)]
pub enum Value {
    /// The null sentinel.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Ordered mapping.
    Map(Fields),
    /// Enumerated constant.
    Tag(Tag),
    /// Sealed record instance.
    Record(Record),
    /// User-defined scalar.
    Custom(Arc<dyn CustomValue>),
}

impl Value {
    /// Wraps a user-defined scalar.
    #[must_use]
    pub fn custom(value: impl CustomValue) -> Self {
        Self::Custom(Arc::new(value))
    }

    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Str(_) => ValueKind::Str,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::List(_) => ValueKind::List,
            Self::Map(_) => ValueKind::Map,
            Self::Tag(_) => ValueKind::Tag,
            Self::Record(_) => ValueKind::Record,
            Self::Custom(_) => ValueKind::Custom,
        }
    }

    /// Returns true for the null sentinel.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Truthiness: null, false, zero and empty containers are falsy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Bytes(b) => !b.is_empty(),
            Self::List(l) => !l.is_empty(),
            Self::Map(m) => !m.is_empty(),
            Self::Record(r) => !r.is_empty(),
            Self::Tag(_) | Self::Custom(_) => true,
        }
    }

    /// Returns true for values usable as an input mapping.
    #[must_use]
    pub const fn is_mapping(&self) -> bool {
        matches!(self, Self::Map(_) | Self::Record(_))
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer, if this is one.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the number as a float, if this is an int or a float.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the string slice, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the list, if this is one.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the mapping, if this is one.
    #[must_use]
    pub const fn as_map(&self) -> Option<&Fields> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the tag, if this is one.
    #[must_use]
    pub const fn as_tag(&self) -> Option<&Tag> {
        match self {
            Self::Tag(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the record, if this is one.
    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Downcasts a custom value to its concrete type.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Self::Custom(c) => c.as_any().downcast_ref(),
            _ => None,
        }
    }

    /// Copies the entries of a mapping-like value (a map or a record).
    #[must_use]
    pub fn to_fields(&self) -> Option<Fields> {
        match self {
            Self::Map(m) => Some(m.clone()),
            Self::Record(r) => Some(r.to_fields()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    #[allow(clippy::cast_precision_loss, clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => *a as f64 == *b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Tag(a), Self::Tag(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => a == b,
            (Self::Record(r), Self::Map(m)) | (Self::Map(m), Self::Record(r)) => r == m,
            (Self::Custom(a), Self::Custom(b)) => a.eq_value(b.as_ref()),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => f.write_str(s),
            Self::Bytes(b) => write!(f, "{b:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Self::Tag(t) => write!(f, "{t}"),
            Self::Record(r) => write!(f, "{r}"),
            Self::Custom(c) => write!(f, "{c}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<Fields> for Value {
    fn from(v: Fields) -> Self {
        Self::Map(v)
    }
}

impl From<Tag> for Value {
    fn from(v: Tag) -> Self {
        Self::Tag(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Self::Record(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Int),
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Builds [`Fields`] from a JSON object literal; non-objects yield an empty mapping.
#[must_use]
pub fn fields_from_json(v: serde_json::Value) -> Fields {
    match Value::from(v) {
        Value::Map(m) => m,
        _ => Fields::new(),
    }
}
