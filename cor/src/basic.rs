//! Conversion of values and records down to plain JSON-like data.
//!
//! [`BasicConverter`] holds per-type overrides keyed by record type identity
//! or by the concrete Rust type of a custom value. Record types sharing a name
//! never share an override. Values without an override fall back to the
//! default representation:
//! - records become objects of their visible fields, in iteration order
//! - tags become their value string
//! - custom values use [`CustomValue::to_basic`]
//! - bytes become arrays of numbers
//! - non-finite floats become `null`
//!
//! A process-wide converter backs [`as_basic_type`] and the `Serialize`
//! implementations of [`Value`] and [`Record`].

use parking_lot::RwLock;
use serde::{Serialize, Serializer};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::{CustomValue, Value};
use crate::record::{Record, RecordType};

/// Representation override for a record type.
pub type RecordRepr = Arc<dyn Fn(&Record, &BasicConverter) -> serde_json::Value + Send + Sync>;

/// Representation override for a custom value type.
pub type CustomRepr = Arc<dyn Fn(&dyn CustomValue) -> serde_json::Value + Send + Sync>;

/// Registry of representation overrides.
#[derive(Clone, Default)]
pub struct BasicConverter {
    records: HashMap<RecordType, RecordRepr>,
    customs: HashMap<TypeId, CustomRepr>,
}

impl BasicConverter {
    /// Creates a converter with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the representation of records built by `record_type`.
    ///
    /// Subtypes and other types with the same name keep their own
    /// representation.
    #[must_use]
    pub fn with_record(
        mut self,
        record_type: &RecordType,
        repr: impl Fn(&Record, &Self) -> serde_json::Value + Send + Sync + 'static,
    ) -> Self {
        self.records.insert(record_type.clone(), Arc::new(repr));
        self
    }

    /// Overrides the representation of custom values of type `T`.
    #[must_use]
    pub fn with_custom<T: CustomValue>(
        mut self,
        repr: impl Fn(&T) -> serde_json::Value + Send + Sync + 'static,
    ) -> Self {
        let erased: CustomRepr = Arc::new(move |custom: &dyn CustomValue| {
            custom
                .as_any()
                .downcast_ref::<T>()
                .map_or_else(|| custom.to_basic(), &repr)
        });
        self.customs.insert(TypeId::of::<T>(), erased);
        self
    }

    /// Converts a value.
    #[must_use]
    pub fn convert(&self, value: &Value) -> serde_json::Value {
        use serde_json::Value as Json;

        match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Value::Str(s) => Json::String(s.clone()),
            Value::Bytes(bytes) => Json::Array(bytes.iter().map(|b| Json::from(*b)).collect()),
            Value::List(items) => Json::Array(items.iter().map(|v| self.convert(v)).collect()),
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.convert(v)))
                    .collect(),
            ),
            Value::Tag(tag) => Json::String(tag.value().to_string()),
            Value::Record(record) => self.convert_record(record),
            Value::Custom(custom) => match self.customs.get(&Any::type_id(custom.as_any())) {
                Some(repr) => repr(custom.as_ref()),
                None => custom.to_basic(),
            },
        }
    }

    /// Converts a record, honouring overrides for its type.
    #[must_use]
    pub fn convert_record(&self, record: &Record) -> serde_json::Value {
        match self.records.get(record.record_type()) {
            Some(repr) => repr(record, self),
            None => self.record_fields(record),
        }
    }

    /// Default representation of a record: an object of its visible fields.
    #[must_use]
    pub fn record_fields(&self, record: &Record) -> serde_json::Value {
        serde_json::Value::Object(
            record
                .iter()
                .map(|(k, v)| (k.to_string(), self.convert(v)))
                .collect(),
        )
    }
}

impl fmt::Debug for BasicConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicConverter")
            .field(
                "records",
                &self.records.keys().map(RecordType::name).collect::<Vec<_>>(),
            )
            .field("customs", &self.customs.len())
            .finish()
    }
}

// Global converter
static GLOBAL_CONVERTER: RwLock<Option<Arc<BasicConverter>>> = RwLock::new(None);

/// Gets the global converter.
pub fn get_basic_converter() -> Arc<BasicConverter> {
    if let Some(converter) = GLOBAL_CONVERTER.read().as_ref() {
        return converter.clone();
    }
    GLOBAL_CONVERTER
        .write()
        .get_or_insert_with(|| Arc::new(BasicConverter::new()))
        .clone()
}

/// Replaces the global converter.
pub fn set_basic_converter(converter: BasicConverter) {
    *GLOBAL_CONVERTER.write() = Some(Arc::new(converter));
}

/// Drops every global override.
pub fn clear_basic_converter() {
    *GLOBAL_CONVERTER.write() = None;
}

fn update_global(update: impl FnOnce(BasicConverter) -> BasicConverter) {
    let mut global = GLOBAL_CONVERTER.write();
    let current = global.as_deref().cloned().unwrap_or_default();
    *global = Some(Arc::new(update(current)));
}

/// Registers a global override for records built by `record_type`.
pub fn register_record_repr(
    record_type: &RecordType,
    repr: impl Fn(&Record, &BasicConverter) -> serde_json::Value + Send + Sync + 'static,
) {
    tracing::debug!(record = record_type.name(), "Registered record representation");
    update_global(|c| c.with_record(record_type, repr));
}

/// Registers a global override for custom values of type `T`.
pub fn register_custom_repr<T: CustomValue>(
    repr: impl Fn(&T) -> serde_json::Value + Send + Sync + 'static,
) {
    tracing::debug!(
        custom = std::any::type_name::<T>(),
        "Registered custom representation"
    );
    update_global(|c| c.with_custom(repr));
}

/// Converts a value with the global converter.
#[must_use]
pub fn as_basic_type(value: &Value) -> serde_json::Value {
    get_basic_converter().convert(value)
}

impl Record {
    /// Converts the record with the global converter.
    #[must_use]
    pub fn as_basic(&self) -> serde_json::Value {
        get_basic_converter().convert_record(self)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        as_basic_type(self).serialize(serializer)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_basic().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{to_int, to_tag};
    use crate::core::{fields_from_json, TagSet};
    use crate::record::RecordType;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::any::Any;

    #[derive(Debug)]
    struct Celsius(f64);

    impl fmt::Display for Celsius {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}C", self.0)
        }
    }

    impl CustomValue for Celsius {
        fn type_name(&self) -> &str {
            "Celsius"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_default_representation() {
        let converter = BasicConverter::new();
        let value = Value::List(vec![
            Value::Null,
            Value::Float(f64::NAN),
            Value::Bytes(vec![1, 2]),
            Value::custom(Celsius(21.5)),
        ]);
        assert_eq!(converter.convert(&value), json!([null, null, [1, 2], "21.5C"]));
    }

    #[test]
    fn test_record_and_tag_representation() {
        let colors = TagSet::new("Color", [("Red", "red"), ("Blue", "blue")]);
        let paint = RecordType::extensible("Paint")
            .field("color", to_tag(&colors))
            .field("liters", to_int())
            .build();
        let data = json!({"color": "red", "liters": 3, "brand": "acme"});
        let record = paint.from_fields(fields_from_json(data.clone())).unwrap();

        let converter = BasicConverter::new();
        assert_eq!(converter.convert(&Value::Record(record.clone())), data);

        let named = converter.with_record(&paint, |r, _| json!(r.type_name()));
        assert_eq!(named.convert(&Value::Record(record)), json!("Paint"));
    }

    #[test]
    fn test_record_override_is_bound_to_type_identity() {
        let a = RecordType::closed("Foo").field("a", to_int()).build();
        let b = RecordType::closed("Foo").field("b", to_int()).build();
        let converter = BasicConverter::new().with_record(&a, |r, _| {
            json!(r.get("a").and_then(Value::as_int))
        });

        let from_a = a.from_fields(fields_from_json(json!({"a": 1}))).unwrap();
        let from_b = b.from_fields(fields_from_json(json!({"b": "2"}))).unwrap();
        assert_eq!(converter.convert_record(&from_a), json!(1));
        assert_eq!(converter.convert_record(&from_b), json!({"b": 2}));

        let sub = a.subtype("SubFoo").build();
        let from_sub = sub.from_fields(fields_from_json(json!({"a": 3}))).unwrap();
        assert_eq!(converter.convert_record(&from_sub), json!({"a": 3}));
    }

    #[test]
    fn test_custom_override() {
        #[derive(Debug)]
        struct Named(&'static str);

        impl fmt::Display for Named {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.0)
            }
        }

        impl CustomValue for Named {
            fn type_name(&self) -> &str {
                "Celsius"
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        let converter =
            BasicConverter::new().with_custom(|c: &Celsius| json!({"celsius": c.0}));
        assert_eq!(
            converter.convert(&Value::custom(Celsius(4.0))),
            json!({"celsius": 4.0})
        );
        assert_eq!(converter.convert(&Value::custom(Named("cold"))), json!("cold"));
    }

    #[test]
    fn test_global_registry_and_serialize() {
        #[derive(Debug)]
        struct Secret;

        impl fmt::Display for Secret {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("hunter2")
            }
        }

        impl CustomValue for Secret {
            fn type_name(&self) -> &str {
                "basic-tests::Secret"
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        register_custom_repr(|_: &Secret| json!("***"));
        let value = Value::List(vec![Value::custom(Secret), Value::Int(1)]);
        assert_eq!(serde_json::to_value(&value).unwrap(), json!(["***", 1]));
        assert_eq!(as_basic_type(&value), json!(["***", 1]));
    }
}
