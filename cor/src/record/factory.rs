//! Factories: record types used as values and as field operations.

use std::fmt;

use super::instance::Record;
use super::schema::{RecordType, RecordTypeBuilder};
use crate::contracts::{Op, Operation};
use crate::core::{Fields, Value};
use crate::errors::{FieldError, RecordError, ValidationError};
use crate::hooks::FieldDecl;

/// Handle bound to a single record type.
///
/// Calling a factory constructs its record type. Converted into an [`Op`], it
/// turns a nested mapping into a nested record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factory {
    record_type: RecordType,
}

impl Factory {
    /// Creates a factory for `record_type`.
    #[must_use]
    pub fn new(record_type: RecordType) -> Self {
        Self { record_type }
    }

    /// Returns the bound record type.
    #[must_use]
    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    /// Returns the bound record type name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.record_type.name()
    }

    /// Constructs a record from a mapping-like value.
    pub fn call(&self, values: impl Into<Value>) -> Result<Record, RecordError> {
        self.record_type.create(values)
    }

    /// Constructs a record from an optional mapping plus overrides.
    pub fn call_with(&self, values: Option<&Value>, overrides: Fields) -> Result<Record, RecordError> {
        self.record_type.construct(values, overrides)
    }

    /// Creates a factory for a new type whose contract is this type's
    /// contract overlaid with `fields`.
    ///
    /// The new type does not count as a subtype of the base.
    #[must_use]
    pub fn extend<N, I>(&self, name: impl Into<String>, fields: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, FieldDecl)>,
    {
        let record_type = RecordTypeBuilder::new(name, self.record_type.kind())
            .fields_of(&self.record_type)
            .fields(fields)
            .build();
        Self::new(record_type)
    }

    /// Returns the factory as a field operation.
    #[must_use]
    pub fn op(&self) -> Op {
        Op::new(FactoryConversion {
            record_type: self.record_type.clone(),
        })
    }

    /// Feeds the constructed record into `next`.
    #[must_use]
    pub fn then(&self, next: impl Into<Op>) -> Op {
        self.op().then(next)
    }

    /// Falls back to `alternative` when construction fails.
    #[must_use]
    pub fn or_else(&self, alternative: impl Into<Op>) -> Op {
        self.op().or_else(alternative)
    }
}

impl From<Factory> for Op {
    fn from(factory: Factory) -> Self {
        factory.op()
    }
}

impl From<&Factory> for Op {
    fn from(factory: &Factory) -> Self {
        factory.op()
    }
}

impl From<RecordType> for Op {
    fn from(record_type: RecordType) -> Self {
        subrecord(&record_type)
    }
}

impl From<&RecordType> for Op {
    fn from(record_type: &RecordType) -> Self {
        subrecord(record_type)
    }
}

impl From<Factory> for FieldDecl {
    fn from(factory: Factory) -> Self {
        Self::new(factory)
    }
}

impl From<RecordType> for FieldDecl {
    fn from(record_type: RecordType) -> Self {
        Self::new(record_type)
    }
}

impl From<&RecordType> for FieldDecl {
    fn from(record_type: &RecordType) -> Self {
        Self::new(record_type)
    }
}

/// Reads the nested mapping stored under `field_name`.
///
/// A falsy non-mapping value (null, empty string, zero) reads as an empty
/// mapping, the same as top-level construction input.
fn nested_input(field_name: &str, values: &Fields) -> Result<Fields, FieldError> {
    let value = values
        .get(field_name)
        .ok_or_else(|| FieldError::missing(field_name))?;
    match value.to_fields() {
        Some(fields) => Ok(fields),
        None if !value.is_truthy() => Ok(Fields::new()),
        None => Err(FieldError::invalid(
            field_name,
            ValidationError::type_mismatch("mapping", value.clone()),
        )),
    }
}

/// Converts a nested mapping into a record of a fixed type.
struct FactoryConversion {
    record_type: RecordType,
}

impl fmt::Debug for FactoryConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FactoryConversion")
            .field(&self.record_type.name())
            .finish()
    }
}

impl Operation for FactoryConversion {
    fn info(&self) -> String {
        format!("convert to {}", self.record_type.name())
    }

    fn prepare_field(
        &self,
        field_name: &str,
        values: &Fields,
    ) -> Result<Option<Value>, FieldError> {
        let fields = nested_input(field_name, values)?;
        self.record_type
            .from_fields(fields)
            .map(|record| Some(Value::Record(record)))
            .map_err(|err| FieldError::invalid(field_name, err))
    }
}

/// Declares a field holding a nested record of `record_type`.
#[must_use]
pub fn subrecord(record_type: &RecordType) -> Op {
    record_type.factory().op()
}

/// Defines a closed record type from field declarations.
#[must_use]
pub fn record<N, I>(name: impl Into<String>, fields: I) -> RecordType
where
    N: Into<String>,
    I: IntoIterator<Item = (N, FieldDecl)>,
{
    RecordType::closed(name).fields(fields).build()
}

/// Defines an extensible record type from field declarations.
#[must_use]
pub fn extensible_record<N, I>(name: impl Into<String>, fields: I) -> RecordType
where
    N: Into<String>,
    I: IntoIterator<Item = (N, FieldDecl)>,
{
    RecordType::extensible(name).fields(fields).build()
}

/// Defines a closed record type and returns its factory.
#[must_use]
pub fn record_factory<N, I>(name: impl Into<String>, fields: I) -> Factory
where
    N: Into<String>,
    I: IntoIterator<Item = (N, FieldDecl)>,
{
    record(name, fields).factory()
}

/// Defines an extensible record type and returns its factory.
#[must_use]
pub fn extensible_record_factory<N, I>(name: impl Into<String>, fields: I) -> Factory
where
    N: Into<String>,
    I: IntoIterator<Item = (N, FieldDecl)>,
{
    extensible_record(name, fields).factory()
}

/// Picks the first factory whose `discriminator` field accepts the nested
/// mapping and constructs that record.
///
/// Factories whose type lacks the discriminator field are never chosen.
#[must_use]
pub fn choose_by_field(discriminator: impl Into<String>, factories: Vec<Factory>) -> Op {
    Op::new(ChooseByField {
        discriminator: discriminator.into(),
        factories,
    })
}

#[derive(Debug)]
struct ChooseByField {
    discriminator: String,
    factories: Vec<Factory>,
}

impl ChooseByField {
    fn choices(&self) -> String {
        self.factories
            .iter()
            .map(Factory::name)
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

impl Operation for ChooseByField {
    fn info(&self) -> String {
        format!(
            "choose ({}) matching against {} field to create one",
            self.choices(),
            self.discriminator
        )
    }

    fn prepare_field(
        &self,
        field_name: &str,
        values: &Fields,
    ) -> Result<Option<Value>, FieldError> {
        let fields = nested_input(field_name, values)?;
        let chosen = self.factories.iter().find(|factory| {
            factory
                .record_type()
                .prepare_field_from_input(&self.discriminator, &fields)
                .is_ok()
        });
        let Some(factory) = chosen else {
            let condition = format!("{} field matching one of ({})", self.discriminator, self.choices());
            return Err(FieldError::invalid(
                field_name,
                ValidationError::condition(condition, Value::Map(fields)),
            ));
        };
        tracing::trace!(
            field = field_name,
            record = factory.name(),
            "Record type chosen by discriminator"
        );
        factory
            .record_type()
            .from_fields(fields)
            .map(|record| Some(Value::Record(record)))
            .map_err(|err| FieldError::invalid(field_name, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{to_int, to_str};
    use crate::core::{fields_from_json, TagSet, ValueKind};
    use crate::errors::Phase;
    use serde_json::json;
    use std::error::Error as _;

    #[test]
    fn test_factory_call_and_op() {
        let point = record_factory(
            "Point",
            [("x", to_int().into()), ("y", to_int().into())],
        );
        let p = point.call(fields_from_json(json!({"x": "1", "y": 2}))).unwrap();
        assert_eq!(p.type_name(), "Point");
        assert_eq!(point.op().info(), "convert to Point");

        let err = point
            .call_with(None, fields_from_json(json!({"x": 1})))
            .unwrap_err();
        assert_eq!(err.phase, Phase::Fields);
        assert!(err.field_error().unwrap().is_missing());
    }

    #[test]
    fn test_subrecord_wraps_inner_failure() {
        let inner = record("Inner", [("n", FieldDecl::from(to_int()))]);
        let outer = record("Outer", [("inner", FieldDecl::from(&inner))]);

        let ok = outer.create(fields_from_json(json!({"inner": {"n": "4"}}))).unwrap();
        let nested = ok.get("inner").and_then(Value::as_record).unwrap();
        assert!(nested.is_instance_of(&inner));
        assert_eq!(nested.get("n"), Some(&Value::Int(4)));

        let err = outer
            .create(fields_from_json(json!({"inner": {"n": "four"}})))
            .unwrap_err();
        let field_err = err.field_error().unwrap();
        assert_eq!(field_err.field(), "inner");
        let inner_err = field_err
            .source()
            .and_then(|e| e.downcast_ref::<RecordError>())
            .unwrap();
        assert_eq!(inner_err.record, "Inner");
        assert_eq!(inner_err.field_error().unwrap().field(), "n");

        let err = outer.create(fields_from_json(json!({"inner": 7}))).unwrap_err();
        assert!(err.field_error().unwrap().is_invalid());
    }

    #[test]
    fn test_null_nested_mapping_reads_as_empty() {
        let optional = record(
            "Optional",
            [("n", FieldDecl::from(crate::contracts::provide_missing(0)))],
        );
        let outer = record("Outer", [("inner", FieldDecl::from(&optional))]);
        let ok = outer.create(fields_from_json(json!({"inner": null}))).unwrap();
        let nested = ok.get("inner").and_then(Value::as_record).unwrap();
        assert_eq!(nested.get("n"), Some(&Value::Int(0)));

        let required = record("Required", [("n", FieldDecl::from(to_int()))]);
        let outer = record("Outer", [("inner", FieldDecl::from(&required))]);
        let err = outer.create(fields_from_json(json!({"inner": null}))).unwrap_err();
        let inner_err = err
            .field_error()
            .unwrap()
            .source()
            .and_then(|e| e.downcast_ref::<RecordError>())
            .unwrap();
        assert!(inner_err.field_error().unwrap().is_missing());
    }

    #[test]
    fn test_extend_overlays_contract() {
        let base = record_factory("Base", [("a", to_int().into()), ("b", to_int().into())]);
        let wider = base.extend("Wider", [("b", to_str().into()), ("c", ValueKind::Int.into())]);
        assert_eq!(
            wider.record_type().field_names().collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert_eq!(wider.record_type().contract()["b"].info(), "convert to str");
        assert!(!wider.record_type().is_subtype_of(base.record_type()));
        assert_eq!(base.record_type().contract()["b"].info(), "convert to int");
    }

    #[test]
    fn test_choose_by_field() {
        let kind = TagSet::new("Kind", [("Cat", "cat"), ("Dog", "dog")]);
        let cat = record_factory(
            "Cat",
            [
                ("kind", kind.tag("Cat").into()),
                ("lives", to_int().into()),
            ],
        );
        let dog = record_factory(
            "Dog",
            [("kind", kind.tag("Dog").into()), ("name", to_str().into())],
        );
        let pet = choose_by_field("kind", vec![cat.clone(), dog.clone()]);
        assert_eq!(
            pet.info(),
            "choose (Cat or Dog) matching against kind field to create one"
        );

        let input: Fields = [
            ("kind".to_string(), Value::Tag(kind.tag("Dog"))),
            ("name".to_string(), Value::from("rex")),
        ]
        .into_iter()
        .collect();
        let chosen = pet.apply(input).unwrap().unwrap();
        let chosen = chosen.as_record().unwrap();
        assert!(chosen.is_instance_of(dog.record_type()));

        let unknown: Fields = [("kind".to_string(), Value::from("bird"))].into_iter().collect();
        let err = pet.apply(unknown).unwrap_err();
        assert!(err.is_invalid());
    }
}
