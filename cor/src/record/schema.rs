//! Record types: resolved field contracts built once at definition time.

use indexmap::IndexMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::construct::{build_record, merge_input};
use super::factory::Factory;
use super::instance::Record;
use crate::contracts::Op;
use crate::core::{Fields, Value};
use crate::errors::{AccessError, FieldError, RecordError};
use crate::hooks::{FieldDecl, Hook};

/// Ordered field-name to operation mapping.
pub type Contract = IndexMap<String, Op>;

/// Whether undeclared input keys are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Only declared fields are stored; other input keys are ignored.
    Closed,
    /// Undeclared input keys are carried through verbatim.
    Extensible,
}

struct RecordTypeInner {
    name: String,
    kind: RecordKind,
    fields: IndexMap<String, FieldDecl>,
    contract: Contract,
    hooks: Vec<Hook>,
    ancestors: Vec<RecordType>,
}

/// A named record schema.
///
/// Cheap to clone; all clones share the same immutable contract.
#[derive(Clone)]
pub struct RecordType(Arc<RecordTypeInner>);

impl RecordType {
    /// Starts defining a closed record type.
    #[must_use]
    pub fn closed(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder::new(name, RecordKind::Closed)
    }

    /// Starts defining an extensible record type.
    #[must_use]
    pub fn extensible(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder::new(name, RecordKind::Extensible)
    }

    /// Starts defining a subtype inheriting this type's kind and fields.
    #[must_use]
    pub fn subtype(&self, name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder::new(name, self.kind()).extends(self)
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the record kind.
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        self.0.kind
    }

    /// Returns true if undeclared input keys are kept.
    #[must_use]
    pub fn is_extensible(&self) -> bool {
        self.0.kind == RecordKind::Extensible
    }

    /// Returns the resolved field contract.
    #[must_use]
    pub fn contract(&self) -> &Contract {
        &self.0.contract
    }

    /// Returns the field declarations, including hooks.
    #[must_use]
    pub fn field_decls(&self) -> &IndexMap<String, FieldDecl> {
        &self.0.fields
    }

    /// Describes the contract, one `name :: info` line per field.
    #[must_use]
    pub fn get_contract_info(&self) -> String {
        self.0
            .contract
            .iter()
            .map(|(name, op)| format!("{name} :: {}", op.info()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Iterates over declared field names in contract order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.contract.keys().map(String::as_str)
    }

    /// Returns true if `name` is a declared field.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.0.contract.contains_key(name)
    }

    /// Returns the operation of a declared field, for reuse in another type.
    #[must_use]
    pub fn field_converter(&self, name: &str) -> Option<Op> {
        self.0.contract.get(name).cloned()
    }

    /// Returns all hooks in declaration order.
    #[must_use]
    pub fn hooks(&self) -> &[Hook] {
        &self.0.hooks
    }

    /// Returns true if this type is `other` or was derived from it.
    #[must_use]
    pub fn is_subtype_of(&self, other: &Self) -> bool {
        self == other || self.0.ancestors.iter().any(|a| a == other)
    }

    /// Runs the operation of a single declared field against `values`.
    pub fn prepare_field_from_input(
        &self,
        name: &str,
        values: &Fields,
    ) -> Result<Option<Value>, FieldError> {
        let op = self
            .0
            .contract
            .get(name)
            .ok_or_else(|| AccessError::new(self.name(), name))?;
        op.prepare_field(name, values)
    }

    /// Returns a factory bound to this type.
    #[must_use]
    pub fn factory(&self) -> Factory {
        Factory::new(self.clone())
    }

    /// Constructs a record from an optional mapping plus overrides.
    ///
    /// Overrides win on key collision. A non-empty `values` that is not a
    /// mapping (a map or a record) is rejected.
    pub fn construct(&self, values: Option<&Value>, overrides: Fields) -> Result<Record, RecordError> {
        let input = merge_input(self.name(), values, overrides)?;
        build_record(self, &input)
    }

    /// Constructs a record from a mapping.
    pub fn from_fields(&self, values: Fields) -> Result<Record, RecordError> {
        build_record(self, &values)
    }

    /// Constructs a record from a mapping-like value.
    pub fn create(&self, values: impl Into<Value>) -> Result<Record, RecordError> {
        self.construct(Some(&values.into()), Fields::new())
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for RecordType {}

impl Hash for RecordType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.0.name)
            .field("kind", &self.0.kind)
            .field("fields", &self.0.contract.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Reusable field declarations merged into record types at build time.
#[derive(Debug, Clone)]
pub struct FieldTemplate {
    name: String,
    fields: IndexMap<String, FieldDecl>,
}

impl FieldTemplate {
    /// Creates an empty template.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Declares a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, decl: impl Into<FieldDecl>) -> Self {
        self.fields.insert(name.into(), decl.into());
        self
    }

    /// Adds the fields of another template.
    #[must_use]
    pub fn include(mut self, other: &Self) -> Self {
        for (name, decl) in &other.fields {
            self.fields.insert(name.clone(), decl.clone());
        }
        self
    }

    /// Returns the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterates over declared field names.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone)]
enum Base {
    Record(RecordType),
    Overlay(RecordType),
    Template(FieldTemplate),
}

/// Builder resolving a record type's fields.
///
/// Fields are resolved base by base in the order bases were added, then the
/// fields declared directly on the builder are laid over them. Re-declaring a
/// field replaces its operation but keeps its original position.
#[derive(Debug, Clone)]
pub struct RecordTypeBuilder {
    name: String,
    kind: RecordKind,
    bases: Vec<Base>,
    fields: Vec<(String, FieldDecl)>,
}

impl RecordTypeBuilder {
    /// Creates a builder for a record type of the given kind.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: RecordKind) -> Self {
        Self {
            name: name.into(),
            kind,
            bases: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Inherits the fields of `base` and records it as an ancestor.
    #[must_use]
    pub fn extends(mut self, base: &RecordType) -> Self {
        self.bases.push(Base::Record(base.clone()));
        self
    }

    /// Copies the fields of `base` without recording it as an ancestor.
    #[must_use]
    pub fn fields_of(mut self, base: &RecordType) -> Self {
        self.bases.push(Base::Overlay(base.clone()));
        self
    }

    /// Merges the fields of a template.
    #[must_use]
    pub fn mixin(mut self, template: &FieldTemplate) -> Self {
        self.bases.push(Base::Template(template.clone()));
        self
    }

    /// Declares a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, decl: impl Into<FieldDecl>) -> Self {
        self.fields.push((name.into(), decl.into()));
        self
    }

    /// Declares several fields.
    #[must_use]
    pub fn fields<N, I>(mut self, fields: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, FieldDecl)>,
    {
        self.fields
            .extend(fields.into_iter().map(|(name, decl)| (name.into(), decl)));
        self
    }

    /// Resolves the contract and hooks into an immutable record type.
    #[must_use]
    pub fn build(self) -> RecordType {
        let mut fields: IndexMap<String, FieldDecl> = IndexMap::new();
        let mut ancestors: Vec<RecordType> = Vec::new();

        for base in &self.bases {
            match base {
                Base::Record(record_type) => {
                    merge_fields(&mut fields, record_type.field_decls());
                    for ancestor in record_type.0.ancestors.iter().chain([record_type]) {
                        if !ancestors.contains(ancestor) {
                            ancestors.push(ancestor.clone());
                        }
                    }
                }
                Base::Overlay(record_type) => merge_fields(&mut fields, record_type.field_decls()),
                Base::Template(template) => merge_fields(&mut fields, &template.fields),
            }
        }
        for (name, decl) in self.fields {
            fields.insert(name, decl);
        }

        let contract: Contract = fields
            .iter()
            .map(|(name, decl)| (name.clone(), decl.operation().clone()))
            .collect();
        let hooks: Vec<Hook> = fields
            .iter()
            .flat_map(|(name, decl)| decl.hooks().gen_hooks(name))
            .collect();

        tracing::debug!(
            record = %self.name,
            kind = ?self.kind,
            fields = contract.len(),
            hooks = hooks.len(),
            "Record type defined"
        );

        RecordType(Arc::new(RecordTypeInner {
            name: self.name,
            kind: self.kind,
            fields,
            contract,
            hooks,
            ancestors,
        }))
    }
}

fn merge_fields(target: &mut IndexMap<String, FieldDecl>, source: &IndexMap<String, FieldDecl>) {
    for (name, decl) in source {
        target.insert(name.clone(), decl.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{expect_type, only_if, provide_missing, skip_missing, to_int, to_str};
    use crate::core::ValueKind;
    use crate::hooks::{field_invariant, Target};

    #[test]
    fn test_contract_order_and_info() {
        let point = RecordType::closed("Point")
            .field("x", to_int())
            .field("y", to_int().then(only_if(|v| v.as_int() > Some(0), "positive")))
            .field("label", skip_missing().then(to_str()))
            .build();

        let names: Vec<&str> = point.field_names().collect();
        assert_eq!(names, vec!["x", "y", "label"]);
        assert_eq!(
            point.get_contract_info(),
            "x :: convert to int\n\
             y :: convert to int then accept only if positive\n\
             label :: skip missing then convert to str"
        );
    }

    #[test]
    fn test_inheritance_overrides_keep_position() {
        let base = RecordType::closed("Base")
            .field("a", ValueKind::Int)
            .field("b", ValueKind::Str)
            .build();
        let derived = base
            .subtype("Derived")
            .field("a", provide_missing(0))
            .field("c", ValueKind::Float)
            .build();

        let names: Vec<&str> = derived.field_names().collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(derived.contract()["a"].info(), "provide 0 if missing");
        assert_eq!(base.contract()["a"].info(), "accept only if has type int");
        assert_eq!(derived.kind(), RecordKind::Closed);
        assert!(derived.is_subtype_of(&base));
        assert!(!base.is_subtype_of(&derived));
    }

    #[test]
    fn test_siblings_are_independent() {
        let base = RecordType::extensible("Base").field("a", ValueKind::Int).build();
        let left = base.subtype("Left").field("a", ValueKind::Str).build();
        let right = base.subtype("Right").build();
        assert_eq!(left.contract()["a"].info(), "accept only if has type str");
        assert_eq!(right.contract()["a"].info(), "accept only if has type int");
        assert!(right.is_extensible());
        assert!(!left.is_subtype_of(&right));
    }

    #[test]
    fn test_mixin_contributes_fields() {
        let template = FieldTemplate::new("T")
            .field("a", ValueKind::Int)
            .field("b", ValueKind::Str);
        let a = RecordType::extensible("A").mixin(&template).build();
        let b = RecordType::closed("B")
            .mixin(&template)
            .field("c", expect_type(ValueKind::Tag))
            .build();

        assert_eq!(a.field_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(b.field_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert!(!b.is_subtype_of(&a));
    }

    #[test]
    fn test_fields_of_does_not_record_ancestry() {
        let base = RecordType::closed("Base").field("a", ValueKind::Int).build();
        let copy = RecordType::closed("Copy").fields_of(&base).build();
        assert!(copy.has_field("a"));
        assert!(!copy.is_subtype_of(&base));
    }

    #[test]
    fn test_hooks_are_generated_per_field() {
        let checked = RecordType::closed("Checked")
            .field("a", to_int().with_hooks(field_invariant(|_, _, _| Ok(()))))
            .field("b", to_int())
            .build();
        assert_eq!(checked.hooks().len(), 1);
        assert_eq!(checked.hooks()[0].field(), "a");
        assert_eq!(checked.hooks()[0].target(), Target::PostInit);

        let overridden = checked.subtype("Plain").field("a", to_int()).build();
        assert!(overridden.hooks().is_empty());
    }

    #[test]
    fn test_prepare_field_from_input() {
        let t = RecordType::closed("T").field("a", to_int()).build();
        let values: Fields = [("a".to_string(), Value::from("3"))].into_iter().collect();
        assert_eq!(t.prepare_field_from_input("a", &values).unwrap(), Some(Value::Int(3)));
        let err = t.prepare_field_from_input("zzz", &values).unwrap_err();
        assert!(matches!(err, FieldError::Access(_)));
    }
}
