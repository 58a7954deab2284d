//! Sealed record instances and the draft view seen by `Init` hooks.

use std::fmt;
use std::sync::Arc;

use super::schema::RecordType;
use crate::core::{Fields, Value};
use crate::errors::RecordError;

struct RecordInner {
    record_type: RecordType,
    fields: Fields,
    extra: Fields,
}

/// A sealed record.
///
/// Records have no mutators: once construction succeeds the field values are
/// fixed for the lifetime of the instance. Cloning shares the same storage.
#[derive(Clone)]
pub struct Record(Arc<RecordInner>);

impl Record {
    pub(crate) fn seal(record_type: RecordType, fields: Fields, extra: Fields) -> Self {
        Self(Arc::new(RecordInner {
            record_type,
            fields,
            extra,
        }))
    }

    /// Returns the record type.
    #[must_use]
    pub fn record_type(&self) -> &RecordType {
        &self.0.record_type
    }

    /// Returns the record type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.0.record_type.name()
    }

    /// Returns true if the record was built by `record_type` or one of its subtypes.
    #[must_use]
    pub fn is_instance_of(&self, record_type: &RecordType) -> bool {
        self.0.record_type.is_subtype_of(record_type)
    }

    /// Returns a field value; `None` for unset and unknown fields alike.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.fields.get(name).or_else(|| self.0.extra.get(name))
    }

    /// Returns true if the field is set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over visible fields: declared fields in contract order, then
    /// passthrough fields in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .fields
            .iter()
            .chain(self.0.extra.iter())
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over visible field names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(k, _)| k)
    }

    /// Returns the number of visible fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.fields.len() + self.0.extra.len()
    }

    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the passthrough fields of an extensible record.
    #[must_use]
    pub fn extra_fields(&self) -> &Fields {
        &self.0.extra
    }

    /// Copies the visible fields into a mapping.
    #[must_use]
    pub fn to_fields(&self) -> Fields {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Builds a new record of the same type from this one plus `overrides`.
    pub fn evolve(&self, overrides: Fields) -> Result<Self, RecordError> {
        let mut input = self.to_fields();
        input.extend(overrides);
        self.0.record_type.from_fields(input)
    }
}

fn same_mapping<'a>(
    len: usize,
    mut pairs: impl Iterator<Item = (&'a str, &'a Value)>,
    other_len: usize,
    other: impl Fn(&str) -> Option<&'a Value>,
) -> bool {
    len == other_len && pairs.all(|(k, v)| other(k).is_some_and(|o| o == v))
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        if self.0.record_type == other.0.record_type {
            // Declared fields are kept in contract order; passthrough fields
            // keep input order, which is not part of the value.
            self.0.fields.iter().eq(other.0.fields.iter())
                && same_mapping(
                    self.0.extra.len(),
                    self.0.extra.iter().map(|(k, v)| (k.as_str(), v)),
                    other.0.extra.len(),
                    |k| other.0.extra.get(k),
                )
        } else {
            same_mapping(self.len(), self.iter(), other.len(), |k| other.get(k))
        }
    }
}

impl PartialEq<Fields> for Record {
    fn eq(&self, other: &Fields) -> bool {
        same_mapping(self.len(), self.iter(), other.len(), |k| other.get(k))
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.type_name());
        for (name, value) in self.iter() {
            s.field(name, value);
        }
        s.finish()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.type_name())?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}

/// Read-only view of a record whose declared fields are staged but which is
/// not sealed yet.
#[derive(Debug, Clone, Copy)]
pub struct RecordDraft<'a> {
    record_type: &'a RecordType,
    fields: &'a Fields,
    extra: &'a Fields,
}

impl<'a> RecordDraft<'a> {
    pub(crate) const fn new(record_type: &'a RecordType, fields: &'a Fields, extra: &'a Fields) -> Self {
        Self {
            record_type,
            fields,
            extra,
        }
    }

    /// Returns the record type being built.
    #[must_use]
    pub const fn record_type(&self) -> &'a RecordType {
        self.record_type
    }

    /// Returns a staged field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.fields.get(name).or_else(|| self.extra.get(name))
    }

    /// Iterates over staged fields.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.fields
            .iter()
            .chain(self.extra.iter())
            .map(|(k, v)| (k.as_str(), v))
    }
}
