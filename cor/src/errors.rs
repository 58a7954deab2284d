//! Error types for record construction.
//!
//! Field-level failures ([`MissingFieldError`], [`InvalidFieldError`],
//! [`AccessError`]) are gathered in [`FieldError`]. A caller constructing a
//! record only ever sees a [`RecordError`]; the field-level error stays
//! reachable through [`std::error::Error::source`], so diagnostics can walk the
//! whole chain down to the conversion that rejected the input.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::core::Value;

/// Boxed error used as a cause.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Boxes an error returned by a user closure.
///
/// A [`ValidationError`] at the top of the chain is unwrapped so it stays
/// downcastable; errors with attached context keep their whole chain.
pub(crate) fn box_error(err: anyhow::Error) -> BoxError {
    if !(*err).is::<ValidationError>() {
        return err.into();
    }
    match err.downcast::<ValidationError>() {
        Ok(validation) => Box::new(validation),
        Err(err) => err.into(),
    }
}

/// Kind of a generic validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// The value has the right type but does not satisfy a condition.
    Value,
    /// The value has an unexpected type.
    Type,
}

/// Structured payload of a failed guard or conversion.
#[derive(Debug, Clone, Error)]
#[error("{info}: expected {condition}, got {value}")]
pub struct ValidationError {
    /// Failure category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub info: String,
    /// The condition the value was expected to meet.
    pub condition: String,
    /// The offending value.
    pub value: Value,
    /// Lower-level failure that caused the rejection, such as a parse error.
    #[source]
    pub cause: Option<Arc<dyn StdError + Send + Sync + 'static>>,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(
        kind: ValidationErrorKind,
        info: impl Into<String>,
        condition: impl Into<String>,
        value: Value,
    ) -> Self {
        Self {
            kind,
            info: info.into(),
            condition: condition.into(),
            value,
            cause: None,
        }
    }

    /// Attaches the lower-level failure behind this one.
    #[must_use]
    pub fn with_cause(mut self, cause: impl StdError + Send + Sync + 'static) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Value doesn't match a condition.
    #[must_use]
    pub fn condition(condition: impl Into<String>, value: Value) -> Self {
        Self::new(
            ValidationErrorKind::Value,
            "Value doesn't match condition",
            condition,
            value,
        )
    }

    /// Value has an unexpected type.
    #[must_use]
    pub fn type_mismatch(expected: impl Into<String>, value: Value) -> Self {
        Self::new(
            ValidationErrorKind::Type,
            "Value has unexpected type",
            expected,
            value,
        )
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        let kind = match self.kind {
            ValidationErrorKind::Value => "value",
            ValidationErrorKind::Type => "type",
        };
        map.insert("kind".to_string(), serde_json::json!(kind));
        map.insert("info".to_string(), serde_json::json!(self.info));
        map.insert("condition".to_string(), serde_json::json!(self.condition));
        map.insert("value".to_string(), serde_json::json!(self.value.to_string()));
        if let Some(cause) = &self.cause {
            map.insert("cause".to_string(), serde_json::json!(cause.to_string()));
        }
        map
    }
}

/// A required field is absent and nothing provided a fallback.
#[derive(Debug, Error)]
#[error("field '{field}' is missing")]
pub struct MissingFieldError {
    /// The field name.
    pub field: String,
    /// Failure of an alternative tried before this one.
    #[source]
    pub previous: Option<Box<FieldError>>,
}

impl MissingFieldError {
    /// Creates a new missing field error.
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            previous: None,
        }
    }
}

/// A field is present but failed conversion or validation.
#[derive(Debug, Error)]
#[error("field '{field}' is invalid: {source}")]
pub struct InvalidFieldError {
    /// The field name.
    pub field: String,
    /// The original failure.
    pub source: BoxError,
    /// Failure of an alternative tried before this one.
    pub previous: Option<Box<FieldError>>,
}

impl InvalidFieldError {
    /// Creates a new invalid field error.
    #[must_use]
    pub fn new(field: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            field: field.into(),
            source: source.into(),
            previous: None,
        }
    }

    /// Returns the structured validation payload, if the cause carries one.
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationError> {
        self.source.downcast_ref()
    }
}

/// A field cannot be written on a record.
#[derive(Debug, Clone, Error)]
#[error("field '{field}' is not accessible on record '{record}'")]
pub struct AccessError {
    /// The record type name.
    pub record: String,
    /// The field name.
    pub field: String,
}

impl AccessError {
    /// Creates a new access error.
    #[must_use]
    pub fn new(record: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            record: record.into(),
            field: field.into(),
        }
    }
}

/// Any failure attributed to a single field.
#[derive(Debug, Error)]
pub enum FieldError {
    /// Required field absent.
    #[error(transparent)]
    Missing(#[from] MissingFieldError),

    /// Field failed conversion or a guard.
    #[error(transparent)]
    Invalid(#[from] InvalidFieldError),

    /// Field cannot be accessed.
    #[error(transparent)]
    Access(#[from] AccessError),
}

impl FieldError {
    /// Creates a missing field error.
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        MissingFieldError::new(field).into()
    }

    /// Creates an invalid field error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, source: impl Into<BoxError>) -> Self {
        InvalidFieldError::new(field, source).into()
    }

    /// Returns the name of the failing field.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Missing(e) => &e.field,
            Self::Invalid(e) => &e.field,
            Self::Access(e) => &e.field,
        }
    }

    /// Returns true for a missing field.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }

    /// Returns true for an invalid field.
    #[must_use]
    pub const fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// Returns the failure of the alternative tried before this one.
    #[must_use]
    pub fn previous(&self) -> Option<&Self> {
        match self {
            Self::Missing(e) => e.previous.as_deref(),
            Self::Invalid(e) => e.previous.as_deref(),
            Self::Access(_) => None,
        }
    }

    /// Records `previous` as the failure that led to trying this one.
    #[must_use]
    pub fn after(mut self, previous: Self) -> Self {
        match &mut self {
            Self::Missing(e) => e.previous = Some(Box::new(previous)),
            Self::Invalid(e) => e.previous = Some(Box::new(previous)),
            Self::Access(_) => {}
        }
        self
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        let kind = match self {
            Self::Missing(_) => "MissingFieldError",
            Self::Invalid(_) => "InvalidFieldError",
            Self::Access(_) => "AccessError",
        };
        map.insert("type".to_string(), serde_json::json!(kind));
        map.insert("field".to_string(), serde_json::json!(self.field()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        if let Self::Invalid(e) = self {
            if let Some(validation) = e.validation() {
                let payload: serde_json::Map<String, serde_json::Value> =
                    validation.to_dict().into_iter().collect();
                map.insert("validation".to_string(), serde_json::Value::Object(payload));
            }
        }
        map
    }
}

/// A hook rejected the record or failed to compute a field.
#[derive(Debug, Error)]
#[error("failed {check}")]
pub struct HookError {
    /// What the hook was doing.
    pub check: &'static str,
    /// The failure reported by the hook.
    #[source]
    pub source: BoxError,
}

impl HookError {
    /// A field invariant did not hold.
    #[must_use]
    pub fn invariant(source: impl Into<BoxError>) -> Self {
        Self {
            check: "invariant check",
            source: source.into(),
        }
    }

    /// A field aggregate could not be computed.
    #[must_use]
    pub fn aggregate(source: impl Into<BoxError>) -> Self {
        Self {
            check: "field aggregate",
            source: source.into(),
        }
    }
}

/// Construction phase in which a record failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Merging the input mapping with overrides.
    Input,
    /// Converting declared fields.
    Fields,
    /// Running `Init` hooks.
    Init,
    /// Running `PostInit` hooks on the sealed instance.
    PostInit,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::Fields => "fields",
            Self::Init => "init",
            Self::PostInit => "post-init",
        })
    }
}

/// Record construction failed.
#[derive(Debug, Error)]
#[error("cannot build record '{record}' ({phase}): {source}")]
pub struct RecordError {
    /// The record type name.
    pub record: String,
    /// The phase that failed.
    pub phase: Phase,
    /// The underlying failure.
    pub source: BoxError,
}

impl RecordError {
    /// Creates a new record error.
    #[must_use]
    pub fn new(record: impl Into<String>, phase: Phase, source: impl Into<BoxError>) -> Self {
        Self {
            record: record.into(),
            phase,
            source: source.into(),
        }
    }

    /// Returns the field-level failure, if that is the cause.
    #[must_use]
    pub fn field_error(&self) -> Option<&FieldError> {
        self.source.downcast_ref()
    }

    /// Iterates over the chain of causes, starting below this error.
    pub fn causes(&self) -> impl Iterator<Item = &(dyn StdError + 'static)> {
        std::iter::successors(Some(self.source.as_ref() as &(dyn StdError + 'static)), |e| {
            (*e).source()
        })
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!("RecordError"));
        map.insert("record".to_string(), serde_json::json!(self.record));
        map.insert("phase".to_string(), serde_json::json!(self.phase.to_string()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        if let Some(field_err) = self.field_error() {
            let cause: serde_json::Map<String, serde_json::Value> =
                field_err.to_dict().into_iter().collect();
            map.insert("cause".to_string(), serde_json::Value::Object(cause));
        }
        map
    }
}
