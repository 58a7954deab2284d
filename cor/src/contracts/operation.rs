//! The operation trait and its combinators.

use std::fmt;
use std::sync::Arc;

use crate::core::{Fields, Tag, Value, ValueKind};
use crate::errors::FieldError;

use super::guards::{expect_type, should_be};

/// A composable field extraction, conversion and validation rule.
///
/// Implementations read `field_name` from `values` and return:
/// - `Ok(Some(value))` to set the field,
/// - `Ok(None)` to leave the field intentionally unset,
/// - `Err(FieldError)` when the field is missing or invalid.
pub trait Operation: Send + Sync + fmt::Debug {
    /// Returns the human-readable contract description.
    fn info(&self) -> String;

    /// Extracts and converts the value of `field_name` from `values`.
    fn prepare_field(&self, field_name: &str, values: &Fields)
        -> Result<Option<Value>, FieldError>;
}

/// Shared, immutable handle to an [`Operation`].
///
/// Combinators never mutate their operands; they wrap them in a new `Op`.
#[derive(Clone)]
pub struct Op(Arc<dyn Operation>);

impl Op {
    /// Wraps an operation.
    #[must_use]
    pub fn new(operation: impl Operation + 'static) -> Self {
        Self(Arc::new(operation))
    }

    /// Returns the contract description.
    #[must_use]
    pub fn info(&self) -> String {
        self.0.info()
    }

    /// Extracts and converts the value of `field_name` from `values`.
    pub fn prepare_field(
        &self,
        field_name: &str,
        values: &Fields,
    ) -> Result<Option<Value>, FieldError> {
        self.0.prepare_field(field_name, values)
    }

    /// Runs the operation against a single value.
    pub fn apply(&self, value: impl Into<Value>) -> Result<Option<Value>, FieldError> {
        let mut values = Fields::with_capacity(1);
        values.insert(APPLY_FIELD.to_string(), value.into());
        self.prepare_field(APPLY_FIELD, &values)
    }

    /// Feeds the result of this operation into `next`.
    ///
    /// If this operation leaves the field unset, `next` is not run.
    #[must_use]
    pub fn then(self, next: impl Into<Self>) -> Self {
        Self::new(Pipe {
            left: self,
            right: next.into(),
        })
    }

    /// Falls back to `alternative` when this operation fails or leaves the
    /// field unset.
    #[must_use]
    pub fn or_else(self, alternative: impl Into<Self>) -> Self {
        Self::new(Or {
            left: self,
            right: alternative.into(),
        })
    }

    /// Returns true if both handles point to the same operation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

const APPLY_FIELD: &str = "value";

impl fmt::Debug for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Op").field(&self.info()).finish()
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.info())
    }
}

/// A bare kind is promoted to a type guard.
impl From<ValueKind> for Op {
    fn from(kind: ValueKind) -> Self {
        expect_type(kind)
    }
}

/// A bare constant is promoted to an equality guard.
impl From<Tag> for Op {
    fn from(tag: Tag) -> Self {
        should_be(tag)
    }
}

/// Runs `left`, then `right` on the input with the field replaced by the
/// result of `left`.
#[derive(Debug)]
struct Pipe {
    left: Op,
    right: Op,
}

impl Operation for Pipe {
    fn info(&self) -> String {
        format!("{} then {}", self.left.info(), self.right.info())
    }

    fn prepare_field(
        &self,
        field_name: &str,
        values: &Fields,
    ) -> Result<Option<Value>, FieldError> {
        let Some(left) = self.left.prepare_field(field_name, values)? else {
            return Ok(None);
        };
        let mut values = values.clone();
        values.insert(field_name.to_string(), left);
        self.right.prepare_field(field_name, &values)
    }
}

/// First operation that applies, else the alternative.
///
/// The alternative always sees the original input, never partial output of
/// the left side.
#[derive(Debug)]
struct Or {
    left: Op,
    right: Op,
}

impl Operation for Or {
    fn info(&self) -> String {
        format!("{} or {}", self.left.info(), self.right.info())
    }

    fn prepare_field(
        &self,
        field_name: &str,
        values: &Fields,
    ) -> Result<Option<Value>, FieldError> {
        match self.left.prepare_field(field_name, values) {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) => self.right.prepare_field(field_name, values),
            Err(left_err) => self
                .right
                .prepare_field(field_name, values)
                .map_err(|right_err| right_err.after(left_err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{provide_missing, skip_missing, to_int, to_str};
    use crate::core::fields_from_json;
    use mockall::mock;
    use serde_json::json;

    mock! {
        pub Stage {}

        impl Operation for Stage {
            fn info(&self) -> String;
            fn prepare_field(&self, field_name: &str, values: &Fields)
                -> Result<Option<Value>, FieldError>;
        }
    }

    impl fmt::Debug for MockStage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("MockStage")
        }
    }

    fn untouched(info: &str) -> Op {
        let mut op = MockStage::new();
        op.expect_info().return_const(info.to_string());
        op.expect_prepare_field().never();
        Op::new(op)
    }

    #[test]
    fn test_pipe_chains_left_to_right() {
        let op = to_int().then(to_str());
        let values = fields_from_json(json!({"n": "5"}));
        assert_eq!(op.prepare_field("n", &values).unwrap(), Some(Value::from("5")));
        assert_eq!(op.info(), "convert to int then convert to str");
    }

    #[test]
    fn test_pipe_sees_left_result() {
        let mut right = MockStage::new();
        right
            .expect_prepare_field()
            .withf(|name, values| name == "n" && values.get("n") == Some(&Value::Int(5)))
            .times(1)
            .returning(|_, _| Ok(Some(Value::Int(6))));
        let op = to_int().then(Op::new(right));
        let values = fields_from_json(json!({"n": "5", "other": 1}));
        assert_eq!(op.prepare_field("n", &values).unwrap(), Some(Value::Int(6)));
    }

    #[test]
    fn test_pipe_short_circuits_on_unset() {
        let op = skip_missing().then(untouched("never"));
        assert_eq!(op.prepare_field("n", &Fields::new()).unwrap(), None);
    }

    #[test]
    fn test_or_does_not_try_alternative_after_success() {
        let op = to_int().or_else(untouched("never"));
        let values = fields_from_json(json!({"n": "7"}));
        assert_eq!(op.prepare_field("n", &values).unwrap(), Some(Value::Int(7)));
    }

    #[test]
    fn test_or_falls_through_on_unset_with_original_input() {
        let mut right = MockStage::new();
        right
            .expect_prepare_field()
            .withf(|_, values| values.is_empty())
            .times(1)
            .returning(|_, _| Ok(Some(Value::Int(42))));
        let op = skip_missing().or_else(Op::new(right));
        assert_eq!(op.prepare_field("n", &Fields::new()).unwrap(), Some(Value::Int(42)));
    }

    #[test]
    fn test_or_chains_both_failures() {
        let op = expect_type(ValueKind::Int).or_else(ValueKind::Str);
        let values = fields_from_json(json!({"n": null}));
        let err = op.prepare_field("n", &values).unwrap_err();
        assert!(err.is_invalid());
        assert!(err.previous().unwrap().is_invalid());

        let err = op.prepare_field("n", &Fields::new()).unwrap_err();
        assert!(err.is_missing());
        assert!(err.previous().unwrap().is_missing());
    }

    #[test]
    fn test_or_accepts_either_type() {
        let op = expect_type(ValueKind::Int).or_else(ValueKind::Str);
        assert_eq!(op.apply(5).unwrap(), Some(Value::Int(5)));
        assert_eq!(op.apply("5").unwrap(), Some(Value::from("5")));
        assert_eq!(
            op.info(),
            "accept only if has type int or accept only if has type str"
        );
    }

    #[test]
    fn test_provide_missing_or_int() {
        let op = provide_missing(42).or_else(to_int());
        assert_eq!(op.prepare_field("foo", &Fields::new()).unwrap(), Some(Value::Int(42)));
        let values = fields_from_json(json!({"foo": 13}));
        assert_eq!(op.prepare_field("foo", &values).unwrap(), Some(Value::Int(13)));
    }

    #[test]
    fn test_operands_are_not_mutated() {
        let left = to_int();
        let combined = left.clone().then(to_str());
        assert!(!combined.ptr_eq(&left));
        assert_eq!(left.info(), "convert to int");
    }
}
