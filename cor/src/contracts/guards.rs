//! Predicate guards: pass the value through unchanged or reject it.

use regex::Regex;

use super::conversion::SimpleConversion;
use super::info::ContractInfo;
use super::operation::Op;
use crate::core::{Value, ValueKind};
use crate::errors::{ValidationError, ValidationErrorKind};

/// Accepts the value only if `predicate` holds, failing with a value
/// validation error otherwise.
#[must_use]
pub fn only_if(
    predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    info: impl Into<String>,
) -> Op {
    only_if_kind(predicate, info, ValidationErrorKind::Value)
}

/// Like [`only_if`], failing with a validation error of the given kind.
#[must_use]
pub fn only_if_kind(
    predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    info: impl Into<String>,
    kind: ValidationErrorKind,
) -> Op {
    let condition = info.into();
    let described = condition.clone();
    let contract = ContractInfo::lazy(move || format!("accept only if {described}"));
    Op::new(SimpleConversion::new(contract, move |v| {
        if predicate(v) {
            Ok(v.clone())
        } else {
            let info = match kind {
                ValidationErrorKind::Value => "Value doesn't match condition",
                ValidationErrorKind::Type => "Value has unexpected type",
            };
            Err(ValidationError::new(kind, info, condition.as_str(), v.clone()).into())
        }
    }))
}

/// Accepts only values of the given kind.
#[must_use]
pub fn expect_type(kind: ValueKind) -> Op {
    expect_types(&[kind])
}

/// Accepts only values of one of the given kinds.
#[must_use]
pub fn expect_types(kinds: &[ValueKind]) -> Op {
    let expected = kinds.to_vec();
    let info = match kinds {
        [single] => format!("has type {single}"),
        _ => {
            let names: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
            format!("has one of [{}] types", names.join(", "))
        }
    };
    only_if_kind(
        move |v| expected.contains(&v.kind()),
        info,
        ValidationErrorKind::Type,
    )
}

/// Accepts only the given constant, typically a tag discriminator.
#[must_use]
pub fn should_be(expected: impl Into<Value>) -> Op {
    let expected = expected.into();
    let info = format!("value is {expected} constant");
    only_if(move |v| *v == expected, info)
}

/// Rejects falsy values.
#[must_use]
pub fn not_empty() -> Op {
    only_if(Value::is_truthy, "not empty")
}

/// Accepts only strings matching `pattern`.
pub fn matches(pattern: &str) -> Result<Op, regex::Error> {
    let re = Regex::new(pattern)?;
    let info = format!("matches /{pattern}/");
    Ok(only_if(
        move |v| v.as_str().is_some_and(|s| re.is_match(s)),
        info,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{fields_from_json, Fields, TagSet};
    use crate::errors::FieldError;
    use serde_json::json;

    fn validation(err: &FieldError) -> ValidationError {
        match err {
            FieldError::Invalid(e) => e.validation().cloned().unwrap(),
            other => panic!("expected invalid field, got {other:?}"),
        }
    }

    #[test]
    fn test_only_if() {
        let op = only_if(|v| v.as_int().is_some_and(|i| i < 10), "less than 10");
        assert_eq!(op.apply(9).unwrap(), Some(Value::Int(9)));

        let err = op.apply(10).unwrap_err();
        let payload = validation(&err);
        assert_eq!(payload.kind, ValidationErrorKind::Value);
        assert_eq!(payload.condition, "less than 10");
        assert_eq!(payload.value, Value::Int(10));

        let values = fields_from_json(json!({"bar": 10}));
        assert!(op.prepare_field("foo", &values).unwrap_err().is_missing());
        assert_eq!(op.info(), "accept only if less than 10");
    }

    #[test]
    fn test_expect_types() {
        let op = expect_types(&[ValueKind::Str, ValueKind::Float]);
        for good in [Value::from(""), Value::from("foo"), Value::Float(1.1)] {
            assert_eq!(op.apply(good.clone()).unwrap(), Some(good));
        }
        for bad in [Value::Bytes(vec![]), Value::Int(1), Value::Null] {
            let err = op.apply(bad).unwrap_err();
            assert_eq!(validation(&err).kind, ValidationErrorKind::Type);
        }
        assert_eq!(op.info(), "accept only if has one of [str, float] types");

        let op = expect_type(ValueKind::Bytes);
        let values: Fields = [("foo".to_string(), Value::Bytes(b"bar".to_vec()))].into_iter().collect();
        assert_eq!(
            op.prepare_field("foo", &values).unwrap(),
            Some(Value::Bytes(b"bar".to_vec()))
        );
        assert_eq!(op.info(), "accept only if has type bytes");
    }

    #[test]
    fn test_should_be_tag() {
        let kinds = TagSet::new("Kind", [("A", "a"), ("B", "b")]);
        let op = should_be(kinds.tag("A"));
        assert_eq!(op.apply(kinds.tag("A")).unwrap(), Some(Value::Tag(kinds.tag("A"))));
        assert!(op.apply(kinds.tag("B")).is_err());
        assert!(op.apply("a").is_err());
        assert_eq!(op.info(), "accept only if value is a constant");

        let other = TagSet::new("Kind", [("A", "a"), ("B", "b")]);
        assert!(op.apply(other.tag("A")).is_err());
    }

    #[test]
    fn test_not_empty() {
        let op = not_empty();
        assert_eq!(op.apply("x").unwrap(), Some(Value::from("x")));
        assert!(op.apply("").is_err());
        assert!(op.apply(0).is_err());
        assert_eq!(op.info(), "accept only if not empty");
    }

    #[test]
    fn test_matches() {
        let op = matches(r"^[a-z]+\d$").unwrap();
        assert!(op.apply("abc1").is_ok());
        assert!(op.apply("abc").is_err());
        assert!(op.apply(1).is_err());
        assert!(matches("(").is_err());
    }
}
