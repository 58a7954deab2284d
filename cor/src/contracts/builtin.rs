//! Built-in scalar conversions.

use super::conversion::SimpleConversion;
use super::info::ContractInfo;
use super::operation::Op;
use crate::core::{TagSet, Value};
use crate::errors::ValidationError;

fn not_convertible(target: &str, v: &Value) -> anyhow::Error {
    ValidationError::type_mismatch(format!("value convertible to {target}"), v.clone()).into()
}

/// Converts to an integer: parses strings, truncates finite floats, maps
/// booleans to `0`/`1`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn to_int() -> Op {
    super::convert("int", |v| match v {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Float(f) if f.is_finite() && f.abs() < i64::MAX as f64 => {
            Ok(Value::Int(f.trunc() as i64))
        }
        Value::Str(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|err| {
            ValidationError::condition("integer literal", v.clone())
                .with_cause(err)
                .into()
        }),
        _ => Err(not_convertible("int", v)),
    })
}

/// Converts to a float: parses strings, widens integers.
#[must_use]
pub fn to_float() -> Op {
    super::convert("float", |v| match v {
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Int(_) => Ok(Value::Float(v.as_float().unwrap_or_default())),
        Value::Bool(b) => Ok(Value::Float(f64::from(u8::from(*b)))),
        Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|err| {
            ValidationError::condition("float literal", v.clone())
                .with_cause(err)
                .into()
        }),
        _ => Err(not_convertible("float", v)),
    })
}

/// Converts any value to its string form.
#[must_use]
pub fn to_str() -> Op {
    super::convert("str", |v| match v {
        Value::Str(s) => Ok(Value::Str(s.clone())),
        other => Ok(Value::Str(other.to_string())),
    })
}

/// Converts a value string (or a member of the same set) into a tag.
#[must_use]
pub fn to_tag(tags: &TagSet) -> Op {
    let described = tags.clone();
    let info = ContractInfo::lazy(move || format!("convert to {}", described.describe()));
    let tags = tags.clone();
    Op::new(SimpleConversion::new(info, move |v| {
        let tag = match v {
            Value::Tag(t) if tags.contains(t) => Some(t.clone()),
            Value::Str(s) => tags.by_value(s),
            _ => None,
        };
        tag.map(Value::Tag).ok_or_else(|| {
            ValidationError::condition(format!("one of {}", tags.describe()), v.clone()).into()
        })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FieldError;

    #[test]
    fn test_to_int() {
        let op = to_int();
        assert_eq!(op.apply("1").unwrap(), Some(Value::Int(1)));
        assert_eq!(op.apply(2).unwrap(), Some(Value::Int(2)));
        assert_eq!(op.apply(1.9).unwrap(), Some(Value::Int(1)));
        assert_eq!(op.apply(true).unwrap(), Some(Value::Int(1)));
        assert!(op.apply(Value::Null).unwrap_err().is_invalid());
        assert!(op.apply("s").unwrap_err().is_invalid());
        assert!(op.apply("1.1").unwrap_err().is_invalid());
        assert_eq!(op.info(), "convert to int");
    }

    #[test]
    fn test_to_int_keeps_parse_error_as_cause() {
        let FieldError::Invalid(err) = to_int().apply("s").unwrap_err() else {
            panic!("expected invalid field error");
        };
        let validation = err.validation().unwrap();
        assert_eq!(validation.condition, "integer literal");
        assert_eq!(validation.value, Value::from("s"));
        let cause = validation.cause.as_ref().unwrap();
        assert!(cause.to_string().contains("invalid digit"));

        let dict = FieldError::Invalid(err).to_dict();
        assert!(dict.contains_key("validation"));
    }

    #[test]
    fn test_to_float_parse_failure_is_structured() {
        let FieldError::Invalid(err) = to_float().apply("x").unwrap_err() else {
            panic!("expected invalid field error");
        };
        assert_eq!(err.validation().unwrap().condition, "float literal");
    }

    #[test]
    fn test_to_float() {
        let op = to_float();
        assert_eq!(op.apply("1").unwrap(), Some(Value::Float(1.0)));
        assert_eq!(op.apply(2).unwrap(), Some(Value::Float(2.0)));
        assert_eq!(op.apply(1.5).unwrap(), Some(Value::Float(1.5)));
        assert!(op.apply("x").is_err());
    }

    #[test]
    fn test_to_str() {
        let op = to_str();
        assert_eq!(op.apply(5).unwrap(), Some(Value::from("5")));
        assert_eq!(op.apply("s").unwrap(), Some(Value::from("s")));
        assert_eq!(op.apply(1.5).unwrap(), Some(Value::from("1.5")));
        assert_eq!(op.apply(Value::Null).unwrap(), Some(Value::from("null")));
    }

    #[test]
    fn test_int_then_str_round_trip() {
        let op = to_int().then(to_str());
        assert_eq!(op.apply("5").unwrap(), Some(Value::from("5")));
        assert_eq!(op.apply(true).unwrap(), Some(Value::from("1")));
        assert!(op.apply("s").unwrap_err().is_invalid());

        let op = op.then(to_float());
        assert_eq!(op.apply("1").unwrap(), Some(Value::Float(1.0)));
        assert_eq!(op.apply(1.1).unwrap(), Some(Value::Float(1.0)));
    }

    #[test]
    fn test_to_tag() {
        let kinds = TagSet::new(
            "WheelerType",
            [("Bicycle", "bicycle"), ("Car", "car"), ("Truck", "truck")],
        );
        let op = to_tag(&kinds);
        assert_eq!(op.apply("car").unwrap(), Some(Value::Tag(kinds.tag("Car"))));
        assert_eq!(
            op.apply(kinds.tag("Truck")).unwrap(),
            Some(Value::Tag(kinds.tag("Truck")))
        );
        assert!(op.apply("table").is_err());
        assert!(op.apply(1).is_err());
        assert_eq!(
            op.info(),
            r#"convert to WheelerType("bicycle", "car", "truck")"#
        );
    }
}
