//! Missing-value policies.
//!
//! A key that is absent from the input and a key mapped to [`Value::Null`] are
//! both treated as missing here.

use std::fmt;
use std::sync::Arc;

use super::info::ContractInfo;
use super::operation::{Op, Operation};
use crate::core::{Fields, Value};
use crate::errors::FieldError;

fn present<'a>(field_name: &str, values: &'a Fields) -> Option<&'a Value> {
    values.get(field_name).filter(|v| !v.is_null())
}

#[derive(Debug)]
struct SkipMissing {
    info: &'static str,
}

impl Operation for SkipMissing {
    fn info(&self) -> String {
        self.info.to_string()
    }

    fn prepare_field(
        &self,
        field_name: &str,
        values: &Fields,
    ) -> Result<Option<Value>, FieldError> {
        Ok(present(field_name, values).cloned())
    }
}

/// Leaves the field unset when missing, passes a present value through.
///
/// Falsy values that are present (`0`, `""`, `false`) are passed through.
#[must_use]
pub fn skip_missing() -> Op {
    Op::new(SkipMissing {
        info: "skip missing",
    })
}

/// Accepts any value, leaving the field unset when missing.
#[must_use]
pub fn anything() -> Op {
    Op::new(SkipMissing {
        info: "accept anything",
    })
}

#[derive(Debug)]
struct Something;

impl Operation for Something {
    fn info(&self) -> String {
        "accept something".to_string()
    }

    fn prepare_field(
        &self,
        field_name: &str,
        values: &Fields,
    ) -> Result<Option<Value>, FieldError> {
        values
            .get(field_name)
            .cloned()
            .map(Some)
            .ok_or_else(|| FieldError::missing(field_name))
    }
}

/// Accepts any present value, failing when the key is absent.
#[must_use]
pub fn something() -> Op {
    Op::new(Something)
}

#[derive(Debug)]
struct ProvideMissing {
    default: Value,
}

impl Operation for ProvideMissing {
    fn info(&self) -> String {
        format!("provide {} if missing", self.default)
    }

    fn prepare_field(
        &self,
        field_name: &str,
        values: &Fields,
    ) -> Result<Option<Value>, FieldError> {
        Ok(Some(
            present(field_name, values)
                .cloned()
                .unwrap_or_else(|| self.default.clone()),
        ))
    }
}

/// Substitutes `default` when the field is missing; present values pass through
/// unchanged.
#[must_use]
pub fn provide_missing(default: impl Into<Value>) -> Op {
    Op::new(ProvideMissing {
        default: default.into(),
    })
}

struct GenerateMissing {
    info: ContractInfo,
    generate: Arc<dyn Fn() -> Value + Send + Sync>,
}

impl fmt::Debug for GenerateMissing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerateMissing")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl Operation for GenerateMissing {
    fn info(&self) -> String {
        format!("generate {} if missing", self.info)
    }

    fn prepare_field(
        &self,
        field_name: &str,
        values: &Fields,
    ) -> Result<Option<Value>, FieldError> {
        Ok(Some(
            present(field_name, values)
                .cloned()
                .unwrap_or_else(|| (self.generate)()),
        ))
    }
}

/// Like [`provide_missing`], but computes a fresh default on every use.
#[must_use]
pub fn generate_missing(
    info: impl Into<ContractInfo>,
    generate: impl Fn() -> Value + Send + Sync + 'static,
) -> Op {
    Op::new(GenerateMissing {
        info: info.into(),
        generate: Arc::new(generate),
    })
}
