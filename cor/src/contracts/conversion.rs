//! Conversions applying a function to a required field.

use std::fmt;
use std::sync::Arc;

use super::info::ContractInfo;
use super::operation::{Op, Operation};
use crate::core::{Fields, Value};
use crate::errors::{box_error, FieldError};

/// Conversion function applied to a single value.
pub type ConvertFn = Arc<dyn Fn(&Value) -> anyhow::Result<Value> + Send + Sync>;

/// Applies a conversion function to a required field.
///
/// A missing field fails with `MissingFieldError`. A framework [`FieldError`]
/// returned by the function propagates unchanged; any other failure is wrapped
/// in `InvalidFieldError` with the original error as its cause.
#[derive(Clone)]
pub struct SimpleConversion {
    info: ContractInfo,
    convert: ConvertFn,
}

impl SimpleConversion {
    /// Creates a conversion described by `info`.
    #[must_use]
    pub fn new(
        info: impl Into<ContractInfo>,
        convert: impl Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            info: info.into(),
            convert: Arc::new(convert),
        }
    }

    /// Applies the conversion function directly.
    pub fn convert(&self, value: &Value) -> anyhow::Result<Value> {
        (self.convert)(value)
    }

    pub(crate) fn convert_field(&self, field_name: &str, value: &Value) -> Result<Value, FieldError> {
        self.convert(value)
            .map_err(|err| field_error_from(field_name, err))
    }
}

impl fmt::Debug for SimpleConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleConversion")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl Operation for SimpleConversion {
    fn info(&self) -> String {
        self.info.contract()
    }

    fn prepare_field(
        &self,
        field_name: &str,
        values: &Fields,
    ) -> Result<Option<Value>, FieldError> {
        let value = values
            .get(field_name)
            .ok_or_else(|| FieldError::missing(field_name))?;
        self.convert_field(field_name, value).map(Some)
    }
}

/// Turns a conversion failure into a field error, keeping framework errors intact.
fn field_error_from(field_name: &str, err: anyhow::Error) -> FieldError {
    match err.downcast::<FieldError>() {
        Ok(field_err) => field_err,
        Err(err) => FieldError::invalid(field_name, box_error(err)),
    }
}

/// Converts a required field with `f`, described as `convert to <name>`.
#[must_use]
pub fn convert(
    name: &str,
    f: impl Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
) -> Op {
    Op::new(SimpleConversion::new(format!("convert to {name}"), f))
}

/// Converts a required field with `f`, described verbatim by `info`.
#[must_use]
pub fn convert_with_info(
    info: impl Into<ContractInfo>,
    f: impl Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
) -> Op {
    Op::new(SimpleConversion::new(info, f))
}
