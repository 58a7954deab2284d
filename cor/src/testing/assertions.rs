//! Test assertions for record construction.

use std::fmt::Debug;

use crate::core::Value;
use crate::errors::{FieldError, Phase, RecordError};
use crate::record::Record;

fn expect_error<'a, T: Debug>(result: &'a Result<T, RecordError>) -> &'a RecordError {
    match result {
        Ok(value) => panic!("Expected construction to fail, got {value:?}"),
        Err(err) => err,
    }
}

fn expect_field_error<'a, T: Debug>(result: &'a Result<T, RecordError>) -> &'a FieldError {
    let err = expect_error(result);
    err.field_error()
        .unwrap_or_else(|| panic!("Expected a field error as cause, got: {err}"))
}

/// Asserts that construction succeeded and returns the record.
pub fn assert_record_built(result: &Result<Record, RecordError>) -> &Record {
    match result {
        Ok(record) => record,
        Err(err) => panic!("Expected record to be built, got error: {err}"),
    }
}

/// Asserts that construction failed in the given phase.
pub fn assert_record_error_phase<T: Debug>(result: &Result<T, RecordError>, expected: Phase) {
    let err = expect_error(result);
    assert_eq!(
        err.phase, expected,
        "Expected failure in phase {}, got {} ({})",
        expected, err.phase, err
    );
}

/// Asserts that construction failed because `field` is missing.
pub fn assert_missing_field<T: Debug>(result: &Result<T, RecordError>, field: &str) {
    let field_err = expect_field_error(result);
    assert!(
        field_err.is_missing() && field_err.field() == field,
        "Expected field '{field}' to be missing, got: {field_err}"
    );
}

/// Asserts that construction failed because `field` is invalid.
pub fn assert_invalid_field<T: Debug>(result: &Result<T, RecordError>, field: &str) {
    let field_err = expect_field_error(result);
    assert!(
        field_err.is_invalid() && field_err.field() == field,
        "Expected field '{field}' to be invalid, got: {field_err}"
    );
}

/// Asserts that a record field holds the expected value.
pub fn assert_field_value(record: &Record, field: &str, expected: impl Into<Value>) {
    let expected = expected.into();
    let actual = record.get(field);
    assert_eq!(
        actual,
        Some(&expected),
        "Expected value {expected:?} for field '{field}' of {}, got {actual:?}",
        record.type_name()
    );
}
