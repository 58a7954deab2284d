//! Testing utilities for record types.
//!
//! This module provides:
//! - Assertions over construction results and field errors
//! - Vehicle record fixtures shared by tests and benchmarks

mod assertions;
mod fixtures;

pub use assertions::{
    assert_field_value, assert_invalid_field, assert_missing_field, assert_record_built,
    assert_record_error_phase,
};
pub use fixtures::VehicleFixture;
