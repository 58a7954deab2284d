//! # Cor
//!
//! Validated, composable record types built from untrusted input mappings.
//!
//! Cor provides a structured approach to turning loosely typed data into
//! immutable records with support for:
//!
//! - **Composable operations**: conversions, guards and missing-value policies
//!   chained with `then` and `or_else`
//! - **Record schemas**: closed and extensible record types with inheritance
//!   and field templates
//! - **Hooks**: derived fields and cross-field invariants
//! - **Nested records**: factories usable as field operations, tagged unions
//! - **Structured errors**: every failure keeps its full cause chain
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cor::prelude::*;
//!
//! let point = RecordType::closed("Point")
//!     .field("x", to_int())
//!     .field("y", to_int().then(only_if(|v| v.as_int() > Some(0), "positive")))
//!     .field("label", skip_missing().then(to_str()))
//!     .build();
//!
//! let p = point.from_fields(fields_from_json(json!({"x": "1", "y": 2})))?;
//! assert_eq!(as_basic_type(&p.into()), json!({"x": 1, "y": 2}));
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod basic;
pub mod contracts;
pub mod core;
pub mod errors;
pub mod hooks;
pub mod observability;
pub mod record;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::basic::{as_basic_type, BasicConverter};
    pub use crate::contracts::{
        anything, convert, expect_type, expect_types, generate_missing, not_empty, only_if,
        provide_missing, should_be, skip_missing, something, to_float, to_int, to_str, to_tag,
        ContractInfo, Op, Operation,
    };
    pub use crate::core::{fields_from_json, CustomValue, Fields, Tag, TagSet, Value, ValueKind};
    pub use crate::errors::{
        AccessError, FieldError, InvalidFieldError, MissingFieldError, Phase, RecordError,
        ValidationError,
    };
    pub use crate::hooks::{field_aggregate, field_invariant, FieldDecl, HooksFactory, Target};
    pub use crate::observability::{init_logging, LoggingConfig};
    pub use crate::record::{
        choose_by_field, extensible_record, record, subrecord, Factory, FieldTemplate, Record,
        RecordType,
    };
}
