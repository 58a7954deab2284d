//! Record types, sealed instances and factories.
//!
//! This module provides:
//! - [`RecordType`] schemas resolved once by [`RecordTypeBuilder`]
//! - Closed and extensible [`Record`] instances with no mutators
//! - [`FieldTemplate`] mixins for field reuse
//! - [`Factory`] handles usable as field operations for nested records
//! - Tagged-union construction with [`choose_by_field`]

mod construct;
mod factory;
mod instance;
mod schema;


pub use factory::{
    choose_by_field, extensible_record, extensible_record_factory, record, record_factory,
    subrecord, Factory,
};
pub use instance::{Record, RecordDraft};
pub use schema::{Contract, FieldTemplate, RecordKind, RecordType, RecordTypeBuilder};
