//! Core value types.

mod tag;
mod value;

pub use tag::{Tag, TagSet};
pub use value::{fields_from_json, CustomValue, Fields, Value, ValueKind};
