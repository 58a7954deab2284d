//! Field operations and their combinators.
//!
//! This module provides:
//! - The [`Operation`] trait and the shared [`Op`] handle
//! - Pipe (`then`) and alternative (`or_else`) combinators
//! - Missing-value policies
//! - Predicate and type guards
//! - Built-in scalar conversions

mod builtin;
mod conversion;
mod guards;
mod info;
mod missing;
mod operation;

pub use builtin::{to_float, to_int, to_str, to_tag};
pub use conversion::{convert, convert_with_info, ConvertFn, SimpleConversion};
pub use guards::{expect_type, expect_types, matches, not_empty, only_if, only_if_kind, should_be};
pub use info::ContractInfo;
pub use missing::{anything, generate_missing, provide_missing, skip_missing, something};
pub use operation::{Op, Operation};
