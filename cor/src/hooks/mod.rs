//! Construction hooks.
//!
//! A hook is bound to a field and a [`Target`] phase. `Init` hooks run once
//! all declared fields are staged and may derive field values; `PostInit`
//! hooks run on the sealed record and check invariants.

mod factory;
mod hook;

pub use factory::{FieldDecl, HookCreator, HooksFactory};
pub use hook::{field_aggregate, field_invariant, Hook, InitHookFn, PostInitHookFn, Target};
