//! Hook factories and field declarations.

use std::fmt;
use std::sync::Arc;

use crate::contracts::Op;
use crate::core::{Tag, ValueKind};

use super::hook::Hook;

/// Creates a hook bound to a field name.
pub type HookCreator = Arc<dyn Fn(&str) -> Hook + Send + Sync>;

/// Ordered list of hook creators attached to a field declaration.
#[derive(Clone, Default)]
pub struct HooksFactory {
    creators: Vec<HookCreator>,
}

impl HooksFactory {
    /// Creates an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory from a single hook creator.
    pub fn from_fn(create: impl Fn(&str) -> Hook + Send + Sync + 'static) -> Self {
        Self {
            creators: vec![Arc::new(create)],
        }
    }

    /// Binds every creator to `field_name`.
    #[must_use]
    pub fn gen_hooks(&self, field_name: &str) -> Vec<Hook> {
        self.creators.iter().map(|create| create(field_name)).collect()
    }

    /// Appends the creators of `other` after this factory's creators.
    #[must_use]
    pub fn chain(mut self, other: Self) -> Self {
        self.creators.extend(other.creators);
        self
    }

    /// Returns the number of creators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.creators.len()
    }

    /// Returns true if there are no creators.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }
}

impl fmt::Debug for HooksFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HooksFactory")
            .field("creators", &self.creators.len())
            .finish()
    }
}

/// A field declaration: the field's operation plus its hooks.
///
/// Hooks sit on top of an operation and never take part in conversion pipes:
/// a `FieldDecl` cannot be turned back into an [`Op`].
#[derive(Debug, Clone)]
pub struct FieldDecl {
    operation: Op,
    hooks: HooksFactory,
}

impl FieldDecl {
    /// Declares a field converted by `operation`, without hooks.
    #[must_use]
    pub fn new(operation: impl Into<Op>) -> Self {
        Self {
            operation: operation.into(),
            hooks: HooksFactory::new(),
        }
    }

    /// Returns the field operation.
    #[must_use]
    pub fn operation(&self) -> &Op {
        &self.operation
    }

    /// Returns the hooks factory.
    #[must_use]
    pub fn hooks(&self) -> &HooksFactory {
        &self.hooks
    }

    /// Adds more hooks after the existing ones.
    #[must_use]
    pub fn with_hooks(mut self, hooks: HooksFactory) -> Self {
        self.hooks = self.hooks.chain(hooks);
        self
    }
}

impl Op {
    /// Attaches hooks, turning the operation into a field declaration.
    #[must_use]
    pub fn with_hooks(self, hooks: HooksFactory) -> FieldDecl {
        FieldDecl::new(self).with_hooks(hooks)
    }
}

impl From<Op> for FieldDecl {
    fn from(operation: Op) -> Self {
        Self::new(operation)
    }
}

impl From<ValueKind> for FieldDecl {
    fn from(kind: ValueKind) -> Self {
        Self::new(kind)
    }
}

impl From<Tag> for FieldDecl {
    fn from(tag: Tag) -> Self {
        Self::new(tag)
    }
}
