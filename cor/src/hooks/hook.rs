//! Hooks bound to a field and a construction phase.

use std::fmt;
use std::sync::Arc;

use crate::core::Value;
use crate::errors::{box_error, BoxError, FieldError, HookError};
use crate::record::{Record, RecordDraft};

use super::factory::HooksFactory;

/// Construction phase a hook runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// After all fields are staged, before sealing. May derive field values.
    Init,
    /// After sealing. Checks invariants, never mutates.
    PostInit,
}

/// Init hook: may return `(field_name, value)` to overwrite a field.
pub type InitHookFn =
    Arc<dyn Fn(&RecordDraft<'_>) -> Result<Option<(String, Value)>, FieldError> + Send + Sync>;

/// Post-init hook: returns an error when the sealed record is rejected.
pub type PostInitHookFn = Arc<dyn Fn(&Record) -> Result<(), FieldError> + Send + Sync>;

#[derive(Clone)]
enum Action {
    Init(InitHookFn),
    PostInit(PostInitHookFn),
}

/// A hook bound to a field name.
#[derive(Clone)]
pub struct Hook {
    field: String,
    action: Action,
}

impl Hook {
    /// Creates an `Init` hook.
    pub fn init(
        field: impl Into<String>,
        f: impl Fn(&RecordDraft<'_>) -> Result<Option<(String, Value)>, FieldError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            field: field.into(),
            action: Action::Init(Arc::new(f)),
        }
    }

    /// Creates a `PostInit` hook.
    pub fn post_init(
        field: impl Into<String>,
        f: impl Fn(&Record) -> Result<(), FieldError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            field: field.into(),
            action: Action::PostInit(Arc::new(f)),
        }
    }

    /// Returns the phase this hook runs in.
    #[must_use]
    pub const fn target(&self) -> Target {
        match self.action {
            Action::Init(_) => Target::Init,
            Action::PostInit(_) => Target::PostInit,
        }
    }

    /// Returns the field the hook is bound to.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Runs the hook against a record under construction.
    ///
    /// Post-init hooks do nothing here.
    pub fn run_init(&self, draft: &RecordDraft<'_>) -> Result<Option<(String, Value)>, FieldError> {
        match &self.action {
            Action::Init(f) => f(draft),
            Action::PostInit(_) => Ok(None),
        }
    }

    /// Runs the hook against a sealed record.
    ///
    /// Init hooks do nothing here.
    pub fn run_post_init(&self, record: &Record) -> Result<(), FieldError> {
        match &self.action {
            Action::PostInit(f) => f(record),
            Action::Init(_) => Ok(()),
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("field", &self.field)
            .field("target", &self.target())
            .finish()
    }
}

fn hook_failure(field: &str, err: anyhow::Error, wrap: fn(BoxError) -> HookError) -> FieldError {
    match err.downcast::<FieldError>() {
        Ok(field_err) => field_err,
        Err(err) => FieldError::invalid(field, wrap(box_error(err))),
    }
}

/// Creates a field invariant.
///
/// The check runs after the record is sealed and receives the record, the
/// field name and the field value (`None` when unset). Returning an error
/// aborts construction with an `InvalidFieldError` for the field.
pub fn field_invariant(
    check: impl Fn(&Record, &str, Option<&Value>) -> anyhow::Result<()> + Send + Sync + 'static,
) -> HooksFactory {
    let check = Arc::new(check);
    HooksFactory::from_fn(move |field_name| {
        let check = check.clone();
        let field = field_name.to_string();
        Hook::post_init(field_name, move |record| {
            check(record, &field, record.get(&field))
                .map_err(|err| hook_failure(&field, err, HookError::invariant))
        })
    })
}

/// Creates a field aggregate.
///
/// The function runs once all fields are staged and receives the draft, the
/// field name and the current value. Returning `Some(value)` overwrites the
/// field, which lets a field derive its value from other fields.
pub fn field_aggregate(
    aggregate: impl Fn(&RecordDraft<'_>, &str, Option<&Value>) -> anyhow::Result<Option<Value>>
        + Send
        + Sync
        + 'static,
) -> HooksFactory {
    let aggregate = Arc::new(aggregate);
    HooksFactory::from_fn(move |field_name| {
        let aggregate = aggregate.clone();
        let field = field_name.to_string();
        Hook::init(field_name, move |draft| {
            aggregate(draft, &field, draft.get(&field))
                .map(|value| value.map(|v| (field.clone(), v)))
                .map_err(|err| hook_failure(&field, err, HookError::aggregate))
        })
    })
}
