//! Record construction: merge input, stage fields, run hooks, seal.

use tracing::{debug, trace};

use super::instance::{Record, RecordDraft};
use super::schema::RecordType;
use crate::core::{Fields, Value};
use crate::errors::{AccessError, BoxError, FieldError, Phase, RecordError, ValidationError};
use crate::hooks::Target;

/// Merges an optional input mapping with overrides; overrides win.
pub(crate) fn merge_input(
    record: &str,
    values: Option<&Value>,
    overrides: Fields,
) -> Result<Fields, RecordError> {
    let mut merged = match values {
        None => Fields::new(),
        Some(value) => match value.to_fields() {
            Some(fields) => fields,
            None if !value.is_truthy() => Fields::new(),
            None => {
                let err = ValidationError::type_mismatch("mapping", value.clone());
                return Err(failure(record, Phase::Input, err));
            }
        },
    };
    merged.extend(overrides);
    Ok(merged)
}

fn failure(record: &str, phase: Phase, err: impl Into<BoxError>) -> RecordError {
    let err = RecordError::new(record, phase, err);
    debug!(record, %phase, error = %err.source, "Record construction failed");
    err
}

/// Builds a sealed record of `record_type` from the effective input.
pub(crate) fn build_record(record_type: &RecordType, input: &Fields) -> Result<Record, RecordError> {
    let name = record_type.name();
    let contract = record_type.contract();

    let mut fields = Fields::with_capacity(contract.len());
    for (field, op) in contract {
        match op.prepare_field(field, input) {
            Ok(Some(value)) => {
                trace!(record = name, field = field.as_str(), "Field staged");
                fields.insert(field.clone(), value);
            }
            Ok(None) => trace!(record = name, field = field.as_str(), "Field left unset"),
            Err(err) => return Err(failure(name, Phase::Fields, err)),
        }
    }

    let mut extra = Fields::new();
    if record_type.is_extensible() {
        for (key, value) in input {
            if !contract.contains_key(key) {
                extra.insert(key.clone(), value.clone());
            }
        }
    }

    for hook in record_type.hooks().iter().filter(|h| h.target() == Target::Init) {
        let update = hook
            .run_init(&RecordDraft::new(record_type, &fields, &extra))
            .map_err(|err| failure(name, Phase::Init, err))?;
        let Some((field, value)) = update else {
            continue;
        };
        trace!(record = name, field = field.as_str(), hook = hook.field(), "Field derived");
        if contract.contains_key(&field) {
            fields.insert(field, value);
        } else if record_type.is_extensible() {
            extra.insert(field, value);
        } else {
            let err = FieldError::from(AccessError::new(name, field));
            return Err(failure(name, Phase::Init, err));
        }
    }
    fields.sort_by(|a, _, b, _| contract.get_index_of(a).cmp(&contract.get_index_of(b)));

    let record = Record::seal(record_type.clone(), fields, extra);

    for hook in record_type
        .hooks()
        .iter()
        .filter(|h| h.target() == Target::PostInit)
    {
        hook.run_post_init(&record)
            .map_err(|err| failure(name, Phase::PostInit, err))?;
    }

    debug!(record = name, fields = record.len(), "Record sealed");
    Ok(record)
}
