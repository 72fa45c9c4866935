//! Record — the contract every collection entity implements.
//!
//! DESIGN
//! ======
//! A record is a serde-serializable struct with an integer id. Creation goes
//! through a typed draft (`Record::Draft`) so the caller can never supply the
//! id or the creation timestamp. Partial updates are flat JSON maps merged
//! onto the serialized record and decoded back, which keeps `update`
//! generic across all entities while still type-checking every field.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;

use crate::error::ServiceError;

/// Flat key-value payload for partial updates.
pub type Data = HashMap<String, serde_json::Value>;

pub trait Record: Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Caller-supplied fields for `create`.
    type Draft: DeserializeOwned + Send + 'static;

    /// Collection name used in errors, logs, routes and the Postgres table.
    const COLLECTION: &'static str;

    /// Table name on the hosted CRUD backend.
    const REMOTE_TABLE: &'static str;

    /// Serialized field names that `update` may not change.
    const READ_ONLY: &'static [&'static str] = &["id"];

    /// `(canonical, hosted)` pairs for fields the hosted backend names
    /// differently, before the `_c` suffix is applied.
    const REMOTE_RENAMES: &'static [(&'static str, &'static str)] = &[];

    fn id(&self) -> i64;

    /// Build a new record from a draft. `id` and `now` are assigned by the store.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if required draft fields are missing or malformed.
    fn from_draft(id: i64, now: OffsetDateTime, draft: Self::Draft) -> Result<Self, ServiceError>;

    /// Check field-level invariants after a merge.
    ///
    /// # Errors
    ///
    /// Returns `Validation` describing the first violated rule.
    fn validate(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    /// Hook run on every successful `update`.
    fn touch(&mut self, _now: OffsetDateTime) {}

    /// A `(field, value)` pair that no two records in the collection may
    /// share. Stores check it on insert.
    fn unique_key(&self) -> Option<(&'static str, i64)> {
        None
    }

    /// Natural ordering of `get_all`.
    fn sort(records: &mut [Self]) {
        records.sort_by_key(Self::id);
    }
}

/// Reject `record` when any of `existing` already holds its unique key.
///
/// # Errors
///
/// Returns `Validation` naming the clashing field and value.
pub fn ensure_unique<'a, T: Record>(record: &T, existing: impl IntoIterator<Item = &'a T>) -> Result<(), ServiceError> {
    let Some(key) = record.unique_key() else {
        return Ok(());
    };
    if existing.into_iter().any(|other| other.unique_key() == Some(key)) {
        return Err(duplicate_key::<T>(key.0, key.1));
    }
    Ok(())
}

/// The `Validation` error for a second record with the same unique key.
pub fn duplicate_key<T: Record>(field: &str, value: i64) -> ServiceError {
    ServiceError::validation(format!("{} already has a record with `{field}` {value}", T::COLLECTION))
}

/// Current UTC time.
#[must_use]
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Sort newest first by `timestamp`, breaking ties by descending id so that
/// records created within the same clock tick keep creation order.
pub fn sort_newest_first<T: Record>(records: &mut [T], timestamp: impl Fn(&T) -> OffsetDateTime) {
    records.sort_by(|a, b| {
        timestamp(b)
            .cmp(&timestamp(a))
            .then_with(|| b.id().cmp(&a.id()))
    });
}

/// Require a non-blank string field.
///
/// # Errors
///
/// Returns `Validation` naming the field when `value` is empty or whitespace.
pub fn require(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(format!("`{field}` is required")));
    }
    Ok(())
}

// =============================================================================
// PARTIAL UPDATE
// =============================================================================

/// Shallow-merge `patch` onto `record`.
///
/// Caller fields win and unspecified fields are preserved. Read-only fields
/// may be echoed back unchanged but not modified.
///
/// # Errors
///
/// Returns `Validation` for unknown fields, read-only changes, wrongly typed
/// values, or a merged record that fails [`Record::validate`].
pub fn apply_patch<T: Record>(record: &T, patch: &Data) -> Result<T, ServiceError> {
    let mut value = serde_json::to_value(record)
        .map_err(|e| ServiceError::validation(format!("cannot encode {} record: {e}", T::COLLECTION)))?;
    let Some(fields) = value.as_object_mut() else {
        return Err(ServiceError::validation(format!("{} record is not an object", T::COLLECTION)));
    };

    for (key, incoming) in patch {
        let Some(slot) = fields.get_mut(key) else {
            return Err(ServiceError::validation(format!("unknown field `{key}`")));
        };
        if T::READ_ONLY.contains(&key.as_str()) {
            if slot != incoming {
                return Err(ServiceError::validation(format!("field `{key}` is read-only")));
            }
            continue;
        }
        *slot = incoming.clone();
    }

    let merged: T = serde_json::from_value(value)
        .map_err(|e| ServiceError::validation(format!("invalid {} update: {e}", T::COLLECTION)))?;
    merged.validate()?;
    Ok(merged)
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
