//! Collection services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! [`CollectionService`] implements the CRUD contract shared by every
//! collection over an injected [`Repository`]. Entity-specific operations
//! (votes, reactions, awards, ...) live in the sibling modules as inherent
//! impls on the concrete `CollectionService<Entity>` type, so routes call
//! `state.messages.react(..)` next to `state.messages.get_all()`.
//!
//! ERROR HANDLING
//! ==============
//! Listing reads are forgiving: a backend failure is logged and yields an
//! empty list. Lookups by id and every mutation propagate `ServiceError`.

pub mod calendar;
pub mod dashboard;
pub mod learning;
pub mod message;
pub mod metrics;
pub mod recommendation;
pub mod script;
pub mod tool;
pub mod user;
pub mod win;

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::error::ServiceError;
use crate::latency::Latency;
use crate::record::{Data, Record, apply_patch, now, sort_newest_first};
use crate::store::Repository;

/// Number of records returned by the `recent` feeds.
pub const RECENT_LIMIT: usize = 5;

#[derive(Clone)]
pub struct CollectionService<T: Record> {
    repo: Arc<dyn Repository<T>>,
    latency: Latency,
}

impl<T: Record> CollectionService<T> {
    #[must_use]
    pub fn new(repo: Arc<dyn Repository<T>>, latency: Latency) -> Self {
        Self { repo, latency }
    }

    /// Every record in the collection's natural order. Empty on read failure.
    pub async fn get_all(&self) -> Vec<T> {
        self.latency.wait().await;
        match self.repo.all().await {
            Ok(mut records) => {
                T::sort(&mut records);
                records
            }
            Err(e) => {
                warn!(collection = T::COLLECTION, error = %e, "listing failed; returning empty list");
                Vec::new()
            }
        }
    }

    /// # Errors
    ///
    /// Returns `NotFound` when `id` is absent, or the backend error.
    pub async fn get_by_id(&self, id: i64) -> Result<T, ServiceError> {
        self.latency.wait().await;
        self.repo
            .get(id)
            .await?
            .ok_or(ServiceError::not_found(T::COLLECTION, id))
    }

    /// Store a new record. Id and creation time are assigned here.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the draft is incomplete, or the backend error.
    pub async fn create(&self, draft: T::Draft) -> Result<T, ServiceError> {
        self.latency.wait().await;
        let record = self
            .repo
            .insert(Box::new(move |id| T::from_draft(id, now(), draft)))
            .await?;
        info!(collection = T::COLLECTION, id = record.id(), "record created");
        Ok(record)
    }

    /// Shallow-merge `patch` into the stored record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when `id` is absent, `Validation` when the patch
    /// names unknown or read-only fields or the merged record is invalid.
    pub async fn update(&self, id: i64, patch: Data) -> Result<T, ServiceError> {
        self.latency.wait().await;
        let updated = self
            .apply(id, move |record| {
                let mut merged = apply_patch(record, &patch)?;
                merged.touch(now());
                *record = merged;
                Ok(())
            })
            .await?;
        info!(collection = T::COLLECTION, id, "record updated");
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns `NotFound` when `id` is absent, or the backend error.
    pub async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        self.latency.wait().await;
        self.repo
            .remove(id)
            .await?
            .ok_or(ServiceError::not_found(T::COLLECTION, id))?;
        info!(collection = T::COLLECTION, id, "record deleted");
        Ok(true)
    }

    /// Run `mutation` against the stored record and return the result.
    /// No latency is applied; callers are public operations that already
    /// waited.
    async fn apply<F>(&self, id: i64, mutation: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut T) -> Result<(), ServiceError> + Send + 'static,
    {
        self.repo
            .mutate(id, Box::new(mutation))
            .await?
            .ok_or(ServiceError::not_found(T::COLLECTION, id))
    }

    /// Entity mutation with simulated latency.
    async fn mutate<F>(&self, id: i64, mutation: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut T) -> Result<(), ServiceError> + Send + 'static,
    {
        self.latency.wait().await;
        self.apply(id, mutation).await
    }

    /// Forgiving read filtered by `keep`.
    async fn filtered(&self, keep: impl Fn(&T) -> bool) -> Vec<T> {
        let mut records = self.get_all().await;
        records.retain(|record| keep(record));
        records
    }

    /// The newest [`RECENT_LIMIT`] records by `timestamp`.
    async fn recent_by(&self, timestamp: impl Fn(&T) -> OffsetDateTime) -> Vec<T> {
        let mut records = self.get_all().await;
        sort_newest_first(&mut records, timestamp);
        records.truncate(RECENT_LIMIT);
        records
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::store::memory::MemoryRepository;

    /// Memory-backed service seeded with `records`, no latency.
    #[must_use]
    pub fn memory_service<T: Record>(records: Vec<T>) -> CollectionService<T> {
        let repo = MemoryRepository::seeded(records).expect("test records have unique ids");
        CollectionService::new(Arc::new(repo), Latency::default())
    }

    /// Memory-backed service seeded with the embedded fixture.
    #[must_use]
    pub fn fixture_service<T: Record>() -> CollectionService<T> {
        memory_service(crate::fixtures::load::<T>(None).expect("embedded fixture parses"))
    }

    /// Repository whose every call fails, for forgiving-read tests.
    pub struct FailingRepository;

    #[async_trait::async_trait]
    impl<T: Record> Repository<T> for FailingRepository {
        async fn all(&self) -> Result<Vec<T>, ServiceError> {
            Err(ServiceError::External("backend unavailable".into()))
        }

        async fn get(&self, _id: i64) -> Result<Option<T>, ServiceError> {
            Err(ServiceError::External("backend unavailable".into()))
        }

        async fn insert(&self, _build: crate::store::Builder<T>) -> Result<T, ServiceError> {
            Err(ServiceError::External("backend unavailable".into()))
        }

        async fn mutate(&self, _id: i64, _apply: crate::store::Mutation<T>) -> Result<Option<T>, ServiceError> {
            Err(ServiceError::External("backend unavailable".into()))
        }

        async fn remove(&self, _id: i64) -> Result<Option<T>, ServiceError> {
            Err(ServiceError::External("backend unavailable".into()))
        }
    }

    #[must_use]
    pub fn failing_service<T: Record>() -> CollectionService<T> {
        CollectionService::new(Arc::new(FailingRepository), Latency::default())
    }
}

#[cfg(test)]
#[path = "services_test.rs"]
mod tests;
