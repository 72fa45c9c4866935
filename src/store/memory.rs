//! In-memory collection store.
//!
//! DESIGN
//! ======
//! Records live in a `BTreeMap` keyed by id behind a per-collection
//! `RwLock`. The store tracks a high-water mark so that deleting the record
//! with the largest id never causes that id to be handed out again.

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use super::{Builder, Mutation, Repository};
use crate::error::ServiceError;
use crate::fixtures::FixtureError;
use crate::record::{Record, ensure_unique};

/// Ordered records plus the largest id ever allocated.
#[derive(Debug)]
pub struct CollectionStore<T> {
    records: BTreeMap<i64, T>,
    high_water: i64,
}

impl<T: Record> CollectionStore<T> {
    #[must_use]
    fn new() -> Self {
        Self { records: BTreeMap::new(), high_water: 0 }
    }

    /// Build a store from fixture records.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if two fixture records share an id.
    pub fn seeded(fixture: Vec<T>) -> Result<Self, FixtureError> {
        let mut store = Self::new();
        for record in fixture {
            let id = record.id();
            if store.records.insert(id, record).is_some() {
                return Err(FixtureError::DuplicateId { collection: T::COLLECTION, id });
            }
            store.high_water = store.high_water.max(id);
        }
        Ok(store)
    }

    /// Next identifier: one past the larger of the current max id and the
    /// high-water mark. `1` for a collection that never held a record.
    pub fn allocate_id(&mut self) -> i64 {
        let max_existing = self.records.keys().next_back().copied().unwrap_or(0);
        self.high_water = self.high_water.max(max_existing) + 1;
        self.high_water
    }
}

pub struct MemoryRepository<T> {
    store: RwLock<CollectionStore<T>>,
}

impl<T: Record> MemoryRepository<T> {
    /// # Errors
    ///
    /// Returns `DuplicateId` if two fixture records share an id.
    pub fn seeded(fixture: Vec<T>) -> Result<Self, FixtureError> {
        Ok(Self { store: RwLock::new(CollectionStore::seeded(fixture)?) })
    }
}

#[async_trait::async_trait]
impl<T: Record> Repository<T> for MemoryRepository<T> {
    async fn all(&self) -> Result<Vec<T>, ServiceError> {
        let store = self.store.read().await;
        Ok(store.records.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<T>, ServiceError> {
        let store = self.store.read().await;
        Ok(store.records.get(&id).cloned())
    }

    async fn insert(&self, build: Builder<T>) -> Result<T, ServiceError> {
        let mut store = self.store.write().await;
        let max_before = store.high_water;
        let id = store.allocate_id();
        let built = build(id).and_then(|record| {
            ensure_unique(&record, store.records.values())?;
            Ok(record)
        });
        let record = match built {
            Ok(record) => record,
            Err(e) => {
                // Rejected drafts do not consume an id.
                store.high_water = max_before;
                return Err(e);
            }
        };
        store.records.insert(id, record.clone());
        Ok(record)
    }

    async fn mutate(&self, id: i64, apply: Mutation<T>) -> Result<Option<T>, ServiceError> {
        let mut store = self.store.write().await;
        let Some(current) = store.records.get(&id) else {
            return Ok(None);
        };

        let mut next = current.clone();
        apply(&mut next)?;
        store.records.insert(id, next.clone());
        Ok(Some(next))
    }

    async fn remove(&self, id: i64) -> Result<Option<T>, ServiceError> {
        let mut store = self.store.write().await;
        Ok(store.records.remove(&id))
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
