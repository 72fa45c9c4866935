//! Repository seam between services and storage backends.
//!
//! ARCHITECTURE
//! ============
//! Services never touch storage directly. Each collection gets one
//! `Arc<dyn Repository<T>>`, chosen at startup from configuration:
//!
//! - [`memory::MemoryRepository`]: fixture-seeded, process-lifetime state.
//!   Also the test double for every service test.
//! - [`remote::RemoteRepository`]: the hosted CRUD API.
//! - [`postgres::PgRepository`]: one JSONB document per record.
//!
//! DESIGN
//! ======
//! Id allocation happens inside the backend, under the same lock or
//! transaction that inserts the record, so ids stay unique and monotonic.
//! Mutations are closures applied to a copy of the stored record; the copy
//! replaces the original only if the closure succeeds, so a failed mutation
//! is never partially visible.

pub mod memory;
pub mod postgres;
pub mod remote;

use crate::error::ServiceError;
use crate::record::Record;

/// Builds a record once the backend has allocated its id.
pub type Builder<T> = Box<dyn FnOnce(i64) -> Result<T, ServiceError> + Send>;

/// Read-modify-write step applied atomically to one record.
pub type Mutation<T> = Box<dyn FnOnce(&mut T) -> Result<(), ServiceError> + Send>;

#[async_trait::async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// All records in storage order.
    async fn all(&self) -> Result<Vec<T>, ServiceError>;

    /// One record, or `None` when the id is absent.
    async fn get(&self, id: i64) -> Result<Option<T>, ServiceError>;

    /// Allocate an id, build the record with it, and store it.
    async fn insert(&self, build: Builder<T>) -> Result<T, ServiceError>;

    /// Apply `apply` to the stored record. `None` when the id is absent.
    async fn mutate(&self, id: i64, apply: Mutation<T>) -> Result<Option<T>, ServiceError>;

    /// Remove and return the record. `None` when the id is absent.
    async fn remove(&self, id: i64) -> Result<Option<T>, ServiceError>;
}
