//! PostgreSQL backend: one JSONB document per record.
//!
//! DESIGN
//! ======
//! Every collection shares the `records(collection, id, body)` table, so
//! adding an entity needs no migration. Id allocation bumps
//! `collection_ids.high_water` inside the insert transaction; the row lock
//! taken by `ON CONFLICT DO UPDATE` serializes concurrent inserts, and a
//! rolled-back insert releases its id. Read-modify-write runs under
//! `SELECT ... FOR UPDATE`.

use std::marker::PhantomData;

use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;

use super::{Builder, Mutation, Repository};
use crate::error::ServiceError;
use crate::record::{Record, duplicate_key};

/// Connect to `PostgreSQL` and apply pending migrations.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}

fn decode<T: Record>(body: Json<Value>) -> Result<T, ServiceError> {
    serde_json::from_value(body.0).map_err(|e| ServiceError::Database(sqlx::Error::Decode(Box::new(e))))
}

fn encode<T: Record>(record: &T) -> Result<Json<Value>, ServiceError> {
    serde_json::to_value(record)
        .map(Json)
        .map_err(|e| ServiceError::Database(sqlx::Error::Encode(Box::new(e))))
}

pub struct PgRepository<T> {
    pool: PgPool,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> PgRepository<T> {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool, _record: PhantomData }
    }

    /// Insert `fixture` when the collection has never been used. A
    /// collection that was emptied by deletes is left empty.
    ///
    /// Returns the number of records inserted.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure, including duplicate fixture ids.
    pub async fn seed_if_unused(&self, fixture: &[T]) -> Result<usize, ServiceError> {
        let mut tx = self.pool.begin().await?;
        let used: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM collection_ids WHERE collection = $1) \
             OR EXISTS (SELECT 1 FROM records WHERE collection = $1)",
        )
        .bind(T::COLLECTION)
        .fetch_one(&mut *tx)
        .await?;
        if used {
            return Ok(0);
        }

        for record in fixture {
            sqlx::query("INSERT INTO records (collection, id, body) VALUES ($1, $2, $3)")
                .bind(T::COLLECTION)
                .bind(record.id())
                .bind(encode(record)?)
                .execute(&mut *tx)
                .await?;
        }

        let high_water = fixture.iter().map(|record| record.id()).max().unwrap_or(0);
        sqlx::query("INSERT INTO collection_ids (collection, high_water) VALUES ($1, $2)")
            .bind(T::COLLECTION)
            .bind(high_water)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(collection = T::COLLECTION, count = fixture.len(), "seeded collection from fixture");
        Ok(fixture.len())
    }
}

#[async_trait::async_trait]
impl<T: Record> Repository<T> for PgRepository<T> {
    async fn all(&self) -> Result<Vec<T>, ServiceError> {
        let bodies: Vec<Json<Value>> =
            sqlx::query_scalar("SELECT body FROM records WHERE collection = $1 ORDER BY id")
                .bind(T::COLLECTION)
                .fetch_all(&self.pool)
                .await?;
        bodies.into_iter().map(decode).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<T>, ServiceError> {
        let body: Option<Json<Value>> =
            sqlx::query_scalar("SELECT body FROM records WHERE collection = $1 AND id = $2")
                .bind(T::COLLECTION)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        body.map(decode).transpose()
    }

    async fn insert(&self, build: Builder<T>) -> Result<T, ServiceError> {
        let mut tx = self.pool.begin().await?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO collection_ids (collection, high_water) \
             SELECT $1::text, COALESCE(MAX(id), 0) + 1 FROM records WHERE collection = $1::text \
             ON CONFLICT (collection) DO UPDATE \
             SET high_water = GREATEST(collection_ids.high_water, EXCLUDED.high_water - 1) + 1 \
             RETURNING high_water",
        )
        .bind(T::COLLECTION)
        .fetch_one(&mut *tx)
        .await?;

        // Dropping `tx` on a rejected draft rolls the allocation back.
        let record = build(id)?;
        if let Some((field, value)) = record.unique_key() {
            // The `collection_ids` row lock above serializes concurrent inserts.
            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM records \
                 WHERE collection = $1 AND body -> $2::text = to_jsonb($3::bigint))",
            )
            .bind(T::COLLECTION)
            .bind(field)
            .bind(value)
            .fetch_one(&mut *tx)
            .await?;
            if taken {
                return Err(duplicate_key::<T>(field, value));
            }
        }
        sqlx::query("INSERT INTO records (collection, id, body) VALUES ($1, $2, $3)")
            .bind(T::COLLECTION)
            .bind(id)
            .bind(encode(&record)?)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(record)
    }

    async fn mutate(&self, id: i64, apply: Mutation<T>) -> Result<Option<T>, ServiceError> {
        let mut tx = self.pool.begin().await?;
        let body: Option<Json<Value>> =
            sqlx::query_scalar("SELECT body FROM records WHERE collection = $1 AND id = $2 FOR UPDATE")
                .bind(T::COLLECTION)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(body) = body else {
            return Ok(None);
        };

        let mut record: T = decode(body)?;
        apply(&mut record)?;
        sqlx::query("UPDATE records SET body = $3 WHERE collection = $1 AND id = $2")
            .bind(T::COLLECTION)
            .bind(id)
            .bind(encode(&record)?)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(record))
    }

    async fn remove(&self, id: i64) -> Result<Option<T>, ServiceError> {
        let body: Option<Json<Value>> =
            sqlx::query_scalar("DELETE FROM records WHERE collection = $1 AND id = $2 RETURNING body")
                .bind(T::COLLECTION)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        body.map(decode).transpose()
    }
}

#[cfg(test)]
#[path = "postgres_test.rs"]
mod tests;
