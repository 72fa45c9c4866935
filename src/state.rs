//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds one [`CollectionService`] per collection, all built on the backend
//! chosen by configuration, plus the settings routes need at request time.

use std::sync::Arc;

use crate::config::{AppConfig, Backend};
use crate::error::ServiceError;
use crate::fixtures::{self, FixtureError};
use crate::latency::Latency;
use crate::models::*;
use crate::record::Record;
use crate::services::CollectionService;
use crate::store::Repository;
use crate::store::memory::MemoryRepository;
use crate::store::postgres::{self, PgRepository};
use crate::store::remote::{RemoteClient, RemoteRepository};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("database init failed: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// APP STATE
// =============================================================================

/// Clone is required by Axum; every service is an `Arc` over its repository.
#[derive(Clone)]
pub struct AppState {
    pub messages: CollectionService<Message>,
    pub wins: CollectionService<Win>,
    pub recommendations: CollectionService<Recommendation>,
    pub tools: CollectionService<Tool>,
    pub scripts: CollectionService<Script>,
    pub learning: CollectionService<LearningPage>,
    pub calendar: CollectionService<CalendarEvent>,
    pub users: CollectionService<User>,
    pub metrics: CollectionService<UserMetric>,
    pub current_user_id: i64,
    pub access_request_recipient: Arc<str>,
}

/// Builds one repository per collection for a given backend.
trait RepositoryFactory {
    async fn build<T: Record>(&self) -> Result<Arc<dyn Repository<T>>, StartupError>;
}

struct MemoryFactory<'a> {
    fixture_dir: Option<&'a std::path::Path>,
}

impl RepositoryFactory for MemoryFactory<'_> {
    async fn build<T: Record>(&self) -> Result<Arc<dyn Repository<T>>, StartupError> {
        let fixture = fixtures::load::<T>(self.fixture_dir)?;
        Ok(Arc::new(MemoryRepository::seeded(fixture)?))
    }
}

struct RemoteFactory {
    client: Arc<RemoteClient>,
}

impl RepositoryFactory for RemoteFactory {
    async fn build<T: Record>(&self) -> Result<Arc<dyn Repository<T>>, StartupError> {
        Ok(Arc::new(RemoteRepository::<T>::new(self.client.clone())))
    }
}

struct PgFactory<'a> {
    pool: sqlx::PgPool,
    fixture_dir: Option<&'a std::path::Path>,
}

impl RepositoryFactory for PgFactory<'_> {
    async fn build<T: Record>(&self) -> Result<Arc<dyn Repository<T>>, StartupError> {
        let repo = PgRepository::<T>::new(self.pool.clone());
        repo.seed_if_unused(&fixtures::load::<T>(self.fixture_dir)?).await?;
        Ok(Arc::new(repo))
    }
}

impl AppState {
    /// Build every collection service on the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `StartupError` when fixtures are invalid or the backend cannot
    /// be reached.
    pub async fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let fixture_dir = config.fixture_dir.as_deref();
        match &config.backend {
            Backend::Memory => Self::build(&MemoryFactory { fixture_dir }, config).await,
            Backend::Remote(remote) => {
                let client = Arc::new(RemoteClient::new(remote)?);
                Self::build(&RemoteFactory { client }, config).await
            }
            Backend::Postgres { database_url, max_connections } => {
                let pool = postgres::connect(database_url, *max_connections).await?;
                Self::build(&PgFactory { pool, fixture_dir }, config).await
            }
        }
    }

    async fn build(factory: &impl RepositoryFactory, config: &AppConfig) -> Result<Self, StartupError> {
        let latency = Latency::new(config.latency);
        Ok(Self {
            messages: CollectionService::new(factory.build().await?, latency),
            wins: CollectionService::new(factory.build().await?, latency),
            recommendations: CollectionService::new(factory.build().await?, latency),
            tools: CollectionService::new(factory.build().await?, latency),
            scripts: CollectionService::new(factory.build().await?, latency),
            learning: CollectionService::new(factory.build().await?, latency),
            calendar: CollectionService::new(factory.build().await?, latency),
            users: CollectionService::new(factory.build().await?, latency),
            metrics: CollectionService::new(factory.build().await?, latency),
            current_user_id: config.current_user_id,
            access_request_recipient: Arc::from(config.access_request_recipient.as_str()),
        })
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;

    /// Memory-backed state seeded with the embedded fixtures, no latency.
    pub async fn test_app_state() -> AppState {
        AppState::from_config(&AppConfig::default())
            .await
            .expect("embedded fixtures load")
    }
}
