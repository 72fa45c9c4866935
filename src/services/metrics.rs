//! Per-member account metrics, addressed by user id.

use super::CollectionService;
use crate::error::ServiceError;
use crate::models::UserMetric;
use crate::record::{Data, Record};

impl CollectionService<UserMetric> {
    /// The metrics row belonging to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` (keyed by the user id) when the member has no row,
    /// or the backend error.
    pub async fn get_by_user_id(&self, user_id: i64) -> Result<UserMetric, ServiceError> {
        self.latency.wait().await;
        self.repo
            .all()
            .await?
            .into_iter()
            .find(|metric| metric.user_id == user_id)
            .ok_or(ServiceError::not_found(UserMetric::COLLECTION, user_id))
    }

    /// Patch the metrics row belonging to `user_id`. Ratio columns are
    /// recomputed from the counters.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the member has no row and `Validation` for a
    /// rejected patch.
    pub async fn update_for_user(&self, user_id: i64, patch: Data) -> Result<UserMetric, ServiceError> {
        let metric = self.get_by_user_id(user_id).await?;
        self.update(metric.id, patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_helpers::fixture_service;
    use serde_json::json;

    #[tokio::test]
    async fn get_by_user_id_finds_row() {
        let metrics = fixture_service::<UserMetric>();
        let row = metrics.get_by_user_id(3).await.unwrap();
        assert_eq!(row.account, "Contoso Dental");
        assert!(matches!(
            metrics.get_by_user_id(1).await,
            Err(ServiceError::NotFound { collection: "metrics", id: 1 })
        ));
    }

    #[tokio::test]
    async fn create_rejects_second_row_for_user() {
        let metrics = fixture_service::<UserMetric>();
        let draft = |user_id: i64| serde_json::from_value(json!({"user_id": user_id, "account": "Acme"})).unwrap();

        let err = metrics.create(draft(3)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m.contains("user_id")));
        assert_eq!(metrics.get_all().await.len(), 3);

        let row = metrics.create(draft(1)).await.unwrap();
        assert_eq!((row.id, row.user_id), (4, 1));
    }

    #[tokio::test]
    async fn update_for_user_recomputes_ratios() {
        let metrics = fixture_service::<UserMetric>();
        let mut patch = Data::new();
        patch.insert("clicks".into(), json!(5000));
        patch.insert("cost".into(), json!(5000.0));
        let row = metrics.update_for_user(2, patch).await.unwrap();
        assert_eq!(row.clicks, 5000);
        assert!((row.avg_cpc - 1.0).abs() < 1e-9);
        assert!((row.ctr - 5000.0 / 150_000.0 * 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn update_for_user_rejects_ratio_overwrite() {
        let metrics = fixture_service::<UserMetric>();
        let mut patch = Data::new();
        patch.insert("ctr".into(), json!(99.0));
        assert!(matches!(metrics.update_for_user(2, patch).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn update_for_user_validates_score() {
        let metrics = fixture_service::<UserMetric>();
        let mut patch = Data::new();
        patch.insert("optimization_score".into(), json!(140.0));
        assert!(matches!(metrics.update_for_user(2, patch).await, Err(ServiceError::Validation(_))));
    }
}
