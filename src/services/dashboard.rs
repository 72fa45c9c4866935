//! Dashboard summary across metrics, chat and wins.

use serde::Serialize;

use super::CollectionService;
use crate::models::{Message, UserMetric, Win};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_cost: f64,
    pub total_conversions: f64,
    pub total_clicks: u64,
    /// Mean optimization score rounded to the nearest integer; `0` with no rows.
    pub average_optimization_score: i64,
    pub accounts: usize,
    pub recent_messages: Vec<Message>,
    pub recent_wins: Vec<Win>,
}

/// Aggregate the team-wide numbers shown on the dashboard. Each source is a
/// forgiving read, so an unavailable backend shows as zeros and empty feeds.
pub async fn summary(
    metrics: &CollectionService<UserMetric>,
    messages: &CollectionService<Message>,
    wins: &CollectionService<Win>,
) -> DashboardSummary {
    let (rows, recent_messages, recent_wins) = tokio::join!(metrics.get_all(), messages.recent(), wins.recent());

    DashboardSummary {
        total_cost: rows.iter().map(|row| row.cost).sum(),
        total_conversions: rows.iter().map(|row| row.conversions).sum(),
        total_clicks: rows.iter().map(|row| row.clicks).sum(),
        average_optimization_score: average_score(&rows),
        accounts: rows.len(),
        recent_messages,
        recent_wins,
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn average_score(rows: &[UserMetric]) -> i64 {
    if rows.is_empty() {
        return 0;
    }
    let total: f64 = rows.iter().map(|row| row.optimization_score).sum();
    (total / rows.len() as f64).round() as i64
}
