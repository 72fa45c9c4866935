//! Team calendar: month view.

use time::Month;

use super::CollectionService;
use crate::error::ServiceError;
use crate::models::CalendarEvent;

impl CollectionService<CalendarEvent> {
    /// Events dated within `year`/`month` (1-based), in date order. Empty on
    /// read failure.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when `month` is not 1..=12.
    pub async fn by_month(&self, year: i32, month: u8) -> Result<Vec<CalendarEvent>, ServiceError> {
        let month = Month::try_from(month).map_err(|_| ServiceError::validation(format!("invalid month {month}")))?;
        Ok(self
            .filtered(|event| event.date.year() == year && event.date.month() == month)
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewCalendarEvent;
    use crate::services::test_helpers::fixture_service;

    #[tokio::test]
    async fn by_month_filters_on_year_and_month() {
        let events = fixture_service::<CalendarEvent>();
        let march = events.by_month(2025, 3).await.unwrap();
        assert_eq!(march.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(events.by_month(2024, 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn by_month_rejects_out_of_range_month() {
        let events = fixture_service::<CalendarEvent>();
        assert!(matches!(events.by_month(2025, 0).await, Err(ServiceError::Validation(_))));
        assert!(matches!(events.by_month(2025, 13).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn created_event_appears_in_its_month() {
        let events = fixture_service::<CalendarEvent>();
        let draft: NewCalendarEvent =
            serde_json::from_value(serde_json::json!({"title": "Offsite", "date": "2025-04-09"})).unwrap();
        let created = events.create(draft).await.unwrap();
        assert_eq!(created.kind, crate::models::calendar::DEFAULT_EVENT_TYPE);

        let april = events.by_month(2025, 4).await.unwrap();
        assert_eq!(april.iter().map(|e| e.id).collect::<Vec<_>>(), vec![4, created.id, 5]);
    }
}
