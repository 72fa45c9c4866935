//! Learning library: video uploads.

use serde::Deserialize;
use tracing::info;

use super::CollectionService;
use crate::error::ServiceError;
use crate::models::{LearningPage, VideoLink};
use crate::record::{now, require};

/// Caller-supplied video metadata. The upload date defaults to today.
#[derive(Debug, Deserialize)]
pub struct NewVideo {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub upload_date: Option<String>,
}

impl CollectionService<LearningPage> {
    /// Append a video to a page and refresh its `last_updated`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank title or url and `NotFound` when the
    /// page is absent.
    pub async fn upload_video(&self, page_id: i64, video: NewVideo) -> Result<VideoLink, ServiceError> {
        require("title", &video.title)?;
        require("url", &video.url)?;

        let uploaded_at = now();
        let video = VideoLink {
            title: video.title,
            url: video.url,
            duration: video.duration,
            description: video.description,
            upload_date: Some(
                video
                    .upload_date
                    .filter(|date| !date.trim().is_empty())
                    .unwrap_or_else(|| uploaded_at.date().to_string()),
            ),
        };

        let stored = video.clone();
        self.mutate(page_id, move |page: &mut LearningPage| {
            page.video_links.push(stored);
            page.last_updated = uploaded_at;
            Ok(())
        })
        .await?;
        info!(page_id, title = %video.title, "video uploaded");
        Ok(video)
    }
}
