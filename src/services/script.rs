//! Script repository: category browsing.

use super::CollectionService;
use crate::models::Script;

impl CollectionService<Script> {
    /// Scripts whose category matches `category`, ignoring case. Empty on
    /// read failure.
    pub async fn by_category(&self, category: &str) -> Vec<Script> {
        let wanted = category.trim().to_lowercase();
        self.filtered(|script| script.category.to_lowercase() == wanted).await
    }
}
