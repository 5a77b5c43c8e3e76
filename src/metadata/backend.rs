use crate::models::{NewScreenshot, ScreenshotRecord};
use async_trait::async_trait;

/// Trait defining the interface for the screenshot metadata table
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Create the backing table if it does not exist yet. Idempotent.
    async fn ensure_schema(&self) -> Result<(), sqlx::Error>;

    /// Insert a row and return it with its assigned id
    async fn insert(&self, screenshot: NewScreenshot) -> Result<ScreenshotRecord, sqlx::Error>;

    /// Exact match on the public hash
    async fn find_by_hash(&self, hash: &str) -> Result<Option<ScreenshotRecord>, sqlx::Error>;

    /// All rows, newest upload first
    async fn list_recent(&self) -> Result<Vec<ScreenshotRecord>, sqlx::Error>;

    /// Returns whether a row was changed
    async fn update_title(&self, hash: &str, title: &str) -> Result<bool, sqlx::Error>;

    /// Returns whether a row was removed
    async fn delete(&self, hash: &str) -> Result<bool, sqlx::Error>;
}
