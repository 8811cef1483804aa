use crate::models::RawListing;
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for all portal scrapers
#[async_trait]
pub trait ScraperTrait: Send + Sync {
    /// Collect raw listings from the portal's results pages
    async fn scrape(&self) -> Result<Vec<RawListing>>;

    /// Name of the portal profile this scraper runs
    fn source_name(&self) -> &str;
}
