use super::cards::extract_listings;
use super::traits::ScraperTrait;
use super::types::PortalProfile;
use crate::models::RawListing;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Scraper for portals that serve their listing cards as plain HTML
pub struct HttpPortalScraper {
    client: Client,
    profile: PortalProfile,
}

impl HttpPortalScraper {
    pub fn new(profile: PortalProfile, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, profile })
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            warn!("{} returned status: {}", self.profile.name, response.status());
            anyhow::bail!("Failed to fetch {}: {}", url, response.status());
        }

        let html = response.text().await.context("Failed to read response body")?;
        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(html)
    }
}

#[async_trait]
impl ScraperTrait for HttpPortalScraper {
    async fn scrape(&self) -> Result<Vec<RawListing>> {
        info!("Starting {} scrape", self.profile.name);

        let mut listings = Vec::new();
        for url in &self.profile.start_urls {
            let html = self.fetch(url).await?;
            let found = extract_listings(&html, &self.profile)?;
            if found.is_empty() {
                warn!("No listings found on {} - page layout may have changed", url);
            }
            listings.extend(found);
        }

        info!("✅ Scraped {} listings from {}", listings.len(), self.profile.name);
        Ok(listings)
    }

    fn source_name(&self) -> &str {
        &self.profile.name
    }
}
