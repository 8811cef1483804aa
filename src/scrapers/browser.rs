use super::cards::extract_listings;
use super::traits::ScraperTrait;
use super::types::PortalProfile;
use crate::models::RawListing;
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// Scraper for portals that build their listing cards with JavaScript,
/// rendered in headless Chrome
pub struct BrowserPortalScraper {
    profile: PortalProfile,
}

impl BrowserPortalScraper {
    pub fn new(profile: PortalProfile) -> Self {
        Self { profile }
    }
}

fn launch() -> Result<Browser> {
    info!("Launching headless Chrome...");

    let options = LaunchOptions::default_builder()
        .headless(true)
        .build()
        .context("Failed to build launch options")?;

    Browser::new(options).context("Failed to launch Chrome browser")
}

/// Loads `url`, dismisses the cookie banner and returns the rendered HTML.
fn render(browser: &Browser, url: &str, wait: Duration) -> Result<String> {
    let tab = browser.new_tab()?;

    tab.navigate_to(url)?;
    tab.wait_until_navigated()?;

    info!("Waiting {:?} for {} to settle...", wait, url);
    thread::sleep(wait);

    let _ = tab.evaluate(
        r#"
        const button = document.querySelector('button[id*="accept"], button[id*="aceptar"], button[class*="cookie"]');
        if (button) button.click();
        "#,
        false,
    );
    thread::sleep(Duration::from_secs(1));

    let html = tab
        .evaluate("document.documentElement.outerHTML", false)?
        .value
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default();
    let _ = tab.close(true);
    Ok(html)
}

fn scrape_blocking(profile: &PortalProfile) -> Result<Vec<RawListing>> {
    let browser = launch()?;
    let wait = Duration::from_secs(profile.wait_secs);

    let mut listings = Vec::new();
    for url in &profile.start_urls {
        let html = render(&browser, url, wait)?;
        if html.is_empty() {
            warn!("Could not get HTML from {}", url);
            continue;
        }
        listings.extend(extract_listings(&html, profile)?);
    }
    Ok(listings)
}

#[async_trait]
impl ScraperTrait for BrowserPortalScraper {
    async fn scrape(&self) -> Result<Vec<RawListing>> {
        info!("Starting {} browser scrape", self.profile.name);

        // headless_chrome blocks; keep it off the async workers
        let profile = self.profile.clone();
        let listings = tokio::task::spawn_blocking(move || scrape_blocking(&profile))
            .await
            .context("Browser scrape task panicked")??;

        info!("✅ Scraped {} listings from {}", listings.len(), self.profile.name);
        Ok(listings)
    }

    fn source_name(&self) -> &str {
        &self.profile.name
    }
}
