pub mod browser;
pub mod cards;
pub mod portal;
pub mod traits;
pub mod types;

pub use browser::BrowserPortalScraper;
pub use cards::extract_listings;
pub use portal::HttpPortalScraper;
pub use traits::ScraperTrait;
pub use types::{load_profiles, CardSelectors, ListingDefaults, PortalProfile};

use anyhow::Result;
use std::time::Duration;

/// Picks the fetch strategy the profile asks for.
pub fn for_profile(profile: PortalProfile, timeout: Duration) -> Result<Box<dyn ScraperTrait>> {
    if profile.render {
        Ok(Box::new(BrowserPortalScraper::new(profile)))
    } else {
        Ok(Box::new(HttpPortalScraper::new(profile, timeout)?))
    }
}
