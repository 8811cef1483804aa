use crate::models::Source;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// CSS selectors locating listing cards and their fields on a results page.
/// Fields without a selector are recovered from the card text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardSelectors {
    /// One element per listing
    pub card: String,
    /// Element carrying the listing `href`; defaults to the card itself or its first link
    pub link: Option<String>,
    pub title: Option<String>,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub price: Option<String>,
    pub property_type: Option<String>,
    pub image: Option<String>,
}

/// Values filled in when the page does not say.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingDefaults {
    pub city: Option<String>,
    pub operation: Option<String>,
    pub property_type: Option<String>,
}

/// How to scrape one portal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalProfile {
    pub name: String,
    pub source: Source,
    /// Results pages to visit
    pub start_urls: Vec<String>,
    /// Base for resolving relative listing links
    pub base_url: String,
    /// Render with headless Chrome instead of a plain HTTP fetch
    #[serde(default)]
    pub render: bool,
    /// Seconds to let a rendered page settle
    #[serde(default = "default_wait_secs")]
    pub wait_secs: u64,
    pub selectors: CardSelectors,
    #[serde(default)]
    pub defaults: ListingDefaults,
}

fn default_wait_secs() -> u64 {
    5
}

/// Reads the portal profiles from a JSON array.
pub async fn load_profiles(path: &Path) -> Result<Vec<PortalProfile>> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read portal profiles from {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Invalid portal profiles in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_defaults() {
        let json = r#"{
            "name": "argenprop",
            "source": "argenprop",
            "start_urls": ["https://www.argenprop.com/casas/alquiler/rosario"],
            "base_url": "https://www.argenprop.com",
            "selectors": { "card": "div.listing__item" }
        }"#;
        let profile: PortalProfile = serde_json::from_str(json).unwrap();
        assert!(!profile.render);
        assert_eq!(profile.wait_secs, 5);
        assert_eq!(profile.source, Source::Argenprop);
        assert!(profile.selectors.address.is_none());
        assert!(profile.defaults.city.is_none());
    }

    #[tokio::test]
    async fn loads_profile_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portals.json");
        tokio::fs::write(
            &path,
            r#"[{"name":"remax","source":"remax","start_urls":[],"base_url":"https://www.remax.com.ar",
                "render":true,"wait_secs":8,"selectors":{"card":"div.card"},
                "defaults":{"city":"Rosario"}}]"#,
        )
        .await
        .unwrap();

        let profiles = load_profiles(&path).await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert!(profiles[0].render);
        assert_eq!(profiles[0].defaults.city.as_deref(), Some("Rosario"));
    }

    #[tokio::test]
    async fn missing_profile_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_profiles(&dir.path().join("nope.json")).await.is_err());
    }
}
