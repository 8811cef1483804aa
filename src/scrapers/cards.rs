use super::types::PortalProfile;
use crate::models::RawListing;
use crate::pipeline::coerce::{mentions_affirmed, mentions_any};
use crate::pipeline::ingest::{PATIO_WORDS, PET_WORDS};
use crate::pipeline::normalize::collapse_whitespace;
use anyhow::{anyhow, Result};
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info};

static ROOMS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*amb").unwrap());
static BEDROOMS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*dorm").unwrap());
static BATHROOMS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*ba[ñn]o").unwrap());
static GARAGES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*coch").unwrap());
static SURFACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*m(?:²|2|ts)").unwrap());

const PET_TOPIC: &[&str] = &["mascota", "pet friendly", "pets"];

struct CompiledSelectors {
    card: Selector,
    link: Selector,
    title: Option<Selector>,
    address: Option<Selector>,
    neighborhood: Option<Selector>,
    price: Option<Selector>,
    property_type: Option<Selector>,
    image: Selector,
}

fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Failed to parse selector {:?}: {:?}", css, e))
}

fn compile_opt(css: &Option<String>) -> Result<Option<Selector>> {
    css.as_deref().map(compile).transpose()
}

impl CompiledSelectors {
    fn new(profile: &PortalProfile) -> Result<Self> {
        let selectors = &profile.selectors;
        Ok(Self {
            card: compile(&selectors.card)?,
            link: compile(selectors.link.as_deref().unwrap_or("a[href]"))?,
            title: compile_opt(&selectors.title)?,
            address: compile_opt(&selectors.address)?,
            neighborhood: compile_opt(&selectors.neighborhood)?,
            price: compile_opt(&selectors.price)?,
            property_type: compile_opt(&selectors.property_type)?,
            image: compile(selectors.image.as_deref().unwrap_or("img"))?,
        })
    }
}

/// Pulls every listing card out of a results page.
///
/// Cards without a link, or with neither title nor address, are skipped.
pub fn extract_listings(html: &str, profile: &PortalProfile) -> Result<Vec<RawListing>> {
    let selectors = CompiledSelectors::new(profile)?;
    let base = Url::parse(&profile.base_url)
        .map_err(|e| anyhow!("Invalid base URL {:?}: {}", profile.base_url, e))?;

    let document = Html::parse_document(html);
    let cards: Vec<_> = document.select(&selectors.card).collect();
    info!("Found {} cards on {} page", cards.len(), profile.name);

    let mut listings = Vec::new();
    for (idx, card) in cards.iter().enumerate() {
        match extract_card(card, &selectors, &base, profile) {
            Some(listing) => listings.push(listing),
            None => debug!("Skipped card {} on {}", idx, profile.name),
        }
    }
    Ok(listings)
}

fn extract_card(
    card: &ElementRef<'_>,
    selectors: &CompiledSelectors,
    base: &Url,
    profile: &PortalProfile,
) -> Option<RawListing> {
    let href = card
        .value()
        .attr("href")
        .or_else(|| card.select(&selectors.link).find_map(|a| a.value().attr("href")))?;
    let url = base.join(href.trim()).ok()?;

    let all_text = collapse_whitespace(&card.text().collect::<Vec<_>>().join(" "));
    let field = |selector: &Option<Selector>| {
        selector.as_ref().and_then(|sel| {
            card.select(sel)
                .map(|el| collapse_whitespace(&el.text().collect::<String>()))
                .find(|text| !text.is_empty())
        })
    };
    let from_text = |pattern: &Regex| {
        pattern
            .captures(&all_text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    };

    let mut listing = RawListing::new(profile.source.clone(), url.as_str());
    listing.external_id = url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map(str::to_string);
    listing.title = field(&selectors.title);
    listing.address = field(&selectors.address);
    listing.neighborhood = field(&selectors.neighborhood);
    listing.price = field(&selectors.price);
    listing.property_type = field(&selectors.property_type)
        .or_else(|| guess_property_type(&all_text))
        .or_else(|| profile.defaults.property_type.clone());
    listing.city = profile.defaults.city.clone();
    listing.operation = profile.defaults.operation.clone();
    listing.rooms = from_text(&ROOMS);
    listing.bedrooms = from_text(&BEDROOMS);
    listing.bathrooms = from_text(&BATHROOMS);
    listing.garages = from_text(&GARAGES);
    listing.total_surface = from_text(&SURFACE);
    listing.patio = mention_flag(&all_text, PATIO_WORDS, PATIO_WORDS);
    listing.pets = mention_flag(&all_text, PET_TOPIC, PET_WORDS);
    listing.images = card
        .select(&selectors.image)
        .filter_map(|img| img.value().attr("src").or_else(|| img.value().attr("data-src")))
        .filter_map(|src| base.join(src).ok())
        .map(String::from)
        .collect();

    if listing.title.is_none() && listing.address.is_none() {
        return None;
    }
    Some(listing)
}

/// "si" or "no" once the card talks about the amenity at all, so negated
/// text ("No se aceptan mascotas") is recorded instead of guessed.
fn mention_flag(text: &str, topic: &[&str], affirming: &[&str]) -> Option<String> {
    if !mentions_any(text, topic) {
        return None;
    }
    let value = if mentions_affirmed(text, affirming) { "si" } else { "no" };
    Some(value.into())
}

fn guess_property_type(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    if lower.contains("departamento") {
        Some("Departamento".into())
    } else if lower.contains("monoambiente") {
        Some("Monoambiente".into())
    } else if lower.contains("casa") {
        Some("Casa".into())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;
    use crate::scrapers::types::{CardSelectors, ListingDefaults};

    fn profile() -> PortalProfile {
        PortalProfile {
            name: "test".into(),
            source: Source::Argenprop,
            start_urls: vec![],
            base_url: "https://portal.example".into(),
            render: false,
            wait_secs: 0,
            selectors: CardSelectors {
                card: "div.card".into(),
                title: Some(".card__title".into()),
                address: Some(".card__address".into()),
                price: Some(".card__price".into()),
                ..Default::default()
            },
            defaults: ListingDefaults {
                city: Some("Rosario".into()),
                ..Default::default()
            },
        }
    }

    const PAGE: &str = r#"
        <html><body>
          <div class="card">
            <a href="/propiedades/casa-mitre--123">
              <h2 class="card__title">Casa   con patio</h2>
              <p class="card__address">Mitre 1200</p>
              <span class="card__price">$ 450.000</span>
              <ul><li>3 amb.</li><li>2 dorm.</li><li>1 baño</li><li>120 m²</li></ul>
              <img src="/img/123.jpg">
            </a>
          </div>
          <div class="card">
            <a href="https://portal.example/propiedades/depto-456">
              <p class="card__address">Córdoba 2100</p>
              <p>Departamento luminoso, acepta mascotas</p>
            </a>
          </div>
          <div class="card"><p>Sin enlace</p></div>
          <div class="card"><a href="/propiedades/789"><span>Destacado</span></a></div>
        </body></html>
    "#;

    #[test]
    fn extracts_cards() {
        let listings = extract_listings(PAGE, &profile()).unwrap();
        assert_eq!(listings.len(), 2);

        let house = &listings[0];
        assert_eq!(house.url, "https://portal.example/propiedades/casa-mitre--123");
        assert_eq!(house.external_id.as_deref(), Some("casa-mitre--123"));
        assert_eq!(house.title.as_deref(), Some("Casa con patio"));
        assert_eq!(house.address.as_deref(), Some("Mitre 1200"));
        assert_eq!(house.price.as_deref(), Some("$ 450.000"));
        assert_eq!(house.property_type.as_deref(), Some("Casa"));
        assert_eq!(house.rooms.as_deref(), Some("3"));
        assert_eq!(house.bedrooms.as_deref(), Some("2"));
        assert_eq!(house.bathrooms.as_deref(), Some("1"));
        assert_eq!(house.total_surface.as_deref(), Some("120"));
        assert_eq!(house.patio.as_deref(), Some("si"));
        assert_eq!(house.pets, None);
        assert_eq!(house.city.as_deref(), Some("Rosario"));
        assert_eq!(house.images, vec!["https://portal.example/img/123.jpg".to_string()]);

        let flat = &listings[1];
        assert_eq!(flat.property_type.as_deref(), Some("Departamento"));
        assert_eq!(flat.pets.as_deref(), Some("si"));
        assert!(flat.title.is_none());
    }

    #[test]
    fn negated_amenities_are_recorded_as_no() {
        let page = r#"
            <div class="card">
              <a href="/propiedades/ph-rioja-1800">
                <h2 class="card__title">PH sin patio</h2>
                <p class="card__address">Rioja 1800</p>
                <p>No se aceptan mascotas</p>
              </a>
            </div>
            <div class="card">
              <a href="/propiedades/casa-mitre-1500">
                <h2 class="card__title">Casa con terraza</h2>
                <p class="card__address">Mitre 1500</p>
                <p>Pet friendly</p>
              </a>
            </div>
        "#;
        let listings = extract_listings(page, &profile()).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].patio.as_deref(), Some("no"));
        assert_eq!(listings[0].pets.as_deref(), Some("no"));
        assert_eq!(listings[1].patio.as_deref(), Some("si"));
        assert_eq!(listings[1].pets.as_deref(), Some("si"));
    }

    #[test]
    fn invalid_selector_is_an_error() {
        let mut profile = profile();
        profile.selectors.card = "div[".into();
        assert!(extract_listings(PAGE, &profile).is_err());
    }
}
