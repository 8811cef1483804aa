use super::coerce::{detect_currency, mentions_affirmed, to_amount, to_boolean, to_count};
use super::filter::ListingFilter;
use super::normalize::collapse_whitespace;
use super::verdict::Verdict;
use crate::models::{Location, Property, RawListing};
use crate::store::{ListingStore, StoreError};
use tracing::{debug, info};

pub(crate) const PATIO_WORDS: &[&str] = &["patio", "jardín", "quincho", "parrilla", "terraza"];
pub(crate) const PET_WORDS: &[&str] = &[
    "acepta mascota",
    "aceptan mascota",
    "permite mascota",
    "admite mascota",
    "apto mascota",
    "pet friendly",
    "pets allowed",
];
const FURNISHED_WORDS: &[&str] = &["amoblado", "amueblado"];

/// Turns a scraped listing into a typed [`Property`].
pub fn normalize_listing(raw: RawListing) -> Property {
    let text = |value: Option<String>| {
        value
            .map(|v| collapse_whitespace(&v))
            .filter(|v| !v.is_empty())
    };
    let count = |value: &Option<String>, unit: &str| {
        value.as_deref().map_or(0, |v| to_count(v, unit))
    };
    let amount = |value: &Option<String>| value.as_deref().map_or(0.0, to_amount);

    let description = text(raw.description);
    // boolean fields are often missing; the description usually says it anyway
    let flag = |value: &Option<String>, keywords: &[&str]| match value.as_deref() {
        Some(v) => to_boolean(v),
        None => description
            .as_deref()
            .is_some_and(|d| mentions_affirmed(d, keywords)),
    };

    let rooms = count(&raw.rooms, "ambiente");
    let bedrooms = count(&raw.bedrooms, "dormitorio");
    let bathrooms = count(&raw.bathrooms, "baño");
    let garages = count(&raw.garages, "cochera");
    let price = amount(&raw.price);
    let total_surface = amount(&raw.total_surface);
    let covered_surface = amount(&raw.covered_surface);
    let currency = raw.price.as_deref().map(detect_currency).unwrap_or_default();
    let expenses = raw.expenses.as_deref().map(to_amount).filter(|v| *v > 0.0);
    let pets = flag(&raw.pets, PET_WORDS);
    let patio = flag(&raw.patio, PATIO_WORDS);
    let furnished = flag(&raw.furnished, FURNISHED_WORDS);

    Property {
        source: raw.source,
        url: raw.url,
        external_id: raw.external_id,
        title: text(raw.title),
        description,
        property_type: text(raw.property_type),
        operation: text(raw.operation),
        location: Location {
            city: text(raw.city),
            neighborhood: text(raw.neighborhood),
            address: text(raw.address),
            latitude: None,
            longitude: None,
        },
        price,
        currency,
        expenses,
        rooms,
        bedrooms,
        bathrooms,
        garages,
        total_surface,
        covered_surface,
        pets,
        furnished,
        patio,
        main_image: raw.images.first().cloned(),
        images: raw.images,
        scraped_at: raw.scraped_at,
    }
}

/// Counters for one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub scraped: usize,
    pub rejected: usize,
    pub stored: usize,
    pub duplicates: usize,
}

/// Filter first, then normalize; rejected listings are dropped.
#[derive(Debug, Clone, Default)]
pub struct IngestPipeline {
    filter: ListingFilter,
}

impl IngestPipeline {
    pub fn new(filter: ListingFilter) -> Self {
        Self { filter }
    }

    pub fn process(&self, raw: RawListing) -> Result<Property, Verdict> {
        let verdict = self.filter.accepts(&raw.zone_fields());
        if !verdict.is_accepted() {
            debug!(
                "❌ Dropped {}: {} ({})",
                raw.url,
                raw.address.as_deref().unwrap_or("-"),
                verdict
            );
            return Err(verdict);
        }
        Ok(normalize_listing(raw))
    }

    /// Filters `listings` and inserts the survivors; a store failure aborts
    /// the run.
    pub fn run(
        &self,
        listings: Vec<RawListing>,
        store: &mut ListingStore,
    ) -> Result<IngestReport, StoreError> {
        let mut report = IngestReport {
            scraped: listings.len(),
            ..Default::default()
        };

        for raw in listings {
            match self.process(raw) {
                Ok(property) => {
                    if store.insert(&property)? {
                        report.stored += 1;
                    } else {
                        debug!("Already stored: {}", property.url);
                        report.duplicates += 1;
                    }
                }
                Err(_) => report.rejected += 1,
            }
        }

        info!(
            "Ingested {} listings: {} stored, {} duplicates, {} rejected",
            report.scraped, report.stored, report.duplicates, report.rejected
        );
        Ok(report)
    }
}
