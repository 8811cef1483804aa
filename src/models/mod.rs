use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Portal a listing was collected from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Zonaprop,
    Argenprop,
    Remax,
    BienesRosario,
    LaCapital,
    MaPropiedades,
    Rentola,
    Roomix,
    Other(String),
}

impl Source {
    pub fn as_str(&self) -> &str {
        match self {
            Source::Zonaprop => "zonaprop",
            Source::Argenprop => "argenprop",
            Source::Remax => "remax",
            Source::BienesRosario => "bienes_rosario",
            Source::LaCapital => "la_capital",
            Source::MaPropiedades => "ma_propiedades",
            Source::Rentola => "rentola",
            Source::Roomix => "roomix",
            Source::Other(name) => name,
        }
    }

    /// Inverse of [`Source::as_str`]; unknown names become `Other`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "zonaprop" => Source::Zonaprop,
            "argenprop" => Source::Argenprop,
            "remax" => Source::Remax,
            "bienes_rosario" => Source::BienesRosario,
            "la_capital" => Source::LaCapital,
            "ma_propiedades" => Source::MaPropiedades,
            "rentola" => Source::Rentola,
            "roomix" => Source::Roomix,
            other => Source::Other(other.to_string()),
        }
    }
}

/// Currency a price is quoted in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Ars,
    Usd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Ars => "ARS",
            Currency::Usd => "USD",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ARS" => Some(Currency::Ars),
            "USD" => Some(Currency::Usd),
            _ => None,
        }
    }
}

/// A listing as scraped: every field is free text straight off the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListing {
    pub source: Source,
    pub url: String,
    pub external_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<String>,
    pub operation: Option<String>,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub address: Option<String>,
    pub price: Option<String>,
    pub expenses: Option<String>,
    pub rooms: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub garages: Option<String>,
    pub total_surface: Option<String>,
    pub covered_surface: Option<String>,
    pub pets: Option<String>,
    pub furnished: Option<String>,
    pub patio: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub scraped_at: DateTime<Utc>,
}

impl RawListing {
    /// Empty listing for `url`; scrapers fill in whatever the page offers.
    pub fn new(source: Source, url: impl Into<String>) -> Self {
        Self {
            source,
            url: url.into(),
            external_id: None,
            title: None,
            description: None,
            property_type: None,
            operation: None,
            city: None,
            neighborhood: None,
            address: None,
            price: None,
            expenses: None,
            rooms: None,
            bedrooms: None,
            bathrooms: None,
            garages: None,
            total_surface: None,
            covered_surface: None,
            pets: None,
            furnished: None,
            patio: None,
            images: Vec::new(),
            scraped_at: Utc::now(),
        }
    }

    /// The fields the listing filter looks at.
    pub fn zone_fields(&self) -> ZoneFields<'_> {
        ZoneFields {
            property_type: self.property_type.as_deref(),
            address: self.address.as_deref(),
            neighborhood: self.neighborhood.as_deref(),
            title: self.title.as_deref(),
        }
    }
}

/// Borrowed view of the columns used to decide whether a listing is in zone.
///
/// Both freshly scraped listings and stored properties project onto this,
/// so ingestion and the cleanup pass share one filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZoneFields<'a> {
    pub property_type: Option<&'a str>,
    pub address: Option<&'a str>,
    pub neighborhood: Option<&'a str>,
    pub title: Option<&'a str>,
}

impl<'a> ZoneFields<'a> {
    /// Address to geofence, falling back to the title when the address is
    /// absent or too short to hold a street and number.
    pub fn zone_address(&self) -> Option<&'a str> {
        match self.address {
            Some(address) if address.chars().count() >= 5 => Some(address),
            _ => self.title.or(self.address),
        }
    }
}

/// Location information for a property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Normalized property record, as persisted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub source: Source,
    pub url: String,
    pub external_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<String>,
    pub operation: Option<String>,
    pub location: Location,
    pub price: f64,
    pub currency: Currency,
    pub expenses: Option<f64>,
    pub rooms: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub garages: u32,
    pub total_surface: f64,
    pub covered_surface: f64,
    pub pets: bool,
    pub furnished: bool,
    pub patio: bool,
    pub images: Vec<String>,
    pub main_image: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

impl Property {
    pub fn zone_fields(&self) -> ZoneFields<'_> {
        ZoneFields {
            property_type: self.property_type.as_deref(),
            address: self.location.address.as_deref(),
            neighborhood: self.location.neighborhood.as_deref(),
            title: self.title.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_address_prefers_usable_address() {
        let fields = ZoneFields {
            address: Some("Mitre 1450"),
            title: Some("Casa en Mendoza 2100"),
            ..Default::default()
        };
        assert_eq!(fields.zone_address(), Some("Mitre 1450"));
    }

    #[test]
    fn zone_address_falls_back_to_title() {
        let fields = ZoneFields {
            address: Some("PB"),
            title: Some("Casa en Mendoza 2100"),
            ..Default::default()
        };
        assert_eq!(fields.zone_address(), Some("Casa en Mendoza 2100"));

        let no_address = ZoneFields {
            title: Some("PH Rioja 1800"),
            ..Default::default()
        };
        assert_eq!(no_address.zone_address(), Some("PH Rioja 1800"));
    }

    #[test]
    fn zone_address_keeps_short_address_without_title() {
        let fields = ZoneFields {
            address: Some("PB"),
            ..Default::default()
        };
        assert_eq!(fields.zone_address(), Some("PB"));
    }

    #[test]
    fn source_serializes_snake_case() {
        let json = serde_json::to_string(&Source::BienesRosario).unwrap();
        assert_eq!(json, "\"bienes_rosario\"");
        assert_eq!(Source::Other("roomix_ai".into()).as_str(), "roomix_ai");
    }

    #[test]
    fn source_names_round_trip() {
        assert_eq!(Source::from_name("la_capital"), Source::LaCapital);
        assert_eq!(Source::from_name("roomix_ai"), Source::Other("roomix_ai".into()));
        assert_eq!(Currency::from_code(Currency::Usd.as_str()), Some(Currency::Usd));
        assert_eq!(Currency::from_code("EUR"), None);
    }
}
