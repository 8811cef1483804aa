use super::address;
use super::normalize::normalize;
use super::verdict::{Axis, Rejection, Verdict};
use super::zones::ZoneConfig;
use std::sync::Arc;

/// Addresses shorter than this cannot hold a street and a house number.
const MIN_ADDRESS_CHARS: usize = 5;

/// Decides whether an address lies inside the configured zone.
///
/// The zone is a union of per-street house-number intervals rather than a
/// polygon. Streets missing from the tables are rejected.
#[derive(Debug, Clone)]
pub struct GeoFence {
    config: Arc<ZoneConfig>,
}

impl GeoFence {
    pub fn new(config: Arc<ZoneConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    /// Runs the gates in order; the first one with an opinion decides.
    pub fn evaluate(&self, address: Option<&str>, neighborhood: Option<&str>) -> Verdict {
        match self.check(address, neighborhood) {
            Ok(()) => Verdict::Accepted,
            Err(rejection) => Verdict::Rejected(rejection),
        }
    }

    fn check(&self, address: Option<&str>, neighborhood: Option<&str>) -> Result<(), Rejection> {
        let config = &*self.config;

        // An allowed neighborhood never short-circuits the address checks.
        if let Some(name) = neighborhood.map(str::trim).filter(|name| !name.is_empty()) {
            if !config.allows_neighborhood(&normalize(Some(name))) {
                return Err(Rejection::Neighborhood(name.to_string()));
            }
        }

        let address = address
            .filter(|text| text.chars().count() >= MIN_ADDRESS_CHARS)
            .ok_or(Rejection::MissingAddress)?;

        let parsed = address::parse(Some(address)).ok_or(Rejection::UnparsedAddress)?;
        let (street, number) = parsed
            .located()
            .filter(|(_, number)| *number > 0)
            .ok_or(Rejection::UnparsedAddress)?;
        let key = normalize(Some(street));

        if let Some(zone) = config.exclusion_for(&key, number) {
            return Err(Rejection::ExcludedZone {
                zone: zone.name().to_string(),
                street: street.to_string(),
                number,
            });
        }

        if let Some(rule) = config.boundary_for(&key) {
            if rule.limit().allows(number) {
                return Ok(());
            }
            return Err(Rejection::Boundary {
                direction: rule.direction(),
                anchor: rule.anchor().to_string(),
            });
        }

        for (axis, streets) in [
            (Axis::NorthSouth, config.north_south()),
            (Axis::EastWest, config.east_west()),
        ] {
            if streets.contains(&key) {
                if streets.range().contains(&number) {
                    return Ok(());
                }
                return Err(Rejection::OutOfRange {
                    axis,
                    street: street.to_string(),
                    number,
                });
            }
        }

        Err(Rejection::UnknownStreet(street.to_string()))
    }
}

impl Default for GeoFence {
    fn default() -> Self {
        Self::new(Arc::new(ZoneConfig::rosario()))
    }
}
