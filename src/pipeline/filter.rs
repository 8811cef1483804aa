use super::geofence::GeoFence;
use super::verdict::{Rejection, Verdict};
use crate::models::ZoneFields;

/// Which property types are worth keeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTypePolicy {
    /// Any type containing one of these is dropped.
    pub blocked_markers: Vec<String>,
    /// Non-empty types must equal one of these.
    pub allowed: Vec<String>,
}

impl PropertyTypePolicy {
    /// Houses and PHs only.
    pub fn houses() -> Self {
        Self {
            blocked_markers: vec!["departamento".into(), "monoambiente".into()],
            allowed: vec!["casa".into(), "ph".into()],
        }
    }

    /// Unknown (empty) types pass.
    pub fn check(&self, property_type: Option<&str>) -> Result<(), Rejection> {
        let kind = property_type.unwrap_or_default().trim().to_lowercase();
        if kind.is_empty() {
            return Ok(());
        }
        let blocked = self
            .blocked_markers
            .iter()
            .any(|marker| kind.contains(marker.as_str()));
        if blocked || !self.allowed.iter().any(|allowed| *allowed == kind) {
            return Err(Rejection::PropertyType(kind));
        }
        Ok(())
    }
}

impl Default for PropertyTypePolicy {
    fn default() -> Self {
        Self::houses()
    }
}

/// Final accept/reject decision for one listing: property type, then zone.
///
/// Shared by live ingestion and the cleanup pass over stored listings.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    types: PropertyTypePolicy,
    fence: GeoFence,
}

impl ListingFilter {
    pub fn new(types: PropertyTypePolicy, fence: GeoFence) -> Self {
        Self { types, fence }
    }

    pub fn fence(&self) -> &GeoFence {
        &self.fence
    }

    pub fn accepts(&self, fields: &ZoneFields<'_>) -> Verdict {
        self.evaluate(fields, fields.address)
    }

    /// Like [`accepts`](Self::accepts) but geofences the title when the
    /// address is missing or too short. Stored rows from portals that only
    /// put the street in the headline rely on this.
    pub fn accepts_with_title_fallback(&self, fields: &ZoneFields<'_>) -> Verdict {
        self.evaluate(fields, fields.zone_address())
    }

    fn evaluate(&self, fields: &ZoneFields<'_>, address: Option<&str>) -> Verdict {
        if let Err(rejection) = self.types.check(fields.property_type) {
            return Verdict::Rejected(rejection);
        }
        self.fence.evaluate(address, fields.neighborhood)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields<'a>(property_type: Option<&'a str>, address: Option<&'a str>) -> ZoneFields<'a> {
        ZoneFields {
            property_type,
            address,
            ..Default::default()
        }
    }

    #[test]
    fn blocked_types_lose_even_with_valid_address() {
        let filter = ListingFilter::default();
        for kind in ["Departamento", "departamento 2 amb", "Monoambiente", " MONOAMBIENTE "] {
            let verdict = filter.accepts(&fields(Some(kind), Some("Mitre 1200")));
            assert!(
                matches!(verdict, Verdict::Rejected(Rejection::PropertyType(_))),
                "{kind} should be rejected"
            );
        }
    }

    #[test]
    fn unlisted_types_are_rejected() {
        let filter = ListingFilter::default();
        let verdict = filter.accepts(&fields(Some("Local comercial"), Some("Mitre 1200")));
        assert_eq!(verdict.reason(), "property type not permitted: local comercial");
    }

    #[test]
    fn allowed_and_empty_types_reach_the_geofence() {
        let filter = ListingFilter::default();
        assert!(filter.accepts(&fields(Some("Casa"), Some("Mitre 1200"))).is_accepted());
        assert!(filter.accepts(&fields(Some(" PH "), Some("Mitre 1200"))).is_accepted());
        assert!(filter.accepts(&fields(None, Some("Mitre 1200"))).is_accepted());
        assert!(filter.accepts(&fields(Some(""), Some("Mitre 1200"))).is_accepted());
        assert_eq!(
            filter.accepts(&fields(Some("Casa"), Some("Castellanos 500"))).reason(),
            "north of Castellanos"
        );
    }

    #[test]
    fn title_fallback_only_when_requested() {
        let filter = ListingFilter::default();
        let listing = ZoneFields {
            property_type: Some("casa"),
            address: Some("PB"),
            neighborhood: Some("Centro"),
            title: Some("Mendoza 2100"),
        };
        assert_eq!(
            filter.accepts(&listing),
            Verdict::Rejected(Rejection::MissingAddress)
        );
        assert!(filter.accepts_with_title_fallback(&listing).is_accepted());
    }

    #[test]
    fn neighborhood_is_checked_after_type() {
        let filter = ListingFilter::default();
        let listing = ZoneFields {
            property_type: Some("casa"),
            address: Some("Mitre 1200"),
            neighborhood: Some("Fisherton"),
            title: None,
        };
        assert_eq!(
            filter.accepts(&listing),
            Verdict::Rejected(Rejection::Neighborhood("Fisherton".into()))
        );
    }
}
