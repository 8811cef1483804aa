use super::normalize::normalize;
use super::verdict::Direction;
use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use thiserror::Error;

/// Streets running along one axis and the house numbers inside the zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisStreets {
    streets: HashSet<String>,
    range: RangeInclusive<u32>,
}

impl AxisStreets {
    pub fn new<I, S>(streets: I, range: RangeInclusive<u32>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            streets: normalized_set(streets),
            range,
        }
    }

    pub fn contains(&self, street: &str) -> bool {
        self.streets.contains(street)
    }

    pub fn range(&self) -> &RangeInclusive<u32> {
        &self.range
    }
}

/// Which side of the threshold is still inside the zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    AtLeast(u32),
    AtMost(u32),
}

impl Limit {
    pub fn allows(&self, number: u32) -> bool {
        match *self {
            Limit::AtLeast(min) => number >= min,
            Limit::AtMost(max) => number <= max,
        }
    }
}

/// A street whose own numbering is the zone edge, e.g. numbers below 600
/// on Castellanos lie north of the zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryRule {
    street: String,
    anchor: String,
    direction: Direction,
    limit: Limit,
}

impl BoundaryRule {
    pub fn new(anchor: impl Into<String>, direction: Direction, limit: Limit) -> Self {
        let anchor = anchor.into();
        Self {
            street: normalize(Some(&anchor)),
            anchor,
            direction,
            limit,
        }
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    /// Display name used in rejection reasons.
    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn limit(&self) -> Limit {
        self.limit
    }
}

/// Stretch of several streets rejected outright, whatever the other rules say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionZone {
    name: String,
    streets: HashSet<String>,
    range: RangeInclusive<u32>,
}

impl ExclusionZone {
    pub fn new<I, S>(name: impl Into<String>, streets: I, range: RangeInclusive<u32>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            streets: normalized_set(streets),
            range,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn covers(&self, street: &str, number: u32) -> bool {
        self.streets.contains(street) && self.range.contains(&number)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ZoneConfigError {
    #[error("street '{0}' is listed on both the north-south and east-west axes")]
    StreetOnBothAxes(String),
    #[error("street '{0}' has more than one boundary rule")]
    DuplicateBoundary(String),
    #[error("empty house-number range {start}..={end} for {owner}")]
    EmptyRange { owner: String, start: u32, end: u32 },
}

/// Immutable rule tables for the geofence. Every name is stored normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneConfig {
    neighborhoods: HashSet<String>,
    north_south: AxisStreets,
    east_west: AxisStreets,
    boundaries: HashMap<String, BoundaryRule>,
    exclusions: Vec<ExclusionZone>,
}

impl ZoneConfig {
    /// Builds and validates a custom rule set.
    pub fn new<I, S>(
        neighborhoods: I,
        north_south: AxisStreets,
        east_west: AxisStreets,
        boundaries: Vec<BoundaryRule>,
        exclusions: Vec<ExclusionZone>,
    ) -> Result<Self, ZoneConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut by_street = HashMap::with_capacity(boundaries.len());
        for rule in boundaries {
            if by_street.contains_key(rule.street()) {
                return Err(ZoneConfigError::DuplicateBoundary(rule.street().to_string()));
            }
            by_street.insert(rule.street().to_string(), rule);
        }

        let config = Self::assemble(neighborhoods, north_south, east_west, by_street, exclusions);
        config.validate()?;
        Ok(config)
    }

    fn assemble<I, S>(
        neighborhoods: I,
        north_south: AxisStreets,
        east_west: AxisStreets,
        boundaries: HashMap<String, BoundaryRule>,
        exclusions: Vec<ExclusionZone>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            neighborhoods: normalized_set(neighborhoods),
            north_south,
            east_west,
            boundaries,
            exclusions,
        }
    }

    pub fn validate(&self) -> Result<(), ZoneConfigError> {
        if let Some(street) = self
            .north_south
            .streets
            .intersection(&self.east_west.streets)
            .min()
        {
            return Err(ZoneConfigError::StreetOnBothAxes(street.clone()));
        }

        let ranges = [
            ("north-south streets", &self.north_south.range),
            ("east-west streets", &self.east_west.range),
        ]
        .into_iter()
        .map(|(owner, range)| (owner.to_string(), range))
        .chain(
            self.exclusions
                .iter()
                .map(|zone| (format!("exclusion zone {}", zone.name), &zone.range)),
        );
        for (owner, range) in ranges {
            if range.is_empty() {
                return Err(ZoneConfigError::EmptyRange {
                    owner,
                    start: *range.start(),
                    end: *range.end(),
                });
            }
        }
        Ok(())
    }

    /// The Rosario city-centre rectangle: Castellanos to Buenos Aires,
    /// Santa Fe to Seguí, minus the Rueda/Dean Funes strip.
    pub fn rosario() -> Self {
        let north_south = AxisStreets::new(
            [
                "castellanos", "buenos aires", "oroño", "balcarce", "moreno", "dorrego",
                "italia", "españa", "presidente roca", "pte roca", "paraguay", "corrientes",
                "entre rios", "mitre", "sarmiento", "san martin", "maipu", "laprida",
                "juan manuel de rosas", "1 de mayo", "alem", "ayacucho", "colon", "necochea",
                "chacabuco", "pueyrredon", "suipacha", "richieri", "ov lagos", "ovidio lagos",
                "callao", "rodriguez", "pichincha", "vera mujica", "crespo", "iriondo",
            ],
            600..=3500,
        );
        let east_west = AxisStreets::new(
            [
                "santa fe", "seguí", "pellegrini", "montevideo", "zeballos", "9 de julio",
                "3 de febrero", "mendoza", "san juan", "san luis", "rioja", "cordoba",
                "san lorenzo", "urquiza", "tucuman", "catamarca", "salta", "jujuy", "brown",
                "guemes", "wheelwright", "rivadavia", "velez sarsfield", "junin", "uriburu",
                "ameghino", "garibaldi",
            ],
            500..=3900,
        );
        let boundaries = [
            BoundaryRule::new("Castellanos", Direction::North, Limit::AtLeast(600)),
            BoundaryRule::new("Buenos Aires", Direction::South, Limit::AtMost(3500)),
            BoundaryRule::new("Santa Fe", Direction::East, Limit::AtLeast(500)),
            BoundaryRule::new("Seguí", Direction::West, Limit::AtMost(3900)),
        ]
        .into_iter()
        .map(|rule| (rule.street().to_string(), rule))
        .collect();
        let exclusions = vec![ExclusionZone::new(
            "Rueda to Dean Funes",
            ["corrientes", "paraguay", "presidente roca", "pte roca", "españa"],
            2750..=3350,
        )];

        Self::assemble(
            [
                "centro", "abasto", "echesortu", "echeosortu", "españa y hospitales",
                "barrio parque", "agote", "luis agote", "bella vista", "distrito centro",
            ],
            north_south,
            east_west,
            boundaries,
            exclusions,
        )
    }

    pub fn allows_neighborhood(&self, normalized: &str) -> bool {
        self.neighborhoods.contains(normalized)
    }

    pub fn exclusion_for(&self, street: &str, number: u32) -> Option<&ExclusionZone> {
        self.exclusions
            .iter()
            .find(|zone| zone.covers(street, number))
    }

    pub fn boundary_for(&self, street: &str) -> Option<&BoundaryRule> {
        self.boundaries.get(street)
    }

    pub fn north_south(&self) -> &AxisStreets {
        &self.north_south
    }

    pub fn east_west(&self) -> &AxisStreets {
        &self.east_west
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self::rosario()
    }
}

fn normalized_set<I, S>(names: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| normalize(Some(name.as_ref())))
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rosario_tables_are_consistent() {
        assert_eq!(ZoneConfig::rosario().validate(), Ok(()));
    }

    #[test]
    fn accented_entries_are_stored_normalized() {
        let config = ZoneConfig::rosario();
        assert!(config.north_south().contains("orono"));
        assert!(config.north_south().contains("espana"));
        assert!(config.east_west().contains("segui"));
        assert!(config.allows_neighborhood("espana y hospitales"));
        assert!(config.boundary_for("segui").is_some());
        assert!(config.exclusion_for("espana", 3000).is_some());
    }

    #[test]
    fn exclusion_range_is_inclusive() {
        let config = ZoneConfig::rosario();
        assert!(config.exclusion_for("corrientes", 2750).is_some());
        assert!(config.exclusion_for("corrientes", 3350).is_some());
        assert!(config.exclusion_for("corrientes", 2749).is_none());
        assert!(config.exclusion_for("corrientes", 3351).is_none());
        assert!(config.exclusion_for("mitre", 3000).is_none());
    }

    #[test]
    fn limits() {
        assert!(Limit::AtLeast(600).allows(600));
        assert!(!Limit::AtLeast(600).allows(599));
        assert!(Limit::AtMost(3500).allows(3500));
        assert!(!Limit::AtMost(3500).allows(3501));
    }

    #[test]
    fn rejects_street_on_both_axes() {
        let err = ZoneConfig::new(
            ["centro"],
            AxisStreets::new(["Mitre", "Córdoba"], 600..=3500),
            AxisStreets::new(["cordoba"], 500..=3900),
            Vec::new(),
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(err, ZoneConfigError::StreetOnBothAxes("cordoba".into()));
    }

    #[test]
    fn rejects_duplicate_boundary_after_normalization() {
        let err = ZoneConfig::new(
            ["centro"],
            AxisStreets::new(["mitre"], 600..=3500),
            AxisStreets::new(["segui"], 500..=3900),
            vec![
                BoundaryRule::new("Seguí", Direction::West, Limit::AtMost(3900)),
                BoundaryRule::new("segui", Direction::West, Limit::AtMost(4000)),
            ],
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(err, ZoneConfigError::DuplicateBoundary("segui".into()));
    }

    #[test]
    fn rejects_empty_range() {
        let err = ZoneConfig::new(
            ["centro"],
            AxisStreets::new(["mitre"], 600..=3500),
            AxisStreets::new(["segui"], 500..=3900),
            Vec::new(),
            vec![ExclusionZone::new("strip", ["mitre"], 3000..=2000)],
        )
        .unwrap_err();
        assert!(matches!(err, ZoneConfigError::EmptyRange { start: 3000, end: 2000, .. }));
    }
}
