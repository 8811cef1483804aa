use std::fmt;

/// Which way a boundary street cuts the zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    NorthSouth,
    EastWest,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::NorthSouth => f.write_str("N-S"),
            Axis::EastWest => f.write_str("E-W"),
        }
    }
}

/// Why a listing was turned away. `Display` gives the human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    PropertyType(String),
    Neighborhood(String),
    MissingAddress,
    UnparsedAddress,
    ExcludedZone {
        zone: String,
        street: String,
        number: u32,
    },
    Boundary {
        direction: Direction,
        anchor: String,
    },
    OutOfRange {
        axis: Axis,
        street: String,
        number: u32,
    },
    UnknownStreet(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::PropertyType(kind) => write!(f, "property type not permitted: {kind}"),
            Rejection::Neighborhood(name) => write!(f, "neighborhood not permitted: {name}"),
            Rejection::MissingAddress => f.write_str("no valid address to verify zone"),
            Rejection::UnparsedAddress => f.write_str("could not extract street and number"),
            Rejection::ExcludedZone {
                zone,
                street,
                number,
            } => write!(f, "excluded zone ({zone}): {street} {number}"),
            Rejection::Boundary { direction, anchor } => write!(f, "{direction} of {anchor}"),
            Rejection::OutOfRange {
                axis,
                street,
                number,
            } => write!(f, "outside {axis} range ({number}) for {street}"),
            Rejection::UnknownStreet(street) => write!(f, "street not permitted: {street}"),
        }
    }
}

/// Outcome of running a listing through the filter gates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verdict::Accepted => None,
            Verdict::Rejected(rejection) => Some(rejection),
        }
    }

    pub fn reason(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accepted => f.write_str("OK"),
            Verdict::Rejected(rejection) => write!(f, "{rejection}"),
        }
    }
}

impl From<Rejection> for Verdict {
    fn from(rejection: Rejection) -> Self {
        Verdict::Rejected(rejection)
    }
}
