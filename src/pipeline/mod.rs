//! Extraction, normalization and zone filtering of scraped listings.
//!
//! Everything below `ingest` is pure: no I/O, no shared mutable state, and
//! the rule tables are immutable once built, so one [`ListingFilter`] can be
//! shared across threads freely.

pub mod address;
pub mod coerce;
pub mod filter;
pub mod geofence;
pub mod ingest;
pub mod normalize;
pub mod verdict;
pub mod zones;

pub use address::StreetAddress;
pub use filter::{ListingFilter, PropertyTypePolicy};
pub use geofence::GeoFence;
pub use ingest::{normalize_listing, IngestPipeline, IngestReport};
pub use verdict::{Axis, Direction, Rejection, Verdict};
pub use zones::{AxisStreets, BoundaryRule, ExclusionZone, Limit, ZoneConfig, ZoneConfigError};
