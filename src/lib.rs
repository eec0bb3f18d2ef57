//! Locate entities sighted near a geographic point, deduplicate them, and
//! track per-user sighting counts.
//!
//! The geometric core derives a bounding box guaranteed to contain a search
//! radius around a center point on a spherical Earth model; the aggregation
//! core deduplicates the sightings reported inside that box and emits one
//! upsert-increment per distinct entity. Lookup transport and durable
//! storage are collaborators behind the [`SightingSource`] and
//! [`CounterStore`] traits.
//!
//! ```rust
//! use sightline::sighting::RawSighting;
//! use sightline::{GeoPoint, StaticSource, Tracker};
//!
//! let mut source = StaticSource::new();
//! source.add(GeoPoint::from_degrees(-34.573, -58.458)?, RawSighting::named("Pidgey"));
//! source.add(GeoPoint::from_degrees(-34.575, -58.460)?, RawSighting::named("Rattata"));
//!
//! let tracker = Tracker::new(source);
//! let center = GeoPoint::from_degrees(-34.574, -58.459)?;
//! tracker.record_nearby("ash", &center, 1.0)?;
//!
//! let board = tracker.leaderboard("ash")?;
//! assert_eq!(board.len(), 2);
//! # Ok::<(), sightline::SightlineError>(())
//! ```

pub mod error;
pub mod geo;
pub mod lookup;
pub mod sighting;
pub mod store;
pub mod tracker;

pub use error::{Result, SightlineError};

pub use geo::{
    BoundingBox, DistanceUnit, EARTH_RADIUS_KM, EARTH_RADIUS_MI, GeoPoint, degrees_to_radians,
    kilometers_to_miles, miles_to_kilometers, radians_to_degrees,
};

pub use sighting::{Aggregation, IncrementCommand, RawSighting, SightingRecord, aggregate};

pub use lookup::{SightingSource, StaticSource, parse_sightings};

pub use store::{CounterStore, EntityCount, MemoryCounterStore};

pub use tracker::{Config, QueryOutcome, Tracker, TrackerBuilder};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Result, SightlineError};

    pub use crate::{BoundingBox, DistanceUnit, GeoPoint};

    pub use crate::{IncrementCommand, RawSighting, aggregate};

    pub use crate::{CounterStore, MemoryCounterStore, SightingSource, StaticSource};

    pub use crate::{Config, Tracker, TrackerBuilder};
}
