//! Orchestration: bounding box, lookup, aggregation, and store in one pass.
//!
//! `Tracker` wires the pure core to its two collaborators. One call to
//! [`Tracker::record_nearby`] derives the bounding box for a query, fetches
//! the raw sightings inside it, deduplicates them, and applies one
//! upsert-increment per surviving entity. Increment commands target
//! independent `(user, entity)` keys, so the store may apply them in any
//! order; a lookup or store failure aborts the pass with nothing recorded
//! beyond the commands already applied, and retry policy is left to the
//! caller.

use crate::error::Result;
use crate::geo::{DistanceUnit, GeoPoint};
use crate::lookup::SightingSource;
use crate::sighting::aggregate;
use crate::store::{CounterStore, EntityCount, MemoryCounterStore, validate_username};
use serde::{Deserialize, Serialize};

/// Tracker configuration.
///
/// # Examples
///
/// ```
/// use sightline::{Config, DistanceUnit};
///
/// let config = Config::default()
///     .with_unit(DistanceUnit::Miles)
///     .with_sphere_radius(3958.8);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Unit for search radii. Defaults to kilometers.
    #[serde(default)]
    pub unit: DistanceUnit,
    /// Explicit sphere radius in the same unit, overriding Earth's mean
    /// radius. `None` uses the standard constant for the unit.
    #[serde(default)]
    pub sphere_radius: Option<f64>,
}

impl Config {
    /// Set the distance unit.
    pub fn with_unit(mut self, unit: DistanceUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Override the sphere radius used for bounding-box derivation.
    pub fn with_sphere_radius(mut self, radius: f64) -> Self {
        self.sphere_radius = Some(radius);
        self
    }
}

/// Outcome of one recording pass, for callers and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryOutcome {
    /// Raw sightings returned by the source, before deduplication.
    pub fetched: usize,
    /// Distinct entities whose counters were incremented.
    pub recorded: usize,
}

/// Builder for a [`Tracker`].
///
/// The sighting source is required; the store defaults to an in-memory
/// [`MemoryCounterStore`].
///
/// # Examples
///
/// ```
/// use sightline::{StaticSource, TrackerBuilder};
///
/// let tracker = TrackerBuilder::new().source(StaticSource::new()).build()?;
/// # Ok::<(), sightline::SightlineError>(())
/// ```
#[derive(Default)]
pub struct TrackerBuilder {
    source: Option<Box<dyn SightingSource>>,
    store: Option<Box<dyn CounterStore>>,
    config: Config,
}

impl TrackerBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sighting source.
    pub fn source<S: SightingSource + 'static>(mut self, source: S) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Set the counter store. Defaults to [`MemoryCounterStore`].
    pub fn store<C: CounterStore + 'static>(mut self, store: C) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Build the tracker.
    ///
    /// # Errors
    ///
    /// Returns [`SightlineError::InvalidArgument`](crate::SightlineError::InvalidArgument)
    /// when no sighting source was set; the tracker is unusable without
    /// one.
    pub fn build(self) -> Result<Tracker> {
        let source = self.source.ok_or_else(|| {
            crate::SightlineError::InvalidArgument("a sighting source is required".into())
        })?;
        Ok(Tracker {
            source,
            store: self
                .store
                .unwrap_or_else(|| Box::new(MemoryCounterStore::new())),
            config: self.config,
        })
    }
}

/// Records entity sightings near a point and serves per-user rankings.
pub struct Tracker {
    source: Box<dyn SightingSource>,
    store: Box<dyn CounterStore>,
    config: Config,
}

impl Tracker {
    /// Shorthand for a tracker over the given source with an in-memory
    /// store and default configuration.
    pub fn new<S: SightingSource + 'static>(source: S) -> Self {
        Tracker {
            source: Box::new(source),
            store: Box::new(MemoryCounterStore::new()),
            config: Config::default(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Record every distinct entity sighted within `radius` of `center`
    /// for `username`.
    ///
    /// Derives the bounding box, fetches raw sightings from the source,
    /// deduplicates by entity name (first occurrence wins), and applies one
    /// upsert-increment per survivor.
    ///
    /// # Errors
    ///
    /// - [`SightlineError::InvalidInput`](crate::SightlineError::InvalidInput)
    ///   for an unusable username.
    /// - [`SightlineError::InvalidArgument`](crate::SightlineError::InvalidArgument)
    ///   for a non-positive or non-finite radius.
    /// - [`SightlineError::Lookup`](crate::SightlineError::Lookup) when the
    ///   source fails; nothing is aggregated or recorded in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use sightline::sighting::RawSighting;
    /// use sightline::{GeoPoint, StaticSource, Tracker};
    ///
    /// let mut source = StaticSource::new();
    /// source.add(GeoPoint::from_degrees(0.01, 0.01)?, RawSighting::named("Pidgey"));
    ///
    /// let tracker = Tracker::new(source);
    /// let center = GeoPoint::from_degrees(0.0, 0.0)?;
    /// let outcome = tracker.record_nearby("ash", &center, 5.0)?;
    /// assert_eq!(outcome.recorded, 1);
    /// # Ok::<(), sightline::SightlineError>(())
    /// ```
    pub fn record_nearby(
        &self,
        username: &str,
        center: &GeoPoint,
        radius: f64,
    ) -> Result<QueryOutcome> {
        validate_username(username)?;

        let bounds = match self.config.sphere_radius {
            Some(sphere_radius) => center.bounding_coordinates_on_sphere(radius, sphere_radius),
            None => center.bounding_coordinates(radius, self.config.unit),
        }?;
        log::debug!(
            "query for '{}': center {}, radius {}, bounds {}",
            username,
            center,
            radius,
            bounds
        );

        let raw = self.source.fetch(&bounds)?;
        let agg = aggregate(username, &raw)?;

        for command in &agg.commands {
            let count = self.store.apply(command)?;
            log::trace!("counter ({}, {}) now {}", username, command.entity, count);
        }

        Ok(QueryOutcome {
            fetched: raw.len(),
            recorded: agg.commands.len(),
        })
    }

    /// A user's entities ranked by descending sighting count.
    ///
    /// An unknown user yields an empty list, not an error.
    pub fn leaderboard(&self, username: &str) -> Result<Vec<EntityCount>> {
        self.store.counts_for(username)
    }
}
