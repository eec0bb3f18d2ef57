//! Sighting-source abstraction.
//!
//! The entity lookup service is an external collaborator: this crate only
//! defines the seam. A source receives the derived bounding box and returns
//! the raw sightings reported inside it; any transport failure must surface
//! as an error so the caller never aggregates a partial result.

use crate::error::{Result, SightlineError};
use crate::geo::{BoundingBox, GeoPoint};
use crate::sighting::RawSighting;

/// Trait for sighting-source implementations.
pub trait SightingSource: Send + Sync {
    /// Fetch the raw sightings reported within the bounding box.
    ///
    /// # Errors
    ///
    /// Implementations surface transport or decode failures as
    /// [`SightlineError::Lookup`]; an empty area is an empty `Vec`, not an
    /// error.
    fn fetch(&self, bounds: &BoundingBox) -> Result<Vec<RawSighting>>;
}

impl<S: SightingSource + ?Sized> SightingSource for Box<S> {
    fn fetch(&self, bounds: &BoundingBox) -> Result<Vec<RawSighting>> {
        (**self).fetch(bounds)
    }
}

/// Decode a JSON array of sighting objects, as returned by lookup services.
///
/// # Examples
///
/// ```
/// use sightline::lookup::parse_sightings;
///
/// let body = r#"[{"name": "Pidgey", "lat": -34.57}, {"name": "Rattata"}]"#;
/// let sightings = parse_sightings(body)?;
/// assert_eq!(sightings.len(), 2);
/// assert_eq!(sightings[0].name, "Pidgey");
/// # Ok::<(), sightline::SightlineError>(())
/// ```
///
/// # Errors
///
/// Returns [`SightlineError::InvalidInput`] when the body is not a JSON
/// array of objects each carrying a `name` field.
pub fn parse_sightings(body: &str) -> Result<Vec<RawSighting>> {
    let sightings: Vec<RawSighting> = serde_json::from_str(body)?;
    Ok(sightings)
}

/// A fixed, in-memory sighting source.
///
/// Holds sightings pinned to coordinates and answers queries by bounding-box
/// membership. Used by tests and by embedders that already have the data in
/// hand.
#[derive(Debug, Default)]
pub struct StaticSource {
    sightings: Vec<(GeoPoint, RawSighting)>,
}

impl StaticSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sighting at a coordinate.
    pub fn add(&mut self, location: GeoPoint, sighting: RawSighting) {
        self.sightings.push((location, sighting));
    }

    /// Number of sightings held, regardless of location.
    pub fn len(&self) -> usize {
        self.sightings.len()
    }

    /// Whether the source holds no sightings.
    pub fn is_empty(&self) -> bool {
        self.sightings.is_empty()
    }
}

impl SightingSource for StaticSource {
    fn fetch(&self, bounds: &BoundingBox) -> Result<Vec<RawSighting>> {
        Ok(self
            .sightings
            .iter()
            .filter(|(location, _)| bounds.contains(location))
            .map(|(_, sighting)| sighting.clone())
            .collect())
    }
}

/// A source that always fails, for exercising error paths.
#[derive(Debug, Default)]
pub struct FailingSource;

impl SightingSource for FailingSource {
    fn fetch(&self, _bounds: &BoundingBox) -> Result<Vec<RawSighting>> {
        Err(SightlineError::Lookup("source unavailable".into()))
    }
}
