//! Sighting records and the deduplication/aggregation pass.
//!
//! A query against a bounding box returns raw sightings: each has an entity
//! name plus an arbitrary payload the aggregator treats as opaque. The
//! aggregation pass keeps one record per distinct name, stamps survivors
//! with the requesting user, and emits one upsert-increment command per
//! survivor. It is a pure transformation; applying the commands to a store
//! is the orchestrator's job.

use crate::error::{Result, SightlineError};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A sighting as returned by the lookup collaborator, before aggregation.
///
/// Only `name` is interpreted; every other field of the source object is
/// carried along untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSighting {
    /// Entity name, the deduplication key.
    pub name: String,
    /// Payload fields the aggregator does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawSighting {
    /// Create a sighting with no extra payload.
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            extra: Map::new(),
        }
    }
}

/// A surviving sighting, stamped with the user who made the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SightingRecord {
    /// User the sighting is attributed to.
    pub username: String,
    /// Entity name.
    pub name: String,
    /// Payload carried over from the retained raw sighting.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An upsert-increment to apply to the counter store: create the counter
/// for `(username, entity)` at `amount` if absent, otherwise add `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncrementCommand {
    pub username: String,
    pub entity: String,
    pub amount: u64,
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Deduplicated, user-stamped records, in first-seen order.
    pub records: Vec<SightingRecord>,
    /// One increment command per record, same order.
    pub commands: Vec<IncrementCommand>,
}

/// Deduplicate raw sightings by entity name and emit increment commands.
///
/// The first occurrence of each name wins: its payload is the one retained.
/// Input order otherwise does not matter, and an empty input yields empty
/// outputs rather than an error.
///
/// # Errors
///
/// Returns [`SightlineError::InvalidInput`] when the username is empty or
/// any sighting has an empty name. A malformed element fails the whole
/// batch; no partial result is produced.
///
/// # Examples
///
/// ```
/// use sightline::sighting::{RawSighting, aggregate};
///
/// let raw = vec![
///     RawSighting::named("Pidgey"),
///     RawSighting::named("Rattata"),
///     RawSighting::named("Pidgey"),
/// ];
/// let agg = aggregate("ash", &raw)?;
/// assert_eq!(agg.commands.len(), 2);
/// assert_eq!(agg.commands[0].entity, "Pidgey");
/// assert_eq!(agg.commands[0].amount, 1);
/// # Ok::<(), sightline::SightlineError>(())
/// ```
pub fn aggregate(username: &str, sightings: &[RawSighting]) -> Result<Aggregation> {
    if username.is_empty() {
        return Err(SightlineError::InvalidInput(
            "username cannot be empty".into(),
        ));
    }

    let mut seen_names = FxHashSet::default();
    let mut agg = Aggregation::default();

    for (idx, sighting) in sightings.iter().enumerate() {
        if sighting.name.is_empty() {
            return Err(SightlineError::InvalidInput(format!(
                "sighting at index {} has an empty name",
                idx
            )));
        }
        if !seen_names.insert(sighting.name.as_str()) {
            continue;
        }
        agg.records.push(SightingRecord {
            username: username.to_string(),
            name: sighting.name.clone(),
            extra: sighting.extra.clone(),
        });
        agg.commands.push(IncrementCommand {
            username: username.to_string(),
            entity: sighting.name.clone(),
            amount: 1,
        });
    }

    log::debug!(
        "aggregated {} sightings into {} records for user '{}'",
        sightings.len(),
        agg.records.len(),
        username
    );

    Ok(agg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sighting_with_extra(name: &str, key: &str, value: Value) -> RawSighting {
        let mut extra = Map::new();
        extra.insert(key.to_string(), value);
        RawSighting { name: name.into(), extra }
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let raw = vec![
            sighting_with_extra("Pidgey", "lat", json!(40.7)),
            sighting_with_extra("Pidgey", "lat", json!(41.2)),
        ];

        let agg = aggregate("ash", &raw).unwrap();
        assert_eq!(agg.records.len(), 1);
        assert_eq!(agg.commands.len(), 1);
        assert_eq!(agg.records[0].extra["lat"], json!(40.7));
        assert_eq!(agg.records[0].username, "ash");
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        let agg = aggregate("ash", &[]).unwrap();
        assert!(agg.records.is_empty());
        assert!(agg.commands.is_empty());
    }

    #[test]
    fn test_rejects_empty_name() {
        let raw = vec![RawSighting::named("Pidgey"), RawSighting::named("")];
        assert!(matches!(
            aggregate("ash", &raw),
            Err(SightlineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_empty_username() {
        assert!(matches!(
            aggregate("", &[RawSighting::named("Pidgey")]),
            Err(SightlineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_command_per_distinct_entity() {
        let raw = vec![
            RawSighting::named("Pidgey"),
            RawSighting::named("Rattata"),
            RawSighting::named("Pidgey"),
        ];

        let agg = aggregate("ash", &raw).unwrap();
        let entities: Vec<&str> = agg.commands.iter().map(|c| c.entity.as_str()).collect();
        assert_eq!(entities, vec!["Pidgey", "Rattata"]);
        assert!(agg.commands.iter().all(|c| c.amount == 1));
        assert!(agg.commands.iter().all(|c| c.username == "ash"));
    }

    #[test]
    fn test_raw_sighting_deserializes_extra_fields() {
        let raw: RawSighting = serde_json::from_value(json!({
            "name": "Pidgey",
            "lat": -34.57,
            "lng": -58.45,
            "expires": 1469932800
        }))
        .unwrap();

        assert_eq!(raw.name, "Pidgey");
        assert_eq!(raw.extra.len(), 3);
        assert_eq!(raw.extra["expires"], json!(1469932800));
    }

    #[test]
    fn test_sighting_record_serializes_flat() {
        let record = SightingRecord {
            username: "ash".into(),
            name: "Pidgey".into(),
            extra: Map::new(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({"username": "ash", "name": "Pidgey"}));
    }
}
