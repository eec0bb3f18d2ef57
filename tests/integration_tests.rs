use sightline::sighting::RawSighting;
use sightline::{
    Config, CounterStore, DistanceUnit, GeoPoint, IncrementCommand, MemoryCounterStore,
    SightlineError, StaticSource, Tracker, TrackerBuilder, aggregate, parse_sightings,
};

fn neighborhood_source() -> StaticSource {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut source = StaticSource::new();
    for (lat, lon, name) in [
        (-34.573, -58.458, "Pidgey"),
        (-34.575, -58.460, "Rattata"),
        (-34.574, -58.457, "Pidgey"),
        (-34.572, -58.461, "Zubat"),
        // Far outside the 1 km neighborhood.
        (40.7128, -74.0060, "Mewtwo"),
    ] {
        source.add(
            GeoPoint::from_degrees(lat, lon).unwrap(),
            RawSighting::named(name),
        );
    }
    source
}

#[test]
fn test_end_to_end_recording() {
    let tracker = Tracker::new(neighborhood_source());
    let center = GeoPoint::from_latlon_str("-34.574,-58.459").unwrap();

    let outcome = tracker.record_nearby("ash", &center, 1.0).unwrap();
    assert_eq!(outcome.fetched, 4);
    assert_eq!(outcome.recorded, 3);

    let board = tracker.leaderboard("ash").unwrap();
    let names: Vec<&str> = board.iter().map(|e| e.entity.as_str()).collect();
    assert_eq!(names, vec!["Pidgey", "Rattata", "Zubat"]);
    assert!(board.iter().all(|e| e.count == 1));
    assert!(!names.contains(&"Mewtwo"));
}

#[test]
fn test_counts_accumulate_across_queries() {
    let tracker = Tracker::new(neighborhood_source());
    let center = GeoPoint::from_degrees(-34.574, -58.459).unwrap();

    for _ in 0..3 {
        tracker.record_nearby("ash", &center, 1.0).unwrap();
    }
    // A narrower query that only reaches the two nearest spawns.
    tracker.record_nearby("ash", &center, 0.2).unwrap();

    let board = tracker.leaderboard("ash").unwrap();
    assert_eq!(board[0].count, 4);
    assert_eq!(board.iter().map(|e| e.count).sum::<u64>(), 11);
}

#[test]
fn test_per_user_leaderboards_are_independent() {
    let tracker = Tracker::new(neighborhood_source());
    let palermo = GeoPoint::from_degrees(-34.574, -58.459).unwrap();
    let manhattan = GeoPoint::from_degrees(40.7128, -74.0060).unwrap();

    tracker.record_nearby("ash", &palermo, 1.0).unwrap();
    tracker.record_nearby("gary", &manhattan, 1.0).unwrap();

    let ash = tracker.leaderboard("ash").unwrap();
    let gary = tracker.leaderboard("gary").unwrap();
    assert_eq!(ash.len(), 3);
    assert_eq!(gary.len(), 1);
    assert_eq!(gary[0].entity, "Mewtwo");
}

#[test]
fn test_shared_store_across_trackers() {
    use std::sync::Arc;

    let store = Arc::new(MemoryCounterStore::new());
    let tracker_a = TrackerBuilder::new()
        .source(neighborhood_source())
        .store(SharedStore(Arc::clone(&store)))
        .build()
        .unwrap();
    let tracker_b = TrackerBuilder::new()
        .source(neighborhood_source())
        .store(SharedStore(Arc::clone(&store)))
        .build()
        .unwrap();

    let center = GeoPoint::from_degrees(-34.574, -58.459).unwrap();
    tracker_a.record_nearby("ash", &center, 1.0).unwrap();
    tracker_b.record_nearby("ash", &center, 1.0).unwrap();

    assert_eq!(store.counts_for("ash").unwrap()[0].count, 2);

    struct SharedStore(Arc<MemoryCounterStore>);

    impl CounterStore for SharedStore {
        fn apply(&self, command: &IncrementCommand) -> sightline::Result<u64> {
            self.0.apply(command)
        }

        fn counts_for(&self, username: &str) -> sightline::Result<Vec<sightline::EntityCount>> {
            self.0.counts_for(username)
        }

        fn len(&self) -> sightline::Result<usize> {
            self.0.len()
        }
    }
}

#[test]
fn test_lookup_body_to_leaderboard() {
    // The shape the original lookup service returns: a JSON array of
    // objects with a name plus opaque payload.
    let body = r#"[
        {"name": "Pidgey", "lat": -34.573, "lng": -58.458, "expires": 1469932800},
        {"name": "Rattata", "lat": -34.575, "lng": -58.460},
        {"name": "Pidgey", "lat": -34.574, "lng": -58.457}
    ]"#;
    let raw = parse_sightings(body).unwrap();
    let agg = aggregate("ash", &raw).unwrap();
    assert_eq!(agg.records.len(), 2);
    assert_eq!(agg.records[0].extra["expires"], serde_json::json!(1469932800));

    let store = MemoryCounterStore::new();
    for command in &agg.commands {
        store.apply(command).unwrap();
    }
    let board = store.counts_for("ash").unwrap();
    assert_eq!(board.len(), 2);
}

#[test]
fn test_miles_configuration() {
    let tracker = TrackerBuilder::new()
        .source(neighborhood_source())
        .config(Config::default().with_unit(DistanceUnit::Miles))
        .build()
        .unwrap();
    let center = GeoPoint::from_degrees(-34.574, -58.459).unwrap();

    // 0.7 miles is a touch over 1.1 km, enough to cover the neighborhood.
    let outcome = tracker.record_nearby("ash", &center, 0.7).unwrap();
    assert_eq!(outcome.recorded, 3);
}

#[test]
fn test_invalid_query_inputs() {
    let tracker = Tracker::new(neighborhood_source());
    let center = GeoPoint::from_degrees(-34.574, -58.459).unwrap();

    assert!(matches!(
        tracker.record_nearby("", &center, 1.0),
        Err(SightlineError::InvalidInput(_))
    ));
    assert!(matches!(
        tracker.record_nearby("ash", &center, 0.0),
        Err(SightlineError::InvalidArgument(_))
    ));
    assert!(matches!(
        GeoPoint::from_degrees(95.0, 0.0),
        Err(SightlineError::InvalidCoordinate(_))
    ));
}
