//! Counter-store abstraction and the in-memory implementation.
//!
//! The store keeps a running count per `(user, entity)` key across many
//! queries. The only write primitive is an atomic upsert-increment, so
//! commands for distinct entities can be applied concurrently without
//! coordination; the read side returns a user's counts ranked for display.

use crate::error::{Result, SightlineError};
use crate::sighting::IncrementCommand;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Separator between the user and entity parts of a store key.
pub const KEY_SEPARATOR: &str = "::";

/// An entity's aggregate count for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityCount {
    pub entity: String,
    pub count: u64,
}

/// Trait for counter-store implementations.
///
/// Implementations must make [`CounterStore::apply`] atomic per key:
/// concurrent increments of the same `(user, entity)` pair must not lose
/// updates. Increments of distinct keys carry no ordering requirement.
pub trait CounterStore: Send + Sync {
    /// Apply one upsert-increment and return the new count: the counter is
    /// created at `amount` if absent, otherwise raised by `amount`.
    fn apply(&self, command: &IncrementCommand) -> Result<u64>;

    /// All `(entity, count)` pairs for a user, ordered by descending count
    /// (entity name ascending as the tie-break) for presentation.
    fn counts_for(&self, username: &str) -> Result<Vec<EntityCount>>;

    /// Total number of `(user, entity)` counters held.
    fn len(&self) -> Result<usize>;

    /// Whether the store holds no counters.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// In-memory counter store over an ordered map.
///
/// Keys are prefix-encoded as `user::entity`, so one user's counters form a
/// contiguous key range. The map lives behind a [`parking_lot::RwLock`];
/// each increment takes the write lock, which makes the upsert atomic.
///
/// # Examples
///
/// ```
/// use sightline::sighting::IncrementCommand;
/// use sightline::store::{CounterStore, MemoryCounterStore};
///
/// let store = MemoryCounterStore::new();
/// let cmd = IncrementCommand {
///     username: "ash".into(),
///     entity: "Pidgey".into(),
///     amount: 1,
/// };
/// assert_eq!(store.apply(&cmd)?, 1);
/// assert_eq!(store.apply(&cmd)?, 2);
/// # Ok::<(), sightline::SightlineError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    data: RwLock<BTreeMap<Bytes, u64>>,
}

impl MemoryCounterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn encode_key(username: &str, entity: &str) -> Result<Bytes> {
        validate_username(username)?;
        let mut key = Vec::with_capacity(username.len() + KEY_SEPARATOR.len() + entity.len());
        key.extend_from_slice(username.as_bytes());
        key.extend_from_slice(KEY_SEPARATOR.as_bytes());
        key.extend_from_slice(entity.as_bytes());
        Ok(Bytes::from(key))
    }
}

/// Check that a username can be used as a store-key prefix.
///
/// The separator character is banned outright, not just the two-character
/// separator: a username ending in `:` would otherwise make `user::entity`
/// ambiguous and let one user's prefix scan match another user's keys.
///
/// # Errors
///
/// Returns [`SightlineError::InvalidInput`] when the name is empty or
/// contains `:`.
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(SightlineError::InvalidInput(
            "username cannot be empty".into(),
        ));
    }
    if username.contains(':') {
        return Err(SightlineError::InvalidInput(format!(
            "username '{}' cannot contain ':'",
            username
        )));
    }
    Ok(())
}

impl CounterStore for MemoryCounterStore {
    fn apply(&self, command: &IncrementCommand) -> Result<u64> {
        let key = Self::encode_key(&command.username, &command.entity)?;
        let mut data = self.data.write();
        let counter = data.entry(key).or_insert(0);
        *counter = counter.saturating_add(command.amount);
        Ok(*counter)
    }

    fn counts_for(&self, username: &str) -> Result<Vec<EntityCount>> {
        validate_username(username)?;
        let prefix = format!("{}{}", username, KEY_SEPARATOR).into_bytes();

        let data = self.data.read();
        let mut counts: Vec<EntityCount> = data
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(key, count)| {
                let entity = String::from_utf8_lossy(&key[prefix.len()..]).into_owned();
                EntityCount {
                    entity,
                    count: *count,
                }
            })
            .collect();

        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.entity.cmp(&b.entity)));
        Ok(counts)
    }

    fn len(&self) -> Result<usize> {
        Ok(self.data.read().len())
    }
}
