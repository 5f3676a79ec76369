// The connection registry: the only durable process-wide state.

use crate::domain::PlayerRecord;
use std::collections::HashMap;

/// Mapping from connection id to the authoritative player record.
///
/// The registry is owned exclusively by the room task, which applies
/// one inbound event at a time. That single-writer discipline is what
/// gives every record serialized read-modify-write and makes `all()`
/// snapshots internally consistent; nothing outside the room task may
/// hold a reference to this type.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<u64, PlayerRecord>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.players.contains_key(&id)
    }

    pub fn get(&self, id: u64) -> Option<&PlayerRecord> {
        self.players.get(&id)
    }

    /// Inserts a record under its own id, replacing any stale entry.
    pub fn insert(&mut self, record: PlayerRecord) {
        self.players.insert(record.id, record);
    }

    /// Removes and returns the record; absent ids are a no-op.
    pub fn remove(&mut self, id: u64) -> Option<PlayerRecord> {
        self.players.remove(&id)
    }

    /// Applies a transform to the record iff the id is still present,
    /// returning the transform's result.
    pub fn mutate<T>(&mut self, id: u64, f: impl FnOnce(&mut PlayerRecord) -> T) -> Option<T> {
        self.players.get_mut(&id).map(f)
    }

    /// Snapshot of every live record.
    pub fn all(&self) -> Vec<PlayerRecord> {
        self.players.values().cloned().collect()
    }

    /// Drops every record. Used at room teardown.
    pub fn clear(&mut self) {
        self.players.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_remove_round_trip() {
        let mut registry = PlayerRegistry::new();
        registry.insert(PlayerRecord::spawn(1, 0));
        registry.insert(PlayerRecord::spawn(2, 0));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(1));
        assert_eq!(registry.get(2).map(|r| r.id), Some(2));

        assert_eq!(registry.remove(1).map(|r| r.id), Some(1));
        assert!(!registry.contains(1));
        // Removing an id that is gone is a no-op, not an error.
        assert!(registry.remove(1).is_none());
    }

    #[test]
    fn mutate_applies_only_to_present_ids() {
        let mut registry = PlayerRegistry::new();
        registry.insert(PlayerRecord::spawn(1, 0));

        let health = registry.mutate(1, |record| {
            record.health = 1;
            record.health
        });
        assert_eq!(health, Some(1));
        assert_eq!(registry.get(1).map(|r| r.health), Some(1));

        // Absent id: transform never runs.
        assert_eq!(registry.mutate(99, |_| unreachable!()), None::<()>);
    }

    #[test]
    fn all_returns_every_live_record() {
        let mut registry = PlayerRegistry::new();
        registry.insert(PlayerRecord::spawn(1, 0));
        registry.insert(PlayerRecord::spawn(2, 0));
        registry.remove(2);

        let snapshot = registry.all();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, 1);
    }

    #[test]
    fn clear_empties_the_registry() {
        let mut registry = PlayerRegistry::new();
        registry.insert(PlayerRecord::spawn(1, 0));
        registry.clear();
        assert!(registry.is_empty());
    }
}
