//! Live-enemy registry
//!
//! The only state touched by more than one subsystem: the spawner adds, combat
//! removes, the session bulk-clears. Every read prunes handles whose backing
//! enemy no longer exists, so counts never include destroyed entities even
//! when destruction lands between ticks.

use serde::{Deserialize, Serialize};

use super::enemy::EnemyId;

/// Backing storage the registry checks handles against
pub trait EntityStore {
    /// True while the entity exists and has not been destroyed
    fn is_alive(&self, id: EnemyId) -> bool;
    /// Destroy the entity. Must be a no-op for unknown or already destroyed ids.
    fn destroy(&mut self, id: EnemyId);
}

/// Ordered set of live enemy handles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityRegistry {
    handles: Vec<EnemyId>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop handles whose entity is gone
    pub fn prune(&mut self, store: &impl EntityStore) {
        self.handles.retain(|&id| store.is_alive(id));
    }

    /// Add a handle. Returns false for duplicates and dead handles.
    pub fn register(&mut self, id: EnemyId, store: &impl EntityStore) -> bool {
        self.prune(store);
        if !store.is_alive(id) || self.handles.contains(&id) {
            return false;
        }
        self.handles.push(id);
        true
    }

    /// Remove a handle. Safe to call repeatedly or for handles never registered.
    pub fn unregister(&mut self, id: EnemyId, store: &impl EntityStore) -> bool {
        self.prune(store);
        self.remove(id)
    }

    /// Remove without pruning. Used while the caller holds the store mutably.
    pub(crate) fn remove(&mut self, id: EnemyId) -> bool {
        match self.handles.iter().position(|&h| h == id) {
            Some(index) => {
                self.handles.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of truly alive registered enemies
    pub fn count(&mut self, store: &impl EntityStore) -> usize {
        self.prune(store);
        self.handles.len()
    }

    /// Destroy every registered enemy and empty the registry.
    /// Returns how many handles were in the snapshot.
    pub fn clear_all(&mut self, store: &mut impl EntityStore) -> usize {
        // Take the snapshot first: destruction may unregister re-entrantly.
        let snapshot = std::mem::take(&mut self.handles);
        for &id in &snapshot {
            store.destroy(id);
        }
        self.handles.clear();
        snapshot.len()
    }

    pub fn contains(&self, id: EnemyId) -> bool {
        self.handles.contains(&id)
    }

    /// Registered handles, possibly including ones destroyed since the last prune
    pub fn handles(&self) -> &[EnemyId] {
        &self.handles
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
