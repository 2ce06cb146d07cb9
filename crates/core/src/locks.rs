//! In-process keyed mutual exclusion around check-then-write sequences.
//!
//! Writers that touch the same room or instructor are serialized so two
//! concurrent creates cannot both pass the conflict check against a store
//! that does not yet contain the other. The guard only covers this process;
//! separate processes sharing the database can still interleave.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<()>>;

#[derive(Debug, Default)]
pub struct KeyedLocks {
    slots: Mutex<HashMap<String, Slot>>,
}

/// Holds every requested key until dropped.
#[must_use = "the keys are released as soon as the guard is dropped"]
pub struct KeyedGuard<'a> {
    owner: &'a KeyedLocks,
    keys: Vec<String>,
    guards: Vec<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock all `keys`. Keys are taken in sorted order so two callers
    /// asking for overlapping sets cannot deadlock.
    pub async fn acquire<I>(&self, keys: I) -> KeyedGuard<'_>
    where
        I: IntoIterator<Item = String>,
    {
        let mut keys: Vec<String> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        let slots: Vec<Slot> = {
            let mut map = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            keys.iter()
                .map(|k| Arc::clone(map.entry(k.clone()).or_default()))
                .collect()
        };

        let mut guards = Vec::with_capacity(slots.len());
        for slot in slots {
            guards.push(slot.lock_owned().await);
        }

        KeyedGuard {
            owner: self,
            keys,
            guards,
        }
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for KeyedGuard<'_> {
    fn drop(&mut self) {
        self.guards.clear();
        let mut map = self
            .owner
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for key in &self.keys {
            // Only the map still references an idle slot.
            if map.get(key).is_some_and(|slot| Arc::strong_count(slot) == 1) {
                map.remove(key);
            }
        }
    }
}
