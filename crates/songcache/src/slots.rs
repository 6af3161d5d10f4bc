//! Insert-only key map with single-flight population
//!
//! Each key owns a once-initialized slot. The map lock is only held to find
//! or create a slot; the fetch runs outside it, so different keys populate
//! concurrently while racing callers on one key share a single fetch.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, OnceLock};

use ahash::RandomState;
use parking_lot::RwLock;

type Slot<V> = Arc<OnceLock<V>>;

/// How a lookup was served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    /// Value was already stored
    Hit,
    /// Another caller's in-flight fetch supplied the value
    Coalesced,
    /// This caller ran the fetch and stored its result
    Miss,
}

/// Map from keys to values populated at most once per key
pub struct SlotMap<K, V> {
    slots: RwLock<HashMap<K, Slot<V>, RandomState>>,
}

impl<K, V> SlotMap<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::with_hasher(RandomState::new())),
        }
    }

    /// Get a stored value without fetching
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.slots.read().get(key).and_then(|slot| slot.get().cloned())
    }

    /// Get the stored value for `key`, running `fetch` to populate it if absent
    pub fn get_or_fetch<Q, F>(&self, key: &Q, fetch: F) -> (V, Fetch)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(key) {
            return (value, Fetch::Hit);
        }

        let slot = {
            let mut slots = self.slots.write();
            match slots.get(key) {
                Some(slot) => Arc::clone(slot),
                None => {
                    let slot = Slot::default();
                    slots.insert(key.to_owned(), Arc::clone(&slot));
                    slot
                }
            }
        };

        // Populated between the read and write lock
        if let Some(value) = slot.get() {
            return (value.clone(), Fetch::Hit);
        }

        let mut fetched = false;
        let value = slot
            .get_or_init(|| {
                fetched = true;
                fetch()
            })
            .clone();

        if fetched {
            (value, Fetch::Miss)
        } else {
            (value, Fetch::Coalesced)
        }
    }

    /// Check whether `key` has a stored value (in-flight keys do not count)
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.slots
            .read()
            .get(key)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Number of keys with a stored value
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }
}

impl<K, V> Default for SlotMap<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
