//! Insertion-ordered bidirectional map.
//!
//! Backs the spell cache: one side holds base spell identities, the other
//! the synthesized variant pair, and lookups run in both directions. The
//! two internal maps are always kept in lockstep; no operation leaves one
//! side updated without the other. Not safe for concurrent mutation; all
//! access happens from a single logical thread of control.

use core::hash::Hash;

use hashbrown::HashMap;

#[derive(Debug, Clone)]
pub struct BiMap<K, V> {
    forward: HashMap<K, V>,
    reverse: HashMap<V, K>,
    /// Key insertion order, for deterministic iteration.
    order: Vec<K>,
}

impl<K, V> Default for BiMap<K, V> {
    fn default() -> Self {
        Self {
            forward: HashMap::new(),
            reverse: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<K, V> BiMap<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Establish a two-way association, overwriting any prior association
    /// for `key`. If `value` was previously owned by a different key, that
    /// entry is removed entirely so both sides stay bijective.
    pub fn insert(&mut self, key: K, value: V) {
        if let Some(prev_key) = self.reverse.get(&value) {
            if *prev_key != key {
                let prev_key = prev_key.clone();
                self.remove_key(&prev_key);
            }
        }
        match self.forward.insert(key.clone(), value.clone()) {
            // Overwrite: drop the stale reverse entry, keep the order slot
            Some(old_value) => {
                self.reverse.remove(&old_value);
            }
            None => self.order.push(key.clone()),
        }
        self.reverse.insert(value, key);
    }

    pub fn value_for(&self, key: &K) -> Option<&V> {
        self.forward.get(key)
    }

    pub fn key_for(&self, value: &V) -> Option<&K> {
        self.reverse.get(value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.forward.contains_key(key)
    }

    /// Remove both directions atomically. Returns the removed value.
    pub fn remove_key(&mut self, key: &K) -> Option<V> {
        let value = self.forward.remove(key)?;
        self.reverse.remove(&value);
        self.order.retain(|k| k != key);
        Some(value)
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Iterate the forward relation in key insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order.iter().filter_map(|k| Some((k, self.forward.get(k)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_then_lookup_both_directions() {
        let mut map = BiMap::new();
        map.insert(1u32, "a");
        map.insert(2u32, "b");

        assert_eq!(map.value_for(&1), Some(&"a"));
        assert_eq!(map.value_for(&2), Some(&"b"));
        assert_eq!(map.key_for(&"a"), Some(&1));
        assert_eq!(map.key_for(&"b"), Some(&2));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_remove_key_clears_both_directions() {
        let mut map = BiMap::new();
        map.insert(1u32, "a");

        assert_eq!(map.remove_key(&1), Some("a"));
        assert!(!map.contains_key(&1));
        assert_eq!(map.key_for(&"a"), None);
        assert!(map.is_empty());
    }

    #[test]
    fn test_overwrite_drops_stale_reverse_entry() {
        let mut map = BiMap::new();
        map.insert(1u32, "a");
        map.insert(1u32, "b");

        assert_eq!(map.value_for(&1), Some(&"b"));
        assert_eq!(map.key_for(&"b"), Some(&1));
        // The old value must no longer resolve to anything
        assert_eq!(map.key_for(&"a"), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_value_steal_evicts_previous_owner() {
        let mut map = BiMap::new();
        map.insert(1u32, "a");
        map.insert(2u32, "a");

        assert!(!map.contains_key(&1));
        assert_eq!(map.key_for(&"a"), Some(&2));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_iteration_follows_insertion_order() {
        let mut map = BiMap::new();
        map.insert(3u32, "c");
        map.insert(1u32, "a");
        map.insert(2u32, "b");
        map.remove_key(&1);
        map.insert(4u32, "d");

        let keys: Vec<u32> = map.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![3, 2, 4]);
    }

    #[test]
    fn test_clear_empties_both_sides() {
        let mut map = BiMap::new();
        map.insert(1u32, "a");
        map.insert(2u32, "b");
        map.clear();

        assert!(map.is_empty());
        assert_eq!(map.key_for(&"a"), None);
        assert_eq!(map.iter().count(), 0);
    }
}
