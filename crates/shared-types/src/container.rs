//! # Keyed Container
//!
//! Registry mapping a unique key to one handler. Keys are never overwritten:
//! a duplicate insert fails and the first value stays. Built with `&mut self`
//! during initialisation, then shared read-only behind an `Arc`.

use crate::errors::ContainerError;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash as StdHash;

#[derive(Debug, Clone)]
pub struct KeyedContainer<K, V> {
    items: HashMap<K, V>,
    order: Vec<K>,
}

impl<K, V> KeyedContainer<K, V>
where
    K: Eq + StdHash + Clone + Debug,
{
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Inserts `value` under `key`; fails if the key exists.
    pub fn add(&mut self, key: K, value: V) -> Result<(), ContainerError> {
        if self.items.contains_key(&key) {
            return Err(ContainerError::ItemAlreadyExists {
                key: format!("{key:?}"),
            });
        }
        self.order.push(key.clone());
        self.items.insert(key, value);
        Ok(())
    }

    /// Inserts all pairs or none of them.
    ///
    /// Keys are checked against the container and against each other before
    /// anything is inserted.
    pub fn add_multiple(&mut self, keys: Vec<K>, values: Vec<V>) -> Result<(), ContainerError> {
        if keys.len() != values.len() {
            return Err(ContainerError::LengthMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }

        let mut seen = std::collections::HashSet::with_capacity(keys.len());
        for key in &keys {
            if self.items.contains_key(key) || !seen.insert(key) {
                return Err(ContainerError::ItemAlreadyExists {
                    key: format!("{key:?}"),
                });
            }
        }

        for (key, value) in keys.into_iter().zip(values) {
            self.order.push(key.clone());
            self.items.insert(key, value);
        }
        Ok(())
    }

    pub fn get(&self, key: &K) -> Result<&V, ContainerError> {
        self.items.get(key).ok_or_else(|| ContainerError::InvalidKey {
            key: format!("{key:?}"),
        })
    }

    pub fn contains(&self, key: &K) -> bool {
        self.items.contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> &[K] {
        &self.order
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.order.iter().filter_map(|k| self.items.get(k))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<K, V> Default for KeyedContainer<K, V>
where
    K: Eq + StdHash + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_keeps_first() {
        let mut container = KeyedContainer::new();
        container.add("topic".to_string(), 1).unwrap();
        let err = container.add("topic".to_string(), 2).unwrap_err();

        assert!(matches!(err, ContainerError::ItemAlreadyExists { .. }));
        assert_eq!(container.len(), 1);
        assert_eq!(*container.get(&"topic".to_string()).unwrap(), 1);
    }

    #[test]
    fn test_add_multiple_is_all_or_nothing() {
        let mut container = KeyedContainer::new();
        container.add(3u32, "c").unwrap();

        let err = container.add_multiple(vec![1, 2, 3], vec!["a", "b", "x"]);
        assert!(err.is_err());
        assert_eq!(container.len(), 1);
        assert!(!container.contains(&1));
    }

    #[test]
    fn test_add_multiple_rejects_duplicates_within_batch() {
        let mut container: KeyedContainer<u32, &str> = KeyedContainer::new();
        assert!(container.add_multiple(vec![1, 1], vec!["a", "b"]).is_err());
        assert!(container.is_empty());
    }

    #[test]
    fn test_add_multiple_length_mismatch() {
        let mut container: KeyedContainer<u32, &str> = KeyedContainer::new();
        assert_eq!(
            container.add_multiple(vec![1, 2], vec!["a"]),
            Err(ContainerError::LengthMismatch { keys: 2, values: 1 })
        );
    }

    #[test]
    fn test_keys_preserve_insertion_order() {
        let mut container = KeyedContainer::new();
        container
            .add_multiple(vec![5u32, 1, 3], vec![(), (), ()])
            .unwrap();
        assert_eq!(container.keys(), &[5, 1, 3]);
    }

    #[test]
    fn test_get_missing_key() {
        let container: KeyedContainer<u32, ()> = KeyedContainer::new();
        assert!(matches!(
            container.get(&9),
            Err(ContainerError::InvalidKey { .. })
        ));
    }
}
