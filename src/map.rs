use core::cmp::Ordering;
use core::fmt;
use core::mem;

use crate::error::insert_or_panic;
use crate::{Compare, IntoIter, Iter, Less, MapTree, Position, TreeError};

/// An ordered map with unique keys.
///
/// Unlike [`BTreeMap::insert`](alloc::collections::BTreeMap::insert),
/// [`RbMap::insert`] never replaces an existing entry; use
/// [`RbMap::insert_or_assign`] for that.
///
/// # Examples
///
/// ```
/// use ordtree::RbMap;
///
/// let mut ages = RbMap::new();
/// assert!(ages.insert("bob", 31).unwrap());
/// assert!(!ages.insert("bob", 99).unwrap());
/// assert_eq!(ages.get(&"bob"), Some(&31));
///
/// *ages.get_or_insert_default("eve").unwrap() += 5;
/// assert_eq!(ages.insert_or_assign("bob", 32).unwrap(), Some(31));
/// assert_eq!(ages.keys().copied().collect::<Vec<_>>(), ["bob", "eve"]);
/// ```
pub struct RbMap<K, M, C = Less> {
    tree: MapTree<K, M, C>,
}

impl<K, M> RbMap<K, M> {
    /// Creates an empty map in ascending key order
    pub fn new() -> Self {
        Self {
            tree: MapTree::new(),
        }
    }
}

impl<K, M, C> RbMap<K, M, C> {
    /// Creates an empty map ordered by `key_comp`
    pub fn with_comparator(key_comp: C) -> Self {
        Self {
            tree: MapTree::with_comparator(key_comp),
        }
    }

    /// Number of entries
    #[inline]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map holds no entries
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The comparator ordering the keys
    #[inline]
    pub const fn key_comp(&self) -> &C {
        self.tree.key_comp()
    }

    /// The underlying tree, for position-based access
    #[inline]
    pub const fn as_tree(&self) -> &MapTree<K, M, C> {
        &self.tree
    }

    /// Iterates over `(key, value)` pairs in key order
    pub fn iter(&self) -> Iter<'_, (K, M)> {
        self.tree.iter()
    }

    /// Iterates over the keys in order
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> {
        self.tree.iter().map(|(key, _)| key)
    }

    /// Iterates over the values in key order
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &M> {
        self.tree.iter().map(|(_, value)| value)
    }

    /// The entry with the smallest key
    pub fn first_key_value(&self) -> Option<(&K, &M)> {
        self.tree.first().map(|(key, value)| (key, value))
    }

    /// The entry with the largest key
    pub fn last_key_value(&self) -> Option<(&K, &M)> {
        self.tree.last().map(|(key, value)| (key, value))
    }

    /// Removes every entry
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Exchanges the contents of two maps
    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }
}

impl<K, M, C: Compare<K>> RbMap<K, M, C> {
    /// Inserts `key` with `value` unless the key is already present.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the entry was added. `Ok(false)` if the key was present;
    /// the existing value is kept and `value` is dropped.
    pub fn insert(&mut self, key: K, value: M) -> Result<bool, TreeError> {
        self.tree
            .insert_unique((key, value))
            .map(|(_, inserted)| inserted)
    }

    /// Inserts `key` with `value`, replacing and returning any previous value
    pub fn insert_or_assign(&mut self, key: K, value: M) -> Result<Option<M>, TreeError> {
        let pos = self.tree.lower_bound(&key);
        if self.holds(pos, &key) {
            let entry = self.tree.element_mut(pos);
            return Ok(Some(mem::replace(&mut entry.1, value)));
        }
        self.tree.insert_unique_hint(pos, (key, value))?;
        Ok(None)
    }

    /// The value stored under `key`
    pub fn get(&self, key: &K) -> Option<&M> {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// The stored key and value matching `key`
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &M)> {
        self.tree
            .get(self.tree.find(key))
            .map(|(key, value)| (key, value))
    }

    /// Mutable access to the value stored under `key`
    pub fn get_mut(&mut self, key: &K) -> Option<&mut M> {
        let pos = self.tree.find(key);
        self.tree.get_mut(pos).map(|entry| &mut entry.1)
    }

    /// Returns `true` if `key` is present
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// The value under `key`, inserting `M::default()` first if the key is
    /// missing.
    pub fn get_or_insert_default(&mut self, key: K) -> Result<&mut M, TreeError>
    where
        M: Default,
    {
        let mut pos = self.tree.lower_bound(&key);
        if !self.holds(pos, &key) {
            pos = self.tree.insert_unique_hint(pos, (key, M::default()))?.0;
        }
        Ok(&mut self.tree.element_mut(pos).1)
    }

    /// Removes the entry under `key` and returns its value
    pub fn remove(&mut self, key: &K) -> Option<M> {
        let pos = self.tree.find(key);
        self.tree.remove_at(pos).map(|(_, value)| value)
    }

    /// The first entry whose key is not less than `key`
    pub fn lower_bound(&self, key: &K) -> Option<(&K, &M)> {
        self.tree
            .get(self.tree.lower_bound(key))
            .map(|(key, value)| (key, value))
    }

    /// The first entry whose key is greater than `key`
    pub fn upper_bound(&self, key: &K) -> Option<(&K, &M)> {
        self.tree
            .get(self.tree.upper_bound(key))
            .map(|(key, value)| (key, value))
    }

    /// Iterates over the entry under `key`, if any
    pub fn equal_range(&self, key: &K) -> Iter<'_, (K, M)> {
        let (first, last) = self.tree.equal_range_unique(key);
        self.tree.range(first, last)
    }

    /// Iterates in key order over the entries with keys in `[from, to)`
    pub fn range(&self, from: &K, to: &K) -> Iter<'_, (K, M)> {
        self.tree.range_by_key(from, to)
    }

    /// Removes the entries with keys in `[from, to)` and returns how many
    /// there were
    pub fn remove_range(&mut self, from: &K, to: &K) -> usize {
        self.tree.erase_key_range(from, to)
    }

    /// Returns `true` if the element at `pos`, typically a lower bound of
    /// `key`, has a key equivalent to `key`
    fn holds(&self, pos: Position, key: &K) -> bool {
        self.tree
            .get(pos)
            .is_some_and(|(existing, _)| !self.tree.key_comp().less(key, existing))
    }
}

impl<K, M, C: Default> Default for RbMap<K, M, C> {
    fn default() -> Self {
        Self {
            tree: MapTree::default(),
        }
    }
}

impl<K: Clone, M: Clone, C: Clone> Clone for RbMap<K, M, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: fmt::Debug, M: fmt::Debug, C> fmt::Debug for RbMap<K, M, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(key, value)| (key, value)))
            .finish()
    }
}

impl<K: PartialEq, M: PartialEq, C> PartialEq for RbMap<K, M, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<K: Eq, M: Eq, C> Eq for RbMap<K, M, C> {}

/// Lexicographic over the `(key, value)` pairs in key order
impl<K: PartialOrd, M: PartialOrd, C> PartialOrd for RbMap<K, M, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.tree.partial_cmp(&other.tree)
    }
}

impl<K: Ord, M: Ord, C> Ord for RbMap<K, M, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tree.cmp(&other.tree)
    }
}

/// Entries whose key is already present are skipped, as with [`RbMap::insert`].
impl<K, M, C: Compare<K>> Extend<(K, M)> for RbMap<K, M, C> {
    fn extend<I: IntoIterator<Item = (K, M)>>(&mut self, iter: I) {
        for entry in iter {
            insert_or_panic(self.tree.insert_unique_hint(Position::END, entry));
        }
    }
}

impl<K, M, C: Compare<K> + Default> FromIterator<(K, M)> for RbMap<K, M, C> {
    fn from_iter<I: IntoIterator<Item = (K, M)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<'a, K, M, C> IntoIterator for &'a RbMap<K, M, C> {
    type Item = &'a (K, M);
    type IntoIter = Iter<'a, (K, M)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, M, C> IntoIterator for RbMap<K, M, C> {
    type Item = (K, M);
    type IntoIter = IntoIter<(K, M)>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

/// An ordered map that may hold several values per key.
///
/// Values under the same key keep the order they were inserted in.
pub struct RbMultiMap<K, M, C = Less> {
    tree: MapTree<K, M, C>,
}

impl<K, M> RbMultiMap<K, M> {
    /// Creates an empty multimap in ascending key order
    pub fn new() -> Self {
        Self {
            tree: MapTree::new(),
        }
    }
}

impl<K, M, C> RbMultiMap<K, M, C> {
    /// Creates an empty multimap ordered by `key_comp`
    pub fn with_comparator(key_comp: C) -> Self {
        Self {
            tree: MapTree::with_comparator(key_comp),
        }
    }

    /// Number of entries, counting every value
    #[inline]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the multimap holds no entries
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The comparator ordering the keys
    #[inline]
    pub const fn key_comp(&self) -> &C {
        self.tree.key_comp()
    }

    /// The underlying tree, for position-based access
    #[inline]
    pub const fn as_tree(&self) -> &MapTree<K, M, C> {
        &self.tree
    }

    /// Iterates over `(key, value)` pairs in key order
    pub fn iter(&self) -> Iter<'_, (K, M)> {
        self.tree.iter()
    }

    /// Removes every entry
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Exchanges the contents of two multimaps
    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }
}

impl<K, M, C: Compare<K>> RbMultiMap<K, M, C> {
    /// Adds `value` under `key`, after any values already there
    pub fn insert(&mut self, key: K, value: M) -> Result<Position, TreeError> {
        self.tree.insert_multi((key, value))
    }

    /// Iterates over the values under `key` in insertion order
    pub fn get_all(&self, key: &K) -> impl DoubleEndedIterator<Item = &M> {
        let (first, last) = self.tree.equal_range_multi(key);
        self.tree.range(first, last).map(|(_, value)| value)
    }

    /// Number of values under `key`
    pub fn count(&self, key: &K) -> usize {
        self.tree.count_multi(key)
    }

    /// Returns `true` if at least one value is stored under `key`
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Removes every value under `key` and returns how many there were
    pub fn remove_all(&mut self, key: &K) -> usize {
        self.tree.erase_multi(key)
    }

    /// The first entry whose key is not less than `key`
    pub fn lower_bound(&self, key: &K) -> Option<(&K, &M)> {
        self.tree
            .get(self.tree.lower_bound(key))
            .map(|(key, value)| (key, value))
    }

    /// The first entry whose key is greater than `key`
    pub fn upper_bound(&self, key: &K) -> Option<(&K, &M)> {
        self.tree
            .get(self.tree.upper_bound(key))
            .map(|(key, value)| (key, value))
    }

    /// Iterates over every entry under `key` in insertion order
    pub fn equal_range(&self, key: &K) -> Iter<'_, (K, M)> {
        let (first, last) = self.tree.equal_range_multi(key);
        self.tree.range(first, last)
    }

    /// Iterates in key order over the entries with keys in `[from, to)`
    pub fn range(&self, from: &K, to: &K) -> Iter<'_, (K, M)> {
        self.tree.range_by_key(from, to)
    }

    /// Removes every entry with a key in `[from, to)` and returns how many
    /// there were
    pub fn remove_range(&mut self, from: &K, to: &K) -> usize {
        self.tree.erase_key_range(from, to)
    }
}

impl<K, M, C: Default> Default for RbMultiMap<K, M, C> {
    fn default() -> Self {
        Self {
            tree: MapTree::default(),
        }
    }
}

impl<K: Clone, M: Clone, C: Clone> Clone for RbMultiMap<K, M, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: fmt::Debug, M: fmt::Debug, C> fmt::Debug for RbMultiMap<K, M, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, M: PartialEq, C> PartialEq for RbMultiMap<K, M, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<K: Eq, M: Eq, C> Eq for RbMultiMap<K, M, C> {}

impl<K: PartialOrd, M: PartialOrd, C> PartialOrd for RbMultiMap<K, M, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.tree.partial_cmp(&other.tree)
    }
}

impl<K: Ord, M: Ord, C> Ord for RbMultiMap<K, M, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tree.cmp(&other.tree)
    }
}

impl<K, M, C: Compare<K>> Extend<(K, M)> for RbMultiMap<K, M, C> {
    fn extend<I: IntoIterator<Item = (K, M)>>(&mut self, iter: I) {
        for entry in iter {
            insert_or_panic(self.tree.insert_multi(entry));
        }
    }
}

impl<K, M, C: Compare<K> + Default> FromIterator<(K, M)> for RbMultiMap<K, M, C> {
    fn from_iter<I: IntoIterator<Item = (K, M)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<'a, K, M, C> IntoIterator for &'a RbMultiMap<K, M, C> {
    type Item = &'a (K, M);
    type IntoIter = Iter<'a, (K, M)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, M, C> IntoIterator for RbMultiMap<K, M, C> {
    type Item = (K, M);
    type IntoIter = IntoIter<(K, M)>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Greater;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    #[test]
    fn test_map_insert_keeps_existing() {
        let mut map = RbMap::new();
        assert!(map.insert(1, "one").unwrap());
        assert!(!map.insert(1, "uno").unwrap());
        assert_eq!(map.get(&1), Some(&"one"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_map_insert_or_assign() {
        let mut map = RbMap::new();
        assert_eq!(map.insert_or_assign(2, 'b').unwrap(), None);
        assert_eq!(map.insert_or_assign(1, 'a').unwrap(), None);
        assert_eq!(map.insert_or_assign(2, 'B').unwrap(), Some('b'));
        assert_eq!(map.values().copied().collect::<String>(), "aB");
        assert!(map.as_tree().check_invariants().is_ok());
    }

    #[test]
    fn test_map_get_or_insert_default() {
        let mut counts: RbMap<String, usize> = RbMap::new();
        for word in "the cat saw the other cat".split(' ') {
            *counts.get_or_insert_default(word.to_string()).unwrap() += 1;
        }
        assert_eq!(counts.get(&"the".to_string()), Some(&2));
        assert_eq!(counts.get(&"cat".to_string()), Some(&2));
        assert_eq!(counts.get(&"saw".to_string()), Some(&1));
        assert_eq!(counts.len(), 4);
        assert_eq!(
            counts.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["cat", "other", "saw", "the"]
        );
    }

    #[test]
    fn test_map_access_and_remove() {
        let mut map: RbMap<i32, i32> = (0..5).map(|k| (k, k * 10)).collect();
        if let Some(value) = map.get_mut(&3) {
            *value += 1;
        }
        assert_eq!(map.get_key_value(&3), Some((&3, &31)));
        assert!(map.contains_key(&4));
        assert_eq!(map.first_key_value(), Some((&0, &0)));
        assert_eq!(map.last_key_value(), Some((&4, &40)));

        assert_eq!(map.remove(&4), Some(40));
        assert_eq!(map.remove(&4), None);
        assert!(map.get_mut(&4).is_none());
        assert_eq!(map.keys().rev().copied().collect::<Vec<_>>(), vec![3, 2, 1, 0]);

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.first_key_value(), None);
    }

    #[test]
    fn test_map_traits() {
        let mut map = RbMap::with_comparator(Greater);
        map.extend([(1, 'a'), (2, 'b'), (1, 'z')]);
        assert_eq!(format!("{map:?}"), "{2: 'b', 1: 'a'}");
        assert_eq!(map.clone(), map);
        assert_eq!(*map.key_comp(), Greater);
        assert_eq!(
            map.into_iter().collect::<Vec<_>>(),
            vec![(2, 'b'), (1, 'a')]
        );
    }

    #[test]
    fn test_map_capacity_error_surfaces() {
        let mut map = RbMap {
            tree: MapTree::with_max_size(1, Less),
        };
        map.insert(1, ()).unwrap();
        assert_eq!(
            map.insert_or_assign(2, ()),
            Err(TreeError::CapacityExceeded { max_size: 1 })
        );
        assert_eq!(map.insert_or_assign(1, ()), Ok(Some(())));
        assert!(map.get_or_insert_default(3).is_err());
        assert_eq!(map.len(), 1);
    }

    #[test]
    #[should_panic(expected = "insertion failed")]
    fn test_extend_panics_past_max_size() {
        let mut map = RbMap {
            tree: MapTree::with_max_size(1, Less),
        };
        map.extend([(1, ()), (2, ())]);
    }

    #[test]
    fn test_map_bounds_and_key_ranges() {
        let mut map: RbMap<i32, char> = [(10, 'a'), (20, 'b'), (30, 'c'), (40, 'd')]
            .into_iter()
            .collect();
        assert_eq!(map.lower_bound(&20), Some((&20, &'b')));
        assert_eq!(map.upper_bound(&20), Some((&30, &'c')));
        assert_eq!(map.upper_bound(&40), None);
        assert_eq!(map.equal_range(&30).collect::<Vec<_>>(), vec![&(30, 'c')]);
        assert_eq!(map.equal_range(&35).count(), 0);
        assert_eq!(
            map.range(&15, &40).map(|(key, _)| *key).collect::<Vec<_>>(),
            vec![20, 30]
        );
        assert_eq!(map.range(&40, &15).next_back(), None);

        assert_eq!(map.remove_range(&15, &35), 2);
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![10, 40]);
        assert!(map.as_tree().check_invariants().is_ok());
    }

    #[test]
    fn test_map_swap_and_order() {
        let mut small: RbMap<i32, i32> = [(1, 1)].into_iter().collect();
        let mut large: RbMap<i32, i32> = [(1, 2), (3, 0)].into_iter().collect();
        assert!(small < large);
        assert_eq!(large.cmp(&large.clone()), Ordering::Equal);

        small.swap(&mut large);
        assert_eq!(small.len(), 2);
        assert_eq!(large.get(&1), Some(&1));
        assert!(small > large);
    }

    #[test]
    fn test_multimap_groups_values() {
        let mut index = RbMultiMap::new();
        index.insert("b", 1).unwrap();
        index.insert("a", 2).unwrap();
        index.insert("b", 3).unwrap();
        index.insert("b", 4).unwrap();

        assert_eq!(index.len(), 4);
        assert_eq!(index.count(&"b"), 3);
        assert_eq!(
            index.get_all(&"b").copied().collect::<Vec<_>>(),
            vec![1, 3, 4]
        );
        assert_eq!(index.get_all(&"c").count(), 0);
        assert!(index.contains_key(&"a"));

        assert_eq!(index.remove_all(&"b"), 3);
        assert_eq!(index.iter().collect::<Vec<_>>(), vec![&("a", 2)]);
        assert!(index.as_tree().check_invariants().is_ok());

        index.clear();
        assert!(index.is_empty());
    }

    #[test]
    fn test_multimap_collect_and_clone() {
        let pairs: RbMultiMap<u8, char> = [(2, 'x'), (1, 'y'), (2, 'z')].into_iter().collect();
        let copy = pairs.clone();
        assert_eq!(format!("{copy:?}"), "[(1, 'y'), (2, 'x'), (2, 'z')]");
        assert_eq!(
            pairs.get_all(&2).rev().copied().collect::<Vec<_>>(),
            vec!['z', 'x']
        );
        assert_eq!(copy, pairs);
    }

    #[test]
    fn test_multimap_bounds_ranges_and_order() {
        let mut index: RbMultiMap<u8, char> =
            [(1, 'a'), (2, 'b'), (2, 'c'), (3, 'd'), (5, 'e')].into_iter().collect();
        assert_eq!(index.lower_bound(&2), Some((&2, &'b')));
        assert_eq!(index.upper_bound(&2), Some((&3, &'d')));
        assert_eq!(index.lower_bound(&6), None);
        assert_eq!(
            index.equal_range(&2).collect::<Vec<_>>(),
            vec![&(2, 'b'), &(2, 'c')]
        );
        assert_eq!(index.range(&2, &5).count(), 3);
        assert_eq!(*index.key_comp(), Less);

        let before = index.clone();
        assert_eq!(index.remove_range(&2, &4), 3);
        assert!(before < index);
        assert_ne!(before, index);

        let mut other = RbMultiMap::new();
        other.insert(9, 'z').unwrap();
        index.swap(&mut other);
        assert_eq!((&index).into_iter().count(), 1);
        assert_eq!(
            other.into_iter().collect::<Vec<_>>(),
            vec![(1, 'a'), (5, 'e')]
        );
    }
}
