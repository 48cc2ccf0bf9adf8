use core::cmp::Ordering;
use core::fmt;

use crate::error::insert_or_panic;
use crate::{Compare, IntoIter, Iter, Less, Position, SetTree, TreeError};

/// An ordered set of unique keys.
///
/// # Examples
///
/// ```
/// use ordtree::RbSet;
///
/// let mut set: RbSet<&str> = ["pear", "apple", "fig"].into_iter().collect();
/// assert!(!set.insert("fig").unwrap());
/// assert_eq!(set.first(), Some(&"apple"));
/// assert_eq!(set.pop_last(), Some("pear"));
/// assert_eq!(set.len(), 2);
/// ```
pub struct RbSet<K, C = Less> {
    tree: SetTree<K, C>,
}

impl<K> RbSet<K> {
    /// Creates an empty set in ascending order
    pub fn new() -> Self {
        Self {
            tree: SetTree::new(),
        }
    }
}

impl<K, C> RbSet<K, C> {
    /// Creates an empty set ordered by `key_comp`
    pub fn with_comparator(key_comp: C) -> Self {
        Self {
            tree: SetTree::with_comparator(key_comp),
        }
    }

    /// Number of keys in the set
    #[inline]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the set holds no keys
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
    pub const fn as_tree(&self) -> &SetTree<K, C> {
        &self.tree
    }

    /// The smallest key
    pub fn first(&self) -> Option<&K> {
        self.tree.first()
    }

    /// The largest key
    pub fn last(&self) -> Option<&K> {
        self.tree.last()
    }

    /// Removes and returns the smallest key
    pub fn pop_first(&mut self) -> Option<K> {
        let first = self.tree.begin();
        self.tree.remove_at(first)
    }

    /// Removes and returns the largest key
    pub fn pop_last(&mut self) -> Option<K> {
        let last = self.tree.prev(self.tree.end());
        self.tree.remove_at(last)
    }

    /// Iterates over the keys in order
    pub fn iter(&self) -> Iter<'_, K> {
        self.tree.iter()
    }

    /// Removes every key
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Exchanges the contents of two sets
    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }
}

impl<K, C: Compare<K>> RbSet<K, C> {
    /// Adds `key` to the set.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the key was added, `Ok(false)` if an equivalent key was
    /// already present (the set keeps the old one).
    pub fn insert(&mut self, key: K) -> Result<bool, TreeError> {
        self.tree.insert_unique(key).map(|(_, inserted)| inserted)
    }

    /// Adds `key`, linking it in constant time when it belongs directly
    /// before `hint`. Returns the position of `key` or its equivalent.
    pub fn insert_hint(&mut self, hint: Position, key: K) -> Result<Position, TreeError> {
        self.tree
            .insert_unique_hint(hint, key)
            .map(|(pos, _)| pos)
    }

    /// Returns `true` if a key equivalent to `key` is present
    pub fn contains(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// The stored key equivalent to `key`
    pub fn get(&self, key: &K) -> Option<&K> {
        self.tree.get(self.tree.find(key))
    }

    /// Removes the key equivalent to `key` and reports whether it was present
    pub fn remove(&mut self, key: &K) -> bool {
        self.tree.erase_unique(key) == 1
    }

    /// Removes and returns the stored key equivalent to `key`
    pub fn take(&mut self, key: &K) -> Option<K> {
        let pos = self.tree.find(key);
        self.tree.remove_at(pos)
    }

    /// Iterates in order over every key not less than `key`
    pub fn range_from(&self, key: &K) -> Iter<'_, K> {
        self.tree.range(self.tree.lower_bound(key), self.tree.end())
    }

    /// Iterates in order over the keys in `[from, to)`
    pub fn range(&self, from: &K, to: &K) -> Iter<'_, K> {
        self.tree.range_by_key(from, to)
    }

    /// Removes the keys in `[from, to)` and returns how many there were
    pub fn remove_range(&mut self, from: &K, to: &K) -> usize {
        self.tree.erase_key_range(from, to)
    }

    /// The smallest key not less than `key`
    pub fn lower_bound(&self, key: &K) -> Option<&K> {
        self.tree.get(self.tree.lower_bound(key))
    }

    /// The smallest key greater than `key`
    pub fn upper_bound(&self, key: &K) -> Option<&K> {
        self.tree.get(self.tree.upper_bound(key))
    }
}

impl<K, C: Default> Default for RbSet<K, C> {
    fn default() -> Self {
        Self {
            tree: SetTree::default(),
        }
    }
}

impl<K: Clone, C: Clone> Clone for RbSet<K, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: fmt::Debug, C> fmt::Debug for RbSet<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, C> PartialEq for RbSet<K, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<K: Eq, C> Eq for RbSet<K, C> {}

/// Lexicographic over the keys in set order
impl<K: PartialOrd, C> PartialOrd for RbSet<K, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.tree.partial_cmp(&other.tree)
    }
}

impl<K: Ord, C> Ord for RbSet<K, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tree.cmp(&other.tree)
    }
}

impl<K, C: Compare<K>> Extend<K> for RbSet<K, C> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            insert_or_panic(self.tree.insert_unique_hint(Position::END, key));
        }
    }
}

impl<K, C: Compare<K> + Default> FromIterator<K> for RbSet<K, C> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<'a, K, C> IntoIterator for &'a RbSet<K, C> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, C> IntoIterator for RbSet<K, C> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

/// An ordered collection of keys that may repeat.
///
/// Equivalent keys sit next to each other in the order they were inserted.
pub struct RbMultiSet<K, C = Less> {
    tree: SetTree<K, C>,
}

impl<K> RbMultiSet<K> {
    /// Creates an empty multiset in ascending order
    pub fn new() -> Self {
        Self {
            tree: SetTree::new(),
        }
    }
}

impl<K, C> RbMultiSet<K, C> {
    /// Creates an empty multiset ordered by `key_comp`
    pub fn with_comparator(key_comp: C) -> Self {
        Self {
            tree: SetTree::with_comparator(key_comp),
        }
    }

    /// Number of keys, counting repeats
    #[inline]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the multiset holds no keys
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
    pub const fn as_tree(&self) -> &SetTree<K, C> {
        &self.tree
    }

    /// Iterates over every key in order, repeats included
    pub fn iter(&self) -> Iter<'_, K> {
        self.tree.iter()
    }

    /// Removes every key
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Exchanges the contents of two multisets
    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }
}

impl<K, C: Compare<K>> RbMultiSet<K, C> {
    /// Adds `key` after any equivalent keys and returns its position
    pub fn insert(&mut self, key: K) -> Result<Position, TreeError> {
        self.tree.insert_multi(key)
    }

    /// Number of keys equivalent to `key`
    pub fn count(&self, key: &K) -> usize {
        self.tree.count_multi(key)
    }

    /// Returns `true` if at least one key equivalent to `key` is present
    pub fn contains(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Iterates over the keys equivalent to `key`
    pub fn equal_range(&self, key: &K) -> Iter<'_, K> {
        let (first, last) = self.tree.equal_range_multi(key);
        self.tree.range(first, last)
    }

    /// The first key not less than `key`
    pub fn lower_bound(&self, key: &K) -> Option<&K> {
        self.tree.get(self.tree.lower_bound(key))
    }

    /// The first key greater than `key`
    pub fn upper_bound(&self, key: &K) -> Option<&K> {
        self.tree.get(self.tree.upper_bound(key))
    }

    /// Iterates in order over the keys in `[from, to)`, repeats included
    pub fn range(&self, from: &K, to: &K) -> Iter<'_, K> {
        self.tree.range_by_key(from, to)
    }

    /// Removes every key in `[from, to)` and returns how many there were
    pub fn remove_range(&mut self, from: &K, to: &K) -> usize {
        self.tree.erase_key_range(from, to)
    }

    /// Removes the earliest inserted key equivalent to `key` and returns it
    pub fn remove_one(&mut self, key: &K) -> Option<K> {
        let pos = self.tree.find(key);
        self.tree.remove_at(pos)
    }

    /// Removes every key equivalent to `key` and returns how many there were
    pub fn remove_all(&mut self, key: &K) -> usize {
        self.tree.erase_multi(key)
    }
}

impl<K, C: Default> Default for RbMultiSet<K, C> {
    fn default() -> Self {
        Self {
            tree: SetTree::default(),
        }
    }
}

impl<K: Clone, C: Clone> Clone for RbMultiSet<K, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: fmt::Debug, C> fmt::Debug for RbMultiSet<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, C> PartialEq for RbMultiSet<K, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<K: Eq, C> Eq for RbMultiSet<K, C> {}

impl<K: PartialOrd, C> PartialOrd for RbMultiSet<K, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.tree.partial_cmp(&other.tree)
    }
}

impl<K: Ord, C> Ord for RbMultiSet<K, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tree.cmp(&other.tree)
    }
}

impl<K, C: Compare<K>> Extend<K> for RbMultiSet<K, C> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            insert_or_panic(self.tree.insert_multi(key));
        }
    }
}

impl<K, C: Compare<K> + Default> FromIterator<K> for RbMultiSet<K, C> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<'a, K, C> IntoIterator for &'a RbMultiSet<K, C> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, C> IntoIterator for RbMultiSet<K, C> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}
