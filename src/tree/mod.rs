//! Red-black tree container over an index arena.
//!
//! The tree owns a single header slot whose `parent` is the root and whose
//! `left`/`right` cache the leftmost and rightmost nodes. The header doubles
//! as the "one past the end" position, which closes the cursor ring: stepping
//! forward from the last element lands on `end`, and stepping forward again
//! lands on the first element.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;
use core::mem;

use log::{debug, warn};

mod arena;
mod cursor;
mod node;
mod primitives;
mod rebalance;
mod validate;

use arena::NodeArena;
pub use cursor::{Cursor, IntoIter, Iter, Position};
use node::{HEADER, NIL, Node, Side};
pub use validate::InvariantViolation;

use crate::{Compare, First, Identity, KeyOfValue, Less, TreeError};

/// A tree whose elements are their own keys
pub type SetTree<K, C = Less> = RbTree<K, Identity, C>;

/// A tree of `(key, mapped)` pairs ordered by key
pub type MapTree<K, M, C = Less> = RbTree<(K, M), First, C>;

/// Outcome of the insertion descent
enum InsertSlot {
    /// No equivalent key; link the new node under `parent` on `side`
    Vacant { parent: usize, side: Side },
    /// An equivalent key already lives at this node
    Occupied(usize),
}

/// An ordered collection backed by a red-black tree.
///
/// The same tree serves both set-shaped and map-shaped containers: `X` picks
/// the key out of each stored value `V` and `C` orders the keys. Every
/// operation comes in a "unique" flavour that rejects equivalent keys and a
/// "multi" flavour that keeps them next to each other in insertion order.
///
/// Search, insertion and removal are `O(log n)`. Elements are addressed by
/// [`Position`] handles that stay valid until their element is erased.
///
/// # Type Parameters
///
/// * `V` - The stored value
/// * `X` - Key extraction policy, [`Identity`] or [`First`]
/// * `C` - Strict weak order over keys, [`Less`] by default
///
/// # Examples
///
/// ```
/// use ordtree::SetTree;
///
/// let mut tree = SetTree::<i32>::new();
/// for key in [10, 20, 5, 15, 25, 1] {
///     tree.insert_unique(key).unwrap();
/// }
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 5, 10, 15, 20, 25]);
///
/// let pos = tree.lower_bound(&7);
/// assert_eq!(tree.get(pos), Some(&10));
/// ```
pub struct RbTree<V, X, C = Less> {
    /// Header plus node slots
    arena: NodeArena<V>,

    /// Key ordering
    key_comp: C,

    /// Upper bound on the element count
    max_size: usize,

    _extract: PhantomData<fn() -> X>,
}

impl<V, X> RbTree<V, X, Less> {
    /// Creates an empty tree in ascending key order
    pub fn new() -> Self {
        Self::with_comparator(Less)
    }
}

impl<V, X, C: Default> Default for RbTree<V, X, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<V, X, C> RbTree<V, X, C> {
    /// Creates an empty tree ordered by `key_comp`
    pub fn with_comparator(key_comp: C) -> Self {
        Self {
            arena: NodeArena::new(),
            key_comp,
            max_size: Self::default_max_size(),
            _extract: PhantomData,
        }
    }

    /// Creates an empty tree that refuses to grow past `max_size` elements.
    ///
    /// # Arguments
    ///
    /// * `max_size` - The largest number of elements the tree will hold
    /// * `key_comp` - The key ordering
    ///
    /// # Panics
    ///
    /// Panics if `max_size` is 0.
    pub fn with_max_size(max_size: usize, key_comp: C) -> Self {
        assert!(max_size > 0, "Maximum size must be greater than 0");
        Self {
            max_size: max_size.min(Self::default_max_size()),
            ..Self::with_comparator(key_comp)
        }
    }

    fn default_max_size() -> usize {
        isize::MAX as usize / mem::size_of::<Node<V>>()
    }

    /// Number of elements in the tree
    #[inline]
    pub const fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the tree holds no elements
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// The largest number of elements this tree accepts
    #[inline]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    /// The comparator ordering the keys
    #[inline]
    pub const fn key_comp(&self) -> &C {
        &self.key_comp
    }

    /// Makes room for `additional` more elements, so that many insertions
    /// cannot fail on allocation.
    pub fn reserve(&mut self, additional: usize) -> Result<(), TreeError> {
        self.check_capacity(additional)?;
        self.arena.reserve(additional)
    }

    /// Position of the first element, or `end` when empty
    #[inline]
    pub fn begin(&self) -> Position {
        self.arena.position(self.arena.leftmost())
    }

    /// The "one past the last element" position
    #[inline]
    pub const fn end(&self) -> Position {
        Position::END
    }

    /// The position after `pos`. The last element is followed by `end`, and
    /// `end` by the first element. Positions of erased elements count as `end`.
    pub fn next(&self, pos: Position) -> Position {
        self.arena.position(self.arena.successor(self.checked(pos)))
    }

    /// The position before `pos`. The first element is preceded by `end`, and
    /// `end` by the last element. Positions of erased elements count as `end`.
    pub fn prev(&self, pos: Position) -> Position {
        self.arena.position(self.arena.predecessor(self.checked(pos)))
    }

    /// The element at `pos`, or `None` for `end` and erased positions
    #[inline]
    pub fn get(&self, pos: Position) -> Option<&V> {
        self.arena.value(self.arena.resolve(pos)?)
    }

    /// Mutable access to the element at `pos`. Callers must not change the key.
    #[inline]
    pub(crate) fn get_mut(&mut self, pos: Position) -> Option<&mut V> {
        let idx = self.arena.resolve(pos)?;
        self.arena.value_mut(idx)
    }

    /// Like [`get_mut`](Self::get_mut) for a position known to be live.
    /// Panics otherwise.
    #[inline]
    pub(crate) fn element_mut(&mut self, pos: Position) -> &mut V {
        self.arena.payload_mut(pos.index)
    }

    /// The smallest element
    #[inline]
    pub fn first(&self) -> Option<&V> {
        self.arena.value(self.arena.leftmost())
    }

    /// The largest element
    #[inline]
    pub fn last(&self) -> Option<&V> {
        self.arena.value(self.arena.rightmost())
    }

    /// A cursor starting at `pos`
    pub fn cursor(&self, pos: Position) -> Cursor<'_, V> {
        Cursor::new(&self.arena, self.checked(pos))
    }

    /// Iterates over all elements in order
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(&self.arena, self.arena.leftmost(), HEADER)
    }

    /// Iterates over the half-open range `[first, last)`.
    ///
    /// A range whose `last` comes before `first` is empty from both ends.
    pub fn range(&self, first: Position, last: Position) -> Iter<'_, V> {
        let (first, last) = (self.checked(first), self.checked(last));
        if self.arena.precedes(first, last) {
            Iter::new(&self.arena, first, last)
        } else {
            Iter::new(&self.arena, last, last)
        }
    }

    /// Erases the element at `pos` and returns the position that followed it.
    ///
    /// Positions of all other elements stay valid.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is `end` or no longer names an element.
    pub fn erase(&mut self, pos: Position) -> Position {
        match self.unlink(pos) {
            Some((next, _)) => next,
            None => panic!("erase: {pos:?} is not an element of this tree"),
        }
    }

    /// Removes the element at `pos` and returns it, or `None` if `pos` is
    /// `end` or no longer names an element.
    pub fn remove_at(&mut self, pos: Position) -> Option<V> {
        self.unlink(pos).map(|(_, value)| value)
    }

    /// Erases every element in `[first, last)` and returns `last`.
    ///
    /// # Panics
    ///
    /// Panics if `last` cannot be reached from `first`.
    pub fn erase_range(&mut self, first: Position, last: Position) -> Position {
        if first == self.begin() && last.is_end() {
            self.clear();
            return Position::END;
        }

        let mut erased = 0usize;
        let mut current = first;
        while current != last {
            current = self.erase(current);
            erased += 1;
        }
        debug!("erased range of {erased} elements, {} left", self.len());
        last
    }

    /// Drops every element and returns to the empty state
    pub fn clear(&mut self) {
        debug!("clearing tree of {} elements", self.len());
        self.arena.reset();
    }

    /// Exchanges the contents of two trees
    pub fn swap(&mut self, other: &mut Self) {
        debug!("swapping trees of {} and {} elements", self.len(), other.len());
        mem::swap(self, other);
    }

    /// Number of nodes on the longest root-to-leaf path
    pub fn height(&self) -> usize {
        self.arena.subtree_height(self.arena.root())
    }

    /// Deep copy that reports allocation failure instead of panicking.
    ///
    /// The copy has exactly the shape and colours of `self` and shares no
    /// nodes with it.
    pub fn try_clone(&self) -> Result<Self, TreeError>
    where
        V: Clone,
        C: Clone,
    {
        let mut slots = Vec::new();
        slots.try_reserve_exact(self.len() + 1)?;
        let mut arena = NodeArena::with_slots(slots);

        let root = self.arena.root();
        if root != NIL {
            // Pre-order walk; at most one pending right subtree per level.
            let mut stack: Vec<(usize, usize, Side)> = Vec::new();
            stack.try_reserve(self.height() + 1)?;
            stack.push((root, HEADER, Side::Left));

            while let Some((source, parent, side)) = stack.pop() {
                let node = self.arena.node_at(source);
                let copy = arena.push_copy(self.arena.payload(source).clone(), node.color, parent);
                if parent == HEADER {
                    arena.set_root(copy);
                } else {
                    arena.set_child(parent, side, copy);
                }
                if node.right != NIL {
                    stack.push((node.right, copy, Side::Right));
                }
                if node.left != NIL {
                    stack.push((node.left, copy, Side::Left));
                }
            }

            let copy_root = arena.root();
            let leftmost = arena.find_minimum(copy_root);
            let rightmost = arena.find_maximum(copy_root);
            arena.set_leftmost(leftmost);
            arena.set_rightmost(rightmost);
        }
        arena.reserve(0)?;

        debug!("cloned tree of {} elements", arena.len());
        Ok(Self {
            arena,
            key_comp: self.key_comp.clone(),
            max_size: self.max_size,
            _extract: PhantomData,
        })
    }

    /// Maps erased positions to `end`
    #[inline]
    fn checked(&self, pos: Position) -> usize {
        self.arena.resolve(pos).unwrap_or(HEADER)
    }

    fn check_capacity(&self, additional: usize) -> Result<(), TreeError> {
        if additional > self.max_size - self.len() {
            warn!(
                "rejecting {additional} insertions: tree holds {} of at most {}",
                self.len(),
                self.max_size
            );
            return Err(TreeError::CapacityExceeded {
                max_size: self.max_size,
            });
        }
        Ok(())
    }

    fn unlink(&mut self, pos: Position) -> Option<(Position, V)> {
        let idx = self.arena.resolve(pos)?;
        let next = self.arena.successor(idx);
        self.arena.delete_node(idx);
        let value = self.arena.deallocate(idx)?;

        #[cfg(test)]
        debug_assert!(
            self.arena.check_structure().is_ok(),
            "RB tree invariants violated after removal"
        );

        Some((self.arena.position(next), value))
    }
}

impl<V, X, C> RbTree<V, X, C>
where
    X: KeyOfValue<V>,
    C: Compare<X::Key>,
{
    #[inline]
    fn key(&self, idx: usize) -> &X::Key {
        X::key(self.arena.payload(idx))
    }

    /// Position of an element with a key equivalent to `key`, or `end`.
    ///
    /// In a multi tree this is the first of the equivalent elements.
    pub fn find(&self, key: &X::Key) -> Position {
        let candidate = self.lower_bound(key);
        if candidate.is_end() || self.key_comp.less(key, self.key(candidate.index)) {
            Position::END
        } else {
            candidate
        }
    }

    /// Returns `true` if an element with a key equivalent to `key` exists
    #[inline]
    pub fn contains(&self, key: &X::Key) -> bool {
        !self.find(key).is_end()
    }

    /// Position of the first element whose key is not less than `key`
    pub fn lower_bound(&self, key: &X::Key) -> Position {
        let mut candidate = HEADER;
        let mut current = self.arena.root();
        while current != NIL {
            if self.key_comp.less(self.key(current), key) {
                current = self.arena.get_right(current);
            } else {
                candidate = current;
                current = self.arena.get_left(current);
            }
        }
        self.arena.position(candidate)
    }

    /// Position of the first element whose key is greater than `key`
    pub fn upper_bound(&self, key: &X::Key) -> Position {
        let mut candidate = HEADER;
        let mut current = self.arena.root();
        while current != NIL {
            if self.key_comp.less(key, self.key(current)) {
                candidate = current;
                current = self.arena.get_left(current);
            } else {
                current = self.arena.get_right(current);
            }
        }
        self.arena.position(candidate)
    }

    /// `[pos, next(pos))` for the element matching `key`, or `(end, end)`
    pub fn equal_range_unique(&self, key: &X::Key) -> (Position, Position) {
        let pos = self.find(key);
        if pos.is_end() {
            (Position::END, Position::END)
        } else {
            (pos, self.next(pos))
        }
    }

    /// `[lower_bound(key), upper_bound(key))`
    pub fn equal_range_multi(&self, key: &X::Key) -> (Position, Position) {
        (self.lower_bound(key), self.upper_bound(key))
    }

    /// 1 if `key` is present, 0 otherwise
    pub fn count_unique(&self, key: &X::Key) -> usize {
        usize::from(self.contains(key))
    }

    /// Number of elements with a key equivalent to `key`
    pub fn count_multi(&self, key: &X::Key) -> usize {
        let (first, last) = self.equal_range_multi(key);
        self.range(first, last).count()
    }

    /// Inserts `value` unless an equivalent key is present.
    ///
    /// # Returns
    ///
    /// The position of the new element and `true`, or the position of the
    /// element already holding the key and `false`. On error the tree is
    /// unchanged and `value` is dropped.
    pub fn insert_unique(&mut self, value: V) -> Result<(Position, bool), TreeError> {
        let slot = self.get_insert_unique_pos(X::key(&value));
        self.insert_at(slot, value)
    }

    /// Inserts `value` after every element with an equivalent key
    pub fn insert_multi(&mut self, value: V) -> Result<Position, TreeError> {
        let (parent, side) = self.get_insert_multi_pos(X::key(&value));
        self.link_new(parent, side, value)
    }

    /// Like [`insert_unique`](Self::insert_unique), but links in constant
    /// time when `value` belongs directly before `hint`.
    ///
    /// A wrong hint costs nothing but the fast path: the full descent runs
    /// instead.
    pub fn insert_unique_hint(
        &mut self,
        hint: Position,
        value: V,
    ) -> Result<(Position, bool), TreeError> {
        let slot = self.hinted_unique_pos(self.checked(hint), X::key(&value));
        self.insert_at(slot, value)
    }

    /// Like [`insert_multi`](Self::insert_multi), but links in constant time
    /// when `value` belongs directly before `hint`.
    ///
    /// Equivalent elements inserted through a hint land next to the hint, so
    /// they are not necessarily ordered by insertion.
    pub fn insert_multi_hint(&mut self, hint: Position, value: V) -> Result<Position, TreeError> {
        let (parent, side) = self.hinted_multi_pos(self.checked(hint), X::key(&value));
        self.link_new(parent, side, value)
    }

    /// Inserts every value whose key is not yet present and returns how many
    /// were inserted.
    ///
    /// Capacity and storage for the whole batch are claimed before the first
    /// insertion, so a rejected batch leaves the tree unchanged.
    pub fn insert_unique_iter<I>(&mut self, values: I) -> Result<usize, TreeError>
    where
        I: IntoIterator<Item = V>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        self.reserve(values.len())?;
        debug!("inserting batch of {} unique values", values.len());

        let mut inserted = 0;
        for value in values {
            if self.insert_unique_hint(Position::END, value)?.1 {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    /// Inserts every value and returns how many were inserted.
    ///
    /// Capacity and storage for the whole batch are claimed before the first
    /// insertion, so a rejected batch leaves the tree unchanged.
    pub fn insert_multi_iter<I>(&mut self, values: I) -> Result<usize, TreeError>
    where
        I: IntoIterator<Item = V>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        let count = values.len();
        self.reserve(count)?;
        debug!("inserting batch of {count} values");

        for value in values {
            self.insert_multi_hint(Position::END, value)?;
        }
        Ok(count)
    }

    /// Erases the element matching `key` and returns how many were erased
    pub fn erase_unique(&mut self, key: &X::Key) -> usize {
        let pos = self.find(key);
        if pos.is_end() {
            return 0;
        }
        self.erase(pos);
        1
    }

    /// Erases every element matching `key` and returns how many were erased
    pub fn erase_multi(&mut self, key: &X::Key) -> usize {
        let (first, last) = self.equal_range_multi(key);
        let count = self.range(first, last).count();
        self.erase_range(first, last);
        count
    }

    /// Iterates over the elements whose keys lie in `[from, to)`
    pub fn range_by_key(&self, from: &X::Key, to: &X::Key) -> Iter<'_, V> {
        self.range(self.lower_bound(from), self.lower_bound(to))
    }

    /// Erases every element whose key lies in `[from, to)` and returns how
    /// many were erased. An empty or inverted key range erases nothing.
    pub fn erase_key_range(&mut self, from: &X::Key, to: &X::Key) -> usize {
        if !self.key_comp.less(from, to) {
            return 0;
        }
        let (first, last) = (self.lower_bound(from), self.lower_bound(to));
        let before = self.len();
        self.erase_range(first, last);
        before - self.len()
    }

    /// Checks every structural invariant of the tree.
    ///
    /// # Returns
    ///
    /// The black height (black nodes on any root-to-leaf path), or the first
    /// violation found.
    pub fn check_invariants(&self) -> Result<usize, InvariantViolation> {
        let black_height = self.arena.check_structure()?;

        let mut current = self.arena.leftmost();
        while current != HEADER {
            let next = self.arena.successor(current);
            if next != HEADER && self.key_comp.less(self.key(next), self.key(current)) {
                return Err(InvariantViolation::OutOfOrder {
                    node: self.arena.position(next),
                });
            }
            current = next;
        }
        Ok(black_height)
    }

    fn get_insert_unique_pos(&self, key: &X::Key) -> InsertSlot {
        let mut parent = HEADER;
        let mut current = self.arena.root();
        let mut goes_left = true;
        while current != NIL {
            parent = current;
            goes_left = self.key_comp.less(key, self.key(current));
            current = if goes_left {
                self.arena.get_left(current)
            } else {
                self.arena.get_right(current)
            };
        }

        let side = if goes_left { Side::Left } else { Side::Right };
        let mut before = parent;
        if goes_left {
            if parent == HEADER || parent == self.arena.leftmost() {
                return InsertSlot::Vacant { parent, side };
            }
            before = self.arena.predecessor(parent);
        }

        if self.key_comp.less(self.key(before), key) {
            InsertSlot::Vacant { parent, side }
        } else {
            InsertSlot::Occupied(before)
        }
    }

    fn get_insert_multi_pos(&self, key: &X::Key) -> (usize, Side) {
        let mut parent = HEADER;
        let mut side = Side::Left;
        let mut current = self.arena.root();
        while current != NIL {
            parent = current;
            side = if self.key_comp.less(key, self.key(current)) {
                Side::Left
            } else {
                Side::Right
            };
            current = self.arena.get_child(current, side);
        }
        (parent, side)
    }

    fn hinted_unique_pos(&self, hint: usize, key: &X::Key) -> InsertSlot {
        if self.is_empty() {
            return InsertSlot::Vacant {
                parent: HEADER,
                side: Side::Left,
            };
        }

        if hint == self.arena.leftmost() {
            if self.key_comp.less(key, self.key(hint)) {
                return InsertSlot::Vacant {
                    parent: hint,
                    side: Side::Left,
                };
            }
        } else if hint == HEADER {
            let last = self.arena.rightmost();
            if self.key_comp.less(self.key(last), key) {
                return InsertSlot::Vacant {
                    parent: last,
                    side: Side::Right,
                };
            }
        } else {
            let before = self.arena.predecessor(hint);
            if self.key_comp.less(self.key(before), key) && self.key_comp.less(key, self.key(hint))
            {
                let (parent, side) = self.vacant_between(before, hint);
                return InsertSlot::Vacant { parent, side };
            }
        }

        self.get_insert_unique_pos(key)
    }

    fn hinted_multi_pos(&self, hint: usize, key: &X::Key) -> (usize, Side) {
        if self.is_empty() {
            return (HEADER, Side::Left);
        }

        if hint == self.arena.leftmost() {
            if !self.key_comp.less(self.key(hint), key) {
                return (hint, Side::Left);
            }
        } else if hint == HEADER {
            let last = self.arena.rightmost();
            if !self.key_comp.less(key, self.key(last)) {
                return (last, Side::Right);
            }
        } else {
            let before = self.arena.predecessor(hint);
            if !self.key_comp.less(key, self.key(before))
                && !self.key_comp.less(self.key(hint), key)
            {
                return self.vacant_between(before, hint);
            }
        }

        self.get_insert_multi_pos(key)
    }

    /// The free link between two in-order neighbours. One of `before.right`
    /// and `after.left` is always empty.
    fn vacant_between(&self, before: usize, after: usize) -> (usize, Side) {
        if self.arena.get_right(before) == NIL {
            (before, Side::Right)
        } else {
            (after, Side::Left)
        }
    }

    fn insert_at(&mut self, slot: InsertSlot, value: V) -> Result<(Position, bool), TreeError> {
        match slot {
            InsertSlot::Occupied(existing) => Ok((self.arena.position(existing), false)),
            InsertSlot::Vacant { parent, side } => {
                self.link_new(parent, side, value).map(|pos| (pos, true))
            }
        }
    }

    fn link_new(&mut self, parent: usize, side: Side, value: V) -> Result<Position, TreeError> {
        self.check_capacity(1)?;
        let node = self.arena.allocate(value).inspect_err(|err| {
            warn!("rejecting insertion: {err}");
        })?;
        self.arena.link_node(parent, node, side);
        self.arena.fix_insertion_violations(node);

        #[cfg(test)]
        debug_assert!(
            self.check_invariants().is_ok(),
            "RB tree invariants violated after insertion"
        );

        Ok(self.arena.position(node))
    }
}

impl<V: Clone, X, C: Clone> Clone for RbTree<V, X, C> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(tree) => tree,
            Err(err) => panic!("failed to clone tree: {err}"),
        }
    }
}

impl<V: fmt::Debug, X, C> fmt::Debug for RbTree<V, X, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<V: PartialEq, X, C> PartialEq for RbTree<V, X, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<V: Eq, X, C> Eq for RbTree<V, X, C> {}

impl<V: PartialOrd, X, C> PartialOrd for RbTree<V, X, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<V: Ord, X, C> Ord for RbTree<V, X, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<'a, V, X, C> IntoIterator for &'a RbTree<V, X, C> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V, X, C> IntoIterator for RbTree<V, X, C> {
    type Item = V;
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.arena)
    }
}
