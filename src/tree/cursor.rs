use core::iter::FusedIterator;

use super::arena::NodeArena;
use super::node::HEADER;

/// A non-owning handle to an element of an [`RbTree`](crate::RbTree), or to
/// the "one past the end" slot.
///
/// Positions stay valid while the element they name is in the tree,
/// whatever else is inserted or erased. Once the element is erased the
/// position is stale: tree methods treat it like `end` or reject it, even
/// after its slot has been handed to a new element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Arena slot
    pub(crate) index: usize,
    /// Stamp of the node the slot held when the position was taken
    pub(crate) stamp: u64,
}

impl Position {
    /// The "one past the end" position shared by every tree
    pub const END: Position = Position {
        index: HEADER,
        stamp: 0,
    };

    /// Returns `true` if this is the end position
    #[inline]
    pub const fn is_end(self) -> bool {
        self.index == HEADER
    }
}

/// A bidirectional cursor over a tree in sorted order.
///
/// The cursor moves through the elements and one extra "end" slot between
/// the last and the first element, so moving past either edge wraps through
/// `end` instead of falling off the tree.
///
/// Created by [`RbTree::cursor`](crate::RbTree::cursor).
#[derive(Debug)]
pub struct Cursor<'a, V> {
    arena: &'a NodeArena<V>,
    current: usize,
}

impl<V> Clone for Cursor<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Cursor<'_, V> {}

impl<'a, V> Cursor<'a, V> {
    pub(crate) fn new(arena: &'a NodeArena<V>, current: usize) -> Self {
        Self { arena, current }
    }

    /// Returns the position the cursor points at
    #[inline]
    pub fn position(&self) -> Position {
        self.arena.position(self.current)
    }

    /// Returns `true` if the cursor sits on the end slot
    #[inline]
    pub const fn is_end(&self) -> bool {
        self.current == HEADER
    }

    /// Returns the element under the cursor, or `None` at the end slot
    #[inline]
    pub fn get(&self) -> Option<&'a V> {
        self.arena.value(self.current)
    }

    /// Moves to the in-order successor. From the last element this moves to
    /// the end slot, and from the end slot to the first element.
    pub fn move_next(&mut self) {
        self.current = self.arena.successor(self.current);
    }

    /// Moves to the in-order predecessor. From the end slot this moves to the
    /// last element, and from the first element to the end slot.
    pub fn move_prev(&mut self) {
        self.current = self.arena.predecessor(self.current);
    }

    /// Returns the element after the cursor without moving it
    pub fn peek_next(&self) -> Option<&'a V> {
        self.arena.value(self.arena.successor(self.current))
    }

    /// Returns the element before the cursor without moving it
    pub fn peek_prev(&self) -> Option<&'a V> {
        self.arena.value(self.arena.predecessor(self.current))
    }
}

/// An iterator over a half-open range of tree positions, in sorted order.
///
/// `back` is always reachable from `front`; an iterator over a range whose
/// end comes before its start is built empty.
///
/// Created by [`RbTree::iter`](crate::RbTree::iter) and
/// [`RbTree::range`](crate::RbTree::range).
#[derive(Debug)]
pub struct Iter<'a, V> {
    arena: &'a NodeArena<V>,
    /// Next node yielded from the front
    front: usize,
    /// One past the next node yielded from the back
    back: usize,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena,
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(arena: &'a NodeArena<V>, front: usize, back: usize) -> Self {
        Self { arena, front, back }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let current = self.front;
        if current == HEADER {
            // `back` was not reachable from `front`
            self.front = self.back;
            return None;
        }
        self.front = self.arena.successor(current);
        self.arena.value(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.front == self.back || self.front == HEADER {
            (0, Some(0))
        } else {
            (1, Some(self.arena.len()))
        }
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let previous = self.arena.predecessor(self.back);
        if previous == HEADER || self.front == HEADER {
            self.back = self.front;
            return None;
        }
        self.back = previous;
        self.arena.value(previous)
    }
}

impl<V> FusedIterator for Iter<'_, V> {}

/// An owning iterator over the elements of a tree, in sorted order.
///
/// Created by the [`IntoIterator`] implementation of [`RbTree`](crate::RbTree).
#[derive(Debug)]
pub struct IntoIter<V> {
    arena: NodeArena<V>,
    front: usize,
    back: usize,
    remaining: usize,
}

impl<V> IntoIter<V> {
    pub(crate) fn new(arena: NodeArena<V>) -> Self {
        let front = arena.leftmost();
        let remaining = arena.len();
        Self {
            arena,
            front,
            back: HEADER,
            remaining,
        }
    }
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.front;
        self.front = self.arena.successor(current);
        self.remaining -= 1;
        self.arena.take_value(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for IntoIter<V> {
    fn next_back(&mut self) -> Option<V> {
        if self.remaining == 0 {
            return None;
        }
        self.back = self.arena.predecessor(self.back);
        self.remaining -= 1;
        self.arena.take_value(self.back)
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> FusedIterator for IntoIter<V> {}

#[cfg(test)]
mod tests {
    use super::super::node::Side;
    use super::*;
    use alloc::vec::Vec;

    /// 2 at the root with 1 and 3 below it
    fn small_arena() -> NodeArena<i32> {
        let mut arena = NodeArena::new();
        let root = arena.allocate(2).unwrap();
        let left = arena.allocate(1).unwrap();
        let right = arena.allocate(3).unwrap();
        arena.link_node(HEADER, root, Side::Left);
        arena.link_node(root, left, Side::Left);
        arena.link_node(root, right, Side::Right);
        arena
    }

    #[test]
    fn test_position_end() {
        let arena = small_arena();
        assert!(Position::END.is_end());
        assert!(!arena.position(arena.root()).is_end());
        assert_eq!(Cursor::new(&arena, HEADER).position(), Position::END);
    }

    #[test]
    fn test_cursor_walks_ring() {
        let arena = small_arena();
        let mut cursor = Cursor::new(&arena, arena.leftmost());
        assert_eq!(cursor.get(), Some(&1));
        assert_eq!(cursor.peek_prev(), None);
        assert_eq!(cursor.peek_next(), Some(&2));

        cursor.move_next();
        cursor.move_next();
        assert_eq!(cursor.get(), Some(&3));
        cursor.move_next();
        assert!(cursor.is_end());
        assert_eq!(cursor.get(), None);
        assert_eq!(cursor.position(), Position::END);

        cursor.move_prev();
        assert_eq!(cursor.get(), Some(&3));
        cursor.move_next();
        cursor.move_next();
        assert_eq!(cursor.get(), Some(&1));
    }

    #[test]
    fn test_iter_both_ends() {
        let arena = small_arena();
        let mut iter = Iter::new(&arena, arena.leftmost(), HEADER);
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&3));
        assert_eq!(iter.next_back(), Some(&2));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn test_iter_partial_range() {
        let arena = small_arena();
        let root = arena.root();
        let collected: Vec<_> = Iter::new(&arena, arena.leftmost(), root).collect();
        assert_eq!(collected, vec![&1]);
        let collected: Vec<_> = Iter::new(&arena, root, root).collect();
        assert!(collected.is_empty());
    }

    #[test]
    fn test_iter_from_end_is_empty_both_ways() {
        let arena = small_arena();
        let iter = Iter::new(&arena, HEADER, arena.leftmost());
        assert_eq!(iter.size_hint(), (0, Some(0)));
        assert_eq!(iter.clone().next_back(), None);
        assert_eq!(iter.count(), 0);
    }

    #[test]
    fn test_into_iter_drains_in_order() {
        let arena = small_arena();
        let mut iter = IntoIter::new(arena);
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next_back(), Some(3));
        assert_eq!(iter.next(), Some(1));
        assert_eq!(iter.next(), Some(2));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }
}
