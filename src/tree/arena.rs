use alloc::vec::Vec;

use super::Position;
use super::node::{Color, HEADER, NIL, Node, Side};
use crate::TreeError;

/// Node storage for one tree.
///
/// Nodes are addressed by stable indices into `nodes`. Slot `HEADER` is the
/// sentinel; every other slot is either a live node or sits on the free list
/// waiting to be recycled. Indices of live nodes never change while they are
/// in the tree, which is what keeps positions to untouched nodes valid across
/// inserts and erases. Each allocation also draws a fresh stamp, so a
/// position into a recycled slot no longer matches the node living there.
#[derive(Debug)]
pub(crate) struct NodeArena<V> {
    /// Header followed by live and recycled slots
    nodes: Vec<Node<V>>,

    /// Stack of recycled slot indices, most recently freed on top
    free_list: Vec<usize>,

    /// Number of live nodes
    len: usize,

    /// Stamp handed to the next allocated node. Never reset.
    next_stamp: u64,
}

impl<V> NodeArena<V> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node::header()],
            free_list: Vec::new(),
            len: 0,
            next_stamp: 1,
        }
    }

    /// Creates an empty arena on top of a pre-reserved slot vector.
    ///
    /// Used by structural copies, which fill the slots front to back without
    /// ever touching the free list.
    pub(crate) fn with_slots(mut nodes: Vec<Node<V>>) -> Self {
        nodes.clear();
        nodes.push(Node::header());
        Self {
            nodes,
            free_list: Vec::new(),
            len: 0,
            next_stamp: 1,
        }
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Makes sure `additional` more nodes can be allocated without failing.
    pub(crate) fn reserve(&mut self, additional: usize) -> Result<(), TreeError> {
        let recycled = self.free_list.len();
        let fresh = additional.saturating_sub(recycled);
        self.nodes.try_reserve(fresh)?;
        // Every non-header slot may end up on the free list at once.
        let slots = self.nodes.len() - 1 + fresh;
        self.free_list.try_reserve(slots - recycled)?;
        Ok(())
    }

    /// Stores `value` in a detached red node and returns its index.
    ///
    /// On failure the arena is unchanged and `value` is dropped.
    pub(crate) fn allocate(&mut self, value: V) -> Result<usize, TreeError> {
        let mut node = Node::new(value);
        let idx = match self.free_list.pop() {
            Some(idx) => {
                node.stamp = self.take_stamp();
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.reserve(1)?;
                node.stamp = self.take_stamp();
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.len += 1;
        Ok(idx)
    }

    fn take_stamp(&mut self) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        stamp
    }

    /// Pushes a node at the end of the slot vector, bypassing the free list.
    ///
    /// Only valid on arenas built with [`NodeArena::with_slots`] that have
    /// never freed a node.
    pub(crate) fn push_copy(&mut self, value: V, color: Color, parent: usize) -> usize {
        debug_assert!(self.free_list.is_empty());
        let mut node = Node::new(value);
        node.color = color;
        node.parent = parent;
        node.stamp = self.take_stamp();
        self.nodes.push(node);
        self.len += 1;
        self.nodes.len() - 1
    }

    /// Returns the slot to the free list and hands back its payload.
    pub(crate) fn deallocate(&mut self, idx: usize) -> Option<V> {
        debug_assert!(idx != HEADER && idx < self.nodes.len());
        let node = &mut self.nodes[idx];
        let value = node.value.take()?;
        node.parent = NIL;
        node.left = NIL;
        node.right = NIL;
        self.free_list.push(idx);
        self.len -= 1;
        Some(value)
    }

    /// Takes the payload out of a slot without touching its links.
    ///
    /// Used while draining the arena in order; the links are still needed to
    /// find the next node.
    #[inline]
    pub(crate) fn take_value(&mut self, idx: usize) -> Option<V> {
        self.nodes.get_mut(idx)?.value.take()
    }

    /// Drops every node and returns to the empty-header state.
    pub(crate) fn reset(&mut self) {
        self.nodes.truncate(1);
        self.nodes[HEADER] = Node::header();
        self.free_list.clear();
        self.len = 0;
    }

    /// Returns `true` if `idx` addresses a node currently in the tree
    #[inline]
    pub(crate) fn is_live(&self, idx: usize) -> bool {
        idx != HEADER
            && self
                .nodes
                .get(idx)
                .is_some_and(|node| node.value.is_some())
    }

    /// Handle to slot `idx` as it is now. `HEADER` maps to [`Position::END`].
    #[inline]
    pub(crate) fn position(&self, idx: usize) -> Position {
        Position {
            index: idx,
            stamp: self.node_at(idx).stamp,
        }
    }

    /// Slot index of the live node `pos` was taken from, or `None` once that
    /// node is gone, even if its slot has been reused since.
    #[inline]
    pub(crate) fn resolve(&self, pos: Position) -> Option<usize> {
        (self.is_live(pos.index) && self.node_at(pos.index).stamp == pos.stamp).then_some(pos.index)
    }

    #[inline]
    pub(crate) fn node_at(&self, idx: usize) -> &Node<V> {
        debug_assert!(idx < self.nodes.len());
        &self.nodes[idx]
    }

    #[inline]
    pub(crate) fn node_at_mut(&mut self, idx: usize) -> &mut Node<V> {
        debug_assert!(idx < self.nodes.len());
        &mut self.nodes[idx]
    }

    #[inline]
    pub(crate) fn value(&self, idx: usize) -> Option<&V> {
        self.nodes.get(idx)?.value.as_ref()
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, idx: usize) -> Option<&mut V> {
        self.nodes.get_mut(idx)?.value.as_mut()
    }

    /// Payload of a node known to be live.
    ///
    /// # Panics
    ///
    /// Panics on the header or a recycled slot.
    #[inline]
    pub(crate) fn payload(&self, idx: usize) -> &V {
        match &self.node_at(idx).value {
            Some(value) => value,
            None => panic!("slot {idx} holds no element"),
        }
    }

    #[inline]
    pub(crate) fn payload_mut(&mut self, idx: usize) -> &mut V {
        match &mut self.node_at_mut(idx).value {
            Some(value) => value,
            None => panic!("slot {idx} holds no element"),
        }
    }

    #[inline]
    pub(crate) fn root(&self) -> usize {
        self.nodes[HEADER].parent
    }

    #[inline]
    pub(crate) fn leftmost(&self) -> usize {
        self.nodes[HEADER].left
    }

    #[inline]
    pub(crate) fn rightmost(&self) -> usize {
        self.nodes[HEADER].right
    }

    #[inline]
    pub(crate) fn set_root(&mut self, idx: usize) {
        self.nodes[HEADER].parent = idx;
    }

    #[inline]
    pub(crate) fn set_leftmost(&mut self, idx: usize) {
        self.nodes[HEADER].left = idx;
    }

    #[inline]
    pub(crate) fn set_rightmost(&mut self, idx: usize) {
        self.nodes[HEADER].right = idx;
    }

    #[inline]
    pub(crate) fn get_color(&self, idx: usize) -> Color {
        if idx == NIL {
            Color::Black
        } else {
            self.node_at(idx).color
        }
    }

    #[inline]
    pub(crate) fn set_color(&mut self, idx: usize, color: Color) {
        if idx != NIL {
            self.node_at_mut(idx).color = color;
        }
    }

    #[inline]
    pub(crate) fn is_red(&self, idx: usize) -> bool {
        self.get_color(idx) == Color::Red
    }

    #[inline]
    pub(crate) fn is_black(&self, idx: usize) -> bool {
        self.get_color(idx) == Color::Black
    }

    #[inline]
    pub(crate) fn get_parent(&self, idx: usize) -> usize {
        if idx == NIL {
            NIL
        } else {
            self.node_at(idx).parent
        }
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, idx: usize, parent: usize) {
        if idx != NIL {
            self.node_at_mut(idx).parent = parent;
        }
    }

    #[inline]
    pub(crate) fn get_left(&self, idx: usize) -> usize {
        self.get_child(idx, Side::Left)
    }

    #[inline]
    pub(crate) fn get_right(&self, idx: usize) -> usize {
        self.get_child(idx, Side::Right)
    }

    #[inline]
    pub(crate) fn get_child(&self, idx: usize, side: Side) -> usize {
        if idx == NIL {
            NIL
        } else {
            self.node_at(idx).child(side)
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, idx: usize, side: Side, child: usize) {
        self.node_at_mut(idx).set_child(side, child);
    }
}
