//! Navigation and rotation over the arena links.
//!
//! Nothing here allocates or touches payloads; only links change.

use log::trace;

use super::arena::NodeArena;
use super::node::{HEADER, NIL, Side};

impl<V> NodeArena<V> {
    /// Follows `left` links from `node` to exhaustion
    pub(crate) fn find_minimum(&self, mut node: usize) -> usize {
        while node != NIL {
            let left = self.node_at(node).left;
            if left == NIL {
                break;
            }
            node = left;
        }
        node
    }

    /// Follows `right` links from `node` to exhaustion
    pub(crate) fn find_maximum(&self, mut node: usize) -> usize {
        while node != NIL {
            let right = self.node_at(node).right;
            if right == NIL {
                break;
            }
            node = right;
        }
        node
    }

    /// Returns `true` if `node` hangs off the left link of its parent.
    ///
    /// The root is never a left child, even when it is also the leftmost
    /// node cached in the header.
    #[inline]
    pub(crate) fn is_left_child(&self, node: usize) -> bool {
        let parent = self.get_parent(node);
        parent != HEADER && parent != NIL && self.node_at(parent).left == node
    }

    /// In-order successor. `HEADER` follows the last node and is followed by
    /// the first one.
    pub(crate) fn successor(&self, node: usize) -> usize {
        self.step(node, Side::Right)
    }

    /// In-order predecessor. `HEADER` precedes the first node, and stepping
    /// back from `HEADER` lands on the last one.
    pub(crate) fn predecessor(&self, node: usize) -> usize {
        self.step(node, Side::Left)
    }

    /// One in-order step towards `side`.
    fn step(&self, mut node: usize, side: Side) -> usize {
        if node == HEADER {
            return match side {
                Side::Right => self.leftmost(),
                Side::Left => self.rightmost(),
            };
        }

        let child = self.get_child(node, side);
        if child != NIL {
            return match side {
                Side::Right => self.find_minimum(child),
                Side::Left => self.find_maximum(child),
            };
        }

        let mut parent = self.get_parent(node);
        while parent != HEADER && self.node_at(parent).child(side) == node {
            node = parent;
            parent = self.get_parent(parent);
        }
        parent
    }

    /// Returns `true` if `a` comes strictly before `b` in order. `HEADER`
    /// counts as the last slot.
    ///
    /// Both paths are lifted to their lowest common ancestor, so this costs
    /// `O(height)` and reads no payloads.
    pub(crate) fn precedes(&self, a: usize, b: usize) -> bool {
        if a == b || a == HEADER {
            return false;
        }
        if b == HEADER {
            return true;
        }

        let (mut a_depth, mut b_depth) = (self.depth(a), self.depth(b));
        let (mut a, mut b) = (a, b);
        // Child of the common ancestor on each side, NIL when that side is the
        // ancestor itself.
        let (mut a_from, mut b_from) = (NIL, NIL);
        while a_depth > b_depth {
            a_from = a;
            a = self.get_parent(a);
            a_depth -= 1;
        }
        while b_depth > a_depth {
            b_from = b;
            b = self.get_parent(b);
            b_depth -= 1;
        }
        while a != b {
            a_from = a;
            a = self.get_parent(a);
            b_from = b;
            b = self.get_parent(b);
        }

        if a_from == NIL {
            self.get_right(a) == b_from
        } else {
            self.get_left(a) == a_from
        }
    }

    /// Number of links between `node` and the root
    fn depth(&self, mut node: usize) -> usize {
        let mut depth = 0;
        while self.get_parent(node) != HEADER {
            node = self.get_parent(node);
            depth += 1;
        }
        depth
    }

    /// Points whichever link of `parent` referred to `old` at `new`.
    ///
    /// When `parent` is the header, `new` becomes the root.
    pub(crate) fn replace_child(&mut self, parent: usize, old: usize, new: usize) {
        if parent == HEADER {
            self.set_root(new);
        } else if self.node_at(parent).left == old {
            self.node_at_mut(parent).left = new;
        } else {
            self.node_at_mut(parent).right = new;
        }
    }

    /// Rotates `x` down towards `side`; its child on the opposite side rises
    /// into its place. `Side::Left` is the classic left rotation.
    pub(crate) fn rotate(&mut self, x: usize, side: Side) {
        if x == NIL {
            return;
        }

        let y = self.get_child(x, side.opposite());
        if y == NIL {
            return;
        }
        trace!("rotate {side:?} at node {x}, pivot {y}");

        let inner = self.get_child(y, side);
        self.set_child(x, side.opposite(), inner);
        self.set_parent(inner, x);

        let x_parent = self.get_parent(x);
        self.set_parent(y, x_parent);
        self.replace_child(x_parent, x, y);

        self.set_child(y, side, x);
        self.set_parent(x, y);
    }

    /// Hangs the detached node `node` off `parent` on `side` and keeps the
    /// header caches current. `parent == HEADER` means the tree was empty.
    pub(crate) fn link_node(&mut self, parent: usize, node: usize, side: Side) {
        self.set_parent(node, parent);
        if parent == HEADER {
            self.set_root(node);
            self.set_leftmost(node);
            self.set_rightmost(node);
            return;
        }

        self.set_child(parent, side, node);
        match side {
            Side::Left if self.leftmost() == parent => self.set_leftmost(node),
            Side::Right if self.rightmost() == parent => self.set_rightmost(node),
            _ => {}
        }
    }
}
