use log::trace;

use super::arena::NodeArena;
use super::node::{Color, NIL, Side};

impl<V> NodeArena<V> {
    /// Restores the colour invariants after `node` was linked in as a leaf.
    pub(crate) fn fix_insertion_violations(&mut self, mut node: usize) {
        self.set_color(node, Color::Red);

        while node != self.root() && self.is_red(self.get_parent(node)) {
            // A red parent is never the root, so the grandparent is a real node.
            let parent = self.get_parent(node);
            let grandparent = self.get_parent(parent);
            let side = if self.is_left_child(parent) {
                Side::Left
            } else {
                Side::Right
            };
            let uncle = self.get_child(grandparent, side.opposite());

            if self.is_red(uncle) {
                trace!("insert fixup: recolor at {grandparent}, red uncle {uncle}");
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            if self.get_child(parent, side.opposite()) == node {
                trace!("insert fixup: inner child {node}, rotate {side:?} at {parent}");
                node = parent;
                self.rotate(node, side);
            }

            let updated_parent = self.get_parent(node);
            let updated_grandparent = self.get_parent(updated_parent);
            trace!("insert fixup: outer child {node}, rotate at {updated_grandparent}");
            self.set_color(updated_parent, Color::Black);
            self.set_color(updated_grandparent, Color::Red);
            self.rotate(updated_grandparent, side.opposite());
            break;
        }

        let root = self.root();
        self.set_color(root, Color::Black);
    }

    /// Unlinks `node` and restores the colour invariants.
    ///
    /// The slot stays allocated; the caller frees it. When `node` has two
    /// children its in-order successor is relinked into its place and takes
    /// over its colour, so the colour that decides whether a fixup is needed
    /// is the successor's original one.
    pub(crate) fn delete_node(&mut self, node: usize) {
        let left = self.get_left(node);
        let right = self.get_right(node);

        let (fixup_node, fixup_parent, removed_color) = if left == NIL || right == NIL {
            let child = if left != NIL { left } else { right };
            let parent = self.get_parent(node);
            self.set_parent(child, parent);
            self.replace_child(parent, node, child);

            if self.leftmost() == node {
                let leftmost = if child == NIL {
                    parent
                } else {
                    self.find_minimum(child)
                };
                self.set_leftmost(leftmost);
            }
            if self.rightmost() == node {
                let rightmost = if child == NIL {
                    parent
                } else {
                    self.find_maximum(child)
                };
                self.set_rightmost(rightmost);
            }

            (child, parent, self.get_color(node))
        } else {
            let successor = self.find_minimum(right);
            let successor_child = self.get_right(successor);

            self.set_parent(left, successor);
            self.set_child(successor, Side::Left, left);

            let fixup_parent = if successor == right {
                successor
            } else {
                let successor_parent = self.get_parent(successor);
                self.set_parent(successor_child, successor_parent);
                self.set_child(successor_parent, Side::Left, successor_child);
                self.set_child(successor, Side::Right, right);
                self.set_parent(right, successor);
                successor_parent
            };

            let parent = self.get_parent(node);
            self.replace_child(parent, node, successor);
            self.set_parent(successor, parent);

            let removed_color = self.get_color(successor);
            let node_color = self.get_color(node);
            self.set_color(successor, node_color);

            (successor_child, fixup_parent, removed_color)
        };

        if removed_color == Color::Black {
            self.fix_deletion_violations(fixup_node, fixup_parent);
        }
    }

    /// Pushes the missing black up from `fixup_node`, which may be `NIL`
    /// and therefore needs its parent passed alongside.
    fn fix_deletion_violations(&mut self, mut fixup_node: usize, mut fixup_parent: usize) {
        while fixup_node != self.root() && self.is_black(fixup_node) {
            let side = if self.get_left(fixup_parent) == fixup_node {
                Side::Left
            } else {
                Side::Right
            };
            let far = side.opposite();
            let mut sibling = self.get_child(fixup_parent, far);

            if self.is_red(sibling) {
                trace!("delete fixup: red sibling {sibling}, rotate {side:?} at {fixup_parent}");
                self.set_color(sibling, Color::Black);
                self.set_color(fixup_parent, Color::Red);
                self.rotate(fixup_parent, side);
                sibling = self.get_child(fixup_parent, far);
            }

            if self.is_black(self.get_child(sibling, side))
                && self.is_black(self.get_child(sibling, far))
            {
                trace!("delete fixup: black nephews, recolor {sibling} and move up");
                self.set_color(sibling, Color::Red);
                fixup_node = fixup_parent;
                fixup_parent = self.get_parent(fixup_parent);
                continue;
            }

            if self.is_black(self.get_child(sibling, far)) {
                trace!("delete fixup: near nephew red, rotate {far:?} at {sibling}");
                let near = self.get_child(sibling, side);
                self.set_color(near, Color::Black);
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, far);
                sibling = self.get_child(fixup_parent, far);
            }

            trace!("delete fixup: far nephew red, rotate {side:?} at {fixup_parent}");
            let parent_color = self.get_color(fixup_parent);
            self.set_color(sibling, parent_color);
            self.set_color(fixup_parent, Color::Black);
            let far_nephew = self.get_child(sibling, far);
            self.set_color(far_nephew, Color::Black);
            self.rotate(fixup_parent, side);
            break;
        }

        self.set_color(fixup_node, Color::Black);
    }
}

#[cfg(test)]
mod tests {
    use super::super::node::HEADER;
    use super::*;
    use alloc::vec::Vec;

    /// Plain BST descent followed by the insertion fixup
    fn insert(arena: &mut NodeArena<i32>, value: i32) -> usize {
        let mut parent = HEADER;
        let mut side = Side::Left;
        let mut current = arena.root();
        while current != NIL {
            parent = current;
            side = if value < *arena.value(current).unwrap() {
                Side::Left
            } else {
                Side::Right
            };
            current = arena.get_child(current, side);
        }
        let idx = arena.allocate(value).unwrap();
        arena.link_node(parent, idx, side);
        arena.fix_insertion_violations(idx);
        idx
    }

    fn find(arena: &NodeArena<i32>, value: i32) -> usize {
        let mut current = arena.root();
        while current != NIL {
            let stored = *arena.value(current).unwrap();
            if value == stored {
                return current;
            }
            current = if value < stored {
                arena.get_left(current)
            } else {
                arena.get_right(current)
            };
        }
        NIL
    }

    fn remove(arena: &mut NodeArena<i32>, value: i32) {
        let idx = find(arena, value);
        assert_ne!(idx, NIL, "{value} missing");
        arena.delete_node(idx);
        arena.deallocate(idx);
    }

    fn values(arena: &NodeArena<i32>) -> Vec<i32> {
        let mut out = Vec::new();
        let mut node = arena.leftmost();
        while node != HEADER {
            out.push(*arena.value(node).unwrap());
            node = arena.successor(node);
        }
        out
    }

    fn assert_valid(arena: &NodeArena<i32>) {
        if let Err(violation) = arena.check_structure() {
            panic!("invariants violated: {violation:?}");
        }
    }

    #[test]
    fn test_single_insert_is_black_root() {
        let mut arena = NodeArena::new();
        let idx = insert(&mut arena, 1);
        assert_eq!(arena.root(), idx);
        assert!(arena.is_black(idx));
        assert_valid(&arena);
    }

    #[test]
    fn test_red_uncle_recolors() {
        let mut arena = NodeArena::new();
        let root = insert(&mut arena, 10);
        let left = insert(&mut arena, 5);
        let right = insert(&mut arena, 15);
        let leaf = insert(&mut arena, 1);

        assert_eq!(arena.root(), root);
        assert!(arena.is_black(left));
        assert!(arena.is_black(right));
        assert!(arena.is_red(leaf));
        assert_valid(&arena);
    }

    #[test]
    fn test_outer_child_single_rotation() {
        let mut arena = NodeArena::new();
        insert(&mut arena, 1);
        let mid = insert(&mut arena, 2);
        insert(&mut arena, 3);

        assert_eq!(arena.root(), mid);
        assert!(arena.is_black(mid));
        assert_valid(&arena);
    }

    #[test]
    fn test_inner_child_double_rotation_both_sides() {
        let mut arena = NodeArena::new();
        insert(&mut arena, 10);
        insert(&mut arena, 5);
        let inner = insert(&mut arena, 7);
        assert_eq!(arena.root(), inner);
        assert_valid(&arena);

        let mut arena = NodeArena::new();
        insert(&mut arena, 10);
        insert(&mut arena, 15);
        let inner = insert(&mut arena, 12);
        assert_eq!(arena.root(), inner);
        assert_valid(&arena);
    }

    #[test]
    fn test_sequential_inserts_stay_balanced() {
        let mut arena = NodeArena::new();
        for i in 0..256 {
            insert(&mut arena, i);
            assert_valid(&arena);
        }
        for i in (1000..1256).rev() {
            insert(&mut arena, i);
            assert_valid(&arena);
        }
        assert_eq!(arena.len(), 512);
    }

    #[test]
    fn test_delete_leaf_and_root() {
        let mut arena = NodeArena::new();
        for v in [5, 2, 8, 1, 3, 7, 9] {
            insert(&mut arena, v);
        }

        remove(&mut arena, 1);
        assert_valid(&arena);
        remove(&mut arena, 5);
        assert_valid(&arena);
        remove(&mut arena, 8);
        assert_valid(&arena);

        assert_eq!(values(&arena), vec![2, 3, 7, 9]);
    }

    #[test]
    fn test_delete_updates_header_caches() {
        let mut arena = NodeArena::new();
        for v in 1..=7 {
            insert(&mut arena, v);
        }

        remove(&mut arena, 1);
        assert_eq!(*arena.value(arena.leftmost()).unwrap(), 2);
        remove(&mut arena, 7);
        assert_eq!(*arena.value(arena.rightmost()).unwrap(), 6);

        for v in 2..=6 {
            remove(&mut arena, v);
            assert_valid(&arena);
        }
        assert_eq!(arena.root(), NIL);
        assert_eq!(arena.leftmost(), HEADER);
        assert_eq!(arena.rightmost(), HEADER);
    }

    #[test]
    fn test_delete_two_children_relinks_successor() {
        let mut arena = NodeArena::new();
        for v in [50, 25, 75, 12, 37, 62, 87, 6, 18, 31, 43] {
            insert(&mut arena, v);
        }
        let successor = find(&arena, 31);

        remove(&mut arena, 25);
        assert_valid(&arena);
        // The successor node itself moved, so its index is unchanged.
        assert_eq!(find(&arena, 31), successor);
        assert_eq!(
            values(&arena),
            vec![6, 12, 18, 31, 37, 43, 50, 62, 75, 87]
        );
    }

    #[test]
    fn test_delete_all_orders() {
        let mut arena = NodeArena::new();
        for i in 0..200 {
            insert(&mut arena, (i * 37) % 200);
        }
        for i in 0..200 {
            remove(&mut arena, (i * 91) % 200);
            assert_valid(&arena);
        }
        assert_eq!(arena.len(), 0);
        assert_eq!(arena.root(), NIL);
    }
}
