use core::fmt;

use super::Position;
use super::arena::NodeArena;
use super::node::{HEADER, NIL};

/// A broken structural property found by [`RbTree::check_invariants`](crate::RbTree::check_invariants)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The header sentinel is not black
    HeaderNotBlack,
    /// The root is red
    RedRoot,
    /// A red node has a red child
    RedChildOfRed {
        /// The red child
        node: Position,
    },
    /// Two subtrees of a node carry different black heights
    BlackHeightMismatch {
        /// The node whose subtrees disagree
        node: Position,
    },
    /// A child does not point back at its parent
    BrokenParentLink {
        /// The child with the wrong back-link
        node: Position,
    },
    /// The header's leftmost cache is not the minimum node
    StaleLeftmost,
    /// The header's rightmost cache is not the maximum node
    StaleRightmost,
    /// The recorded size differs from the number of reachable nodes
    LenMismatch {
        /// Size tracked by the tree
        recorded: usize,
        /// Nodes actually reachable from the root
        reachable: usize,
    },
    /// An in-order neighbour compares less than the node before it
    OutOfOrder {
        /// The first node that sorts before its predecessor
        node: Position,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeaderNotBlack => write!(f, "header sentinel is not black"),
            Self::RedRoot => write!(f, "root is red"),
            Self::RedChildOfRed { node } => write!(f, "red node {node:?} has a red parent"),
            Self::BlackHeightMismatch { node } => {
                write!(f, "subtrees of {node:?} have different black heights")
            }
            Self::BrokenParentLink { node } => write!(f, "{node:?} has a stale parent link"),
            Self::StaleLeftmost => write!(f, "leftmost cache is stale"),
            Self::StaleRightmost => write!(f, "rightmost cache is stale"),
            Self::LenMismatch {
                recorded,
                reachable,
            } => write!(
                f,
                "tree records {recorded} elements but {reachable} are reachable"
            ),
            Self::OutOfOrder { node } => write!(f, "{node:?} sorts before its predecessor"),
        }
    }
}

impl core::error::Error for InvariantViolation {}

impl<V> NodeArena<V> {
    /// Checks colours, links, header caches and size. Returns the black height
    /// of the tree (black nodes on every root-to-leaf path).
    pub(crate) fn check_structure(&self) -> Result<usize, InvariantViolation> {
        if self.is_red(HEADER) {
            return Err(InvariantViolation::HeaderNotBlack);
        }

        let root = self.root();
        if root == NIL {
            if self.leftmost() != HEADER {
                return Err(InvariantViolation::StaleLeftmost);
            }
            if self.rightmost() != HEADER {
                return Err(InvariantViolation::StaleRightmost);
            }
            return self.check_len(0).map(|_| 0);
        }

        if self.get_parent(root) != HEADER {
            return Err(InvariantViolation::BrokenParentLink {
                node: self.position(root),
            });
        }
        if self.is_red(root) {
            return Err(InvariantViolation::RedRoot);
        }

        let mut reachable = 0;
        let black_height = self.verify_black_height(root, &mut reachable)?;

        if self.leftmost() != self.find_minimum(root) {
            return Err(InvariantViolation::StaleLeftmost);
        }
        if self.rightmost() != self.find_maximum(root) {
            return Err(InvariantViolation::StaleRightmost);
        }
        self.check_len(reachable)?;

        Ok(black_height)
    }

    fn check_len(&self, reachable: usize) -> Result<(), InvariantViolation> {
        if reachable == self.len() {
            Ok(())
        } else {
            Err(InvariantViolation::LenMismatch {
                recorded: self.len(),
                reachable,
            })
        }
    }

    fn verify_black_height(
        &self,
        node: usize,
        reachable: &mut usize,
    ) -> Result<usize, InvariantViolation> {
        if node == NIL {
            return Ok(0);
        }
        *reachable += 1;

        let node_ref = self.node_at(node);
        for child in [node_ref.left, node_ref.right] {
            if child == NIL {
                continue;
            }
            if self.get_parent(child) != node {
                return Err(InvariantViolation::BrokenParentLink {
                    node: self.position(child),
                });
            }
            if self.is_red(node) && self.is_red(child) {
                return Err(InvariantViolation::RedChildOfRed {
                    node: self.position(child),
                });
            }
        }

        let left_height = self.verify_black_height(node_ref.left, reachable)?;
        let right_height = self.verify_black_height(node_ref.right, reachable)?;

        if left_height != right_height {
            return Err(InvariantViolation::BlackHeightMismatch {
                node: self.position(node),
            });
        }

        if self.is_black(node) {
            Ok(left_height + 1)
        } else {
            Ok(left_height)
        }
    }

    /// Number of nodes on the longest root-to-leaf path
    pub(crate) fn subtree_height(&self, node: usize) -> usize {
        if node == NIL {
            return 0;
        }
        let node_ref = self.node_at(node);
        1 + self
            .subtree_height(node_ref.left)
            .max(self.subtree_height(node_ref.right))
    }
}

#[cfg(test)]
mod tests {
    use super::super::node::{Color, Side};
    use super::*;
    use alloc::string::ToString;

    fn three_node_arena() -> (NodeArena<u8>, [usize; 3]) {
        let mut arena = NodeArena::new();
        let root = arena.allocate(2).unwrap();
        let left = arena.allocate(1).unwrap();
        let right = arena.allocate(3).unwrap();
        arena.link_node(HEADER, root, Side::Left);
        arena.link_node(root, left, Side::Left);
        arena.link_node(root, right, Side::Right);
        arena.set_color(root, Color::Black);
        (arena, [root, left, right])
    }

    #[test]
    fn test_empty_arena_is_valid() {
        let arena = NodeArena::<u8>::new();
        assert_eq!(arena.check_structure(), Ok(0));
        assert_eq!(arena.subtree_height(arena.root()), 0);
    }

    #[test]
    fn test_valid_tree_black_height() {
        let (arena, _) = three_node_arena();
        assert_eq!(arena.check_structure(), Ok(1));
        assert_eq!(arena.subtree_height(arena.root()), 2);
    }

    #[test]
    fn test_detects_red_root() {
        let (mut arena, [root, ..]) = three_node_arena();
        arena.set_color(root, Color::Red);
        assert_eq!(arena.check_structure(), Err(InvariantViolation::RedRoot));
    }

    #[test]
    fn test_detects_red_child_of_red() {
        let (mut arena, [_, left, _]) = three_node_arena();
        let grandchild = arena.allocate(0).unwrap();
        arena.link_node(left, grandchild, Side::Left);
        assert_eq!(
            arena.check_structure(),
            Err(InvariantViolation::RedChildOfRed {
                node: arena.position(grandchild)
            })
        );
    }

    #[test]
    fn test_detects_black_height_mismatch() {
        let (mut arena, [root, left, _]) = three_node_arena();
        arena.set_color(left, Color::Black);
        assert_eq!(
            arena.check_structure(),
            Err(InvariantViolation::BlackHeightMismatch {
                node: arena.position(root)
            })
        );
    }

    #[test]
    fn test_detects_broken_parent_link() {
        let (mut arena, [_, left, right]) = three_node_arena();
        arena.set_parent(right, left);
        assert_eq!(
            arena.check_structure(),
            Err(InvariantViolation::BrokenParentLink {
                node: arena.position(right)
            })
        );
    }

    #[test]
    fn test_detects_stale_caches_and_len() {
        let (mut arena, [root, ..]) = three_node_arena();
        arena.set_leftmost(root);
        assert_eq!(
            arena.check_structure(),
            Err(InvariantViolation::StaleLeftmost)
        );

        let (mut arena, _) = three_node_arena();
        arena.set_rightmost(HEADER);
        assert_eq!(
            arena.check_structure(),
            Err(InvariantViolation::StaleRightmost)
        );

        let (mut arena, _) = three_node_arena();
        arena.allocate(9).unwrap();
        assert_eq!(
            arena.check_structure(),
            Err(InvariantViolation::LenMismatch {
                recorded: 4,
                reachable: 3
            })
        );
    }

    #[test]
    fn test_display() {
        let err = InvariantViolation::LenMismatch {
            recorded: 2,
            reachable: 1,
        };
        assert_eq!(
            err.to_string(),
            "tree records 2 elements but 1 are reachable"
        );
    }
}
