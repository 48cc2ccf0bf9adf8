/// Index standing for an absent child or parent
pub(crate) const NIL: usize = usize::MAX;

/// Index of the header slot
///
/// The header never holds a payload. Its `parent` is the root, its `left` and
/// `right` cache the leftmost and rightmost nodes, and its index doubles as the
/// "one past the end" position.
pub(crate) const HEADER: usize = 0;

/// Red-Black tree node colors used to maintain tree balance properties.
///
/// Red-Black trees maintain balance by ensuring:
/// - Red nodes have black children
/// - All paths from a node to its leaf positions have equal black node counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    /// Red node - must have black children
    Red,
    /// Black node - contributes to black height
    Black,
}

/// Which child link of a node is meant
///
/// Every rebalancing case is written once in terms of a side and its
/// opposite, which keeps the left and right variants exact mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A slot in the node arena.
///
/// Live nodes carry `Some(value)`. The header and recycled slots carry `None`.
#[derive(Debug, Clone)]
pub(crate) struct Node<V> {
    /// The stored element (a key, or a key/mapped pair)
    pub(crate) value: Option<V>,

    /// Index of the parent node (`HEADER` for the root)
    pub(crate) parent: usize,

    /// Index of the left child (`NIL` if none)
    pub(crate) left: usize,

    /// Index of the right child (`NIL` if none)
    pub(crate) right: usize,

    /// Color used for Red-Black tree balancing
    pub(crate) color: Color,

    /// Allocation stamp, unique per allocation within one arena. `0` on the
    /// header.
    pub(crate) stamp: u64,
}

impl<V> Node<V> {
    /// Creates the header of an empty tree
    pub(crate) const fn header() -> Self {
        Self {
            value: None,
            parent: NIL,
            left: HEADER,
            right: HEADER,
            color: Color::Black,
            stamp: 0,
        }
    }

    /// Creates a detached red node holding `value`
    pub(crate) const fn new(value: V) -> Self {
        Self {
            value: Some(value),
            parent: NIL,
            left: NIL,
            right: NIL,
            color: Color::Red,
            stamp: 0,
        }
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> usize {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) const fn set_child(&mut self, side: Side, child: usize) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}
