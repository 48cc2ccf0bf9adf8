/// Policy for extracting the ordering key out of a stored value
///
/// The policy is chosen once per tree type and resolved at compile time, so
/// the same node layout serves both a set of `K` and a map of `K` to `M`.
///
/// # Type Parameters
///
/// * `V` - The type of the payload stored in each node
///
/// # Examples
///
/// ```
/// use ordtree::{First, Identity, KeyOfValue};
///
/// assert_eq!(*Identity::key(&7), 7);
/// assert_eq!(*First::key(&("seven", 7)), "seven");
/// ```
pub trait KeyOfValue<V> {
    /// The type the comparator orders
    type Key;

    /// Returns the key part of `value`
    fn key(value: &V) -> &Self::Key;
}

/// Set shape: the payload is its own key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

/// Map shape: the payload is a `(key, mapped)` pair ordered by its first component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct First;

impl<K> KeyOfValue<K> for Identity {
    type Key = K;

    #[inline]
    fn key(value: &K) -> &K {
        value
    }
}

impl<K, M> KeyOfValue<(K, M)> for First {
    type Key = K;

    #[inline]
    fn key(value: &(K, M)) -> &K {
        &value.0
    }
}
