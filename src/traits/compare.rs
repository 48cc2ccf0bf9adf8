use num_traits::float::FloatCore;
use ordered_float::OrderedFloat;

/// Strict weak order over keys
///
/// The tree only ever asks "is `lhs` ordered before `rhs`"; equality is derived
/// as "neither is less than the other", so a comparator never needs a separate
/// equality test.
///
/// Any `Fn(&K, &K) -> bool` closure is a comparator.
///
/// # Examples
///
/// ```
/// use ordtree::{Compare, Greater, Less};
///
/// assert!(Less.less(&1, &2));
/// assert!(Greater.less(&2, &1));
/// assert!(Less.equivalent(&5, &5));
///
/// let by_abs = |a: &i32, b: &i32| a.abs() < b.abs();
/// assert!(by_abs.equivalent(&-3, &3));
/// ```
pub trait Compare<K: ?Sized> {
    /// Returns `true` if `lhs` is strictly ordered before `rhs`
    fn less(&self, lhs: &K, rhs: &K) -> bool;

    /// Returns `true` if neither key is ordered before the other
    #[inline]
    fn equivalent(&self, lhs: &K, rhs: &K) -> bool {
        !self.less(lhs, rhs) && !self.less(rhs, lhs)
    }
}

/// Ascending order by [`Ord`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Less;

/// Descending order by [`Ord`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Greater;

/// Ascending total order over floating point keys
///
/// Uses [`OrderedFloat`] semantics: `-0.0 == 0.0` and NaN sorts after every
/// other value, so NaN keys can be stored and found like any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FloatOrder;

impl<K: Ord + ?Sized> Compare<K> for Less {
    #[inline]
    fn less(&self, lhs: &K, rhs: &K) -> bool {
        lhs < rhs
    }
}

impl<K: Ord + ?Sized> Compare<K> for Greater {
    #[inline]
    fn less(&self, lhs: &K, rhs: &K) -> bool {
        lhs > rhs
    }
}

impl<T: FloatCore> Compare<T> for FloatOrder {
    #[inline]
    fn less(&self, lhs: &T, rhs: &T) -> bool {
        OrderedFloat(*lhs) < OrderedFloat(*rhs)
    }
}

impl<K: ?Sized, F> Compare<K> for F
where
    F: Fn(&K, &K) -> bool,
{
    #[inline]
    fn less(&self, lhs: &K, rhs: &K) -> bool {
        self(lhs, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_and_reverse_order() {
        assert!(Less.less(&1, &2));
        assert!(!Less.less(&2, &2));
        assert!(Greater.less(&3, &2));
        assert!(!Greater.less(&2, &3));
        assert!(Greater.equivalent(&4, &4));
    }

    #[test]
    fn test_unsized_keys() {
        assert!(Less.less("apple", "banana"));
        assert!(Greater.less("banana", "apple"));
    }

    #[test]
    fn test_float_order_is_total() {
        assert!(FloatOrder.less(&f64::NEG_INFINITY, &f64::MIN));
        assert!(FloatOrder.less(&f64::INFINITY, &f64::NAN));
        assert!(FloatOrder.equivalent(&f64::NAN, &f64::NAN));
        assert!(FloatOrder.equivalent(&0.0_f64, &-0.0_f64));
        assert!(!FloatOrder.less(&f32::NAN, &1.0_f32));
    }

    #[test]
    fn test_closure_comparator() {
        let by_abs = |a: &i32, b: &i32| a.abs() < b.abs();
        assert!(by_abs.less(&1, &-2));
        assert!(by_abs.equivalent(&-3, &3));
    }
}
