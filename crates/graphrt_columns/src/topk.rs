use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::arena::ArenaStr;
use crate::value::{Date, Day};

/// Total ordering used for bounded ordering.
pub(crate) trait SortKey {
    fn cmp_key(&self, other: &Self) -> Ordering;
}

macro_rules! impl_sort_key_ord {
    ($typ:ty) => {
        impl SortKey for $typ {
            fn cmp_key(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }
        }
    };
}

impl_sort_key_ord!(bool);
impl_sort_key_ord!(i32);
impl_sort_key_ord!(i64);
impl_sort_key_ord!(u64);
impl_sort_key_ord!(Date);
impl_sort_key_ord!(Day);
impl_sort_key_ord!(ArenaStr);

impl SortKey for f64 {
    fn cmp_key(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

/// Heap entry. Ordered by value in the requested direction, then by row.
#[derive(Debug)]
struct TopKEntry<'a, T> {
    value: &'a T,
    idx: usize,
    asc: bool,
}

impl<'a, T: SortKey> Ord for TopKEntry<'a, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        let ord = if self.asc {
            self.value.cmp_key(other.value)
        } else {
            other.value.cmp_key(self.value)
        };
        ord.then(self.idx.cmp(&other.idx))
    }
}

impl<'a, T: SortKey> PartialOrd for TopKEntry<'a, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<'a, T: SortKey> PartialEq for TopKEntry<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<'a, T: SortKey> Eq for TopKEntry<'a, T> {}

/// Indices of the `min(limit, len)` smallest (or largest if `asc` is false)
/// values, in output order. Ties keep the lower row index first.
///
/// Keeps a heap of at most `limit` entries instead of sorting every row.
pub(crate) fn top_k<T: SortKey>(values: &[T], asc: bool, limit: usize) -> Vec<usize> {
    if limit == 0 {
        return Vec::new();
    }

    // Max-heap where the top is the worst row kept so far.
    let mut heap = BinaryHeap::with_capacity(std::cmp::min(limit, values.len()));
    for (idx, value) in values.iter().enumerate() {
        let entry = TopKEntry { value, idx, asc };
        if heap.len() < limit {
            heap.push(entry);
        } else if let Some(mut worst) = heap.peek_mut() {
            if entry < *worst {
                *worst = entry;
            }
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|entry| entry.idx)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asc_ties_by_row() {
        let values = [5, 3, 3, 7, 5];
        assert_eq!(vec![1, 2], top_k(&values, true, 2));
        assert_eq!(vec![1, 2, 0, 4], top_k(&values, true, 4));
    }

    #[test]
    fn desc_ties_by_row() {
        let values = [5, 3, 3, 7, 5];
        assert_eq!(vec![3, 0, 4], top_k(&values, false, 3));
    }

    #[test]
    fn limit_larger_than_input() {
        let values = [2, 1];
        assert_eq!(vec![1, 0], top_k(&values, true, 10));
    }

    #[test]
    fn limit_zero() {
        let values = [2, 1];
        assert!(top_k(&values, true, 0).is_empty());
    }

    #[test]
    fn floats_total_order() {
        let values = [1.5, f64::NAN, -0.0, 0.0, -2.0];
        assert_eq!(vec![4, 2, 3, 0, 1], top_k(&values, true, 5));
    }

    #[test]
    fn strings_bytewise() {
        let values = [
            ArenaStr::from("b"),
            ArenaStr::from("a"),
            ArenaStr::from("c"),
        ];
        assert_eq!(vec![2, 0], top_k(&values, false, 2));
    }
}
