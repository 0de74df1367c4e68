use ahash::RandomState;
use hashbrown::{HashMap, HashSet};

use crate::signature::{SigColumn, SIGNATURE_RANDOM_STATE};

/// Offsets of the first occurrence of each distinct signature, in order of
/// first appearance.
pub(crate) fn dedup_offsets(sig: &SigColumn<'_>) -> Vec<usize> {
    let mut seen: HashSet<u64, RandomState> =
        HashSet::with_capacity_and_hasher(sig.len(), SIGNATURE_RANDOM_STATE);

    (0..sig.len())
        .filter(|&idx| seen.insert(sig.get_sig(idx)))
        .collect()
}

/// Partition all rows into groups of equal signature.
///
/// Returns the first row of each group alongside every row in that group.
/// Groups are in order of first appearance, rows within a group ascending.
pub(crate) fn group_offsets(sig: &SigColumn<'_>) -> (Vec<usize>, Vec<Vec<usize>>) {
    let mut table: HashMap<u64, usize, RandomState> =
        HashMap::with_hasher(SIGNATURE_RANDOM_STATE);
    let mut firsts = Vec::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for idx in 0..sig.len() {
        let next = groups.len();
        let group = *table.entry(sig.get_sig(idx)).or_insert(next);
        if group == next {
            firsts.push(idx);
            groups.push(Vec::new());
        }
        groups[group].push(idx);
    }

    (firsts, groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_simple() {
        let sig = SigColumn::Computed(vec![5, 3, 3, 7, 5]);
        assert_eq!(vec![0, 1, 3], dedup_offsets(&sig));
    }

    #[test]
    fn group_simple() {
        let sig = SigColumn::Computed(vec![5, 3, 3, 7, 5]);
        let (firsts, groups) = group_offsets(&sig);
        assert_eq!(vec![0, 1, 3], firsts);
        assert_eq!(vec![vec![0, 4], vec![1, 2], vec![3]], groups);
    }

    #[test]
    fn group_empty() {
        let sig = SigColumn::Computed(Vec::new());
        let (firsts, groups) = group_offsets(&sig);
        assert!(firsts.is_empty());
        assert!(groups.is_empty());
    }
}
