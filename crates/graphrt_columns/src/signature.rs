//! Per-row equality surrogates.
//!
//! A signature is a 64-bit value such that two rows have equal signatures if
//! and only if their values are equal. Every encoding here is exact: either a
//! lossless reinterpretation of the stored value, or a dense ordinal assigned
//! in order of first appearance. Lossy hashes must never be used, grouping
//! and dedup trust a signature match without comparing values.
use std::hash::Hash;

use ahash::RandomState;
use hashbrown::HashMap;

use crate::value::{Date, Day, Label, VertexId, VertexRecord};

/// Hash state used for signature dictionaries and group tables.
pub const SIGNATURE_RANDOM_STATE: RandomState = RandomState::with_seeds(0, 0, 0, 0);

/// Exact 64-bit encoding of a fixed-width value.
pub trait Signature {
    fn signature(&self) -> u64;
}

impl Signature for bool {
    fn signature(&self) -> u64 {
        *self as u64
    }
}

impl Signature for i32 {
    fn signature(&self) -> u64 {
        *self as u32 as u64
    }
}

impl Signature for i64 {
    fn signature(&self) -> u64 {
        *self as u64
    }
}

impl Signature for u64 {
    fn signature(&self) -> u64 {
        *self
    }
}

/// Bit pattern, so NaNs with the same payload share a signature and `0.0`
/// differs from `-0.0`.
impl Signature for f64 {
    fn signature(&self) -> u64 {
        self.to_bits()
    }
}

impl Signature for Date {
    fn signature(&self) -> u64 {
        self.millis as u64
    }
}

impl Signature for Day {
    fn signature(&self) -> u64 {
        self.to_u32() as u64
    }
}

impl Signature for VertexRecord {
    fn signature(&self) -> u64 {
        vertex_signature(self.label, self.vid)
    }
}

/// Label in the high 32 bits, vertex id in the low 32 bits.
#[inline]
pub const fn vertex_signature(label: Label, vid: VertexId) -> u64 {
    ((label as u64) << 32) | (vid as u64)
}

/// Assign each key a dense ordinal in order of first appearance.
///
/// Repeated keys reuse the ordinal assigned on their first occurrence.
pub fn dense_ordinals<K: Hash + Eq>(keys: impl IntoIterator<Item = K>) -> Vec<u64> {
    let keys = keys.into_iter();
    let (lower, _) = keys.size_hint();

    let mut table: HashMap<K, u64, RandomState> =
        HashMap::with_capacity_and_hasher(lower, SIGNATURE_RANDOM_STATE);
    let mut ordinals = Vec::with_capacity(lower);

    for key in keys {
        let next = table.len() as u64;
        let ordinal = *table.entry(key).or_insert(next);
        ordinals.push(ordinal);
    }

    ordinals
}

/// Signature accessor for a column.
///
/// Borrows the column it was generated from, so it can't outlive the column's
/// data.
#[derive(Debug, Clone, PartialEq)]
pub enum SigColumn<'a> {
    Bool(&'a [bool]),
    Int32(&'a [i32]),
    Int64(&'a [i64]),
    UInt64(&'a [u64]),
    Float64(&'a [f64]),
    Date(&'a [Date]),
    Day(&'a [Day]),
    /// Vertices sharing a single label.
    SingleLabelVertex {
        label: Label,
        vids: &'a [VertexId],
    },
    Vertex(&'a [VertexRecord]),
    /// Signatures computed when the accessor was created.
    ///
    /// Used for dictionary encoded types (strings, edges, paths, lists) and
    /// for representations without a contiguous value slice.
    Computed(Vec<u64>),
}

impl<'a> SigColumn<'a> {
    #[inline]
    pub fn get_sig(&self, idx: usize) -> u64 {
        match self {
            Self::Bool(v) => v[idx].signature(),
            Self::Int32(v) => v[idx].signature(),
            Self::Int64(v) => v[idx].signature(),
            Self::UInt64(v) => v[idx].signature(),
            Self::Float64(v) => v[idx].signature(),
            Self::Date(v) => v[idx].signature(),
            Self::Day(v) => v[idx].signature(),
            Self::SingleLabelVertex { label, vids } => vertex_signature(*label, vids[idx]),
            Self::Vertex(v) => v[idx].signature(),
            Self::Computed(v) => v[idx],
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::UInt64(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Date(v) => v.len(),
            Self::Day(v) => v.len(),
            Self::SingleLabelVertex { vids, .. } => vids.len(),
            Self::Vertex(v) => v.len(),
            Self::Computed(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.len()).map(|idx| self.get_sig(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_first_appearance() {
        let got = dense_ordinals(["a", "b", "a", "c", "b"]);
        assert_eq!(vec![0, 1, 0, 2, 1], got);
    }

    #[test]
    fn vertex_signature_packs_label_high() {
        assert_eq!((3u64 << 32) | 7, vertex_signature(3, 7));
        assert_ne!(vertex_signature(1, 0), vertex_signature(0, 1));
    }

    #[test]
    fn negative_ints_distinct() {
        assert_ne!((-1i32).signature(), 1i32.signature());
        assert_eq!(u32::MAX as u64, (-1i32).signature());
    }

    #[test]
    fn computed_accessor() {
        let sig = SigColumn::Computed(vec![4, 5]);
        assert_eq!(2, sig.len());
        assert_eq!(vec![4, 5], sig.iter().collect::<Vec<_>>());
    }
}
