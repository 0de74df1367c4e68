/// Validity bits for columns with absent rows.
///
/// Bit `i` of word `i / 64` holds row `i`. Bits past `len` are always zero so
/// that derived equality compares only live rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bitmap {
    len: usize,
    words: Vec<u64>,
}

const WORD_BITS: usize = u64::BITS as usize;

impl Bitmap {
    pub fn with_capacity(cap: usize) -> Self {
        Bitmap {
            len: 0,
            words: Vec::with_capacity(cap.div_ceil(WORD_BITS)),
        }
    }

    /// Create a bitmap with `len` rows, all set.
    pub fn new_with_all_true(len: usize) -> Self {
        let mut words = vec![u64::MAX; len.div_ceil(WORD_BITS)];
        let rem = len % WORD_BITS;
        if rem != 0 {
            if let Some(last) = words.last_mut() {
                *last = (1 << rem) - 1;
            }
        }
        Bitmap { len, words }
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Panics if `idx` is out of bounds.
    #[inline]
    pub fn value(&self, idx: usize) -> bool {
        assert!(
            idx < self.len,
            "bitmap index {idx} out of bounds for length {}",
            self.len
        );
        self.words[idx / WORD_BITS] & (1 << (idx % WORD_BITS)) != 0
    }

    pub fn set(&mut self, idx: usize, val: bool) {
        assert!(
            idx < self.len,
            "bitmap index {idx} out of bounds for length {}",
            self.len
        );
        let mask = 1 << (idx % WORD_BITS);
        if val {
            self.words[idx / WORD_BITS] |= mask;
        } else {
            self.words[idx / WORD_BITS] &= !mask;
        }
    }

    pub fn push(&mut self, val: bool) {
        if self.len % WORD_BITS == 0 {
            self.words.push(0);
        }
        self.len += 1;
        self.set(self.len - 1, val);
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = bool> + '_ {
        (0..self.len).map(|idx| self.value(idx))
    }
}

impl FromIterator<bool> for Bitmap {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        let mut bitmap = Bitmap::default();
        bitmap.extend(iter);
        bitmap
    }
}

impl Extend<bool> for Bitmap {
    fn extend<T: IntoIterator<Item = bool>>(&mut self, iter: T) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.words.reserve(lower.div_ceil(WORD_BITS));
        for val in iter {
            self.push(val);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_across_words() {
        let rows: Vec<bool> = (0..130).map(|i| i % 3 != 0).collect();
        let bm: Bitmap = rows.iter().copied().collect();

        assert_eq!(130, bm.len());
        assert_eq!(rows, bm.iter().collect::<Vec<_>>());
        assert_eq!(86, bm.iter().filter(|v| *v).count());
    }

    #[test]
    fn all_true_masks_tail() {
        let bm = Bitmap::new_with_all_true(70);
        assert!(bm.iter().all(|v| v));

        let pushed: Bitmap = std::iter::repeat(true).take(70).collect();
        assert_eq!(pushed, bm);
    }

    #[test]
    fn set_and_clear() {
        let mut bm = Bitmap::new_with_all_true(3);
        bm.set(1, false);
        assert_eq!(vec![true, false, true], bm.iter().collect::<Vec<_>>());
        bm.set(1, true);
        assert_eq!(Bitmap::new_with_all_true(3), bm);
    }

    #[test]
    #[should_panic]
    fn value_out_of_bounds() {
        let bm = Bitmap::new_with_all_true(2);
        bm.value(2);
    }
}
