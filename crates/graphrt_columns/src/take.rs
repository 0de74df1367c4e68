use crate::bitmap::Bitmap;
use crate::column::NONE_OFFSET;

/// Take values at the provided offsets. An offset may appear multiple times.
///
/// Panics if any offset is out of bounds.
pub(crate) fn take<T: Clone>(values: &[T], offsets: &[usize]) -> Vec<T> {
    offsets.iter().map(|&idx| values[idx].clone()).collect()
}

/// Like `take`, but `NONE_OFFSET` produces `placeholder`.
pub(crate) fn optional_take<T: Clone>(values: &[T], offsets: &[usize], placeholder: &T) -> Vec<T> {
    offsets
        .iter()
        .map(|&idx| {
            if idx == NONE_OFFSET {
                placeholder.clone()
            } else {
                values[idx].clone()
            }
        })
        .collect()
}

pub(crate) fn take_validity(validity: Option<&Bitmap>, offsets: &[usize]) -> Option<Bitmap> {
    validity.map(|validity| offsets.iter().map(|&idx| validity.value(idx)).collect())
}

/// Validity for an optional take. Rows at `NONE_OFFSET` are always invalid.
pub(crate) fn optional_take_validity(validity: Option<&Bitmap>, offsets: &[usize]) -> Bitmap {
    let mut out = Bitmap::new_with_all_true(offsets.len());
    for (row, &idx) in offsets.iter().enumerate() {
        let valid = match (idx, validity) {
            (NONE_OFFSET, _) => false,
            (idx, Some(validity)) => validity.value(idx),
            (_, None) => true,
        };
        if !valid {
            out.set(row, false);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_take() {
        let values = [6, 7, 8, 9];
        let out = take(&values, &[1, 1, 3, 0]);
        assert_eq!(vec![7, 7, 9, 6], out);
    }

    #[test]
    #[should_panic]
    fn take_out_of_bounds() {
        let values = [6, 7, 8, 9];
        let _ = take(&values, &[1, 4]);
    }

    #[test]
    fn optional_take_placeholder() {
        let values = [6, 7, 8];
        let out = optional_take(&values, &[2, NONE_OFFSET, 0], &0);
        assert_eq!(vec![8, 0, 6], out);

        let validity = optional_take_validity(None, &[2, NONE_OFFSET, 0]);
        assert_eq!(vec![true, false, true], validity.iter().collect::<Vec<_>>());
    }

    #[test]
    fn optional_take_respects_source_validity() {
        let source = Bitmap::from_iter([true, false]);
        let validity = optional_take_validity(Some(&source), &[1, 0, NONE_OFFSET]);
        assert_eq!(vec![false, true, false], validity.iter().collect::<Vec<_>>());
    }

    #[test]
    fn optional_take_validity_across_words() {
        let offsets: Vec<usize> = (0..100)
            .map(|row| if row % 10 == 0 { NONE_OFFSET } else { row % 3 })
            .collect();
        let validity = optional_take_validity(None, &offsets);

        assert_eq!(100, validity.len());
        assert_eq!(90, validity.iter().filter(|v| *v).count());
        assert!(!validity.value(90));
        assert!(validity.value(99));
    }
}
