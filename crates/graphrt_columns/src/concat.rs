use crate::bitmap::Bitmap;

/// Concat two slices, `a` followed by `b`.
pub(crate) fn concat<T: Clone>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}

/// Concat validities for some number of inputs, each given as `(len,
/// validity)`.
///
/// Returns None if every input is all valid.
pub(crate) fn concat_validities<'a>(
    validities: impl IntoIterator<Item = (usize, Option<&'a Bitmap>)>,
) -> Option<Bitmap> {
    let validities: Vec<_> = validities.into_iter().collect();
    if validities.iter().all(|(_, validity)| validity.is_none()) {
        return None;
    }

    let total: usize = validities.iter().map(|(len, _)| *len).sum();
    let mut out = Bitmap::with_capacity(total);
    for (len, validity) in validities {
        match validity {
            Some(validity) => out.extend(validity.iter()),
            None => out.extend(std::iter::repeat(true).take(len)),
        }
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_all_valid() {
        assert_eq!(None, concat_validities([(2, None), (3, None)]));
    }

    #[test]
    fn concat_mixed() {
        let b = Bitmap::from_iter([false, true]);
        let got = concat_validities([(2, None), (2, Some(&b))]).unwrap();
        assert_eq!(
            vec![true, true, false, true],
            got.iter().collect::<Vec<_>>()
        );
    }
}
