use std::sync::Arc;

use crate::arena::Arena;
use crate::bitmap::Bitmap;
use crate::builder::{ContextColumnBuilder, OptionalContextColumnBuilder};
use crate::column::ContextColumn;
use crate::concat::{concat, concat_validities};
use crate::signature::{dense_ordinals, SigColumn};
use crate::take::{optional_take, optional_take_validity, take, take_validity};
use crate::value::{Path, Value};

/// Column of paths.
///
/// Absent rows store an empty path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathColumn {
    paths: Vec<Path>,
    validity: Option<Bitmap>,
}

impl PathColumn {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn column_info(&self) -> String {
        let prefix = if self.is_optional() { "Optional" } else { "" };
        format!("{prefix}PathColumn[{}]", self.len())
    }

    pub fn get_path(&self, idx: usize) -> &Path {
        &self.paths[idx]
    }

    pub fn has_value(&self, idx: usize) -> bool {
        match &self.validity {
            Some(validity) => validity.value(idx),
            None => {
                assert!(idx < self.len(), "path index out of bounds");
                true
            }
        }
    }

    pub fn is_optional(&self) -> bool {
        self.validity.is_some()
    }

    pub fn shuffle(&self, offsets: &[usize]) -> PathColumn {
        PathColumn {
            paths: take(&self.paths, offsets),
            validity: take_validity(self.validity.as_ref(), offsets),
        }
    }

    pub fn optional_shuffle(&self, offsets: &[usize]) -> PathColumn {
        PathColumn {
            paths: optional_take(&self.paths, offsets, &Path::default()),
            validity: Some(optional_take_validity(self.validity.as_ref(), offsets)),
        }
    }

    pub fn union_col(&self, other: &PathColumn) -> PathColumn {
        let validity = concat_validities([
            (self.len(), self.validity.as_ref()),
            (other.len(), other.validity.as_ref()),
        ]);
        PathColumn {
            paths: concat(&self.paths, &other.paths),
            validity,
        }
    }

    /// Paths are equal when they visit the same vertices in the same order.
    pub fn generate_signature(&self) -> SigColumn<'_> {
        let keys = (0..self.len()).map(|idx| {
            if self.has_value(idx) {
                Some(self.paths[idx].vertices())
            } else {
                None
            }
        });
        SigColumn::Computed(dense_ordinals(keys))
    }
}

#[derive(Debug, Default)]
pub struct PathColumnBuilder {
    paths: Vec<Path>,
    validity: Option<Bitmap>,
}

impl PathColumnBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn optional() -> Self {
        PathColumnBuilder {
            paths: Vec::new(),
            validity: Some(Bitmap::default()),
        }
    }

    pub fn push_back_path(&mut self, path: Path) {
        self.paths.push(path);
        if let Some(validity) = &mut self.validity {
            validity.push(true);
        }
    }
}

impl ContextColumnBuilder for PathColumnBuilder {
    fn reserve(&mut self, additional: usize) {
        self.paths.reserve(additional);
    }

    fn push_back_elem(&mut self, val: &Value) {
        match val.try_as_path() {
            Some(path) => self.push_back_path(path.clone()),
            None => panic!("path column builder received {:?}", val.elem_type()),
        }
    }

    fn finish(self, _arena: Option<Arc<Arena>>) -> ContextColumn {
        ContextColumn::Path(PathColumn {
            paths: self.paths,
            validity: self.validity,
        })
    }
}

impl OptionalContextColumnBuilder for PathColumnBuilder {
    fn push_back_null(&mut self) {
        let Some(validity) = self.validity.as_mut() else {
            panic!("push_back_null on non-optional builder");
        };
        validity.push(false);
        self.paths.push(Path::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::NONE_OFFSET;
    use crate::value::VertexRecord;

    fn path(vids: &[u32]) -> Path {
        Path::new(
            vids.iter()
                .map(|vid| VertexRecord::new(0, *vid))
                .collect::<Vec<_>>(),
        )
    }

    fn build(paths: &[Path]) -> PathColumn {
        let mut builder = PathColumnBuilder::new();
        for p in paths {
            builder.push_back_path(p.clone());
        }
        match builder.finish(None) {
            ContextColumn::Path(c) => c,
            other => panic!("unexpected column: {other:?}"),
        }
    }

    #[test]
    fn signature_by_vertex_sequence() {
        let col = build(&[path(&[1, 2]), path(&[2, 1]), path(&[1, 2]), path(&[1])]);
        let sig = col.generate_signature();
        assert_eq!(vec![0, 1, 0, 2], sig.iter().collect::<Vec<_>>());
    }

    #[test]
    fn absent_rows_differ_from_empty_path() {
        let col = build(&[path(&[])]).optional_shuffle(&[0, NONE_OFFSET]);
        assert!(col.has_value(0));
        assert!(!col.has_value(1));

        let sig = col.generate_signature();
        assert_ne!(sig.get_sig(0), sig.get_sig(1));
    }

    #[test]
    fn identity_shuffle() {
        let col = build(&[path(&[1, 2]), path(&[]), path(&[3])]);
        assert_eq!(col, col.shuffle(&[0, 1, 2]));

        let opt = col.optional_shuffle(&[NONE_OFFSET, 2]);
        assert_eq!(opt, opt.shuffle(&[0, 1]));
    }

    #[test]
    fn shuffle_keeps_validity() {
        let col = build(&[path(&[1]), path(&[2])]).optional_shuffle(&[1, NONE_OFFSET]);
        let out = col.shuffle(&[1, 0, 0]);
        assert_eq!(
            vec![false, true, true],
            (0..3).map(|idx| out.has_value(idx)).collect::<Vec<_>>()
        );
        assert_eq!(&path(&[2]), out.get_path(1));
    }
}
