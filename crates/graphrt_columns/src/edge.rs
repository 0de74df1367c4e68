use std::collections::BTreeSet;
use std::sync::Arc;

use crate::arena::Arena;
use crate::bitmap::Bitmap;
use crate::builder::{ContextColumnBuilder, OptionalContextColumnBuilder};
use crate::column::ContextColumn;
use crate::concat::{concat, concat_validities};
use crate::signature::{dense_ordinals, SigColumn};
use crate::take::{optional_take, optional_take_validity, take, take_validity};
use crate::value::{EdgeRecord, Label, LabelTriplet, Value, NONE_VID};

/// Stored for absent rows.
const NONE_EDGE: EdgeRecord = EdgeRecord::new(
    LabelTriplet::new(Label::MAX, Label::MAX, Label::MAX),
    NONE_VID,
    NONE_VID,
);

/// Column of edges.
///
/// An edge is identified by its label triplet and both endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeColumn {
    edges: Vec<EdgeRecord>,
    /// Present only for optional columns.
    validity: Option<Bitmap>,
}

impl EdgeColumn {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn column_info(&self) -> String {
        let prefix = if self.is_optional() { "Optional" } else { "" };
        format!("{prefix}EdgeColumn[{}]", self.len())
    }

    pub fn get_edge(&self, idx: usize) -> EdgeRecord {
        self.edges[idx]
    }

    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    pub fn has_value(&self, idx: usize) -> bool {
        match &self.validity {
            Some(validity) => validity.value(idx),
            None => {
                assert!(idx < self.len(), "edge index out of bounds");
                true
            }
        }
    }

    pub fn is_optional(&self) -> bool {
        self.validity.is_some()
    }

    /// Label triplets of edges present in this column.
    pub fn get_labels_set(&self) -> BTreeSet<LabelTriplet> {
        (0..self.len())
            .filter(|&idx| self.has_value(idx))
            .map(|idx| self.edges[idx].triplet)
            .collect()
    }

    pub fn shuffle(&self, offsets: &[usize]) -> EdgeColumn {
        EdgeColumn {
            edges: take(&self.edges, offsets),
            validity: take_validity(self.validity.as_ref(), offsets),
        }
    }

    pub fn optional_shuffle(&self, offsets: &[usize]) -> EdgeColumn {
        EdgeColumn {
            edges: optional_take(&self.edges, offsets, &NONE_EDGE),
            validity: Some(optional_take_validity(self.validity.as_ref(), offsets)),
        }
    }

    pub fn union_col(&self, other: &EdgeColumn) -> EdgeColumn {
        let validity = concat_validities([
            (self.len(), self.validity.as_ref()),
            (other.len(), other.validity.as_ref()),
        ]);
        EdgeColumn {
            edges: concat(&self.edges, &other.edges),
            validity,
        }
    }

    /// Dense ordinals over the edge identity. Absent rows share one ordinal.
    pub fn generate_signature(&self) -> SigColumn<'_> {
        let keys = (0..self.len()).map(|idx| {
            if self.has_value(idx) {
                Some(&self.edges[idx])
            } else {
                None
            }
        });
        SigColumn::Computed(dense_ordinals(keys))
    }
}

#[derive(Debug, Default)]
pub struct EdgeColumnBuilder {
    edges: Vec<EdgeRecord>,
    validity: Option<Bitmap>,
}

impl EdgeColumnBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn optional() -> Self {
        EdgeColumnBuilder {
            edges: Vec::new(),
            validity: Some(Bitmap::default()),
        }
    }

    pub fn push_back_edge(&mut self, edge: EdgeRecord) {
        self.edges.push(edge);
        if let Some(validity) = &mut self.validity {
            validity.push(true);
        }
    }
}

impl ContextColumnBuilder for EdgeColumnBuilder {
    fn reserve(&mut self, additional: usize) {
        self.edges.reserve(additional);
    }

    fn push_back_elem(&mut self, val: &Value) {
        match val.try_as_edge() {
            Some(edge) => self.push_back_edge(edge),
            None => panic!("edge column builder received {:?}", val.elem_type()),
        }
    }

    fn finish(self, _arena: Option<Arc<Arena>>) -> ContextColumn {
        ContextColumn::Edge(EdgeColumn {
            edges: self.edges,
            validity: self.validity,
        })
    }
}

impl OptionalContextColumnBuilder for EdgeColumnBuilder {
    fn push_back_null(&mut self) {
        let Some(validity) = self.validity.as_mut() else {
            panic!("push_back_null on non-optional builder");
        };
        validity.push(false);
        self.edges.push(NONE_EDGE);
    }
}
