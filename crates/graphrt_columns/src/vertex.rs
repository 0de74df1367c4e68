use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::trace;

use crate::arena::Arena;
use crate::builder::{ContextColumnBuilder, OptionalContextColumnBuilder};
use crate::column::{unsupported, ContextColumn};
use crate::signature::{vertex_signature, SigColumn};
use crate::take::{optional_take, take};
use crate::value::{Label, Value, VertexId, VertexRecord, NONE_VID};

/// Placeholder for absent rows in multi-label columns.
const NONE_VERTEX: VertexRecord = VertexRecord::none(Label::MAX);

/// Storage representation of a vertex column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexColumnType {
    /// All vertices share one label.
    Single,
    /// Runs of vertices, each run sharing a label.
    MultiSegment,
    /// A full record per row.
    Multiple,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VertexColumn {
    Single(SlVertexColumn),
    MultiSegment(MsVertexColumn),
    Multiple(MlVertexColumn),
}

impl VertexColumn {
    pub fn vertex_column_type(&self) -> VertexColumnType {
        match self {
            Self::Single(_) => VertexColumnType::Single,
            Self::MultiSegment(_) => VertexColumnType::MultiSegment,
            Self::Multiple(_) => VertexColumnType::Multiple,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(c) => c.vids.len(),
            Self::MultiSegment(c) => c.len(),
            Self::Multiple(c) => c.vertices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_info(&self) -> String {
        match self {
            Self::Single(c) => {
                let prefix = if c.optional { "Optional" } else { "" };
                format!("{prefix}SLVertexColumn({})[{}]", c.label, c.vids.len())
            }
            Self::MultiSegment(c) => {
                format!("MSVertexColumn({})[{}]", format_labels(&c.labels), c.len())
            }
            Self::Multiple(c) => {
                let prefix = if c.optional { "Optional" } else { "" };
                format!(
                    "{prefix}MLVertexColumn({})[{}]",
                    format_labels(&c.labels),
                    c.vertices.len()
                )
            }
        }
    }

    pub fn get_vertex(&self, idx: usize) -> VertexRecord {
        match self {
            Self::Single(c) => VertexRecord::new(c.label, c.vids[idx]),
            Self::MultiSegment(c) => c.get_vertex(idx),
            Self::Multiple(c) => c.vertices[idx],
        }
    }

    /// Panics if `idx` is out of bounds.
    pub fn has_value(&self, idx: usize) -> bool {
        match self {
            Self::Single(c) => c.vids[idx] != NONE_VID || !c.optional,
            Self::MultiSegment(c) => {
                assert!(idx < c.len(), "vertex index out of bounds");
                true
            }
            Self::Multiple(c) => !c.vertices[idx].is_none() || !c.optional,
        }
    }

    pub fn is_optional(&self) -> bool {
        match self {
            Self::Single(c) => c.optional,
            Self::MultiSegment(_) => false,
            Self::Multiple(c) => c.optional,
        }
    }

    /// Labels of vertices that may appear in this column.
    pub fn get_labels_set(&self) -> BTreeSet<Label> {
        match self {
            Self::Single(c) => BTreeSet::from([c.label]),
            Self::MultiSegment(c) => c.labels.clone(),
            Self::Multiple(c) => c.labels.clone(),
        }
    }

    /// Call `f(row, label, vid)` for every row.
    pub fn foreach_vertex<F>(&self, mut f: F)
    where
        F: FnMut(usize, Label, VertexId),
    {
        match self {
            Self::Single(c) => {
                for (idx, vid) in c.vids.iter().enumerate() {
                    f(idx, c.label, *vid)
                }
            }
            Self::MultiSegment(c) => {
                let mut idx = 0;
                for (label, vids) in &c.segments {
                    for vid in vids {
                        f(idx, *label, *vid);
                        idx += 1;
                    }
                }
            }
            Self::Multiple(c) => {
                for (idx, v) in c.vertices.iter().enumerate() {
                    f(idx, v.label, v.vid)
                }
            }
        }
    }

    pub fn shuffle(&self, offsets: &[usize]) -> VertexColumn {
        match self {
            Self::Single(c) => Self::Single(SlVertexColumn {
                label: c.label,
                vids: take(&c.vids, offsets),
                optional: c.optional,
            }),
            Self::MultiSegment(c) => Self::Multiple(MlVertexColumn {
                vertices: take(&c.to_records(), offsets),
                labels: c.labels.clone(),
                optional: false,
            }),
            Self::Multiple(c) => Self::Multiple(MlVertexColumn {
                vertices: take(&c.vertices, offsets),
                labels: c.labels.clone(),
                optional: c.optional,
            }),
        }
    }

    pub fn optional_shuffle(&self, offsets: &[usize]) -> VertexColumn {
        match self {
            Self::Single(c) => Self::Single(SlVertexColumn {
                label: c.label,
                vids: optional_take(&c.vids, offsets, &NONE_VID),
                optional: true,
            }),
            Self::MultiSegment(_) => unsupported("optional_shuffle", &self.column_info()),
            Self::Multiple(c) => Self::Multiple(MlVertexColumn {
                vertices: optional_take(&c.vertices, offsets, &NONE_VERTEX),
                labels: c.labels.clone(),
                optional: true,
            }),
        }
    }

    /// Concatenate two vertex columns.
    ///
    /// Two single label columns with the same label stay single label,
    /// anything else produces a multi-label column.
    pub fn union_col(&self, other: &VertexColumn) -> VertexColumn {
        let optional = self.is_optional() || other.is_optional();

        match (self, other) {
            (Self::MultiSegment(_), _) | (_, Self::MultiSegment(_)) => unsupported(
                "union_col",
                &format!("{} and {}", self.column_info(), other.column_info()),
            ),
            (Self::Single(a), Self::Single(b)) if a.label == b.label => {
                Self::Single(SlVertexColumn {
                    label: a.label,
                    vids: crate::concat::concat(&a.vids, &b.vids),
                    optional,
                })
            }
            _ => {
                trace!(
                    left = %self.column_info(),
                    right = %other.column_info(),
                    "union producing multi-label vertex column"
                );
                let mut vertices = Vec::with_capacity(self.len() + other.len());
                vertices.extend(self.records());
                vertices.extend(other.records());

                let mut labels = self.get_labels_set();
                labels.extend(other.get_labels_set());

                Self::Multiple(MlVertexColumn {
                    vertices,
                    labels,
                    optional,
                })
            }
        }
    }

    pub fn generate_signature(&self) -> SigColumn<'_> {
        match self {
            Self::Single(c) => SigColumn::SingleLabelVertex {
                label: c.label,
                vids: &c.vids,
            },
            Self::MultiSegment(c) => SigColumn::Computed(
                c.segments
                    .iter()
                    .flat_map(|(label, vids)| vids.iter().map(|vid| vertex_signature(*label, *vid)))
                    .collect(),
            ),
            Self::Multiple(c) => SigColumn::Vertex(&c.vertices),
        }
    }

    /// Records for every row, with absent rows normalized to the multi-label
    /// placeholder.
    fn records(&self) -> impl Iterator<Item = VertexRecord> + '_ {
        (0..self.len()).map(|idx| {
            if self.has_value(idx) {
                self.get_vertex(idx)
            } else {
                NONE_VERTEX
            }
        })
    }
}

fn format_labels(labels: &BTreeSet<Label>) -> String {
    labels
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Vertices with a single label.
///
/// Absent rows in optional columns hold `NONE_VID`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlVertexColumn {
    label: Label,
    vids: Vec<VertexId>,
    optional: bool,
}

impl SlVertexColumn {
    pub fn label(&self) -> Label {
        self.label
    }

    pub fn vertices(&self) -> &[VertexId] {
        &self.vids
    }
}

/// Vertices stored as runs sharing a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsVertexColumn {
    segments: Vec<(Label, Vec<VertexId>)>,
    labels: BTreeSet<Label>,
}

impl MsVertexColumn {
    pub fn len(&self) -> usize {
        self.segments.iter().map(|(_, vids)| vids.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn seg_num(&self) -> usize {
        self.segments.len()
    }

    pub fn seg_label(&self, seg: usize) -> Label {
        self.segments[seg].0
    }

    pub fn seg_vertices(&self, seg: usize) -> &[VertexId] {
        &self.segments[seg].1
    }

    fn get_vertex(&self, mut idx: usize) -> VertexRecord {
        for (label, vids) in &self.segments {
            if idx < vids.len() {
                return VertexRecord::new(*label, vids[idx]);
            }
            idx -= vids.len();
        }
        panic!(
            "vertex index out of bounds for MSVertexColumn[{}]",
            self.len()
        )
    }

    fn to_records(&self) -> Vec<VertexRecord> {
        self.segments
            .iter()
            .flat_map(|(label, vids)| vids.iter().map(|vid| VertexRecord::new(*label, *vid)))
            .collect()
    }
}

/// Vertices with arbitrary labels, one record per row.
///
/// Absent rows in optional columns hold a record with `NONE_VID`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MlVertexColumn {
    vertices: Vec<VertexRecord>,
    labels: BTreeSet<Label>,
    optional: bool,
}

impl MlVertexColumn {
    pub fn vertices(&self) -> &[VertexRecord] {
        &self.vertices
    }
}

#[derive(Debug)]
pub struct SlVertexColumnBuilder {
    label: Label,
    vids: Vec<VertexId>,
    optional: bool,
}

impl SlVertexColumnBuilder {
    pub fn new(label: Label) -> Self {
        SlVertexColumnBuilder {
            label,
            vids: Vec::new(),
            optional: false,
        }
    }

    pub fn optional(label: Label) -> Self {
        SlVertexColumnBuilder {
            label,
            vids: Vec::new(),
            optional: true,
        }
    }

    pub fn push_back_vertex(&mut self, v: VertexRecord) {
        assert_eq!(
            self.label, v.label,
            "single label vertex builder received a different label"
        );
        self.vids.push(v.vid);
    }

    /// Push a vertex id with this builder's label.
    pub fn push_back_opt(&mut self, vid: VertexId) {
        self.vids.push(vid);
    }
}

impl ContextColumnBuilder for SlVertexColumnBuilder {
    fn reserve(&mut self, additional: usize) {
        self.vids.reserve(additional);
    }

    fn push_back_elem(&mut self, val: &Value) {
        match val.try_as_vertex() {
            Some(v) => self.push_back_vertex(v),
            None => panic!("vertex column builder received {:?}", val.elem_type()),
        }
    }

    fn finish(self, _arena: Option<Arc<Arena>>) -> ContextColumn {
        ContextColumn::Vertex(VertexColumn::Single(SlVertexColumn {
            label: self.label,
            vids: self.vids,
            optional: self.optional,
        }))
    }
}

impl OptionalContextColumnBuilder for SlVertexColumnBuilder {
    fn push_back_null(&mut self) {
        assert!(self.optional, "push_back_null on non-optional builder");
        self.vids.push(NONE_VID);
    }
}

#[derive(Debug)]
pub struct MlVertexColumnBuilder {
    vertices: Vec<VertexRecord>,
    labels: BTreeSet<Label>,
    optional: bool,
}

impl MlVertexColumnBuilder {
    pub fn new() -> Self {
        MlVertexColumnBuilder {
            vertices: Vec::new(),
            labels: BTreeSet::new(),
            optional: false,
        }
    }

    pub fn optional() -> Self {
        MlVertexColumnBuilder {
            vertices: Vec::new(),
            labels: BTreeSet::new(),
            optional: true,
        }
    }

    pub fn push_back_vertex(&mut self, v: VertexRecord) {
        self.labels.insert(v.label);
        self.vertices.push(v);
    }
}

impl Default for MlVertexColumnBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextColumnBuilder for MlVertexColumnBuilder {
    fn reserve(&mut self, additional: usize) {
        self.vertices.reserve(additional);
    }

    fn push_back_elem(&mut self, val: &Value) {
        match val.try_as_vertex() {
            Some(v) => self.push_back_vertex(v),
            None => panic!("vertex column builder received {:?}", val.elem_type()),
        }
    }

    fn finish(self, _arena: Option<Arc<Arena>>) -> ContextColumn {
        ContextColumn::Vertex(VertexColumn::Multiple(MlVertexColumn {
            vertices: self.vertices,
            labels: self.labels,
            optional: self.optional,
        }))
    }
}

impl OptionalContextColumnBuilder for MlVertexColumnBuilder {
    fn push_back_null(&mut self) {
        assert!(self.optional, "push_back_null on non-optional builder");
        self.vertices.push(NONE_VERTEX);
    }
}

/// Builder for multi-segment columns.
///
/// Consecutive vertices with the same label are stored in one segment.
/// Doesn't support nulls.
#[derive(Debug, Default)]
pub struct MsVertexColumnBuilder {
    cur_label: Option<Label>,
    cur_list: Vec<VertexId>,
    segments: Vec<(Label, Vec<VertexId>)>,
}

impl MsVertexColumnBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new segment for `label`, closing the current one if it has a
    /// different label.
    pub fn start_label(&mut self, label: Label) {
        if self.cur_label != Some(label) {
            self.flush();
            self.cur_label = Some(label);
        }
    }

    pub fn push_back_vertex(&mut self, v: VertexRecord) {
        self.start_label(v.label);
        self.cur_list.push(v.vid);
    }

    /// Push a vertex id to the current segment.
    ///
    /// Panics if no segment was started.
    pub fn push_back_opt(&mut self, vid: VertexId) {
        assert!(
            self.cur_label.is_some(),
            "push_back_opt called before start_label"
        );
        self.cur_list.push(vid);
    }

    fn flush(&mut self) {
        if let Some(label) = self.cur_label {
            if !self.cur_list.is_empty() {
                self.segments
                    .push((label, std::mem::take(&mut self.cur_list)));
            }
        }
    }
}

impl ContextColumnBuilder for MsVertexColumnBuilder {
    fn reserve(&mut self, additional: usize) {
        self.cur_list.reserve(additional);
    }

    fn push_back_elem(&mut self, val: &Value) {
        match val.try_as_vertex() {
            Some(v) => self.push_back_vertex(v),
            None => panic!("vertex column builder received {:?}", val.elem_type()),
        }
    }

    fn finish(mut self, _arena: Option<Arc<Arena>>) -> ContextColumn {
        self.flush();
        let labels = self.segments.iter().map(|(label, _)| *label).collect();
        ContextColumn::Vertex(VertexColumn::MultiSegment(MsVertexColumn {
            segments: self.segments,
            labels,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::NONE_OFFSET;

    fn sl(label: Label, vids: &[VertexId]) -> VertexColumn {
        let mut builder = SlVertexColumnBuilder::new(label);
        for vid in vids {
            builder.push_back_opt(*vid);
        }
        match builder.finish(None) {
            ContextColumn::Vertex(c) => c,
            other => panic!("unexpected column: {other:?}"),
        }
    }

    fn records(col: &VertexColumn) -> Vec<VertexRecord> {
        (0..col.len()).map(|idx| col.get_vertex(idx)).collect()
    }

    #[test]
    fn single_label_basics() {
        let col = sl(1, &[10, 11, 12]);
        assert_eq!(VertexColumnType::Single, col.vertex_column_type());
        assert_eq!("SLVertexColumn(1)[3]", col.column_info());
        assert_eq!(VertexRecord::new(1, 11), col.get_vertex(1));
        assert!(!col.is_optional());
        assert_eq!(BTreeSet::from([1]), col.get_labels_set());
    }

    #[test]
    fn single_label_optional_shuffle() {
        let col = sl(1, &[10, 11, 12]);
        let out = col.optional_shuffle(&[2, NONE_OFFSET, 0]);

        assert!(out.is_optional());
        assert_eq!(
            vec![true, false, true],
            (0..3).map(|idx| out.has_value(idx)).collect::<Vec<_>>()
        );
        assert_eq!(VertexRecord::new(1, 12), out.get_vertex(0));
        assert_eq!(VertexRecord::new(1, 10), out.get_vertex(2));
    }

    #[test]
    fn union_same_label_stays_single() {
        let out = sl(1, &[1, 2]).union_col(&sl(1, &[3]));
        assert_eq!(VertexColumnType::Single, out.vertex_column_type());
        assert_eq!(
            vec![
                VertexRecord::new(1, 1),
                VertexRecord::new(1, 2),
                VertexRecord::new(1, 3)
            ],
            records(&out)
        );
    }

    #[test]
    fn union_different_labels_multiple() {
        let out = sl(1, &[1, 2]).union_col(&sl(2, &[1]));
        assert_eq!(VertexColumnType::Multiple, out.vertex_column_type());
        assert_eq!(BTreeSet::from([1, 2]), out.get_labels_set());
        assert_eq!(
            vec![
                VertexRecord::new(1, 1),
                VertexRecord::new(1, 2),
                VertexRecord::new(2, 1)
            ],
            records(&out)
        );
    }

    #[test]
    fn union_optional_normalizes_absent_rows() {
        let a = sl(1, &[5]).optional_shuffle(&[NONE_OFFSET, 0]);
        let b = sl(2, &[6]).optional_shuffle(&[0, NONE_OFFSET]);
        let out = a.union_col(&b);

        assert!(out.is_optional());
        assert_eq!(
            vec![false, true, true, false],
            (0..4).map(|idx| out.has_value(idx)).collect::<Vec<_>>()
        );

        // Both absent rows share a signature.
        let sig = out.generate_signature();
        assert_eq!(sig.get_sig(0), sig.get_sig(3));
        assert_ne!(sig.get_sig(0), sig.get_sig(1));
    }

    #[test]
    fn multi_segment_builder() {
        let mut builder = MsVertexColumnBuilder::new();
        builder.push_back_vertex(VertexRecord::new(1, 10));
        builder.push_back_vertex(VertexRecord::new(1, 11));
        builder.start_label(2);
        builder.push_back_opt(20);
        builder.push_back_vertex(VertexRecord::new(1, 12));

        let col = match builder.finish(None) {
            ContextColumn::Vertex(VertexColumn::MultiSegment(c)) => c,
            other => panic!("unexpected column: {other:?}"),
        };

        assert_eq!(3, col.seg_num());
        assert_eq!(1, col.seg_label(0));
        assert_eq!(&[10, 11], col.seg_vertices(0));
        assert_eq!(2, col.seg_label(1));
        assert_eq!(&[12], col.seg_vertices(2));

        let col = VertexColumn::MultiSegment(col);
        assert_eq!(4, col.len());
        assert_eq!(VertexRecord::new(2, 20), col.get_vertex(2));
        assert_eq!(VertexRecord::new(1, 12), col.get_vertex(3));

        let mut visited = Vec::new();
        col.foreach_vertex(|idx, label, vid| visited.push((idx, label, vid)));
        assert_eq!(
            vec![(0, 1, 10), (1, 1, 11), (2, 2, 20), (3, 1, 12)],
            visited
        );
    }

    #[test]
    fn multi_segment_shuffle_is_multiple() {
        let mut builder = MsVertexColumnBuilder::new();
        builder.push_back_vertex(VertexRecord::new(1, 10));
        builder.push_back_vertex(VertexRecord::new(2, 20));
        let col = match builder.finish(None) {
            ContextColumn::Vertex(c) => c,
            other => panic!("unexpected column: {other:?}"),
        };

        let out = col.shuffle(&[1, 1, 0]);
        assert_eq!(VertexColumnType::Multiple, out.vertex_column_type());
        assert_eq!(
            vec![
                VertexRecord::new(2, 20),
                VertexRecord::new(2, 20),
                VertexRecord::new(1, 10)
            ],
            records(&out)
        );
    }

    #[test]
    #[should_panic(expected = "optional_shuffle not implemented for MSVertexColumn")]
    fn multi_segment_optional_shuffle_aborts() {
        let mut builder = MsVertexColumnBuilder::new();
        builder.push_back_vertex(VertexRecord::new(1, 10));
        let col = match builder.finish(None) {
            ContextColumn::Vertex(c) => c,
            other => panic!("unexpected column: {other:?}"),
        };
        let _ = col.optional_shuffle(&[0]);
    }

    #[test]
    #[should_panic(expected = "vertex index out of bounds")]
    fn multi_segment_has_value_out_of_bounds() {
        let mut builder = MsVertexColumnBuilder::new();
        builder.push_back_vertex(VertexRecord::new(1, 10));
        let col = match builder.finish(None) {
            ContextColumn::Vertex(c) => c,
            other => panic!("unexpected column: {other:?}"),
        };
        assert!(col.has_value(0));
        col.has_value(1);
    }

    #[test]
    #[should_panic(expected = "different label")]
    fn single_label_builder_rejects_other_label() {
        let mut builder = SlVertexColumnBuilder::new(1);
        builder.push_back_vertex(VertexRecord::new(2, 0));
    }

    #[test]
    #[should_panic(expected = "non-optional")]
    fn push_null_non_optional() {
        let mut builder = MlVertexColumnBuilder::new();
        builder.push_back_null();
    }
}
