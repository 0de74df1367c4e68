use std::sync::Arc;

use graphrt_error::{GraphError, Result};

use crate::arena::Arena;
use crate::column::ContextColumn;
use crate::edge::EdgeColumnBuilder;
use crate::path::PathColumnBuilder;
use crate::value::{ElemType, Value};
use crate::values::ValueColumnBuilder;
use crate::vertex::{MlVertexColumnBuilder, MsVertexColumnBuilder, SlVertexColumnBuilder};

/// Incrementally builds a single column.
///
/// A builder is consumed by `finish`, it can't be appended to afterwards.
pub trait ContextColumnBuilder {
    fn reserve(&mut self, additional: usize);

    /// Append a value.
    ///
    /// Panics if the value's type doesn't match the column being built.
    fn push_back_elem(&mut self, val: &Value);

    /// Produce the column, attaching `arena` to columns that reference
    /// arena memory.
    fn finish(self, arena: Option<Arc<Arena>>) -> ContextColumn;
}

/// Builder that can produce absent rows.
pub trait OptionalContextColumnBuilder: ContextColumnBuilder {
    fn push_back_null(&mut self);
}

/// Any column builder, chosen at runtime.
#[derive(Debug)]
pub enum ColumnBuilder {
    SingleLabelVertex(SlVertexColumnBuilder),
    MultiSegmentVertex(MsVertexColumnBuilder),
    MultiLabelVertex(MlVertexColumnBuilder),
    Edge(EdgeColumnBuilder),
    Value(ValueColumnBuilder),
    Path(PathColumnBuilder),
}

impl ColumnBuilder {
    /// Create a builder for columns holding `elem_type`.
    ///
    /// Vertices use the multi-label representation since the label set isn't
    /// known up front.
    pub fn for_type(elem_type: ElemType, optional: bool) -> Result<Self> {
        Ok(match elem_type {
            ElemType::Null => {
                return Err(GraphError::new("Cannot build a column of nulls"));
            }
            ElemType::Vertex if optional => Self::MultiLabelVertex(MlVertexColumnBuilder::optional()),
            ElemType::Vertex => Self::MultiLabelVertex(MlVertexColumnBuilder::new()),
            ElemType::Edge if optional => Self::Edge(EdgeColumnBuilder::optional()),
            ElemType::Edge => Self::Edge(EdgeColumnBuilder::new()),
            ElemType::Path if optional => Self::Path(PathColumnBuilder::optional()),
            ElemType::Path => Self::Path(PathColumnBuilder::new()),
            other if optional => Self::Value(ValueColumnBuilder::optional(other)),
            other => Self::Value(ValueColumnBuilder::new(other)),
        })
    }

    /// Append a value, treating `Value::Null` as an absent row.
    pub fn push_back(&mut self, val: &Value) {
        if val.is_null() {
            self.push_back_null()
        } else {
            self.push_back_elem(val)
        }
    }

    /// Append an absent row.
    ///
    /// Panics if the builder isn't optional.
    pub fn push_back_null(&mut self) {
        match self {
            Self::SingleLabelVertex(b) => b.push_back_null(),
            Self::MultiSegmentVertex(_) => {
                panic!("multi-segment vertex columns can't hold nulls")
            }
            Self::MultiLabelVertex(b) => b.push_back_null(),
            Self::Edge(b) => b.push_back_null(),
            Self::Value(b) => b.push_back_null(),
            Self::Path(b) => b.push_back_null(),
        }
    }
}

impl ContextColumnBuilder for ColumnBuilder {
    fn reserve(&mut self, additional: usize) {
        match self {
            Self::SingleLabelVertex(b) => b.reserve(additional),
            Self::MultiSegmentVertex(b) => b.reserve(additional),
            Self::MultiLabelVertex(b) => b.reserve(additional),
            Self::Edge(b) => b.reserve(additional),
            Self::Value(b) => b.reserve(additional),
            Self::Path(b) => b.reserve(additional),
        }
    }

    fn push_back_elem(&mut self, val: &Value) {
        match self {
            Self::SingleLabelVertex(b) => b.push_back_elem(val),
            Self::MultiSegmentVertex(b) => b.push_back_elem(val),
            Self::MultiLabelVertex(b) => b.push_back_elem(val),
            Self::Edge(b) => b.push_back_elem(val),
            Self::Value(b) => b.push_back_elem(val),
            Self::Path(b) => b.push_back_elem(val),
        }
    }

    fn finish(self, arena: Option<Arc<Arena>>) -> ContextColumn {
        match self {
            Self::SingleLabelVertex(b) => b.finish(arena),
            Self::MultiSegmentVertex(b) => b.finish(arena),
            Self::MultiLabelVertex(b) => b.finish(arena),
            Self::Edge(b) => b.finish(arena),
            Self::Value(b) => b.finish(arena),
            Self::Path(b) => b.finish(arena),
        }
    }
}
