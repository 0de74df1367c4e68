use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::arena::Arena;
use crate::edge::EdgeColumn;
use crate::group::{dedup_offsets, group_offsets};
use crate::path::PathColumn;
use crate::signature::SigColumn;
use crate::value::{ElemType, Value};
use crate::values::{OptionalValueColumn, ValueColumn};
use crate::vertex::VertexColumn;

/// Offset meaning "no source row" for `optional_shuffle`.
pub const NONE_OFFSET: usize = usize::MAX;

/// Kind of a column. Fixed for the column's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextColumnType {
    Vertex,
    Edge,
    Value,
    Path,
    OptionalValue,
}

impl fmt::Display for ContextColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "Vertex"),
            Self::Edge => write!(f, "Edge"),
            Self::Value => write!(f, "Value"),
            Self::Path => write!(f, "Path"),
            Self::OptionalValue => write!(f, "OptionalValue"),
        }
    }
}

/// Abort on a capability the column's representation doesn't provide.
///
/// Reaching this means the query plan is malformed.
#[track_caller]
pub(crate) fn unsupported(op: &str, column_info: &str) -> ! {
    panic!("{op} not implemented for {column_info}")
}

/// An immutable column of intermediate results.
///
/// Row `i` of the column corresponds to row `i` of the owning context. Columns
/// are never mutated after being built, only read or used as input to produce
/// new columns.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextColumn {
    Vertex(VertexColumn),
    Edge(EdgeColumn),
    Value(ValueColumn),
    OptionalValue(OptionalValueColumn),
    Path(PathColumn),
}

impl ContextColumn {
    /// Number of rows.
    pub fn size(&self) -> usize {
        match self {
            Self::Vertex(c) => c.len(),
            Self::Edge(c) => c.len(),
            Self::Value(c) => c.len(),
            Self::OptionalValue(c) => c.len(),
            Self::Path(c) => c.len(),
        }
    }

    pub fn column_kind(&self) -> ContextColumnType {
        match self {
            Self::Vertex(_) => ContextColumnType::Vertex,
            Self::Edge(_) => ContextColumnType::Edge,
            Self::Value(_) => ContextColumnType::Value,
            Self::OptionalValue(_) => ContextColumnType::OptionalValue,
            Self::Path(_) => ContextColumnType::Path,
        }
    }

    pub fn elem_type(&self) -> ElemType {
        match self {
            Self::Vertex(_) => ElemType::Vertex,
            Self::Edge(_) => ElemType::Edge,
            Self::Value(c) => c.elem_type(),
            Self::OptionalValue(c) => c.elem_type(),
            Self::Path(_) => ElemType::Path,
        }
    }

    /// Short description used in diagnostics.
    pub fn column_info(&self) -> String {
        match self {
            Self::Vertex(c) => c.column_info(),
            Self::Edge(c) => c.column_info(),
            Self::Value(c) => c.column_info(),
            Self::OptionalValue(c) => c.column_info(),
            Self::Path(c) => c.column_info(),
        }
    }

    /// Get the value at a row.
    ///
    /// For optional columns, rows without a value still return the stored
    /// placeholder. Check `has_value` first.
    ///
    /// Panics if `idx` is out of bounds.
    pub fn get_elem(&self, idx: usize) -> Value {
        match self {
            Self::Vertex(c) => Value::Vertex(c.get_vertex(idx)),
            Self::Edge(c) => Value::Edge(c.get_edge(idx)),
            Self::Value(c) => c.get_elem(idx),
            Self::OptionalValue(c) => c.get_elem(idx),
            Self::Path(c) => Value::Path(c.get_path(idx).clone()),
        }
    }

    pub fn has_value(&self, idx: usize) -> bool {
        match self {
            Self::Vertex(c) => c.has_value(idx),
            Self::Edge(c) => c.has_value(idx),
            Self::Value(c) => c.has_value(idx),
            Self::OptionalValue(c) => c.has_value(idx),
            Self::Path(c) => c.has_value(idx),
        }
    }

    pub fn is_optional(&self) -> bool {
        match self {
            Self::Vertex(c) => c.is_optional(),
            Self::Edge(c) => c.is_optional(),
            Self::Value(_) => false,
            Self::OptionalValue(_) => true,
            Self::Path(c) => c.is_optional(),
        }
    }

    /// Gather rows, output row `i` is input row `offsets[i]`.
    ///
    /// Panics if any offset is out of bounds.
    pub fn shuffle(&self, offsets: &[usize]) -> ContextColumn {
        match self {
            Self::Vertex(c) => Self::Vertex(c.shuffle(offsets)),
            Self::Edge(c) => Self::Edge(c.shuffle(offsets)),
            Self::Value(c) => Self::Value(c.shuffle(offsets)),
            Self::OptionalValue(c) => Self::OptionalValue(c.shuffle(offsets)),
            Self::Path(c) => Self::Path(c.shuffle(offsets)),
        }
    }

    /// Gather rows, allowing `NONE_OFFSET` for rows without a source.
    ///
    /// The output is always optional. Rows at `NONE_OFFSET` report
    /// `has_value == false`.
    pub fn optional_shuffle(&self, offsets: &[usize]) -> ContextColumn {
        match self {
            Self::Vertex(c) => Self::Vertex(c.optional_shuffle(offsets)),
            Self::Edge(c) => Self::Edge(c.optional_shuffle(offsets)),
            Self::Value(c) => Self::OptionalValue(c.optional_shuffle(offsets)),
            Self::OptionalValue(c) => Self::OptionalValue(c.optional_shuffle(offsets)),
            Self::Path(c) => Self::Path(c.optional_shuffle(offsets)),
        }
    }

    /// Concatenate `self` with `other`.
    ///
    /// Panics if the column kinds or element types differ.
    pub fn union_col(&self, other: &ContextColumn) -> ContextColumn {
        if self.column_kind() != other.column_kind() || self.elem_type() != other.elem_type() {
            panic!(
                "cannot union {} with {}",
                self.column_info(),
                other.column_info()
            );
        }

        match (self, other) {
            (Self::Vertex(a), Self::Vertex(b)) => Self::Vertex(a.union_col(b)),
            (Self::Edge(a), Self::Edge(b)) => Self::Edge(a.union_col(b)),
            (Self::Value(a), Self::Value(b)) => Self::Value(a.union_col(b)),
            (Self::OptionalValue(a), Self::OptionalValue(b)) => {
                Self::OptionalValue(a.union_col(b))
            }
            (Self::Path(a), Self::Path(b)) => Self::Path(a.union_col(b)),
            _ => unreachable!("column kinds checked above"),
        }
    }

    /// Create the signature accessor for this column.
    pub fn generate_signature(&self) -> SigColumn<'_> {
        match self {
            Self::Vertex(c) => c.generate_signature(),
            Self::Edge(c) => c.generate_signature(),
            Self::Value(c) => c.generate_signature(),
            Self::OptionalValue(c) => c.generate_signature(),
            Self::Path(c) => c.generate_signature(),
        }
    }

    /// Offsets of the first occurrence of each distinct value, in order of
    /// first appearance.
    pub fn generate_dedup_offset(&self) -> Vec<usize> {
        dedup_offsets(&self.generate_signature())
    }

    /// Group rows by value.
    ///
    /// Returns a column with one row per distinct value (in order of first
    /// appearance), and for each distinct value every row holding it.
    pub fn generate_aggregate_offset(&self) -> (ContextColumn, Vec<Vec<usize>>) {
        let (firsts, groups) = group_offsets(&self.generate_signature());
        (self.shuffle(&firsts), groups)
    }

    /// Offsets of the `min(limit, size)` smallest (`asc`) or largest rows, in
    /// output order. Ties keep the lower row index first.
    ///
    /// Returns None if the column has no ordering. Callers are expected to fall
    /// back to a general sort.
    pub fn order_by_limit(&self, asc: bool, limit: usize) -> Option<Vec<usize>> {
        let offsets = match self {
            Self::Value(c) => c.order_by_limit(asc, limit),
            _ => None,
        };

        if offsets.is_none() {
            debug!(column = %self.column_info(), "order by limit not supported");
        }

        offsets
    }

    /// Arena backing variable length payloads, if any.
    pub fn get_arena(&self) -> Option<Arc<Arena>> {
        match self {
            Self::Value(c) => c.get_arena(),
            Self::OptionalValue(c) => c.get_arena(),
            _ => None,
        }
    }

    /// Attach an arena to this column.
    ///
    /// No-op for columns owning all of their data.
    pub fn set_arena(&mut self, arena: Option<Arc<Arena>>) {
        match self {
            Self::Value(c) => c.set_arena(arena),
            Self::OptionalValue(c) => c.set_arena(arena),
            _ => (),
        }
    }
}

impl fmt::Display for ContextColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.column_info())
    }
}
