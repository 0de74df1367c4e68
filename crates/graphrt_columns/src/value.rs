use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use graphrt_error::{GraphError, Result};

pub use crate::arena::ArenaStr;

pub type Label = u8;
pub type VertexId = u32;

/// Vertex id reserved for "no vertex" in optional vertex columns.
pub const NONE_VID: VertexId = VertexId::MAX;

/// Tag for the type of an element stored in a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElemType {
    Null,
    Bool,
    Int32,
    Int64,
    UInt64,
    Float64,
    /// Milliseconds since epoch.
    Date,
    /// Calendar day.
    Day,
    String,
    Vertex,
    Edge,
    Path,
    List,
}

impl fmt::Display for ElemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Bool => write!(f, "Bool"),
            Self::Int32 => write!(f, "Int32"),
            Self::Int64 => write!(f, "Int64"),
            Self::UInt64 => write!(f, "UInt64"),
            Self::Float64 => write!(f, "Float64"),
            Self::Date => write!(f, "Date"),
            Self::Day => write!(f, "Day"),
            Self::String => write!(f, "String"),
            Self::Vertex => write!(f, "Vertex"),
            Self::Edge => write!(f, "Edge"),
            Self::Path => write!(f, "Path"),
            Self::List => write!(f, "List"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexRecord {
    pub label: Label,
    pub vid: VertexId,
}

impl VertexRecord {
    pub const fn new(label: Label, vid: VertexId) -> Self {
        VertexRecord { label, vid }
    }

    /// Placeholder stored in optional vertex columns for absent rows.
    pub const fn none(label: Label) -> Self {
        VertexRecord {
            label,
            vid: NONE_VID,
        }
    }

    pub const fn is_none(&self) -> bool {
        self.vid == NONE_VID
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelTriplet {
    pub src_label: Label,
    pub dst_label: Label,
    pub edge_label: Label,
}

impl LabelTriplet {
    pub const fn new(src_label: Label, dst_label: Label, edge_label: Label) -> Self {
        LabelTriplet {
            src_label,
            dst_label,
            edge_label,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeRecord {
    pub triplet: LabelTriplet,
    pub src: VertexId,
    pub dst: VertexId,
}

impl EdgeRecord {
    pub const fn new(triplet: LabelTriplet, src: VertexId, dst: VertexId) -> Self {
        EdgeRecord { triplet, src, dst }
    }
}

/// A point in time with millisecond resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Date {
    pub millis: i64,
}

impl Date {
    pub const fn from_millis(millis: i64) -> Self {
        Date { millis }
    }
}

/// A calendar day packed into 32 bits.
///
/// Layout is `year << 9 | month << 5 | day`, so comparing the packed words
/// orders days chronologically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Day(u32);

impl Day {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| GraphError::new(format!("Invalid day: {year}-{month}-{day}")))?;
        Self::from_naive_date(date)
    }

    pub fn from_naive_date(date: NaiveDate) -> Result<Self> {
        if date.year() < 0 || date.year() >= (1 << 23) {
            return Err(GraphError::new(format!("Year out of range for day: {date}")));
        }
        Ok(Day(
            ((date.year() as u32) << 9) | (date.month() << 5) | date.day(),
        ))
    }

    pub const fn from_u32(packed: u32) -> Self {
        Day(packed)
    }

    pub const fn to_u32(self) -> u32 {
        self.0
    }

    pub const fn year(self) -> i32 {
        (self.0 >> 9) as i32
    }

    pub const fn month(self) -> u32 {
        (self.0 >> 5) & 0xF
    }

    pub const fn day(self) -> u32 {
        self.0 & 0x1F
    }

    pub fn to_naive_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year(), self.month(), self.day())
    }
}

/// A sequence of vertices visited by a path expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    vertices: Arc<[VertexRecord]>,
}

impl Path {
    pub fn new(vertices: impl Into<Arc<[VertexRecord]>>) -> Self {
        Path {
            vertices: vertices.into(),
        }
    }

    pub fn vertices(&self) -> &[VertexRecord] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// A list of values all sharing the same element type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListValue {
    item_type: ElemType,
    items: Arc<[Value]>,
}

impl ListValue {
    /// Create a new list.
    ///
    /// Errors if any item doesn't match `item_type`. Null items are allowed.
    pub fn try_new(item_type: ElemType, items: impl Into<Arc<[Value]>>) -> Result<Self> {
        let items = items.into();
        if let Some(bad) = items
            .iter()
            .find(|v| !matches!(v, Value::Null) && v.elem_type() != item_type)
        {
            return Err(GraphError::new(format!(
                "List item type {} does not match list type {item_type}",
                bad.elem_type()
            )));
        }
        Ok(ListValue { item_type, items })
    }

    pub fn item_type(&self) -> ElemType {
        self.item_type
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A single read-only element.
///
/// Strings are views into arena memory and clone without copying.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt64(u64),
    Float64(f64),
    Date(Date),
    Day(Day),
    String(ArenaStr),
    Vertex(VertexRecord),
    Edge(EdgeRecord),
    Path(Path),
    List(ListValue),
}

impl Value {
    pub fn elem_type(&self) -> ElemType {
        match self {
            Self::Null => ElemType::Null,
            Self::Bool(_) => ElemType::Bool,
            Self::Int32(_) => ElemType::Int32,
            Self::Int64(_) => ElemType::Int64,
            Self::UInt64(_) => ElemType::UInt64,
            Self::Float64(_) => ElemType::Float64,
            Self::Date(_) => ElemType::Date,
            Self::Day(_) => ElemType::Day,
            Self::String(_) => ElemType::String,
            Self::Vertex(_) => ElemType::Vertex,
            Self::Edge(_) => ElemType::Edge,
            Self::Path(_) => ElemType::Path,
            Self::List(_) => ElemType::List,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn try_as_vertex(&self) -> Option<VertexRecord> {
        match self {
            Self::Vertex(v) => Some(*v),
            _ => None,
        }
    }

    pub fn try_as_edge(&self) -> Option<EdgeRecord> {
        match self {
            Self::Edge(e) => Some(*e),
            _ => None,
        }
    }

    pub fn try_as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn try_as_path(&self) -> Option<&Path> {
        match self {
            Self::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn try_as_list(&self) -> Option<&ListValue> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }
}

/// Floats compare bitwise so that equality is reflexive and agrees with the
/// column signatures.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int32(a), Self::Int32(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            (Self::UInt64(a), Self::UInt64(b)) => a == b,
            (Self::Float64(a), Self::Float64(b)) => a.to_bits() == b.to_bits(),
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Day(a), Self::Day(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Vertex(a), Self::Vertex(b)) => a == b,
            (Self::Edge(a), Self::Edge(b)) => a == b,
            (Self::Path(a), Self::Path(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => (),
            Self::Bool(v) => v.hash(state),
            Self::Int32(v) => v.hash(state),
            Self::Int64(v) => v.hash(state),
            Self::UInt64(v) => v.hash(state),
            Self::Float64(v) => v.to_bits().hash(state),
            Self::Date(v) => v.hash(state),
            Self::Day(v) => v.hash(state),
            Self::String(v) => v.hash(state),
            Self::Vertex(v) => v.hash(state),
            Self::Edge(v) => v.hash(state),
            Self::Path(v) => v.hash(state),
            Self::List(v) => v.hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::UInt64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(ArenaStr::from(value))
    }
}

impl From<VertexRecord> for Value {
    fn from(value: VertexRecord) -> Self {
        Value::Vertex(value)
    }
}

impl From<EdgeRecord> for Value {
    fn from(value: EdgeRecord) -> Self {
        Value::Edge(value)
    }
}

impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Value::Date(value)
    }
}

impl From<Day> for Value {
    fn from(value: Day) -> Self {
        Value::Day(value)
    }
}

impl From<Path> for Value {
    fn from(value: Path) -> Self {
        Value::Path(value)
    }
}

impl From<ListValue> for Value {
    fn from(value: ListValue) -> Self {
        Value::List(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_roundtrip_chrono() {
        let day = Day::new(2024, 2, 29).unwrap();
        assert_eq!(2024, day.year());
        assert_eq!(2, day.month());
        assert_eq!(29, day.day());
        assert_eq!(NaiveDate::from_ymd_opt(2024, 2, 29), day.to_naive_date());
    }

    #[test]
    fn day_packing_is_chronological() {
        let a = Day::new(2023, 12, 31).unwrap();
        let b = Day::new(2024, 1, 1).unwrap();
        let c = Day::new(2024, 1, 2).unwrap();
        assert!(a.to_u32() < b.to_u32());
        assert!(b.to_u32() < c.to_u32());
    }

    #[test]
    fn day_invalid() {
        Day::new(2023, 2, 29).unwrap_err();
    }

    #[test]
    fn float_equality_is_bitwise() {
        assert_eq!(Value::Float64(f64::NAN), Value::Float64(f64::NAN));
        assert_ne!(Value::Float64(0.0), Value::Float64(-0.0));
    }

    #[test]
    fn list_type_checked() {
        ListValue::try_new(ElemType::Int32, vec![Value::Int32(1), Value::Null]).unwrap();
        ListValue::try_new(ElemType::Int32, vec![Value::Int64(1)]).unwrap_err();
    }
}
