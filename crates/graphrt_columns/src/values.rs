use std::sync::Arc;

use tracing::trace;

use crate::arena::{Arena, ArenaBuilder, ArenaStr};
use crate::bitmap::Bitmap;
use crate::builder::{ContextColumnBuilder, OptionalContextColumnBuilder};
use crate::column::{unsupported, ContextColumn};
use crate::concat::concat;
use crate::signature::{dense_ordinals, SigColumn};
use crate::take::{optional_take, optional_take_validity, take};
use crate::topk::top_k;
use crate::value::{Date, Day, ElemType, ListValue, Value};

/// Typed storage backing value columns.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueData {
    Bool(Vec<bool>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float64(Vec<f64>),
    Date(Vec<Date>),
    Day(Vec<Day>),
    String(Vec<ArenaStr>),
    /// Lists, all holding items of `item_type`.
    ///
    /// `item_type` is `Null` until a list with a known item type is added.
    List {
        item_type: ElemType,
        lists: Vec<ListValue>,
    },
}

/// Apply `$body` to the vector of every non-list variant, and `$list_body` to
/// lists.
macro_rules! match_fixed {
    ($data:expr, $v:ident => $body:expr, List($item_type:ident, $lists:ident) => $list_body:expr) => {
        match $data {
            ValueData::Bool($v) => $body,
            ValueData::Int32($v) => $body,
            ValueData::Int64($v) => $body,
            ValueData::UInt64($v) => $body,
            ValueData::Float64($v) => $body,
            ValueData::Date($v) => $body,
            ValueData::Day($v) => $body,
            ValueData::String($v) => $body,
            ValueData::List {
                item_type: $item_type,
                lists: $lists,
            } => $list_body,
        }
    };
}

/// Map every variant to the same variant, built from the variant's vector.
macro_rules! map_data {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ValueData::Bool($v) => ValueData::Bool($body),
            ValueData::Int32($v) => ValueData::Int32($body),
            ValueData::Int64($v) => ValueData::Int64($body),
            ValueData::UInt64($v) => ValueData::UInt64($body),
            ValueData::Float64($v) => ValueData::Float64($body),
            ValueData::Date($v) => ValueData::Date($body),
            ValueData::Day($v) => ValueData::Day($body),
            ValueData::String($v) => ValueData::String($body),
            ValueData::List {
                item_type,
                lists: $v,
            } => ValueData::List {
                item_type: *item_type,
                lists: $body,
            },
        }
    };
}

impl ValueData {
    /// Empty storage for `elem_type`.
    ///
    /// Panics for types not stored in value columns.
    pub fn empty(elem_type: ElemType) -> Self {
        match elem_type {
            ElemType::Bool => Self::Bool(Vec::new()),
            ElemType::Int32 => Self::Int32(Vec::new()),
            ElemType::Int64 => Self::Int64(Vec::new()),
            ElemType::UInt64 => Self::UInt64(Vec::new()),
            ElemType::Float64 => Self::Float64(Vec::new()),
            ElemType::Date => Self::Date(Vec::new()),
            ElemType::Day => Self::Day(Vec::new()),
            ElemType::String => Self::String(Vec::new()),
            ElemType::List => Self::List {
                item_type: ElemType::Null,
                lists: Vec::new(),
            },
            other => panic!("{other} values are not stored in value columns"),
        }
    }

    pub fn elem_type(&self) -> ElemType {
        match self {
            Self::Bool(_) => ElemType::Bool,
            Self::Int32(_) => ElemType::Int32,
            Self::Int64(_) => ElemType::Int64,
            Self::UInt64(_) => ElemType::UInt64,
            Self::Float64(_) => ElemType::Float64,
            Self::Date(_) => ElemType::Date,
            Self::Day(_) => ElemType::Day,
            Self::String(_) => ElemType::String,
            Self::List { .. } => ElemType::List,
        }
    }

    pub fn len(&self) -> usize {
        match_fixed!(self, v => v.len(), List(_item_type, lists) => lists.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_elem(&self, idx: usize) -> Value {
        match self {
            Self::Bool(v) => Value::Bool(v[idx]),
            Self::Int32(v) => Value::Int32(v[idx]),
            Self::Int64(v) => Value::Int64(v[idx]),
            Self::UInt64(v) => Value::UInt64(v[idx]),
            Self::Float64(v) => Value::Float64(v[idx]),
            Self::Date(v) => Value::Date(v[idx]),
            Self::Day(v) => Value::Day(v[idx]),
            Self::String(v) => Value::String(v[idx].clone()),
            Self::List { lists, .. } => Value::List(lists[idx].clone()),
        }
    }

    fn reserve(&mut self, additional: usize) {
        match_fixed!(self, v => v.reserve(additional), List(_item_type, lists) => lists.reserve(additional))
    }

    /// Append a value, panicking if its type doesn't match the storage.
    fn push(&mut self, val: &Value) {
        match (self, val) {
            (Self::Bool(v), Value::Bool(x)) => v.push(*x),
            (Self::Int32(v), Value::Int32(x)) => v.push(*x),
            (Self::Int64(v), Value::Int64(x)) => v.push(*x),
            (Self::UInt64(v), Value::UInt64(x)) => v.push(*x),
            (Self::Float64(v), Value::Float64(x)) => v.push(*x),
            (Self::Date(v), Value::Date(x)) => v.push(*x),
            (Self::Day(v), Value::Day(x)) => v.push(*x),
            (Self::String(v), Value::String(x)) => v.push(x.clone()),
            (Self::List { item_type, lists }, Value::List(x)) => {
                *item_type = merge_item_types(*item_type, x.item_type());
                lists.push(x.clone());
            }
            (data, val) => panic!(
                "{} value column received {}",
                data.elem_type(),
                val.elem_type()
            ),
        }
    }

    /// Append the placeholder stored for absent rows.
    fn push_placeholder(&mut self) {
        match self {
            Self::Bool(v) => v.push(false),
            Self::Int32(v) => v.push(0),
            Self::Int64(v) => v.push(0),
            Self::UInt64(v) => v.push(0),
            Self::Float64(v) => v.push(0.0),
            Self::Date(v) => v.push(Date::default()),
            Self::Day(v) => v.push(Day::default()),
            Self::String(v) => v.push(ArenaStr::from_static("")),
            Self::List { item_type, lists } => lists.push(empty_list(*item_type)),
        }
    }

    fn take(&self, offsets: &[usize]) -> ValueData {
        map_data!(self, v => take(v, offsets))
    }

    fn optional_take(&self, offsets: &[usize]) -> ValueData {
        match self {
            Self::Bool(v) => Self::Bool(optional_take(v, offsets, &false)),
            Self::Int32(v) => Self::Int32(optional_take(v, offsets, &0)),
            Self::Int64(v) => Self::Int64(optional_take(v, offsets, &0)),
            Self::UInt64(v) => Self::UInt64(optional_take(v, offsets, &0)),
            Self::Float64(v) => Self::Float64(optional_take(v, offsets, &0.0)),
            Self::Date(v) => Self::Date(optional_take(v, offsets, &Date::default())),
            Self::Day(v) => Self::Day(optional_take(v, offsets, &Day::default())),
            Self::String(v) => {
                Self::String(optional_take(v, offsets, &ArenaStr::from_static("")))
            }
            Self::List { item_type, lists } => Self::List {
                item_type: *item_type,
                lists: optional_take(lists, offsets, &empty_list(*item_type)),
            },
        }
    }

    fn concat(&self, other: &ValueData) -> ValueData {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Self::Bool(concat(a, b)),
            (Self::Int32(a), Self::Int32(b)) => Self::Int32(concat(a, b)),
            (Self::Int64(a), Self::Int64(b)) => Self::Int64(concat(a, b)),
            (Self::UInt64(a), Self::UInt64(b)) => Self::UInt64(concat(a, b)),
            (Self::Float64(a), Self::Float64(b)) => Self::Float64(concat(a, b)),
            (Self::Date(a), Self::Date(b)) => Self::Date(concat(a, b)),
            (Self::Day(a), Self::Day(b)) => Self::Day(concat(a, b)),
            (Self::String(a), Self::String(b)) => Self::String(concat(a, b)),
            (
                Self::List {
                    item_type: a_type,
                    lists: a,
                },
                Self::List {
                    item_type: b_type,
                    lists: b,
                },
            ) => Self::List {
                item_type: merge_item_types(*a_type, *b_type),
                lists: concat(a, b),
            },
            (a, b) => panic!(
                "cannot concat {} values with {} values",
                a.elem_type(),
                b.elem_type()
            ),
        }
    }

    fn signature(&self) -> SigColumn<'_> {
        match self {
            Self::Bool(v) => SigColumn::Bool(v),
            Self::Int32(v) => SigColumn::Int32(v),
            Self::Int64(v) => SigColumn::Int64(v),
            Self::UInt64(v) => SigColumn::UInt64(v),
            Self::Float64(v) => SigColumn::Float64(v),
            Self::Date(v) => SigColumn::Date(v),
            Self::Day(v) => SigColumn::Day(v),
            Self::String(v) => SigColumn::Computed(dense_ordinals(v.iter())),
            Self::List { lists, .. } => SigColumn::Computed(dense_ordinals(lists.iter())),
        }
    }

    fn order_by_limit(&self, asc: bool, limit: usize) -> Option<Vec<usize>> {
        Some(match self {
            Self::Bool(v) => top_k(v, asc, limit),
            Self::Int32(v) => top_k(v, asc, limit),
            Self::Int64(v) => top_k(v, asc, limit),
            Self::UInt64(v) => top_k(v, asc, limit),
            Self::Float64(v) => top_k(v, asc, limit),
            Self::Date(v) => top_k(v, asc, limit),
            Self::Day(v) => top_k(v, asc, limit),
            Self::String(v) => top_k(v, asc, limit),
            Self::List { .. } => return None,
        })
    }
}

fn empty_list(item_type: ElemType) -> ListValue {
    // An empty list always type checks.
    match ListValue::try_new(item_type, Vec::new()) {
        Ok(list) => list,
        Err(_) => unreachable!("empty list rejected"),
    }
}

/// Item type of a list column after seeing a list with `incoming` items.
fn merge_item_types(current: ElemType, incoming: ElemType) -> ElemType {
    match (current, incoming) {
        (ElemType::Null, t) | (t, ElemType::Null) => t,
        (a, b) if a == b => a,
        (a, b) => panic!("list item type {b} does not match column item type {a}"),
    }
}

/// Arena shared by the result of concatenating two arena backed columns.
fn union_arenas(a: &Option<Arc<Arena>>, b: &Option<Arc<Arena>>) -> Option<Arc<Arena>> {
    match (a, b) {
        (Some(a), Some(b)) if Arc::ptr_eq(a, b) => Some(a.clone()),
        (Some(a), Some(b)) => Some(Arena::merge(a, b)),
        (Some(a), None) => Some(a.clone()),
        (None, Some(b)) => Some(b.clone()),
        (None, None) => None,
    }
}

/// Column of non-null values of a single element type.
#[derive(Debug, Clone)]
pub struct ValueColumn {
    data: ValueData,
    arena: Option<Arc<Arena>>,
}

/// Arenas only keep payloads alive, columns compare by values.
impl PartialEq for ValueColumn {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl ValueColumn {
    pub fn new(data: ValueData) -> Self {
        ValueColumn { data, arena: None }
    }

    pub fn data(&self) -> &ValueData {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn elem_type(&self) -> ElemType {
        self.data.elem_type()
    }

    /// Item type for list columns, `Null` for every other column.
    pub fn list_item_type(&self) -> ElemType {
        match &self.data {
            ValueData::List { item_type, .. } => *item_type,
            _ => ElemType::Null,
        }
    }

    pub fn column_info(&self) -> String {
        format!("ValueColumn<{}>[{}]", self.elem_type(), self.len())
    }

    pub fn get_elem(&self, idx: usize) -> Value {
        self.data.get_elem(idx)
    }

    /// Every in bounds row has a value.
    pub fn has_value(&self, idx: usize) -> bool {
        assert!(idx < self.len(), "value index out of bounds");
        true
    }

    pub fn shuffle(&self, offsets: &[usize]) -> ValueColumn {
        ValueColumn {
            data: self.data.take(offsets),
            arena: self.arena.clone(),
        }
    }

    pub fn optional_shuffle(&self, offsets: &[usize]) -> OptionalValueColumn {
        OptionalValueColumn {
            values: ValueColumn {
                data: self.data.optional_take(offsets),
                arena: self.arena.clone(),
            },
            validity: optional_take_validity(None, offsets),
        }
    }

    pub fn union_col(&self, other: &ValueColumn) -> ValueColumn {
        let arena = union_arenas(&self.arena, &other.arena);
        if arena.is_some() {
            trace!(
                left = %self.column_info(),
                right = %other.column_info(),
                "union of arena backed columns"
            );
        }
        ValueColumn {
            data: self.data.concat(&other.data),
            arena,
        }
    }

    pub fn generate_signature(&self) -> SigColumn<'_> {
        self.data.signature()
    }

    pub fn order_by_limit(&self, asc: bool, limit: usize) -> Option<Vec<usize>> {
        self.data.order_by_limit(asc, limit)
    }

    pub fn get_arena(&self) -> Option<Arc<Arena>> {
        self.arena.clone()
    }

    pub fn set_arena(&mut self, arena: Option<Arc<Arena>>) {
        self.arena = arena;
    }
}

/// Value column where rows may be absent.
///
/// Absent rows hold a placeholder in `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionalValueColumn {
    values: ValueColumn,
    validity: Bitmap,
}

impl OptionalValueColumn {
    pub fn values(&self) -> &ValueColumn {
        &self.values
    }

    pub fn validity(&self) -> &Bitmap {
        &self.validity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn elem_type(&self) -> ElemType {
        self.values.elem_type()
    }

    pub fn list_item_type(&self) -> ElemType {
        self.values.list_item_type()
    }

    pub fn column_info(&self) -> String {
        format!("OptionalValueColumn<{}>[{}]", self.elem_type(), self.len())
    }

    pub fn get_elem(&self, idx: usize) -> Value {
        self.values.get_elem(idx)
    }

    pub fn has_value(&self, idx: usize) -> bool {
        self.validity.value(idx)
    }

    pub fn shuffle(&self, offsets: &[usize]) -> OptionalValueColumn {
        OptionalValueColumn {
            values: self.values.shuffle(offsets),
            validity: offsets.iter().map(|&idx| self.validity.value(idx)).collect(),
        }
    }

    pub fn optional_shuffle(&self, offsets: &[usize]) -> OptionalValueColumn {
        OptionalValueColumn {
            values: ValueColumn {
                data: self.values.data.optional_take(offsets),
                arena: self.values.arena.clone(),
            },
            validity: optional_take_validity(Some(&self.validity), offsets),
        }
    }

    pub fn union_col(&self, other: &OptionalValueColumn) -> OptionalValueColumn {
        let mut validity = self.validity.clone();
        validity.extend(other.validity.iter());
        OptionalValueColumn {
            values: self.values.union_col(&other.values),
            validity,
        }
    }

    /// Absent rows all share one signature, distinct from any present value.
    pub fn generate_signature(&self) -> SigColumn<'_> {
        let base = self.values.generate_signature();
        let keys = (0..self.len()).map(|idx| {
            if self.validity.value(idx) {
                Some(base.get_sig(idx))
            } else {
                None
            }
        });
        SigColumn::Computed(dense_ordinals(keys))
    }

    pub fn get_arena(&self) -> Option<Arc<Arena>> {
        self.values.get_arena()
    }

    pub fn set_arena(&mut self, arena: Option<Arc<Arena>>) {
        self.values.set_arena(arena)
    }
}

/// Builds value columns, and optional value columns when created with
/// `optional`.
#[derive(Debug)]
pub struct ValueColumnBuilder {
    data: ValueData,
    validity: Option<Bitmap>,
    /// Holds copies of strings pushed with `push_back_str`.
    arena: ArenaBuilder,
}

impl ValueColumnBuilder {
    pub fn new(elem_type: ElemType) -> Self {
        ValueColumnBuilder {
            data: ValueData::empty(elem_type),
            validity: None,
            arena: ArenaBuilder::new(),
        }
    }

    pub fn optional(elem_type: ElemType) -> Self {
        ValueColumnBuilder {
            data: ValueData::empty(elem_type),
            validity: Some(Bitmap::default()),
            arena: ArenaBuilder::new(),
        }
    }

    pub fn elem_type(&self) -> ElemType {
        self.data.elem_type()
    }

    /// Copy a string into the column's own arena and append it.
    pub fn push_back_str(&mut self, s: &str) {
        let s = self.arena.alloc_str(s);
        self.push_back_elem(&Value::String(s));
    }
}

impl ContextColumnBuilder for ValueColumnBuilder {
    fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
    }

    fn push_back_elem(&mut self, val: &Value) {
        self.data.push(val);
        if let Some(validity) = &mut self.validity {
            validity.push(true);
        }
    }

    fn finish(self, arena: Option<Arc<Arena>>) -> ContextColumn {
        let arena = if self.arena.num_allocations() > 0 {
            let own = self.arena.freeze();
            match arena {
                Some(arena) => Some(Arena::merge(&arena, &own)),
                None => Some(own),
            }
        } else {
            arena
        };

        let values = ValueColumn {
            data: self.data,
            arena,
        };

        match self.validity {
            Some(validity) => {
                ContextColumn::OptionalValue(OptionalValueColumn { values, validity })
            }
            None => ContextColumn::Value(values),
        }
    }
}

impl OptionalContextColumnBuilder for ValueColumnBuilder {
    fn push_back_null(&mut self) {
        let Some(validity) = self.validity.as_mut() else {
            unsupported(
                "push_back_null",
                &format!("ValueColumnBuilder<{}>", self.data.elem_type()),
            )
        };
        validity.push(false);
        self.data.push_placeholder();
    }
}
