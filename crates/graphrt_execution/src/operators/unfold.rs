use std::sync::Arc;

use graphrt_columns::builder::{ColumnBuilder, ContextColumnBuilder};
use graphrt_columns::column::ContextColumn;
use graphrt_columns::value::{ElemType, Value};
use graphrt_columns::vertex::MlVertexColumnBuilder;
use graphrt_error::{not_implemented, GraphError, Result};
use tracing::trace;

use crate::context::Context;
use crate::vars::ExecutionVars;

/// Expands every row into one row per element of a path or list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unfold;

impl Unfold {
    /// Unfold the column at `key`, storing the elements at `alias`.
    ///
    /// Input row `i` is repeated once per element of the value at row `i`.
    /// Absent rows, empty paths and empty lists produce no output rows. All
    /// other columns are gathered to match.
    pub fn unfold(
        mut ctx: Context,
        key: usize,
        alias: usize,
        vars: &ExecutionVars,
    ) -> Result<Context> {
        let column = ctx
            .get(key)
            .cloned()
            .ok_or_else(|| GraphError::new(format!("Missing column for unfold key {key}")))?;

        let limit = RowLimit::new(vars.max_unfold_rows());

        let (unfolded, offsets) = match column.as_ref() {
            ContextColumn::Path(_) => unfold_paths(&column, limit)?,
            ContextColumn::Value(c) if c.elem_type() == ElemType::List => {
                unfold_lists(&column, c.list_item_type(), limit)?
            }
            ContextColumn::OptionalValue(c) if c.elem_type() == ElemType::List => {
                unfold_lists(&column, c.list_item_type(), limit)?
            }
            other => not_implemented!("unfold for {}", other.column_info()),
        };

        trace!(
            key,
            alias,
            input_rows = column.size(),
            output_rows = offsets.len(),
            "unfolded column"
        );

        ctx.reshuffle(&offsets);
        ctx.set(alias, Arc::new(unfolded))?;

        Ok(ctx)
    }
}

/// Guards against unfold producing more than the configured number of rows.
#[derive(Debug, Clone, Copy)]
struct RowLimit(Option<u64>);

impl RowLimit {
    fn new(limit: Option<u64>) -> Self {
        RowLimit(limit)
    }

    fn check(&self, rows: usize) -> Result<()> {
        match self.0 {
            Some(limit) if rows as u64 > limit => Err(GraphError::new(format!(
                "Unfold produced more than {limit} rows"
            ))),
            _ => Ok(()),
        }
    }
}

fn unfold_paths(column: &ContextColumn, limit: RowLimit) -> Result<(ContextColumn, Vec<usize>)> {
    let mut builder = MlVertexColumnBuilder::new();
    let mut offsets = Vec::new();

    for row in 0..column.size() {
        if !column.has_value(row) {
            continue;
        }
        let elem = column.get_elem(row);
        let Some(path) = elem.try_as_path() else {
            return Err(GraphError::new(format!(
                "Expected path in {}, got {}",
                column.column_info(),
                elem.elem_type()
            )));
        };

        for vertex in path.vertices() {
            builder.push_back_vertex(*vertex);
            offsets.push(row);
        }
        limit.check(offsets.len())?;
    }

    Ok((builder.finish(None), offsets))
}

fn unfold_lists(
    column: &ContextColumn,
    item_type: ElemType,
    limit: RowLimit,
) -> Result<(ContextColumn, Vec<usize>)> {
    let lists: Vec<(usize, Value)> = (0..column.size())
        .filter(|&row| column.has_value(row))
        .map(|row| (row, column.get_elem(row)))
        .collect();

    let total: usize = lists
        .iter()
        .filter_map(|(_, v)| v.try_as_list())
        .map(|l| l.len())
        .sum();
    limit.check(total)?;

    let has_null_items = lists
        .iter()
        .filter_map(|(_, v)| v.try_as_list())
        .any(|l| l.items().iter().any(|item| item.is_null()));

    if item_type == ElemType::Null {
        // Zero rows or only absent rows. Nothing was unfolded, so keep the
        // key column's type on the empty output.
        if total == 0 {
            return Ok((column.shuffle(&[]), Vec::new()));
        }
        return Err(GraphError::new(format!(
            "Cannot unfold {}, list item type unknown",
            column.column_info()
        )));
    }

    let mut builder = ColumnBuilder::for_type(item_type, has_null_items)?;
    builder.reserve(total);
    let mut offsets = Vec::with_capacity(total);

    for (row, value) in &lists {
        let Some(list) = value.try_as_list() else {
            return Err(GraphError::new(format!(
                "Expected list in {}, got {}",
                column.column_info(),
                value.elem_type()
            )));
        };
        for item in list.items() {
            builder.push_back(item);
            offsets.push(*row);
        }
    }

    // Unfolded strings still point into the list column's arena.
    Ok((builder.finish(column.get_arena()), offsets))
}

#[cfg(test)]
mod tests {
    use graphrt_columns::builder::OptionalContextColumnBuilder;
    use graphrt_columns::path::PathColumnBuilder;
    use graphrt_columns::value::{ListValue, Path, VertexRecord};
    use graphrt_columns::values::ValueColumnBuilder;

    use super::*;

    fn int_list(vals: &[i32]) -> Value {
        Value::List(
            ListValue::try_new(
                ElemType::Int32,
                vals.iter().map(|v| Value::Int32(*v)).collect::<Vec<_>>(),
            )
            .unwrap(),
        )
    }

    fn context_with(alias: usize, column: ContextColumn) -> Context {
        let mut ctx = Context::new(&ExecutionVars::new_local());
        ctx.set(alias, Arc::new(column)).unwrap();
        ctx
    }

    #[test]
    fn unfold_int_lists() {
        let mut builder = ValueColumnBuilder::optional(ElemType::List);
        builder.push_back_elem(&int_list(&[1, 2]));
        builder.push_back_null();
        builder.push_back_elem(&int_list(&[]));
        builder.push_back_elem(&int_list(&[3]));

        let ctx = context_with(0, builder.finish(None));
        let out = Unfold::unfold(ctx, 0, 1, &ExecutionVars::new_local()).unwrap();

        assert_eq!(3, out.row_num());
        let items = out.get(1).unwrap();
        assert_eq!(ElemType::Int32, items.elem_type());
        assert_eq!(
            vec![Value::Int32(1), Value::Int32(2), Value::Int32(3)],
            (0..3).map(|idx| items.get_elem(idx)).collect::<Vec<_>>()
        );

        // The key column is gathered along with everything else.
        let key = out.get(0).unwrap();
        assert_eq!(key.get_elem(0), key.get_elem(1));
        assert_eq!(int_list(&[3]), key.get_elem(2));
    }

    #[test]
    fn unfold_empty_list_column() {
        let builder = ColumnBuilder::for_type(ElemType::List, false).unwrap();
        let mut ctx = context_with(0, builder.finish(None));
        ctx.set(1, Arc::new(ValueColumnBuilder::new(ElemType::Int32).finish(None)))
            .unwrap();

        let out = Unfold::unfold(ctx, 0, 2, &ExecutionVars::new_local()).unwrap();
        assert_eq!(0, out.row_num());
        assert_eq!(0, out.get(2).unwrap().size());
        assert_eq!(0, out.get(1).unwrap().size());
    }

    #[test]
    fn unfold_all_absent_lists() {
        let mut builder = ColumnBuilder::for_type(ElemType::List, true).unwrap();
        for _ in 0..3 {
            builder.push_back(&Value::Null);
        }
        let mut ctx = context_with(0, builder.finish(None));
        let mut names = ValueColumnBuilder::new(ElemType::String);
        for name in ["a", "b", "c"] {
            names.push_back_str(name);
        }
        ctx.set(1, Arc::new(names.finish(None))).unwrap();

        let out = Unfold::unfold(ctx, 0, 2, &ExecutionVars::new_local()).unwrap();
        assert_eq!(0, out.row_num());
        assert_eq!(0, out.get(2).unwrap().size());
        assert_eq!(0, out.get(1).unwrap().size());
    }

    #[test]
    fn unfold_path_into_vertices() {
        let mut builder = PathColumnBuilder::new();
        builder.push_back_path(Path::new(vec![
            VertexRecord::new(0, 1),
            VertexRecord::new(1, 2),
        ]));

        let ctx = context_with(3, builder.finish(None));
        let out = Unfold::unfold(ctx, 3, 3, &ExecutionVars::new_local()).unwrap();

        let col = out.get(3).unwrap();
        assert_eq!(ElemType::Vertex, col.elem_type());
        assert_eq!(Value::Vertex(VertexRecord::new(1, 2)), col.get_elem(1));
        assert_eq!(vec![3], out.column_aliases().collect::<Vec<_>>());
    }

    #[test]
    fn unfold_missing_key() {
        let ctx = Context::new(&ExecutionVars::new_local());
        let err = Unfold::unfold(ctx, 4, 5, &ExecutionVars::new_local()).unwrap_err();
        assert!(err.get_msg().contains("key 4"), "{err}");
    }

    #[test]
    fn unfold_not_a_list() {
        let mut builder = ValueColumnBuilder::new(ElemType::Int32);
        builder.push_back_elem(&Value::Int32(1));
        let ctx = context_with(0, builder.finish(None));

        let err = Unfold::unfold(ctx, 0, 1, &ExecutionVars::new_local()).unwrap_err();
        assert!(err.get_msg().starts_with("Not yet implemented"), "{err}");
    }

    #[test]
    fn unfold_row_limit() {
        let mut builder = ValueColumnBuilder::new(ElemType::List);
        builder.push_back_elem(&int_list(&[1, 2, 3]));
        let ctx = context_with(0, builder.finish(None));

        let mut vars = ExecutionVars::new_local();
        vars.set_var("max_unfold_rows", Value::UInt64(2)).unwrap();
        Unfold::unfold(ctx.clone(), 0, 1, &vars).unwrap_err();

        vars.set_var("max_unfold_rows", Value::UInt64(3)).unwrap();
        Unfold::unfold(ctx, 0, 1, &vars).unwrap();
    }
}
