use std::sync::Arc;

use graphrt_columns::arena::ArenaBuilder;
use graphrt_columns::builder::{ColumnBuilder, ContextColumnBuilder};
use graphrt_columns::column::{ContextColumn, ContextColumnType};
use graphrt_columns::value::{ElemType, ListValue, Value, VertexRecord};
use graphrt_columns::vertex::SlVertexColumnBuilder;
use graphrt_execution::context::Context;
use graphrt_execution::operators::unfold::Unfold;
use graphrt_execution::vars::ExecutionVars;
use similar_asserts::assert_eq;

fn string_list(arena: &mut ArenaBuilder, items: &[Option<&str>]) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|item| match item {
            Some(s) => Value::String(arena.alloc_str(s)),
            None => Value::Null,
        })
        .collect();
    Value::List(ListValue::try_new(ElemType::String, items).unwrap())
}

/// Person vertices with a list of tags each.
fn tagged_people(vars: &ExecutionVars) -> Context {
    let mut arena = ArenaBuilder::new();

    let mut people = SlVertexColumnBuilder::new(0);
    let mut tags = ColumnBuilder::for_type(ElemType::List, true).unwrap();

    people.push_back_vertex(VertexRecord::new(0, 1));
    tags.push_back(&string_list(&mut arena, &[Some("rust"), Some("graphs")]));

    people.push_back_vertex(VertexRecord::new(0, 2));
    tags.push_back(&Value::Null);

    people.push_back_vertex(VertexRecord::new(0, 3));
    tags.push_back(&string_list(&mut arena, &[Some("rust"), None]));

    let arena = arena.freeze();

    let mut ctx = Context::new(vars);
    ctx.set(0, Arc::new(people.finish(None))).unwrap();
    ctx.set(1, Arc::new(tags.finish(Some(arena)))).unwrap();
    ctx
}

#[test]
fn unfold_then_group() {
    logutil::configure_global_logger(tracing::Level::TRACE);

    let vars = ExecutionVars::new_local();
    let ctx = tagged_people(&vars);
    assert_eq!(3, ctx.row_num());

    let out = Unfold::unfold(ctx, 1, 2, &vars).unwrap();
    assert_eq!(4, out.row_num());

    let people = out.get(0).unwrap();
    assert_eq!(
        vec![1, 1, 3, 3],
        (0..4)
            .map(|idx| people.get_elem(idx).try_as_vertex().unwrap().vid)
            .collect::<Vec<_>>()
    );

    let tags = out.get(2).unwrap();
    assert_eq!(ContextColumnType::OptionalValue, tags.column_kind());
    assert_eq!(
        vec![true, true, true, false],
        (0..4).map(|idx| tags.has_value(idx)).collect::<Vec<_>>()
    );
    assert!(tags.get_arena().is_some());

    let (keys, groups) = tags.generate_aggregate_offset();
    assert_eq!(3, keys.size());
    assert_eq!(Value::from("rust"), keys.get_elem(0));
    assert_eq!(vec![vec![0, 2], vec![1], vec![3]], groups);
}

#[test]
fn unfold_missing_key_is_recoverable() {
    let vars = ExecutionVars::new_local();
    let ctx = tagged_people(&vars);

    let err = Unfold::unfold(ctx, 7, 2, &vars).unwrap_err();
    assert!(err.to_string().contains("unfold key 7"), "{err}");
}

#[test]
fn unfold_vertices_not_supported() {
    let vars = ExecutionVars::new_local();
    let ctx = tagged_people(&vars);

    let err = Unfold::unfold(ctx, 0, 2, &vars).unwrap_err();
    assert!(err.to_string().contains("SLVertexColumn(0)[3]"), "{err}");
}

#[test]
fn unfold_then_dedup_people() {
    let vars = ExecutionVars::new_local();
    let out = Unfold::unfold(tagged_people(&vars), 1, 1, &vars).unwrap();

    let people: &ContextColumn = out.get(0).unwrap();
    let firsts = people.generate_dedup_offset();
    assert_eq!(vec![0, 2], firsts);

    let top = out.get(1).unwrap().order_by_limit(true, 2);
    // Optional columns fall back to the general sort.
    assert_eq!(None, top);
}
