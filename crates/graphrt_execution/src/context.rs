use std::sync::Arc;

use graphrt_columns::column::ContextColumn;
use graphrt_error::{GraphError, Result};

use crate::vars::ExecutionVars;

/// Columns of the rows currently flowing through a query plan.
///
/// Columns are addressed by integer aliases assigned by the planner. Every
/// column in a context has the same number of rows.
#[derive(Debug, Clone)]
pub struct Context {
    columns: Vec<Option<Arc<ContextColumn>>>,
    verify_column_lengths: bool,
}

impl Context {
    pub fn new(vars: &ExecutionVars) -> Self {
        Context {
            columns: Vec::new(),
            verify_column_lengths: vars.verify_column_lengths(),
        }
    }

    pub fn get(&self, alias: usize) -> Option<&Arc<ContextColumn>> {
        self.columns.get(alias).and_then(|c| c.as_ref())
    }

    /// Store a column at `alias`, replacing any existing column.
    ///
    /// Errors if lengths are verified and the column's size differs from the
    /// other columns in the context.
    pub fn set(&mut self, alias: usize, column: Arc<ContextColumn>) -> Result<()> {
        if self.verify_column_lengths {
            let other = self
                .columns
                .iter()
                .enumerate()
                .find_map(|(idx, c)| if idx == alias { None } else { c.as_ref() });
            if let Some(other) = other {
                if other.size() != column.size() {
                    return Err(GraphError::new(format!(
                        "Column {} has {} rows, context has {}",
                        column.column_info(),
                        column.size(),
                        other.size()
                    )));
                }
            }
        }

        if alias >= self.columns.len() {
            self.columns.resize(alias + 1, None);
        }
        self.columns[alias] = Some(column);

        Ok(())
    }

    pub fn remove(&mut self, alias: usize) -> Option<Arc<ContextColumn>> {
        let column = self.columns.get_mut(alias)?.take();
        while matches!(self.columns.last(), Some(None)) {
            self.columns.pop();
        }
        column
    }

    /// Number of rows, 0 for a context without columns.
    pub fn row_num(&self) -> usize {
        self.columns
            .iter()
            .flatten()
            .next()
            .map(|c| c.size())
            .unwrap_or(0)
    }

    pub fn col_num(&self) -> usize {
        self.columns.iter().flatten().count()
    }

    pub fn column_aliases(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(idx, c)| c.as_ref().map(|_| idx))
    }

    /// Gather rows of every column, output row `i` is input row `offsets[i]`.
    pub fn reshuffle(&mut self, offsets: &[usize]) {
        for column in self.columns.iter_mut().flatten() {
            *column = Arc::new(column.shuffle(offsets));
        }
    }

    /// Like `reshuffle`, but `NONE_OFFSET` produces absent rows.
    pub fn optional_reshuffle(&mut self, offsets: &[usize]) {
        for column in self.columns.iter_mut().flatten() {
            *column = Arc::new(column.optional_shuffle(offsets));
        }
    }
}
