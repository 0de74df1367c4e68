use ahash::RandomState;
use graphrt_columns::value::{ElemType, Value};
use graphrt_error::{GraphError, Result};
use hashbrown::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionVar {
    pub name: &'static str,
    pub desc: &'static str,
    pub value: Value,
}

impl ExecutionVar {
    pub fn elem_type(&self) -> ElemType {
        self.value.elem_type()
    }
}

const VERIFY_COLUMN_LENGTHS: ExecutionVar = ExecutionVar {
    name: "verify_column_lengths",
    desc: "Check that columns added to a context have the context's row count",
    value: Value::Bool(true),
};

const MAX_UNFOLD_ROWS: ExecutionVar = ExecutionVar {
    name: "max_unfold_rows",
    desc: "Maximum number of rows unfold may produce, 0 for no limit",
    value: Value::UInt64(0),
};

const DEFAULT_VARS: &[ExecutionVar] = &[VERIFY_COLUMN_LENGTHS, MAX_UNFOLD_ROWS];

/// Variables controlling execution behavior.
#[derive(Debug, Clone)]
pub struct ExecutionVars {
    vars: HashMap<&'static str, ExecutionVar, RandomState>,
}

impl ExecutionVars {
    /// Create variables with every variable set to its default.
    pub fn new_local() -> Self {
        let mut vars = HashMap::with_hasher(RandomState::with_seeds(0, 0, 0, 0));
        vars.extend(DEFAULT_VARS.iter().map(|var| (var.name, var.clone())));
        ExecutionVars { vars }
    }

    pub fn get_var(&self, name: &str) -> Result<&ExecutionVar> {
        self.vars
            .get(name)
            .ok_or_else(|| GraphError::new(format!("Execution variable '{name}' does not exist")))
    }

    /// Set a variable, erroring if it doesn't exist or `value` has the wrong
    /// type.
    pub fn set_var(&mut self, name: &str, value: Value) -> Result<()> {
        let var = self
            .vars
            .get_mut(name)
            .ok_or_else(|| GraphError::new(format!("Execution variable '{name}' does not exist")))?;

        if var.elem_type() != value.elem_type() {
            return Err(GraphError::new(format!(
                "Invalid value type for '{name}': expected {}, got {}",
                var.elem_type(),
                value.elem_type()
            )));
        }

        var.value = value;
        Ok(())
    }

    pub fn reset_var(&mut self, name: &str) -> Result<()> {
        let default = DEFAULT_VARS
            .iter()
            .find(|var| var.name == name)
            .ok_or_else(|| GraphError::new(format!("Execution variable '{name}' does not exist")))?;
        self.vars.insert(default.name, default.clone());
        Ok(())
    }

    pub fn reset_all(&mut self) {
        *self = Self::new_local();
    }

    pub fn verify_column_lengths(&self) -> bool {
        match self.vars.get(VERIFY_COLUMN_LENGTHS.name) {
            Some(ExecutionVar {
                value: Value::Bool(v),
                ..
            }) => *v,
            _ => true,
        }
    }

    /// Row limit for unfold, None if unbounded.
    pub fn max_unfold_rows(&self) -> Option<u64> {
        match self.vars.get(MAX_UNFOLD_ROWS.name) {
            Some(ExecutionVar {
                value: Value::UInt64(v),
                ..
            }) if *v > 0 => Some(*v),
            _ => None,
        }
    }
}

impl Default for ExecutionVars {
    fn default() -> Self {
        Self::new_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let vars = ExecutionVars::new_local();
        assert!(vars.verify_column_lengths());
        assert_eq!(None, vars.max_unfold_rows());
        assert_eq!(
            Value::UInt64(0),
            vars.get_var("max_unfold_rows").unwrap().value
        );
    }

    #[test]
    fn set_and_reset() {
        let mut vars = ExecutionVars::new_local();
        vars.set_var("max_unfold_rows", Value::UInt64(10)).unwrap();
        assert_eq!(Some(10), vars.max_unfold_rows());

        vars.reset_var("max_unfold_rows").unwrap();
        assert_eq!(None, vars.max_unfold_rows());
    }

    #[test]
    fn set_wrong_type() {
        let mut vars = ExecutionVars::new_local();
        let err = vars
            .set_var("verify_column_lengths", Value::Int32(1))
            .unwrap_err();
        assert!(err.get_msg().contains("expected Bool"), "{err}");
        assert!(vars.verify_column_lengths());
    }

    #[test]
    fn unknown_var() {
        let mut vars = ExecutionVars::new_local();
        vars.get_var("nope").unwrap_err();
        vars.set_var("nope", Value::Bool(true)).unwrap_err();
        vars.reset_var("nope").unwrap_err();
    }

    #[test]
    fn reset_all() {
        let mut vars = ExecutionVars::new_local();
        vars.set_var("verify_column_lengths", Value::Bool(false))
            .unwrap();
        vars.reset_all();
        assert!(vars.verify_column_lengths());
    }
}
