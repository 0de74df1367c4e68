//! Row contexts and operators that transform them.
pub mod context;
pub mod operators;
pub mod vars;
