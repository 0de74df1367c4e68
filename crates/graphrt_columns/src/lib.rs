//! Columnar storage for intermediate rows flowing through graph query
//! execution.
pub mod arena;
pub mod bitmap;
pub mod builder;
pub mod column;
pub mod edge;
pub mod path;
pub mod signature;
pub mod value;
pub mod values;
pub mod vertex;

mod concat;
mod group;
mod take;
mod topk;
