//! Intermediate representation produced by schema and query analysis

mod elements;
mod resolved_ir;

pub use elements::*;
pub use resolved_ir::{ResolvedIr, SkippedQuery, SkippedTable};
