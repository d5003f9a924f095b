//! Resolved IR handed to the emitter

use serde::Serialize;

use super::{Query, Table};

/// A table left out of the IR because its primary key cannot drive pagination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedTable {
    pub table: String,
    pub reason: String,
}

/// A query left out of the IR under the skip failure policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedQuery {
    pub query: String,
    pub reason: String,
}

/// The complete output of one generation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedIr {
    pub schema: String,
    pub tables: Vec<Table>,
    pub queries: Vec<Query>,
    pub skipped_tables: Vec<SkippedTable>,
    pub skipped_queries: Vec<SkippedQuery>,
}

impl ResolvedIr {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn query(&self, name: &str) -> Option<&Query> {
        self.queries.iter().find(|q| q.name == name)
    }
}
