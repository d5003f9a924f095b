//! Query analysis against a live connection

mod connection;
mod query_analyzer;

pub use connection::{AnalysisConnection, FieldDescriptor, ParameterType, PgSession};
pub use query_analyzer::{
    probe_statement, AnalysisReport, FailurePolicy, QueryAnalyzer, PAGINATION_IDENTIFIER,
    PROBE_NULL,
};
