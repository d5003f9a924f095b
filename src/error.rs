//! Error types for querygen

use std::path::PathBuf;
use thiserror::Error;

/// The five failure families surfaced by the analysis engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Schema,
    Parse,
    Type,
    Analysis,
    Pagination,
    /// Project file and query file I/O
    Project,
}

/// Errors that can occur while introspecting, parsing or analyzing
#[derive(Error, Debug)]
pub enum QueryGenError {
    #[error("schema reader: {object}: {message}")]
    SchemaError { object: String, message: String },

    #[error("query parser: {}:{line}: {message}", path.display())]
    ParseError {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("type mapper: {object}: unsupported native type `{native_type}`")]
    TypeError { object: String, native_type: String },

    #[error("query analyzer: {query}: {message}")]
    AnalysisError { query: String, message: String },

    #[error("pagination: {message}")]
    PaginationError { message: String },

    #[error("Failed to read query file: {}", path.display())]
    QueryFileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read project file: {}", path.display())]
    ProjectReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse project file: {}", path.display())]
    ProjectParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid project file: {message}")]
    InvalidProject { message: String },
}

impl QueryGenError {
    /// Which failure family this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryGenError::SchemaError { .. } => ErrorKind::Schema,
            QueryGenError::ParseError { .. } => ErrorKind::Parse,
            QueryGenError::TypeError { .. } => ErrorKind::Type,
            QueryGenError::AnalysisError { .. } => ErrorKind::Analysis,
            QueryGenError::PaginationError { .. } => ErrorKind::Pagination,
            QueryGenError::QueryFileReadError { .. }
            | QueryGenError::ProjectReadError { .. }
            | QueryGenError::ProjectParseError { .. }
            | QueryGenError::InvalidProject { .. } => ErrorKind::Project,
        }
    }

    pub(crate) fn schema(object: impl Into<String>, message: impl Into<String>) -> Self {
        QueryGenError::SchemaError {
            object: object.into(),
            message: message.into(),
        }
    }

    pub(crate) fn analysis(query: impl Into<String>, message: impl Into<String>) -> Self {
        QueryGenError::AnalysisError {
            query: query.into(),
            message: message.into(),
        }
    }

    pub(crate) fn pagination(message: impl Into<String>) -> Self {
        QueryGenError::PaginationError {
            message: message.into(),
        }
    }
}
