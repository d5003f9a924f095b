//! IR element types

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

/// Native type name given to a parameter before the database has been asked about it
pub const UNRESOLVED_PARAMETER_TYPE: &str = "unknown";

/// Table element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub schema: String,
    pub name: String,
    pub columns: Vec<Column>,
    /// Primary key column names in key ordinal order
    pub primary_key: Vec<String>,
    pub indexes: Vec<Index>,
}

impl Table {
    /// Qualified name (e.g., public.users)
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The single primary key column, if the key has exactly one column
    pub fn identifier_column(&self) -> Option<&Column> {
        match self.primary_key.as_slice() {
            [only] => self.column(only),
            _ => None,
        }
    }
}

/// Column element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    /// Catalog type name; for arrays this is the element type
    pub native_type: String,
    pub is_nullable: bool,
    pub is_array: bool,
    /// Target type descriptor filled in by the type mapper
    pub resolved_type: String,
    pub max_length: Option<i32>,
    pub default_value: Option<String>,
}

/// Index element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
}

/// Operation kind declared by a query annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// Returns at most one row
    One,
    /// Returns any number of rows
    Many,
    /// Returns no rows
    Exec,
    /// Returns one keyset page of rows
    Paginated,
}

impl QueryKind {
    /// Whether the statement must produce a result set
    pub fn returns_rows(&self) -> bool {
        !matches!(self, QueryKind::Exec)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::One => "one",
            QueryKind::Many => "many",
            QueryKind::Exec => "exec",
            QueryKind::Paginated => "paginated",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "one" => Ok(QueryKind::One),
            "many" => Ok(QueryKind::Many),
            "exec" => Ok(QueryKind::Exec),
            "paginated" => Ok(QueryKind::Paginated),
            _ => Err(format!("Unknown query kind: {}", s)),
        }
    }
}

/// Positional query parameter ($1, $2, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// 1-based placeholder number
    pub index: u32,
    pub native_type: String,
    pub resolved_type: String,
}

impl Parameter {
    pub fn unresolved(index: u32) -> Self {
        Self {
            index,
            native_type: UNRESOLVED_PARAMETER_TYPE.to_string(),
            resolved_type: String::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.native_type != UNRESOLVED_PARAMETER_TYPE
    }
}

/// Annotated SQL statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub name: String,
    pub kind: QueryKind,
    pub sql: String,
    pub parameters: Vec<Parameter>,
    /// Result columns; always empty for exec queries
    pub columns: Vec<Column>,
    pub source_file: PathBuf,
    /// 1-based line of the annotation
    pub line: usize,
}

impl Query {
    pub fn new(
        name: impl Into<String>,
        kind: QueryKind,
        sql: impl Into<String>,
        source_file: PathBuf,
        line: usize,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            sql: sql.into(),
            parameters: Vec::new(),
            columns: Vec::new(),
            source_file,
            line,
        }
    }
}
