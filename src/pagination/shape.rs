//! Keyset query shape for `:paginated` operations over a single table

use crate::error::QueryGenError;
use crate::model::Table;
use crate::parser::quote_identifier;
use crate::types::validate_identifier_column;

/// `SELECT <cols> FROM <source> WHERE (<cursor> IS NULL OR <id> > <cursor>) ORDER BY <id> ASC LIMIT <n>`
///
/// `$1` is the decoded cursor (NULL on the first page) and `$2` the fetch
/// limit, i.e. the page size plus one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeysetQuery {
    pub select_list: Vec<String>,
    /// Quoted, schema-qualified relation
    pub source: String,
    /// Quoted identifier column
    pub identifier: String,
}

impl KeysetQuery {
    /// Keyset query over every column of `table`, keyed by its identifier column
    pub fn for_table(table: &Table) -> Result<Self, QueryGenError> {
        let identifier = table.identifier_column().ok_or_else(|| {
            QueryGenError::pagination(format!(
                "table {} needs exactly one primary key column to paginate, found {}",
                table.full_name(),
                table.primary_key.len()
            ))
        })?;

        validate_identifier_column(identifier).map_err(|e| {
            QueryGenError::pagination(format!("table {}: {}", table.full_name(), e))
        })?;

        Ok(Self {
            select_list: table
                .columns
                .iter()
                .map(|c| quote_identifier(&c.name))
                .collect(),
            source: format!(
                "{}.{}",
                quote_identifier(&table.schema),
                quote_identifier(&table.name)
            ),
            identifier: quote_identifier(&identifier.name),
        })
    }

    /// Render the statement text
    pub fn to_sql(&self) -> String {
        let select_list = if self.select_list.is_empty() {
            "*".to_string()
        } else {
            self.select_list.join(", ")
        };
        format!(
            "SELECT {select} FROM {source} WHERE ($1::uuid IS NULL OR {id} > $1::uuid) ORDER BY {id} ASC LIMIT $2",
            select = select_list,
            source = self.source,
            id = self.identifier,
        )
    }
}
