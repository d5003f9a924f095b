//! Schema reader: catalog rows -> typed `Table` IR

use std::future::Future;

use tracing::{debug, warn};

use super::catalog::{Catalog, CatalogColumn, CatalogIndex};
use crate::context::ExecContext;
use crate::error::QueryGenError;
use crate::model::{Column, Index, SkippedTable, Table};
use crate::parser::parse_index_columns;
use crate::types::{validate_identifier_column, TypeMapper};

/// Tables read from one schema, plus the ones left out
#[derive(Debug, Clone, Default)]
pub struct SchemaReport {
    pub tables: Vec<Table>,
    pub skipped: Vec<SkippedTable>,
}

/// Reads tables through a [`Catalog`], resolving column types as it goes
pub struct SchemaReader<'a> {
    catalog: &'a dyn Catalog,
    mapper: &'a TypeMapper,
    ctx: &'a ExecContext,
}

impl<'a> SchemaReader<'a> {
    pub fn new(catalog: &'a dyn Catalog, mapper: &'a TypeMapper, ctx: &'a ExecContext) -> Self {
        Self {
            catalog,
            mapper,
            ctx,
        }
    }

    /// Read every base table in `schema`.
    ///
    /// Tables whose primary key cannot serve as an identifier are skipped with
    /// a warning before any of their column types are resolved. Catalog
    /// failures, column-less tables and unmappable column types on kept
    /// tables abort the read.
    pub async fn list_tables(&self, schema: &str) -> Result<SchemaReport, QueryGenError> {
        let names = self
            .round_trip(schema, self.catalog.list_tables(schema))
            .await?;
        debug!(schema, tables = names.len(), "listed tables");

        let mut report = SchemaReport::default();
        for name in names {
            let full_name = format!("{}.{}", schema, name);
            let (columns, primary_key) = self.load_keyed_columns(schema, &name, &full_name).await?;
            if let Err(reason) = check_primary_key(&columns, &primary_key) {
                warn!(table = %full_name, %reason, "skipping table");
                report.skipped.push(SkippedTable {
                    table: full_name,
                    reason,
                });
                continue;
            }
            let table = self
                .finish_table(schema, &name, &full_name, columns, primary_key)
                .await?;
            report.tables.push(table);
        }
        Ok(report)
    }

    /// Read a single table; an unusable primary key is an error here
    pub async fn read_table(&self, schema: &str, name: &str) -> Result<Table, QueryGenError> {
        let full_name = format!("{}.{}", schema, name);
        let (columns, primary_key) = self.load_keyed_columns(schema, name, &full_name).await?;
        check_primary_key(&columns, &primary_key)
            .map_err(|reason| QueryGenError::schema(&full_name, reason))?;
        self.finish_table(schema, name, &full_name, columns, primary_key)
            .await
    }

    /// Columns (types not yet resolved) and primary key of one table
    async fn load_keyed_columns(
        &self,
        schema: &str,
        name: &str,
        full_name: &str,
    ) -> Result<(Vec<Column>, Vec<String>), QueryGenError> {
        let catalog_columns = self
            .round_trip(full_name, self.catalog.list_columns(schema, name))
            .await?;
        if catalog_columns.is_empty() {
            return Err(QueryGenError::schema(full_name, "relation has no columns"));
        }

        let primary_key = self
            .round_trip(full_name, self.catalog.list_primary_key(schema, name))
            .await?;

        Ok((catalog_columns.iter().map(unresolved_column).collect(), primary_key))
    }

    /// Resolve column types and read indexes for a table that passed the key check
    async fn finish_table(
        &self,
        schema: &str,
        name: &str,
        full_name: &str,
        mut columns: Vec<Column>,
        primary_key: Vec<String>,
    ) -> Result<Table, QueryGenError> {
        for column in &mut columns {
            column.resolved_type = self
                .mapper
                .resolve(&column.native_type, column.is_nullable, column.is_array)
                .map_err(|e| QueryGenError::TypeError {
                    object: format!("{}.{}", full_name, column.name),
                    native_type: e.0,
                })?;
        }

        let indexes = self
            .round_trip(full_name, self.catalog.list_indexes(schema, name))
            .await?
            .iter()
            .map(|i| index(full_name, i))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            table = %full_name,
            columns = columns.len(),
            indexes = indexes.len(),
            "read table"
        );

        Ok(Table {
            schema: schema.to_string(),
            name: name.to_string(),
            columns,
            primary_key,
            indexes,
        })
    }

    /// One catalog round trip under the caller's cancellation and timeout
    async fn round_trip<T, F>(&self, object: &str, fut: F) -> Result<T, QueryGenError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match self.ctx.run(fut).await {
            Ok(result) => result.map_err(|e| QueryGenError::schema(object, e.to_string())),
            Err(interrupted) => Err(QueryGenError::schema(object, interrupted.to_string())),
        }
    }
}

fn unresolved_column(catalog_column: &CatalogColumn) -> Column {
    Column {
        name: catalog_column.name.clone(),
        native_type: catalog_column.element_type().to_string(),
        is_nullable: catalog_column.is_nullable,
        is_array: catalog_column.is_array(),
        resolved_type: String::new(),
        max_length: catalog_column.max_length,
        default_value: catalog_column.default_value.clone(),
    }
}

fn index(table: &str, catalog_index: &CatalogIndex) -> Result<Index, QueryGenError> {
    let columns = parse_index_columns(&catalog_index.definition).ok_or_else(|| {
        QueryGenError::schema(
            format!("{}.{}", table, catalog_index.name),
            format!(
                "cannot read column list from index definition `{}`",
                catalog_index.definition
            ),
        )
    })?;

    Ok(Index {
        name: catalog_index.name.clone(),
        columns,
        is_unique: catalog_index.is_unique,
    })
}

/// The primary key must be a single non-null scalar identifier column
fn check_primary_key(columns: &[Column], primary_key: &[String]) -> Result<(), String> {
    let column_name = match primary_key {
        [] => return Err("table has no primary key".to_string()),
        [only] => only,
        many => {
            return Err(format!(
                "composite primary key ({}) is not supported",
                many.join(", ")
            ))
        }
    };

    let column = columns
        .iter()
        .find(|c| &c.name == column_name)
        .ok_or_else(|| format!("primary key column `{}` not found", column_name))?;

    validate_identifier_column(column).map_err(|e| format!("primary key {}", e))
}
