//! Catalog access seam and its PostgreSQL implementation

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

/// Column row as reported by `information_schema.columns`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogColumn {
    pub name: String,
    /// `information_schema` data type; `ARRAY` marks an array column
    pub data_type: String,
    /// Underlying type name; array types carry a leading `_` (`_int4`)
    pub udt_name: String,
    pub is_nullable: bool,
    pub max_length: Option<i32>,
    pub default_value: Option<String>,
}

impl CatalogColumn {
    pub fn is_array(&self) -> bool {
        self.data_type.eq_ignore_ascii_case("ARRAY")
    }

    /// Scalar type name, or the element type name for arrays
    pub fn element_type(&self) -> &str {
        if self.is_array() {
            self.udt_name.strip_prefix('_').unwrap_or(&self.udt_name)
        } else {
            &self.udt_name
        }
    }
}

/// Secondary index with its textual definition (`CREATE INDEX ... ON ... (...)`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogIndex {
    pub name: String,
    pub definition: String,
    pub is_unique: bool,
}

/// Relational catalog queries used by the schema reader
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Base table names in `schema`
    async fn list_tables(&self, schema: &str) -> Result<Vec<String>, sqlx::Error>;

    /// Columns in ordinal position order
    async fn list_columns(&self, schema: &str, table: &str)
        -> Result<Vec<CatalogColumn>, sqlx::Error>;

    /// Primary key column names in key ordinal order
    async fn list_primary_key(&self, schema: &str, table: &str)
        -> Result<Vec<String>, sqlx::Error>;

    /// Indexes other than the primary key index
    async fn list_indexes(&self, schema: &str, table: &str)
        -> Result<Vec<CatalogIndex>, sqlx::Error>;
}

const LIST_TABLES_SQL: &str = "SELECT table_name::text AS table_name \
     FROM information_schema.tables \
     WHERE table_schema = $1 AND table_type = 'BASE TABLE' \
     ORDER BY table_name";

const LIST_COLUMNS_SQL: &str = "SELECT column_name::text AS column_name, \
            data_type::text AS data_type, \
            udt_name::text AS udt_name, \
            is_nullable::text = 'YES' AS is_nullable, \
            character_maximum_length::int4 AS max_length, \
            column_default::text AS column_default \
     FROM information_schema.columns \
     WHERE table_schema = $1 AND table_name = $2 \
     ORDER BY ordinal_position";

const LIST_PRIMARY_KEY_SQL: &str = "SELECT kcu.column_name::text AS column_name \
     FROM information_schema.table_constraints tc \
     JOIN information_schema.key_column_usage kcu \
       ON tc.constraint_name = kcu.constraint_name \
      AND tc.table_schema = kcu.table_schema \
      AND tc.table_name = kcu.table_name \
     WHERE tc.table_schema = $1 AND tc.table_name = $2 AND tc.constraint_type = 'PRIMARY KEY' \
     ORDER BY kcu.ordinal_position";

const LIST_INDEXES_SQL: &str = "SELECT i.indexname::text AS index_name, \
            i.indexdef AS definition, \
            ix.indisunique AS is_unique \
     FROM pg_indexes i \
     JOIN pg_namespace n ON n.nspname = i.schemaname \
     JOIN pg_class c ON c.relname = i.indexname AND c.relnamespace = n.oid \
     JOIN pg_index ix ON ix.indexrelid = c.oid \
     WHERE i.schemaname = $1 AND i.tablename = $2 AND NOT ix.indisprimary \
     ORDER BY i.indexname";

/// Catalog backed by `information_schema` and `pg_indexes` on a live pool
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn list_tables(&self, schema: &str) -> Result<Vec<String>, sqlx::Error> {
        let rows = sqlx::query(LIST_TABLES_SQL)
            .bind(schema)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|r| r.try_get("table_name")).collect()
    }

    async fn list_columns(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<CatalogColumn>, sqlx::Error> {
        let rows = sqlx::query(LIST_COLUMNS_SQL)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|r| {
                Ok(CatalogColumn {
                    name: r.try_get("column_name")?,
                    data_type: r.try_get("data_type")?,
                    udt_name: r.try_get("udt_name")?,
                    is_nullable: r.try_get("is_nullable")?,
                    max_length: r.try_get("max_length")?,
                    default_value: r.try_get("column_default")?,
                })
            })
            .collect()
    }

    async fn list_primary_key(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows = sqlx::query(LIST_PRIMARY_KEY_SQL)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|r| r.try_get("column_name")).collect()
    }

    async fn list_indexes(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<CatalogIndex>, sqlx::Error> {
        let rows = sqlx::query(LIST_INDEXES_SQL)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|r| {
                Ok(CatalogIndex {
                    name: r.try_get("index_name")?,
                    definition: r.try_get("definition")?,
                    is_unique: r.try_get("is_unique")?,
                })
            })
            .collect()
    }
}
