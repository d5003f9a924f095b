//! Live-connection seam used for type inference

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgTypeInfo};
use sqlx::{Column, Either, Executor, Statement, TypeInfo};

/// A result column as described by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Type OID; 0 when the driver did not report one
    pub type_oid: u32,
    /// Type name as reported by the driver
    pub type_name: String,
}

/// A parameter type as inferred by the server for a prepared statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterType {
    pub type_oid: u32,
    pub type_name: String,
}

impl ParameterType {
    fn from_type_info(info: &PgTypeInfo) -> Self {
        Self {
            type_oid: info.oid().map(|oid| oid.0).unwrap_or(0),
            type_name: info.name().to_string(),
        }
    }
}

/// Database operations the analyzer needs
#[async_trait]
pub trait AnalysisConnection: Send + Sync {
    /// Prepare and run a zero-row statement, returning its result fields
    async fn probe_fields(&self, sql: &str) -> Result<Vec<FieldDescriptor>, sqlx::Error>;

    /// Prepare `sql` inside a transaction that is always rolled back,
    /// returning the parameter types in positional order
    async fn prepare_rolled_back(&self, sql: &str) -> Result<Vec<ParameterType>, sqlx::Error>;
}

/// Analysis connection over a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgSession {
    pool: PgPool,
}

impl PgSession {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisConnection for PgSession {
    async fn probe_fields(&self, sql: &str) -> Result<Vec<FieldDescriptor>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        let statement = (&mut *conn).prepare(sql).await?;
        statement.query().fetch_all(&mut *conn).await?;

        Ok(statement
            .columns()
            .iter()
            .map(|column| FieldDescriptor {
                name: column.name().to_string(),
                type_oid: column.type_info().oid().map(|oid| oid.0).unwrap_or(0),
                type_name: column.type_info().name().to_string(),
            })
            .collect())
    }

    async fn prepare_rolled_back(&self, sql: &str) -> Result<Vec<ParameterType>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let prepared = (&mut *tx).prepare(sql).await;
        // Roll back before looking at the outcome so every path releases the transaction
        let rolled_back = tx.rollback().await;
        let statement = prepared?;
        rolled_back?;

        let parameters = match statement.parameters() {
            Some(Either::Left(types)) => types.iter().map(ParameterType::from_type_info).collect(),
            Some(Either::Right(count)) => (0..count)
                .map(|_| ParameterType {
                    type_oid: 0,
                    type_name: String::new(),
                })
                .collect(),
            None => Vec::new(),
        };
        Ok(parameters)
    }
}
