//! Query analysis: parameter extraction plus live type inference
//!
//! Row-returning statements are wrapped in a zero-row probe so the server
//! plans and types them without producing data. Every statement is then
//! prepared inside a rolled-back transaction to recover parameter types.

use std::future::Future;

use serde::Deserialize;
use tracing::{debug, warn};

use super::connection::AnalysisConnection;
use crate::context::ExecContext;
use crate::error::QueryGenError;
use crate::model::{Column, Query, QueryKind, SkippedQuery};
use crate::parser::{extract_parameters, strip_trailing_terminator, substitute_placeholders};
use crate::types::{native_type, validate_identifier_column, NativeType, TypeMapper};

/// Literal standing in for every placeholder in a probe statement
pub const PROBE_NULL: &str = "NULL";

/// Result column a `:paginated` query must return as its keyset cursor
pub const PAGINATION_IDENTIFIER: &str = "id";

/// What a batch does when one query fails analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failing query
    #[default]
    Abort,
    /// Leave the query out of the IR and keep going
    Skip,
}

/// Queries that analyzed cleanly, plus the ones left out
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    pub queries: Vec<Query>,
    pub skipped: Vec<SkippedQuery>,
}

/// Wrap a statement as a subquery that yields no rows
pub fn probe_statement(sql: &str) -> String {
    format!(
        "SELECT * FROM (\n{}\n) AS probe LIMIT 0",
        strip_trailing_terminator(sql)
    )
}

/// A paginated query must return a scalar uuid identifier column.
///
/// Inferred result columns are always nullable, so only type and array-ness are checked.
fn check_pagination_identifier(query: &Query) -> Result<(), QueryGenError> {
    let column = query
        .columns
        .iter()
        .find(|c| c.name == PAGINATION_IDENTIFIER)
        .ok_or_else(|| {
            QueryGenError::analysis(
                &query.name,
                format!(
                    "paginated query must return an `{}` column of type uuid",
                    PAGINATION_IDENTIFIER
                ),
            )
        })?;

    validate_identifier_column(&Column {
        is_nullable: false,
        ..column.clone()
    })
    .map_err(|e| QueryGenError::analysis(&query.name, format!("paginated query {}", e)))
}

pub struct QueryAnalyzer<'a> {
    mapper: &'a TypeMapper,
    ctx: &'a ExecContext,
}

impl<'a> QueryAnalyzer<'a> {
    pub fn new(mapper: &'a TypeMapper, ctx: &'a ExecContext) -> Self {
        Self { mapper, ctx }
    }

    /// Fill in `query.parameters` and `query.columns`.
    ///
    /// `None` for the query is a no-op. A connection is required for every
    /// kind; its absence is an analysis error.
    pub async fn analyze(
        &self,
        query: Option<&mut Query>,
        conn: Option<&dyn AnalysisConnection>,
    ) -> Result<(), QueryGenError> {
        let Some(query) = query else {
            return Ok(());
        };

        query.parameters = extract_parameters(&query.sql)
            .map_err(|e| QueryGenError::analysis(&query.name, e))?;
        query.columns.clear();

        let conn = conn.ok_or_else(|| {
            QueryGenError::analysis(
                &query.name,
                format!("a live database connection is required to analyze :{} queries", query.kind),
            )
        })?;

        if query.kind.returns_rows() {
            query.columns = self.infer_columns(query, conn).await?;
        }
        if query.kind == QueryKind::Paginated {
            check_pagination_identifier(query)?;
        }
        self.resolve_parameters(query, conn).await?;

        debug!(
            query = %query.name,
            kind = %query.kind,
            parameters = query.parameters.len(),
            columns = query.columns.len(),
            "analyzed query"
        );
        Ok(())
    }

    /// Analyze a batch in order, applying `policy` to failures
    pub async fn analyze_all(
        &self,
        queries: Vec<Query>,
        conn: &dyn AnalysisConnection,
        policy: FailurePolicy,
    ) -> Result<AnalysisReport, QueryGenError> {
        let mut report = AnalysisReport::default();

        for mut query in queries {
            match self.analyze(Some(&mut query), Some(conn)).await {
                Ok(()) => report.queries.push(query),
                Err(e) if policy == FailurePolicy::Skip && !self.ctx.cancellation_token().is_cancelled() => {
                    warn!(query = %query.name, error = %e, "skipping query");
                    report.skipped.push(SkippedQuery {
                        query: query.name,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    /// Result columns from the zero-row probe; all are nullable
    async fn infer_columns(
        &self,
        query: &Query,
        conn: &dyn AnalysisConnection,
    ) -> Result<Vec<Column>, QueryGenError> {
        let substituted = substitute_placeholders(&query.sql, PROBE_NULL)
            .map_err(|e| QueryGenError::analysis(&query.name, e))?;
        let probe = probe_statement(&substituted);

        let fields = self
            .round_trip(&query.name, conn.probe_fields(&probe))
            .await?;

        fields
            .into_iter()
            .map(|field| {
                let NativeType { name, is_array } = native_type(field.type_oid, &field.type_name);
                let resolved_type = self.mapper.resolve(&name, true, is_array).map_err(|e| {
                    QueryGenError::TypeError {
                        object: format!("{}.{}", query.name, field.name),
                        native_type: e.0,
                    }
                })?;
                Ok(Column {
                    name: field.name,
                    native_type: name,
                    is_nullable: true,
                    is_array,
                    resolved_type,
                    max_length: None,
                    default_value: None,
                })
            })
            .collect()
    }

    /// Prepare the statement in a rolled-back transaction and backfill parameter types
    async fn resolve_parameters(
        &self,
        query: &mut Query,
        conn: &dyn AnalysisConnection,
    ) -> Result<(), QueryGenError> {
        let statement = strip_trailing_terminator(&query.sql);
        let types = self
            .round_trip(&query.name, conn.prepare_rolled_back(statement))
            .await?;

        if types.len() != query.parameters.len() {
            return Err(QueryGenError::analysis(
                &query.name,
                format!(
                    "statement text has {} parameter(s) but the prepared statement has {}",
                    query.parameters.len(),
                    types.len()
                ),
            ));
        }

        for (parameter, parameter_type) in query.parameters.iter_mut().zip(types) {
            let NativeType { name, is_array } =
                native_type(parameter_type.type_oid, &parameter_type.type_name);
            parameter.resolved_type = self.mapper.resolve(&name, false, is_array).map_err(|e| {
                QueryGenError::TypeError {
                    object: format!("{}.${}", query.name, parameter.index),
                    native_type: e.0,
                }
            })?;
            parameter.native_type = if is_array { format!("{}[]", name) } else { name };
        }
        Ok(())
    }

    /// One round trip under the caller's cancellation and timeout
    async fn round_trip<T, F>(&self, query: &str, fut: F) -> Result<T, QueryGenError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match self.ctx.run(fut).await {
            Ok(result) => result.map_err(|e| QueryGenError::analysis(query, e.to_string())),
            Err(interrupted) => Err(QueryGenError::analysis(query, interrupted.to_string())),
        }
    }
}
