//! querygen: schema and query analysis for generated PostgreSQL data access code
//!
//! This library reads a live schema and a set of annotated SQL files and
//! produces a fully typed IR ready for code emission.

pub mod analyzer;
pub mod context;
pub mod error;
pub mod model;
pub mod pagination;
pub mod parser;
pub mod project;
pub mod schema;
pub mod types;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, info};

use crate::analyzer::{AnalysisConnection, FailurePolicy, PgSession, QueryAnalyzer};
use crate::context::ExecContext;
use crate::model::{Query, ResolvedIr};
use crate::project::QueryProject;
use crate::schema::{Catalog, PgCatalog, SchemaReader};
use crate::types::TypeMapper;

pub use error::{ErrorKind, QueryGenError};

/// Pool size used for analysis; all work is sequential
const ANALYSIS_POOL_SIZE: u32 = 2;

/// Options for analyzing a project
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Path to the querygen.toml file
    pub project_path: PathBuf,
    /// Connection URL; falls back to the project's `database_url_env` variable
    pub database_url: Option<String>,
}

/// Parse every query file of a project without touching the database.
///
/// Shapes are validated and parameters extracted; columns and parameter
/// types stay unresolved.
pub fn parse_project_queries(project: &QueryProject) -> Result<Vec<Query>, QueryGenError> {
    let mut queries = parser::parse_query_files(&project.query_files)?;

    for query in &mut queries {
        parser::validate_shape(query)?;
        query.parameters =
            parser::extract_parameters(&query.sql).map_err(|message| QueryGenError::ParseError {
                path: query.source_file.clone(),
                line: query.line,
                message,
            })?;
    }

    Ok(queries)
}

/// Read the schema and analyze `queries` into a resolved IR
pub async fn resolve_ir(
    schema: &str,
    queries: Vec<Query>,
    catalog: &dyn Catalog,
    conn: &dyn AnalysisConnection,
    mapper: &TypeMapper,
    ctx: &ExecContext,
    policy: FailurePolicy,
) -> Result<ResolvedIr, QueryGenError> {
    let report = SchemaReader::new(catalog, mapper, ctx)
        .list_tables(schema)
        .await?;
    debug!(
        tables = report.tables.len(),
        skipped = report.skipped.len(),
        "schema read"
    );

    let analysis = QueryAnalyzer::new(mapper, ctx)
        .analyze_all(queries, conn, policy)
        .await?;

    Ok(ResolvedIr {
        schema: schema.to_string(),
        tables: report.tables,
        queries: analysis.queries,
        skipped_tables: report.skipped,
        skipped_queries: analysis.skipped,
    })
}

/// Analyze a project against its live database
pub async fn analyze_project(options: AnalyzeOptions) -> Result<ResolvedIr> {
    // Step 1: Parse the project file
    let project = project::parse_project(&options.project_path)?;
    info!(
        project = %project.name,
        files = project.query_files.len(),
        "loaded project"
    );

    // Step 2: Parse all query files (offline checks first, so they fail fast)
    let queries = parse_project_queries(&project)?;
    info!(queries = queries.len(), "parsed queries");

    // Step 3: Connect
    let database_url = options
        .database_url
        .or_else(|| project.database_url_from_env())
        .ok_or_else(|| {
            anyhow!(
                "No database URL: pass --database-url or set {}",
                project.database_url_env
            )
        })?;

    let ctx = project.exec_context();
    let pool = ctx
        .run(
            PgPoolOptions::new()
                .max_connections(ANALYSIS_POOL_SIZE)
                .connect(&database_url),
        )
        .await
        .map_err(|interrupted| anyhow!("Failed to connect to database: {}", interrupted))?
        .context("Failed to connect to database")?;

    // Step 4: Introspect and analyze
    let catalog = PgCatalog::new(pool.clone());
    let session = PgSession::new(pool.clone());
    let mapper = project.type_mapper();
    let result = resolve_ir(
        &project.schema,
        queries,
        &catalog,
        &session,
        &mapper,
        &ctx,
        project.on_query_error,
    )
    .await;

    pool.close().await;
    let ir = result?;

    info!(
        tables = ir.tables.len(),
        queries = ir.queries.len(),
        "resolved IR"
    );
    Ok(ir)
}
