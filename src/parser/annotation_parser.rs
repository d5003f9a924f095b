//! Annotated query file parsing
//!
//! A query file holds any number of statements, each introduced by an
//! annotation comment:
//!
//! ```sql
//! -- name: GetUser :one
//! SELECT id, email FROM users WHERE id = $1;
//!
//! -- name: DeleteUser :exec
//! DELETE FROM users WHERE id = $1;
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;

use super::identifier_utils::is_valid_query_name;
use super::sql_scan::is_select_shaped;
use crate::error::QueryGenError;
use crate::model::{Query, QueryKind};

/// Full annotation grammar: `-- name: <ident> :<kind>[;]`
static ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*--\s*name:\s*(\S+)\s+:(\S+?)\s*;?\s*$").unwrap());

/// Anything that starts like an annotation
static ANNOTATION_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*--\s*name:").unwrap());

/// Minimum number of files to benefit from parallel processing.
const PARALLEL_THRESHOLD: usize = 8;

/// Statement being accumulated
struct PendingQuery {
    name: String,
    kind: QueryKind,
    line: usize,
    body: Vec<String>,
}

impl PendingQuery {
    fn finish(self, path: &Path) -> Result<Query, QueryGenError> {
        let sql = self.body.join("\n").trim().to_string();
        if sql.is_empty() {
            return Err(QueryGenError::ParseError {
                path: path.to_path_buf(),
                line: self.line,
                message: format!("empty statement body for query `{}`", self.name),
            });
        }
        Ok(Query::new(
            self.name,
            self.kind,
            sql,
            path.to_path_buf(),
            self.line,
        ))
    }
}

/// Parse annotated statements out of query source text.
///
/// Returned queries are unresolved: parameters and columns are filled in by
/// the analyzer. Lines before the first annotation are ignored.
pub fn parse_queries(source: &str, path: &Path) -> Result<Vec<Query>, QueryGenError> {
    let mut queries = Vec::new();
    let mut pending: Option<PendingQuery> = None;

    for (line_idx, line) in source.lines().enumerate() {
        let line_number = line_idx + 1;

        if ANNOTATION_PREFIX_RE.is_match(line) {
            let (name, kind) = parse_annotation(line, path, line_number)?;
            if let Some(previous) = pending.take() {
                queries.push(previous.finish(path)?);
            }
            pending = Some(PendingQuery {
                name,
                kind,
                line: line_number,
                body: Vec::new(),
            });
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }

        if let Some(current) = pending.as_mut() {
            current.body.push(line.trim_end().to_string());
        }
    }

    if let Some(last) = pending.take() {
        queries.push(last.finish(path)?);
    }

    Ok(queries)
}

/// Name and kind from an annotation line
fn parse_annotation(
    line: &str,
    path: &Path,
    line_number: usize,
) -> Result<(String, QueryKind), QueryGenError> {
    let parse_error = |message: String| QueryGenError::ParseError {
        path: path.to_path_buf(),
        line: line_number,
        message,
    };

    let caps = ANNOTATION_RE.captures(line).ok_or_else(|| {
        parse_error(format!(
            "malformed annotation `{}` (expected `-- name: <Name> :one|many|exec|paginated`)",
            line.trim()
        ))
    })?;

    let name = &caps[1];
    let kind_token = &caps[2];

    let kind: QueryKind = kind_token.parse().map_err(|_| {
        parse_error(format!(
            "unknown operation kind `:{}` for query `{}` (expected one, many, exec or paginated)",
            kind_token, name
        ))
    })?;

    if !is_valid_query_name(name) {
        return Err(parse_error(format!(
            "`{}` is not a valid query name",
            name
        )));
    }

    Ok((name.to_string(), kind))
}

/// Check that a statement's SQL shape agrees with its operation kind.
///
/// Row-returning kinds must be SELECT-shaped (CTEs included); exec must not be.
pub fn validate_shape(query: &Query) -> Result<(), QueryGenError> {
    let select_shaped = is_select_shaped(&query.sql);
    let message = if query.kind.returns_rows() && !select_shaped {
        format!(
            "query `{}` is annotated :{} but is not a SELECT statement",
            query.name, query.kind
        )
    } else if !query.kind.returns_rows() && select_shaped {
        format!(
            "query `{}` is annotated :exec but is a SELECT statement; use :one, :many or :paginated",
            query.name
        )
    } else {
        return Ok(());
    };

    Err(QueryGenError::ParseError {
        path: query.source_file.clone(),
        line: query.line,
        message,
    })
}

/// Parse a single query file
pub fn parse_query_file(path: &Path) -> Result<Vec<Query>, QueryGenError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| QueryGenError::QueryFileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

    // Strip UTF-8 BOM if present
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(&content);

    parse_queries(content, path)
}

/// Parse multiple query files, using parallel processing for larger file sets.
///
/// Results keep file order. Query names must be unique across all files.
pub fn parse_query_files(files: &[PathBuf]) -> Result<Vec<Query>, QueryGenError> {
    let mut all_queries = Vec::with_capacity(files.len() * 4);

    if files.len() >= PARALLEL_THRESHOLD {
        let results: Vec<Result<Vec<Query>, QueryGenError>> =
            files.par_iter().map(|file| parse_query_file(file)).collect();

        for result in results {
            all_queries.extend(result?);
        }
    } else {
        for file in files {
            all_queries.extend(parse_query_file(file)?);
        }
    }

    check_unique_names(&all_queries)?;
    Ok(all_queries)
}

fn check_unique_names(queries: &[Query]) -> Result<(), QueryGenError> {
    let mut seen: HashMap<&str, &Query> = HashMap::with_capacity(queries.len());
    for query in queries {
        if let Some(first) = seen.insert(query.name.as_str(), query) {
            return Err(QueryGenError::ParseError {
                path: query.source_file.clone(),
                line: query.line,
                message: format!(
                    "duplicate query name `{}` (first defined at {}:{})",
                    query.name,
                    first.source_file.display(),
                    first.line
                ),
            });
        }
    }
    Ok(())
}
