//! Parser for querygen.toml project files

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::analyzer::FailurePolicy;
use crate::context::ExecContext;
use crate::error::QueryGenError;
use crate::types::{TypeMapper, TypeOverride};

/// Default project file name
pub const PROJECT_FILE_NAME: &str = "querygen.toml";

const DEFAULT_SCHEMA: &str = "public";
const DEFAULT_DATABASE_URL_ENV: &str = "DATABASE_URL";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// On-disk shape of the project file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectFile {
    #[serde(default = "default_schema")]
    schema: String,
    /// Glob patterns, files or directories, relative to the project file
    #[serde(default)]
    queries: Vec<String>,
    /// Glob patterns removed from the resolved query file list
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default = "default_database_url_env")]
    database_url_env: String,
    #[serde(default)]
    on_query_error: FailurePolicy,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    #[serde(default)]
    overrides: HashMap<String, TypeOverride>,
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_database_url_env() -> String {
    DEFAULT_DATABASE_URL_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Parsed query project
#[derive(Debug, Clone)]
pub struct QueryProject {
    /// Project name (file stem of the project directory)
    pub name: String,
    /// Directory containing the project file
    pub project_dir: PathBuf,
    /// Schema to introspect
    pub schema: String,
    /// Query files, sorted and de-duplicated
    pub query_files: Vec<PathBuf>,
    /// Environment variable holding the connection URL
    pub database_url_env: String,
    pub on_query_error: FailurePolicy,
    /// Per round trip timeout; `None` disables it
    pub timeout: Option<Duration>,
    pub overrides: HashMap<String, TypeOverride>,
}

impl QueryProject {
    pub fn type_mapper(&self) -> TypeMapper {
        TypeMapper::with_overrides(self.overrides.clone())
    }

    pub fn exec_context(&self) -> ExecContext {
        match self.timeout {
            Some(timeout) => ExecContext::new().with_timeout(timeout),
            None => ExecContext::new(),
        }
    }

    /// Connection URL from the configured environment variable
    pub fn database_url_from_env(&self) -> Option<String> {
        std::env::var(&self.database_url_env)
            .ok()
            .filter(|url| !url.trim().is_empty())
    }
}

/// Parse a querygen.toml file and resolve its query files
pub fn parse_project(path: &Path) -> Result<QueryProject, QueryGenError> {
    let content = std::fs::read_to_string(path).map_err(|e| QueryGenError::ProjectReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let file: ProjectFile = toml::from_str(&content).map_err(|e| QueryGenError::ProjectParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let project_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
    let name = project_dir
        .canonicalize()
        .ok()
        .and_then(|dir| dir.file_name().and_then(|s| s.to_str()).map(str::to_string))
        .unwrap_or_else(|| "queries".to_string());

    let schema = file.schema.trim().to_string();
    if schema.is_empty() {
        return Err(invalid("`schema` must not be empty"));
    }
    if file.database_url_env.trim().is_empty() {
        return Err(invalid("`database_url_env` must not be empty"));
    }
    for (native_type, type_override) in &file.overrides {
        if type_override.rust_type.trim().is_empty() {
            return Err(invalid(format!(
                "override for `{}` has an empty `type`",
                native_type
            )));
        }
    }

    let query_files = find_query_files(&file.queries, &file.exclude, &project_dir)?;

    let timeout = match file.timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    Ok(QueryProject {
        name,
        project_dir,
        schema,
        query_files,
        database_url_env: file.database_url_env,
        on_query_error: file.on_query_error,
        timeout,
        overrides: file.overrides,
    })
}

fn invalid(message: impl Into<String>) -> QueryGenError {
    QueryGenError::InvalidProject {
        message: message.into(),
    }
}

fn is_sql_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"))
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Every `.sql` file below `dir`, skipping hidden and `target` directories
fn walk_sql_files(dir: &Path, files: &mut Vec<PathBuf>) {
    let walker = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with('.') || name == "target")
        });

    for entry in walker.filter_map(|e| e.ok()) {
        if entry.file_type().is_file() && is_sql_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
}

fn find_query_files(
    queries: &[String],
    exclude: &[String],
    project_dir: &Path,
) -> Result<Vec<PathBuf>, QueryGenError> {
    let mut query_files = Vec::new();

    for entry in queries {
        let entry = entry.replace('\\', "/");
        if is_glob(&entry) {
            let pattern = project_dir.join(&entry);
            let paths = glob::glob(&pattern.to_string_lossy())
                .map_err(|e| invalid(format!("invalid query pattern `{}`: {}", entry, e)))?;
            for path in paths.filter_map(|p| p.ok()) {
                if path.is_dir() {
                    walk_sql_files(&path, &mut query_files);
                } else if is_sql_file(&path) {
                    query_files.push(path);
                }
            }
        } else {
            let path = project_dir.join(&entry);
            if path.is_dir() {
                walk_sql_files(&path, &mut query_files);
            } else if path.is_file() {
                query_files.push(path);
            } else {
                return Err(invalid(format!("query path `{}` does not exist", entry)));
            }
        }
    }

    // No explicit entries: every .sql file under the project directory
    if queries.is_empty() {
        walk_sql_files(project_dir, &mut query_files);
    }

    if !exclude.is_empty() {
        let matchers = exclude
            .iter()
            .map(|pattern| {
                let full = project_dir.join(pattern.replace('\\', "/"));
                glob::Pattern::new(&full.to_string_lossy())
                    .map_err(|e| invalid(format!("invalid exclude pattern `{}`: {}", pattern, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        query_files.retain(|file| !matchers.iter().any(|m| m.matches_path(file)));
    }

    query_files.sort();
    query_files.dedup();
    Ok(query_files)
}
