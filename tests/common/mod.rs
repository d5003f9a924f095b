//! Common test utilities for querygen tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use querygen::analyzer::{AnalysisConnection, FieldDescriptor, ParameterType};
use querygen::schema::{Catalog, CatalogColumn, CatalogIndex};

/// Test project in a temporary directory
pub struct TestProject {
    /// Kept to prevent temp directory cleanup until TestProject is dropped
    _temp_dir: TempDir,
    pub project_dir: PathBuf,
}

impl TestProject {
    /// Create a project whose querygen.toml holds `config`
    pub fn new(config: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let project_dir = temp_dir.path().to_path_buf();
        fs::write(project_dir.join("querygen.toml"), config).expect("Failed to write project file");
        Self {
            _temp_dir: temp_dir,
            project_dir,
        }
    }

    /// Write a query file relative to the project directory
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        let path = self.project_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create query directory");
        }
        fs::write(&path, content).expect("Failed to write query file");
        self
    }

    pub fn project_path(&self) -> PathBuf {
        self.project_dir.join("querygen.toml")
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.project_dir.join(relative)
    }
}

// ============================================================================
// Mock catalog
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MockTable {
    pub name: String,
    pub columns: Vec<CatalogColumn>,
    pub primary_key: Vec<String>,
    pub indexes: Vec<CatalogIndex>,
}

impl MockTable {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn column(mut self, name: &str, udt_name: &str, is_nullable: bool) -> Self {
        self.columns.push(catalog_column(name, udt_name, is_nullable));
        self
    }

    pub fn array_column(mut self, name: &str, element: &str, is_nullable: bool) -> Self {
        self.columns.push(CatalogColumn {
            data_type: "ARRAY".to_string(),
            udt_name: format!("_{}", element),
            ..catalog_column(name, element, is_nullable)
        });
        self
    }

    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn index(mut self, name: &str, definition: &str, is_unique: bool) -> Self {
        self.indexes.push(CatalogIndex {
            name: name.to_string(),
            definition: definition.to_string(),
            is_unique,
        });
        self
    }
}

pub fn catalog_column(name: &str, udt_name: &str, is_nullable: bool) -> CatalogColumn {
    CatalogColumn {
        name: name.to_string(),
        data_type: udt_name.to_string(),
        udt_name: udt_name.to_string(),
        is_nullable,
        max_length: None,
        default_value: None,
    }
}

/// In-memory catalog
#[derive(Debug, Default)]
pub struct MockCatalog {
    pub tables: Vec<MockTable>,
    /// Column listing for this table fails
    pub failing_table: Option<String>,
    /// Every call sleeps this long first
    pub delay: Option<Duration>,
}

impl MockCatalog {
    pub fn new(tables: Vec<MockTable>) -> Self {
        Self {
            tables,
            ..Self::default()
        }
    }

    fn table(&self, table: &str) -> Option<&MockTable> {
        self.tables.iter().find(|t| t.name == table)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    async fn list_tables(&self, _schema: &str) -> Result<Vec<String>, sqlx::Error> {
        self.pause().await;
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    async fn list_columns(
        &self,
        _schema: &str,
        table: &str,
    ) -> Result<Vec<CatalogColumn>, sqlx::Error> {
        self.pause().await;
        if self.failing_table.as_deref() == Some(table) {
            return Err(sqlx::Error::Protocol("connection reset by peer".to_string()));
        }
        Ok(self.table(table).map(|t| t.columns.clone()).unwrap_or_default())
    }

    async fn list_primary_key(
        &self,
        _schema: &str,
        table: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        self.pause().await;
        Ok(self.table(table).map(|t| t.primary_key.clone()).unwrap_or_default())
    }

    async fn list_indexes(
        &self,
        _schema: &str,
        table: &str,
    ) -> Result<Vec<CatalogIndex>, sqlx::Error> {
        self.pause().await;
        Ok(self.table(table).map(|t| t.indexes.clone()).unwrap_or_default())
    }
}

// ============================================================================
// Mock analysis connection
// ============================================================================

/// Canned server behaviour for statements containing `pattern`
#[derive(Debug, Clone, Default)]
pub struct MockStatement {
    pub pattern: String,
    pub fields: Vec<FieldDescriptor>,
    pub parameters: Vec<ParameterType>,
    /// Server error returned by both probe and prepare
    pub error: Option<String>,
}

impl MockStatement {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            ..Self::default()
        }
    }

    pub fn field(mut self, name: &str, type_oid: u32, type_name: &str) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.to_string(),
            type_oid,
            type_name: type_name.to_string(),
        });
        self
    }

    pub fn parameter(mut self, type_oid: u32, type_name: &str) -> Self {
        self.parameters.push(ParameterType {
            type_oid,
            type_name: type_name.to_string(),
        });
        self
    }

    pub fn error(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }
}

/// Analysis connection answering from a list of canned statements
#[derive(Debug, Default)]
pub struct MockConnection {
    pub statements: Vec<MockStatement>,
    pub delay: Option<Duration>,
    /// SQL text of every probe, in call order
    pub probes: Mutex<Vec<String>>,
    /// SQL text of every rolled-back prepare, in call order
    pub prepares: Mutex<Vec<String>>,
}

impl MockConnection {
    pub fn new(statements: Vec<MockStatement>) -> Self {
        Self {
            statements,
            ..Self::default()
        }
    }

    pub fn probes(&self) -> Vec<String> {
        self.probes.lock().unwrap().clone()
    }

    pub fn prepares(&self) -> Vec<String> {
        self.prepares.lock().unwrap().clone()
    }

    async fn lookup(&self, sql: &str) -> Result<&MockStatement, sqlx::Error> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let statement = self
            .statements
            .iter()
            .find(|s| sql.contains(&s.pattern))
            .ok_or_else(|| sqlx::Error::Protocol(format!("no mock statement for: {}", sql)))?;
        match &statement.error {
            Some(message) => Err(sqlx::Error::Protocol(message.clone())),
            None => Ok(statement),
        }
    }
}

#[async_trait]
impl AnalysisConnection for MockConnection {
    async fn probe_fields(&self, sql: &str) -> Result<Vec<FieldDescriptor>, sqlx::Error> {
        self.probes.lock().unwrap().push(sql.to_string());
        Ok(self.lookup(sql).await?.fields.clone())
    }

    async fn prepare_rolled_back(&self, sql: &str) -> Result<Vec<ParameterType>, sqlx::Error> {
        self.prepares.lock().unwrap().push(sql.to_string());
        Ok(self.lookup(sql).await?.parameters.clone())
    }
}

/// Read a file to string, panicking with the path on failure
pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}
