//! Native catalog type -> Rust type descriptor mapping
//!
//! Resolution order is fixed: override or base lookup, then array wrapping,
//! then nullable substitution. Nullable arrays therefore become
//! `Option<Vec<T>>` unless an override asks for nullable elements, in which
//! case they become `Vec<Option<T>>`.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use crate::model::Column;

/// Catalog type used for primary keys and pagination cursors
pub const IDENTIFIER_NATIVE_TYPE: &str = "uuid";

/// Error returned for a native type with neither an override nor a base mapping
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported native type `{0}`")]
pub struct UnsupportedType(pub String);

/// Reasons a column cannot serve as a keyset identifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidIdentifier {
    #[error("column `{column}` has type `{native_type}`, expected `uuid`")]
    NotIdentifierType { column: String, native_type: String },

    #[error("column `{column}` is nullable")]
    Nullable { column: String },

    #[error("column `{column}` is an array")]
    Array { column: String },
}

/// User-supplied replacement for a native type
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypeOverride {
    /// Rust type used in place of the base mapping
    #[serde(rename = "type")]
    pub rust_type: String,
    /// Type to use when the column is nullable (defaults to `Option<type>`)
    #[serde(default)]
    pub nullable: Option<String>,
    /// Nullable arrays of this type become `Vec<Option<T>>` instead of `Option<Vec<T>>`
    #[serde(default)]
    pub nullable_elements: bool,
}

impl TypeOverride {
    pub fn new(rust_type: impl Into<String>) -> Self {
        Self {
            rust_type: rust_type.into(),
            nullable: None,
            nullable_elements: false,
        }
    }
}

/// Maps catalog types to Rust type descriptors
///
/// The base table is static and the override table is fixed at construction,
/// so a mapper can be shared by reference across concurrent analyses.
#[derive(Debug, Clone, Default)]
pub struct TypeMapper {
    overrides: HashMap<String, TypeOverride>,
}

impl TypeMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mapper with an override table keyed by native type name
    pub fn with_overrides(overrides: HashMap<String, TypeOverride>) -> Self {
        let overrides = overrides
            .into_iter()
            .map(|(name, value)| (normalize_native_type(&name), value))
            .collect();
        Self { overrides }
    }

    /// Resolve a native type to a Rust type descriptor
    pub fn resolve(
        &self,
        native_type: &str,
        is_nullable: bool,
        is_array: bool,
    ) -> Result<String, UnsupportedType> {
        let canonical = normalize_native_type(native_type);
        let type_override = self.overrides.get(&canonical);

        let base = match type_override {
            Some(o) => o.rust_type.clone(),
            None => base_type(&canonical)
                .ok_or_else(|| UnsupportedType(native_type.to_string()))?
                .to_string(),
        };

        if is_array {
            let element = if is_nullable && type_override.is_some_and(|o| o.nullable_elements) {
                nullable_of(&base, type_override)
            } else {
                base.clone()
            };
            let sequence = format!("Vec<{}>", element);
            if is_nullable && !type_override.is_some_and(|o| o.nullable_elements) {
                return Ok(format!("Option<{}>", sequence));
            }
            return Ok(sequence);
        }

        if is_nullable {
            Ok(nullable_of(&base, type_override))
        } else {
            Ok(base)
        }
    }

    /// Resolve the type descriptor for a column
    pub fn resolve_column(&self, column: &Column) -> Result<String, UnsupportedType> {
        self.resolve(&column.native_type, column.is_nullable, column.is_array)
    }
}

/// Check that a column can be used as a primary key / pagination identifier
pub fn validate_identifier_column(column: &Column) -> Result<(), InvalidIdentifier> {
    if normalize_native_type(&column.native_type) != IDENTIFIER_NATIVE_TYPE {
        return Err(InvalidIdentifier::NotIdentifierType {
            column: column.name.clone(),
            native_type: column.native_type.clone(),
        });
    }
    if column.is_nullable {
        return Err(InvalidIdentifier::Nullable {
            column: column.name.clone(),
        });
    }
    if column.is_array {
        return Err(InvalidIdentifier::Array {
            column: column.name.clone(),
        });
    }
    Ok(())
}

/// Normalize a catalog type name: lowercase, drop `pg_catalog.` and type
/// modifiers, and fold SQL-standard spellings onto PostgreSQL names.
pub fn normalize_native_type(native_type: &str) -> String {
    let lowered = native_type.trim().to_lowercase();
    let unqualified = lowered.strip_prefix("pg_catalog.").unwrap_or(&lowered);

    // "character varying(255)" -> "character varying", "timestamp(3) with time zone" -> "timestamp with time zone"
    let mut name = String::with_capacity(unqualified.len());
    let mut depth = 0usize;
    for ch in unqualified.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => name.push(ch),
            _ => {}
        }
    }
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");

    let alias = match name.as_str() {
        "character varying" => "varchar",
        "character" | "char" => "bpchar",
        "integer" | "int" | "serial" | "serial4" => "int4",
        "smallint" | "smallserial" | "serial2" => "int2",
        "bigint" | "bigserial" | "serial8" => "int8",
        "boolean" => "bool",
        "real" => "float4",
        "double precision" | "float" => "float8",
        "decimal" => "numeric",
        "timestamp without time zone" => "timestamp",
        "timestamp with time zone" => "timestamptz",
        "time without time zone" => "time",
        "time with time zone" => "timetz",
        // The single-byte internal type, as spelled by the catalog
        "\"char\"" => "char",
        _ => return name,
    };
    alias.to_string()
}

/// Base mapping for canonical PostgreSQL type names
fn base_type(canonical: &str) -> Option<&'static str> {
    let rust_type = match canonical {
        "bool" => "bool",
        "char" => "i8",
        "int2" => "i16",
        "int4" => "i32",
        "int8" => "i64",
        "oid" => "u32",
        "float4" => "f32",
        "float8" => "f64",
        "numeric" => "rust_decimal::Decimal",
        "money" => "sqlx::postgres::types::PgMoney",
        "text" | "varchar" | "bpchar" | "name" | "citext" => "String",
        "bytea" => "Vec<u8>",
        "uuid" => "uuid::Uuid",
        "date" => "chrono::NaiveDate",
        "time" => "chrono::NaiveTime",
        "timetz" => "sqlx::postgres::types::PgTimeTz",
        "timestamp" => "chrono::NaiveDateTime",
        "timestamptz" => "chrono::DateTime<chrono::Utc>",
        "interval" => "sqlx::postgres::types::PgInterval",
        "json" | "jsonb" => "serde_json::Value",
        "inet" | "cidr" => "ipnetwork::IpNetwork",
        _ => return None,
    };
    Some(rust_type)
}

/// Nullable counterparts that differ from `Option<T>`
fn nullable_substitute(rust_type: &str) -> Option<&'static str> {
    match rust_type {
        // SQL NULL decodes to Value::Null
        "serde_json::Value" => Some("serde_json::Value"),
        _ => None,
    }
}

fn nullable_of(base: &str, type_override: Option<&TypeOverride>) -> String {
    if let Some(nullable) = type_override.and_then(|o| o.nullable.as_ref()) {
        return nullable.clone();
    }
    match nullable_substitute(base) {
        Some(substitute) => substitute.to_string(),
        None => format!("Option<{}>", base),
    }
}
