//! Catalog introspection

mod catalog;
mod reader;

pub use catalog::{Catalog, CatalogColumn, CatalogIndex, PgCatalog};
pub use reader::{SchemaReader, SchemaReport};
