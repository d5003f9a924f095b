//! Schema reader tests against the in-memory catalog

use std::collections::HashMap;
use std::time::Duration;

use pretty_assertions::assert_eq;
use querygen::context::ExecContext;
use querygen::error::{ErrorKind, QueryGenError};
use querygen::model::Index;
use querygen::pagination::KeysetQuery;
use querygen::schema::SchemaReader;
use querygen::types::{TypeMapper, TypeOverride};
use tokio_util::sync::CancellationToken;

use crate::common::{MockCatalog, MockTable};

fn users_table() -> MockTable {
    MockTable::new("users")
        .column("id", "uuid", false)
        .column("email", "varchar", false)
        .column("display_name", "text", true)
        .array_column("tags", "text", true)
        .column("created_at", "timestamptz", false)
        .primary_key(&["id"])
        .index(
            "users_email_key",
            "CREATE UNIQUE INDEX users_email_key ON public.users USING btree (email)",
            true,
        )
        .index(
            "users_created_idx",
            "CREATE INDEX users_created_idx ON public.users USING btree (created_at DESC, \"display_name\")",
            false,
        )
}

#[tokio::test]
async fn test_reads_columns_keys_and_indexes() {
    let catalog = MockCatalog::new(vec![users_table()]);
    let mapper = TypeMapper::new();
    let ctx = ExecContext::new();

    let report = SchemaReader::new(&catalog, &mapper, &ctx)
        .list_tables("public")
        .await
        .unwrap();

    assert!(report.skipped.is_empty());
    assert_eq!(report.tables.len(), 1);
    let users = &report.tables[0];
    assert_eq!(users.full_name(), "public.users");
    assert_eq!(users.primary_key, vec!["id".to_string()]);

    let columns: Vec<_> = users
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c.native_type.as_str(), c.is_array, c.resolved_type.as_str()))
        .collect();
    assert_eq!(
        columns,
        vec![
            ("id", "uuid", false, "uuid::Uuid"),
            ("email", "varchar", false, "String"),
            ("display_name", "text", false, "Option<String>"),
            ("tags", "text", true, "Option<Vec<String>>"),
            ("created_at", "timestamptz", false, "chrono::DateTime<chrono::Utc>"),
        ]
    );

    assert_eq!(
        users.indexes,
        vec![
            Index {
                name: "users_email_key".to_string(),
                columns: vec!["email".to_string()],
                is_unique: true,
            },
            Index {
                name: "users_created_idx".to_string(),
                columns: vec!["created_at".to_string(), "\"display_name\"".to_string()],
                is_unique: false,
            },
        ]
    );

    assert_eq!(users.identifier_column().map(|c| c.name.as_str()), Some("id"));
    assert!(KeysetQuery::for_table(users).is_ok());
}

#[tokio::test]
async fn test_invalid_primary_keys_are_skipped() {
    let catalog = MockCatalog::new(vec![
        users_table(),
        MockTable::new("memberships")
            .column("user_id", "uuid", false)
            .column("team_id", "uuid", false)
            .primary_key(&["user_id", "team_id"]),
        MockTable::new("counters")
            .column("id", "int8", false)
            .primary_key(&["id"]),
        MockTable::new("audit_log").column("message", "text", true),
    ]);
    let mapper = TypeMapper::new();
    let ctx = ExecContext::new();

    let report = SchemaReader::new(&catalog, &mapper, &ctx)
        .list_tables("public")
        .await
        .unwrap();

    let kept: Vec<_> = report.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(kept, vec!["users"]);

    let skipped: Vec<_> = report.skipped.iter().map(|s| s.table.as_str()).collect();
    assert_eq!(
        skipped,
        vec!["public.memberships", "public.counters", "public.audit_log"]
    );
    assert!(report.skipped[0].reason.contains("composite primary key"));
    assert!(report.skipped[1].reason.contains("expected `uuid`"));
    assert!(report.skipped[2].reason.contains("no primary key"));
}

#[tokio::test]
async fn test_skipped_table_with_unmappable_column_does_not_abort() {
    let catalog = MockCatalog::new(vec![
        users_table(),
        MockTable::new("legacy_places")
            .column("id", "int8", false)
            .column("location", "geometry", true)
            .primary_key(&["id"]),
    ]);
    let mapper = TypeMapper::new();
    let ctx = ExecContext::new();

    let report = SchemaReader::new(&catalog, &mapper, &ctx)
        .list_tables("public")
        .await
        .unwrap();

    let kept: Vec<_> = report.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(kept, vec!["users"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].table, "public.legacy_places");
    assert!(report.skipped[0].reason.contains("expected `uuid`"));
}

#[tokio::test]
async fn test_read_table_rejects_invalid_primary_key() {
    let catalog = MockCatalog::new(vec![MockTable::new("sessions")
        .column("id", "uuid", true)
        .primary_key(&["id"])]);
    let mapper = TypeMapper::new();
    let ctx = ExecContext::new();

    let err = SchemaReader::new(&catalog, &mapper, &ctx)
        .read_table("public", "sessions")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert!(err.to_string().contains("public.sessions"));
    assert!(err.to_string().contains("nullable"));
}

#[tokio::test]
async fn test_table_without_columns_aborts() {
    let catalog = MockCatalog::new(vec![users_table(), MockTable::new("ghost")]);
    let mapper = TypeMapper::new();
    let ctx = ExecContext::new();

    let err = SchemaReader::new(&catalog, &mapper, &ctx)
        .list_tables("public")
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "schema reader: public.ghost: relation has no columns"
    );
}

#[tokio::test]
async fn test_catalog_failure_names_the_table() {
    let mut catalog = MockCatalog::new(vec![users_table()]);
    catalog.failing_table = Some("users".to_string());
    let mapper = TypeMapper::new();
    let ctx = ExecContext::new();

    let err = SchemaReader::new(&catalog, &mapper, &ctx)
        .list_tables("public")
        .await
        .unwrap_err();
    assert!(matches!(err, QueryGenError::SchemaError { ref object, .. } if object == "public.users"));
    assert!(err.to_string().contains("connection reset by peer"));
}

#[tokio::test]
async fn test_unmappable_column_is_type_error() {
    let catalog = MockCatalog::new(vec![MockTable::new("places")
        .column("id", "uuid", false)
        .column("location", "geometry", true)
        .primary_key(&["id"])]);
    let ctx = ExecContext::new();

    let err = SchemaReader::new(&catalog, &TypeMapper::new(), &ctx)
        .list_tables("public")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    assert!(err.to_string().contains("public.places.location"));

    let mut overrides = HashMap::new();
    overrides.insert("geometry".to_string(), TypeOverride::new("geo_types::Geometry"));
    let mapper = TypeMapper::with_overrides(overrides);
    let report = SchemaReader::new(&catalog, &mapper, &ctx)
        .list_tables("public")
        .await
        .unwrap();
    assert_eq!(
        report.tables[0].column("location").unwrap().resolved_type,
        "Option<geo_types::Geometry>"
    );
}

#[tokio::test]
async fn test_slow_catalog_times_out() {
    let mut catalog = MockCatalog::new(vec![users_table()]);
    catalog.delay = Some(Duration::from_secs(5));
    let mapper = TypeMapper::new();
    let ctx = ExecContext::new().with_timeout(Duration::from_millis(20));

    let err = SchemaReader::new(&catalog, &mapper, &ctx)
        .list_tables("public")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn test_cancelled_read_stops() {
    let catalog = MockCatalog::new(vec![users_table()]);
    let mapper = TypeMapper::new();
    let token = CancellationToken::new();
    token.cancel();
    let ctx = ExecContext::new().with_cancellation(token);

    let err = SchemaReader::new(&catalog, &mapper, &ctx)
        .list_tables("public")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("cancelled"));
}
