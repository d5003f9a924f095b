//! Unit tests for project loading and the offline parse phase

use std::time::Duration;

use pretty_assertions::assert_eq;
use querygen::analyzer::FailurePolicy;
use querygen::error::ErrorKind;
use querygen::model::QueryKind;
use querygen::parse_project_queries;
use querygen::project::parse_project;

use crate::common::TestProject;

#[test]
fn test_offline_parse_extracts_parameters() {
    let project = TestProject::new("queries = [\"sql\"]").with_file(
        "sql/users.sql",
        "-- name: GetUser :one\nSELECT * FROM users WHERE id = $1 AND org = $2;\n\
         -- name: DeleteUser :exec\nDELETE FROM users WHERE id = $1;\n",
    );

    let loaded = parse_project(&project.project_path()).unwrap();
    let queries = parse_project_queries(&loaded).unwrap();

    let summary: Vec<_> = queries
        .iter()
        .map(|q| {
            (
                q.name.as_str(),
                q.kind,
                q.parameters.iter().map(|p| p.index).collect::<Vec<_>>(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("GetUser", QueryKind::One, vec![1, 2]),
            ("DeleteUser", QueryKind::Exec, vec![1]),
        ]
    );
    assert!(queries.iter().all(|q| q.columns.is_empty()));
}

#[test]
fn test_offline_parse_rejects_wrong_shape() {
    let project = TestProject::new("")
        .with_file("bad.sql", "-- name: Touch :exec\nSELECT now();\n");

    let loaded = parse_project(&project.project_path()).unwrap();
    let err = parse_project_queries(&loaded).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(err.to_string().contains("annotated :exec but is a SELECT"));
}

#[test]
fn test_offline_parse_reports_unterminated_literal() {
    let project = TestProject::new("")
        .with_file("bad.sql", "-- name: Broken :one\nSELECT 'oops FROM t;\n");

    let loaded = parse_project(&project.project_path()).unwrap();
    let err = parse_project_queries(&loaded).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(err.to_string().contains("bad.sql:1"), "{}", err);
}

#[test]
fn test_project_settings() {
    let project = TestProject::new(
        "schema = \"billing\"\non_query_error = \"skip\"\ntimeout_secs = 3\n",
    );
    let loaded = parse_project(&project.project_path()).unwrap();
    assert_eq!(loaded.schema, "billing");
    assert_eq!(loaded.on_query_error, FailurePolicy::Skip);
    assert_eq!(loaded.timeout, Some(Duration::from_secs(3)));
    assert!(loaded.query_files.is_empty());
}

#[test]
fn test_invalid_project_file() {
    let project = TestProject::new("schema = \"\"");
    let err = parse_project(&project.project_path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Project);

    let project = TestProject::new("[overrides.citext]\ntype = \"\"");
    let err = parse_project(&project.project_path()).unwrap_err();
    assert!(err.to_string().contains("citext"));
}
