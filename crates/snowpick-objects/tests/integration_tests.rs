//! End-to-end filter cascade over a scripted session
//!
//! These tests script a small account's worth of SHOW output and drive the
//! discovery filters through the same statement sequence a live session
//! would see.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use snowpick_core::{SchemaObjectType, Table};
use snowpick_objects::{SchemaObjectFilter, SessionExt};
use snowpick_session::{MockSession, SessionError, SessionRef};

/// Script an account with two user databases plus the system ones
async fn scripted_account() -> MockSession {
    let session = MockSession::new();

    session
        .respond(
            "SHOW DATABASES IN ACCOUNT",
            Table::builder(["created_on", "name", "owner"])
                .row(["2023-01-01", "ANALYTICS", "SYSADMIN"])
                .row(["2023-01-01", "RAW", "SYSADMIN"])
                .row(["2023-01-01", "SNOWFLAKE", ""])
                .row(["2023-01-01", "SNOWFLAKE_SAMPLE_DATA", ""])
                .build()
                .unwrap(),
        )
        .await;

    session
        .respond(
            "SHOW SCHEMAS IN ACCOUNT",
            Table::builder(["name", "database_name"])
                .row(["PUBLIC", "ANALYTICS"])
                .row(["MARTS", "ANALYTICS"])
                .row(["PUBLIC", "RAW"])
                .row(["INFORMATION_SCHEMA", "ANALYTICS"])
                .row(["INFORMATION_SCHEMA", "RAW"])
                .row(["ACCOUNT_USAGE", "SNOWFLAKE"])
                .build()
                .unwrap(),
        )
        .await;

    session
        .respond(
            "SHOW TABLES IN ACCOUNT",
            Table::builder(["name", "database_name", "schema_name", "kind"])
                .row(["CUSTOMER", "ANALYTICS", "PUBLIC", "TABLE"])
                .row(["ORDERS", "ANALYTICS", "MARTS", "TABLE"])
                .row(["EVENTS_RAW", "RAW", "PUBLIC", "TABLE"])
                .row(["QUERY_HISTORY", "SNOWFLAKE", "ACCOUNT_USAGE", "TABLE"])
                .build()
                .unwrap(),
        )
        .await;

    session
        .respond(
            "SHOW VIEWS IN ACCOUNT",
            Table::builder(["name", "database_name", "schema_name"])
                .row(["CUSTOMER_V", "ANALYTICS", "PUBLIC"])
                .build()
                .unwrap(),
        )
        .await;

    session
        .respond(
            "SHOW PROCEDURES IN ACCOUNT",
            Table::builder(["catalog_name", "schema_name", "arguments"])
                .row([
                    "ANALYTICS",
                    "PUBLIC",
                    "REFRESH_MARTS(VARCHAR) RETURN VARCHAR",
                ])
                .build()
                .unwrap(),
        )
        .await;

    session
}

fn session_ref(session: &MockSession) -> SessionRef {
    Arc::new(session.clone())
}

#[tokio::test]
async fn finds_tables_across_user_databases() {
    let session = scripted_account().await;

    let found = SchemaObjectFilter::new(session_ref(&session), &[".*"], &[".*"], &[".*"], &["table"])
        .find()
        .await
        .unwrap();

    // System databases and INFORMATION_SCHEMA are ignored by default.
    let names: Vec<String> = found.iter().map(|o| o.name.clone()).collect();
    assert_eq!(names, ["CUSTOMER", "ORDERS", "EVENTS_RAW"]);
    assert!(found.iter().all(|o| o.object_type == SchemaObjectType::Table));
    assert_eq!(found[0].database, "ANALYTICS");
    assert_eq!(found[0].schema, "PUBLIC");
}

#[tokio::test]
async fn type_pattern_fans_out_across_types() {
    let session = scripted_account().await;

    let found = SchemaObjectFilter::new(
        session_ref(&session),
        &["ANALYTICS"],
        &["PUBLIC"],
        &[".*"],
        &["table", "view"],
    )
    .find()
    .await
    .unwrap();

    let names: Vec<String> = found.iter().map(|o| o.name.clone()).collect();
    assert_eq!(names, ["CUSTOMER", "CUSTOMER_V"]);
    assert_eq!(found[1].object_type, SchemaObjectType::View);
}

#[tokio::test]
async fn procedures_keep_signature_without_return_clause() {
    let session = scripted_account().await;

    let found = SchemaObjectFilter::new(
        session_ref(&session),
        &[".*"],
        &[".*"],
        &[".*"],
        &["procedure"],
    )
    .find()
    .await
    .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "REFRESH_MARTS(VARCHAR)");
    assert_eq!(found[0].object_type, SchemaObjectType::Procedure);
    assert_eq!(found[0].database, "ANALYTICS");
}

#[tokio::test]
async fn object_name_stage_narrows_matches() {
    let session = scripted_account().await;

    let found = SchemaObjectFilter::new(
        session_ref(&session),
        &[".*"],
        &[".*"],
        &["CUSTOMER"],
        &["table"],
    )
    .find()
    .await
    .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "CUSTOMER");
}

#[tokio::test]
async fn custom_ignore_lists_replace_defaults() {
    let session = scripted_account().await;

    let found = SchemaObjectFilter::new(session_ref(&session), &[".*"], &[".*"], &[".*"], &["table"])
        .with_ignore_dbs(&["RAW", "SNOWFLAKE"])
        .find()
        .await
        .unwrap();

    let names: Vec<String> = found.iter().map(|o| o.name.clone()).collect();
    assert_eq!(names, ["CUSTOMER", "ORDERS"]);
}

#[tokio::test]
async fn permission_denied_show_is_tolerated() {
    let session = scripted_account().await;
    session
        .fail(
            "SHOW ALERTS IN ACCOUNT",
            SessionError::PermissionDenied("Unsupported feature 'ALERT'".into()),
        )
        .await;

    let found = SchemaObjectFilter::new(
        session_ref(&session),
        &[".*"],
        &[".*"],
        &[".*"],
        &["alert", "table"],
    )
    .find()
    .await
    .unwrap();

    // Alerts contributed nothing; the table stage still ran.
    let names: Vec<String> = found.iter().map(|o| o.name.clone()).collect();
    assert_eq!(names, ["CUSTOMER", "ORDERS", "EVENTS_RAW"]);
}

#[tokio::test]
async fn discovered_objects_are_live_handles() {
    let session = scripted_account().await;
    session
        .respond(
            "DESCRIBE TABLE \"ANALYTICS\".\"PUBLIC\".\"CUSTOMER\"",
            Table::builder(["name", "type"])
                .row(["ID", "NUMBER(38,0)"])
                .row(["NAME", "VARCHAR"])
                .build()
                .unwrap(),
        )
        .await;

    let found = SchemaObjectFilter::new(
        session_ref(&session),
        &["ANALYTICS"],
        &["PUBLIC"],
        &["CUSTOMER"],
        &["table"],
    )
    .find()
    .await
    .unwrap();

    let described = found[0].describe().await.unwrap();
    assert_eq!(described.num_rows(), 2);
}

#[tokio::test]
async fn session_ext_builds_the_same_filter() {
    let session = scripted_account().await;
    let handle = session_ref(&session);

    let found = handle
        .schema_object_filter(&["ANALYTICS"], &["MARTS"], &[".*"], &["table"])
        .find()
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "ORDERS");
}
