//! End-to-end seeding tests against the mock client.

use std::io::Write;
use std::path::PathBuf;

use sql_seeder::batch::{BatchExecutor, BatchOptions, BatchPhase, ExecutionMode};
use sql_seeder::client::MockExecutionClient;
use sql_seeder::script::ScriptKind;
use sql_seeder::seeder::{Seeder, SeederOptions};
use tempfile::NamedTempFile;

const SCHEMA: &str = include_str!("../fixtures/schema.sql");

fn write_script(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{text}").unwrap();
    file
}

fn split_options() -> SeederOptions {
    SeederOptions {
        batch: BatchOptions {
            split_threshold: 0,
            health_check: false,
            progress_every: 2,
        },
        ..SeederOptions::default()
    }
}

#[tokio::test]
async fn test_seed_from_files() {
    let schema = write_script(SCHEMA);
    let seed = write_script(
        "INSERT INTO profiles (username) VALUES ('ada');\n\
         INSERT INTO profiles (username) VALUES ('grace');\n",
    );

    let client = MockExecutionClient::new().with_tables(&["profiles", "trades"]);
    let summary = Seeder::new(&client, split_options())
        .run(&[
            (ScriptKind::Schema, schema.path().to_path_buf()),
            (ScriptKind::Seed, seed.path().to_path_buf()),
        ])
        .await
        .unwrap();

    assert_eq!(summary.reports.len(), 2);
    assert_eq!(summary.statements_executed(), 9);
    assert!(summary.reports.iter().all(|r| r.mode == ExecutionMode::Split));
    assert_eq!(client.call_count(), 9);
    assert!(client.calls()[0].starts_with("CREATE EXTENSION"));
    assert!(client.calls()[8].contains("'grace'"));
}

#[tokio::test]
async fn test_small_schema_is_sent_whole() {
    let schema = write_script(SCHEMA);
    let client = MockExecutionClient::new();

    let summary = Seeder::new(&client, SeederOptions::default())
        .run(&[(ScriptKind::Schema, schema.path().to_path_buf())])
        .await
        .unwrap();

    assert_eq!(summary.reports[0].mode, ExecutionMode::SingleShot);
    assert_eq!(client.calls(), vec![SCHEMA.to_string()]);
}

#[tokio::test]
async fn test_failure_in_schema_reports_position() {
    let client = MockExecutionClient::new().failing_on_sql("CREATE TABLE IF NOT EXISTS trades");
    let executor = BatchExecutor::new(
        &client,
        BatchOptions {
            split_threshold: 0,
            ..BatchOptions::default()
        },
    );

    let report = executor.run("schema", SCHEMA).await;

    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.statement_index, 3);
    assert_eq!(failure.total_statements, 7);
    assert_eq!(failure.line, 14);
    assert!(failure.preview.starts_with("CREATE TABLE IF NOT EXISTS trades"));
    assert!(failure.preview.chars().count() <= 203);
    assert_eq!(report.final_phase(), BatchPhase::Failed);
    assert_eq!(client.call_count(), 3);
}

#[tokio::test]
async fn test_missing_seed_file_sends_nothing() {
    let schema = write_script(SCHEMA);
    let client = MockExecutionClient::new();

    let err = Seeder::new(&client, split_options())
        .run(&[
            (ScriptKind::Schema, schema.path().to_path_buf()),
            (ScriptKind::Seed, PathBuf::from("/nonexistent/seed.sql")),
        ])
        .await
        .unwrap_err();

    assert_eq!(err.category(), "Source Error");
    assert_eq!(client.call_count(), 0);
}
