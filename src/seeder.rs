//! Run orchestration: load scripts, probe the endpoint, execute in order.

use std::path::PathBuf;

use tracing::info;

use crate::batch::{self, BatchExecutor, BatchOptions, BatchReport, ExecutionMode};
use crate::client::ExecutionClient;
use crate::error::{Result, SeederError};
use crate::script::{self, Script, ScriptKind};

/// Default schema listed by the connectivity probe.
pub const DEFAULT_PROBE_SCHEMA: &str = "public";

/// Options for a full run.
#[derive(Debug, Clone)]
pub struct SeederOptions {
    /// Schema passed to `get_tables` when probing connectivity.
    pub probe_schema: String,
    pub batch: BatchOptions,
}

impl Default for SeederOptions {
    fn default() -> Self {
        Self {
            probe_schema: DEFAULT_PROBE_SCHEMA.to_string(),
            batch: BatchOptions::default(),
        }
    }
}

/// Reports of every batch that ran.
#[derive(Debug, Clone, Default)]
pub struct SeedSummary {
    pub reports: Vec<BatchReport>,
}

impl SeedSummary {
    /// Total statements executed across batches.
    pub fn statements_executed(&self) -> usize {
        self.reports.iter().map(|r| r.executed).sum()
    }
}

/// Pushes schema and seed scripts to an execution client.
pub struct Seeder<'a> {
    client: &'a dyn ExecutionClient,
    options: SeederOptions,
}

impl<'a> Seeder<'a> {
    /// Creates a new seeder.
    pub fn new(client: &'a dyn ExecutionClient, options: SeederOptions) -> Self {
        Self { client, options }
    }

    /// Loads the scripts at `targets` and runs them in order.
    ///
    /// Every script is read before anything is sent.
    pub async fn run(&self, targets: &[(ScriptKind, PathBuf)]) -> Result<SeedSummary> {
        let scripts = script::load_all(targets)?;
        self.run_scripts(&scripts).await
    }

    /// Probes connectivity, then runs already-loaded scripts in order.
    ///
    /// Stops at the first failed batch; later scripts are not started.
    pub async fn run_scripts(&self, scripts: &[Script]) -> Result<SeedSummary> {
        self.probe().await?;

        let executor = BatchExecutor::new(self.client, self.options.batch.clone());
        let mut summary = SeedSummary::default();

        for script in scripts {
            info!(
                "Running {} from {} ({} characters)",
                script.kind(),
                script.path().display(),
                script.len_chars()
            );
            let report = executor
                .run(script.kind().display_name(), script.text())
                .await
                .into_result()?;
            summary.reports.push(report);
        }

        Ok(summary)
    }

    /// Lists tables in the probe schema; any failure is fatal.
    async fn probe(&self) -> Result<()> {
        let tables = self
            .client
            .list_tables(&self.options.probe_schema)
            .await
            .map_err(|e| {
                SeederError::connection(format!("Cannot reach SQL endpoint: {}", e))
            })?;

        info!(
            "Connected; schema '{}' has {} table(s)",
            self.options.probe_schema,
            tables.len()
        );
        Ok(())
    }
}

/// Splits scripts locally and logs what would be sent, without any I/O.
///
/// Returns the number of payloads each script would produce.
pub fn dry_run(
    scripts: &[Script],
    options: &BatchOptions,
) -> Vec<(ScriptKind, ExecutionMode, usize)> {
    scripts
        .iter()
        .map(|script| {
            let (mode, statements) = batch::plan(script.text(), options.split_threshold);
            info!(
                "{}: {} payload(s), {} mode",
                script.kind(),
                statements.len(),
                mode
            );
            for (idx, statement) in statements.iter().enumerate() {
                info!(
                    "  {:>4}. line {:>5}: {}",
                    idx + 1,
                    statement.line(),
                    statement.first_line()
                );
            }
            (script.kind(), mode, statements.len())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockExecutionClient;

    fn scripts() -> Vec<Script> {
        vec![
            Script::new(
                ScriptKind::Schema,
                "schema.sql",
                "CREATE TABLE a (id int);\nCREATE TABLE b (id int);",
            ),
            Script::new(ScriptKind::Seed, "seed.sql", "INSERT INTO a VALUES (1);"),
        ]
    }

    fn split_everything() -> SeederOptions {
        SeederOptions {
            batch: BatchOptions {
                split_threshold: 0,
                ..BatchOptions::default()
            },
            ..SeederOptions::default()
        }
    }

    #[tokio::test]
    async fn test_runs_schema_then_seed() {
        let client = MockExecutionClient::new();
        let seeder = Seeder::new(&client, split_everything());

        let summary = seeder.run_scripts(&scripts()).await.unwrap();

        assert_eq!(summary.reports.len(), 2);
        assert_eq!(summary.reports[0].label, "schema");
        assert_eq!(summary.reports[1].label, "seed data");
        assert_eq!(summary.statements_executed(), 3);
        assert_eq!(
            client.calls(),
            vec![
                "CREATE TABLE a (id int);",
                "CREATE TABLE b (id int);",
                "INSERT INTO a VALUES (1);"
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_schema_skips_seed() {
        let client = MockExecutionClient::new().failing_on_sql("TABLE b");
        let seeder = Seeder::new(&client, split_everything());

        let err = seeder.run_scripts(&scripts()).await.unwrap_err();

        assert_eq!(err.category(), "Batch Error");
        assert!(err.to_string().contains("schema: statement 2/2"));
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_fatal() {
        let client = MockExecutionClient::new().unreachable();
        let seeder = Seeder::new(&client, SeederOptions::default());

        let err = seeder.run_scripts(&scripts()).await.unwrap_err();

        assert_eq!(err.category(), "Connection Error");
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_script_is_fatal_before_execution() {
        let client = MockExecutionClient::new();
        let seeder = Seeder::new(&client, SeederOptions::default());

        let err = seeder
            .run(&[(ScriptKind::Schema, PathBuf::from("/nonexistent/schema.sql"))])
            .await
            .unwrap_err();

        assert_eq!(err.category(), "Source Error");
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn test_dry_run_counts_payloads() {
        let counts = dry_run(&scripts(), &split_everything().batch);
        assert_eq!(
            counts,
            vec![
                (ScriptKind::Schema, ExecutionMode::Split, 2),
                (ScriptKind::Seed, ExecutionMode::Split, 1),
            ]
        );

        let counts = dry_run(&scripts(), &BatchOptions::default());
        assert_eq!(counts[0], (ScriptKind::Schema, ExecutionMode::SingleShot, 1));
    }
}
