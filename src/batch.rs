//! Sequential batch execution with fail-fast semantics.
//!
//! A batch either sends a small script whole or splits a large one into
//! statements, then executes them strictly in order and stops at the first
//! failure.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::client::ExecutionClient;
use crate::error::{Result, SeederError};
use crate::splitter::{split_statements, Statement};

/// Scripts longer than this many characters are split before sending.
pub const DEFAULT_SPLIT_THRESHOLD: usize = 50_000;

/// Characters of a failing statement kept for diagnostics.
pub const PREVIEW_CHARS: usize = 200;

/// Default number of statements between progress log lines.
pub const DEFAULT_PROGRESS_EVERY: usize = 25;

/// Lifecycle of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    NotStarted,
    /// Best-effort liveness probe.
    Connecting,
    /// The whole script goes out as one payload.
    SingleShot,
    /// The script is being split into statements.
    Splitting,
    Executing,
    Completed,
    Failed,
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not started",
            Self::Connecting => "connecting",
            Self::SingleShot => "single shot",
            Self::Splitting => "splitting",
            Self::Executing => "executing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// How a script was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One call with the whole script.
    SingleShot,
    /// One call per statement.
    Split,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleShot => write!(f, "single shot"),
            Self::Split => write!(f, "split"),
        }
    }
}

/// Result of sending one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// 1-based position of the statement in the batch.
    pub statement_index: usize,
    pub total_statements: usize,
    pub succeeded: bool,
    pub error_message: Option<String>,
    pub error_detail: Option<String>,
}

impl ExecutionOutcome {
    /// Builds an outcome from a client result.
    pub fn from_result(
        statement_index: usize,
        total_statements: usize,
        result: &Result<()>,
    ) -> Self {
        match result {
            Ok(()) => Self {
                statement_index,
                total_statements,
                succeeded: true,
                error_message: None,
                error_detail: None,
            },
            Err(e) => Self {
                statement_index,
                total_statements,
                succeeded: false,
                error_message: Some(e.message()),
                error_detail: e.detail().map(String::from),
            },
        }
    }
}

/// Diagnostics for the statement that stopped a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFailure {
    pub statement_index: usize,
    pub total_statements: usize,
    /// Line in the script where the statement starts.
    pub line: usize,
    /// Leading characters of the statement, at most [`PREVIEW_CHARS`].
    pub preview: String,
    pub message: String,
    pub detail: Option<String>,
}

impl StatementFailure {
    fn new(outcome: ExecutionOutcome, statement: &Statement) -> Self {
        Self {
            statement_index: outcome.statement_index,
            total_statements: outcome.total_statements,
            line: statement.line(),
            preview: statement.preview(PREVIEW_CHARS),
            message: outcome
                .error_message
                .unwrap_or_else(|| "unknown error".to_string()),
            detail: outcome.error_detail,
        }
    }
}

impl fmt::Display for StatementFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "statement {}/{} (line {}) failed: {}",
            self.statement_index, self.total_statements, self.line, self.message
        )?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

/// Everything known about a finished batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub label: String,
    pub mode: ExecutionMode,
    pub total_statements: usize,
    /// Statements that succeeded before the batch ended.
    pub executed: usize,
    /// Every phase the batch went through, in order.
    pub phases: Vec<BatchPhase>,
    pub failure: Option<StatementFailure>,
    pub elapsed: Duration,
}

impl BatchReport {
    /// Returns true if every statement succeeded.
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// The phase the batch ended in.
    pub fn final_phase(&self) -> BatchPhase {
        self.phases.last().copied().unwrap_or(BatchPhase::NotStarted)
    }

    /// One-line summary for logs and errors.
    pub fn summary(&self) -> String {
        match &self.failure {
            Some(failure) => format!("{}: {}", self.label, failure),
            None => format!(
                "{}: {} statement(s) executed ({}) in {:.2?}",
                self.label, self.executed, self.mode, self.elapsed
            ),
        }
    }

    /// Converts a failed report into a batch error.
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SeederError::batch(self.summary()))
        }
    }
}

/// Tunables for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Scripts longer than this (in characters) are split.
    pub split_threshold: usize,
    /// Probe `health` before executing.
    pub health_check: bool,
    /// Emit a progress line every this many statements; 0 disables.
    pub progress_every: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            split_threshold: DEFAULT_SPLIT_THRESHOLD,
            health_check: true,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

/// Decides how `script` is sent given `split_threshold`.
///
/// Scripts longer than the threshold are split; the rest go out whole.
pub fn plan(script: &str, split_threshold: usize) -> (ExecutionMode, Vec<Statement>) {
    if script.chars().count() > split_threshold {
        return (ExecutionMode::Split, split_statements(script));
    }

    let statements = if script.trim().is_empty() {
        Vec::new()
    } else {
        vec![Statement::new(script, 1)]
    };
    (ExecutionMode::SingleShot, statements)
}

/// Runs scripts against an execution client, one statement at a time.
pub struct BatchExecutor<'a> {
    client: &'a dyn ExecutionClient,
    options: BatchOptions,
}

impl<'a> BatchExecutor<'a> {
    /// Creates a new batch executor.
    pub fn new(client: &'a dyn ExecutionClient, options: BatchOptions) -> Self {
        Self { client, options }
    }

    /// Decides how `script` is sent. A blank script yields no statements.
    pub fn plan(&self, script: &str) -> (ExecutionMode, Vec<Statement>) {
        plan(script, self.options.split_threshold)
    }

    /// Executes `script`, stopping at the first failing statement.
    pub async fn run(&self, label: &str, script: &str) -> BatchReport {
        let started = Instant::now();
        let mut phases = vec![BatchPhase::NotStarted];

        if self.options.health_check {
            phases.push(BatchPhase::Connecting);
            if let Err(e) = self.client.health().await {
                warn!(batch = label, "Health check failed, continuing: {}", e);
            }
        }

        let (mode, statements) = self.plan(script);
        phases.push(match mode {
            ExecutionMode::SingleShot => BatchPhase::SingleShot,
            ExecutionMode::Split => BatchPhase::Splitting,
        });
        phases.push(BatchPhase::Executing);

        let total = statements.len();
        info!(batch = label, %mode, statements = total, "Executing batch");

        let mut executed = 0;
        let mut failure = None;

        for (idx, statement) in statements.iter().enumerate() {
            let index = idx + 1;
            debug!(
                batch = label,
                statement = index,
                total,
                line = statement.line(),
                "Executing statement"
            );

            let result = self.client.execute_sql(statement.text()).await;
            let outcome = ExecutionOutcome::from_result(index, total, &result);

            if !outcome.succeeded {
                let stopped = StatementFailure::new(outcome, statement);
                error!(
                    batch = label,
                    statement = stopped.statement_index,
                    total = stopped.total_statements,
                    line = stopped.line,
                    preview = %stopped.preview,
                    error = %stopped.message,
                    detail = stopped.detail.as_deref().unwrap_or(""),
                    "Statement failed"
                );
                failure = Some(stopped);
                break;
            }

            executed += 1;
            if self.options.progress_every > 0
                && index % self.options.progress_every == 0
                && index < total
            {
                info!(batch = label, "Progress: {}/{} statements", index, total);
            }
        }

        phases.push(if failure.is_some() {
            BatchPhase::Failed
        } else {
            BatchPhase::Completed
        });

        let report = BatchReport {
            label: label.to_string(),
            mode,
            total_statements: total,
            executed,
            phases,
            failure,
            elapsed: started.elapsed(),
        };

        if report.is_success() {
            info!("{}", report.summary());
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockExecutionClient;
    use pretty_assertions::assert_eq;

    fn options(split_threshold: usize) -> BatchOptions {
        BatchOptions {
            split_threshold,
            health_check: true,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }

    #[tokio::test]
    async fn test_fail_fast_stops_batch() {
        let client = MockExecutionClient::new().failing_on_call(2);
        let executor = BatchExecutor::new(&client, options(0));

        let report = executor
            .run("schema", "SELECT 1;\nSELECT 2;\nSELECT 3;")
            .await;

        assert!(!report.is_success());
        let failure = report.failure.as_ref().unwrap();
        assert_eq!(failure.statement_index, 2);
        assert_eq!(failure.total_statements, 3);
        assert_eq!(failure.line, 2);
        assert_eq!(failure.preview, "SELECT 2;");
        assert_eq!(failure.detail.as_deref(), Some("scripted by MockExecutionClient"));
        assert_eq!(report.executed, 1);
        assert_eq!(client.calls(), vec!["SELECT 1;", "SELECT 2;"]);
        assert_eq!(report.final_phase(), BatchPhase::Failed);
    }

    #[tokio::test]
    async fn test_completed_phases_single_shot() {
        let client = MockExecutionClient::new();
        let executor = BatchExecutor::new(&client, options(DEFAULT_SPLIT_THRESHOLD));

        let report = executor.run("seed", "SELECT 1;\nSELECT 2;").await;

        assert!(report.is_success());
        assert_eq!(report.mode, ExecutionMode::SingleShot);
        assert_eq!(
            report.phases,
            vec![
                BatchPhase::NotStarted,
                BatchPhase::Connecting,
                BatchPhase::SingleShot,
                BatchPhase::Executing,
                BatchPhase::Completed,
            ]
        );
        assert_eq!(client.calls(), vec!["SELECT 1;\nSELECT 2;"]);
    }

    #[tokio::test]
    async fn test_phases_skip_connecting_without_health_check() {
        let client = MockExecutionClient::new().unhealthy();
        let executor = BatchExecutor::new(
            &client,
            BatchOptions {
                health_check: false,
                ..options(0)
            },
        );

        let report = executor.run("schema", "SELECT 1;\nSELECT 2;").await;

        assert!(report.is_success());
        assert_eq!(
            report.phases,
            vec![
                BatchPhase::NotStarted,
                BatchPhase::Splitting,
                BatchPhase::Executing,
                BatchPhase::Completed,
            ]
        );
    }

    #[tokio::test]
    async fn test_threshold_routing() {
        // 4999 ten-character lines plus a nine-character tail: 49,999 characters.
        let below = format!("{}SELECT 1;", "SELECT 1;\n".repeat(4999));
        assert_eq!(below.chars().count(), 49_999);

        let client = MockExecutionClient::new();
        let report = BatchExecutor::new(&client, BatchOptions::default())
            .run("small", &below)
            .await;
        assert_eq!(report.mode, ExecutionMode::SingleShot);
        assert_eq!(client.call_count(), 1);

        let above = format!("{}\n", "SELECT 1;\n".repeat(5000));
        assert_eq!(above.chars().count(), 50_001);

        let client = MockExecutionClient::new();
        let report = BatchExecutor::new(&client, BatchOptions::default())
            .run("large", &above)
            .await;
        assert_eq!(report.mode, ExecutionMode::Split);
        assert!(client.call_count() > 1);
        assert_eq!(client.call_count(), 5000);
        assert_eq!(report.phases[2], BatchPhase::Splitting);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let client = MockExecutionClient::new();
        let executor = BatchExecutor::new(&client, options(9));
        let (mode, statements) = executor.plan("SELECT 1;");
        assert_eq!(mode, ExecutionMode::SingleShot);
        assert_eq!(statements.len(), 1);

        let (mode, statements) = executor.plan("SELECT 1;\n");
        assert_eq!(mode, ExecutionMode::Split);
        assert_eq!(statements.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_script_sends_nothing() {
        let client = MockExecutionClient::new();
        let report = BatchExecutor::new(&client, BatchOptions::default())
            .run("empty", "  \n\n")
            .await;
        assert!(report.is_success());
        assert_eq!(report.total_statements, 0);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unhealthy_endpoint_does_not_abort() {
        let client = MockExecutionClient::new().unhealthy();
        let report = BatchExecutor::new(&client, options(0))
            .run("schema", "SELECT 1;")
            .await;
        assert!(report.is_success());
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_is_statement_failure() {
        let client = MockExecutionClient::new().unreachable();
        let report = BatchExecutor::new(&client, options(0))
            .run("schema", "SELECT 1;\nSELECT 2;")
            .await;
        let failure = report.failure.unwrap();
        assert_eq!(failure.statement_index, 1);
        assert!(failure.message.contains("connection refused"));
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_preview_is_bounded() {
        let long = format!("INSERT INTO t VALUES ('{}');", "x".repeat(500));
        let client = MockExecutionClient::new().failing_on_call(1);
        let report = BatchExecutor::new(&client, options(0)).run("seed", &long).await;

        let failure = report.failure.as_ref().unwrap();
        assert_eq!(failure.preview.chars().count(), PREVIEW_CHARS + 3);
        assert!(failure.preview.ends_with("..."));
        assert!(report.summary().starts_with("seed: statement 1/1 (line 1) failed"));
        assert!(report.into_result().is_err());
    }

    #[test]
    fn test_outcome_from_result() {
        let ok = ExecutionOutcome::from_result(1, 2, &Ok(()));
        assert!(ok.succeeded);
        assert_eq!(ok.error_message, None);

        let err = ExecutionOutcome::from_result(
            2,
            2,
            &Err(SeederError::execution("boom", Some("detail".to_string()))),
        );
        assert!(!err.succeeded);
        assert_eq!(err.error_message.as_deref(), Some("boom"));
        assert_eq!(err.error_detail.as_deref(), Some("detail"));
    }
}
