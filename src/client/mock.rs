//! Mock execution client for testing.
//!
//! Records every SQL payload it receives and fails on request.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::client::{ExecutionClient, TableInfo};
use crate::error::{Result, SeederError};

/// A mock client that records calls and returns scripted outcomes.
#[derive(Debug, Default)]
pub struct MockExecutionClient {
    calls: Mutex<Vec<String>>,
    tables: Vec<TableInfo>,
    fail_on_call: Option<usize>,
    fail_on_marker: Option<String>,
    unhealthy: bool,
    unreachable: bool,
}

impl MockExecutionClient {
    /// Creates a mock where every call succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the `n`th `execute_sql` call (1-based) with an execution error.
    pub fn failing_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// Fails any `execute_sql` call whose SQL contains `marker`.
    pub fn failing_on_sql(mut self, marker: impl Into<String>) -> Self {
        self.fail_on_marker = Some(marker.into());
        self
    }

    /// Makes `health` fail while other calls keep working.
    pub fn unhealthy(mut self) -> Self {
        self.unhealthy = true;
        self
    }

    /// Makes every call fail with a transport error.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Sets the tables returned by `list_tables`.
    pub fn with_tables(mut self, names: &[&str]) -> Self {
        self.tables = names.iter().map(|n| TableInfo::new(*n)).collect();
        self
    }

    /// Returns every SQL payload received, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Returns the number of `execute_sql` calls received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable {
            return Err(SeederError::transport(
                "Failed to connect to endpoint: connection refused",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ExecutionClient for MockExecutionClient {
    async fn execute_sql(&self, sql: &str) -> Result<()> {
        let call_number = {
            let mut calls = self
                .calls
                .lock()
                .map_err(|_| SeederError::internal("mock call log poisoned"))?;
            calls.push(sql.to_string());
            calls.len()
        };

        self.check_reachable()?;

        if self.fail_on_call == Some(call_number) {
            return Err(SeederError::execution(
                format!("mock failure on call {call_number}"),
                Some("scripted by MockExecutionClient".to_string()),
            ));
        }

        if let Some(marker) = &self.fail_on_marker {
            if sql.contains(marker.as_str()) {
                return Err(SeederError::execution(
                    format!("mock failure on statement containing '{marker}'"),
                    None,
                ));
            }
        }

        Ok(())
    }

    async fn list_tables(&self, _schema: &str) -> Result<Vec<TableInfo>> {
        self.check_reachable()?;
        Ok(self.tables.clone())
    }

    async fn health(&self) -> Result<()> {
        self.check_reachable()?;
        if self.unhealthy {
            return Err(SeederError::transport("Endpoint returned 503: unhealthy"));
        }
        Ok(())
    }
}
