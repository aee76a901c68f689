//! Clients for the remote SQL execution endpoint.
//!
//! Provides a trait-based interface so the batch executor can run against the
//! real HTTP control plane or an in-memory mock.

mod http;
mod mock;
mod observer;

pub use http::{HttpClientConfig, HttpExecutionClient};
pub use mock::MockExecutionClient;
pub use observer::{ExchangeObserver, TracingObserver};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A table reported by the endpoint's `get_tables` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Table name.
    pub name: String,
    /// Schema the table lives in, when reported.
    #[serde(default)]
    pub schema: Option<String>,
}

impl TableInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
        }
    }
}

/// Trait defining the interface for SQL execution clients.
///
/// Calls are single attempts; retrying is left to the operator.
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    /// Executes one SQL payload (a statement or a whole script).
    ///
    /// Transport failures and endpoint-reported errors are both returned as `Err`.
    async fn execute_sql(&self, sql: &str) -> Result<()>;

    /// Lists tables in `schema`. Used as a connectivity probe.
    async fn list_tables(&self, schema: &str) -> Result<Vec<TableInfo>>;

    /// Liveness probe.
    async fn health(&self) -> Result<()>;
}
