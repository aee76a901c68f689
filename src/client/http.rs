//! HTTP client for the SQL execution control plane.
//!
//! Implements the ExecutionClient trait over three endpoints:
//! `POST /execute_postgresql`, `POST /get_tables` and `GET /health`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::client::{ExchangeObserver, ExecutionClient, TableInfo};
use crate::error::{Result, SeederError};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Maximum characters of an unstructured error body kept in error messages.
const MAX_ERROR_BODY_CHARS: usize = 500;

const EXECUTE_ENDPOINT: &str = "execute_postgresql";
const TABLES_ENDPOINT: &str = "get_tables";
const HEALTH_ENDPOINT: &str = "health";

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL of the control plane (e.g., "https://api.example.com/v1").
    pub base_url: String,
    /// Project the SQL runs against.
    pub project_ref: String,
    /// Bearer token sent with every request, if any.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl HttpClientConfig {
    /// Creates a new config for the given endpoint and project.
    pub fn new(base_url: impl Into<String>, project_ref: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            project_ref: project_ref.into(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Client for the remote SQL execution endpoint.
///
/// Holds one `reqwest::Client`, so a whole batch reuses the same connection pool.
#[derive(Clone)]
pub struct HttpExecutionClient {
    config: HttpClientConfig,
    client: Client,
    observer: Option<Arc<dyn ExchangeObserver>>,
}

impl std::fmt::Debug for HttpExecutionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExecutionClient")
            .field("base_url", &self.config.base_url)
            .field("project_ref", &self.config.project_ref)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl HttpExecutionClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SeederError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            observer: None,
        })
    }

    /// Creates a client whose exchanges are reported to `observer`.
    pub fn with_observer(
        config: HttpClientConfig,
        observer: Arc<dyn ExchangeObserver>,
    ) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.observer = Some(observer);
        Ok(client)
    }

    /// Returns the full URL for an endpoint path.
    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    async fn post(&self, endpoint: &str, body: Value) -> Result<(StatusCode, String)> {
        if let Some(observer) = &self.observer {
            observer.on_request(endpoint, Some(&body));
        }

        let mut request = self.client.post(self.endpoint_url(endpoint)).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        self.finish(endpoint, request).await
    }

    async fn finish(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, String)> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = map_transport_error(&e);
                if let Some(observer) = &self.observer {
                    observer.on_transport_error(endpoint, &err.message());
                }
                return Err(err);
            }
        };

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SeederError::transport(format!("Failed to read response: {}", e)))?;

        if let Some(observer) = &self.observer {
            observer.on_response(endpoint, status.as_u16(), &body);
        }

        Ok((status, body))
    }
}

#[async_trait]
impl ExecutionClient for HttpExecutionClient {
    async fn execute_sql(&self, sql: &str) -> Result<()> {
        let request = ExecuteRequest {
            sql,
            project_ref: &self.config.project_ref,
        };
        let (status, body) = self.post(EXECUTE_ENDPOINT, to_json(&request)?).await?;
        interpret_execute_response(status, &body)
    }

    async fn list_tables(&self, schema: &str) -> Result<Vec<TableInfo>> {
        let request = TablesRequest {
            project_ref: &self.config.project_ref,
            schema,
        };
        let (status, body) = self.post(TABLES_ENDPOINT, to_json(&request)?).await?;
        interpret_tables_response(status, &body)
    }

    async fn health(&self) -> Result<()> {
        if let Some(observer) = &self.observer {
            observer.on_request(HEALTH_ENDPOINT, None);
        }

        let mut request = self.client.get(self.endpoint_url(HEALTH_ENDPOINT));
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let (status, body) = self.finish(HEALTH_ENDPOINT, request).await?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        Ok(())
    }
}

fn to_json<T: Serialize>(request: &T) -> Result<Value> {
    serde_json::to_value(request)
        .map_err(|e| SeederError::internal(format!("Failed to encode request: {}", e)))
}

fn map_transport_error(e: &reqwest::Error) -> SeederError {
    if e.is_timeout() {
        SeederError::transport("Request timed out")
    } else if e.is_connect() {
        SeederError::transport(format!("Failed to connect to endpoint: {}", e))
    } else {
        SeederError::transport(format!("Request failed: {}", e))
    }
}

fn status_error(status: StatusCode, body: &str) -> SeederError {
    let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    SeederError::transport(format!("Endpoint returned {}: {}", status, body))
}

/// Pulls the structured `error`/`details` pair out of a response body.
///
/// A missing or `null` `error` field means the endpoint reported no error.
fn extract_error(body: &Value) -> Option<SeederError> {
    let message = match body.get("error")? {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Object(obj) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| Value::Object(obj.clone()).to_string()),
        other => other.to_string(),
    };

    let detail = match body.get("details") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    };

    Some(SeederError::execution(message, detail))
}

fn interpret_execute_response(status: StatusCode, body: &str) -> Result<()> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    if let Some(err) = parsed.as_ref().and_then(extract_error) {
        return Err(err);
    }
    if !status.is_success() {
        return Err(status_error(status, body));
    }
    Ok(())
}

fn interpret_tables_response(status: StatusCode, body: &str) -> Result<Vec<TableInfo>> {
    let parsed: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if !status.is_success() => return Err(status_error(status, body)),
        Err(e) => {
            return Err(SeederError::transport(format!(
                "Failed to parse get_tables response: {}",
                e
            )))
        }
    };

    if let Some(err) = extract_error(&parsed) {
        return Err(err);
    }
    if !status.is_success() {
        return Err(status_error(status, body));
    }

    serde_json::from_value(parsed).map_err(|e| {
        SeederError::transport(format!("Unexpected get_tables response: {}", e))
    })
}

// Control plane wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteRequest<'a> {
    sql: &'a str,
    project_ref: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TablesRequest<'a> {
    project_ref: &'a str,
    schema: &'a str,
}
