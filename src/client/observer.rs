//! Request/response inspection for the HTTP client.
//!
//! An observer is handed to [`HttpExecutionClient`](super::HttpExecutionClient)
//! at construction time and sees every exchange with the endpoint.

use serde_json::Value;
use tracing::debug;

/// Maximum characters of a response body included in debug logs.
const MAX_LOGGED_BODY_CHARS: usize = 2000;

/// Sees each request sent to, and each response received from, the endpoint.
pub trait ExchangeObserver: Send + Sync {
    /// Called before a request is sent. `body` is `None` for GET requests.
    fn on_request(&self, endpoint: &str, body: Option<&Value>);

    /// Called after a response body has been read.
    fn on_response(&self, endpoint: &str, status: u16, body: &str);

    /// Called when the request never produced a response.
    fn on_transport_error(&self, _endpoint: &str, _error: &str) {}
}

/// Observer that logs every exchange at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ExchangeObserver for TracingObserver {
    fn on_request(&self, endpoint: &str, body: Option<&Value>) {
        match body {
            Some(body) => debug!(endpoint, request = %body, "Sending request"),
            None => debug!(endpoint, "Sending request"),
        }
    }

    fn on_response(&self, endpoint: &str, status: u16, body: &str) {
        let body: String = body.chars().take(MAX_LOGGED_BODY_CHARS).collect();
        debug!(endpoint, status, response = %body, "Received response");
    }

    fn on_transport_error(&self, endpoint: &str, error: &str) {
        debug!(endpoint, error, "Request failed");
    }
}
