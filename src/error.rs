//! Error types for the seeder.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for seeder operations.
#[derive(Error, Debug)]
pub enum SeederError {
    /// The HTTP call itself failed (connection refused, timeout, bad status, etc.)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The endpoint accepted the call but reported an `error` field.
    #[error("Execution error: {message}")]
    Execution {
        message: String,
        detail: Option<String>,
    },

    /// Script files that are missing or unreadable.
    #[error("Source error: {0}")]
    Source(String),

    /// The remote endpoint could not be reached before execution started.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A batch stopped at a failing statement.
    #[error("Batch failed: {0}")]
    Batch(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SeederError {
    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates an execution error from the endpoint's `error` and `details` fields.
    pub fn execution(msg: impl Into<String>, detail: Option<String>) -> Self {
        Self::Execution {
            message: msg.into(),
            detail,
        }
    }

    /// Creates a source error with the given message.
    pub fn script_source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a batch error with the given summary.
    pub fn batch(msg: impl Into<String>) -> Self {
        Self::Batch(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the detail attached to an execution error, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Execution { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Returns the bare message without the category prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Transport(msg)
            | Self::Source(msg)
            | Self::Connection(msg)
            | Self::Config(msg)
            | Self::Batch(msg)
            | Self::Internal(msg) => msg.clone(),
            Self::Execution { message, .. } => message.clone(),
        }
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport(_) => "Transport Error",
            Self::Execution { .. } => "Execution Error",
            Self::Source(_) => "Source Error",
            Self::Connection(_) => "Connection Error",
            Self::Config(_) => "Configuration Error",
            Self::Batch(_) => "Batch Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using SeederError.
pub type Result<T> = std::result::Result<T, SeederError>;
