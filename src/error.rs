//! Per-domain error types.
//!
//! Each subsystem has its own `thiserror` enum; higher layers wrap lower
//! ones via `#[from]` so a `?` carries the underlying cause upward.

use std::path::PathBuf;

use thiserror::Error;

/// Failure resolving configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration `{key}`: {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("invalid value for `{key}`: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failure opening or querying the embedded store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("statement rejected: {0}")]
    Rejected(String),
}

/// Failure loading the CSV inputs into the database.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("io error for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("csv error for {path}: {source}")]
    Csv {
        path: PathBuf,
        source: csv::Error,
    },

    #[error("header layout mismatch for table `{table}` in {path}: expected {expected} columns, got {got}")]
    HeaderLayout {
        path: PathBuf,
        table: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("column count mismatch in {path} at row {row}: expected {expected}, got {got}")]
    ColumnCount {
        path: PathBuf,
        row: u64,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure in the reasoning agent / LLM adapter.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("request to reasoning service failed: {reason}")]
    RequestFailed { reason: String },

    #[error("reasoning service timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("reasoning service returned an empty response")]
    EmptyResponse,

    #[error("reached the tool-call iteration limit of {max_iterations}")]
    IterationLimit { max_iterations: usize },
}

/// Failure constructing or using the query gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// Failure starting a serving channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel startup failed: {reason}")]
    StartupFailed { reason: String },
}
