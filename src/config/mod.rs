//! Configuration resolved from the environment.
//!
//! Every section has a `resolve()` that reads (and validates) its
//! environment variables. `Config::from_env` pulls the full set needed to
//! serve; the loader and doctor commands resolve only the sections they use.

mod database;
mod helpers;
mod http;
mod llm;

pub use database::DatabaseConfig;
pub use http::HttpConfig;
pub use llm::{DEFAULT_MAX_ITERATIONS, DEFAULT_REQUEST_TIMEOUT_SECS, LlmConfig};

use crate::error::ConfigError;

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub database: DatabaseConfig,
    pub http: HttpConfig,
}

impl Config {
    /// Resolve everything the serving process needs. Fails fast when the
    /// API credential is absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            llm: LlmConfig::resolve()?,
            database: DatabaseConfig::resolve()?,
            http: HttpConfig::resolve()?,
        })
    }
}
