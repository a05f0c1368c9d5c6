use crate::config::helpers::{optional_env, parse_optional_env};
use crate::error::ConfigError;

/// Bind address for the HTTP front door.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl HttpConfig {
    pub(crate) fn resolve() -> Result<Self, ConfigError> {
        let host = optional_env("HOST")?.unwrap_or_else(|| "0.0.0.0".to_string());
        // PORT is the variable cloud platforms inject.
        let port = parse_optional_env("PORT", 8082)?;

        Ok(Self { host, port })
    }
}
