//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. Only `JWT_SECRET` matters for security; the dev default is
//! logged loudly when used.

use std::env;

use tracing::warn;

/// REST API server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// JWT secret key for validating bearer tokens
    pub jwt_secret: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let http_port = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?;

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "stockpos.db".to_string());

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            // In production this MUST be set via environment variable
            warn!("JWT_SECRET not set; using insecure dev default");
            "stockpos-dev-secret-change-in-production".to_string()
        });

        Ok(ServerConfig {
            http_port,
            database_path,
            jwt_secret,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
