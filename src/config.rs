//! Configuration module for mmllo.

use serde::Deserialize;
use std::path::Path;

use crate::{MmlloError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins. Empty means same-origin only.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Database configuration.
///
/// `path` is the relational SQLite store every deployment has. When
/// `document_path` is set, the document backend is attempted at startup and
/// preferred when it opens; a failed open degrades to the relational store
/// instead of aborting.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the relational SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Path to the document store file, if the document backend is desired.
    #[serde(default)]
    pub document_path: Option<String>,
}

fn default_db_path() -> String {
    "data/mmllo.sqlite".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            document_path: None,
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign and verify JWTs.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Token validity in days.
    #[serde(default = "default_token_validity_days")]
    pub token_validity_days: u64,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,
    /// Argon2 time cost (iterations).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
}

fn default_jwt_secret() -> String {
    // Placeholder; deployments must override this in config.toml.
    "change-me".to_string()
}

fn default_token_validity_days() -> u64 {
    7
}

fn default_argon2_memory_kib() -> u32 {
    65536
}

fn default_argon2_iterations() -> u32 {
    3
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_validity_days: default_token_validity_days(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file path; console-only when absent.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| MmlloError::Config(e.to_string()))
    }
}
