use crate::error::{RelayError, Result};
use std::env;
use std::time::Duration;

/// Reply sent for every frame received on the echo endpoint
pub const DEFAULT_ECHO_REPLY: &str = "Hallo, massa Tom!";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP/WebSocket server configuration
    pub server: ServerConfig,
    /// Chat channel configuration
    pub chat: ChatConfig,
    /// Key/value storage configuration
    pub storage: StorageConfig,
    /// Database configuration (used by the postgres storage backend)
    pub database: DatabaseConfig,
    /// Logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on (default: 1234)
    pub port: u16,
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
    /// Allowed CORS origins (comma-separated, empty = any origin)
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Period of the channel-wide log broadcast in milliseconds
    pub broadcast_interval_ms: u64,
    /// Maximum number of messages kept in the chat log
    pub log_capacity: usize,
    /// Fixed reply of the echo endpoint
    pub echo_reply: String,
}

impl ChatConfig {
    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_millis(self.broadcast_interval_ms)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            broadcast_interval_ms: 2000,
            log_capacity: 1000,
            echo_reply: DEFAULT_ECHO_REPLY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Postgres => "postgres",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Some(StorageBackend::Memory),
            "postgres" | "postgresql" | "pg" => Some(StorageBackend::Postgres),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Which key/value backend serves the LocalStorage adapter
    pub backend: StorageBackend,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database host
    pub host: String,
    /// Database port
    pub port: u16,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Database name
    pub name: String,
    /// SSL mode (disable, require, prefer)
    pub ssl_mode: String,
    /// Maximum connections in pool
    pub max_connections: u32,
    /// Minimum connections in pool
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let backend_raw = get_env_or("STORAGE_BACKEND", "memory");
        let backend = StorageBackend::parse(&backend_raw).ok_or_else(|| {
            RelayError::InvalidConfig(format!(
                "STORAGE_BACKEND must be 'memory' or 'postgres', got '{}'",
                backend_raw
            ))
        })?;

        let broadcast_interval_ms: u64 = get_env_or("CHAT_BROADCAST_INTERVAL_MS", "2000")
            .parse()
            .map_err(|_| {
                RelayError::InvalidConfig(
                    "CHAT_BROADCAST_INTERVAL_MS must be a valid number".into(),
                )
            })?;
        if broadcast_interval_ms == 0 {
            return Err(RelayError::InvalidConfig(
                "CHAT_BROADCAST_INTERVAL_MS must be greater than zero".into(),
            ));
        }

        let log_capacity: usize = get_env_or("CHAT_LOG_CAPACITY", "1000")
            .parse()
            .map_err(|_| {
                RelayError::InvalidConfig("CHAT_LOG_CAPACITY must be a valid number".into())
            })?;
        if log_capacity == 0 {
            return Err(RelayError::InvalidConfig(
                "CHAT_LOG_CAPACITY must be at least 1".into(),
            ));
        }

        Ok(Config {
            server: ServerConfig {
                port: get_env_or("SERVER_PORT", "1234").parse().map_err(|_| {
                    RelayError::InvalidConfig("SERVER_PORT must be a valid port number".into())
                })?,
                host: get_env_or("SERVER_HOST", "0.0.0.0"),
                cors_origins: get_env_or("CORS_ORIGINS", "")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            chat: ChatConfig {
                broadcast_interval_ms,
                log_capacity,
                echo_reply: get_env_or("ECHO_REPLY", DEFAULT_ECHO_REPLY),
            },
            storage: StorageConfig { backend },
            database: DatabaseConfig {
                host: get_env_or("DB_HOST", "localhost"),
                port: get_env_or("DB_PORT", "5432").parse().map_err(|_| {
                    RelayError::InvalidConfig("DB_PORT must be a valid port number".into())
                })?,
                user: get_env_or("DB_USER", "wsrelay"),
                password: get_env_or("DB_PASSWORD", "wsrelay_password"),
                name: get_env_or("DB_NAME", "wsrelay"),
                ssl_mode: get_env_or("DB_SSLMODE", "disable"),
                max_connections: get_env_or("DB_MAX_CONNECTIONS", "10")
                    .parse()
                    .map_err(|_| {
                        RelayError::InvalidConfig("DB_MAX_CONNECTIONS must be a valid number".into())
                    })?,
                min_connections: get_env_or("DB_MIN_CONNECTIONS", "1").parse().map_err(|_| {
                    RelayError::InvalidConfig("DB_MIN_CONNECTIONS must be a valid number".into())
                })?,
            },
            log: LogConfig {
                level: get_env_or("LOG_LEVEL", "info"),
                format: get_env_or("LOG_FORMAT", "pretty"),
            },
        })
    }

    /// Get the database connection URL
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.database.user,
            self.database.password,
            self.database.host,
            self.database.port,
            self.database.name,
            self.database.ssl_mode
        )
    }

    /// Get the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
