//! Configuration management

use serde::{Deserialize, Serialize};

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default warehouse URL for local development.
pub const DEFAULT_WAREHOUSE_URL: &str = "postgresql://localhost/gvw";

/// Default maximum warehouse connections in the pool.
pub const DEFAULT_WAREHOUSE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum warehouse connections in the pool.
pub const DEFAULT_WAREHOUSE_MIN_CONNECTIONS: u32 = 2;

/// Default warehouse connection timeout in seconds.
pub const DEFAULT_WAREHOUSE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default warehouse idle timeout in seconds (10 minutes).
pub const DEFAULT_WAREHOUSE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default warehouse dataset (Postgres schema) that ingested tables and
/// analytics views live in.
pub const DEFAULT_WAREHOUSE_DATASET: &str = "clinvar_ingest";

/// Default project label echoed in analytics reports.
pub const DEFAULT_PROJECT: &str = "gvw-dev";

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub warehouse: WarehouseConfig,
    pub cors: CorsConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Warehouse (Postgres) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    pub url: String,
    pub dataset: String,
    pub project: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("GVW_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: std::env::var("GVW_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: std::env::var("GVW_SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            warehouse: WarehouseConfig {
                url: std::env::var("WAREHOUSE_URL")
                    .or_else(|_| std::env::var("DATABASE_URL"))
                    .unwrap_or_else(|_| DEFAULT_WAREHOUSE_URL.to_string()),
                dataset: std::env::var("WAREHOUSE_DATASET")
                    .unwrap_or_else(|_| DEFAULT_WAREHOUSE_DATASET.to_string()),
                project: std::env::var("WAREHOUSE_PROJECT")
                    .unwrap_or_else(|_| DEFAULT_PROJECT.to_string()),
                max_connections: std::env::var("WAREHOUSE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_WAREHOUSE_MAX_CONNECTIONS),
                min_connections: std::env::var("WAREHOUSE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_WAREHOUSE_MIN_CONNECTIONS),
                connect_timeout_secs: std::env::var("WAREHOUSE_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_WAREHOUSE_CONNECT_TIMEOUT_SECS),
                idle_timeout_secs: std::env::var("WAREHOUSE_IDLE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_WAREHOUSE_IDLE_TIMEOUT_SECS),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
                allow_credentials: std::env::var("CORS_ALLOW_CREDENTIALS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(true),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.warehouse.url.is_empty() {
            anyhow::bail!("Warehouse URL cannot be empty");
        }

        if self.warehouse.dataset.is_empty() {
            anyhow::bail!("Warehouse dataset cannot be empty");
        }

        if self.warehouse.max_connections == 0 {
            anyhow::bail!("Warehouse max_connections must be greater than 0");
        }

        if self.warehouse.min_connections > self.warehouse.max_connections {
            anyhow::bail!(
                "Warehouse min_connections ({}) cannot be greater than max_connections ({})",
                self.warehouse.min_connections,
                self.warehouse.max_connections
            );
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            warehouse: WarehouseConfig {
                url: DEFAULT_WAREHOUSE_URL.to_string(),
                dataset: DEFAULT_WAREHOUSE_DATASET.to_string(),
                project: DEFAULT_PROJECT.to_string(),
                max_connections: DEFAULT_WAREHOUSE_MAX_CONNECTIONS,
                min_connections: DEFAULT_WAREHOUSE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_WAREHOUSE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_WAREHOUSE_IDLE_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_pool_bounds() {
        let mut config = Config::default();
        config.warehouse.min_connections = 20;
        config.warehouse.max_connections = 5;
        assert!(config.validate().is_err());
    }
}
