// Server configuration from command line flags, falling back to environment

use autotest_common::config::{StoreBackend, StoreConfig, DEFAULT_DATABASE_PATH};
use clap::Parser;
use std::net::SocketAddr;

#[derive(Debug, Clone, Parser)]
#[command(name = "autotest-api")]
#[command(about = "Test case backend - health, CRUD and simulated runs", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind to
    #[arg(long, env = "AUTOTEST_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "AUTOTEST_PORT", default_value = "3001")]
    pub port: u16,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, env = "AUTOTEST_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "AUTOTEST_LOG_JSON", default_value = "false")]
    pub log_json: bool,

    /// Store backend: memory or sqlite
    #[arg(long, env = "AUTOTEST_STORE", default_value = "memory")]
    pub store: StoreBackend,

    /// Database target for the sqlite store (path, `sqlite://` url or `:memory:`)
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_PATH)]
    pub database_url: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.store, self.database_url.clone())
    }

    /// Collect every problem instead of stopping at the first
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("port must be non-zero".to_string());
        }
        if self.socket_addr().parse::<SocketAddr>().is_err() {
            errors.push(format!("invalid bind address '{}'", self.socket_addr()));
        }
        if self.store == StoreBackend::Sqlite && self.store_config().database_path().is_empty() {
            errors.push("database url is required for the sqlite store".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            log_level: "info".to_string(),
            log_json: false,
            store: StoreBackend::Memory,
            database_url: DEFAULT_DATABASE_PATH.to_string(),
        }
    }
}
