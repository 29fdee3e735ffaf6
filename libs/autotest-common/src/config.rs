// Store selection shared by the API binary and tests

use crate::error::StoreResult;
use crate::store::{MemoryStore, SqliteStore, TestCaseStore};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_DATABASE_PATH: &str = "autotest.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" => Ok(StoreBackend::Memory),
            "sqlite" | "db" | "durable" => Ok(StoreBackend::Sqlite),
            other => Err(format!(
                "unknown store backend '{}', expected 'memory' or 'sqlite'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Database target for the sqlite backend
    pub database_url: String,
}

impl StoreConfig {
    pub fn new(backend: StoreBackend, database_url: impl Into<String>) -> Self {
        Self {
            backend,
            database_url: database_url.into(),
        }
    }

    /// Filesystem path (or `:memory:`) from a database url.
    /// Accepts bare paths as well as `sqlite://` / `sqlite:` prefixed urls.
    pub fn database_path(&self) -> &str {
        let url = self.database_url.trim();
        url.strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url)
    }

    /// Build the configured store
    pub fn open_store(&self) -> StoreResult<Arc<dyn TestCaseStore>> {
        match self.backend {
            StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
            StoreBackend::Sqlite => Ok(Arc::new(SqliteStore::open(self.database_path())?)),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(StoreBackend::default(), DEFAULT_DATABASE_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!(" SQLite ".parse::<StoreBackend>().unwrap(), StoreBackend::Sqlite);
        assert!("redis".parse::<StoreBackend>().is_err());
        assert_eq!(StoreBackend::Sqlite.to_string(), "sqlite");
    }

    #[test]
    fn test_database_path_strips_scheme() {
        let cfg = |url: &str| StoreConfig::new(StoreBackend::Sqlite, url);
        assert_eq!(cfg("sqlite:///tmp/app.db").database_path(), "/tmp/app.db");
        assert_eq!(cfg("sqlite://./app.db").database_path(), "./app.db");
        assert_eq!(cfg("sqlite::memory:").database_path(), ":memory:");
        assert_eq!(cfg("data/app.db").database_path(), "data/app.db");
    }

    #[tokio::test]
    async fn test_open_store_selects_backend() {
        let memory = StoreConfig::default().open_store().unwrap();
        assert_eq!(memory.backend_name(), "memory");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("select.db");
        let sqlite = StoreConfig::new(StoreBackend::Sqlite, path.to_string_lossy())
            .open_store()
            .unwrap();
        assert_eq!(sqlite.backend_name(), "sqlite");
        assert!(path.exists());
    }
}
