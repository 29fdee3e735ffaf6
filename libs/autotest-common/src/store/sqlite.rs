//! Durable store backed by a SQLite table.
//!
//! Connections come from an r2d2 pool. Each operation checks one out on the
//! blocking thread pool and hands it back when the closure returns, whether it
//! succeeded or not. Steps are kept as a JSON array in a TEXT column.

use super::{dedup_ids, validate_name, TestCaseStore};
use crate::error::{StoreError, StoreResult};
use crate::types::{NewTestCase, TestCase, TestCaseUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS test_cases (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL,
    steps      TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL
);
";

const SELECT_COLUMNS: &str = "SELECT id, name, steps, created_at FROM test_cases";

/// Pool and connection settings
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    pub max_connections: u32,
    pub connection_timeout_ms: u64,
    pub busy_timeout_ms: u64,
    /// Ignored for in-memory databases
    pub enable_wal: bool,
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self {
            max_connections: 8,
            connection_timeout_ms: 30_000,
            busy_timeout_ms: 5_000,
            enable_wal: true,
        }
    }
}

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
    is_memory: bool,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("is_memory", &self.is_memory)
            .field("max_connections", &self.pool.max_size())
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open or create a file-backed database with default settings
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::with_config(path, SqliteStoreConfig::default())
    }

    /// Private database that lives as long as the store
    pub fn in_memory() -> StoreResult<Self> {
        Self::with_config(":memory:", SqliteStoreConfig::default())
    }

    pub fn with_config<P: AsRef<Path>>(path: P, config: SqliteStoreConfig) -> StoreResult<Self> {
        let is_memory = path.as_ref().to_string_lossy() == ":memory:";

        let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
        let enable_wal = config.enable_wal && !is_memory;
        let manager = (if is_memory {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path.as_ref())
        })
        .with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            if enable_wal {
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
            }
            Ok(())
        });

        // Every in-memory connection is its own database, so share exactly one
        let max_size = if is_memory { 1 } else { config.max_connections.max(1) };
        let pool = Pool::builder()
            .max_size(max_size)
            .connection_timeout(Duration::from_millis(config.connection_timeout_ms))
            .build(manager)?;

        let store = Self { pool, is_memory };
        store.init_schema()?;

        info!(
            path = %path.as_ref().display(),
            in_memory = is_memory,
            max_connections = max_size,
            "SQLite store ready"
        );
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.pool.get()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn is_memory(&self) -> bool {
        self.is_memory
    }

    /// Run `f` on a pooled connection off the async runtime
    async fn with_connection<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await?
    }
}

fn encode_steps(steps: &[String]) -> StoreResult<String> {
    serde_json::to_string(steps)
        .map_err(|e| StoreError::Backend(format!("failed to encode steps: {}", e)))
}

/// Unreadable or non-array content decodes to no steps
fn decode_steps(id: i64, raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(steps) => steps,
        Err(e) => {
            warn!(id = id, error = %e, "Stored steps are not a string array, using empty list");
            Vec::new()
        }
    }
}

fn row_to_test_case(row: &Row<'_>) -> rusqlite::Result<TestCase> {
    let id: i64 = row.get(0)?;
    let raw_steps: Option<String> = row.get::<_, Option<String>>(2).ok().flatten();
    Ok(TestCase {
        id,
        name: row.get(1)?,
        steps: decode_steps(id, raw_steps.as_deref()),
        created_at: row.get::<_, DateTime<Utc>>(3)?,
    })
}

fn find(conn: &Connection, id: i64) -> StoreResult<Option<TestCase>> {
    let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
    Ok(conn.query_row(&sql, params![id], row_to_test_case).optional()?)
}

#[async_trait]
impl TestCaseStore for SqliteStore {
    async fn list(&self) -> StoreResult<Vec<TestCase>> {
        self.with_connection(|conn| {
            let sql = format!("{} ORDER BY id", SELECT_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_test_case)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn create(&self, payload: NewTestCase) -> StoreResult<TestCase> {
        let name = validate_name(&payload.name)?;
        let encoded = encode_steps(&payload.steps)?;
        let created_at = Utc::now();

        self.with_connection(move |conn| {
            conn.execute(
                "INSERT INTO test_cases (name, steps, created_at) VALUES (?1, ?2, ?3)",
                params![name, encoded, created_at],
            )?;
            Ok(TestCase {
                id: conn.last_insert_rowid(),
                name,
                steps: payload.steps,
                created_at,
            })
        })
        .await
    }

    async fn update(&self, id: i64, payload: TestCaseUpdate) -> StoreResult<TestCase> {
        self.with_connection(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let mut current = find(&tx, id)?.ok_or(StoreError::NotFound(id))?;

            if let Some(name) = payload.name {
                current.name = validate_name(&name)?;
            }
            let encoded = payload.steps.as_deref().map(encode_steps).transpose()?;
            if let Some(steps) = payload.steps {
                current.steps = steps;
            }

            match encoded {
                Some(encoded) => tx.execute(
                    "UPDATE test_cases SET name = ?1, steps = ?2 WHERE id = ?3",
                    params![current.name, encoded, id],
                )?,
                None => tx.execute(
                    "UPDATE test_cases SET name = ?1 WHERE id = ?2",
                    params![current.name, id],
                )?,
            };
            tx.commit()?;
            Ok(current)
        })
        .await
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        self.with_connection(move |conn| {
            let removed = conn.execute("DELETE FROM test_cases WHERE id = ?1", params![id])?;
            if removed == 0 {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn get_many(&self, ids: &[i64]) -> StoreResult<Vec<TestCase>> {
        let ids = dedup_ids(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.with_connection(move |conn| {
            let mut found = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some(tc) = find(conn, id)? {
                    found.push(tc);
                }
            }
            Ok(found)
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
