pub mod messages;
pub mod sessions;
pub mod types;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

const SCHEMA_VERSION: i64 = 1;

const REQUIRED_TABLES: &[&str] = &["sessions", "messages"];

pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Row store for sessions and messages. One SQLite connection behind a
/// mutex; every read is a single short critical section.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).with_context(|| {
                format!("failed to create database directory {}", dir.display())
            })?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let _ = std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700));
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.configure_pragmas()?;
        store.initialize_schema()?;

        Ok(store)
    }

    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.configure_pragmas()?;
        store.initialize_schema()?;

        Ok(store)
    }

    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the guard cannot leave a half-applied SQLite
        // statement behind, so the connection stays usable.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn configure_pragmas(&self) -> Result<()> {
        self.conn()
            .execute_batch(
                "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
            )
            .context("failed to configure database pragmas")?;

        debug!("database pragmas configured");
        Ok(())
    }

    fn get_schema_version(&self) -> Result<i64> {
        let version: i64 = self
            .conn()
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .context("failed to read schema version")?;
        Ok(version)
    }

    fn set_schema_version(&self, version: i64) -> Result<()> {
        self.conn()
            .pragma_update(None, "user_version", version)
            .context("failed to set schema version")?;
        Ok(())
    }

    fn initialize_schema(&self) -> Result<()> {
        let current_version = self.get_schema_version()?;
        info!(
            current_version,
            target_version = SCHEMA_VERSION,
            "checking schema version"
        );

        if current_version == 0 {
            self.create_tables()?;
            self.set_schema_version(SCHEMA_VERSION)?;
            info!("created database schema v{SCHEMA_VERSION}");
            return Ok(());
        }

        if current_version > SCHEMA_VERSION {
            warn!(
                current_version,
                supported = SCHEMA_VERSION,
                "database was written by a newer chatdesk"
            );
        }

        self.assert_required_tables()?;

        Ok(())
    }

    fn assert_required_tables(&self) -> Result<()> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1")
            .context("failed to prepare table check query")?;

        let mut missing = Vec::new();
        for &table in REQUIRED_TABLES {
            if !stmt.exists(rusqlite::params![table])? {
                missing.push(table);
            }
        }

        if !missing.is_empty() {
            anyhow::bail!(
                "SQLite schema is missing required tables ({}). \
                 Back up and remove the database file to rebuild it.",
                missing.join(", ")
            );
        }

        Ok(())
    }

    fn create_tables(&self) -> Result<()> {
        self.conn()
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL DEFAULT '',
                model TEXT NOT NULL DEFAULT '',
                mode TEXT NOT NULL DEFAULT 'code',
                working_directory TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_updated ON sessions(updated_at);

            CREATE TABLE IF NOT EXISTS messages (
                row_id INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                session_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id, row_id);",
            )
            .context("failed to create tables")?;

        Ok(())
    }
}
