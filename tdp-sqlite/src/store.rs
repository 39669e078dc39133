//! SQLite-backed patch store.

use std::collections::BTreeMap;

use rusqlite::{OptionalExtension, params};
use tdp_migrate::{Patch, PatchResult, PatchStore};
use tokio_rusqlite::Connection;
use tracing::{debug, info};

use crate::config::{DatabasePath, SqliteConfig, is_identifier};
use crate::error::{SqliteError, SqliteResult};

/// A [`PatchStore`] recording applied patches in a SQLite table.
///
/// By default each patch is executed and recorded inside one transaction, so
/// a failing patch leaves neither partial schema changes nor a record behind.
/// With [`SqliteConfig::no_transaction`] the content runs as-is and the
/// record is only written once it succeeded.
pub struct SqliteStore {
    conn: Connection,
    config: SqliteConfig,
}

impl SqliteStore {
    /// Open a database and apply the connection settings.
    pub async fn open(config: SqliteConfig) -> SqliteResult<Self> {
        config.validate()?;

        let conn = match &config.path {
            DatabasePath::Memory => Connection::open_in_memory().await,
            DatabasePath::File(path) => Connection::open(path).await,
        }
        .map_err(|e| SqliteError::connection(format!("{}: {}", config.path.display(), e)))?;

        debug!(pragmas = %config.init_sql(), "Configuring connection");
        let busy_timeout = config.busy_timeout_duration();
        let foreign_keys = config.foreign_keys;
        let synchronous = config.synchronous.as_pragma();
        let journal_mode = config.journal_mode.as_pragma();
        conn.call(move |conn| {
            if let Some(timeout) = busy_timeout {
                conn.busy_timeout(timeout)?;
            }
            conn.pragma_update(None, "foreign_keys", foreign_keys)?;
            conn.pragma_update(None, "synchronous", synchronous)?;
            let _mode: String =
                conn.pragma_update_and_check(None, "journal_mode", journal_mode, |row| {
                    row.get(0)
                })?;
            Ok(())
        })
        .await?;

        info!(path = %config.path.display(), table = %config.table, "Opened SQLite store");
        Ok(Self { conn, config })
    }

    /// Open an in-memory database with default settings.
    pub async fn memory() -> SqliteResult<Self> {
        Self::open(SqliteConfig::memory()).await
    }

    /// Store configuration.
    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Name of the history table.
    pub fn table(&self) -> &str {
        &self.config.table
    }

    /// Run arbitrary SQL statements.
    pub async fn execute(&self, sql: &str) -> SqliteResult<()> {
        let sql = sql.to_string();
        debug!(sql = %sql, "Executing batch");

        self.conn
            .call(move |conn| Ok(conn.execute_batch(&sql)?))
            .await
            .map_err(SqliteError::from)
    }

    /// Check if a table or view exists.
    pub async fn table_exists(&self, name: &str) -> SqliteResult<bool> {
        let name = name.to_string();

        self.conn
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
                    [&name],
                    |row| row.get(0),
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(SqliteError::from)
    }

    /// Column names of a table, in declaration order.
    pub async fn columns(&self, table: &str) -> SqliteResult<Vec<String>> {
        if !is_identifier(table) {
            return Err(SqliteError::config(format!("invalid table name: '{}'", table)));
        }
        let table = table.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
                let rows = stmt.query_map([&table], |row| row.get::<_, String>(0))?;
                let columns: Result<Vec<_>, _> = rows.collect();
                Ok(columns?)
            })
            .await
            .map_err(SqliteError::from)
    }

    fn upsert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (name, signature) VALUES (?1, ?2) \
             ON CONFLICT(name) DO UPDATE SET signature = excluded.signature",
            self.table()
        )
    }
}

#[async_trait::async_trait]
impl PatchStore for SqliteStore {
    async fn ensure_initialized(&self) -> PatchResult<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (name TEXT PRIMARY KEY, signature TEXT NOT NULL)",
            self.table()
        );
        debug!(table = %self.table(), "Ensuring history table");

        self.conn
            .call(move |conn| {
                conn.execute(&sql, [])?;
                Ok(())
            })
            .await
            .map_err(SqliteError::from)?;
        Ok(())
    }

    async fn applied_patches(&self) -> PatchResult<BTreeMap<String, String>> {
        let sql = format!("SELECT name, signature FROM {} ORDER BY name", self.table());

        let applied = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;
                let applied: Result<BTreeMap<_, _>, _> = rows.collect();
                Ok(applied?)
            })
            .await
            .map_err(SqliteError::from)?;
        Ok(applied)
    }

    async fn signature_of(&self, name: &str) -> PatchResult<Option<String>> {
        let sql = format!("SELECT signature FROM {} WHERE name = ?1", self.table());
        let name = name.to_string();

        let signature = self
            .conn
            .call(move |conn| {
                let signature = conn
                    .query_row(&sql, [&name], |row| row.get::<_, String>(0))
                    .optional()?;
                Ok(signature)
            })
            .await
            .map_err(SqliteError::from)?;
        Ok(signature)
    }

    async fn execute_and_register(&self, patch: &Patch) -> PatchResult<()> {
        let upsert = self.upsert_sql();
        let content = patch.content().to_string();
        let name = patch.name().to_string();
        let signature = patch.signature().to_string();
        let use_transaction = self.config.use_transaction;
        debug!(patch = %name, sql = %content, use_transaction, "Executing patch");

        self.conn
            .call(move |conn| {
                if use_transaction {
                    let tx = conn.transaction()?;
                    tx.execute_batch(&content)?;
                    tx.execute(&upsert, params![name, signature])?;
                    tx.commit()?;
                } else {
                    conn.execute_batch(&content)?;
                    conn.execute(&upsert, params![name, signature])?;
                }
                Ok(())
            })
            .await
            .map_err(SqliteError::from)?;
        Ok(())
    }

    async fn register(&self, name: &str, signature: &str) -> PatchResult<()> {
        let upsert = self.upsert_sql();
        let name = name.to_string();
        let signature = signature.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(&upsert, params![name, signature])?;
                Ok(())
            })
            .await
            .map_err(SqliteError::from)?;
        Ok(())
    }

    async fn erase_all(&self) -> PatchResult<()> {
        let sql = format!("DELETE FROM {}", self.table());

        self.conn
            .call(move |conn| {
                conn.execute(&sql, [])?;
                Ok(())
            })
            .await
            .map_err(SqliteError::from)?;
        Ok(())
    }

    async fn rename_record(&self, old_name: &str, new_name: &str) -> PatchResult<()> {
        let sql = format!("UPDATE {} SET name = ?2 WHERE name = ?1", self.table());
        let (old, new) = (old_name.to_string(), new_name.to_string());

        let changed = self
            .conn
            .call(move |conn| Ok(conn.execute(&sql, params![old, new])?))
            .await
            .map_err(SqliteError::from)?;

        if changed == 0 {
            return Err(SqliteError::not_found(format!("no applied patch named {}", old_name)).into());
        }
        Ok(())
    }
}
