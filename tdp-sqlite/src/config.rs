//! SQLite configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tdp_migrate::DEFAULT_HISTORY_TABLE;

use crate::error::{SqliteError, SqliteResult};

/// SQLite store configuration.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database path (or ":memory:" for in-memory).
    pub path: DatabasePath,
    /// Name of the table recording applied patches.
    pub table: String,
    /// Enable foreign keys.
    pub foreign_keys: bool,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: Option<u32>,
    /// Synchronous mode.
    pub synchronous: SynchronousMode,
    /// Journal mode.
    pub journal_mode: JournalMode,
    /// Whether to run each patch in a transaction with its record.
    pub use_transaction: bool,
}

/// Database path configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatabasePath {
    /// In-memory database.
    #[default]
    Memory,
    /// File-based database.
    File(PathBuf),
}

impl DatabasePath {
    /// Check if this is an in-memory database.
    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }

    /// Human-readable form, for logs.
    pub fn display(&self) -> String {
        match self {
            Self::Memory => ":memory:".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// SQLite synchronous mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SynchronousMode {
    /// Synchronous OFF - Fastest but unsafe.
    Off,
    /// Synchronous NORMAL - Good balance.
    #[default]
    Normal,
    /// Synchronous FULL - Safe but slower.
    Full,
}

impl SynchronousMode {
    /// Get the SQLite pragma value.
    pub fn as_pragma(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Normal => "NORMAL",
            Self::Full => "FULL",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "off" => Some(Self::Off),
            "normal" => Some(Self::Normal),
            "full" => Some(Self::Full),
            _ => None,
        }
    }
}

/// SQLite journal mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JournalMode {
    /// DELETE - Default SQLite mode, deletes journal after transaction.
    #[default]
    Delete,
    /// TRUNCATE - Truncates journal instead of deleting.
    Truncate,
    /// MEMORY - Keep journal in memory.
    Memory,
    /// WAL - Write-Ahead Logging.
    Wal,
}

impl JournalMode {
    /// Get the SQLite pragma value.
    pub fn as_pragma(&self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Truncate => "TRUNCATE",
            Self::Memory => "MEMORY",
            Self::Wal => "WAL",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "delete" => Some(Self::Delete),
            "truncate" => Some(Self::Truncate),
            "memory" => Some(Self::Memory),
            "wal" => Some(Self::Wal),
            _ => None,
        }
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: DatabasePath::Memory,
            table: DEFAULT_HISTORY_TABLE.to_string(),
            foreign_keys: true,
            busy_timeout_ms: Some(5000),
            synchronous: SynchronousMode::Normal,
            journal_mode: JournalMode::Delete,
            use_transaction: true,
        }
    }
}

impl SqliteConfig {
    /// Create a new configuration for an in-memory database.
    pub fn memory() -> Self {
        Self {
            path: DatabasePath::Memory,
            ..Default::default()
        }
    }

    /// Create a new configuration for a file-based database.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            path: DatabasePath::File(path.as_ref().to_path_buf()),
            ..Default::default()
        }
    }

    /// Parse a SQLite URL into configuration.
    ///
    /// Supported formats:
    /// - `sqlite::memory:` or `:memory:` - In-memory database
    /// - `sqlite://path/to/db.sqlite` - File-based database
    /// - `sqlite:path/to/db.sqlite` - Alternative format
    /// - `file:path/to/db.sqlite` - Alternative format
    /// - `path/to/db.sqlite` - Plain path
    ///
    /// Query options: `busy_timeout`, `foreign_keys`, `journal_mode`,
    /// `synchronous`, `table` and `transaction`.
    pub fn from_url(url: impl AsRef<str>) -> SqliteResult<Self> {
        let url_str = url.as_ref();
        let (location, query) = match url_str.split_once('?') {
            Some((location, query)) => (location, Some(query)),
            None => (url_str, None),
        };

        let path = if let Some(path_part) = location.strip_prefix("sqlite://") {
            if path_part.is_empty() {
                return Err(SqliteError::config("database path is required"));
            }
            path_part
        } else if let Some(path_part) = location.strip_prefix("sqlite:") {
            path_part
        } else if let Some(path_part) = location.strip_prefix("file:") {
            path_part
        } else {
            location
        };

        let mut config = match path {
            "" => return Err(SqliteError::config("database path is required")),
            ":memory:" => Self::memory(),
            path => Self::file(path),
        };

        for pair in query.into_iter().flat_map(|q| q.split('&')) {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "foreign_keys" => {
                    config.foreign_keys = value == "true" || value == "1";
                }
                "busy_timeout" => {
                    let ms = value.parse().map_err(|_| {
                        SqliteError::config(format!("invalid busy_timeout: {}", value))
                    })?;
                    config.busy_timeout_ms = Some(ms);
                }
                "journal_mode" => {
                    config.journal_mode = JournalMode::parse(value).ok_or_else(|| {
                        SqliteError::config(format!("invalid journal_mode: {}", value))
                    })?;
                }
                "synchronous" => {
                    config.synchronous = SynchronousMode::parse(value).ok_or_else(|| {
                        SqliteError::config(format!("invalid synchronous: {}", value))
                    })?;
                }
                "table" => {
                    config.table = value.to_string();
                }
                "transaction" => {
                    config.use_transaction = parse_bool(value).ok_or_else(|| {
                        SqliteError::config(format!("invalid transaction: {}", value))
                    })?;
                }
                _ => {}
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can be used.
    pub fn validate(&self) -> SqliteResult<()> {
        if !is_identifier(&self.table) {
            return Err(SqliteError::config(format!(
                "invalid table name: '{}'",
                self.table
            )));
        }
        Ok(())
    }

    /// Generate the PRAGMA statements applied when opening a connection.
    pub fn init_sql(&self) -> String {
        let mut sql = String::new();

        if self.foreign_keys {
            sql.push_str("PRAGMA foreign_keys = ON;\n");
        }

        sql.push_str(&format!(
            "PRAGMA journal_mode = {};\n",
            self.journal_mode.as_pragma()
        ));

        sql.push_str(&format!(
            "PRAGMA synchronous = {};\n",
            self.synchronous.as_pragma()
        ));

        if let Some(timeout) = self.busy_timeout_ms {
            sql.push_str(&format!("PRAGMA busy_timeout = {};\n", timeout));
        }

        sql
    }

    /// Busy timeout as a duration.
    pub fn busy_timeout_duration(&self) -> Option<Duration> {
        self.busy_timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms)))
    }

    /// Set the history table name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Enable or disable foreign keys.
    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    /// Set the busy timeout in milliseconds.
    pub fn busy_timeout(mut self, ms: u32) -> Self {
        self.busy_timeout_ms = Some(ms);
        self
    }

    /// Set the synchronous mode.
    pub fn synchronous(mut self, mode: SynchronousMode) -> Self {
        self.synchronous = mode;
        self
    }

    /// Set the journal mode.
    pub fn journal_mode(mut self, mode: JournalMode) -> Self {
        self.journal_mode = mode;
        self
    }

    /// Run patch content as-is, outside a transaction.
    ///
    /// Needed for patches that manage their own transactions or change
    /// settings SQLite ignores inside one, such as `PRAGMA foreign_keys`.
    pub fn no_transaction(mut self) -> Self {
        self.use_transaction = false;
        self
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "on" => Some(true),
        "false" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Check for a plain SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
