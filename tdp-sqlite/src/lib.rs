//! SQLite patch store for tdp.
//!
//! This crate provides a [`PatchStore`](tdp_migrate::PatchStore) backed by
//! SQLite, using `tokio-rusqlite` for asynchronous database operations.
//!
//! # Features
//!
//! - Async/await support via `tokio-rusqlite`
//! - One transaction per applied patch
//! - In-memory and file-based databases
//! - Configurable history table name
//!
//! # Example
//!
//! ```rust,ignore
//! use tdp_migrate::{PatchEngine, PatchSet};
//! use tdp_sqlite::{SqliteConfig, SqliteStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SqliteConfig::from_url("sqlite://./app.db")?;
//!     let store = SqliteStore::open(config).await?;
//!
//!     let patches = PatchSet::from_paths(["schema/"]).await?;
//!     let engine = PatchEngine::new(store, patches);
//!     engine.initialize().await?;
//!     engine.upgrade().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod store;

pub use config::{DatabasePath, JournalMode, SqliteConfig, SynchronousMode};
pub use error::{SqliteError, SqliteResult};
pub use store::SqliteStore;
