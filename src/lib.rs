//! # tdp
//!
//! Tiny database patcher.
//!
//! tdp tracks which SQL patch files have been applied to a database, decides
//! which still need applying, detects drift between the patch files and what
//! the database records, and reconciles file renames without losing history.
//!
//! - **Permanent** patches (`001-initial-schema.sql`) run once and must never
//!   change afterwards.
//! - **Volatile** patches (`views.sql`) are re-run whenever their content
//!   changes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tdp::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStore::open(SqliteConfig::from_url("sqlite://app.db")?).await?;
//!     let patches = PatchSet::from_paths(["schema/"]).await?;
//!
//!     let engine = PatchEngine::new(store, patches);
//!     engine.initialize().await?;
//!     engine.validate_upgradable().await?;
//!
//!     let report = engine.upgrade().await?;
//!     println!("{}", report.summary());
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Patch engine: patches, patch sets, stores and reconciliation.
pub mod migrate {
    pub use tdp_migrate::*;
}

/// SQLite patch store.
#[cfg(feature = "sqlite")]
pub mod sqlite {
    pub use tdp_sqlite::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::migrate::{
        MemoryStore, Patch, PatchEngine, PatchError, PatchKind, PatchResult, PatchSet,
        PatchStore, RenamePlan,
    };
    #[cfg(feature = "sqlite")]
    pub use crate::sqlite::{SqliteConfig, SqliteStore};
}

// Re-export key types at the crate root
pub use tdp_migrate::{
    Patch, PatchEngine, PatchError, PatchKind, PatchResult, PatchSet, PatchStore, StatusReport,
    UpgradeReport,
};
