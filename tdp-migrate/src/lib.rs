//! # tdp-migrate
//!
//! Patch engine for tdp.
//!
//! This crate provides functionality for:
//! - Classifying SQL patch files as permanent or volatile
//! - Loading patches from files and directories into a [`PatchSet`]
//! - Computing content signatures (SHA-256)
//! - Planning and applying upgrades against a [`PatchStore`]
//! - Validating that configuration and database agree
//! - Retrofitting and renaming applied records
//!
//! ## Architecture
//!
//! Configured patches are compared with the records of a history table that
//! stores one `(name, signature)` row per applied patch.
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌─────────────┐
//! │ Patch Files  │────▶│   Patch Set    │────▶│   Planner   │
//! └──────────────┘     └────────────────┘     └─────────────┘
//!                                                    │
//!                                                    ▼
//!                      ┌────────────────┐     ┌─────────────┐
//!                      │  History Tbl   │◀────│  Apply SQL  │
//!                      └────────────────┘     └─────────────┘
//! ```
//!
//! ## Patch Kinds
//!
//! - **Permanent** patches have a name starting with a digit
//!   (`001-initial-schema.sql`). They are applied once and must never change.
//! - **Volatile** patches have any other `.sql` name (`views.sql`). They are
//!   reapplied whenever their content changes.
//!
//! Permanent patches always run before volatile ones, each group sorted by
//! name.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tdp_migrate::{MemoryStore, PatchEngine, PatchSet};
//!
//! async fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     let patches = PatchSet::from_paths(["schema/"]).await?;
//!     let engine = PatchEngine::new(MemoryStore::new(), patches);
//!
//!     engine.initialize().await?;
//!     let report = engine.upgrade().await?;
//!     println!("{}", report.summary());
//!
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod error;
pub mod file;
pub mod history;
pub mod patch;
pub mod patch_set;
pub mod rename;

// Re-exports
pub use engine::{PatchEngine, PatchState, PatchStatus, StatusReport, UpgradeReport};
pub use error::{DuplicateSide, PatchError, PatchResult};
pub use history::{DEFAULT_HISTORY_TABLE, MemoryStore, PatchStore};
pub use patch::{PATCH_EXTENSION, Patch, PatchKind, compute_signature, is_patch_file};
pub use patch_set::PatchSet;
pub use rename::{DuplicateGroup, RenameAnalysis, RenamePlan};
