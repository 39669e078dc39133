//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tdp::prelude::*;
use tempfile::TempDir;

/// Path of a fixture pack, or of a file inside one.
pub fn fixture(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/schema")
        .join(relative)
}

/// A scratch SQLite database file, removed when dropped.
pub struct TestDb {
    _dir: TempDir,
    path: PathBuf,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("tdp.db");
        Self { _dir: dir, path }
    }

    /// Open a fresh connection with the history table created.
    pub async fn store(&self) -> SqliteStore {
        let store = SqliteStore::open(SqliteConfig::file(&self.path))
            .await
            .expect("failed to open store");
        store.ensure_initialized().await.expect("failed to initialize");
        store
    }

    /// Engine over the given fixture packs or files.
    pub async fn engine(&self, sources: &[&str]) -> PatchEngine<SqliteStore> {
        let patches = PatchSet::from_paths(sources.iter().map(|s| fixture(s)))
            .await
            .expect("failed to load patches");
        PatchEngine::new(self.store().await, patches)
    }

    /// Apply the given sources and return nothing; panics on failure.
    pub async fn upgrade(&self, sources: &[&str]) {
        self.engine(sources)
            .await
            .upgrade()
            .await
            .expect("upgrade failed");
    }
}

/// Names of patches in a plan.
pub fn names(plan: &[&Patch]) -> Vec<String> {
    plan.iter().map(|p| p.name().to_string()).collect()
}
