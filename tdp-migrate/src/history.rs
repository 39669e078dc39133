//! Applied patch history.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::Mutex;

use crate::error::{PatchError, PatchResult};
use crate::patch::Patch;

/// Default name of the table recording applied patches.
pub const DEFAULT_HISTORY_TABLE: &str = "tdp_patch";

/// Durable record of applied patches, keyed by name.
///
/// Implementations own any transactional semantics around a single patch:
/// [`execute_and_register`](PatchStore::execute_and_register) must leave no
/// record behind when the patch content fails to run.
#[async_trait::async_trait]
pub trait PatchStore: Send + Sync {
    /// Create the history table if it does not exist yet.
    async fn ensure_initialized(&self) -> PatchResult<()>;

    /// Snapshot of all applied patches as `name -> signature`.
    async fn applied_patches(&self) -> PatchResult<BTreeMap<String, String>>;

    /// Signature recorded for a patch, if it was applied.
    async fn signature_of(&self, name: &str) -> PatchResult<Option<String>>;

    /// Run the patch content, then record it as applied.
    async fn execute_and_register(&self, patch: &Patch) -> PatchResult<()>;

    /// Record a patch as applied without running it.
    async fn register(&self, name: &str, signature: &str) -> PatchResult<()>;

    /// Forget every applied patch.
    async fn erase_all(&self) -> PatchResult<()>;

    /// Move an applied record to a new name, keeping its signature.
    async fn rename_record(&self, old_name: &str, new_name: &str) -> PatchResult<()>;
}

#[derive(Debug, Default)]
struct MemoryState {
    initialized: bool,
    records: BTreeMap<String, String>,
    executed: Vec<String>,
    failing: BTreeSet<String>,
}

/// In-process [`PatchStore`].
///
/// "Executing" a patch only logs its name. Patches can be marked as failing
/// to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future execution of `name` fail.
    pub fn fail_on(&self, name: impl Into<String>) {
        self.state.lock().failing.insert(name.into());
    }

    /// Names of executed patches, in execution order.
    pub fn executed(&self) -> Vec<String> {
        self.state.lock().executed.clone()
    }

    /// Check if the history table was created.
    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }
}

#[async_trait::async_trait]
impl PatchStore for MemoryStore {
    async fn ensure_initialized(&self) -> PatchResult<()> {
        self.state.lock().initialized = true;
        Ok(())
    }

    async fn applied_patches(&self) -> PatchResult<BTreeMap<String, String>> {
        Ok(self.state.lock().records.clone())
    }

    async fn signature_of(&self, name: &str) -> PatchResult<Option<String>> {
        Ok(self.state.lock().records.get(name).cloned())
    }

    async fn execute_and_register(&self, patch: &Patch) -> PatchResult<()> {
        let mut state = self.state.lock();
        if state.failing.contains(patch.name()) {
            return Err(PatchError::database(format!(
                "execution of {} failed",
                patch.name()
            )));
        }
        state.executed.push(patch.name().to_string());
        state
            .records
            .insert(patch.name().to_string(), patch.signature().to_string());
        Ok(())
    }

    async fn register(&self, name: &str, signature: &str) -> PatchResult<()> {
        self.state
            .lock()
            .records
            .insert(name.to_string(), signature.to_string());
        Ok(())
    }

    async fn erase_all(&self) -> PatchResult<()> {
        self.state.lock().records.clear();
        Ok(())
    }

    async fn rename_record(&self, old_name: &str, new_name: &str) -> PatchResult<()> {
        let mut state = self.state.lock();
        if state.records.contains_key(new_name) {
            return Err(PatchError::database(format!(
                "patch already recorded: {}",
                new_name
            )));
        }
        let signature = state.records.remove(old_name).ok_or_else(|| {
            PatchError::database(format!("no applied patch named {}", old_name))
        })?;
        state.records.insert(new_name.to_string(), signature);
        Ok(())
    }
}
