//! Patch engine implementation.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{PatchError, PatchResult};
use crate::history::PatchStore;
use crate::patch::{Patch, PatchKind};
use crate::patch_set::PatchSet;
use crate::rename::{RenameAnalysis, RenamePlan};

/// Result of an upgrade.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpgradeReport {
    /// Names of applied patches, in application order.
    pub applied: Vec<String>,
    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

impl UpgradeReport {
    /// Number of applied patches.
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    /// Check if anything was applied.
    pub fn has_changes(&self) -> bool {
        !self.applied.is_empty()
    }

    /// Get a summary of the report.
    pub fn summary(&self) -> String {
        match self.applied.len() {
            0 => "No patches applied".to_string(),
            1 => format!("1 patch applied in {}ms", self.duration_ms),
            n => format!("{} patches applied in {}ms", n, self.duration_ms),
        }
    }
}

/// Reconciliation state of a configured patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PatchState {
    /// Applied with the current content.
    UpToDate,
    /// Never applied, or a volatile patch whose content changed.
    NeedsApply,
    /// A permanent patch whose content changed after it was applied.
    Mismatched {
        /// Signature recorded in the store.
        recorded: String,
    },
    /// Not applied under this name, but an orphaned record has its content.
    RenameCandidate {
        /// Name of the applied record.
        from: String,
    },
    /// Not applied, and its signature is shared with other patches.
    Ambiguous,
}

impl PatchState {
    /// Short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::UpToDate => "up to date",
            Self::NeedsApply => "needs apply",
            Self::Mismatched { .. } => "mismatched",
            Self::RenameCandidate { .. } => "rename candidate",
            Self::Ambiguous => "ambiguous",
        }
    }
}

/// Status of one configured patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchStatus {
    /// Patch name.
    pub name: String,
    /// Patch classification.
    pub kind: PatchKind,
    /// Reconciliation state.
    #[serde(flatten)]
    pub state: PatchState,
}

/// Status of every configured patch against the store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusReport {
    /// Configured patches, in apply order.
    pub patches: Vec<PatchStatus>,
    /// Applied records with no configured patch.
    pub unconfigured: Vec<String>,
}

impl StatusReport {
    /// Status of a patch by name.
    pub fn get(&self, name: &str) -> Option<&PatchStatus> {
        self.patches.iter().find(|p| p.name == name)
    }

    /// Check if configuration and store agree completely.
    pub fn is_consistent(&self) -> bool {
        self.unconfigured.is_empty()
            && self
                .patches
                .iter()
                .all(|p| p.state == PatchState::UpToDate)
    }

    /// Get a summary of the report.
    pub fn summary(&self) -> String {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for status in &self.patches {
            *counts.entry(status.state.label()).or_default() += 1;
        }

        let mut parts: Vec<String> = counts
            .into_iter()
            .map(|(label, count)| format!("{} {}", count, label))
            .collect();
        if !self.unconfigured.is_empty() {
            parts.push(format!("{} not configured", self.unconfigured.len()));
        }

        if parts.is_empty() {
            "No patches".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// The patch engine.
///
/// Owns the configured [`PatchSet`] and reconciles it against a
/// [`PatchStore`]. Every decision is recomputed from the store on each call.
pub struct PatchEngine<S: PatchStore> {
    store: S,
    patches: PatchSet,
}

impl<S: PatchStore> PatchEngine<S> {
    /// Create a new engine.
    pub fn new(store: S, patches: PatchSet) -> Self {
        Self { store, patches }
    }

    /// Configured patches.
    pub fn patches(&self) -> &PatchSet {
        &self.patches
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create the history table if needed.
    pub async fn initialize(&self) -> PatchResult<()> {
        self.store.ensure_initialized().await
    }

    /// Ordered list of patches that need to be applied.
    ///
    /// Fails with [`PatchError::Mismatch`] when a permanent patch differs
    /// from what was applied under its name.
    pub async fn plan(&self) -> PatchResult<Vec<&Patch>> {
        let mut plan = Vec::new();

        for patch in self.patches.iter() {
            match self.store.signature_of(patch.name()).await? {
                Some(recorded) if recorded == patch.signature() => {}
                None => {
                    debug!(patch = %patch.name(), "Patch not applied yet");
                    plan.push(patch);
                }
                Some(_) if patch.is_volatile() => {
                    debug!(patch = %patch.name(), "Volatile patch changed");
                    plan.push(patch);
                }
                Some(recorded) => return Err(PatchError::mismatch(patch, recorded)),
            }
        }

        Ok(plan)
    }

    /// Apply every patch of the plan, in order.
    ///
    /// Stops at the first failure; patches applied before it stay applied.
    pub async fn upgrade(&self) -> PatchResult<UpgradeReport> {
        let start = Instant::now();
        let plan = self.check_upgradable().await?;
        let mut report = UpgradeReport::default();

        for patch in plan {
            self.store
                .execute_and_register(patch)
                .await
                .map_err(|e| PatchError::apply_failed(patch, e))?;
            info!(patch = %patch.name(), kind = %patch.kind(), "Applied patch");
            report.applied.push(patch.name().to_string());
        }

        report.duration_ms = millis(start.elapsed());
        Ok(report)
    }

    /// Check that it is safe to upgrade.
    ///
    /// Every applied patch must still be configured, and no permanent patch
    /// may differ from its applied version.
    pub async fn validate_upgradable(&self) -> PatchResult<()> {
        self.check_upgradable().await.map(|_| ())
    }

    /// Check that configuration and database agree in both directions.
    pub async fn validate_compatible(&self) -> PatchResult<()> {
        self.check_upgradable().await?;

        for patch in self.patches.iter() {
            match self.store.signature_of(patch.name()).await? {
                Some(recorded) if recorded == patch.signature() => {}
                None => return Err(PatchError::not_applied(patch)),
                Some(recorded) => return Err(PatchError::mismatch(patch, recorded)),
            }
        }

        Ok(())
    }

    /// Replace the applied records with the configured patches, running no SQL.
    ///
    /// Discards every record of what was applied before.
    pub async fn retrofit(&self) -> PatchResult<usize> {
        self.store.erase_all().await?;

        for patch in self.patches.iter() {
            self.store
                .register(patch.name(), patch.signature())
                .await?;
        }

        info!(count = self.patches.len(), "Retrofitted patches");
        Ok(self.patches.len())
    }

    /// Applied records that should be relabelled to match renamed files.
    pub async fn plan_rename(&self) -> PatchResult<RenamePlan> {
        self.rename_analysis().await?.into_plan()
    }

    /// Relabel applied records according to [`plan_rename`](Self::plan_rename).
    pub async fn rename(&self) -> PatchResult<RenamePlan> {
        let plan = self.plan_rename().await?;

        for (old_name, new_name) in plan.iter() {
            self.store.rename_record(old_name, new_name).await?;
            info!(from = %old_name, to = %new_name, "Renamed patch record");
        }

        Ok(plan)
    }

    /// Reconciliation state of every configured patch. Never fails on drift.
    pub async fn status(&self) -> PatchResult<StatusReport> {
        let applied = self.store.applied_patches().await?;
        let analysis = RenameAnalysis::compute(&self.patches, &applied);
        let renamed_from: BTreeMap<&str, &str> = analysis
            .plan()
            .iter()
            .map(|(old, new)| (new, old))
            .collect();

        let patches = self
            .patches
            .iter()
            .map(|patch| {
                let state = match applied.get(patch.name()) {
                    Some(recorded) if recorded == patch.signature() => PatchState::UpToDate,
                    Some(_) if patch.is_volatile() => PatchState::NeedsApply,
                    Some(recorded) => PatchState::Mismatched {
                        recorded: recorded.clone(),
                    },
                    None => match renamed_from.get(patch.name()) {
                        Some(from) => PatchState::RenameCandidate {
                            from: from.to_string(),
                        },
                        None if patch.is_permanent()
                            && analysis.is_ambiguous(patch.signature()) =>
                        {
                            PatchState::Ambiguous
                        }
                        None => PatchState::NeedsApply,
                    },
                };
                PatchStatus {
                    name: patch.name().to_string(),
                    kind: patch.kind(),
                    state,
                }
            })
            .collect();

        let unconfigured = applied
            .keys()
            .filter(|name| !self.patches.contains(name))
            .cloned()
            .collect();

        Ok(StatusReport {
            patches,
            unconfigured,
        })
    }

    async fn check_upgradable(&self) -> PatchResult<Vec<&Patch>> {
        let applied = self.store.applied_patches().await?;
        if let Some(name) = applied.keys().find(|name| !self.patches.contains(name)) {
            return Err(PatchError::not_configured(name.as_str()));
        }
        self.plan().await
    }

    async fn rename_analysis(&self) -> PatchResult<RenameAnalysis> {
        let applied = self.store.applied_patches().await?;
        Ok(RenameAnalysis::compute(&self.patches, &applied))
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
