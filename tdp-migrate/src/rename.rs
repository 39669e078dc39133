//! Rename reconciliation.
//!
//! A permanent patch whose file was renamed without touching its content
//! shows up twice: as an applied record nobody configures any more, and as a
//! configured patch that was never applied. Both carry the same signature,
//! which is how the two halves are paired up again.
//!
//! ```text
//!   applied records                configured patches
//!   ───────────────                ──────────────────
//!   001-initial-schema.sql  ═══    001-initial-schema.sql
//!   002-minor-changes.sql   ─┐     002-some-stuff.sql
//!                            └───▶ (same signature)
//! ```
//!
//! Pairing is only done when it is unambiguous: if two permanent records,
//! or two permanent configured patches, share a signature, the analysis
//! reports a duplicate group and the plan is refused.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{DuplicateSide, PatchError, PatchResult};
use crate::patch::PatchKind;
use crate::patch_set::PatchSet;

/// Applied records to relabel, as `old name -> new name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenamePlan {
    renames: BTreeMap<String, String>,
}

impl RenamePlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// New name for an applied record, if it is renamed.
    pub fn get(&self, old_name: &str) -> Option<&str> {
        self.renames.get(old_name).map(String::as_str)
    }

    /// Iterate over `(old name, new name)` pairs, sorted by old name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.renames
            .iter()
            .map(|(old, new)| (old.as_str(), new.as_str()))
    }

    /// Number of renames.
    pub fn len(&self) -> usize {
        self.renames.len()
    }

    /// Check if nothing needs renaming.
    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    /// Get a summary of the plan.
    pub fn summary(&self) -> String {
        match self.renames.len() {
            0 => "No patches to rename".to_string(),
            1 => "1 patch to rename".to_string(),
            n => format!("{} patches to rename", n),
        }
    }

    fn insert(&mut self, old_name: &str, new_name: &str) {
        self.renames
            .insert(old_name.to_string(), new_name.to_string());
    }
}

impl From<RenamePlan> for BTreeMap<String, String> {
    fn from(plan: RenamePlan) -> Self {
        plan.renames
    }
}

/// Several patches on one side sharing a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// Side the duplicates were found on.
    #[serde(skip)]
    pub side: DuplicateSide,
    /// Shared signature.
    pub signature: String,
    /// Patch names, sorted.
    pub names: Vec<String>,
}

impl DuplicateGroup {
    fn into_error(self) -> PatchError {
        PatchError::duplicate(self.side, self.signature, self.names)
    }
}

/// Outcome of pairing orphaned records with unapplied patches.
#[derive(Debug, Clone, Default)]
pub struct RenameAnalysis {
    plan: RenamePlan,
    duplicates: Vec<DuplicateGroup>,
}

impl RenameAnalysis {
    /// Analyse configured patches against a snapshot of applied records.
    pub fn compute(patches: &PatchSet, applied: &BTreeMap<String, String>) -> Self {
        let applied_groups = group_by_signature(
            applied
                .iter()
                .filter(|(name, _)| is_permanent_name(name))
                .map(|(name, signature)| (signature.as_str(), name.as_str())),
        );
        let configured_groups = group_by_signature(
            patches
                .iter()
                .filter(|p| p.is_permanent())
                .map(|p| (p.signature(), p.name())),
        );

        let mut duplicates = Vec::new();
        collect_duplicates(&applied_groups, DuplicateSide::Applied, &mut duplicates);
        collect_duplicates(&configured_groups, DuplicateSide::Configured, &mut duplicates);

        // Records no configured patch claims by name, keyed by signature.
        let orphans: BTreeMap<&str, &str> = applied_groups
            .iter()
            .filter_map(|(signature, names)| match names.as_slice() {
                [name] if !patches.contains(name) => Some((*signature, *name)),
                _ => None,
            })
            .collect();

        let mut plan = RenamePlan::new();
        for patch in patches.iter().filter(|p| p.is_permanent()) {
            if applied.contains_key(patch.name()) {
                continue;
            }
            let unique = configured_groups
                .get(patch.signature())
                .is_some_and(|names| names.len() == 1);
            if let Some(old_name) = orphans.get(patch.signature())
                && unique
            {
                plan.insert(old_name, patch.name());
            }
        }

        Self { plan, duplicates }
    }

    /// Renames found, ignoring duplicates.
    pub fn plan(&self) -> &RenamePlan {
        &self.plan
    }

    /// Duplicate groups, applied side first.
    pub fn duplicates(&self) -> &[DuplicateGroup] {
        &self.duplicates
    }

    /// Check if a signature belongs to a duplicate group on either side.
    pub fn is_ambiguous(&self, signature: &str) -> bool {
        self.duplicates.iter().any(|d| d.signature == signature)
    }

    /// Turn the analysis into a plan, failing on the first duplicate group.
    pub fn into_plan(self) -> PatchResult<RenamePlan> {
        match self.duplicates.into_iter().next() {
            Some(duplicate) => Err(duplicate.into_error()),
            None => Ok(self.plan),
        }
    }
}

fn is_permanent_name(name: &str) -> bool {
    PatchKind::classify(name).is_some_and(|kind| kind.is_permanent())
}

fn group_by_signature<'a>(
    entries: impl Iterator<Item = (&'a str, &'a str)>,
) -> BTreeMap<&'a str, Vec<&'a str>> {
    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (signature, name) in entries {
        groups.entry(signature).or_default().push(name);
    }
    groups
}

fn collect_duplicates(
    groups: &BTreeMap<&str, Vec<&str>>,
    side: DuplicateSide,
    out: &mut Vec<DuplicateGroup>,
) {
    for (signature, names) in groups {
        if names.len() > 1 {
            let mut names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
            names.sort();
            out.push(DuplicateGroup {
                side,
                signature: signature.to_string(),
                names,
            });
        }
    }
}
