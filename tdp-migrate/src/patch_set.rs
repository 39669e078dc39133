//! Name-keyed collection of patches.

use std::collections::BTreeMap;

use crate::error::{PatchError, PatchResult};
use crate::patch::{Patch, PatchKind};

/// Sort key of a patch: all permanent patches first, then by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct PatchKey {
    kind: PatchKind,
    name: String,
}

impl PatchKey {
    fn of(patch: &Patch) -> Self {
        Self {
            kind: patch.kind(),
            name: patch.name().to_string(),
        }
    }

    fn for_name(name: &str) -> Option<Self> {
        PatchKind::classify(name).map(|kind| Self {
            kind,
            name: name.to_string(),
        })
    }
}

/// A set of patches with unique names.
///
/// Iteration always yields permanent patches sorted by name, followed by
/// volatile patches sorted by name.
#[derive(Debug, Clone, Default)]
pub struct PatchSet {
    patches: BTreeMap<PatchKey, Patch>,
}

impl PatchSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a patch.
    ///
    /// Re-adding a patch with identical content is a no-op. Adding a patch
    /// whose name is taken by different content fails with
    /// [`PatchError::Contradiction`] and leaves the set unchanged.
    pub fn add(&mut self, patch: Patch) -> PatchResult<()> {
        let key = PatchKey::of(&patch);
        match self.patches.get(&key) {
            None => {
                self.patches.insert(key, patch);
                Ok(())
            }
            Some(known) if known.content() == patch.content() => Ok(()),
            Some(known) => Err(PatchError::contradiction(known.clone(), patch)),
        }
    }

    /// Get a patch by name.
    pub fn get(&self, name: &str) -> Option<&Patch> {
        PatchKey::for_name(name).and_then(|key| self.patches.get(&key))
    }

    /// Check if a patch with this name is configured.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over patches in apply order.
    pub fn iter(&self) -> impl Iterator<Item = &Patch> {
        self.patches.values()
    }

    /// Number of patches.
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }
}
