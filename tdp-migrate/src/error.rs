//! Error types for the patch engine.

use std::fmt;

use thiserror::Error;

use crate::patch::Patch;

/// Result type alias for patch operations.
pub type PatchResult<T> = Result<T, PatchError>;

/// Which side of the reconciliation a duplicate signature was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DuplicateSide {
    /// Records of applied patches held by the store.
    Applied,
    /// Patches in the current configuration.
    Configured,
}

impl fmt::Display for DuplicateSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => write!(f, "applied patches"),
            Self::Configured => write!(f, "configured patches"),
        }
    }
}

/// Errors that can occur while registering, planning or applying patches.
#[derive(Debug, Error)]
pub enum PatchError {
    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A file that cannot be a patch.
    #[error("Invalid patch: {0}")]
    InvalidPatch(String),

    /// Two patches share a name but not their content.
    #[error(
        "Patches with same name and different content: {} / {}",
        existing.origin(),
        conflicting.origin()
    )]
    Contradiction {
        /// The patch registered first.
        existing: Box<Patch>,
        /// The patch that was rejected.
        conflicting: Box<Patch>,
    },

    /// The store records a patch that is not in the configuration.
    #[error("No configuration file for patch in database: {0}")]
    NotConfigured(String),

    /// A configured patch has never been applied.
    #[error("Patch is not applied: {}", .0.name())]
    NotApplied(Box<Patch>),

    /// The applied signature differs from the configured one.
    #[error("Applied patch doesn't match configuration: {}", patch.name())]
    Mismatch {
        /// Configured patch.
        patch: Box<Patch>,
        /// Signature recorded in the store.
        recorded: String,
    },

    /// Several patches share a signature, so a rename would be ambiguous.
    #[error("Several {side} share signature {signature}: {}", names.join(", "))]
    Duplicate {
        /// Where the duplicates were found.
        side: DuplicateSide,
        /// The shared signature.
        signature: String,
        /// Names of the patches sharing it.
        names: Vec<String>,
    },

    /// Applying a patch failed; nothing was recorded for it.
    #[error("Failed to apply patch {patch}: {source}")]
    ApplyFailed {
        /// Name or path of the failing patch.
        patch: String,
        /// Underlying store error.
        #[source]
        source: Box<PatchError>,
    },

    /// Store operation error.
    #[error("Database error: {0}")]
    Database(String),
}

impl PatchError {
    /// Create an invalid patch error.
    pub fn invalid_patch(msg: impl Into<String>) -> Self {
        Self::InvalidPatch(msg.into())
    }

    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a contradiction error.
    pub fn contradiction(existing: Patch, conflicting: Patch) -> Self {
        Self::Contradiction {
            existing: Box::new(existing),
            conflicting: Box::new(conflicting),
        }
    }

    /// Create a not-configured error.
    pub fn not_configured(name: impl Into<String>) -> Self {
        Self::NotConfigured(name.into())
    }

    /// Create a not-applied error.
    pub fn not_applied(patch: &Patch) -> Self {
        Self::NotApplied(Box::new(patch.clone()))
    }

    /// Create a mismatch error.
    pub fn mismatch(patch: &Patch, recorded: impl Into<String>) -> Self {
        Self::Mismatch {
            patch: Box::new(patch.clone()),
            recorded: recorded.into(),
        }
    }

    /// Create a duplicate signature error.
    pub fn duplicate(side: DuplicateSide, signature: impl Into<String>, names: Vec<String>) -> Self {
        Self::Duplicate {
            side,
            signature: signature.into(),
            names,
        }
    }

    /// Wrap a store error with the identity of the patch being applied.
    pub fn apply_failed(patch: &Patch, source: PatchError) -> Self {
        Self::ApplyFailed {
            patch: patch.origin(),
            source: Box::new(source),
        }
    }

    /// Check if this error reports drift between configuration and database.
    pub fn is_consistency_violation(&self) -> bool {
        matches!(
            self,
            Self::Contradiction { .. }
                | Self::NotConfigured(_)
                | Self::NotApplied(_)
                | Self::Mismatch { .. }
                | Self::Duplicate { .. }
        )
    }
}
