//! Patch types.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{PatchError, PatchResult};

/// File extension every patch must carry.
pub const PATCH_EXTENSION: &str = ".sql";

/// Classification of a patch, derived from its name.
///
/// Permanent patches sort before volatile ones, so the derived ordering is
/// also the order in which the two classes are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchKind {
    /// Numbered migration (`001-initial-schema.sql`); applied once, never edited.
    Permanent,
    /// Replaceable definition (`views.sql`); reapplied whenever its content changes.
    Volatile,
}

impl PatchKind {
    /// Classify a file name.
    ///
    /// Returns `None` when the name is not a patch at all (no `.sql` suffix).
    pub fn classify(name: &str) -> Option<Self> {
        if !is_patch_file(name) {
            return None;
        }
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            Some(Self::Permanent)
        } else {
            Some(Self::Volatile)
        }
    }

    /// Check if this is a permanent patch.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent)
    }

    /// Check if this is a volatile patch.
    pub fn is_volatile(&self) -> bool {
        matches!(self, Self::Volatile)
    }
}

impl fmt::Display for PatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permanent => write!(f, "permanent"),
            Self::Volatile => write!(f, "volatile"),
        }
    }
}

/// A single SQL patch.
///
/// Serializes to its name, kind, signature and path; the content is left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Patch {
    name: String,
    kind: PatchKind,
    #[serde(skip)]
    content: String,
    signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
}

impl Patch {
    /// Create a patch from a file name and its content.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> PatchResult<Self> {
        let name = name.into();
        let kind = PatchKind::classify(&name).ok_or_else(|| {
            PatchError::invalid_patch(format!(
                "'{}' does not end with {}",
                name, PATCH_EXTENSION
            ))
        })?;
        let content = content.into();
        let signature = compute_signature(&content);

        Ok(Self {
            name,
            kind,
            content,
            signature,
            path: None,
        })
    }

    /// Read a patch from a `.sql` file. The name is the file's base name.
    pub async fn from_file(path: impl AsRef<Path>) -> PatchResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                PatchError::invalid_patch(format!("invalid file name: {}", path.display()))
            })?
            .to_string();

        let content = tokio::fs::read_to_string(path).await?;
        Ok(Self::new(name, content)?.with_path(path))
    }

    /// Set the file this patch was read from.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Name of the patch.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// SQL content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// SHA-256 hex digest of the content.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Classification derived from the name.
    pub fn kind(&self) -> PatchKind {
        self.kind
    }

    /// File this patch was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check if the patch is permanent.
    pub fn is_permanent(&self) -> bool {
        self.kind.is_permanent()
    }

    /// Check if the patch is volatile.
    pub fn is_volatile(&self) -> bool {
        self.kind.is_volatile()
    }

    /// Where the patch came from: its path if known, otherwise its name.
    pub fn origin(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// Check if a file name qualifies as a patch.
pub fn is_patch_file(name: &str) -> bool {
    name.ends_with(PATCH_EXTENSION)
}

/// Compute the SHA-256 signature of patch content.
pub fn compute_signature(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permanent_filename() {
        assert_eq!(PatchKind::classify("001-patch.sql"), Some(PatchKind::Permanent));
        assert_eq!(
            PatchKind::classify("201611001_add_accounts_table.sql"),
            Some(PatchKind::Permanent)
        );
        assert_ne!(PatchKind::classify("views.sql"), Some(PatchKind::Permanent));
    }

    #[test]
    fn test_volatile_filename() {
        assert_eq!(PatchKind::classify("views.sql"), Some(PatchKind::Volatile));
        assert_eq!(
            PatchKind::classify("stored-procedures.sql"),
            Some(PatchKind::Volatile)
        );
        assert_ne!(PatchKind::classify("001-patch.sql"), Some(PatchKind::Volatile));
    }

    #[test]
    fn test_non_patch_filename() {
        assert_eq!(PatchKind::classify("README.md"), None);
        assert_eq!(PatchKind::classify("001-patch.sql.bak"), None);
        assert!(Patch::new("notes.txt", "hello").is_err());
    }

    #[test]
    fn test_kind_ordering() {
        assert!(PatchKind::Permanent < PatchKind::Volatile);
    }

    #[test]
    fn test_create_patch() {
        let patch = Patch::new("001-initial-schema.sql", "CREATE TABLE thing (id INTEGER);").unwrap();

        assert_eq!(patch.name(), "001-initial-schema.sql");
        assert!(patch.is_permanent());
        assert_eq!(patch.signature().len(), 64);
        assert!(patch.path().is_none());
        assert_eq!(patch.origin(), "001-initial-schema.sql");
    }

    #[test]
    fn test_signature_depends_on_content_only() {
        let a = Patch::new("002-minor-changes.sql", "ALTER TABLE thing ADD x INTEGER;").unwrap();
        let b = Patch::new("002-some-stuff.sql", "ALTER TABLE thing ADD x INTEGER;").unwrap();
        let c = Patch::new("002-minor-changes.sql", "ALTER TABLE thing ADD y INTEGER;").unwrap();

        assert_eq!(a.signature(), b.signature());
        assert_ne!(a.signature(), c.signature());
    }

    #[test]
    fn test_compute_signature() {
        assert_eq!(
            compute_signature(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("views.sql");
        std::fs::write(&path, "CREATE VIEW v AS SELECT 1;").unwrap();

        let patch = Patch::from_file(&path).await.unwrap();
        assert_eq!(patch.name(), "views.sql");
        assert!(patch.is_volatile());
        assert_eq!(patch.content(), "CREATE VIEW v AS SELECT 1;");
        assert_eq!(patch.path(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn test_from_missing_file() {
        let result = Patch::from_file("not-exist.sql").await;
        assert!(matches!(result, Err(PatchError::Io(_))));
    }
}
