//! Patch discovery on the filesystem.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::PatchResult;
use crate::patch::{Patch, is_patch_file};
use crate::patch_set::PatchSet;

impl PatchSet {
    /// Register patch files found at `path`.
    ///
    /// A file is added if its name ends with `.sql`. A directory is scanned
    /// recursively; entries whose name starts with a dot are skipped, and a
    /// directory reached twice through symlinks is only scanned once. Returns
    /// the number of patch files read.
    pub async fn add_path(&mut self, path: impl AsRef<Path>) -> PatchResult<usize> {
        let mut read = 0;
        let mut pending = vec![path.as_ref().to_path_buf()];
        let mut visited = HashSet::new();

        while let Some(path) = pending.pop() {
            let metadata = tokio::fs::metadata(&path).await?;

            if metadata.is_dir() {
                if !visited.insert(tokio::fs::canonicalize(&path).await?) {
                    debug!(path = %path.display(), "Skipping directory already scanned");
                    continue;
                }
                let mut children = list_dir(&path).await?;
                // Popped from the back, so keep the sorted order by reversing.
                children.reverse();
                pending.extend(children);
            } else if is_patch_path(&path) {
                let patch = Patch::from_file(&path).await?;
                debug!(patch = %patch.name(), path = %path.display(), "Registering patch");
                self.add(patch)?;
                read += 1;
            }
        }

        Ok(read)
    }

    /// Build a set from a list of files and directories.
    pub async fn from_paths<I, P>(paths: I) -> PatchResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut set = Self::new();
        for path in paths {
            set.add_path(path).await?;
        }
        Ok(set)
    }
}

/// List the visible entries of a directory, sorted by name.
async fn list_dir(dir: &Path) -> PatchResult<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut paths = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden {
            paths.push(entry.path());
        }
    }

    paths.sort();
    Ok(paths)
}

fn is_patch_path(path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    match name.to_str() {
        Some(name) => is_patch_file(name),
        None => {
            if name.to_string_lossy().ends_with(".sql") {
                warn!(path = %path.display(), "Skipping patch file with a non UTF-8 name");
            }
            false
        }
    }
}
