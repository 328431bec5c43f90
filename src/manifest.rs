//! Library manifest check
//!
//! Verifies that every path exported by `library.txt` exists under the
//! library root. Advisory: callers report the result, they do not fail on it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const EXPORT_DIRECTIVE: &str = "EXPORT";
pub const DEFAULT_MANIFEST: &str = "library.txt";

/// Process status of a `check` run that found missing files
pub const EXIT_MISSING_FILES: u8 = 2;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestCheck {
    pub manifest: PathBuf,
    /// Unique exported paths, relative to the root
    pub checked: Vec<String>,
    /// Full paths that do not exist
    pub missing: Vec<PathBuf>,
}

impl ManifestCheck {
    /// Read `<root>/<manifest_name>` and check it against `root`
    pub fn run(root: &Path, manifest_name: &str) -> Result<Self, ManifestError> {
        let manifest = root.join(manifest_name);
        let text = fs::read_to_string(&manifest).map_err(|source| ManifestError::Read {
            path: manifest.clone(),
            source,
        })?;
        Ok(Self::check_text(root, manifest, &text))
    }

    pub fn check_text(root: &Path, manifest: PathBuf, text: &str) -> Self {
        let checked = exported_paths(text);
        let missing: Vec<PathBuf> = checked
            .iter()
            .map(|rel| root.join(rel))
            .filter(|full| !full.exists())
            .collect();

        for path in &missing {
            tracing::warn!(path = %path.display(), "exported file does not exist");
        }

        Self { manifest, checked, missing }
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn exit_status(&self) -> u8 {
        if self.is_complete() { 0 } else { EXIT_MISSING_FILES }
    }

    /// Operator-facing verdict, one entry per line
    pub fn report_lines(&self) -> Vec<String> {
        if self.is_complete() {
            let name = self
                .manifest
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.manifest.display().to_string());
            return vec![format!("All files in {} exist", name)];
        }
        self.missing
            .iter()
            .map(|p| format!("Does not exist: '{}'", p.display()))
            .collect()
    }
}

/// Third token of every `EXPORT` line, deduplicated and sorted
pub fn exported_paths(text: &str) -> Vec<String> {
    let mut paths = BTreeSet::new();
    for (n, line) in text.lines().enumerate() {
        if !line.starts_with(EXPORT_DIRECTIVE) {
            continue;
        }
        match line.split_whitespace().nth(2) {
            Some(path) => {
                paths.insert(path.to_string());
            }
            None => tracing::warn!(line = n + 1, "EXPORT line without a path, skipped"),
        }
    }
    paths.into_iter().collect()
}
