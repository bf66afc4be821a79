//! Depth-first discovery of bot roots under a start directory.

use crate::classifier::{BotConventions, Classification};
use crate::io::normalize_dir;
use crate::types::{BotKind, Discovery, DiscoveryWarning};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// ---------------------------------------------------------------------------
// BotProject
// ---------------------------------------------------------------------------

/// One discovered bot root. Rebuilt on every refresh; identity across
/// refreshes is the `directory`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotProject {
    pub name: String,
    pub directory: PathBuf,
    pub kind: BotKind,
    pub entry_script: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter_override: Option<PathBuf>,
}

impl BotProject {
    fn from_classification(
        dir: &Path,
        classification: Classification,
        conventions: &BotConventions,
    ) -> Self {
        let interpreter_override = match classification.kind {
            BotKind::Python => conventions.find_venv_interpreter(dir),
            BotKind::Nodejs => None,
        };
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());
        Self {
            name,
            directory: dir.to_path_buf(),
            kind: classification.kind,
            entry_script: classification.entry_script,
            interpreter_override,
        }
    }

    pub fn uses_venv(&self) -> bool {
        self.interpreter_override.is_some()
    }
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

/// Walk `start` depth-first in file-name order and return every bot root.
///
/// A bot root owns its subtree: nothing below it is classified. A missing
/// start directory yields an empty result with a warning.
pub fn discover_bots(start: &Path, conventions: &BotConventions) -> Discovery<BotProject> {
    let mut found = Discovery::empty();

    if !start.is_dir() {
        found.warn(DiscoveryWarning::new(start, "bots directory not found"));
        return found;
    }
    let start = normalize_dir(start);

    let mut walker = WalkDir::new(&start)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_type().is_dir());

    while let Some(next) = walker.next() {
        let entry = match next {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                found.warn(DiscoveryWarning::new(path, format!("cannot read directory: {e}")));
                continue;
            }
        };

        let dir = entry.path();
        let files = match list_files(dir) {
            Ok(files) => files,
            Err(e) => {
                found.warn(DiscoveryWarning::new(dir, format!("cannot list directory: {e}")));
                continue;
            }
        };

        if let Some(classification) = conventions.classify(&files) {
            tracing::debug!(dir = %dir.display(), kind = %classification.kind, "bot root");
            found
                .items
                .push(BotProject::from_classification(dir, classification, conventions));
            walker.skip_current_dir();
        }
    }

    found
}

/// Names of the non-directory entries directly inside `dir`.
fn list_files(dir: &Path) -> std::io::Result<HashSet<String>> {
    let mut files = HashSet::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() || (file_type.is_symlink() && entry.path().is_dir()) {
            continue;
        }
        files.insert(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(files)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
