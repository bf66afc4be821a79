use crate::site_config::{self, ParsedSite};
use crate::types::{ContentKind, Discovery, DiscoveryWarning, WebServerKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// SiteEntry
// ---------------------------------------------------------------------------

/// One virtual host derived from a single file in `sites-available`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteEntry {
    pub domain: String,
    pub config_file_name: String,
    pub document_root: PathBuf,
    pub content_kind: ContentKind,
    pub server: WebServerKind,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Parse every file in `available_dir`, in sorted file-name order, keeping the
/// sites whose document root exists.
///
/// Unreadable files are skipped with a warning. A missing directory is an
/// empty catalog.
pub fn build_catalog(available_dir: &Path, server: WebServerKind) -> Discovery<SiteEntry> {
    let mut catalog = Discovery::empty();

    let entries = match std::fs::read_dir(available_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %available_dir.display(), error = %e, "no site configs");
            return catalog;
        }
    };

    let mut files: Vec<(String, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .map(|e| (e.file_name().to_string_lossy().into_owned(), e.path()))
        .filter(|(_, path)| path.is_file())
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));

    for (file_name, path) in files {
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                catalog.warn(DiscoveryWarning::new(
                    &path,
                    format!("failed to read or parse {server} config: {e}"),
                ));
                continue;
            }
        };

        let Some(ParsedSite {
            domain,
            document_root,
        }) = site_config::parse(server, &text, &file_name)
        else {
            tracing::debug!(config = %file_name, "no actionable site");
            continue;
        };

        if !document_root.is_dir() {
            tracing::debug!(
                config = %file_name,
                root = %document_root.display(),
                "document root missing"
            );
            continue;
        }

        catalog.items.push(SiteEntry {
            domain,
            config_file_name: file_name,
            content_kind: site_config::content_kind(&document_root),
            document_root,
            server,
        });
    }

    catalog
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
