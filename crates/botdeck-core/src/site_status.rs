use crate::catalog::SiteEntry;
use crate::error::{BotdeckError, Result};
use crate::io::link_exists;
use crate::paths;
use crate::webserver::ActiveWebServer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// SiteState / SiteStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteState {
    Enabled,
    Disabled,
    /// No supported web server is active, or its enabled directory is absent.
    Unknown,
}

impl SiteState {
    pub fn as_str(self) -> &'static str {
        match self {
            SiteState::Enabled => "enabled",
            SiteState::Disabled => "disabled",
            SiteState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SiteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteStatus {
    #[serde(flatten)]
    pub site: SiteEntry,
    pub state: SiteState,
}

impl SiteStatus {
    pub fn is_enabled(&self) -> bool {
        self.state == SiteState::Enabled
    }
}

/// Enabled means a link named after the config file exists in
/// `sites-enabled`. A dangling link still counts.
pub fn resolve_site_states(
    sites: Vec<SiteEntry>,
    server: &ActiveWebServer,
    web_root: &Path,
) -> Vec<SiteStatus> {
    let Some(kind) = server.kind else {
        return sites
            .into_iter()
            .map(|site| SiteStatus {
                site,
                state: SiteState::Unknown,
            })
            .collect();
    };

    let enabled_dir = paths::sites_enabled_dir(web_root, kind);
    let enabled_dir_present = enabled_dir.is_dir();

    sites
        .into_iter()
        .map(|site| {
            let state = if !enabled_dir_present {
                SiteState::Unknown
            } else if link_exists(&enabled_dir.join(&site.config_file_name)) {
                SiteState::Enabled
            } else {
                SiteState::Disabled
            };
            SiteStatus { site, state }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// SiteLinkPlan
// ---------------------------------------------------------------------------

/// What a privileged helper has to do to flip a site on or off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteLinkPlan {
    pub available_path: PathBuf,
    pub enabled_path: PathBuf,
    pub config_file_name: String,
    pub enable: bool,
}

impl SiteLinkPlan {
    pub fn for_site(site: &SiteEntry, web_root: &Path, enable: bool) -> Result<Self> {
        let available_dir = paths::sites_available_dir(web_root, site.server);
        let available_path = available_dir.join(&site.config_file_name);
        if !available_path.exists() {
            return Err(BotdeckError::SiteConfigMissing {
                config: site.config_file_name.clone(),
                dir: available_dir,
            });
        }
        Ok(Self {
            enabled_path: paths::sites_enabled_dir(web_root, site.server)
                .join(&site.config_file_name),
            available_path,
            config_file_name: site.config_file_name.clone(),
            enable,
        })
    }

    /// Command line that applies the plan, without any privilege prefix.
    pub fn command(&self) -> Vec<String> {
        if self.enable {
            vec![
                "ln".to_string(),
                "-s".to_string(),
                self.available_path.display().to_string(),
                self.enabled_path.display().to_string(),
            ]
        } else {
            vec!["rm".to_string(), self.enabled_path.display().to_string()]
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
