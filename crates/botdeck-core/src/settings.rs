use crate::classifier::BotConventions;
use crate::error::Result;
use crate::paths;
use crate::timefmt::DisplayZone;
use crate::webserver::WebServerSelection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// SettingsWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// RuntimeSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    #[serde(default = "default_system_python")]
    pub system_python: String,
    #[serde(default = "default_node_binary")]
    pub node_binary: String,
    /// Seconds between the graceful terminate and the forced kill.
    #[serde(default = "default_stop_grace_secs")]
    pub stop_grace_secs: u64,
    #[serde(default = "default_restart_pause_ms")]
    pub restart_pause_ms: u64,
}

fn default_system_python() -> String {
    "python3".to_string()
}

fn default_node_binary() -> String {
    "node".to_string()
}

fn default_stop_grace_secs() -> u64 {
    3
}

fn default_restart_pause_ms() -> u64 {
    1000
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            system_python: default_system_python(),
            node_binary: default_node_binary(),
            stop_grace_secs: default_stop_grace_secs(),
            restart_pause_ms: default_restart_pause_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// WebSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSettings {
    #[serde(default)]
    pub server: WebServerSelection,
    /// Parent of `<service>/sites-available` and `<service>/sites-enabled`.
    #[serde(default = "default_config_root")]
    pub config_root: PathBuf,
    /// Prefix link changes and reloads with `sudo`.
    #[serde(default = "default_use_sudo")]
    pub use_sudo: bool,
    /// Reload command; `{service}` is replaced by the service name.
    #[serde(default = "default_reload_command")]
    pub reload_command: Vec<String>,
}

fn default_config_root() -> PathBuf {
    PathBuf::from("/etc")
}

fn default_use_sudo() -> bool {
    true
}

fn default_reload_command() -> Vec<String> {
    ["systemctl", "reload", "{service}"]
        .map(String::from)
        .to_vec()
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            server: WebServerSelection::default(),
            config_root: default_config_root(),
            use_sudo: default_use_sudo(),
            reload_command: default_reload_command(),
        }
    }
}

impl WebSettings {
    pub fn reload_command_for(&self, service: &str) -> Vec<String> {
        self.reload_command
            .iter()
            .map(|part| part.replace("{service}", service))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Where bot discovery starts. The `--root` flag takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bots_root: Option<PathBuf>,
    #[serde(default)]
    pub discovery: BotConventions,
    #[serde(default)]
    pub runtime: RuntimeSettings,
    #[serde(default)]
    pub web: WebSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,
    /// Fixed UTC offset for displayed times; local time when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_utc_offset_hours: Option<i32>,
}

impl Settings {
    /// Load from `path`; a missing file means defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(&data)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    pub fn history_path(&self) -> Result<PathBuf> {
        match &self.history_file {
            Some(path) => Ok(path.clone()),
            None => paths::default_history_path(),
        }
    }

    pub fn display_zone(&self) -> DisplayZone {
        self.display_utc_offset_hours
            .and_then(DisplayZone::fixed_hours)
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<SettingsWarning> {
        let mut warnings = Vec::new();
        let mut push = |level: WarnLevel, message: String| {
            warnings.push(SettingsWarning { level, message })
        };

        if self.discovery.python_scripts.is_empty() && self.discovery.node_scripts.is_empty() {
            push(
                WarnLevel::Error,
                "discovery has no python_scripts or node_scripts: no bot can be found".to_string(),
            );
        }
        if self.discovery.node_manifest.trim().is_empty() && !self.discovery.node_scripts.is_empty()
        {
            push(
                WarnLevel::Warning,
                "discovery.node_manifest is empty: node bots cannot be matched".to_string(),
            );
        }
        if self.runtime.stop_grace_secs == 0 {
            push(
                WarnLevel::Warning,
                "runtime.stop_grace_secs is 0: bots are killed without a graceful window"
                    .to_string(),
            );
        }
        if self.web.reload_command.is_empty() {
            push(
                WarnLevel::Error,
                "web.reload_command is empty: web server cannot be reloaded".to_string(),
            );
        }
        if let Some(hours) = self.display_utc_offset_hours {
            if DisplayZone::fixed_hours(hours).is_none() {
                push(
                    WarnLevel::Warning,
                    format!("display_utc_offset_hours {hours} is out of range, using local time"),
                );
            }
        }
        if let Some(root) = &self.bots_root {
            if !root.is_dir() {
                push(
                    WarnLevel::Warning,
                    format!("bots_root '{}' does not exist", root.display()),
                );
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
