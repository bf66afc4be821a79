use crate::error::{BotdeckError, Result};
use crate::types::WebServerKind;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const SITES_AVAILABLE_DIR: &str = "sites-available";
pub const SITES_ENABLED_DIR: &str = "sites-enabled";
pub const LOGS_DIR: &str = "logs";

pub const CONFIG_FILE: &str = ".config/botdeck/config.yaml";
pub const HISTORY_FILE: &str = ".manager_state.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn sites_available_dir(web_root: &Path, server: WebServerKind) -> PathBuf {
    web_root.join(server.service_name()).join(SITES_AVAILABLE_DIR)
}

pub fn sites_enabled_dir(web_root: &Path, server: WebServerKind) -> PathBuf {
    web_root.join(server.service_name()).join(SITES_ENABLED_DIR)
}

pub fn logs_dir(bot_dir: &Path) -> PathBuf {
    bot_dir.join(LOGS_DIR)
}

pub fn log_file(bot_dir: &Path, name: &str) -> PathBuf {
    logs_dir(bot_dir).join(format!("{name}.log"))
}

pub fn rotated_log_file(bot_dir: &Path, name: &str, stamp: &str) -> PathBuf {
    logs_dir(bot_dir).join(format!("{name}_{stamp}.log"))
}

pub fn home_dir() -> Result<PathBuf> {
    home::home_dir().ok_or(BotdeckError::HomeNotFound)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(home_dir()?.join(CONFIG_FILE))
}

pub fn default_history_path() -> Result<PathBuf> {
    Ok(home_dir()?.join(HISTORY_FILE))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
