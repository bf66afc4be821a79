use botdeck_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the directory the bot walker starts from.
///
/// Priority:
/// 1. `--root` flag / `BOTDECK_ROOT` env var (passed in as `explicit`)
/// 2. `bots_root` from the settings file
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>, configured: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit.or(configured) {
        return p.to_path_buf();
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Resolve the settings file: `--config` / `BOTDECK_CONFIG`, else the
/// per-user default.
pub fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => Ok(paths::default_config_path()?),
    }
}
