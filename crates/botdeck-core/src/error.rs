use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotdeckError {
    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error("bot not found: {0}")]
    BotNotFound(String),

    #[error("bot name '{name}' is ambiguous: {candidates}")]
    AmbiguousBot { name: String, candidates: String },

    #[error("site not found: {0}")]
    SiteNotFound(String),

    #[error("invalid selection '{0}'")]
    InvalidSelection(String),

    #[error("no active web server detected")]
    NoActiveWebServer,

    #[error("config file '{config}' not found in {dir}")]
    SiteConfigMissing { config: String, dir: PathBuf },

    #[error("failed to signal process {pid}: {reason}")]
    ProcessSignal { pid: u32, reason: String },

    #[error("process {pid} is still running after forced termination")]
    ProcessStillRunning { pid: u32 },

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("'{command}' failed (superuser privileges may be required): {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BotdeckError>;
