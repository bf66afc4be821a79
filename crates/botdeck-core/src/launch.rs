//! Everything a supervisor needs to spawn a bot, without spawning it.

use crate::paths;
use crate::settings::RuntimeSettings;
use crate::timefmt::DisplayZone;
use crate::types::BotKind;
use crate::walker::BotProject;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchDescriptor {
    pub kind: BotKind,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub uses_venv: bool,
}

impl LaunchDescriptor {
    /// Python bots run under their venv interpreter when one was found,
    /// otherwise the system interpreter; Node bots run under `node`.
    pub fn for_project(project: &BotProject, runtime: &RuntimeSettings) -> Self {
        let program = match (project.kind, &project.interpreter_override) {
            (BotKind::Python, Some(interpreter)) => interpreter.clone(),
            (BotKind::Python, None) => PathBuf::from(&runtime.system_python),
            (BotKind::Nodejs, _) => PathBuf::from(&runtime.node_binary),
        };
        Self {
            kind: project.kind,
            program,
            args: vec![project.entry_script.clone()],
            working_dir: project.directory.clone(),
            uses_venv: project.uses_venv(),
        }
    }

    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Where a bot's output goes, and where a previous log is moved first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogPlan {
    pub log_file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate_to: Option<PathBuf>,
}

impl LogPlan {
    pub fn for_project(project: &BotProject, now: DateTime<Utc>, zone: &DisplayZone) -> Self {
        let log_file = paths::log_file(&project.directory, &project.name);
        let rotate_to = log_file.exists().then(|| {
            paths::rotated_log_file(&project.directory, &project.name, &zone.file_stamp(now))
        });
        Self {
            log_file,
            rotate_to,
        }
    }
}
