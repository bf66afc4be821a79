//! Process table snapshot and bot liveness correlation.
//!
//! Liveness is decided by working directory: a bot is running when some
//! process sits in its directory. That match is re-derived on every refresh
//! and can be fooled by an unrelated process reusing the directory, so each
//! match records whether the process command line also names the bot's entry
//! script.

use crate::history::History;
use crate::io::normalize_dir;
use crate::walker::BotProject;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ProcessEntry / ProcessSource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub parent: Option<u32>,
    /// `None` when the working directory cannot be read (other users'
    /// processes, kernel threads).
    pub cwd: Option<PathBuf>,
    /// Epoch seconds.
    pub started_at: u64,
    pub cmd: Vec<String>,
}

pub trait ProcessSource {
    fn snapshot(&self) -> Vec<ProcessEntry>;
}

/// Live process table read through `sysinfo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcesses;

impl ProcessSource for SystemProcesses {
    fn snapshot(&self) -> Vec<ProcessEntry> {
        use sysinfo::{ProcessRefreshKind, ProcessStatus, System, UpdateKind};

        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessRefreshKind::new()
                .with_cwd(UpdateKind::Always)
                .with_cmd(UpdateKind::Always),
        );

        let entries = sys
            .processes()
            .values()
            .filter(|p| p.status() != ProcessStatus::Zombie)
            .map(|p| ProcessEntry {
                pid: p.pid().as_u32(),
                parent: p.parent().map(|pid| pid.as_u32()),
                cwd: p
                    .cwd()
                    .filter(|c| !c.as_os_str().is_empty())
                    .map(Path::to_path_buf),
                started_at: p.start_time(),
                cmd: p.cmd().to_vec(),
            })
            .collect();
        without_lineage(entries, std::process::id())
    }
}

/// Drop `own_pid` and every ancestor of it, such as the shell the console
/// was launched from.
pub fn without_lineage(entries: Vec<ProcessEntry>, own_pid: u32) -> Vec<ProcessEntry> {
    let parents: HashMap<u32, u32> = entries
        .iter()
        .filter_map(|e| e.parent.map(|parent| (e.pid, parent)))
        .collect();

    let mut lineage = HashSet::from([own_pid]);
    let mut current = own_pid;
    while let Some(&parent) = parents.get(&current) {
        if !lineage.insert(parent) {
            break;
        }
        current = parent;
    }

    entries
        .into_iter()
        .filter(|e| !lineage.contains(&e.pid))
        .collect()
}

// ---------------------------------------------------------------------------
// Liveness
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchIdentity {
    /// The process command line names the bot's entry script.
    Verified,
    /// Only the working directory matched.
    DirectoryOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Liveness {
    Running {
        pid: u32,
        live_since: DateTime<Utc>,
        identity: MatchIdentity,
    },
    Stopped {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_stopped_at: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotStatus {
    #[serde(flatten)]
    pub project: BotProject,
    pub liveness: Liveness,
}

impl BotStatus {
    pub fn pid(&self) -> Option<u32> {
        match self.liveness {
            Liveness::Running { pid, .. } => Some(pid),
            Liveness::Stopped { .. } => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.pid().is_some()
    }
}

// ---------------------------------------------------------------------------
// ProcessIndex
// ---------------------------------------------------------------------------

/// Running processes grouped by canonical working directory.
#[derive(Debug, Default)]
pub struct ProcessIndex {
    by_dir: HashMap<PathBuf, Vec<ProcessEntry>>,
}

impl ProcessIndex {
    pub fn build(entries: Vec<ProcessEntry>) -> Self {
        let mut by_dir: HashMap<PathBuf, Vec<ProcessEntry>> = HashMap::new();
        for entry in entries {
            let Some(cwd) = entry.cwd.as_deref() else {
                continue;
            };
            by_dir.entry(normalize_dir(cwd)).or_default().push(entry);
        }
        for group in by_dir.values_mut() {
            group.sort_by_key(|p| (p.started_at, p.pid));
        }
        Self { by_dir }
    }

    pub fn len(&self) -> usize {
        self.by_dir.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_dir.is_empty()
    }

    /// The process standing for `project`: one naming the entry script if
    /// any, else the oldest process in the directory.
    pub fn lookup(&self, project: &BotProject) -> Option<(&ProcessEntry, MatchIdentity)> {
        let group = self.by_dir.get(&project.directory)?;
        if let Some(p) = group
            .iter()
            .find(|p| mentions_script(&p.cmd, &project.entry_script))
        {
            return Some((p, MatchIdentity::Verified));
        }
        group.first().map(|p| (p, MatchIdentity::DirectoryOnly))
    }
}

fn mentions_script(cmd: &[String], script: &str) -> bool {
    cmd.iter()
        .skip(1)
        .any(|arg| Path::new(arg).file_name().is_some_and(|n| n == script))
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Attach liveness to every project: running processes first, the last
/// recorded stop otherwise.
pub fn correlate(projects: Vec<BotProject>, index: &ProcessIndex, history: &History) -> Vec<BotStatus> {
    projects
        .into_iter()
        .map(|project| {
            let liveness = match index.lookup(&project) {
                Some((process, identity)) => Liveness::Running {
                    pid: process.pid,
                    live_since: Utc
                        .timestamp_opt(process.started_at as i64, 0)
                        .single()
                        .unwrap_or_default(),
                    identity,
                },
                None => Liveness::Stopped {
                    last_stopped_at: history.last_stopped(&project.directory),
                },
            };
            BotStatus { project, liveness }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
