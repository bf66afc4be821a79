//! Signals and spawns bot processes, and keeps the stop history in step.

use botdeck_core::history::HistoryStore;
use botdeck_core::io::ensure_dir;
use botdeck_core::launch::{LaunchDescriptor, LogPlan};
use botdeck_core::paths;
use botdeck_core::process::BotStatus;
use botdeck_core::settings::RuntimeSettings;
use botdeck_core::timefmt::DisplayZone;
use botdeck_core::walker::BotProject;
use botdeck_core::{BotdeckError, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use sysinfo::{Pid, ProcessStatus, Signal, System};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const KILL_WAIT: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StopOutcome {
    /// The process is gone. `forced` is set when the grace period ran out.
    Stopped { pid: u32, forced: bool },
    NotRunning,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartReport {
    pub name: String,
    pub pid: u32,
    pub launch: LaunchDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotated_to: Option<PathBuf>,
    /// Set when the previous log could not be moved aside; the new output is
    /// appended to it instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RestartReport {
    pub stop: StopOutcome,
    pub start: StartReport,
}

// ---------------------------------------------------------------------------
// Supervisor
// ---------------------------------------------------------------------------

pub struct Supervisor<'a> {
    pub runtime: &'a RuntimeSettings,
    pub history: &'a HistoryStore,
    pub zone: DisplayZone,
}

impl Supervisor<'_> {
    /// Terminate gracefully, escalate to a kill after the grace period, and
    /// record the stop once the process is observed gone.
    pub fn stop(&self, bot: &BotStatus) -> Result<StopOutcome> {
        let Some(pid) = bot.pid() else {
            return Ok(StopOutcome::NotRunning);
        };
        let forced = terminate(pid, Duration::from_secs(self.runtime.stop_grace_secs))?;
        tracing::info!(bot = %bot.project.name, pid, forced, "stopped");

        if let Err(e) = self.history.record_stop(&bot.project.directory, Utc::now()) {
            tracing::warn!(
                path = %self.history.path().display(),
                "failed to save stop history: {e}"
            );
        }
        Ok(StopOutcome::Stopped { pid, forced })
    }

    /// Spawn the bot detached in a new session, so it outlives the console
    /// and its controlling terminal. With `logging` the
    /// output goes to `logs/<name>.log`, rotating an existing file first.
    pub fn start(&self, project: &BotProject, logging: bool) -> Result<StartReport> {
        let launch = LaunchDescriptor::for_project(project, self.runtime);
        let mut command = Command::new(&launch.program);
        command
            .args(&launch.args)
            .current_dir(&launch.working_dir)
            .stdin(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // SAFETY: setsid is async-signal-safe and touches no parent state.
            unsafe {
                command.pre_exec(|| {
                    if libc::setsid() == -1 {
                        return Err(std::io::Error::last_os_error());
                    }
                    Ok(())
                });
            }
        }

        let mut report = StartReport {
            name: project.name.clone(),
            pid: 0,
            launch: launch.clone(),
            log_file: None,
            rotated_to: None,
            rotation_error: None,
        };

        if logging {
            ensure_dir(&paths::logs_dir(&project.directory))?;
            let plan = LogPlan::for_project(project, Utc::now(), &self.zone);
            if let Some(to) = &plan.rotate_to {
                match std::fs::rename(&plan.log_file, to) {
                    Ok(()) => report.rotated_to = Some(to.clone()),
                    Err(e) => {
                        tracing::warn!(log = %plan.log_file.display(), "log rotation failed: {e}");
                        report.rotation_error = Some(e.to_string());
                    }
                }
            }
            let log = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&plan.log_file)?;
            command.stdout(log.try_clone()?).stderr(log);
            report.log_file = Some(plan.log_file);
        } else {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let mut child = command.spawn().map_err(|source| BotdeckError::Spawn {
            program: launch.command_line(),
            source,
        })?;
        report.pid = child.id();
        // Reap the child if it exits while the console is still open.
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        tracing::info!(bot = %project.name, pid = report.pid, cmd = %launch.command_line(), "started");

        if let Err(e) = self.history.clear_on_start(&project.directory) {
            tracing::warn!(
                path = %self.history.path().display(),
                "failed to update stop history: {e}"
            );
        }
        Ok(report)
    }

    pub fn restart(&self, bot: &BotStatus, logging: bool, pause: Duration) -> Result<RestartReport> {
        let stop = self.stop(bot)?;
        if matches!(stop, StopOutcome::Stopped { .. }) {
            std::thread::sleep(pause);
        }
        let start = self.start(&bot.project, logging)?;
        Ok(RestartReport { stop, start })
    }

    /// Restart every running bot without logging. One failure does not stop
    /// the others; an empty result means nothing was running.
    pub fn restart_all<'b>(
        &self,
        bots: &'b [BotStatus],
        pause: Duration,
    ) -> Vec<(&'b BotStatus, Result<RestartReport>)> {
        bots.iter()
            .filter(|b| b.is_running())
            .map(|b| (b, self.restart(b, false, pause)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Signalling
// ---------------------------------------------------------------------------

/// Returns whether a forced kill was needed. A process that is already gone
/// counts as stopped.
fn terminate(pid: u32, grace: Duration) -> Result<bool> {
    let pid_s = Pid::from_u32(pid);
    let mut sys = System::new();
    if !is_alive(&mut sys, pid_s) {
        return Ok(false);
    }

    let sent = match sys.process(pid_s) {
        Some(p) => p.kill_with(Signal::Term).unwrap_or_else(|| p.kill()),
        None => return Ok(false),
    };
    if !sent && is_alive(&mut sys, pid_s) {
        return Err(BotdeckError::ProcessSignal {
            pid,
            reason: "permission denied".to_string(),
        });
    }
    if wait_for_exit(&mut sys, pid_s, grace) {
        return Ok(false);
    }

    tracing::debug!(pid, "grace period expired, killing");
    if let Some(p) = sys.process(pid_s) {
        p.kill();
    }
    if wait_for_exit(&mut sys, pid_s, KILL_WAIT) {
        Ok(true)
    } else {
        Err(BotdeckError::ProcessStillRunning { pid })
    }
}

fn wait_for_exit(sys: &mut System, pid: Pid, within: Duration) -> bool {
    let deadline = Instant::now() + within;
    loop {
        if !is_alive(sys, pid) {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn is_alive(sys: &mut System, pid: Pid) -> bool {
    if !sys.refresh_process(pid) {
        return false;
    }
    sys.process(pid)
        .is_some_and(|p| p.status() != ProcessStatus::Zombie)
}

/// Name shown for a project in action messages.
pub fn describe(project: &BotProject) -> String {
    format!("'{}' ({})", project.name, project.kind)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
