use crate::context::Console;
use crate::output::print_json;
use crate::supervisor::{describe, RestartReport, StartReport, StopOutcome};
use crate::theme::{Role, Theme};
use anyhow::Context;
use botdeck_core::process::BotStatus;

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

pub fn start(console: &Console, target: &str, logging: bool, json: bool) -> anyhow::Result<()> {
    let inventory = console.refresh();
    let bot = inventory.find_bot(target)?;
    if let Some(pid) = bot.pid() {
        anyhow::bail!("'{}' is already running (pid {pid})", bot.project.name);
    }
    let report = console
        .supervisor()
        .start(&bot.project, logging)
        .with_context(|| format!("failed to start {}", describe(&bot.project)))?;

    if json {
        print_json(&report)
    } else {
        print_start(&console.theme, &report);
        Ok(())
    }
}

pub fn stop(console: &Console, target: &str, json: bool) -> anyhow::Result<()> {
    let inventory = console.refresh();
    let bot = inventory.find_bot(target)?;
    let outcome = console
        .supervisor()
        .stop(bot)
        .with_context(|| format!("failed to stop {}", describe(&bot.project)))?;

    if json {
        print_json(&outcome)
    } else {
        print_stop(&console.theme, bot, &outcome);
        Ok(())
    }
}

pub fn restart(console: &Console, target: &str, logging: bool, json: bool) -> anyhow::Result<()> {
    let inventory = console.refresh();
    let bot = inventory.find_bot(target)?;
    let report = console
        .supervisor()
        .restart(bot, logging, console.restart_pause())
        .with_context(|| format!("failed to restart {}", describe(&bot.project)))?;

    if json {
        print_json(&report)
    } else {
        print_restart(&console.theme, bot, &report);
        Ok(())
    }
}

pub fn restart_all(console: &Console, json: bool) -> anyhow::Result<()> {
    let inventory = console.refresh();
    let results = console
        .supervisor()
        .restart_all(&inventory.bots, console.restart_pause());
    let failed = results.iter().filter(|(_, r)| r.is_err()).count();

    if json {
        let value: Vec<serde_json::Value> = results
            .iter()
            .map(|(bot, r)| match r {
                Ok(report) => serde_json::json!({ "name": bot.project.name, "ok": true, "report": report }),
                Err(e) => serde_json::json!({ "name": bot.project.name, "ok": false, "error": e.to_string() }),
            })
            .collect();
        print_json(&value)?;
    } else {
        print_restart_all(&console.theme, &results);
    }

    if failed > 0 {
        anyhow::bail!("{failed} bot(s) failed to restart");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Human-readable reports, shared with the menu
// ---------------------------------------------------------------------------

pub fn print_start(theme: &Theme, report: &StartReport) {
    if report.launch.uses_venv {
        println!("{}", theme.paint("   Using virtual environment (venv).", Role::Accent));
    }
    if let Some(to) = &report.rotated_to {
        println!(
            "{}",
            theme.paint(format!("Old log renamed to: {}", to.display()), Role::Notice)
        );
    }
    if let Some(err) = &report.rotation_error {
        println!(
            "{}",
            theme.paint(format!("Failed to rename old log file: {err}"), Role::Bad)
        );
    }
    let line = match &report.log_file {
        Some(log) => format!(
            "'{}' started (pid {}). Logs are written to: {}",
            report.name,
            report.pid,
            log.display()
        ),
        None => format!(
            "'{}' started in background (pid {}, no logging).",
            report.name, report.pid
        ),
    };
    println!("{}", theme.paint(line, Role::Good));
}

pub fn print_stop(theme: &Theme, bot: &BotStatus, outcome: &StopOutcome) {
    match outcome {
        StopOutcome::Stopped { pid, forced } => {
            let how = if *forced { "killed" } else { "terminated" };
            println!(
                "{}",
                theme.paint(
                    format!("Session for '{}' (pid {pid}) {how}.", bot.project.name),
                    Role::Good
                )
            );
        }
        StopOutcome::NotRunning => println!(
            "{}",
            theme.paint(
                format!("Bot '{}' has no active process.", bot.project.name),
                Role::Notice
            )
        ),
    }
}

pub fn print_restart(theme: &Theme, bot: &BotStatus, report: &RestartReport) {
    print_stop(theme, bot, &report.stop);
    print_start(theme, &report.start);
}

pub fn print_restart_all(theme: &Theme, results: &[(&BotStatus, botdeck_core::Result<RestartReport>)]) {
    if results.is_empty() {
        println!("There were no active bots to restart.");
        return;
    }
    for (bot, result) in results {
        match result {
            Ok(report) => print_restart(theme, bot, report),
            Err(e) => println!(
                "{}",
                theme.paint(
                    format!("Failed to restart '{}': {e}", bot.project.name),
                    Role::Bad
                )
            ),
        }
    }
}
