use crate::context::Console;
use crate::output::print_json;
use botdeck_core::settings::{Settings, WarnLevel};
use clap::Subcommand;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective settings
    Show,

    /// Validate the settings for common mistakes
    Validate,

    /// Write the default settings file if none exists
    Init,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(console: &Console, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(console, json),
        ConfigSubcommand::Validate => validate(console, json),
        ConfigSubcommand::Init => init(console, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(console: &Console, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "path": console.config_path,
            "exists": console.config_path.exists(),
            "bots_root": console.bots_root,
            "history_file": console.history.path(),
            "settings": console.settings,
        }));
    }

    let source = if console.config_path.exists() {
        console.config_path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", console.config_path.display())
    };
    println!("# settings: {source}");
    println!("# bots root: {}", console.bots_root.display());
    println!("# history: {}", console.history.path().display());
    print!("{}", serde_yaml::to_string(&console.settings)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(console: &Console, json: bool) -> anyhow::Result<()> {
    let warnings = console.settings.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Settings are valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("settings validation found errors");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

fn init(console: &Console, json: bool) -> anyhow::Result<()> {
    let path = &console.config_path;
    let created = !path.exists();
    if created {
        Settings::default().save(path)?;
    }

    if json {
        print_json(&serde_json::json!({ "path": path, "created": created }))
    } else {
        if created {
            println!("Wrote default settings to {}", path.display());
        } else {
            println!("Settings already exist at {}", path.display());
        }
        Ok(())
    }
}
