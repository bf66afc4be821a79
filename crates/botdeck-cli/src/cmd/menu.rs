//! The interactive console: refresh, render, read one choice, act, repeat.

use crate::context::Console;
use crate::supervisor::describe;
use crate::theme::{Role, Theme};
use botdeck_core::inventory::{Inventory, Selection};
use botdeck_core::paths;
use botdeck_core::process::BotStatus;
use botdeck_core::site_status::SiteStatus;
use botdeck_core::webserver::ActiveWebServer;
use console::Term;
use dialoguer::{Confirm, Input};
use std::time::Duration;

const ACTION_PAUSE: Duration = Duration::from_secs(2);
const MENU_WIDTH: usize = 40;
const SUBMENU_WIDTH: usize = 35;

enum Flow {
    Continue,
    Quit,
}

pub fn run(console: &Console) -> anyhow::Result<()> {
    let term = Term::stdout();
    if !term.is_term() {
        anyhow::bail!("the interactive menu needs a terminal; use `botdeck list` instead");
    }

    loop {
        let inventory = console.refresh();
        render(console, &term, &inventory)?;
        if inventory.is_empty() {
            return Ok(());
        }

        let choice = prompt(&console.theme, "Select item number or enter a command")?;
        match dispatch(console, &term, &inventory, &choice) {
            Ok(Flow::Quit) => {
                term.clear_screen()?;
                println!("{}", console.theme.paint("Exiting...", Role::Heading));
                return Ok(());
            }
            Ok(Flow::Continue) => {}
            Err(e) => println!("{}", console.theme.paint(format!("{e:#}"), Role::Bad)),
        }
        std::thread::sleep(ACTION_PAUSE);
    }
}

fn dispatch(console: &Console, term: &Term, inventory: &Inventory, choice: &str) -> anyhow::Result<Flow> {
    let theme = &console.theme;
    match choice {
        "q" => return Ok(Flow::Quit),
        "r" => {
            println!("\n{}\n", theme.paint("Restarting all active bots...", Role::Notice));
            let results = console
                .supervisor()
                .restart_all(&inventory.bots, console.restart_pause());
            super::bot::print_restart_all(theme, &results);
        }
        "s" if inventory.web_server.is_active() => {
            super::reload::apply(console, &inventory.web_server)?;
        }
        _ => match choice.parse::<usize>() {
            Ok(number) => match inventory.select(number) {
                Some(Selection::Bot(bot)) => bot_menu(console, term, bot)?,
                Some(Selection::Site(site)) => site_menu(console, term, &inventory.web_server, site)?,
                None => println!("{}", theme.paint("Invalid number.", Role::Bad)),
            },
            Err(_) => println!("{}", theme.paint("Invalid input.", Role::Bad)),
        },
    }
    Ok(Flow::Continue)
}

// ---------------------------------------------------------------------------
// Main screen
// ---------------------------------------------------------------------------

fn render(console: &Console, term: &Term, inventory: &Inventory) -> anyhow::Result<()> {
    let theme = &console.theme;
    term.clear_screen()?;
    let (_, columns) = term.size();
    let title = format!("{:^width$}", "BOTDECK CONTROL PANEL", width = columns as usize);
    println!("{}", theme.bold(theme.gradient(&title)));

    if inventory.is_empty() {
        println!(
            "\nNo bots found in {} and no sites for the detected web server.",
            theme.paint(console.bots_root.display().to_string(), Role::Heading)
        );
        return Ok(());
    }

    println!("\n{}", theme.bold(theme.paint("Bots:", Role::Heading)));
    if inventory.bots.is_empty() {
        println!("  No bots found.");
    }
    for (n, bot) in inventory.numbered_bots() {
        let venv = if bot.project.uses_venv() {
            format!(" {}", theme.paint("(venv)", Role::Accent))
        } else {
            String::new()
        };
        println!(
            "  {} {:<20}{venv} - {}",
            theme.paint(format!("[{n}]"), Role::Notice),
            bot.project.name,
            crate::view::bot_line(theme, bot, &console.zone)
        );
    }

    let server = &inventory.web_server;
    println!(
        "\n{}",
        theme.bold(theme.paint(format!("Sites ({}):", server.display_name()), Role::Heading))
    );
    if inventory.sites.is_empty() {
        match server.kind {
            Some(kind) => println!(
                "  No sites found in '{}'.",
                paths::sites_available_dir(&console.settings.web.config_root, kind).display()
            ),
            None => println!("  Web server not detected or not supported."),
        }
    }
    for (n, site) in inventory.numbered_sites() {
        println!(
            "  {} {:<20} - {}",
            theme.paint(format!("[{n}]"), Role::Notice),
            site.site.domain,
            crate::view::site_line(theme, site)
        );
    }

    if server.is_active() {
        println!("\n{}", theme.bold(theme.paint("Web server:", Role::Heading)));
        println!("  {:<22} - {}", server.display_name(), crate::view::web_line(theme, server));
    }

    println!("\n{}", theme.paint("─".repeat(MENU_WIDTH), Role::Accent));
    println!("{}", theme.bold("--- Actions ---"));
    println!(
        "  {} Restart {} active bots {}",
        theme.paint("[r]", Role::Notice),
        theme.bold("ALL"),
        theme.paint("(without logging)", Role::Bad)
    );
    if server.is_active() {
        println!(
            "  {} Soft reload web server ({})",
            theme.paint("[s]", Role::Notice),
            server.display_name()
        );
    }
    println!("  {} Quit", theme.paint("[q]", Role::Notice));
    println!("{}", theme.separator(MENU_WIDTH));
    Ok(())
}

// ---------------------------------------------------------------------------
// Sub-menus
// ---------------------------------------------------------------------------

fn bot_menu(console: &Console, term: &Term, bot: &BotStatus) -> anyhow::Result<()> {
    let theme = &console.theme;
    term.clear_screen()?;
    println!(
        "{}",
        theme.bold(theme.paint(format!("--- Bot management: '{}' ---", bot.project.name), Role::Notice))
    );
    println!("  Status: {}", crate::view::bot_line(theme, bot, &console.zone));
    println!("\n{}", theme.separator(SUBMENU_WIDTH));
    if bot.is_running() {
        println!("  {} Stop", theme.paint("[1]", Role::Notice));
        println!("  {} Restart", theme.paint("[2]", Role::Notice));
    } else {
        println!("  {} Start", theme.paint("[1]", Role::Notice));
    }
    println!("  {} Back", theme.paint("[any other key]", Role::Notice));
    println!("{}", theme.separator(SUBMENU_WIDTH));

    let action = prompt(theme, "Choose action")?;
    let supervisor = console.supervisor();
    match (bot.is_running(), action.as_str()) {
        (true, "1") => {
            let outcome = supervisor.stop(bot)?;
            super::bot::print_stop(theme, bot, &outcome);
        }
        (true, "2") => {
            let logging = ask_logging()?;
            let report = supervisor.restart(bot, logging, console.restart_pause())?;
            super::bot::print_restart(theme, bot, &report);
        }
        (false, "1") => {
            let logging = ask_logging()?;
            println!(
                "{}",
                theme.paint(format!("Starting {}...", describe(&bot.project)), Role::Heading)
            );
            let report = supervisor.start(&bot.project, logging)?;
            super::bot::print_start(theme, &report);
        }
        _ => {}
    }
    Ok(())
}

fn site_menu(
    console: &Console,
    term: &Term,
    server: &ActiveWebServer,
    site: &SiteStatus,
) -> anyhow::Result<()> {
    let theme = &console.theme;
    if !server.is_active() {
        println!(
            "{}",
            theme.paint("Site management is available only for Nginx/Apache.", Role::Notice)
        );
        return Ok(());
    }

    term.clear_screen()?;
    println!(
        "{}",
        theme.bold(theme.paint(format!("--- Site management: '{}' ---", site.site.domain), Role::Notice))
    );
    println!("  Status: {}", crate::view::site_line(theme, site));
    println!("  Root:   {} ({})", site.site.document_root.display(), site.site.content_kind);
    println!("\n{}", theme.separator(SUBMENU_WIDTH));
    let enable = !site.is_enabled();
    let label = if enable { "Enable site" } else { "Disable site" };
    println!("  {} {label}", theme.paint("[1]", Role::Notice));
    println!("  {} Back", theme.paint("[any other key]", Role::Notice));
    println!("{}", theme.separator(SUBMENU_WIDTH));

    if prompt(theme, "Choose action")? == "1" {
        super::site::toggle(console, server, site, enable)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

fn prompt(theme: &Theme, text: &str) -> anyhow::Result<String> {
    let answer: String = Input::new()
        .with_prompt(theme.bold(text))
        .allow_empty(true)
        .interact_text()?;
    Ok(answer.trim().to_lowercase())
}

fn ask_logging() -> anyhow::Result<bool> {
    Ok(Confirm::new()
        .with_prompt("Enable logging to file?")
        .default(true)
        .interact()?)
}
