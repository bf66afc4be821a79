use crate::context::Console;
use crate::output::print_json;
use crate::theme::{Role, Theme};
use anyhow::Context;
use botdeck_core::site_status::{SiteLinkPlan, SiteStatus};
use botdeck_core::webserver::ActiveWebServer;
use botdeck_core::BotdeckError;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum SiteSubcommand {
    /// Link a site into sites-enabled and reload the web server
    Enable {
        /// Selection number or domain
        target: String,
    },

    /// Remove a site from sites-enabled and reload the web server
    Disable {
        /// Selection number or domain
        target: String,
    },
}

pub fn run(console: &Console, subcmd: SiteSubcommand, json: bool) -> anyhow::Result<()> {
    let (target, enable) = match subcmd {
        SiteSubcommand::Enable { target } => (target, true),
        SiteSubcommand::Disable { target } => (target, false),
    };
    let inventory = console.refresh();
    if !inventory.web_server.is_active() {
        return Err(BotdeckError::NoActiveWebServer.into());
    }
    let site = inventory.find_site(&target)?;
    let plan = toggle(console, &inventory.web_server, site, enable)?;

    if json {
        print_json(&serde_json::json!({
            "site": site.site.domain,
            "enabled": enable,
            "plan": plan,
        }))
    } else {
        Ok(())
    }
}

/// Flip the link, then reload. Shared with the menu.
pub fn toggle(
    console: &Console,
    server: &ActiveWebServer,
    site: &SiteStatus,
    enable: bool,
) -> anyhow::Result<SiteLinkPlan> {
    let theme = &console.theme;
    let domain = &site.site.domain;
    let verb = if enable { "Enabling" } else { "Disabling" };
    note(theme, format!("{verb} site '{domain}'..."), Role::Heading);

    let plan = console
        .privileged()
        .toggle_site(site, enable)
        .with_context(|| format!("error while {} site '{domain}'", verb.to_lowercase()))?;
    let done = if enable { "enabled" } else { "disabled" };
    note(theme, format!("Site '{domain}' successfully {done}."), Role::Good);

    super::reload::apply(console, server)?;
    Ok(plan)
}

fn note(theme: &Theme, line: String, role: Role) {
    eprintln!("{}", theme.paint(line, role));
}
