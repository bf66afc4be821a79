//! Commands that need root: site symlinks and web server reloads.

use botdeck_core::settings::WebSettings;
use botdeck_core::site_status::{SiteLinkPlan, SiteStatus};
use botdeck_core::webserver::ActiveWebServer;
use botdeck_core::{BotdeckError, Result};
use std::process::Command;

pub struct Privileged<'a> {
    pub web: &'a WebSettings,
}

impl Privileged<'_> {
    /// `argv` with `sudo` in front when the settings ask for it.
    pub fn command_line(&self, argv: &[String]) -> Vec<String> {
        let mut line = Vec::with_capacity(argv.len() + 1);
        if self.web.use_sudo {
            line.push("sudo".to_string());
        }
        line.extend(argv.iter().cloned());
        line
    }

    pub fn run(&self, argv: &[String]) -> Result<()> {
        let line = self.command_line(argv);
        let Some((program, args)) = line.split_first() else {
            return Err(BotdeckError::InvalidSettings("empty command".to_string()));
        };
        tracing::debug!(cmd = %line.join(" "), "running privileged command");

        let output = Command::new(program).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BotdeckError::CommandNotFound(program.clone())
            } else {
                BotdeckError::Spawn {
                    program: program.clone(),
                    source: e,
                }
            }
        })?;
        if output.status.success() {
            return Ok(());
        }
        Err(BotdeckError::CommandFailed {
            command: line.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    /// Create or remove the `sites-enabled` link for a site. The caller
    /// reloads the server afterwards.
    pub fn toggle_site(&self, site: &SiteStatus, enable: bool) -> Result<SiteLinkPlan> {
        let plan = SiteLinkPlan::for_site(&site.site, &self.web.config_root, enable)?;
        self.run(&plan.command())?;
        tracing::info!(
            site = %site.site.domain,
            enabled = enable,
            "site link updated"
        );
        Ok(plan)
    }

    pub fn reload(&self, server: &ActiveWebServer) -> Result<()> {
        let service = server
            .service_name()
            .ok_or(BotdeckError::NoActiveWebServer)?;
        self.run(&self.web.reload_command_for(service))?;
        tracing::info!(service, "web server reloaded");
        Ok(())
    }
}
