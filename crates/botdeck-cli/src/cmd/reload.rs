use crate::context::Console;
use crate::output::print_json;
use crate::theme::Role;
use anyhow::Context;
use botdeck_core::webserver::ActiveWebServer;

pub fn run(console: &Console, json: bool) -> anyhow::Result<()> {
    let inventory = console.refresh();
    apply(console, &inventory.web_server)?;
    if json {
        print_json(&serde_json::json!({
            "reloaded": inventory.web_server.service_name(),
        }))?;
    }
    Ok(())
}

pub fn apply(console: &Console, server: &ActiveWebServer) -> anyhow::Result<()> {
    let theme = &console.theme;
    let name = server.display_name();
    if server.is_active() {
        eprintln!(
            "{}",
            theme.paint(format!("Applying configuration for {name}..."), Role::Heading)
        );
    }
    console
        .privileged()
        .reload(server)
        .with_context(|| format!("error reloading {name}"))?;
    eprintln!(
        "{}",
        theme.paint(format!("{name} reloaded successfully."), Role::Good)
    );
    Ok(())
}
