use crate::context::Console;
use crate::output::{print_json, print_table};
use crate::view;

pub fn run(console: &Console, json: bool) -> anyhow::Result<()> {
    let inventory = console.refresh();

    if json {
        let value = serde_json::json!({
            "bots_root": console.bots_root,
            "web_server": {
                "kind": inventory.web_server.kind,
                "name": inventory.web_server.display_name(),
                "active": inventory.web_server.is_active(),
            },
            "bots": inventory.bots,
            "sites": inventory.sites,
            "selectables": inventory.selectables(),
            "warnings": inventory.warnings,
        });
        return print_json(&value);
    }

    if inventory.is_empty() {
        println!(
            "No bots found in {} and no sites for the detected web server.",
            console.bots_root.display()
        );
        return Ok(());
    }

    if inventory.bots.is_empty() {
        println!("No bots found.");
    } else {
        let rows = inventory
            .numbered_bots()
            .map(|(n, b)| {
                vec![
                    n.to_string(),
                    b.project.name.clone(),
                    if b.project.uses_venv() {
                        format!("{} (venv)", b.project.kind)
                    } else {
                        b.project.kind.to_string()
                    },
                    view::bot_state(b),
                    view::bot_since(b, &console.zone),
                ]
            })
            .collect();
        print_table(&["#", "BOT", "KIND", "STATUS", "SINCE"], rows);
    }

    println!();
    let server = inventory.web_server.display_name();
    if inventory.sites.is_empty() {
        if inventory.web_server.is_active() {
            println!("No sites found for {server}.");
        } else {
            println!("Web server not detected.");
        }
    } else {
        let rows = inventory
            .numbered_sites()
            .map(|(n, s)| {
                vec![
                    n.to_string(),
                    s.site.domain.clone(),
                    s.site.content_kind.to_string(),
                    s.state.to_string(),
                    s.site.document_root.display().to_string(),
                ]
            })
            .collect();
        print_table(&["#", "SITE", "CONTENT", "STATUS", "ROOT"], rows);
    }

    println!();
    println!(
        "Web server: {server} ({})",
        if inventory.web_server.is_active() {
            "active"
        } else {
            "not found"
        }
    );
    Ok(())
}
