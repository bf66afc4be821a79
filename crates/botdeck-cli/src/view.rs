//! Short status strings shared by the table output and the menu.

use crate::theme::{Role, Theme};
use botdeck_core::process::{BotStatus, Liveness, MatchIdentity};
use botdeck_core::site_status::{SiteState, SiteStatus};
use botdeck_core::timefmt::DisplayZone;
use botdeck_core::webserver::ActiveWebServer;

pub fn bot_state(bot: &BotStatus) -> String {
    match &bot.liveness {
        Liveness::Running { pid, identity, .. } => match identity {
            MatchIdentity::Verified => format!("running (pid {pid})"),
            MatchIdentity::DirectoryOnly => format!("running (pid {pid}, unverified)"),
        },
        Liveness::Stopped { .. } => "stopped".to_string(),
    }
}

/// "started ..." / "stopped ..." / empty when nothing was ever recorded.
pub fn bot_since(bot: &BotStatus, zone: &DisplayZone) -> String {
    match &bot.liveness {
        Liveness::Running { live_since, .. } => format!("started {}", zone.display(*live_since)),
        Liveness::Stopped {
            last_stopped_at: Some(at),
        } => format!("stopped {}", zone.display(*at)),
        Liveness::Stopped {
            last_stopped_at: None,
        } => String::new(),
    }
}

pub fn bot_line(theme: &Theme, bot: &BotStatus, zone: &DisplayZone) -> String {
    let (state_role, since_role) = if bot.is_running() {
        (Role::Good, Role::Text)
    } else {
        (Role::Bad, Role::Notice)
    };
    let since = bot_since(bot, zone);
    let since = if since.is_empty() {
        since
    } else {
        format!(" | {}", theme.paint(since, since_role))
    };
    format!("{}{}", theme.paint(bot_state(bot), state_role), since)
}

pub fn site_line(theme: &Theme, site: &SiteStatus) -> String {
    let role = match site.state {
        SiteState::Enabled => Role::Good,
        SiteState::Disabled => Role::Bad,
        SiteState::Unknown => Role::Muted,
    };
    theme.paint(site.state.as_str(), role)
}

pub fn web_line(theme: &Theme, server: &ActiveWebServer) -> String {
    if server.is_active() {
        theme.paint("active", Role::Good)
    } else {
        theme.paint("not found", Role::Bad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botdeck_core::types::BotKind;
    use botdeck_core::walker::BotProject;
    use chrono::{TimeZone, Utc};

    fn bot(liveness: Liveness) -> BotStatus {
        BotStatus {
            project: BotProject {
                name: "echo".to_string(),
                directory: "/srv/bots/echo".into(),
                kind: BotKind::Python,
                entry_script: "main.py".to_string(),
                interpreter_override: None,
            },
            liveness,
        }
    }

    #[test]
    fn running_bot_shows_pid_and_start() {
        let zone = DisplayZone::fixed_hours(3).unwrap();
        let b = bot(Liveness::Running {
            pid: 42,
            live_since: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            identity: MatchIdentity::Verified,
        });
        assert_eq!(bot_state(&b), "running (pid 42)");
        assert_eq!(bot_since(&b, &zone), "started 2024-05-01 12:00:00");
        assert_eq!(
            bot_line(&Theme::plain(), &b, &zone),
            "running (pid 42) | started 2024-05-01 12:00:00"
        );
    }

    #[test]
    fn never_stopped_bot_has_no_time() {
        let b = bot(Liveness::Stopped {
            last_stopped_at: None,
        });
        assert_eq!(bot_line(&Theme::plain(), &b, &DisplayZone::local()), "stopped");
    }

    #[test]
    fn unverified_match_is_flagged() {
        let b = bot(Liveness::Running {
            pid: 7,
            live_since: Utc.timestamp_opt(0, 0).unwrap(),
            identity: MatchIdentity::DirectoryOnly,
        });
        assert_eq!(bot_state(&b), "running (pid 7, unverified)");
    }
}
