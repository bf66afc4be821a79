use crate::privileged::Privileged;
use crate::root;
use crate::supervisor::Supervisor;
use crate::theme::Theme;
use anyhow::Context;
use botdeck_core::history::HistoryStore;
use botdeck_core::inventory::{Inventory, Reconciler};
use botdeck_core::process::SystemProcesses;
use botdeck_core::settings::Settings;
use botdeck_core::timefmt::DisplayZone;
use botdeck_core::webserver::SystemdProbe;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything a command needs, resolved once at startup.
pub struct Console {
    pub settings: Settings,
    pub config_path: PathBuf,
    pub bots_root: PathBuf,
    pub history: HistoryStore,
    pub zone: DisplayZone,
    pub theme: Theme,
    services: SystemdProbe,
    processes: SystemProcesses,
}

impl Console {
    pub fn open(root: Option<&Path>, config: Option<&Path>, theme: Theme) -> anyhow::Result<Self> {
        let config_path = root::resolve_config(config)?;
        let settings = Settings::load(&config_path)
            .with_context(|| format!("failed to load settings from {}", config_path.display()))?;
        let bots_root = root::resolve_root(root, settings.bots_root.as_deref());
        let history = HistoryStore::new(settings.history_path()?);
        let zone = settings.display_zone();
        tracing::debug!(
            root = %bots_root.display(),
            history = %history.path().display(),
            "console ready"
        );
        Ok(Self {
            settings,
            config_path,
            bots_root,
            history,
            zone,
            theme,
            services: SystemdProbe,
            processes: SystemProcesses,
        })
    }

    pub fn refresh(&self) -> Inventory {
        Reconciler {
            settings: &self.settings,
            bots_root: &self.bots_root,
            history: &self.history,
            services: &self.services,
            processes: &self.processes,
        }
        .refresh()
    }

    pub fn supervisor(&self) -> Supervisor<'_> {
        Supervisor {
            runtime: &self.settings.runtime,
            history: &self.history,
            zone: self.zone,
        }
    }

    pub fn privileged(&self) -> Privileged<'_> {
        Privileged {
            web: &self.settings.web,
        }
    }

    pub fn restart_pause(&self) -> Duration {
        Duration::from_millis(self.settings.runtime.restart_pause_ms)
    }
}
