//! One reconciliation cycle: web server, bots, sites, history, liveness.
//!
//! Nothing is cached between cycles. Every [`Reconciler::refresh`] walks the
//! bots tree, reads the process table and parses the site configs again.

use crate::catalog::build_catalog;
use crate::error::{BotdeckError, Result};
use crate::history::HistoryStore;
use crate::paths;
use crate::process::{correlate, BotStatus, ProcessIndex, ProcessSource};
use crate::settings::Settings;
use crate::site_status::{resolve_site_states, SiteStatus};
use crate::types::{Discovery, DiscoveryWarning};
use crate::walker::discover_bots;
use crate::webserver::{ActiveWebServer, ServiceProbe};
use serde::Serialize;
use std::path::Path;

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Inventory {
    pub bots: Vec<BotStatus>,
    pub sites: Vec<SiteStatus>,
    pub web_server: ActiveWebServer,
    pub warnings: Vec<DiscoveryWarning>,
}

/// One numbered line of the console: bots first, then sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "index", rename_all = "snake_case")]
pub enum Selectable {
    Bot(usize),
    Site(usize),
}

#[derive(Debug, Clone, Copy)]
pub enum Selection<'a> {
    Bot(&'a BotStatus),
    Site(&'a SiteStatus),
}

impl Inventory {
    pub fn is_empty(&self) -> bool {
        self.bots.is_empty() && self.sites.is_empty()
    }

    /// Every selectable item in display order. Item `n` (1-based) is
    /// `selectables()[n - 1]`.
    pub fn selectables(&self) -> Vec<Selectable> {
        (0..self.bots.len())
            .map(Selectable::Bot)
            .chain((0..self.sites.len()).map(Selectable::Site))
            .collect()
    }

    pub fn select(&self, number: usize) -> Option<Selection<'_>> {
        let selectable = *self.selectables().get(number.checked_sub(1)?)?;
        Some(match selectable {
            Selectable::Bot(i) => Selection::Bot(&self.bots[i]),
            Selectable::Site(i) => Selection::Site(&self.sites[i]),
        })
    }

    /// Display number of each bot, in order.
    pub fn numbered_bots(&self) -> impl Iterator<Item = (usize, &BotStatus)> {
        self.bots.iter().enumerate().map(|(i, b)| (i + 1, b))
    }

    /// Display number of each site, continuing after the bots.
    pub fn numbered_sites(&self) -> impl Iterator<Item = (usize, &SiteStatus)> {
        let offset = self.bots.len();
        self.sites
            .iter()
            .enumerate()
            .map(move |(i, s)| (offset + i + 1, s))
    }

    /// Resolve a bot by display number or by name.
    pub fn find_bot(&self, target: &str) -> Result<&BotStatus> {
        if let Ok(number) = target.parse::<usize>() {
            return match self.select(number) {
                Some(Selection::Bot(bot)) => Ok(bot),
                _ => Err(BotdeckError::InvalidSelection(target.to_string())),
            };
        }
        let matches: Vec<&BotStatus> = self
            .bots
            .iter()
            .filter(|b| b.project.name == target)
            .collect();
        match matches.as_slice() {
            [] => Err(BotdeckError::BotNotFound(target.to_string())),
            [bot] => Ok(bot),
            many => Err(BotdeckError::AmbiguousBot {
                name: target.to_string(),
                candidates: many
                    .iter()
                    .map(|b| b.project.directory.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// Resolve a site by display number, domain, or config file name.
    pub fn find_site(&self, target: &str) -> Result<&SiteStatus> {
        if let Ok(number) = target.parse::<usize>() {
            return match self.select(number) {
                Some(Selection::Site(site)) => Ok(site),
                _ => Err(BotdeckError::InvalidSelection(target.to_string())),
            };
        }
        self.sites
            .iter()
            .find(|s| s.site.domain == target || s.site.config_file_name == target)
            .ok_or_else(|| BotdeckError::SiteNotFound(target.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

pub struct Reconciler<'a> {
    pub settings: &'a Settings,
    pub bots_root: &'a Path,
    pub history: &'a HistoryStore,
    pub services: &'a dyn ServiceProbe,
    pub processes: &'a dyn ProcessSource,
}

impl Reconciler<'_> {
    pub fn refresh(&self) -> Inventory {
        let web_server = ActiveWebServer::resolve(self.settings.web.server, self.services);

        let Discovery {
            items: projects,
            warnings: mut all_warnings,
        } = discover_bots(self.bots_root, &self.settings.discovery);

        let catalog = match web_server.kind {
            Some(kind) => build_catalog(
                &paths::sites_available_dir(&self.settings.web.config_root, kind),
                kind,
            ),
            None => Discovery::empty(),
        };
        all_warnings.extend(catalog.warnings);

        let history = self.history.load();
        let index = ProcessIndex::build(self.processes.snapshot());
        tracing::debug!(
            bots = projects.len(),
            sites = catalog.items.len(),
            processes = index.len(),
            "refresh"
        );

        let bots = correlate(projects, &index, &history);
        let sites = resolve_site_states(catalog.items, &web_server, &self.settings.web.config_root);

        Inventory {
            bots,
            sites,
            web_server,
            warnings: all_warnings,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
