//! Which web server, if any, is installed and running.

use crate::types::WebServerKind;
use serde::{Deserialize, Serialize};
use std::process::{Command, Stdio};

// ---------------------------------------------------------------------------
// ServiceProbe
// ---------------------------------------------------------------------------

pub trait ServiceProbe {
    fn is_installed(&self, server: WebServerKind) -> bool;
    fn is_active(&self, server: WebServerKind) -> bool;
}

/// Binary on `PATH` plus `systemctl is-active --quiet <service>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemdProbe;

impl ServiceProbe for SystemdProbe {
    fn is_installed(&self, server: WebServerKind) -> bool {
        which::which(server.service_name()).is_ok()
    }

    fn is_active(&self, server: WebServerKind) -> bool {
        let status = Command::new("systemctl")
            .args(["is-active", "--quiet", server.service_name()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(status) => status.success(),
            Err(e) => {
                tracing::debug!(error = %e, "systemctl unavailable");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// WebServerSelection
// ---------------------------------------------------------------------------

/// How the active web server is chosen: probed, pinned, or disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebServerSelection {
    #[default]
    Auto,
    Nginx,
    Apache2,
    None,
}

// ---------------------------------------------------------------------------
// ActiveWebServer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveWebServer {
    pub kind: Option<WebServerKind>,
}

impl ActiveWebServer {
    pub fn none() -> Self {
        Self { kind: None }
    }

    /// First server, nginx before apache2, that is both installed and active.
    pub fn detect(probe: &dyn ServiceProbe) -> Self {
        let kind = WebServerKind::all()
            .iter()
            .copied()
            .find(|&server| probe.is_installed(server) && probe.is_active(server));
        Self { kind }
    }

    pub fn resolve(selection: WebServerSelection, probe: &dyn ServiceProbe) -> Self {
        match selection {
            WebServerSelection::Auto => Self::detect(probe),
            WebServerSelection::Nginx => Self {
                kind: Some(WebServerKind::Nginx),
            },
            WebServerSelection::Apache2 => Self {
                kind: Some(WebServerKind::Apache2),
            },
            WebServerSelection::None => Self::none(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.kind.is_some()
    }

    pub fn service_name(&self) -> Option<&'static str> {
        self.kind.map(WebServerKind::service_name)
    }

    pub fn display_name(&self) -> &'static str {
        self.kind
            .map(WebServerKind::display_name)
            .unwrap_or("Nginx/Apache")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
