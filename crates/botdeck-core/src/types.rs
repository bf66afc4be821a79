use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// BotKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotKind {
    Python,
    Nodejs,
}

impl BotKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BotKind::Python => "python",
            BotKind::Nodejs => "nodejs",
        }
    }
}

impl fmt::Display for BotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ContentKind
// ---------------------------------------------------------------------------

/// Cheap guess at what a document root serves, based on an `index.php`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentKind {
    Php,
    Html,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Php => "PHP",
            ContentKind::Html => "HTML",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// WebServerKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebServerKind {
    Nginx,
    Apache2,
}

impl WebServerKind {
    /// Detection priority: nginx is checked before apache2.
    pub fn all() -> &'static [WebServerKind] {
        &[WebServerKind::Nginx, WebServerKind::Apache2]
    }

    pub fn service_name(self) -> &'static str {
        match self {
            WebServerKind::Nginx => "nginx",
            WebServerKind::Apache2 => "apache2",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            WebServerKind::Nginx => "Nginx",
            WebServerKind::Apache2 => "Apache2",
        }
    }
}

impl fmt::Display for WebServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service_name())
    }
}

// ---------------------------------------------------------------------------
// DiscoveryWarning
// ---------------------------------------------------------------------------

/// A non-fatal problem met while discovering bots or sites. The affected item
/// is skipped; the rest of the cycle carries on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryWarning {
    pub path: PathBuf,
    pub message: String,
}

impl DiscoveryWarning {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DiscoveryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Items found by one discovery pass plus the warnings collected on the way.
#[derive(Debug, Clone, Default)]
pub struct Discovery<T> {
    pub items: Vec<T>,
    pub warnings: Vec<DiscoveryWarning>,
}

impl<T> Discovery<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, warning: DiscoveryWarning) {
        tracing::warn!(path = %warning.path.display(), "{}", warning.message);
        self.warnings.push(warning);
    }
}
