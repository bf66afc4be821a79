//! Bot root classification by file-name convention.
//!
//! A directory is a bot root when its immediate listing contains one of the
//! known entry scripts. Python scripts win over Node ones; a Node match also
//! needs the package manifest next to it.

use crate::types::BotKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// BotConventions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConventions {
    /// Python entry scripts, in priority order.
    #[serde(default = "default_python_scripts")]
    pub python_scripts: Vec<String>,
    /// Node entry scripts, in priority order.
    #[serde(default = "default_node_scripts")]
    pub node_scripts: Vec<String>,
    #[serde(default = "default_node_manifest")]
    pub node_manifest: String,
    /// Virtual environment folder names, in priority order.
    #[serde(default = "default_venv_dirs")]
    pub venv_dirs: Vec<String>,
    /// Interpreter location relative to a virtual environment folder.
    #[serde(default = "default_venv_interpreter")]
    pub venv_interpreter: PathBuf,
}

fn default_python_scripts() -> Vec<String> {
    ["index.py", "main.py", "bot.py", "app.py"]
        .map(String::from)
        .to_vec()
}

fn default_node_scripts() -> Vec<String> {
    ["index.js", "app.js", "bot.js", "main.js"]
        .map(String::from)
        .to_vec()
}

fn default_node_manifest() -> String {
    "package.json".to_string()
}

fn default_venv_dirs() -> Vec<String> {
    ["venv", ".venv", "env"].map(String::from).to_vec()
}

fn default_venv_interpreter() -> PathBuf {
    PathBuf::from("bin/python")
}

impl Default for BotConventions {
    fn default() -> Self {
        Self {
            python_scripts: default_python_scripts(),
            node_scripts: default_node_scripts(),
            node_manifest: default_node_manifest(),
            venv_dirs: default_venv_dirs(),
            venv_interpreter: default_venv_interpreter(),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: BotKind,
    pub entry_script: String,
}

impl BotConventions {
    /// Decide whether a directory listing marks a bot root.
    pub fn classify(&self, files: &HashSet<String>) -> Option<Classification> {
        if let Some(script) = self.python_scripts.iter().find(|s| files.contains(*s)) {
            return Some(Classification {
                kind: BotKind::Python,
                entry_script: script.clone(),
            });
        }

        if !files.contains(&self.node_manifest) {
            return None;
        }
        self.node_scripts
            .iter()
            .find(|s| files.contains(*s))
            .map(|script| Classification {
                kind: BotKind::Nodejs,
                entry_script: script.clone(),
            })
    }

    /// First virtual environment interpreter found under `dir`, if any.
    pub fn find_venv_interpreter(&self, dir: &Path) -> Option<PathBuf> {
        self.venv_dirs
            .iter()
            .map(|venv| dir.join(venv).join(&self.venv_interpreter))
            .find(|candidate| candidate.is_file())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
