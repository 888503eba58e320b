//! `wirecode.toml` loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::expander::SourceExpander;

pub const CONFIG_FILE: &str = "wirecode.toml";

/// Configuration stored in `wirecode.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WirecodeConfig {
    #[serde(default)]
    pub expand: ExpandSettings,
}

/// The `[expand]` table. Relative paths are relative to the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandSettings {
    #[serde(default = "default_scan_paths")]
    pub scan_paths: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
    #[serde(default = "default_crate_name")]
    pub crate_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default)]
    pub deny_warnings: bool,
}

impl Default for ExpandSettings {
    fn default() -> Self {
        Self {
            scan_paths: default_scan_paths(),
            output_file: None,
            crate_name: default_crate_name(),
            runtime: None,
            deny_warnings: false,
        }
    }
}

fn default_scan_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("src")]
}

fn default_crate_name() -> String {
    "crate".to_string()
}

impl ExpandSettings {
    /// Anchor relative paths at `root`.
    pub fn resolved(mut self, root: &Path) -> Self {
        self.scan_paths = self.scan_paths.iter().map(|path| root.join(path)).collect();
        self.output_file = self.output_file.map(|path| root.join(path));
        self
    }

    pub fn expander(&self) -> SourceExpander {
        let mut expander = SourceExpander::new()
            .crate_name(&self.crate_name)
            .deny_warnings(self.deny_warnings);
        for path in &self.scan_paths {
            expander = expander.scan_path(path);
        }
        if let Some(output) = &self.output_file {
            expander = expander.output_file(output);
        }
        if let Some(runtime) = &self.runtime {
            expander = expander.runtime_path(runtime);
        }
        expander
    }
}

impl WirecodeConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Find the nearest `wirecode.toml` in `start` or its ancestors.
    pub fn find_from(start: &Path) -> Result<Option<(PathBuf, Self)>> {
        let mut current = start.to_path_buf();

        loop {
            let candidate = current.join(CONFIG_FILE);
            if candidate.exists() {
                let config = Self::load(&candidate)?;
                return Ok(Some((candidate, config)));
            }

            if !current.pop() {
                return Ok(None);
            }
        }
    }
}
