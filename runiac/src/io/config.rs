//! Project configuration stored in `runiac.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "runiac.toml";

/// Persisted project configuration (TOML).
///
/// Written by `runiac init` and edited by humans. Every key is optional; an
/// empty string is treated the same as a missing key.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project identifier, used as the deploy image tag.
    pub project: String,
    pub container_engine: Option<String>,
    pub container: Option<String>,
    pub dockerfile: Option<String>,
}

impl ProjectConfig {
    /// Look up a persisted value by its config key.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "project" => Some(&self.project),
            "container_engine" => self.container_engine.as_ref(),
            "container" => self.container.as_ref(),
            "dockerfile" => self.dockerfile.as_ref(),
            _ => None,
        };
        value.filter(|v| !v.is_empty()).cloned()
    }

    /// A project counts as initialized once it has a project identifier.
    pub fn is_initialized(&self) -> bool {
        !self.project.trim().is_empty()
    }
}

/// Load config from a TOML file.
///
/// Returns `Ok(None)` if the file is missing (project not initialized).
pub fn load_config(path: &Path) -> Result<Option<ProjectConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ProjectConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(cfg))
}
