//! Configuration loading and the per-invocation configuration record.
//!
//! Settings come from an optional `relnotes.toml` and are overridden by
//! command line flags before being frozen into a [`RelnotesConfig`].
use derive_builder::Builder;
use log::*;
use serde::Deserialize;
use std::path::Path;

use crate::error::{RelnotesError, Result};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "relnotes.toml";
/// Label marking pull requests that belong in the release notes.
pub const DEFAULT_LABEL: &str = "release-note";
/// Path of the project changelog inside the repository.
pub const DEFAULT_CHANGELOG_PATH: &str = "CHANGELOG.md";
/// Path of the major release draft; `{version}` becomes `MAJOR.MINOR`.
pub const DEFAULT_DRAFT_PATH: &str = "release-{version}/release-notes-draft.md";

/// Contents of `relnotes.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub label: String,
    pub changelog_path: String,
    pub draft_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.into(),
            changelog_path: DEFAULT_CHANGELOG_PATH.into(),
            draft_path: DEFAULT_DRAFT_PATH.into(),
        }
    }
}

impl Config {
    /// Loads the file at `path`, falling back to defaults when it does not
    /// exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(
                "no configuration found at {}: using default",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Everything a changelog run needs to know about its target.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct RelnotesConfig {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch the release is cut from.
    pub branch: String,
    #[builder(default = "DEFAULT_LABEL.to_string()")]
    pub label: String,
    #[builder(default = "DEFAULT_CHANGELOG_PATH.to_string()")]
    pub changelog_path: String,
    #[builder(default = "DEFAULT_DRAFT_PATH.to_string()")]
    pub draft_path: String,
}

impl RelnotesConfigBuilder {
    /// Takes label and paths from a loaded configuration file.
    pub fn file_config(&mut self, config: &Config) -> &mut Self {
        self.label(config.label.clone())
            .changelog_path(config.changelog_path.clone())
            .draft_path(config.draft_path.clone())
    }

    pub fn build(&self) -> Result<RelnotesConfig> {
        let config = self._build().map_err(|e| {
            RelnotesError::invalid_config(format!(
                "Failed to build relnotes config: {}",
                e
            ))
        })?;

        if config.branch.is_empty() {
            return Err(RelnotesError::invalid_config("branch must be set"));
        }

        if config.label.is_empty() {
            return Err(RelnotesError::invalid_config("label must be set"));
        }

        Ok(config)
    }
}

impl RelnotesConfig {
    pub fn builder() -> RelnotesConfigBuilder {
        RelnotesConfigBuilder::default()
    }

    /// Repository path of the release notes draft for `MAJOR.MINOR`.
    pub fn draft_path_for(&self, major_minor: &str) -> String {
        self.draft_path.replace("{version}", major_minor)
    }
}
