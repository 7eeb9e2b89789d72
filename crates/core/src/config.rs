//! TOML-based configuration for git-smash.
//!
//! Settings are layered, lowest precedence first: built-in defaults, the user
//! file (`<config dir>/git-smash/config.toml`), the repository file
//! (`<repo root>/.git-smash.toml`), then command-line overrides applied by the
//! caller.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;
use crate::models::SMASH_PREFIX;

/// File name of the per-repository config, relative to the repository root.
pub const REPO_CONFIG_FILE: &str = ".git-smash.toml";

// ---------------------------------------------------------------------------
// Resolved config
// ---------------------------------------------------------------------------

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmashConfig {
    /// Branch the rebuilt branch is reset onto (default `origin/master`).
    pub base_branch: String,

    /// Remote used by `--push` (default `origin`).
    pub remote: String,

    /// Delete old `smash/*` branches instead of prompting when the backup
    /// branch name is taken.
    pub clean_backups: bool,

    /// Push the rebuilt branch after a successful replay.
    pub push: bool,

    /// Shell launched for interactive conflict resolution.
    pub shell: String,
}

fn default_shell() -> String {
    std::env::var("SHELL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "bash".into())
}

impl Default for SmashConfig {
    fn default() -> Self {
        Self {
            base_branch: "origin/master".into(),
            remote: "origin".into(),
            clean_backups: false,
            push: false,
            shell: default_shell(),
        }
    }
}

// ---------------------------------------------------------------------------
// On-disk layer
// ---------------------------------------------------------------------------

/// One config file. Every field is optional so layers only override what
/// they set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub base_branch: Option<String>,
    pub remote: Option<String>,
    pub clean_backups: Option<bool>,
    pub push: Option<bool>,
    pub shell: Option<String>,
}

impl ConfigFile {
    /// Load a config layer from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let layer: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;

        debug!("configuration parsed successfully");
        Ok(layer)
    }

    /// Like [`load_from_file`](Self::load_from_file), but a missing file is
    /// an empty layer.
    pub fn load_optional<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load_from_file(path) {
            Err(ConfigError::FileNotFound(path)) => {
                debug!(path, "no configuration file");
                Ok(Self::default())
            }
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl SmashConfig {
    /// Location of the user-wide config file, if the platform has one.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("git-smash").join("config.toml"))
    }

    /// Defaults overlaid with the user file and then the repository file.
    pub fn load(repo_root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = Self::user_config_path() {
            config.apply(ConfigFile::load_optional(path)?);
        }
        config.apply(ConfigFile::load_optional(repo_root.join(REPO_CONFIG_FILE))?);
        Ok(config)
    }

    /// Overlay every field `layer` sets.
    pub fn apply(&mut self, layer: ConfigFile) {
        if let Some(base_branch) = layer.base_branch {
            self.base_branch = base_branch;
        }
        if let Some(remote) = layer.remote {
            self.remote = remote;
        }
        if let Some(clean_backups) = layer.clean_backups {
            self.clean_backups = clean_backups;
        }
        if let Some(push) = layer.push {
            self.push = push;
        }
        if let Some(shell) = layer.shell {
            self.shell = shell;
        }
    }

    /// Validate that all required fields are present and sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_branch.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "base_branch".into(),
                detail: "base branch must not be empty".into(),
            });
        }
        if self.base_branch.starts_with(SMASH_PREFIX) {
            return Err(ConfigError::InvalidValue {
                field: "base_branch".into(),
                detail: format!(
                    "'{}' is inside the {} namespace, which `clean` deletes",
                    self.base_branch, SMASH_PREFIX
                ),
            });
        }
        if self.remote.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "remote".into(),
                detail: "remote must not be empty".into(),
            });
        }
        if self.shell.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "shell".into(),
                detail: "shell must not be empty".into(),
            });
        }
        Ok(())
    }
}
