//! Configuration handling for rcweave
//!
//! Configuration is stored in `.rcweave/config.toml` (project) and
//! `~/.config/rcweave/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::OutputFormat;
use crate::shell::ShellKind;
use super::manifest::MANIFEST_FILE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Snapshot behavior around builds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Snapshot installed files before a build overwrites them
    pub enabled: bool,

    /// Snapshots kept by `snapshot cleanup`
    pub keep: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            keep: 10,
        }
    }
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    /// Shell the output files are written for
    pub shell: ShellKind,

    /// Where output files land; defaults to the home directory
    pub output_dir: Option<String>,

    /// Snapshot settings
    pub snapshot: SnapshotConfig,
}

impl ProjectConfig {
    /// Resolves the effective output directory
    pub fn effective_output_dir(&self) -> Result<PathBuf> {
        match &self.output_dir {
            Some(dir) => Ok(super::content::expand_home(dir)
                .unwrap_or_else(|| PathBuf::from(dir))),
            None => BaseDirs::new()
                .map(|dirs| dirs.home_dir().to_path_buf())
                .ok_or_else(|| anyhow::anyhow!("Could not determine home directory")),
        }
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Shell used when neither flag nor project config names one
    pub default_shell: Option<ShellKind>,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let (project, project_root) = Self::load_project()?;

        Ok(Self {
            project,
            global,
            project_root,
        })
    }

    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "rcweave", "rcweave").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Finds and loads project configuration
    fn load_project() -> Result<(ProjectConfig, Option<PathBuf>)> {
        match Self::find_project_root() {
            Some(root) => {
                let config = Self::load_project_config(&root)?;
                Ok((config, Some(root)))
            }
            None => Ok((ProjectConfig::default(), None)),
        }
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(".rcweave").join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")
    }

    /// Finds the project root by looking for the manifest file
    pub fn find_project_root() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            if current.join(MANIFEST_FILE).is_file() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns the project root, or an error if not in a project
    pub fn require_project_root(&self) -> Result<&Path> {
        self.project_root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not in an rcweave project. Run 'rcweave init' first."))
    }

    /// Saves the project configuration
    pub fn save_project(&self) -> Result<()> {
        let root = self.require_project_root()?;
        let config_dir = root.join(".rcweave");
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create directory: {}", config_dir.display()))?;

        let config_path = config_dir.join("config.toml");
        let content =
            toml::to_string_pretty(&self.project).context("Failed to serialize project config")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write project config: {}", config_path.display()))
    }
}
