//! Project management
//!
//! A project is any directory holding a `modules.yaml` manifest, the module
//! snippet files it references, and an optional `.rcweave/` directory with
//! configuration and snapshots.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use thiserror::Error;

use crate::domain::{BuildOutput, Manifest};
use super::config::Config;
use super::content::FileProvider;
use super::manifest::{load_manifest, save_manifest, MANIFEST_FILE};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Not in an rcweave project. Run 'rcweave init' first.")]
    NotInProject,
}

/// An rcweave project
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(MANIFEST_FILE).is_file() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let manifest_path = root.join(MANIFEST_FILE);

        if manifest_path.exists() {
            return Err(ProjectError::AlreadyExists(root).into());
        }

        let modules_dir = root.join("modules");
        fs::create_dir_all(&modules_dir).with_context(|| {
            format!("Failed to create modules directory: {}", modules_dir.display())
        })?;

        let rcweave_dir = root.join(".rcweave");
        fs::create_dir_all(&rcweave_dir).with_context(|| {
            format!("Failed to create .rcweave directory: {}", rcweave_dir.display())
        })?;

        // Starter modules so the first build produces something
        fs::write(
            modules_dir.join("env.zsh"),
            "# Environment variables\nexport EDITOR=\"${EDITOR:-vim}\"\n",
        )
        .context("Failed to write starter module")?;
        fs::write(
            modules_dir.join("aliases.zsh"),
            "# Aliases\nalias ll='ls -lah'\n",
        )
        .context("Failed to write starter module")?;

        let starter = vec![
            crate::domain::Module::new("env", "modules/env.zsh").with_priority(10),
            crate::domain::Module::new("aliases", "modules/aliases.zsh")
                .with_requires(&["env"])
                .with_priority(60),
        ];
        save_manifest(&manifest_path, &starter)?;

        let config_path = rcweave_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# rcweave configuration

# Shell the output files are written for: zsh, bash or fish
shell = "zsh"

# Where generated files land; defaults to your home directory
# output_dir = "~"

[snapshot]
# Snapshot installed files before a build overwrites them
enabled = true
# Snapshots kept by 'rcweave snapshot cleanup'
keep = 10
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the .rcweave directory path
    pub fn rcweave_dir(&self) -> PathBuf {
        self.root.join(".rcweave")
    }

    /// Returns the snapshot repository path
    pub fn snapshots_dir(&self) -> PathBuf {
        self.rcweave_dir().join("snapshots")
    }

    /// Returns the manifest path
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Loads and validates the manifest
    pub fn manifest(&self) -> Result<Manifest> {
        load_manifest(&self.manifest_path())
    }

    /// Returns the content provider rooted at this project
    pub fn provider(&self) -> FileProvider {
        FileProvider::new(&self.root)
    }

    /// Writes every rendered bucket to the output directory.
    ///
    /// All buckets were rendered before this is called, so a failed build
    /// never reaches here; writes themselves are atomic (temp file +
    /// rename) and serialized across processes with an exclusive lock.
    pub fn write_outputs(&self, output: &BuildOutput, output_dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

        let _lock = self.acquire_build_lock()?;

        let mut written = Vec::with_capacity(output.targets.len());
        for bucket in &output.targets {
            let dest = output_dir.join(&bucket.file_name);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }

            let temp = dest.with_extension("rcweave.tmp");
            fs::write(&temp, &bucket.content)
                .with_context(|| format!("Failed to write temp file: {}", temp.display()))?;
            fs::rename(&temp, &dest)
                .with_context(|| format!("Failed to install output: {}", dest.display()))?;

            written.push(dest);
        }

        Ok(written)
    }

    fn acquire_build_lock(&self) -> Result<std::fs::File> {
        let rcweave_dir = self.rcweave_dir();
        fs::create_dir_all(&rcweave_dir)
            .with_context(|| format!("Failed to create directory: {}", rcweave_dir.display()))?;

        let lock_path = rcweave_dir.join("build.lock");
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;

        file.lock_exclusive()
            .context("Another rcweave build is in progress")?;

        // Lock is released when the file handle drops
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BucketOutput, BuildOutput};
    use crate::shell::ShellKind;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.manifest_path().is_file());
        assert!(dir.path().join("modules/env.zsh").is_file());
        assert!(dir.path().join(".rcweave/config.toml").is_file());

        let manifest = project.manifest().unwrap();
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn init_refuses_existing_project() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();

        let err = Project::init(dir.path()).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn open_requires_manifest() {
        let dir = TempDir::new().unwrap();
        assert!(Project::open(dir.path()).is_err());
    }

    #[test]
    fn starter_project_builds() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        let manifest = project.manifest().unwrap();
        let output = crate::domain::build(
            &manifest,
            "mac",
            ShellKind::Zsh,
            None,
            &project.provider(),
        )
        .unwrap();

        assert_eq!(output.targets.len(), 1);
        assert_eq!(output.targets[0].modules, vec!["env", "aliases"]);
    }

    #[test]
    fn write_outputs_installs_files() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();
        let out_dir = dir.path().join("home");

        let output = BuildOutput {
            os: "mac".to_string(),
            shell: ShellKind::Zsh,
            targets: vec![BucketOutput {
                target: "zshrc".to_string(),
                file_name: ".zshrc".to_string(),
                modules: vec!["env".to_string()],
                content: "# generated\n".to_string(),
                module_count: 1,
            }],
            warnings: vec![],
        };

        let written = project.write_outputs(&output, &out_dir).unwrap();
        assert_eq!(written, vec![out_dir.join(".zshrc")]);
        assert_eq!(fs::read_to_string(out_dir.join(".zshrc")).unwrap(), "# generated\n");
    }
}
