//! # Storage Layer
//!
//! Everything that touches the filesystem: the YAML manifest, module
//! snippet files, TOML configuration, output installation, git snapshots,
//! and the rc-file migration parser. The domain layer stays free of I/O.
//!
//! ## On-disk layout
//!
//! ```text
//! project/
//! ├── modules.yaml          # The manifest (marks the project root)
//! ├── modules/
//! │   ├── env.zsh           # Snippet files referenced by the manifest
//! │   └── aliases.zsh
//! └── .rcweave/
//!     ├── config.toml       # Project configuration
//!     ├── build.lock        # fs2 lock serializing writes
//!     └── snapshots/        # Private git repo of installed-file snapshots
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing an rcweave project
//! - [`FileProvider`] - File-backed module content provider
//! - [`SnapshotStore`] - Git-backed snapshots of installed files
//! - [`Config`] - Project and global configuration

mod config;
mod content;
mod manifest;
mod migrate;
mod project;
mod snapshot;

pub use config::{Config, ConfigError, GlobalConfig, ProjectConfig, SnapshotConfig};
pub use content::{expand_home, FileProvider};
pub use manifest::{load_manifest, save_manifest, MANIFEST_FILE};
pub use migrate::{split_rc_file, write_drafts, ModuleDraft, SectionKind};
pub use project::{Project, ProjectError};
pub use snapshot::{SnapshotError, SnapshotInfo, SnapshotStore};
