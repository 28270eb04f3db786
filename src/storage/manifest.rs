//! YAML manifest store
//!
//! The manifest lives in `modules.yaml` at the project root:
//!
//! ```yaml
//! modules:
//!   - name: base
//!     file: modules/base.zsh
//!   - name: aliases
//!     file: modules/aliases.zsh
//!     requires: [base]
//!     os: [mac, linux]
//!     target: zshrc
//!     priority: 60
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::{Manifest, Module};

/// Manifest file name that marks a project root
pub const MANIFEST_FILE: &str = "modules.yaml";

/// On-disk shape of the manifest; validation happens in [`Manifest::new`]
#[derive(Debug, Default, Serialize, Deserialize)]
struct ManifestDoc {
    #[serde(default)]
    modules: Vec<Module>,
}

/// Loads and validates the manifest at the given path
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;

    let doc: ManifestDoc = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;

    Manifest::new(doc.modules)
        .with_context(|| format!("Invalid manifest: {}", path.display()))
}

/// Writes a manifest as YAML (used by `init` and `migrate`)
pub fn save_manifest(path: &Path, modules: &[Module]) -> Result<()> {
    let doc = ManifestDoc {
        modules: modules.to_vec(),
    };
    let content =
        serde_yaml::to_string(&doc).context("Failed to serialize manifest")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write manifest: {}", path.display()))
}
