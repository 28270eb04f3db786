//! File-backed module content provider
//!
//! Resolves a module's `file` path against the project root, with support
//! for absolute paths and `~/` expansion. Any unreadable file is a fatal
//! [`ContentError::NotFound`] for the whole build.

use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::domain::{ContentError, ContentProvider, Module};

/// Content provider rooted at a project directory
pub struct FileProvider {
    root: PathBuf,
}

impl FileProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a module file path to an absolute path
    pub fn resolve(&self, file: &str) -> PathBuf {
        expand_home(file).unwrap_or_else(|| {
            let path = Path::new(file);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.root.join(path)
            }
        })
    }
}

impl ContentProvider for FileProvider {
    fn fetch(&self, module: &Module) -> Result<String, ContentError> {
        let path = self.resolve(&module.file);
        fs::read_to_string(&path).map_err(|_| ContentError::NotFound {
            module: module.name.clone(),
            file: module.file.clone(),
        })
    }
}

/// Expands a leading `~/` to the home directory, if resolvable
pub fn expand_home(path: &str) -> Option<PathBuf> {
    let rest = path.strip_prefix("~/")?;
    BaseDirs::new().map(|dirs| dirs.home_dir().join(rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn fetches_relative_to_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("modules")).unwrap();
        fs::write(dir.path().join("modules/base.zsh"), "export A=1\n").unwrap();

        let provider = FileProvider::new(dir.path());
        let module = Module::new("base", "modules/base.zsh");

        assert_eq!(provider.fetch(&module).unwrap(), "export A=1\n");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let provider = FileProvider::new(dir.path());
        let module = Module::new("ghost", "modules/ghost.zsh");

        assert_eq!(
            provider.fetch(&module).unwrap_err(),
            ContentError::NotFound {
                module: "ghost".to_string(),
                file: "modules/ghost.zsh".to_string(),
            }
        );
    }

    #[test]
    fn absolute_paths_bypass_the_root() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("external.zsh");
        fs::write(&file, "external\n").unwrap();

        let provider = FileProvider::new("/nonexistent-root");
        let module = Module::new("ext", file.to_str().unwrap());

        assert_eq!(provider.fetch(&module).unwrap(), "external\n");
    }

    #[test]
    fn tilde_expansion() {
        let expanded = expand_home("~/some/file.zsh");
        if let Some(path) = expanded {
            assert!(path.is_absolute());
            assert!(path.ends_with("some/file.zsh"));
        }
        assert!(expand_home("no/tilde").is_none());
    }
}
