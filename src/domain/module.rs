//! Module and manifest domain model
//!
//! A module is one shell snippet with metadata: what it must load after,
//! which platforms it applies to, which output file it belongs to, and an
//! ordering hint within that file. The manifest is the ordered declaration
//! of all modules; declaration order is the tie-break source everywhere.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Bucket a module lands in when the manifest does not say otherwise
pub const DEFAULT_TARGET: &str = "zshrc";

/// Neutral priority assigned when the manifest does not say otherwise
pub const DEFAULT_PRIORITY: i32 = 50;

#[derive(Debug, Error, PartialEq)]
pub enum ManifestError {
    #[error("Module with empty name in manifest")]
    EmptyName,

    #[error("Duplicate module name: {0}")]
    DuplicateName(String),

    #[error("Module '{0}' has no file path")]
    EmptyFile(String),
}

fn default_target() -> String {
    DEFAULT_TARGET.to_string()
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

/// One shell snippet unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Unique identifier, used as the graph vertex key
    pub name: String,

    /// Relative path to the snippet content (resolved by the content provider)
    pub file: String,

    /// Names of modules this one must load after
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,

    /// Platform tags this module applies to; empty means all platforms
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub os: Vec<String>,

    /// Output bucket this module belongs to
    #[serde(default = "default_target")]
    pub target: String,

    /// Ordering hint within a bucket; lower loads earlier, may be negative
    #[serde(default = "default_priority")]
    pub priority: i32,

    /// Free text, not used by the build pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Module {
    /// Creates a module with default target and priority
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            requires: Vec::new(),
            os: Vec::new(),
            target: default_target(),
            priority: DEFAULT_PRIORITY,
            description: None,
        }
    }

    /// Adds a load-after dependency (builder style, used heavily in tests)
    pub fn with_requires(mut self, names: &[&str]) -> Self {
        self.requires.extend(names.iter().map(|s| s.to_string()));
        self
    }

    /// Restricts the module to the given platform tags
    pub fn with_os(mut self, tags: &[&str]) -> Self {
        self.os.extend(tags.iter().map(|s| s.to_string()));
        self
    }

    /// Assigns the module to a target bucket
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Sets the priority ordering hint
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Returns true if this module applies to the given platform.
    ///
    /// An empty `os` list applies everywhere; otherwise the match is
    /// case-insensitive.
    pub fn applies_to(&self, platform: &str) -> bool {
        if self.os.is_empty() {
            return true;
        }
        self.os.iter().any(|tag| tag.eq_ignore_ascii_case(platform))
    }
}

/// The full, ordered declaration of all modules for a project.
///
/// Declaration order is preserved through every pipeline stage until an
/// explicit reordering rule (topological or priority) overrides it.
/// Deliberately not `Deserialize`: the only way in is [`Manifest::new`],
/// which enforces the name/file invariants.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Manifest {
    modules: Vec<Module>,
}

impl Manifest {
    /// Builds a manifest, validating that names are unique and non-empty
    /// and that every module declares a file path.
    pub fn new(modules: Vec<Module>) -> Result<Self, ManifestError> {
        let mut seen = HashSet::new();
        for module in &modules {
            if module.name.is_empty() {
                return Err(ManifestError::EmptyName);
            }
            if module.file.is_empty() {
                return Err(ManifestError::EmptyFile(module.name.clone()));
            }
            if !seen.insert(module.name.as_str()) {
                return Err(ManifestError::DuplicateName(module.name.clone()));
            }
        }
        Ok(Self { modules })
    }

    /// Modules in declaration order
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Looks up a module by name
    pub fn get(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Returns true if a module with the given name is declared
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of declared modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if no modules are declared
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Iterates modules in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_module_has_defaults() {
        let module = Module::new("aliases", "modules/aliases.zsh");
        assert_eq!(module.target, DEFAULT_TARGET);
        assert_eq!(module.priority, DEFAULT_PRIORITY);
        assert!(module.requires.is_empty());
        assert!(module.os.is_empty());
    }

    #[test]
    fn applies_to_all_platforms_when_os_empty() {
        let module = Module::new("base", "modules/base.zsh");
        assert!(module.applies_to("mac"));
        assert!(module.applies_to("linux"));
        assert!(module.applies_to("anything"));
    }

    #[test]
    fn applies_to_is_case_insensitive() {
        let module = Module::new("brew", "modules/brew.zsh").with_os(&["Mac"]);
        assert!(module.applies_to("mac"));
        assert!(module.applies_to("MAC"));
        assert!(!module.applies_to("linux"));
    }

    #[test]
    fn manifest_preserves_declaration_order() {
        let manifest = Manifest::new(vec![
            Module::new("c", "c.zsh"),
            Module::new("a", "a.zsh"),
            Module::new("b", "b.zsh"),
        ])
        .unwrap();

        let names: Vec<_> = manifest.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn manifest_rejects_duplicate_names() {
        let result = Manifest::new(vec![
            Module::new("a", "a.zsh"),
            Module::new("a", "other.zsh"),
        ]);
        assert_eq!(result, Err(ManifestError::DuplicateName("a".to_string())));
    }

    #[test]
    fn manifest_rejects_empty_name() {
        let result = Manifest::new(vec![Module::new("", "a.zsh")]);
        assert_eq!(result, Err(ManifestError::EmptyName));
    }

    #[test]
    fn manifest_rejects_empty_file() {
        let result = Manifest::new(vec![Module::new("a", "")]);
        assert_eq!(result, Err(ManifestError::EmptyFile("a".to_string())));
    }

    #[test]
    fn manifest_lookup() {
        let manifest = Manifest::new(vec![
            Module::new("a", "a.zsh"),
            Module::new("b", "b.zsh"),
        ])
        .unwrap();

        assert!(manifest.contains("a"));
        assert!(!manifest.contains("z"));
        assert_eq!(manifest.get("b").unwrap().file, "b.zsh");
    }

    #[test]
    fn yaml_roundtrip_with_defaults() {
        let yaml = r#"
name: aliases
file: modules/aliases.zsh
requires: [base]
"#;
        let module: Module = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(module.name, "aliases");
        assert_eq!(module.requires, vec!["base"]);
        assert_eq!(module.target, DEFAULT_TARGET);
        assert_eq!(module.priority, DEFAULT_PRIORITY);

        let out = serde_yaml::to_string(&module).unwrap();
        let parsed: Module = serde_yaml::from_str(&out).unwrap();
        assert_eq!(module, parsed);
    }

    #[test]
    fn negative_priority_allowed() {
        let module = Module::new("first", "first.zsh").with_priority(-10);
        assert_eq!(module.priority, -10);
    }
}
