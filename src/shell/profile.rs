//! Shell profile lookup
//!
//! Maps shells to their startup files and target bucket names to concrete
//! destination file names. A bucket named after any known startup-file stem
//! (`zshrc`, `bash_profile`, ...) or a bare role (`rc`, `profile`, `env`)
//! resolves through its role, so a zsh-flavored manifest builds sensible
//! file names for bash or fish; anything else renders literally as
//! `.{bucket}`.

use serde::{Deserialize, Serialize};

/// Role a startup file plays in a shell's boot sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupRole {
    /// Read by every interactive shell
    Rc,
    /// Read by login shells
    Profile,
    /// Read by every invocation, including scripts
    Env,
}

impl StartupRole {
    pub fn label(&self) -> &'static str {
        match self {
            StartupRole::Rc => "rc",
            StartupRole::Profile => "profile",
            StartupRole::Env => "env",
        }
    }
}

/// One startup file a shell reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartupFile {
    pub role: StartupRole,
    /// File name relative to the home directory
    pub file_name: &'static str,
    /// When the shell reads it
    pub read_when: &'static str,
}

/// Supported shells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ShellKind {
    #[default]
    Zsh,
    Bash,
    Fish,
}

impl ShellKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShellKind::Zsh => "zsh",
            ShellKind::Bash => "bash",
            ShellKind::Fish => "fish",
        }
    }

    /// Startup files this shell reads, in read order
    pub fn startup_files(&self) -> &'static [StartupFile] {
        match self {
            ShellKind::Zsh => &[
                StartupFile {
                    role: StartupRole::Env,
                    file_name: ".zshenv",
                    read_when: "every zsh invocation",
                },
                StartupFile {
                    role: StartupRole::Profile,
                    file_name: ".zprofile",
                    read_when: "login shells",
                },
                StartupFile {
                    role: StartupRole::Rc,
                    file_name: ".zshrc",
                    read_when: "interactive shells",
                },
            ],
            ShellKind::Bash => &[
                StartupFile {
                    role: StartupRole::Profile,
                    file_name: ".bash_profile",
                    read_when: "login shells",
                },
                StartupFile {
                    role: StartupRole::Rc,
                    file_name: ".bashrc",
                    read_when: "interactive non-login shells",
                },
            ],
            ShellKind::Fish => &[StartupFile {
                role: StartupRole::Rc,
                file_name: ".config/fish/config.fish",
                read_when: "every interactive fish session",
            }],
        }
    }

    /// File serving the given role for this shell, if it has one
    pub fn file_for(&self, role: StartupRole) -> Option<&'static str> {
        self.startup_files()
            .iter()
            .find(|f| f.role == role)
            .map(|f| f.file_name)
    }

    /// Derives the destination file name for a target bucket.
    ///
    /// `zshrc` under a bash hint becomes `.bashrc`; an unknown bucket name
    /// becomes `.{bucket}` verbatim.
    pub fn destination(&self, bucket: &str) -> String {
        match bucket_role(bucket) {
            Some(role) => match self.file_for(role) {
                Some(file_name) => file_name.to_string(),
                None => format!(".{}", bucket),
            },
            None => format!(".{}", bucket),
        }
    }
}

impl std::fmt::Display for ShellKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a bucket name to a startup role, when the name is recognizable
fn bucket_role(bucket: &str) -> Option<StartupRole> {
    match bucket {
        "rc" | "zshrc" | "bashrc" => Some(StartupRole::Rc),
        "profile" | "zprofile" | "bash_profile" => Some(StartupRole::Profile),
        "env" | "zshenv" => Some(StartupRole::Env),
        _ => None,
    }
}

/// Platform tag for the machine running the build, in the manifest's
/// vocabulary (`mac`, `linux`, `windows`, ...).
pub fn current_platform() -> &'static str {
    match std::env::consts::OS {
        "macos" => "mac",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zsh_buckets_map_to_zsh_files() {
        assert_eq!(ShellKind::Zsh.destination("zshrc"), ".zshrc");
        assert_eq!(ShellKind::Zsh.destination("zprofile"), ".zprofile");
        assert_eq!(ShellKind::Zsh.destination("zshenv"), ".zshenv");
    }

    #[test]
    fn zsh_bucket_names_translate_for_bash() {
        assert_eq!(ShellKind::Bash.destination("zshrc"), ".bashrc");
        assert_eq!(ShellKind::Bash.destination("zprofile"), ".bash_profile");
    }

    #[test]
    fn role_buckets_resolve_per_shell() {
        assert_eq!(ShellKind::Zsh.destination("rc"), ".zshrc");
        assert_eq!(ShellKind::Bash.destination("rc"), ".bashrc");
        assert_eq!(ShellKind::Fish.destination("rc"), ".config/fish/config.fish");
    }

    #[test]
    fn unknown_bucket_renders_literally() {
        assert_eq!(ShellKind::Zsh.destination("aliases"), ".aliases");
        assert_eq!(ShellKind::Bash.destination("custom"), ".custom");
    }

    #[test]
    fn missing_role_falls_back_to_literal() {
        // bash has no env-role file
        assert_eq!(ShellKind::Bash.destination("zshenv"), ".zshenv");
        assert_eq!(ShellKind::Fish.destination("profile"), ".profile");
    }

    #[test]
    fn startup_files_are_listed_in_read_order() {
        let files = ShellKind::Zsh.startup_files();
        assert_eq!(files[0].file_name, ".zshenv");
        assert_eq!(files.last().unwrap().file_name, ".zshrc");
    }

    #[test]
    fn current_platform_is_a_known_tag() {
        let tag = current_platform();
        assert!(!tag.is_empty());
        assert_ne!(tag, "macos"); // normalized to "mac"
    }
}
