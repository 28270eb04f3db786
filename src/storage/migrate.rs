//! Monolithic rc-file migration
//!
//! Heuristic, line-oriented splitter that turns one big `.zshrc` into
//! classified module drafts: exports, PATH edits, plugin loading, function
//! definitions, aliases, completion setup, prompt setup, and a catch-all.
//! The classification is best-effort text matching; it never interprets or
//! executes shell code.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::{Module, DEFAULT_TARGET};

/// Section a chunk of the rc file is sorted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Env,
    Path,
    Plugins,
    Functions,
    Misc,
    Aliases,
    Completion,
    Prompt,
}

impl SectionKind {
    /// Suggested module name
    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::Env => "env",
            SectionKind::Path => "path",
            SectionKind::Plugins => "plugins",
            SectionKind::Functions => "functions",
            SectionKind::Misc => "misc",
            SectionKind::Aliases => "aliases",
            SectionKind::Completion => "completion",
            SectionKind::Prompt => "prompt",
        }
    }

    /// Suggested load priority: environment first, prompt last
    pub fn priority(&self) -> i32 {
        match self {
            SectionKind::Env => 10,
            SectionKind::Path => 20,
            SectionKind::Plugins => 30,
            SectionKind::Functions => 40,
            SectionKind::Misc => 50,
            SectionKind::Aliases => 60,
            SectionKind::Completion => 70,
            SectionKind::Prompt => 80,
        }
    }

    /// Every kind, in emission (priority) order
    fn all() -> [SectionKind; 8] {
        [
            SectionKind::Env,
            SectionKind::Path,
            SectionKind::Plugins,
            SectionKind::Functions,
            SectionKind::Misc,
            SectionKind::Aliases,
            SectionKind::Completion,
            SectionKind::Prompt,
        ]
    }
}

/// A proposed module, not yet written to disk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleDraft {
    pub name: String,
    pub file: String,
    pub priority: i32,
    pub content: String,
    pub line_count: usize,
}

/// Splits a monolithic rc file into module drafts, emitted in suggested
/// load order. Kinds with no matching content produce no draft.
pub fn split_rc_file(content: &str) -> Vec<ModuleDraft> {
    let mut sections: Vec<(SectionKind, Vec<String>)> =
        SectionKind::all().iter().map(|k| (*k, Vec::new())).collect();
    let mut pending_comments: Vec<String> = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let trimmed = line.trim();

        if trimmed.starts_with("#!") {
            continue;
        }
        if trimmed.is_empty() {
            // A blank line breaks the comment/code attachment
            pending_comments.clear();
            continue;
        }
        if trimmed.starts_with('#') {
            pending_comments.push(line.to_string());
            continue;
        }

        if is_function_start(trimmed) {
            // Swallow the whole brace-balanced block
            let mut block = vec![line.to_string()];
            let mut depth = brace_delta(line);
            while depth > 0 {
                match lines.next() {
                    Some(next) => {
                        depth += brace_delta(next);
                        block.push(next.to_string());
                    }
                    None => break,
                }
            }
            let bucket = section(&mut sections, SectionKind::Functions);
            bucket.append(&mut pending_comments);
            bucket.extend(block);
            continue;
        }

        let bucket = section(&mut sections, classify_line(trimmed));
        bucket.append(&mut pending_comments);
        bucket.push(line.to_string());
    }

    sections
        .into_iter()
        .filter(|(_, lines)| !lines.is_empty())
        .map(|(kind, lines)| ModuleDraft {
            name: kind.name().to_string(),
            file: format!("modules/{}.zsh", kind.name()),
            priority: kind.priority(),
            line_count: lines.len(),
            content: format!("{}\n", lines.join("\n")),
        })
        .collect()
}

/// Writes drafts as module files under `root` and returns the matching
/// manifest entries.
pub fn write_drafts(root: &Path, drafts: &[ModuleDraft]) -> Result<Vec<Module>> {
    let modules_dir = root.join("modules");
    fs::create_dir_all(&modules_dir)
        .with_context(|| format!("Failed to create directory: {}", modules_dir.display()))?;

    let mut modules = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let path = root.join(&draft.file);
        fs::write(&path, &draft.content)
            .with_context(|| format!("Failed to write module: {}", path.display()))?;

        modules.push(
            Module::new(&draft.name, &draft.file)
                .with_target(DEFAULT_TARGET)
                .with_priority(draft.priority),
        );
    }

    Ok(modules)
}

fn section<'a>(
    sections: &'a mut [(SectionKind, Vec<String>)],
    kind: SectionKind,
) -> &'a mut Vec<String> {
    &mut sections
        .iter_mut()
        .find(|(k, _)| *k == kind)
        .expect("all kinds preallocated")
        .1
}

fn is_function_start(line: &str) -> bool {
    if line.starts_with("function ") {
        return true;
    }
    // name() { ... definitions
    match line.find("()") {
        Some(pos) => {
            let name = &line[..pos];
            !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || "_-.:".contains(c))
        }
        None => false,
    }
}

fn brace_delta(line: &str) -> i32 {
    let mut delta = 0;
    for c in line.chars() {
        match c {
            '{' => delta += 1,
            '}' => delta -= 1,
            _ => {}
        }
    }
    delta
}

fn classify_line(line: &str) -> SectionKind {
    let touches_path = line.contains("PATH") || line.starts_with("path+=") || line.starts_with("path=");

    if line.starts_with("alias ") {
        SectionKind::Aliases
    } else if line.starts_with("export ") || line.starts_with("typeset ") || line.starts_with("set -x ") {
        if touches_path {
            SectionKind::Path
        } else {
            SectionKind::Env
        }
    } else if touches_path {
        SectionKind::Path
    } else if line.contains("compinit")
        || line.contains("compdef")
        || line.starts_with("complete ")
        || (line.starts_with("autoload") && line.contains("comp"))
    {
        SectionKind::Completion
    } else if line.starts_with("PS1")
        || line.starts_with("PROMPT")
        || line.starts_with("RPROMPT")
        || line.contains("promptinit")
    {
        SectionKind::Prompt
    } else if line.starts_with("source ")
        || line.starts_with(". ")
        || line.starts_with("antigen ")
        || line.starts_with("zinit ")
        || line.starts_with("zplug ")
        || line.starts_with("plug ")
    {
        SectionKind::Plugins
    } else {
        SectionKind::Misc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"#!/usr/bin/env zsh
# Environment
export EDITOR=vim
export LANG=en_US.UTF-8

export PATH="$HOME/bin:$PATH"

# Helpers
greet() {
  echo "hello $1"
}

alias ll='ls -lah'
alias gs='git status'

autoload -Uz compinit
compinit

PROMPT='%n@%m %~ %# '

source ~/.fzf.zsh

setopt HIST_IGNORE_DUPS
"#;

    fn draft<'a>(drafts: &'a [ModuleDraft], name: &str) -> &'a ModuleDraft {
        drafts.iter().find(|d| d.name == name).unwrap()
    }

    #[test]
    fn splits_sample_into_sections() {
        let drafts = split_rc_file(SAMPLE);
        let names: Vec<_> = drafts.iter().map(|d| d.name.as_str()).collect();

        assert_eq!(
            names,
            vec!["env", "path", "plugins", "functions", "misc", "aliases", "completion", "prompt"]
        );
    }

    #[test]
    fn exports_land_in_env() {
        let drafts = split_rc_file(SAMPLE);
        let env = draft(&drafts, "env");
        assert!(env.content.contains("export EDITOR=vim"));
        assert!(env.content.contains("export LANG=en_US.UTF-8"));
        assert!(!env.content.contains("PATH"));
    }

    #[test]
    fn path_exports_land_in_path() {
        let drafts = split_rc_file(SAMPLE);
        assert!(draft(&drafts, "path").content.contains("$HOME/bin"));
    }

    #[test]
    fn function_blocks_stay_whole() {
        let drafts = split_rc_file(SAMPLE);
        let functions = draft(&drafts, "functions");
        assert!(functions.content.contains("greet() {"));
        assert!(functions.content.contains("echo \"hello $1\""));
        assert!(functions.content.contains('}'));
    }

    #[test]
    fn comments_attach_to_following_code() {
        let drafts = split_rc_file(SAMPLE);
        assert!(draft(&drafts, "env").content.contains("# Environment"));
        assert!(draft(&drafts, "functions").content.contains("# Helpers"));
    }

    #[test]
    fn aliases_completion_prompt_plugins() {
        let drafts = split_rc_file(SAMPLE);
        assert!(draft(&drafts, "aliases").content.contains("alias ll="));
        assert!(draft(&drafts, "completion").content.contains("compinit"));
        assert!(draft(&drafts, "prompt").content.contains("PROMPT="));
        assert!(draft(&drafts, "plugins").content.contains(".fzf.zsh"));
    }

    #[test]
    fn unclassified_lines_fall_back_to_misc() {
        let drafts = split_rc_file(SAMPLE);
        assert!(draft(&drafts, "misc").content.contains("setopt HIST_IGNORE_DUPS"));
    }

    #[test]
    fn priorities_follow_load_order() {
        let drafts = split_rc_file(SAMPLE);
        let priorities: Vec<_> = drafts.iter().map(|d| d.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
        assert_eq!(draft(&drafts, "env").priority, 10);
        assert_eq!(draft(&drafts, "prompt").priority, 80);
    }

    #[test]
    fn empty_input_yields_no_drafts() {
        assert!(split_rc_file("").is_empty());
        assert!(split_rc_file("\n\n# only a comment\n").is_empty());
    }

    #[test]
    fn write_drafts_creates_files_and_modules() {
        let dir = tempfile::TempDir::new().unwrap();
        let drafts = split_rc_file(SAMPLE);

        let modules = write_drafts(dir.path(), &drafts).unwrap();
        assert_eq!(modules.len(), drafts.len());
        assert!(dir.path().join("modules/env.zsh").is_file());
        assert_eq!(modules[0].priority, 10);

        // The drafts form a valid manifest
        assert!(crate::domain::Manifest::new(modules).is_ok());
    }
}
