//! The `diff` command: compare rendered output against installed files

use std::fs;
use std::path::Path;

use anyhow::Result;

use super::build::render;
use super::output::Output;
use crate::shell::ShellKind;
use crate::storage::Project;

/// Comparison result for one bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
enum FileStatus {
    Missing,
    UpToDate,
    Modified,
}

impl FileStatus {
    fn label(&self) -> &'static str {
        match self {
            FileStatus::Missing => "missing",
            FileStatus::UpToDate => "up-to-date",
            FileStatus::Modified => "modified",
        }
    }
}

pub fn run(output: &Output, os: Option<&str>, shell: Option<ShellKind>) -> Result<()> {
    let project = Project::open_current()?;
    let result = render(&project, os, shell, &[])?;
    let output_dir = project.config().project.effective_output_dir()?;

    let mut findings = Vec::new();
    let mut changed = 0;

    for bucket in &result.targets {
        let installed_path = output_dir.join(&bucket.file_name);
        let status = compare(&bucket.content, &installed_path);

        if status != FileStatus::UpToDate {
            changed += 1;
        }

        if output.is_text() {
            output.row(&[&bucket.file_name, status.label()]);
            if status == FileStatus::Modified {
                let installed = fs::read_to_string(&installed_path)?;
                for line in diff_lines(&installed, &bucket.content) {
                    output.row(&[&line]);
                }
                output.blank();
            }
        }

        findings.push(serde_json::json!({
            "target": bucket.target,
            "file": bucket.file_name,
            "status": status,
        }));
    }

    if output.is_json() {
        output.data(&findings);
    } else if changed == 0 {
        output.success("All installed files are up to date");
    } else {
        output.success(&format!("{} file(s) differ", changed));
    }

    Ok(())
}

/// Hash-first comparison; only equal content counts as up to date
fn compare(rendered: &str, installed: &Path) -> FileStatus {
    let installed_content = match fs::read(installed) {
        Ok(content) => content,
        Err(_) => return FileStatus::Missing,
    };

    if blake3::hash(rendered.as_bytes()) == blake3::hash(&installed_content) {
        FileStatus::UpToDate
    } else {
        FileStatus::Modified
    }
}

/// Minimal LCS line diff: `-` lines only in the installed file, `+` lines
/// only in the rendered output. Fine for rc-file-sized inputs.
fn diff_lines(installed: &str, rendered: &str) -> Vec<String> {
    let old: Vec<&str> = installed.lines().collect();
    let new: Vec<&str> = rendered.lines().collect();

    // LCS length table
    let mut table = vec![vec![0usize; new.len() + 1]; old.len() + 1];
    for i in (0..old.len()).rev() {
        for j in (0..new.len()).rev() {
            table[i][j] = if old[i] == new[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut lines = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < old.len() && j < new.len() {
        if old[i] == new[j] {
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            lines.push(format!("- {}", old[i]));
            i += 1;
        } else {
            lines.push(format!("+ {}", new[j]));
            j += 1;
        }
    }
    for line in &old[i..] {
        lines.push(format!("- {}", line));
    }
    for line in &new[j..] {
        lines.push(format!("+ {}", line));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_content_produces_no_diff() {
        assert!(diff_lines("a\nb\n", "a\nb\n").is_empty());
    }

    #[test]
    fn added_and_removed_lines() {
        let lines = diff_lines("a\nb\nc\n", "a\nc\nd\n");
        assert_eq!(lines, vec!["- b", "+ d"]);
    }

    #[test]
    fn completely_different_content() {
        let lines = diff_lines("old\n", "new\n");
        assert_eq!(lines, vec!["- old", "+ new"]);
    }

    #[test]
    fn compare_detects_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(
            compare("content", &dir.path().join("nope")),
            FileStatus::Missing
        );
    }

    #[test]
    fn compare_detects_equal_and_modified() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".zshrc");
        fs::write(&path, "same\n").unwrap();

        assert_eq!(compare("same\n", &path), FileStatus::UpToDate);
        assert_eq!(compare("different\n", &path), FileStatus::Modified);
    }
}
