//! The `snapshot` command group: create, list, restore, cleanup

use std::fs;
use std::path::Path;

use anyhow::Result;
use clap::Subcommand;

use super::build::render;
use super::output::Output;
use crate::domain::BuildOutput;
use crate::storage::{Project, SnapshotStore};

#[derive(Subcommand)]
pub enum SnapshotCommands {
    /// Snapshot the currently installed output files
    Create,

    /// List stored snapshots, newest first
    List,

    /// Restore a snapshot's files into the output directory
    Restore {
        /// Snapshot id, e.g. snap-20260807-153000
        id: String,
    },

    /// Delete old snapshots, keeping the newest ones
    Cleanup {
        /// How many snapshots to keep (defaults to project config)
        #[arg(long)]
        keep: Option<usize>,
    },
}

/// Reads the installed files named by a build, skipping ones that do not
/// exist yet. Returns (relative name, content) pairs for the snapshot store.
pub(super) fn installed_files(
    result: &BuildOutput,
    output_dir: &Path,
) -> Result<Vec<(String, String)>> {
    let mut files = Vec::new();
    for bucket in &result.targets {
        let path = output_dir.join(&bucket.file_name);
        if let Ok(content) = fs::read_to_string(&path) {
            files.push((bucket.file_name.clone(), content));
        }
    }
    Ok(files)
}

pub fn run(cmd: SnapshotCommands, output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let store = SnapshotStore::open_or_init(&project.snapshots_dir())?;
    let output_dir = project.config().project.effective_output_dir()?;

    match cmd {
        SnapshotCommands::Create => {
            let result = render(&project, None, None, &[])?;
            let files = installed_files(&result, &output_dir)?;
            output.verbose_ctx("snapshot", &format!("{} installed file(s)", files.len()));

            let info = store.create(&files, "manual snapshot")?;
            if output.is_json() {
                output.data(&info);
            } else {
                output.success(&format!(
                    "Created snapshot {} ({} file(s))",
                    info.id, info.file_count
                ));
            }
        }

        SnapshotCommands::List => {
            let snapshots = store.list()?;
            if output.is_json() {
                output.data(&snapshots);
            } else {
                for snapshot in &snapshots {
                    output.row(&[
                        &snapshot.id,
                        &snapshot.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                        &format!("{} file(s)", snapshot.file_count),
                        &snapshot.message,
                    ]);
                }
                output.success(&format!("{} snapshot(s)", snapshots.len()));
            }
        }

        SnapshotCommands::Restore { id } => {
            let restored = store.restore(&id, &output_dir)?;
            if output.is_json() {
                let paths: Vec<_> = restored
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                output.data(&paths);
            } else {
                for path in &restored {
                    output.row(&[&path.display().to_string()]);
                }
                output.success(&format!("Restored {} file(s) from {}", restored.len(), id));
            }
        }

        SnapshotCommands::Cleanup { keep } => {
            let keep = keep.unwrap_or(project.config().project.snapshot.keep);
            let deleted = store.cleanup(keep)?;
            output.success(&format!(
                "Deleted {} snapshot(s), kept the newest {}",
                deleted, keep
            ));
        }
    }

    Ok(())
}
