//! The `build` command: render and install startup files

use std::path::Path;

use anyhow::Result;

use super::output::Output;
use crate::domain::{self, BuildOutput};
use crate::shell::{current_platform, ShellKind};
use crate::storage::{Project, SnapshotStore};

/// Target platform: explicit flag, otherwise this machine
pub(super) fn effective_os(flag: Option<&str>) -> String {
    flag.map(str::to_string)
        .unwrap_or_else(|| current_platform().to_string())
}

/// Shell hint: explicit flag, then project config, then global default
pub(super) fn effective_shell(project: &Project, flag: Option<ShellKind>) -> ShellKind {
    flag.or(project.config().global.default_shell)
        .unwrap_or(project.config().project.shell)
}

/// Renders the build for the given flags without touching the filesystem
pub(super) fn render(
    project: &Project,
    os: Option<&str>,
    shell: Option<ShellKind>,
    targets: &[String],
) -> Result<BuildOutput> {
    let manifest = project.manifest()?;
    let os = effective_os(os);
    let shell = effective_shell(project, shell);
    let allowed = if targets.is_empty() {
        None
    } else {
        Some(targets)
    };

    Ok(domain::build(
        &manifest,
        &os,
        shell,
        allowed,
        &project.provider(),
    )?)
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    output: &Output,
    os: Option<&str>,
    shell: Option<ShellKind>,
    targets: &[String],
    output_dir: Option<&Path>,
    stdout: bool,
    dry_run: bool,
    no_snapshot: bool,
) -> Result<()> {
    let project = Project::open_current()?;
    output.verbose_ctx(
        "build",
        &format!("os={:?} shell={:?} targets={:?}", os, shell, targets),
    );

    let result = render(&project, os, shell, targets)?;

    for warning in &result.warnings {
        output.warning(&warning.to_string());
    }

    if stdout {
        for bucket in &result.targets {
            if output.is_text() {
                print!("{}", bucket.content);
            }
        }
        if output.is_json() {
            output.data(&result);
        }
        return Ok(());
    }

    if dry_run {
        if output.is_json() {
            output.data(&result);
        } else {
            for bucket in &result.targets {
                output.row(&[
                    &bucket.file_name,
                    &bucket.target,
                    &format!("{} modules", bucket.module_count),
                    &format!("{}", bucket.modules.join(", ")),
                ]);
            }
            output.success(&format!(
                "Dry run: {} file(s) would be written for {} ({})",
                result.targets.len(),
                result.os,
                result.shell
            ));
        }
        return Ok(());
    }

    let output_dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => project.config().project.effective_output_dir()?,
    };

    let snapshot_enabled =
        !no_snapshot && project.config().project.snapshot.enabled;
    if snapshot_enabled {
        let installed = super::snapshot_cmd::installed_files(&result, &output_dir)?;
        if !installed.is_empty() {
            let store = SnapshotStore::open_or_init(&project.snapshots_dir())?;
            let info = store.create(&installed, "pre-build snapshot")?;
            output.verbose_ctx("build", &format!("Saved snapshot {}", info.id));
        }
    }

    let written = project.write_outputs(&result, &output_dir)?;

    if output.is_json() {
        output.data(&result);
    } else {
        for (path, bucket) in written.iter().zip(&result.targets) {
            output.row(&[
                &path.display().to_string(),
                &format!("{} modules", bucket.module_count),
            ]);
        }
        output.success(&format!(
            "Built {} file(s) for {} ({})",
            written.len(),
            result.os,
            result.shell
        ));
    }

    Ok(())
}
