//! The `migrate` command: split a monolithic rc file into a module project

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use crate::storage::{save_manifest, split_rc_file, write_drafts, MANIFEST_FILE};

pub fn run(output: &Output, file: &Path, into: &Path, dry_run: bool) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read rc file: {}", file.display()))?;

    let drafts = split_rc_file(&content);
    output.verbose_ctx(
        "migrate",
        &format!("{} section(s) found in {}", drafts.len(), file.display()),
    );

    if drafts.is_empty() {
        anyhow::bail!("No splittable content found in {}", file.display());
    }

    if dry_run {
        if output.is_json() {
            output.data(&drafts);
        } else {
            for draft in &drafts {
                output.row(&[
                    &draft.name,
                    &draft.file,
                    &format!("priority {}", draft.priority),
                    &format!("{} line(s)", draft.line_count),
                ]);
            }
            output.success(&format!(
                "Dry run: would split {} into {} module(s)",
                file.display(),
                drafts.len()
            ));
        }
        return Ok(());
    }

    let manifest_path = into.join(MANIFEST_FILE);
    if manifest_path.exists() {
        anyhow::bail!(
            "A manifest already exists at {}; refusing to overwrite",
            manifest_path.display()
        );
    }

    fs::create_dir_all(into)
        .with_context(|| format!("Failed to create directory: {}", into.display()))?;

    let modules = write_drafts(into, &drafts)?;
    save_manifest(&manifest_path, &modules)?;

    if output.is_json() {
        output.data(&drafts);
    } else {
        output.success(&format!(
            "Split {} into {} module(s) under {}",
            file.display(),
            modules.len(),
            into.display()
        ));
    }

    Ok(())
}
