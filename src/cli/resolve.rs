//! The `resolve` and `validate` commands

use anyhow::Result;

use super::output::Output;
use crate::domain::{self, BuildError};
use crate::storage::Project;

/// Prints the platform-independent resolved module order
pub fn order(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let manifest = project.manifest()?;

    let resolved = domain::resolve(&manifest)?;
    output.verbose_ctx("resolve", &format!("{} modules", resolved.len()));

    if output.is_json() {
        let items: Vec<_> = resolved
            .iter()
            .map(|m| {
                serde_json::json!({
                    "name": m.name,
                    "target": m.target,
                    "priority": m.priority,
                    "requires": m.requires,
                })
            })
            .collect();
        output.data(&items);
    } else {
        for (index, module) in resolved.iter().enumerate() {
            output.row(&[
                &format!("{}", index + 1),
                &module.name,
                &module.target,
                &format!("{}", module.priority),
            ]);
        }
    }

    Ok(())
}

/// Lint-style check: reports every unknown dependency and cycle
pub fn lint(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let manifest = project.manifest()?;

    let findings = domain::validate(&manifest);
    output.verbose_ctx("validate", &format!("{} finding(s)", findings.len()));

    if output.is_json() {
        let items: Vec<_> = findings.iter().map(finding_json).collect();
        output.data(&items);
    } else {
        for finding in &findings {
            output.row(&[&finding.to_string()]);
        }
    }

    if findings.is_empty() {
        output.success(&format!("{} modules, no problems found", manifest.len()));
        Ok(())
    } else {
        anyhow::bail!("{} problem(s) found in manifest", findings.len())
    }
}

fn finding_json(finding: &BuildError) -> serde_json::Value {
    let kind = match finding {
        BuildError::Graph(_) => "unknown_dependency",
        BuildError::Resolve(_) => "circular_dependency",
        BuildError::Plan(_) => "ordering_conflict",
        BuildError::Content(_) => "content_not_found",
    };
    serde_json::json!({
        "kind": kind,
        "message": finding.to_string(),
    })
}
