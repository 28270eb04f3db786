//! Build pipeline
//!
//! Single entry point tying the stages together: graph construction,
//! resolution, target planning, and content assembly. Each stage produces a
//! new value; any error aborts the whole build with no partial output.

use serde::Serialize;
use thiserror::Error;

use super::graph::{DependencyGraph, GraphError};
use super::module::{Manifest, Module};
use super::planner::{plan_targets, PlanError, PlanWarning};
use super::resolver::{find_cycles, resolve_order, ResolveError};
use crate::shell::ShellKind;

#[derive(Debug, Error, PartialEq)]
pub enum ContentError {
    #[error("Content file '{file}' for module '{module}' not found")]
    NotFound { module: String, file: String },
}

/// Everything that can fail a build, propagated verbatim from the stage
/// that detected it.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Content(#[from] ContentError),
}

/// Supplies module content by file path. The core performs no I/O itself;
/// tests use in-memory providers and the CLI uses the file-backed one.
pub trait ContentProvider {
    fn fetch(&self, module: &Module) -> Result<String, ContentError>;
}

/// One rendered output bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketOutput {
    /// Bucket name from the manifest
    pub target: String,

    /// Destination file name, relative to the output directory
    pub file_name: String,

    /// Module names in final load order
    pub modules: Vec<String>,

    /// Concatenated, ready-to-source text
    pub content: String,

    pub module_count: usize,
}

/// Result of a full build: one entry per non-empty bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildOutput {
    pub os: String,
    pub shell: ShellKind,
    pub targets: Vec<BucketOutput>,

    /// Non-fatal planning diagnostics
    pub warnings: Vec<PlanWarning>,
}

/// Resolves the manifest into one deterministic, dependency-respecting
/// ordering of all modules, independent of any target platform.
pub fn resolve(manifest: &Manifest) -> Result<Vec<Module>, BuildError> {
    let graph = DependencyGraph::from_manifest(manifest)?;
    Ok(resolve_order(manifest, &graph)?)
}

/// Lint-style validation: collects every unknown dependency and every
/// detected cycle instead of stopping at the first finding.
pub fn validate(manifest: &Manifest) -> Vec<BuildError> {
    let (graph, graph_errors) = DependencyGraph::from_manifest_lenient(manifest);

    let mut findings: Vec<BuildError> = graph_errors.into_iter().map(BuildError::from).collect();
    findings.extend(find_cycles(&graph).into_iter().map(BuildError::from));
    findings
}

/// Runs the whole pipeline for one target OS and shell.
///
/// `allowed_targets` restricts the plan to the named buckets; buckets
/// outside the subset are dropped entirely.
pub fn build(
    manifest: &Manifest,
    os: &str,
    shell: ShellKind,
    allowed_targets: Option<&[String]>,
    provider: &dyn ContentProvider,
) -> Result<BuildOutput, BuildError> {
    let resolved = resolve(manifest)?;
    let plan = plan_targets(&resolved, os, allowed_targets)?;

    let mut targets = Vec::with_capacity(plan.buckets.len());
    for bucket in &plan.buckets {
        let mut sections = Vec::with_capacity(bucket.modules.len());
        for module in &bucket.modules {
            let content = provider.fetch(module)?;
            sections.push(render_section(module, &content));
        }

        targets.push(BucketOutput {
            target: bucket.name.clone(),
            file_name: shell.destination(&bucket.name),
            modules: bucket.modules.iter().map(|m| m.name.clone()).collect(),
            content: render_bucket(&bucket.name, &sections),
            module_count: bucket.modules.len(),
        });
    }

    Ok(BuildOutput {
        os: os.to_string(),
        shell,
        targets,
        warnings: plan.warnings,
    })
}

/// Banner + body for one module. The banner is the deterministic separator;
/// no timestamps or machine-specific text may appear here.
fn render_section(module: &Module, content: &str) -> String {
    let body = content.trim_end_matches('\n');
    format!("# --- {} ---\n{}\n", module.name, body)
}

fn render_bucket(target: &str, sections: &[String]) -> String {
    let mut out = format!("# Generated by rcweave for target '{}'. Do not edit by hand.\n\n", target);
    out.push_str(&sections.join("\n"));
    out
}
