//! Domain models for rcweave
//!
//! The pure build pipeline: modules and manifests, the dependency graph,
//! deterministic resolution, target planning, and content assembly. No I/O
//! happens here; content comes in through the [`ContentProvider`] seam.

mod graph;
mod module;
mod pipeline;
mod planner;
mod resolver;

pub use graph::{DependencyGraph, GraphError};
pub use module::{Manifest, ManifestError, Module, DEFAULT_PRIORITY, DEFAULT_TARGET};
pub use pipeline::{
    build, resolve, validate, BucketOutput, BuildError, BuildOutput, ContentError, ContentProvider,
};
pub use planner::{plan_targets, PlanError, PlanWarning, TargetBucket, TargetPlan};
pub use resolver::{find_cycles, resolve_order, ResolveError};
