//! Target planning
//!
//! Turns the platform-agnostic resolved order into a per-bucket plan for one
//! target OS: filter by platform, partition by target bucket, stable-sort by
//! priority, then re-verify that priorities did not break a dependency.

use std::collections::HashMap;
use thiserror::Error;

use super::module::Module;

#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error(
        "Priority ordering in target '{target}' places '{module}' before its dependency '{dependency}'"
    )]
    OrderingConflict {
        target: String,
        module: String,
        dependency: String,
    },
}

/// Non-fatal findings surfaced alongside a plan
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum PlanWarning {
    /// A surviving module requires a module that the OS filter removed; the
    /// dependency has no physical presence in the output.
    FilteredDependency {
        module: String,
        dependency: String,
        os: String,
    },
}

impl std::fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanWarning::FilteredDependency {
                module,
                dependency,
                os,
            } => write!(
                f,
                "module '{}' requires '{}', which does not apply to {} and was left out",
                module, dependency, os
            ),
        }
    }
}

/// One output bucket with its ordered modules
#[derive(Debug, Clone, PartialEq)]
pub struct TargetBucket {
    pub name: String,
    pub modules: Vec<Module>,
}

/// The final per-bucket plan for one target OS
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetPlan {
    /// Buckets in first-appearance order of the filtered resolved order
    pub buckets: Vec<TargetBucket>,

    /// Non-fatal diagnostics gathered while planning
    pub warnings: Vec<PlanWarning>,
}

impl TargetPlan {
    /// Looks up a bucket by name
    pub fn bucket(&self, name: &str) -> Option<&TargetBucket> {
        self.buckets.iter().find(|b| b.name == name)
    }

    /// Total modules across all buckets
    pub fn module_count(&self) -> usize {
        self.buckets.iter().map(|b| b.modules.len()).sum()
    }
}

/// Plans the given resolved order for one target OS.
///
/// `allowed_targets`, when present, drops whole buckets whose name is not
/// listed; it never filters inside a bucket.
pub fn plan_targets(
    resolved: &[Module],
    os: &str,
    allowed_targets: Option<&[String]>,
) -> Result<TargetPlan, PlanError> {
    // Drop modules that do not apply to this platform, preserving order
    let surviving: Vec<&Module> = resolved.iter().filter(|m| m.applies_to(os)).collect();

    let mut warnings = Vec::new();
    for module in &surviving {
        for required in &module.requires {
            let dropped = resolved.iter().any(|m| &m.name == required)
                && !surviving.iter().any(|m| &m.name == required);
            if dropped {
                warnings.push(PlanWarning::FilteredDependency {
                    module: module.name.clone(),
                    dependency: required.clone(),
                    os: os.to_string(),
                });
            }
        }
    }

    // Partition by target bucket, lazily, in first-appearance order
    let mut buckets: Vec<TargetBucket> = Vec::new();
    for module in surviving {
        match buckets.iter_mut().find(|b| b.name == module.target) {
            Some(bucket) => bucket.modules.push(module.clone()),
            None => buckets.push(TargetBucket {
                name: module.target.clone(),
                modules: vec![module.clone()],
            }),
        }
    }

    if let Some(allowed) = allowed_targets {
        buckets.retain(|b| allowed.iter().any(|a| a == &b.name));
    }

    // Stable priority sort; ties keep the dependency-respecting order
    for bucket in &mut buckets {
        bucket.modules.sort_by_key(|m| m.priority);
    }

    // Priorities are a hint, never allowed to break a dependency
    for bucket in &buckets {
        let positions: HashMap<&str, usize> = bucket
            .modules
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.as_str(), i))
            .collect();

        for (index, module) in bucket.modules.iter().enumerate() {
            for required in &module.requires {
                if let Some(&dep_index) = positions.get(required.as_str()) {
                    if dep_index > index {
                        return Err(PlanError::OrderingConflict {
                            target: bucket.name.clone(),
                            module: module.name.clone(),
                            dependency: required.clone(),
                        });
                    }
                }
            }
        }
    }

    Ok(TargetPlan { buckets, warnings })
}
