//! Deterministic dependency resolution
//!
//! Produces one topological ordering of all modules in the graph, the same
//! one on every run: start vertices are visited in manifest declaration
//! order and each module's dependencies are visited in declared `requires`
//! order, with post-order emission. A module is appended only after all of
//! its dependencies have been appended.

use std::collections::HashSet;
use thiserror::Error;

use super::graph::DependencyGraph;
use super::module::{Manifest, Module};

#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    #[error("Circular dependency involving module '{module}'")]
    CircularDependency { module: String },
}

/// Produces the resolved order for every module in the manifest.
///
/// The result contains each module exactly once and satisfies: for every
/// module M and every D in M.requires, D appears before M.
pub fn resolve_order(
    manifest: &Manifest,
    graph: &DependencyGraph,
) -> Result<Vec<Module>, ResolveError> {
    let mut visited = HashSet::new();
    let mut on_path = HashSet::new();
    let mut order = Vec::with_capacity(manifest.len());

    for name in graph.names() {
        visit(name, graph, &mut visited, &mut on_path, &mut order)?;
    }

    Ok(order
        .into_iter()
        .filter_map(|name| manifest.get(&name).cloned())
        .collect())
}

fn visit(
    name: &str,
    graph: &DependencyGraph,
    visited: &mut HashSet<String>,
    on_path: &mut HashSet<String>,
    order: &mut Vec<String>,
) -> Result<(), ResolveError> {
    if visited.contains(name) {
        return Ok(());
    }
    if on_path.contains(name) {
        // Reached a vertex already on the current DFS path: cycle
        return Err(ResolveError::CircularDependency {
            module: name.to_string(),
        });
    }

    on_path.insert(name.to_string());
    for dependency in graph.dependencies(name) {
        visit(dependency, graph, visited, on_path, order)?;
    }
    on_path.remove(name);

    visited.insert(name.to_string());
    order.push(name.to_string());
    Ok(())
}

/// Accumulating variant for lint-style validation: scans every vertex and
/// records one error per back edge found instead of aborting at the first.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<ResolveError> {
    let mut visited = HashSet::new();
    let mut errors = Vec::new();

    for name in graph.names() {
        let mut on_path = HashSet::new();
        scan(name, graph, &mut visited, &mut on_path, &mut errors);
    }

    errors
}

fn scan(
    name: &str,
    graph: &DependencyGraph,
    visited: &mut HashSet<String>,
    on_path: &mut HashSet<String>,
    errors: &mut Vec<ResolveError>,
) {
    if visited.contains(name) {
        return;
    }

    on_path.insert(name.to_string());
    for dependency in graph.dependencies(name) {
        if on_path.contains(dependency) {
            errors.push(ResolveError::CircularDependency {
                module: dependency.to_string(),
            });
            continue;
        }
        scan(dependency, graph, visited, on_path, errors);
    }
    on_path.remove(name);
    visited.insert(name.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::module::Module;

    fn resolve(modules: Vec<Module>) -> Result<Vec<String>, ResolveError> {
        let manifest = Manifest::new(modules).unwrap();
        let graph = DependencyGraph::from_manifest(&manifest).unwrap();
        resolve_order(&manifest, &graph)
            .map(|order| order.into_iter().map(|m| m.name).collect())
    }

    #[test]
    fn chain_resolves_in_dependency_order() {
        let order = resolve(vec![
            Module::new("c", "c.zsh").with_requires(&["b"]),
            Module::new("b", "b.zsh").with_requires(&["a"]),
            Module::new("a", "a.zsh"),
        ])
        .unwrap();

        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn independent_modules_keep_declaration_order() {
        let order = resolve(vec![
            Module::new("z", "z.zsh"),
            Module::new("a", "a.zsh"),
            Module::new("m", "m.zsh"),
        ])
        .unwrap();

        assert_eq!(order, vec!["z", "a", "m"]);
    }

    #[test]
    fn diamond_emits_each_module_once() {
        let order = resolve(vec![
            Module::new("top", "top.zsh").with_requires(&["left", "right"]),
            Module::new("left", "left.zsh").with_requires(&["base"]),
            Module::new("right", "right.zsh").with_requires(&["base"]),
            Module::new("base", "base.zsh"),
        ])
        .unwrap();

        assert_eq!(order.len(), 4);
        let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert!(pos("base") < pos("left"));
        assert!(pos("base") < pos("right"));
        assert!(pos("left") < pos("top"));
        assert!(pos("right") < pos("top"));
    }

    #[test]
    fn two_module_cycle_is_fatal() {
        let result = resolve(vec![
            Module::new("a", "a.zsh").with_requires(&["b"]),
            Module::new("b", "b.zsh").with_requires(&["a"]),
        ]);

        assert!(matches!(
            result,
            Err(ResolveError::CircularDependency { .. })
        ));
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let result = resolve(vec![Module::new("a", "a.zsh").with_requires(&["a"])]);
        assert_eq!(
            result,
            Err(ResolveError::CircularDependency {
                module: "a".to_string()
            })
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let modules = vec![
            Module::new("d", "d.zsh").with_requires(&["b", "c"]),
            Module::new("b", "b.zsh").with_requires(&["a"]),
            Module::new("c", "c.zsh").with_requires(&["a"]),
            Module::new("a", "a.zsh"),
        ];

        let first = resolve(modules.clone()).unwrap();
        for _ in 0..10 {
            assert_eq!(resolve(modules.clone()).unwrap(), first);
        }
        // DFS from "d" pulls in a, then b, then c, then d itself
        assert_eq!(first, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn find_cycles_collects_every_cycle() {
        let manifest = Manifest::new(vec![
            Module::new("a", "a.zsh").with_requires(&["b"]),
            Module::new("b", "b.zsh").with_requires(&["a"]),
            Module::new("ok", "ok.zsh"),
            Module::new("x", "x.zsh").with_requires(&["y"]),
            Module::new("y", "y.zsh").with_requires(&["x"]),
        ])
        .unwrap();
        let (graph, errors) = DependencyGraph::from_manifest_lenient(&manifest);
        assert!(errors.is_empty());

        let cycles = find_cycles(&graph);
        assert_eq!(cycles.len(), 2);
    }

    #[test]
    fn find_cycles_on_acyclic_graph_is_empty() {
        let manifest = Manifest::new(vec![
            Module::new("a", "a.zsh"),
            Module::new("b", "b.zsh").with_requires(&["a"]),
        ])
        .unwrap();
        let graph = DependencyGraph::from_manifest(&manifest).unwrap();

        assert!(find_cycles(&graph).is_empty());
    }
}
