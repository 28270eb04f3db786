//! Dependency graph for modules
//!
//! Derived, transient structure: one vertex per module name, one edge per
//! declared dependency (dependency -> dependent). Built fresh for every
//! build and never persisted. Uses petgraph for graph operations.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;
use thiserror::Error;

use super::module::Manifest;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Module '{module}' requires unknown module '{missing}'")]
    UnknownDependency { module: String, missing: String },
}

/// A validated dependency graph over module names.
///
/// Edge direction is dependency -> dependent: "the dependency must be
/// sourced before the dependent".
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// The underlying directed graph
    graph: DiGraph<String, ()>,

    /// Map from module name to node index
    node_map: HashMap<String, NodeIndex>,

    /// Module names in manifest declaration order
    names: Vec<String>,
}

impl DependencyGraph {
    /// Builds a graph from a manifest.
    ///
    /// Every `requires` entry must name a declared module; the first entry
    /// that does not fails the build with [`GraphError::UnknownDependency`].
    pub fn from_manifest(manifest: &Manifest) -> Result<Self, GraphError> {
        let (graph, errors) = Self::from_manifest_lenient(manifest);
        match errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(graph),
        }
    }

    /// Lenient variant used by lint-style validation: collects every
    /// unknown-dependency error, skips the offending edges, and returns the
    /// partial graph so cycle scanning can still run.
    pub fn from_manifest_lenient(manifest: &Manifest) -> (Self, Vec<GraphError>) {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();
        let mut names = Vec::with_capacity(manifest.len());

        // First pass: one vertex per module, in declaration order
        for module in manifest.iter() {
            let idx = graph.add_node(module.name.clone());
            node_map.insert(module.name.clone(), idx);
            names.push(module.name.clone());
        }

        // Second pass: one edge per unique (dependency, dependent) pair
        let mut errors = Vec::new();
        for module in manifest.iter() {
            let dependent = node_map[&module.name];
            for required in &module.requires {
                match node_map.get(required) {
                    Some(&dependency) => {
                        // update_edge tolerates duplicate requires entries
                        graph.update_edge(dependency, dependent, ());
                    }
                    None => errors.push(GraphError::UnknownDependency {
                        module: module.name.clone(),
                        missing: required.clone(),
                    }),
                }
            }
        }

        (
            Self {
                graph,
                node_map,
                names,
            },
            errors,
        )
    }

    /// Direct dependencies of a module, in declared `requires` order
    pub fn dependencies(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Incoming)
    }

    /// Direct dependents of a module (modules that require it)
    pub fn dependents(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Outgoing)
    }

    fn neighbors(&self, name: &str, dir: Direction) -> Vec<&str> {
        let idx = match self.node_map.get(name) {
            Some(idx) => *idx,
            None => return vec![],
        };

        // petgraph walks edges in reverse insertion order; reverse back so
        // callers see declared order
        let mut found: Vec<&str> = self
            .graph
            .neighbors_directed(idx, dir)
            .filter_map(|n| self.graph.node_weight(n).map(String::as_str))
            .collect();
        found.reverse();
        found
    }

    /// Module names in manifest declaration order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns true if the graph contains the module
    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// Number of modules in the graph
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::module::Module;

    fn manifest(modules: Vec<Module>) -> Manifest {
        Manifest::new(modules).unwrap()
    }

    #[test]
    fn empty_graph() {
        let graph = DependencyGraph::from_manifest(&Manifest::default()).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.len(), 0);
    }

    #[test]
    fn vertices_and_edges() {
        let m = manifest(vec![
            Module::new("base", "base.zsh"),
            Module::new("aliases", "aliases.zsh").with_requires(&["base"]),
        ]);
        let graph = DependencyGraph::from_manifest(&m).unwrap();

        assert_eq!(graph.len(), 2);
        assert!(graph.contains("base"));
        assert_eq!(graph.dependencies("aliases"), vec!["base"]);
        assert_eq!(graph.dependents("base"), vec!["aliases"]);
        assert!(graph.dependencies("base").is_empty());
    }

    #[test]
    fn dependencies_in_declared_order() {
        let m = manifest(vec![
            Module::new("a", "a.zsh"),
            Module::new("b", "b.zsh"),
            Module::new("c", "c.zsh"),
            Module::new("d", "d.zsh").with_requires(&["c", "a", "b"]),
        ]);
        let graph = DependencyGraph::from_manifest(&m).unwrap();

        assert_eq!(graph.dependencies("d"), vec!["c", "a", "b"]);
    }

    #[test]
    fn duplicate_requires_collapse_to_one_edge() {
        let m = manifest(vec![
            Module::new("base", "base.zsh"),
            Module::new("aliases", "aliases.zsh").with_requires(&["base", "base"]),
        ]);
        let graph = DependencyGraph::from_manifest(&m).unwrap();

        assert_eq!(graph.dependencies("aliases"), vec!["base"]);
    }

    #[test]
    fn unknown_dependency_is_fatal() {
        let m = manifest(vec![Module::new("x", "x.zsh").with_requires(&["missing"])]);
        let result = DependencyGraph::from_manifest(&m);

        assert_eq!(
            result.unwrap_err(),
            GraphError::UnknownDependency {
                module: "x".to_string(),
                missing: "missing".to_string(),
            }
        );
    }

    #[test]
    fn lenient_build_collects_all_unknowns() {
        let m = manifest(vec![
            Module::new("a", "a.zsh").with_requires(&["ghost"]),
            Module::new("b", "b.zsh").with_requires(&["a", "phantom"]),
        ]);
        let (graph, errors) = DependencyGraph::from_manifest_lenient(&m);

        assert_eq!(errors.len(), 2);
        // The valid edge survives
        assert_eq!(graph.dependencies("b"), vec!["a"]);
    }

    #[test]
    fn names_follow_manifest_order() {
        let m = manifest(vec![
            Module::new("z", "z.zsh"),
            Module::new("a", "a.zsh"),
            Module::new("m", "m.zsh"),
        ]);
        let graph = DependencyGraph::from_manifest(&m).unwrap();
        assert_eq!(graph.names(), &["z", "a", "m"]);
    }
}
