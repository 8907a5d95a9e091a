//! Dependency graph construction and topological sorting.
//!
//! Nodes are file keys; a declared dependency produces a reverse edge
//! (dependency → dependent) so zero-in-degree files come out first. The
//! ready stack is drained in discovery order, which makes the output
//! deterministic for a fixed input.

use std::collections::HashMap;
use thiserror::Error;

/// Errors from dependency resolution. Both variants carry structured
/// data so callers can react programmatically.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DependencyError {
    /// Not every node could be ordered; the named nodes sit on a cycle.
    #[error("the following dependencies result in a cycle: {}", .remaining.join(", "))]
    Cycle { remaining: Vec<String> },

    /// A declared dependency names a file absent from the universe.
    #[error("couldn't find dependency {dependency} when processing {file}")]
    Missing { file: String, dependency: String },
}

/// Source of immediate-dependency declarations, keyed by file key.
/// Implemented by the codebase index and by plain maps in tests.
pub trait DependencyLookup {
    fn contains(&self, key: &str) -> bool;
    fn dependencies_of(&self, key: &str) -> Vec<String>;
}

impl DependencyLookup for HashMap<String, Vec<String>> {
    fn contains(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn dependencies_of(&self, key: &str) -> Vec<String> {
        self.get(key).cloned().unwrap_or_default()
    }
}

/// Graph node: in-degree (count of declared immediate dependencies,
/// duplicates included) plus reverse edges to dependents.
struct Node {
    in_degree: usize,
    dependents: Vec<String>,
}

/// Breadth-first discovery of everything reachable from `start_nodes`.
/// Returns the graph and the initial zero-in-degree stack. Missing
/// dependencies are caught here, before any sorting happens.
fn build_dependency_graph(
    start_nodes: &[String],
    lookup: &impl DependencyLookup,
) -> Result<(HashMap<String, Node>, Vec<String>), DependencyError> {
    let mut graph: HashMap<String, Node> = HashMap::new();
    let mut queue: Vec<String> = Vec::new();
    let mut start_sort: Vec<String> = Vec::new();

    let mut add_vertex = |file: &str,
                          graph: &mut HashMap<String, Node>,
                          queue: &mut Vec<String>,
                          start_sort: &mut Vec<String>| {
        let in_degree = lookup.dependencies_of(file).len();
        graph.insert(
            file.to_string(),
            Node {
                in_degree,
                dependents: Vec::new(),
            },
        );
        queue.push(file.to_string());
        if in_degree == 0 {
            start_sort.push(file.to_string());
        }
    };

    for file in start_nodes {
        if !graph.contains_key(file) {
            add_vertex(file, &mut graph, &mut queue, &mut start_sort);
        }
    }

    let mut i = 0;
    while i < queue.len() {
        let file = queue[i].clone();
        for dependency in lookup.dependencies_of(&file) {
            if !lookup.contains(&dependency) {
                return Err(DependencyError::Missing {
                    file,
                    dependency,
                });
            }
            if !graph.contains_key(&dependency) {
                add_vertex(&dependency, &mut graph, &mut queue, &mut start_sort);
            }
            if let Some(node) = graph.get_mut(&dependency) {
                node.dependents.push(file.clone());
            }
        }
        i += 1;
    }

    Ok((graph, start_sort))
}

/// Drain the ready stack, appending each zero-in-degree node to the
/// result and releasing its dependents. Leftover positive in-degrees
/// mean a cycle.
fn topological_sort(
    mut graph: HashMap<String, Node>,
    mut ready: Vec<String>,
) -> Result<Vec<String>, DependencyError> {
    let mut result = Vec::new();
    while let Some(node) = ready.pop() {
        let dependents = match graph.get(&node) {
            Some(n) => n.dependents.clone(),
            None => Vec::new(),
        };
        result.push(node);
        for dependent in dependents {
            if let Some(n) = graph.get_mut(&dependent) {
                n.in_degree -= 1;
                if n.in_degree == 0 {
                    ready.push(dependent);
                }
            }
        }
    }
    let mut remaining: Vec<String> = graph
        .iter()
        .filter(|(_, node)| node.in_degree > 0)
        .map(|(name, _)| name.clone())
        .collect();
    if remaining.is_empty() {
        Ok(result)
    } else {
        remaining.sort();
        Err(DependencyError::Cycle { remaining })
    }
}

/// Ordered transitive dependency closure of `start_nodes`: every key's
/// dependencies appear before it, and the start nodes themselves are
/// included.
pub fn find_dependencies(
    start_nodes: &[String],
    lookup: &impl DependencyLookup,
) -> Result<Vec<String>, DependencyError> {
    let (graph, start_sort) = build_dependency_graph(start_nodes, lookup)?;
    topological_sort(graph, start_sort)
}
