use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which cycle-closing edges may be dropped instead of failing the build.
///
/// An edge that would close a cycle is dropped only when neither endpoint
/// contains an always-allowed marker and exactly one endpoint contains the
/// test-fixtures marker. This covers a module's test fixtures depending on
/// production code that in turn depends on the fixtures' host module.
/// Every other cycle is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyclePolicy {
    #[serde(default)]
    pub allowed_markers: Vec<String>,
    #[serde(default = "default_test_fixtures_marker")]
    pub test_fixtures_marker: String,
}

fn default_test_fixtures_marker() -> String {
    "test-fixtures".to_string()
}

impl Default for CyclePolicy {
    fn default() -> Self {
        Self {
            allowed_markers: Vec::new(),
            test_fixtures_marker: default_test_fixtures_marker(),
        }
    }
}

impl CyclePolicy {
    fn is_allowed(&self, path: &str) -> bool {
        self.allowed_markers
            .iter()
            .any(|marker| path.contains(marker.as_str()))
    }

    /// Whether a cycle-closing edge `from -> to` is dropped rather than fatal
    pub fn tolerates(&self, from: &str, to: &str) -> bool {
        let marker = self.test_fixtures_marker.as_str();
        !self.is_allowed(from)
            && !self.is_allowed(to)
            && (from.contains(marker) != to.contains(marker))
    }
}

/// What happened to an edge passed to [`DependencyGraph::add_dependency`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    Added,
    /// The edge was already present
    Duplicate,
    /// `from == to`; self-dependencies are never recorded
    SelfLoop,
    /// The edge would have closed a cycle and the policy tolerated it
    DroppedCycle,
}

/// Directed acyclic module graph. Edges point from a module to its dependencies.
///
/// Vertices keep insertion order so traversals and reports are deterministic.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    modules: Vec<String>,
    index: HashMap<String, usize>,
    adjacency: Vec<Vec<usize>>,
    policy: CyclePolicy,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new(policy: CyclePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Add a module to the graph, returning its vertex index
    pub fn add_module(&mut self, module: &str) -> usize {
        if let Some(&idx) = self.index.get(module) {
            return idx;
        }
        let idx = self.modules.len();
        self.modules.push(module.to_string());
        self.index.insert(module.to_string(), idx);
        self.adjacency.push(Vec::new());
        idx
    }

    /// Add `from -> to`, applying the cycle policy.
    ///
    /// Both endpoints become vertices even when the edge itself is dropped.
    pub fn add_dependency(&mut self, from: &str, to: &str) -> Result<EdgeOutcome> {
        let from_idx = self.add_module(from);
        let to_idx = self.add_module(to);

        if from_idx == to_idx {
            return Ok(EdgeOutcome::SelfLoop);
        }
        if self.adjacency[from_idx].contains(&to_idx) {
            return Ok(EdgeOutcome::Duplicate);
        }

        // The new edge closes a cycle iff `to` already reaches `from`
        if self.reaches(to_idx, from_idx) {
            if self.policy.tolerates(from, to) {
                log::debug!("Dropping cycle-closing test fixtures edge {} -> {}", from, to);
                return Ok(EdgeOutcome::DroppedCycle);
            }
            return Err(Error::DependencyCycle {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        self.adjacency[from_idx].push(to_idx);
        Ok(EdgeOutcome::Added)
    }

    /// Iterative DFS reachability
    fn reaches(&self, start: usize, target: usize) -> bool {
        let mut visited = vec![false; self.modules.len()];
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if node == target {
                return true;
            }
            if std::mem::replace(&mut visited[node], true) {
                continue;
            }
            stack.extend(self.adjacency[node].iter().copied().filter(|&n| !visited[n]));
        }
        false
    }

    /// Get the number of modules in the graph
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Get the number of dependencies (edges) in the graph
    pub fn dependency_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Check if a module exists in the graph
    pub fn has_module(&self, module: &str) -> bool {
        self.index.contains_key(module)
    }

    pub fn has_dependency(&self, from: &str, to: &str) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&f), Some(&t)) => self.adjacency[f].contains(&t),
            _ => false,
        }
    }

    /// Modules in insertion order
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// Successor lists by vertex index
    pub fn adjacency(&self) -> &[Vec<usize>] {
        &self.adjacency
    }

    /// Get all modules that a given module depends on
    pub fn get_dependencies(&self, module: &str) -> Vec<String> {
        self.index
            .get(module)
            .map(|&idx| {
                self.adjacency[idx]
                    .iter()
                    .map(|&dep| self.modules[dep].clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get all modules that depend on a given module
    pub fn get_dependents(&self, module: &str) -> Vec<String> {
        let Some(&target) = self.index.get(module) else {
            return Vec::new();
        };
        self.adjacency
            .iter()
            .enumerate()
            .filter(|(_, deps)| deps.contains(&target))
            .map(|(idx, _)| self.modules[idx].clone())
            .collect()
    }
}

/// Build the graph from each module's declared dependencies.
///
/// Every module becomes a vertex, and so does every dependency target even
/// if it was not analyzed. Fails on the first cycle the policy does not
/// tolerate.
pub fn build_dependency_graph<'a, I, D>(modules: I, policy: CyclePolicy) -> Result<DependencyGraph>
where
    I: IntoIterator<Item = (&'a str, D)>,
    D: IntoIterator<Item = &'a str>,
{
    let mut graph = DependencyGraph::new(policy);
    let mut dropped = 0usize;

    for (module, deps) in modules {
        graph.add_module(module);
        for dep in deps {
            if graph.add_dependency(module, dep)? == EdgeOutcome::DroppedCycle {
                dropped += 1;
            }
        }
    }

    log::debug!(
        "Built dependency graph: {} modules, {} edges, {} tolerated cycle edge(s)",
        graph.module_count(),
        graph.dependency_count(),
        dropped
    );
    Ok(graph)
}
