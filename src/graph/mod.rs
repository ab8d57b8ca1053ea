//! Module dependency graph and centrality metrics.

pub mod centrality;
pub mod dependency_graph;

pub use centrality::{betweenness_by_index, compute_betweenness_centrality};
pub use dependency_graph::{build_dependency_graph, CyclePolicy, DependencyGraph, EdgeOutcome};
