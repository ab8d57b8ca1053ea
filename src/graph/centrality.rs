//! Betweenness centrality for the module dependency graph.
//!
//! Betweenness measures how often a module lies on shortest dependency
//! paths between other modules:
//!
//! ```text
//! BC(v) = Σ σ_st(v) / σ_st   over ordered pairs s ≠ v ≠ t
//! ```
//!
//! where `σ_st` counts shortest `s -> t` paths and `σ_st(v)` those passing
//! through `v`. Ties split evenly. Values are raw sums, not normalized.
//!
//! Uses Brandes' algorithm: one BFS per source plus a backward dependency
//! accumulation, O(V * E) for unweighted graphs. Sources are processed in
//! parallel and their partial vectors summed in source order.

use crate::graph::dependency_graph::DependencyGraph;
use rayon::prelude::*;
use std::collections::{BTreeMap, VecDeque};

/// Betweenness centrality of every module, 0.0 for modules on no through-path
pub fn compute_betweenness_centrality(graph: &DependencyGraph) -> BTreeMap<String, f64> {
    let scores = betweenness_by_index(graph.adjacency());
    graph
        .modules()
        .iter()
        .cloned()
        .zip(scores)
        .collect()
}

/// Brandes over an adjacency list, one score per vertex index
pub fn betweenness_by_index(adjacency: &[Vec<usize>]) -> Vec<f64> {
    let n = adjacency.len();
    if n == 0 {
        return Vec::new();
    }

    let partials: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|source| single_source_dependencies(adjacency, source))
        .collect();

    partials
        .into_iter()
        .fold(vec![0.0; n], |mut total, partial| {
            for (score, contribution) in total.iter_mut().zip(partial) {
                *score += contribution;
            }
            total
        })
}

/// Dependency of `source` on every other vertex
fn single_source_dependencies(adjacency: &[Vec<usize>], source: usize) -> Vec<f64> {
    let n = adjacency.len();
    let mut order = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut path_counts = vec![0.0_f64; n];
    let mut distance: Vec<Option<usize>> = vec![None; n];

    path_counts[source] = 1.0;
    distance[source] = Some(0);

    let mut queue = VecDeque::from([source]);
    while let Some(v) = queue.pop_front() {
        order.push(v);
        let next = distance[v].map(|d| d + 1);
        for &w in &adjacency[v] {
            if distance[w].is_none() {
                distance[w] = next;
                queue.push_back(w);
            }
            if distance[w] == next {
                path_counts[w] += path_counts[v];
                predecessors[w].push(v);
            }
        }
    }

    // Accumulate from the farthest vertices back toward the source
    let mut dependency = vec![0.0_f64; n];
    while let Some(w) = order.pop() {
        for &v in &predecessors[w] {
            dependency[v] += (path_counts[v] / path_counts[w]) * (1.0 + dependency[w]);
        }
    }
    dependency[source] = 0.0;
    dependency
}
