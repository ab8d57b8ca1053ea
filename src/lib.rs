//! Module health scoring for large multi-module Kotlin/Java build trees.
//!
//! For every module the crate counts source lines by language, checks
//! which enabled build features are actually used, and rewrites build files
//! to drop the unused ones. Across modules it builds the dependency graph,
//! computes betweenness centrality and ranks modules by a combined score.

pub mod cli;
pub mod config;
pub mod errors;
pub mod features;
pub mod graph;
pub mod io;
pub mod metrics;
pub mod modules;
pub mod pipeline;
pub mod scoring;

pub use crate::errors::{Error, Result};
pub use crate::features::{FeatureCatalog, FeatureReport, FixOutcome};
pub use crate::graph::{
    build_dependency_graph, compute_betweenness_centrality, CyclePolicy, DependencyGraph,
};
pub use crate::metrics::{LanguageStats, LanguageStatsMap, LocCounter, SourceTreeScanner};
pub use crate::modules::{ModuleInput, ModuleStats, ModuleTopography, ProjectManifest};
pub use crate::pipeline::{run_analysis, AnalysisOutput};
pub use crate::scoring::{AggregateReport, ModuleScore, ScoringEngine};
