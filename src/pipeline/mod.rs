//! Analysis pipeline.
//!
//! Modules are scanned and validated in parallel on a bounded rayon pool.
//! Collecting the ordered results is the barrier: the dependency graph,
//! centrality and scores are computed only once every module is done.

pub mod module_stage;

pub use module_stage::{analyze_module, ModuleAnalysis, ModuleContext};

use crate::config::ModscoreConfig;
use crate::errors::{Error, Result};
use crate::features::FeatureCatalog;
use crate::graph::{build_dependency_graph, compute_betweenness_centrality, DependencyGraph};
use crate::modules::{ModuleStats, ProjectManifest};
use crate::scoring::{AggregateReport, ScoringEngine};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{info, info_span};

/// Result of a full analysis run
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    /// Per-module results in manifest order
    pub modules: Vec<ModuleAnalysis>,
    pub graph: DependencyGraph,
    pub centrality: BTreeMap<String, f64>,
    pub aggregate: AggregateReport,
}

impl AnalysisOutput {
    pub fn unused_feature_count(&self) -> usize {
        self.modules
            .iter()
            .map(|m| m.feature_report.features_to_remove.len())
            .sum()
    }

    /// False when any module has an unused feature without a removal pattern
    pub fn fully_fixable(&self) -> bool {
        self.modules
            .iter()
            .filter_map(|m| m.fix.as_ref())
            .all(|fix| fix.fully_fixed())
    }

    /// Fail with the first module that has unused features, when the policy asks for it
    pub fn enforce_feature_policy(&self, fail_on_unused: bool) -> Result<()> {
        self.modules
            .iter()
            .try_for_each(|m| m.feature_report.enforce(fail_on_unused))
    }
}

fn build_pool(threads: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("modscore-worker-{}", i))
        .build()
        .map_err(|e| Error::Configuration(format!("failed to build thread pool: {}", e)))
}

/// Run every stage over the manifest's modules
pub fn run_analysis(
    manifest: &ProjectManifest,
    catalog: &FeatureCatalog,
    config: &ModscoreConfig,
) -> Result<AnalysisOutput> {
    let threads = config.parallel.thread_count();
    let span = info_span!(
        "analysis",
        module_count = manifest.modules.len(),
        threads = threads,
    );
    let _guard = span.enter();

    let pool = build_pool(threads)?;
    let ctx = ModuleContext {
        catalog,
        accessors: &manifest.project_accessors,
        scan: &config.scan,
    };

    let modules: Vec<ModuleAnalysis> = {
        let _span = info_span!("scan").entered();
        pool.install(|| {
            manifest
                .modules
                .par_iter()
                .map(|input| analyze_module(input, ctx))
                .collect()
        })
    };
    info!(modules = modules.len(), "Scanned modules");

    let graph = {
        let _span = info_span!("graph").entered();
        build_dependency_graph(
            modules.iter().map(|m| {
                (
                    m.stats.module_path.as_str(),
                    m.stats.deps.iter().map(String::as_str),
                )
            }),
            config.graph.clone(),
        )?
    };
    info!(
        vertices = graph.module_count(),
        edges = graph.dependency_count(),
        "Built dependency graph"
    );

    let centrality = {
        let _span = info_span!("centrality").entered();
        pool.install(|| compute_betweenness_centrality(&graph))
    };

    let aggregate = {
        let _span = info_span!("scoring").entered();
        let stats: Vec<ModuleStats> = modules.iter().map(|m| m.stats.clone()).collect();
        ScoringEngine::new(config.scoring.include_generated).rank_modules(&stats, &centrality)
    };
    info!(
        top = aggregate.scores.first().map(|s| s.module_path.as_str()).unwrap_or("-"),
        "Scored modules"
    );

    Ok(AnalysisOutput {
        modules,
        graph,
        centrality,
        aggregate,
    })
}
