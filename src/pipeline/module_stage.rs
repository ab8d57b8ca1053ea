//! Per-module analysis.
//!
//! Everything here depends only on the module's own directory and build
//! file, so modules can be processed on any worker in any order.

use crate::config::ScanConfig;
use crate::features::{rewrite_config, FeatureCatalog, FeatureDetector, FeatureReport, FixOutcome};
use crate::metrics::{ModuleSourceReport, SourceTreeScanner};
use crate::modules::{
    module_tags, parse_project_dependencies, ModuleInput, ModuleStats, ModuleTopography,
    ProjectAccessors,
};
use std::path::Path;
use tracing::debug_span;

/// Everything computed for one module before the global stage
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleAnalysis {
    pub input: ModuleInput,
    pub loc: ModuleSourceReport,
    pub topography: ModuleTopography,
    pub stats: ModuleStats,
    pub feature_report: FeatureReport,
    /// Rewritten build file; present when any enabled feature is unused
    pub fix: Option<FixOutcome>,
}

impl ModuleAnalysis {
    pub fn module_path(&self) -> &str {
        &self.input.path
    }
}

/// Shared, read-only inputs of the per-module stage
#[derive(Debug, Clone, Copy)]
pub struct ModuleContext<'a> {
    pub catalog: &'a FeatureCatalog,
    pub accessors: &'a ProjectAccessors,
    pub scan: &'a ScanConfig,
}

/// Read the build file, treating a missing one as empty text
fn read_build_file(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return String::new();
    };
    match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("Build file {} not found", path.display());
            String::new()
        }
        Err(e) => {
            log::warn!("Failed to read build file {}: {}", path.display(), e);
            String::new()
        }
    }
}

/// Scan, validate and tag a single module
pub fn analyze_module(input: &ModuleInput, ctx: ModuleContext<'_>) -> ModuleAnalysis {
    let _span = debug_span!("module", path = %input.path).entered();

    let scanner = SourceTreeScanner::new(ctx.scan.extensions.clone());
    let loc = scanner.scan_module(
        &input.project_dir.join(&ctx.scan.source_dir),
        Some(&input.project_dir.join(&ctx.scan.generated_dir)),
    );

    let topography = input.topography();
    let unused = FeatureDetector::new(ctx.catalog).unused_features(&input.project_dir, &topography);
    let feature_report = FeatureReport::new(input.path.clone(), &unused);

    let build_file = read_build_file(input.build_file_path().as_deref());
    let fix = (!unused.is_empty())
        .then(|| rewrite_config(&build_file, unused.iter().map(|u| &u.feature)));

    let mut deps = input.dependencies.clone();
    deps.extend(parse_project_dependencies(&input.path, &build_file, ctx.accessors));
    deps.remove(&input.path);

    let stats = ModuleStats {
        module_path: input.path.clone(),
        source: loc.source.clone(),
        generated: loc.generated.clone(),
        tags: module_tags(&topography, ctx.catalog),
        deps,
    };

    log::debug!(
        "{}: {} language(s), {} dependencies, {} unused feature(s)",
        input.path,
        stats.total_source().len(),
        stats.deps.len(),
        unused.len()
    );

    ModuleAnalysis {
        input: input.clone(),
        loc,
        topography,
        stats,
        feature_report,
        fix,
    }
}
