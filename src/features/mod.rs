//! Optional build features: the catalog, usage detection and auto-fix.

pub mod catalog;
pub mod detector;
pub mod overrides;
pub mod rewriter;

pub use catalog::{Feature, FeatureCatalog, FeatureDefinition, RemovalPattern, BUILTIN_FEATURES};
pub use detector::{
    check_feature, FeatureDetector, FeatureReport, FeatureReportEntry, MissingEvidence,
    UnusedFeature,
};
pub use overrides::{load_catalog, CatalogOverrides, FeatureAddition, FeatureOverride};
pub use rewriter::{collapse_empty_blocks, rewrite_config, FixOutcome};
