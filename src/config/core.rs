use serde::{Deserialize, Serialize};

use super::parallel::ParallelConfig;
use crate::graph::CyclePolicy;
use crate::metrics::default_extensions;

/// Root configuration structure for modscore
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModscoreConfig {
    /// Where module sources live and which files are counted
    pub scan: ScanConfig,

    /// Cycle exception policy for the dependency graph
    pub graph: CyclePolicy,

    pub scoring: ScoringConfig,

    /// Unused feature handling
    pub features: FeaturesConfig,

    pub parallel: ParallelConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Hand-written sources root, relative to the module directory
    pub source_dir: String,
    /// Generated sources root, relative to the module directory
    pub generated_dir: String,
    /// File extensions counted by the scanner
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            source_dir: "src".to_string(),
            generated_dir: "build/generated".to_string(),
            extensions: default_extensions(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Count generated sources toward module size
    pub include_generated: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            include_generated: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Fail the run when any module enables an unused feature
    pub fail_on_unused: bool,
    /// Rewrite build files in place instead of emitting `.fixed` copies
    pub auto_fix: bool,
}
