//! Walks a module's source roots and folds per-file line counts by language.

use crate::metrics::language_stats::{merge_all, merge_maps, LanguageStatsMap};
use crate::metrics::loc_counter::LocCounter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Hand-written and generated line counts for one module.
///
/// The two buckets are never merged here. Whether generated code counts
/// toward a module's size is decided at scoring time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSourceReport {
    #[serde(rename = "srcs")]
    pub source: LanguageStatsMap,
    #[serde(rename = "generatedSrcs")]
    pub generated: LanguageStatsMap,
}

impl ModuleSourceReport {
    pub fn total_source(&self) -> LanguageStatsMap {
        merge_maps(&self.source, &self.generated)
    }
}

/// Recursively classifies every recognized file under a root
#[derive(Debug, Clone)]
pub struct SourceTreeScanner {
    extensions: Vec<String>,
}

impl Default for SourceTreeScanner {
    fn default() -> Self {
        Self::new(default_extensions())
    }
}

pub fn default_extensions() -> Vec<String> {
    ["kt", "kts", "java", "xml"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl SourceTreeScanner {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    /// Scan both roots into separate buckets. A missing root yields an empty map.
    pub fn scan_module(
        &self,
        source_root: &Path,
        generated_root: Option<&Path>,
    ) -> ModuleSourceReport {
        ModuleSourceReport {
            source: self.scan(source_root),
            generated: generated_root.map(|root| self.scan(root)).unwrap_or_default(),
        }
    }

    /// Count every eligible file under `root`, keyed by language name.
    ///
    /// Unreadable files are logged and skipped; they never fail the scan.
    pub fn scan(&self, root: &Path) -> LanguageStatsMap {
        self.count_files(self.eligible_files(root))
    }

    /// Count the given files, skipping any that cannot be read
    pub fn count_files(&self, paths: impl IntoIterator<Item = PathBuf>) -> LanguageStatsMap {
        let per_file: Vec<LanguageStatsMap> = paths
            .into_iter()
            .filter_map(|path| match LocCounter::count_file(&path) {
                Ok(Some((language, stats))) => {
                    Some(LanguageStatsMap::from([(language.name().to_string(), stats)]))
                }
                Ok(None) => None,
                Err(e) => {
                    log::warn!("Skipping unreadable file {}: {}", path.display(), e);
                    None
                }
            })
            .collect();

        merge_all(&per_file)
    }

    /// Files under `root` whose extension is in the configured set
    pub fn eligible_files(&self, root: &Path) -> Vec<PathBuf> {
        if !root.is_dir() {
            log::debug!("Source root {} does not exist", root.display());
            return Vec::new();
        }

        WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.is_eligible(path))
            .collect()
    }

    fn is_eligible(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed == ext))
    }
}
