//! Decides which enabled features a module does not actually use.
//!
//! Only features named in the module's topography are checked. Each
//! configured check that finds no evidence marks the feature unused; one
//! failing check is enough. Features without any configured check are never
//! reported.

use crate::errors::{Error, Result};
use crate::features::catalog::{Feature, FeatureCatalog};
use crate::modules::ModuleTopography;
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory searched for matching text, relative to the module
pub const MATCHING_TEXT_ROOT: &str = "src";

/// Why a feature was judged unused
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "check", rename_all = "camelCase")]
pub enum MissingEvidence {
    /// `matching_sources_dir` has no files
    EmptySourcesDir { dir: String },
    /// `generated_sources_dir` has no files
    EmptyGeneratedDir { dir: String },
    /// No source line contains any matching token
    NoMatchingText,
}

impl std::fmt::Display for MissingEvidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySourcesDir { dir } => write!(f, "no files in {}", dir),
            Self::EmptyGeneratedDir { dir } => write!(f, "no generated files in {}", dir),
            Self::NoMatchingText => write!(f, "no matching source text"),
        }
    }
}

/// A feature slated for removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedFeature {
    pub feature: Feature,
    pub missing: Vec<MissingEvidence>,
}

/// Evidence checks against a module directory
#[derive(Debug, Clone, Copy)]
pub struct FeatureDetector<'a> {
    catalog: &'a FeatureCatalog,
}

impl<'a> FeatureDetector<'a> {
    pub fn new(catalog: &'a FeatureCatalog) -> Self {
        Self { catalog }
    }

    /// Enabled features of `topography` that have no evidence of use under `project_dir`.
    ///
    /// Results follow catalog order. Enabled names the catalog does not know
    /// are ignored.
    pub fn unused_features(
        &self,
        project_dir: &Path,
        topography: &ModuleTopography,
    ) -> Vec<UnusedFeature> {
        self.catalog
            .iter()
            .filter(|feature| topography.features.contains(&feature.name))
            .filter_map(|feature| {
                let missing = check_feature(feature, project_dir);
                if missing.is_empty() {
                    None
                } else {
                    log::debug!(
                        "{}: feature {} unused ({} failing check(s))",
                        topography.gradle_path,
                        feature.name,
                        missing.len()
                    );
                    Some(UnusedFeature {
                        feature: feature.clone(),
                        missing,
                    })
                }
            })
            .collect()
    }
}

/// Run every configured check for `feature`, returning the ones that failed
pub fn check_feature(feature: &Feature, project_dir: &Path) -> Vec<MissingEvidence> {
    let mut missing = Vec::new();

    if let Some(dir) = &feature.matching_sources_dir {
        if !has_files(&project_dir.join(dir), &BTreeSet::new()) {
            missing.push(MissingEvidence::EmptySourcesDir { dir: dir.clone() });
        }
    }

    if let Some(dir) = &feature.generated_sources_dir {
        if !has_files(&project_dir.join(dir), &feature.generated_sources_extensions) {
            missing.push(MissingEvidence::EmptyGeneratedDir { dir: dir.clone() });
        }
    }

    if !feature.matching_text.is_empty()
        && !any_line_matches(
            &project_dir.join(MATCHING_TEXT_ROOT),
            &feature.matching_text,
            &feature.matching_text_file_extensions,
        )
    {
        missing.push(MissingEvidence::NoMatchingText);
    }

    missing
}

fn has_extension(path: &Path, extensions: &BTreeSet<String>) -> bool {
    extensions.is_empty()
        || path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.contains(ext))
}

fn files_under<'e>(
    root: &Path,
    extensions: &'e BTreeSet<String>,
) -> impl Iterator<Item = PathBuf> + 'e {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(move |path| has_extension(path, extensions))
}

/// Whether `dir` contains at least one file (recursively)
fn has_files(dir: &Path, extensions: &BTreeSet<String>) -> bool {
    dir.is_dir() && files_under(dir, extensions).next().is_some()
}

/// Whether any line of any file under `root` contains any of `tokens`.
/// Stops at the first match.
fn any_line_matches(root: &Path, tokens: &BTreeSet<String>, extensions: &BTreeSet<String>) -> bool {
    if !root.is_dir() {
        return false;
    }
    files_under(root, extensions).any(|path| file_contains_any(&path, tokens))
}

/// Lines are decoded lossily so a stray non-UTF-8 byte never hides later lines
fn file_contains_any(path: &Path, tokens: &BTreeSet<String>) -> bool {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            log::warn!("Skipping unreadable file {}: {}", path.display(), e);
            return false;
        }
    };

    BufReader::new(file)
        .split(b'\n')
        .map_while(|line| match line {
            Ok(line) => Some(line),
            Err(e) => {
                log::warn!("Stopped reading {}: {}", path.display(), e);
                None
            }
        })
        .any(|line| {
            let line = String::from_utf8_lossy(&line);
            tokens.iter().any(|token| line.contains(token.as_str()))
        })
}

/// One entry of the human-readable removal report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureReportEntry {
    pub name: String,
    pub explanation: String,
    pub advice: String,
    pub auto_fixable: bool,
    pub missing: Vec<MissingEvidence>,
}

/// Features to remove from one module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureReport {
    pub module: String,
    pub features_to_remove: Vec<FeatureReportEntry>,
}

impl FeatureReport {
    pub fn new(module: impl Into<String>, unused: &[UnusedFeature]) -> Self {
        Self {
            module: module.into(),
            features_to_remove: unused
                .iter()
                .map(|u| FeatureReportEntry {
                    name: u.feature.name.clone(),
                    explanation: u.feature.explanation.clone(),
                    advice: u.feature.advice.clone(),
                    auto_fixable: u.feature.is_auto_fixable(),
                    missing: u.missing.clone(),
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features_to_remove.is_empty()
    }

    /// Name, explanation and advice for every feature, one block each
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.is_empty() {
            return out;
        }
        let _ = writeln!(
            out,
            "{} {} unused feature(s) in {}",
            "warning:".yellow().bold(),
            self.features_to_remove.len(),
            self.module.bold()
        );
        for entry in &self.features_to_remove {
            let reasons = entry
                .missing
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "  - {} ({})", entry.name.bold(), reasons);
            let _ = writeln!(out, "    {}", entry.explanation);
            let _ = writeln!(out, "    {} {}", "advice:".cyan(), entry.advice);
        }
        out
    }

    /// Apply the run policy: report only, or fail when anything is unused
    pub fn enforce(&self, fail_on_unused: bool) -> Result<()> {
        if fail_on_unused && !self.is_empty() {
            return Err(Error::UnusedFeatures {
                module: self.module.clone(),
                count: self.features_to_remove.len(),
            });
        }
        Ok(())
    }
}
