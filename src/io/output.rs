//! JSON artifacts and terminal rendering.
//!
//! Layout under the output directory:
//!
//! ```text
//! <out>/aggregate.json
//! <out>/<module>/loc.json
//! <out>/<module>/topography.json
//! <out>/<module>/stats.json
//! <out>/<module>/features.json
//! <out>/<module>/build-file.fixed     only when a rewrite changed the text
//! ```

use crate::errors::{Error, Result};
use crate::pipeline::{AnalysisOutput, ModuleAnalysis};
use crate::scoring::AggregateReport;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const AGGREGATE_FILE: &str = "aggregate.json";
pub const LOC_FILE: &str = "loc.json";
pub const TOPOGRAPHY_FILE: &str = "topography.json";
pub const STATS_FILE: &str = "stats.json";
pub const FEATURES_FILE: &str = "features.json";
pub const FIXED_BUILD_FILE: &str = "build-file.fixed";

/// Directory name for a module path: `:libraries:foo` becomes `libraries_foo`.
///
/// `_` only ever stands for a path separator. Literal `_` and `%` are
/// percent-escaped and the root project `:` is `%3A`, so distinct module
/// paths never share a directory.
pub fn module_dir_name(module_path: &str) -> String {
    let trimmed = module_path.strip_prefix(':').unwrap_or(module_path);
    if trimmed.is_empty() {
        return "%3A".to_string();
    }

    let mut name = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        match c {
            ':' => name.push('_'),
            '_' => name.push_str("%5F"),
            '%' => name.push_str("%25"),
            c => name.push(c),
        }
    }
    name
}

/// What happened to a module's rewritten build file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixAction {
    /// Nothing to write
    Unchanged,
    /// The build file itself was overwritten
    InPlace(PathBuf),
    /// The rewritten text was written next to the other artifacts
    Emitted(PathBuf),
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| Error::io_at(e, path))
}

fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::io_at(e, path))
}

/// Writes artifacts for one run
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    out_dir: PathBuf,
    auto_fix: bool,
}

impl ArtifactWriter {
    /// `auto_fix` overwrites build files instead of emitting `.fixed` copies
    pub fn new(out_dir: impl Into<PathBuf>, auto_fix: bool) -> Self {
        Self {
            out_dir: out_dir.into(),
            auto_fix,
        }
    }

    pub fn module_dir(&self, module_path: &str) -> PathBuf {
        self.out_dir.join(module_dir_name(module_path))
    }

    /// Write every module's artifacts and the aggregate report
    pub fn write_all(&self, output: &AnalysisOutput) -> Result<Vec<FixAction>> {
        ensure_dir(&self.out_dir)?;
        let actions = output
            .modules
            .iter()
            .map(|module| self.write_module(module))
            .collect::<Result<Vec<_>>>()?;
        self.write_aggregate(&output.aggregate)?;
        Ok(actions)
    }

    pub fn write_aggregate(&self, report: &AggregateReport) -> Result<()> {
        write_json(&self.out_dir.join(AGGREGATE_FILE), report)
    }

    pub fn write_module(&self, module: &ModuleAnalysis) -> Result<FixAction> {
        let dir = self.module_dir(module.module_path());
        ensure_dir(&dir)?;

        write_json(&dir.join(LOC_FILE), &module.loc)?;
        write_json(&dir.join(TOPOGRAPHY_FILE), &module.topography)?;
        write_json(&dir.join(STATS_FILE), &module.stats)?;
        write_json(&dir.join(FEATURES_FILE), &module.feature_report)?;

        self.apply_fix(module, &dir)
    }

    fn apply_fix(&self, module: &ModuleAnalysis, dir: &Path) -> Result<FixAction> {
        let Some(fix) = module.fix.as_ref().filter(|fix| fix.changed) else {
            return Ok(FixAction::Unchanged);
        };

        match module.input.build_file_path() {
            Some(build_file) if self.auto_fix => {
                fs::write(&build_file, &fix.text).map_err(|e| Error::io_at(e, &build_file))?;
                log::info!("Rewrote {}", build_file.display());
                Ok(FixAction::InPlace(build_file))
            }
            _ => {
                let path = dir.join(FIXED_BUILD_FILE);
                fs::write(&path, &fix.text).map_err(|e| Error::io_at(e, &path))?;
                Ok(FixAction::Emitted(path))
            }
        }
    }
}

/// The highest-ranked modules as a table
pub fn render_score_table(report: &AggregateReport, top: usize) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Module", "Score", "Code %", "Kotlin %", "Centrality", "Tags"]);

    for (rank, score) in report.top(top).iter().enumerate() {
        let w = &score.weights;
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&score.module_path),
            Cell::new(score.score),
            Cell::new(format!("{:.1}", w.percent_of_total_code)),
            Cell::new(format!("{:.1}", w.kotlin_percent)),
            Cell::new(format!("{:.2}", w.centrality)),
            Cell::new(w.tags.iter().cloned().collect::<Vec<_>>().join(", ")),
        ]);
    }
    table.to_string()
}

/// Colored unused-feature warnings for every module that has any
pub fn render_feature_warnings(output: &AnalysisOutput) -> String {
    let mut out = String::new();
    for module in &output.modules {
        out.push_str(&module.feature_report.render());
    }
    if !output.fully_fixable() {
        out.push_str(&format!(
            "{} not all issues could be auto-fixed\n",
            "warning:".yellow().bold()
        ));
    }
    out
}
