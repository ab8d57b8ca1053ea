//! Deterministic module health scores.
//!
//! A module's score is an integer sum of independent contributions:
//! structural centrality, its share of the project's Kotlin and Java code,
//! how much of that code is Kotlin, and fixed increments for costly build
//! tooling. Higher scores mean the module is a better refactoring target.

use crate::metrics::{merge_all, subset_total, LanguageStatsMap, LocLanguage};
use crate::modules::{ModuleStats, Tag};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Languages whose lines count toward code share
pub const BRACE_LANGUAGES: [&str; 2] = [LocLanguage::Kotlin.name(), LocLanguage::Java.name()];

/// Fraction of centrality added to the score
pub const CENTRALITY_FACTOR: f64 = 0.25;
/// Code share (percent) above which the share is added to the score
pub const CODE_SHARE_THRESHOLD: f64 = 10.0;
/// Kotlin percentage is divided by this before being added
pub const KOTLIN_PERCENT_DIVISOR: f64 = 10.0;

pub const KAPT_WITH_DAGGER_COMPILER: i64 = 5;
pub const KAPT_WITHOUT_DAGGER_COMPILER: i64 = 10;
pub const KSP: i64 = 2;
pub const KAPT_AND_KSP: i64 = 10;
pub const ANDROID: i64 = 5;
pub const ANDROID_RESOURCES: i64 = 1;
pub const ANDROID_VARIANTS: i64 = 10;

/// The inputs that produced a score, kept for reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreWeights {
    pub percent_of_total_code: f64,
    /// Share of the module's Kotlin and Java lines that are Kotlin
    #[serde(alias = "ratioMetric")]
    pub kotlin_percent: f64,
    pub centrality: f64,
    /// Kotlin and Java lines in hand-written sources
    pub loc: u64,
    /// Kotlin and Java lines in generated sources
    pub loc_generated: u64,
    pub tags: BTreeSet<String>,
    pub module_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleScore {
    #[serde(rename = "moduleName")]
    pub module_path: String,
    pub score: i64,
    pub weights: ScoreWeights,
    pub includes_generated: bool,
}

/// Modules ranked by descending score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub scores: Vec<ModuleScore>,
}

impl AggregateReport {
    pub fn top(&self, n: usize) -> &[ModuleScore] {
        &self.scores[..n.min(self.scores.len())]
    }
}

/// `100 * part / whole`, or 0 when either side is 0
fn percent(part: u64, whole: u64) -> f64 {
    if part == 0 || whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

/// Score from the individual weights (pure function)
pub fn calculate_score(
    percent_of_total_code: f64,
    kotlin_percent: f64,
    centrality: f64,
    tags: &BTreeSet<String>,
) -> i64 {
    let has = |tag: &str| tags.contains(tag);
    let mut score = 0i64;

    score += (centrality * CENTRALITY_FACTOR).floor() as i64;

    if percent_of_total_code > CODE_SHARE_THRESHOLD {
        score += percent_of_total_code.floor() as i64;
    }

    score += (kotlin_percent / KOTLIN_PERCENT_DIVISOR).floor() as i64;

    if has(Tag::KAPT) {
        score += if has(Tag::DAGGER_COMPILER) {
            KAPT_WITH_DAGGER_COMPILER
        } else {
            KAPT_WITHOUT_DAGGER_COMPILER
        };
    }
    if has(Tag::KSP) {
        score += KSP;
    }
    if has(Tag::KAPT) && has(Tag::KSP) {
        score += KAPT_AND_KSP;
    }
    if has(Tag::ANDROID) {
        score += ANDROID;
    }
    if has(Tag::ANDROID_RESOURCES) {
        score += ANDROID_RESOURCES;
    }
    if has(Tag::ANDROID_VARIANTS) {
        score += ANDROID_VARIANTS;
    }

    score
}

/// Scores modules against a project-wide total
#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine {
    include_generated: bool,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ScoringEngine {
    /// `include_generated` decides whether generated sources count toward a module's size
    pub fn new(include_generated: bool) -> Self {
        Self { include_generated }
    }

    fn module_total(&self, stats: &ModuleStats) -> LanguageStatsMap {
        if self.include_generated {
            stats.total_source()
        } else {
            stats.source.clone()
        }
    }

    /// Sum of every module's counted sources
    pub fn global_total(&self, modules: &[ModuleStats]) -> LanguageStatsMap {
        let totals: Vec<LanguageStatsMap> = modules.iter().map(|m| self.module_total(m)).collect();
        merge_all(&totals)
    }

    pub fn score_module(
        &self,
        stats: &ModuleStats,
        centrality: f64,
        global: &LanguageStatsMap,
    ) -> ModuleScore {
        let module_total = self.module_total(stats);
        let module_code = subset_total(&module_total, &BRACE_LANGUAGES).total();
        let global_code = subset_total(global, &BRACE_LANGUAGES).total();
        let kotlin = subset_total(&module_total, &[LocLanguage::Kotlin.name()]).total();

        let percent_of_total_code = percent(module_code, global_code);
        let kotlin_percent = percent(kotlin, module_code);
        let score = calculate_score(percent_of_total_code, kotlin_percent, centrality, &stats.tags);

        ModuleScore {
            module_path: stats.module_path.clone(),
            score,
            weights: ScoreWeights {
                percent_of_total_code,
                kotlin_percent,
                centrality,
                loc: subset_total(&stats.source, &BRACE_LANGUAGES).total(),
                loc_generated: subset_total(&stats.generated, &BRACE_LANGUAGES).total(),
                tags: stats.tags.clone(),
                module_path: stats.module_path.clone(),
            },
            includes_generated: self.include_generated,
        }
    }

    /// Score every module and sort descending. Equal scores keep input order.
    pub fn rank_modules(
        &self,
        modules: &[ModuleStats],
        centrality: &BTreeMap<String, f64>,
    ) -> AggregateReport {
        let global = self.global_total(modules);
        let mut scores: Vec<ModuleScore> = modules
            .iter()
            .map(|stats| {
                let c = centrality.get(&stats.module_path).copied().unwrap_or(0.0);
                self.score_module(stats, c, &global)
            })
            .collect();

        // Vec::sort_by_key is stable
        scores.sort_by_key(|s| std::cmp::Reverse(s.score));
        AggregateReport { scores }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::LanguageStats;

    fn tags(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn module(path: &str, kotlin: u64, java: u64, tag_values: &[&str]) -> ModuleStats {
        let mut source = LanguageStatsMap::new();
        if kotlin > 0 {
            source.insert("Kotlin".into(), LanguageStats::new(1, kotlin, 0, 0));
        }
        if java > 0 {
            source.insert("Java".into(), LanguageStats::new(1, java, 0, 0));
        }
        ModuleStats {
            module_path: path.into(),
            source,
            tags: tags(tag_values),
            ..ModuleStats::default()
        }
    }

    #[test]
    fn test_empty_module_scores_zero() {
        assert_eq!(calculate_score(0.0, 0.0, 0.0, &BTreeSet::new()), 0);
        let engine = ScoringEngine::default();
        let empty = module(":empty", 0, 0, &[]);
        let score = engine.score_module(&empty, 0.0, &LanguageStatsMap::new());
        assert_eq!(score.score, 0);
        assert_eq!(score.weights.percent_of_total_code, 0.0);
        assert_eq!(score.weights.kotlin_percent, 0.0);
    }

    #[test]
    fn test_tooling_increments() {
        let base = calculate_score(5.0, 40.0, 8.0, &BTreeSet::new());
        let bump = |t: &[&str]| calculate_score(5.0, 40.0, 8.0, &tags(t)) - base;

        assert_eq!(bump(&[Tag::KAPT, Tag::DAGGER_COMPILER]), 5);
        assert_eq!(bump(&[Tag::KAPT]), 10);
        assert_eq!(bump(&[Tag::KSP]), 2);
        assert_eq!(bump(&[Tag::KAPT, Tag::KSP]), 10 + 2 + 10);
        assert_eq!(bump(&[Tag::KAPT, Tag::KSP, Tag::DAGGER_COMPILER]), 5 + 2 + 10);
        assert_eq!(bump(&[Tag::ANDROID]), 5);
        assert_eq!(bump(&[Tag::ANDROID_RESOURCES]), 1);
        assert_eq!(bump(&[Tag::ANDROID_VARIANTS]), 10);
    }

    #[test]
    fn test_code_share_threshold() {
        assert_eq!(calculate_score(10.0, 0.0, 0.0, &BTreeSet::new()), 0);
        assert_eq!(calculate_score(10.5, 0.0, 0.0, &BTreeSet::new()), 10);
    }

    #[test]
    fn test_centrality_and_kotlin_floor() {
        assert_eq!(calculate_score(0.0, 0.0, 7.9, &BTreeSet::new()), 1);
        assert_eq!(calculate_score(0.0, 99.9, 0.0, &BTreeSet::new()), 9);
    }

    #[test]
    fn test_percentages_use_kotlin_and_java_only() {
        let mut big = module(":big", 75, 25, &[]);
        big.source.insert("XML".into(), LanguageStats::new(1, 1000, 0, 0));
        let small = module(":small", 100, 0, &[]);
        let engine = ScoringEngine::default();
        let global = engine.global_total(&[big.clone(), small]);

        let score = engine.score_module(&big, 0.0, &global);
        assert_eq!(score.weights.percent_of_total_code, 50.0);
        assert_eq!(score.weights.kotlin_percent, 75.0);
        assert_eq!(score.weights.loc, 100);
        // 50 (share) + 7 (kotlin)
        assert_eq!(score.score, 57);
    }

    #[test]
    fn test_generated_sources_toggle() {
        let mut stats = module(":gen", 10, 0, &[]);
        stats.generated.insert("Java".into(), LanguageStats::new(1, 30, 0, 0));

        let with = ScoringEngine::new(true).score_module(&stats, 0.0, &stats.total_source());
        assert_eq!(with.weights.kotlin_percent, 25.0);
        assert_eq!(with.weights.loc_generated, 30);
        assert!(with.includes_generated);

        let without = ScoringEngine::new(false).score_module(&stats, 0.0, &stats.source);
        assert_eq!(without.weights.kotlin_percent, 100.0);
        assert!(!without.includes_generated);
    }

    #[test]
    fn test_rank_is_stable_descending() {
        let modules = vec![
            module(":a", 10, 0, &[]),
            module(":b", 10, 0, &[Tag::ANDROID]),
            module(":c", 10, 0, &[]),
            module(":d", 10, 0, &[Tag::ANDROID]),
        ];
        let report = ScoringEngine::default().rank_modules(&modules, &BTreeMap::new());
        let order: Vec<_> = report.scores.iter().map(|s| s.module_path.as_str()).collect();
        assert_eq!(order, vec![":b", ":d", ":a", ":c"]);
    }

    #[test]
    fn test_aggregate_field_names() {
        let modules = [module(":a", 1, 0, &[])];
        let report = ScoringEngine::default().rank_modules(&modules, &BTreeMap::new());
        let json = serde_json::to_value(&report).unwrap();
        let entry = &json["scores"][0];
        assert_eq!(entry["moduleName"], ":a");
        assert!(entry.get("includesGenerated").is_some());
        assert!(entry["weights"].get("percentOfTotalCode").is_some());
        assert!(entry["weights"].get("locGenerated").is_some());
    }
}
