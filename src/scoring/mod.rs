//! Module scoring and ranking.

pub mod module_scorer;

pub use module_scorer::{calculate_score, AggregateReport, ModuleScore, ScoreWeights, ScoringEngine};
