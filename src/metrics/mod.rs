//! Line-count metrics
//!
//! Classifies source lines, merges per-language counts and walks module
//! source trees.

pub mod language_stats;
pub mod loc_counter;
pub mod source_scanner;

pub use language_stats::{merge_all, merge_maps, subset_total, LanguageStats, LanguageStatsMap};
pub use loc_counter::{CommentSyntax, LineType, LocCounter, LocLanguage};
pub use source_scanner::{default_extensions, ModuleSourceReport, SourceTreeScanner};
