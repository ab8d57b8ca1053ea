//! Per-language line counts and their merge operation.
//!
//! [`LanguageStats`] forms a commutative monoid under [`LanguageStats::merge`]
//! with [`LanguageStats::EMPTY`] as identity, so per-file results can be
//! folded in any order and per-module maps can be combined into a global
//! total with [`merge_all`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Line counts for one language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LanguageStats {
    /// Number of files that contributed to these counts
    pub files: u64,
    pub code: u64,
    pub comment: u64,
    pub blank: u64,
}

impl LanguageStats {
    pub const EMPTY: LanguageStats = LanguageStats {
        files: 0,
        code: 0,
        comment: 0,
        blank: 0,
    };

    pub const fn new(files: u64, code: u64, comment: u64, blank: u64) -> Self {
        Self {
            files,
            code,
            comment,
            blank,
        }
    }

    /// `code + comment + blank`
    pub const fn total(&self) -> u64 {
        self.code + self.comment + self.blank
    }

    /// Field-wise sum
    #[must_use]
    pub const fn merge(self, other: LanguageStats) -> LanguageStats {
        LanguageStats {
            files: self.files + other.files,
            code: self.code + other.code,
            comment: self.comment + other.comment,
            blank: self.blank + other.blank,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }
}

impl Add for LanguageStats {
    type Output = LanguageStats;

    fn add(self, rhs: LanguageStats) -> LanguageStats {
        self.merge(rhs)
    }
}

impl AddAssign for LanguageStats {
    fn add_assign(&mut self, rhs: LanguageStats) {
        *self = self.merge(rhs);
    }
}

impl Sum for LanguageStats {
    fn sum<I: Iterator<Item = LanguageStats>>(iter: I) -> Self {
        iter.fold(LanguageStats::EMPTY, LanguageStats::merge)
    }
}

impl<'a> Sum<&'a LanguageStats> for LanguageStats {
    fn sum<I: Iterator<Item = &'a LanguageStats>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Language name to stats. Ordered so serialized reports are stable.
pub type LanguageStatsMap = BTreeMap<String, LanguageStats>;

/// Union of keys, with colliding entries folded through `merge`
pub fn merge_all<'a, I>(maps: I) -> LanguageStatsMap
where
    I: IntoIterator<Item = &'a LanguageStatsMap>,
{
    maps.into_iter()
        .flat_map(|map| map.iter())
        .fold(LanguageStatsMap::new(), |mut acc, (language, stats)| {
            *acc.entry(language.clone()).or_default() += *stats;
            acc
        })
}

/// Merge two maps without consuming either
pub fn merge_maps(a: &LanguageStatsMap, b: &LanguageStatsMap) -> LanguageStatsMap {
    merge_all([a, b])
}

/// Sum the stats of the named languages, ignoring languages not present
pub fn subset_total(map: &LanguageStatsMap, languages: &[&str]) -> LanguageStats {
    languages.iter().filter_map(|name| map.get(*name)).sum()
}
