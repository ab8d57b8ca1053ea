//! Removes unused feature declarations from build-file text.
//!
//! Each removal pattern of each feature is deleted everywhere it matches.
//! Deleting a declaration can leave its enclosing block empty, and removing
//! that block can empty its parent, so empty named blocks are collapsed
//! repeatedly until none remain.

use crate::features::catalog::Feature;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// `identifier { }` with any whitespace inside
static EMPTY_NAMED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*\s*\{\s*\}").unwrap());

/// Result of rewriting one build file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixOutcome {
    pub text: String,
    /// Whether `text` differs from the input
    pub changed: bool,
    /// Features whose declarations were removed by pattern
    pub fixed: Vec<String>,
    /// Features reported unused that have no removal pattern
    pub unfixable: Vec<String>,
}

impl FixOutcome {
    /// False when any feature slated for removal could not be rewritten
    pub fn fully_fixed(&self) -> bool {
        self.unfixable.is_empty()
    }
}

/// Delete the removal patterns of `features` from `text`, then collapse empty blocks
pub fn rewrite_config<'f, I>(text: &str, features: I) -> FixOutcome
where
    I: IntoIterator<Item = &'f Feature>,
{
    let mut rewritten = text.to_string();
    let mut fixed = Vec::new();
    let mut unfixable = Vec::new();

    for feature in features {
        match feature.removal_patterns.as_deref() {
            Some(patterns) if !patterns.is_empty() => {
                for pattern in patterns {
                    rewritten = pattern.regex().replace_all(&rewritten, "").into_owned();
                }
                fixed.push(feature.name.clone());
            }
            _ => {
                log::debug!("Feature {} has no removal pattern", feature.name);
                unfixable.push(feature.name.clone());
            }
        }
    }

    let rewritten = collapse_empty_blocks(&rewritten);
    let changed = rewritten != text;

    FixOutcome {
        text: rewritten,
        changed,
        fixed,
        unfixable,
    }
}

/// Delete empty named blocks until a pass finds none
pub fn collapse_empty_blocks(text: &str) -> String {
    let mut current = text.to_string();
    while EMPTY_NAMED_BLOCK.is_match(&current) {
        current = EMPTY_NAMED_BLOCK.replace_all(&current, "").into_owned();
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureCatalog;
    use indoc::indoc;

    fn features(names: &[&str]) -> Vec<Feature> {
        let catalog = FeatureCatalog::builtin();
        names
            .iter()
            .map(|name| catalog.get(name).cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_nested_blocks_collapse_to_nothing() {
        let outcome = rewrite_config("foundry { features { compose() } }", &features(&["compose"]));
        assert_eq!(outcome.text, "");
        assert!(outcome.changed);
        assert!(outcome.fully_fixed());
        assert_eq!(outcome.fixed, vec!["compose"]);
    }

    #[test]
    fn test_sibling_declarations_survive() {
        let input = indoc! {"
            foundry {
              features {
                compose()
                dagger()
              }
            }
        "};
        let outcome = rewrite_config(input, &features(&["compose"]));
        assert!(outcome.text.contains("dagger()"));
        assert!(!outcome.text.contains("compose()"));
        assert!(outcome.text.contains("features {"));
    }

    #[test]
    fn test_multiline_blocks_collapse() {
        let input = indoc! {"
            plugins {
              id(\"foundry.base\")
            }

            foundry {
              features {
                compose()
              }
              android {
                features {
                  androidTest()
                }
              }
            }
        "};
        let outcome = rewrite_config(input, &features(&["compose", "android-test"]));
        assert!(!outcome.text.contains("foundry {"));
        assert!(!outcome.text.contains("android {"));
        assert!(outcome.text.contains("id(\"foundry.base\")"));
    }

    #[test]
    fn test_unfixable_feature_is_reported() {
        let input = "foundry { features { compose() } }\nrobolectric = true\n";
        let outcome = rewrite_config(input, &features(&["compose", "robolectric"]));
        assert!(outcome.changed);
        assert!(!outcome.fully_fixed());
        assert_eq!(outcome.unfixable, vec!["robolectric"]);
        assert!(outcome.text.contains("robolectric = true"));
    }

    #[test]
    fn test_no_match_is_unchanged() {
        let input = "foundry { features { dagger() } }";
        let outcome = rewrite_config(input, &features(&["compose"]));
        assert!(!outcome.changed);
        assert_eq!(outcome.text, input);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let input = "foundry {\n  features {\n    compose()\n    dagger()\n  }\n}\n";
        let once = rewrite_config(input, &features(&["compose"]));
        let twice = rewrite_config(&once.text, &features(&["compose"]));
        assert_eq!(once.text, twice.text);
        assert!(!twice.changed);
    }
}
