//! The catalog of optional build features a module can enable.
//!
//! Built-in entries are declared as a plain array of [`FeatureDefinition`]s
//! and compiled into [`Feature`]s once at startup. The catalog can be
//! extended and overridden by name from a JSON document (see
//! [`crate::features::overrides`]).

use crate::errors::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

/// A compiled removal pattern. Compared and serialized by its source text.
#[derive(Debug, Clone)]
pub struct RemovalPattern(Regex);

impl RemovalPattern {
    /// Compile `pattern`, naming `feature` in the error if it is invalid
    pub fn new(feature: &str, pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| Error::Pattern {
                feature: feature.to_string(),
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn regex(&self) -> &Regex {
        &self.0
    }
}

impl PartialEq for RemovalPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for RemovalPattern {}

impl Serialize for RemovalPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// An optional build feature and the evidence that shows a module uses it.
///
/// A feature is only validated when at least one of `matching_sources_dir`,
/// `generated_sources_dir` or `matching_text` is set. `matching_plugin` is
/// informational: it turns the feature name into a module tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub name: String,
    pub explanation: String,
    pub advice: String,
    /// Patterns deleted from the build file when the feature is removed
    pub removal_patterns: Option<Vec<RemovalPattern>>,
    /// Directory (relative to the module) a code generator writes into
    pub generated_sources_dir: Option<String>,
    /// Restricts the generated-output check to these extensions when non-empty
    pub generated_sources_extensions: BTreeSet<String>,
    /// Any of these tokens appearing in a source line counts as usage
    pub matching_text: BTreeSet<String>,
    /// Restricts the text search to these extensions when non-empty
    pub matching_text_file_extensions: BTreeSet<String>,
    /// Directory (relative to the module) that must contain files
    pub matching_sources_dir: Option<String>,
    pub matching_plugin: Option<String>,
}

impl Feature {
    /// Whether any usage check is configured
    pub fn is_validated(&self) -> bool {
        self.matching_sources_dir.is_some()
            || self.generated_sources_dir.is_some()
            || !self.matching_text.is_empty()
    }

    pub fn is_auto_fixable(&self) -> bool {
        self.removal_patterns
            .as_ref()
            .is_some_and(|patterns| !patterns.is_empty())
    }
}

/// Static description of a built-in feature
#[derive(Debug, Clone, Copy)]
pub struct FeatureDefinition {
    pub name: &'static str,
    pub explanation: &'static str,
    pub advice: &'static str,
    pub removal_patterns: &'static [&'static str],
    pub generated_sources_dir: Option<&'static str>,
    pub generated_sources_extensions: &'static [&'static str],
    pub matching_text: &'static [&'static str],
    pub matching_text_file_extensions: &'static [&'static str],
    pub matching_sources_dir: Option<&'static str>,
    pub matching_plugin: Option<&'static str>,
}

impl FeatureDefinition {
    const fn new(name: &'static str, explanation: &'static str, advice: &'static str) -> Self {
        Self {
            name,
            explanation,
            advice,
            removal_patterns: &[],
            generated_sources_dir: None,
            generated_sources_extensions: &[],
            matching_text: &[],
            matching_text_file_extensions: &[],
            matching_sources_dir: None,
            matching_plugin: None,
        }
    }

    pub fn compile(&self) -> Result<Feature> {
        let removal_patterns = if self.removal_patterns.is_empty() {
            None
        } else {
            Some(
                self.removal_patterns
                    .iter()
                    .map(|pattern| RemovalPattern::new(self.name, pattern))
                    .collect::<Result<Vec<_>>>()?,
            )
        };

        Ok(Feature {
            name: self.name.to_string(),
            explanation: self.explanation.to_string(),
            advice: self.advice.to_string(),
            removal_patterns,
            generated_sources_dir: self.generated_sources_dir.map(String::from),
            generated_sources_extensions: to_set(self.generated_sources_extensions),
            matching_text: to_set(self.matching_text),
            matching_text_file_extensions: to_set(self.matching_text_file_extensions),
            matching_sources_dir: self.matching_sources_dir.map(String::from),
            matching_plugin: self.matching_plugin.map(String::from),
        })
    }
}

fn to_set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

const KOTLIN_AND_JAVA: &[&str] = &["kt", "java"];

pub const BUILTIN_FEATURES: &[FeatureDefinition] = &[
    FeatureDefinition {
        removal_patterns: &[r"androidTest\(\)"],
        matching_sources_dir: Some("src/androidTest"),
        ..FeatureDefinition::new(
            "android-test",
            "Instrumentation tests are enabled but src/androidTest contains no files.",
            "Remove androidTest() from the features block.",
        )
    },
    FeatureDefinition {
        removal_patterns: &[r"androidResources\(\)"],
        matching_sources_dir: Some("src/main/res"),
        ..FeatureDefinition::new(
            "android-resources",
            "Android resources are enabled but src/main/res contains no files.",
            "Remove androidResources() from the features block to skip resource processing.",
        )
    },
    FeatureDefinition {
        removal_patterns: &[r"compose\(\)"],
        matching_text: &["@Composable"],
        matching_text_file_extensions: &["kt"],
        ..FeatureDefinition::new(
            "compose",
            "The Compose compiler is enabled but no @Composable functions were found.",
            "Remove compose() from the features block.",
        )
    },
    FeatureDefinition {
        removal_patterns: &[r"dagger\(\)"],
        matching_text: &[
            "@Inject",
            "@Provides",
            "@Binds",
            "@Module",
            "@Component",
            "@ContributesTo",
            "@ContributesBinding",
        ],
        matching_text_file_extensions: KOTLIN_AND_JAVA,
        ..FeatureDefinition::new(
            "dagger",
            "Dagger is enabled but no Dagger or Anvil annotations were found.",
            "Remove dagger() from the features block.",
        )
    },
    FeatureDefinition {
        removal_patterns: &[r"daggerCompiler\(\)"],
        matching_text: &[
            "@Component",
            "@MergeComponent",
            "@Subcomponent",
            "@MergeSubcomponent",
            "@AssistedInject",
        ],
        matching_text_file_extensions: KOTLIN_AND_JAVA,
        ..FeatureDefinition::new(
            "dagger-compiler",
            "The Dagger compiler is enabled but no components or assisted injection were found.",
            "Remove daggerCompiler() from the features block. Plain @Inject code does not need it.",
        )
    },
    FeatureDefinition {
        removal_patterns: &[r"moshi\(codegen = true\)"],
        matching_text: &["@JsonClass"],
        matching_text_file_extensions: KOTLIN_AND_JAVA,
        ..FeatureDefinition::new(
            "moshi-codegen",
            "Moshi code generation is enabled but no @JsonClass types were found.",
            "Remove moshi(codegen = true) from the features block.",
        )
    },
    FeatureDefinition {
        removal_patterns: &[r"circuit\(\)"],
        matching_text: &["@CircuitInject"],
        matching_text_file_extensions: &["kt"],
        ..FeatureDefinition::new(
            "circuit-inject",
            "Circuit code generation is enabled but no @CircuitInject usages were found.",
            "Remove circuit() from the features block.",
        )
    },
    FeatureDefinition {
        removal_patterns: &[r"parcelize\(\)"],
        matching_text: &["@Parcelize"],
        matching_text_file_extensions: &["kt"],
        matching_plugin: Some("org.jetbrains.kotlin.plugin.parcelize"),
        ..FeatureDefinition::new(
            "parcelize",
            "The Parcelize plugin is applied but no @Parcelize classes were found.",
            "Remove parcelize() from the features block.",
        )
    },
    FeatureDefinition {
        removal_patterns: &[r"viewBinding\(\)"],
        generated_sources_dir: Some("build/generated/data_binding_base_class_source_out"),
        ..FeatureDefinition::new(
            "view-binding",
            "View binding is enabled but no binding classes were generated.",
            "Remove viewBinding() from the features block.",
        )
    },
    FeatureDefinition {
        matching_sources_dir: Some("src/test"),
        matching_text: &["RobolectricTestRunner"],
        matching_text_file_extensions: KOTLIN_AND_JAVA,
        ..FeatureDefinition::new(
            "robolectric",
            "Robolectric is enabled but no tests run with RobolectricTestRunner.",
            "Remove the robolectric configuration from the build file.",
        )
    },
    FeatureDefinition {
        generated_sources_dir: Some("build/generated/source/kapt"),
        generated_sources_extensions: &["java"],
        matching_plugin: Some("org.jetbrains.kotlin.kapt"),
        ..FeatureDefinition::new(
            "kapt",
            "KAPT is applied but produced no generated sources.",
            "Remove the kapt plugin and its annotation processors.",
        )
    },
    FeatureDefinition {
        generated_sources_dir: Some("build/generated/ksp"),
        matching_plugin: Some("com.google.devtools.ksp"),
        ..FeatureDefinition::new(
            "ksp",
            "KSP is applied but produced no generated sources.",
            "Remove the ksp plugin and its symbol processors.",
        )
    },
];

static BUILTIN_CATALOG: Lazy<Vec<Feature>> = Lazy::new(|| {
    BUILTIN_FEATURES
        .iter()
        .map(|definition| {
            definition
                .compile()
                .expect("built-in feature patterns are valid")
        })
        .collect()
});

/// Ordered collection of features, unique by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureCatalog {
    features: Vec<Feature>,
}

impl Default for FeatureCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FeatureCatalog {
    pub fn builtin() -> Self {
        Self {
            features: BUILTIN_CATALOG.clone(),
        }
    }

    /// Build a catalog from explicit features, rejecting duplicate names
    pub fn from_features(features: Vec<Feature>) -> Result<Self> {
        let mut catalog = Self {
            features: Vec::with_capacity(features.len()),
        };
        for feature in features {
            catalog.add(feature)?;
        }
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.name == name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Feature> {
        self.features.iter_mut().find(|f| f.name == name)
    }

    pub fn add(&mut self, feature: Feature) -> Result<()> {
        if self.get(&feature.name).is_some() {
            return Err(Error::DuplicateFeature { name: feature.name });
        }
        self.features.push(feature);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Names of features whose `matching_plugin` is in `plugins`
    pub fn plugin_tags<'a>(
        &'a self,
        plugins: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = &'a str> {
        self.features
            .iter()
            .filter(|f| f.matching_plugin.as_ref().is_some_and(|p| plugins.contains(p)))
            .map(|f| f.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_compiles() {
        let catalog = FeatureCatalog::builtin();
        assert_eq!(catalog.len(), BUILTIN_FEATURES.len());
        let names: BTreeSet<_> = catalog.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names.len(), catalog.len(), "names must be unique");
    }

    #[test]
    fn test_every_builtin_is_validated_or_tagged() {
        for feature in FeatureCatalog::builtin().iter() {
            assert!(
                feature.is_validated() || feature.matching_plugin.is_some(),
                "{} has no checks",
                feature.name
            );
        }
    }

    #[test]
    fn test_auto_fixable() {
        let catalog = FeatureCatalog::builtin();
        assert!(catalog.get("compose").unwrap().is_auto_fixable());
        assert!(!catalog.get("robolectric").unwrap().is_auto_fixable());
    }

    #[test]
    fn test_invalid_pattern_names_feature() {
        let err = RemovalPattern::new("broken", "compose(").unwrap_err();
        match err {
            Error::Pattern { feature, pattern, .. } => {
                assert_eq!(feature, "broken");
                assert_eq!(pattern, "compose(");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_feature_rejected() {
        let compose = FeatureCatalog::builtin().get("compose").cloned().unwrap();
        let err = FeatureCatalog::from_features(vec![compose.clone(), compose]).unwrap_err();
        assert!(matches!(err, Error::DuplicateFeature { name } if name == "compose"));
    }

    #[test]
    fn test_plugin_tags() {
        let catalog = FeatureCatalog::builtin();
        let plugins: BTreeSet<String> = ["org.jetbrains.kotlin.kapt", "com.example.unrelated"]
            .into_iter()
            .map(String::from)
            .collect();
        let tags: Vec<_> = catalog.plugin_tags(&plugins).collect();
        assert_eq!(tags, vec!["kapt"]);
    }
}
