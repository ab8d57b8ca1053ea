//! Catalog override documents.
//!
//! A JSON document can replace individual fields of built-in features and
//! append new ones:
//!
//! ```json
//! {
//!   "overrides": [{ "name": "compose", "matchingText": ["@Composable", "@Preview"] }],
//!   "additions": [{ "name": "metro", "explanation": "...", "advice": "...",
//!                   "matchingText": ["@DependencyGraph"] }]
//! }
//! ```
//!
//! Overrides are typed partial updates: every field except `name` is
//! optional and only the fields present replace the base value. An override
//! naming a feature the catalog lacks invalidates the whole document.

use crate::errors::{Error, Result, ResultExt};
use crate::features::catalog::{Feature, FeatureCatalog, RemovalPattern};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CatalogOverrides {
    #[serde(default)]
    pub overrides: Vec<FeatureOverride>,
    #[serde(default)]
    pub additions: Vec<FeatureAddition>,
}

/// Partial update of an existing feature
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FeatureOverride {
    pub name: String,
    pub explanation: Option<String>,
    pub advice: Option<String>,
    pub removal_patterns: Option<Vec<String>>,
    pub generated_sources_dir: Option<String>,
    pub generated_sources_extensions: Option<BTreeSet<String>>,
    pub matching_text: Option<BTreeSet<String>>,
    pub matching_text_file_extensions: Option<BTreeSet<String>>,
    pub matching_sources_dir: Option<String>,
    pub matching_plugin: Option<String>,
}

/// A feature that is not part of the built-in catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FeatureAddition {
    pub name: String,
    pub explanation: String,
    pub advice: String,
    #[serde(default)]
    pub removal_patterns: Vec<String>,
    pub generated_sources_dir: Option<String>,
    #[serde(default)]
    pub generated_sources_extensions: BTreeSet<String>,
    #[serde(default)]
    pub matching_text: BTreeSet<String>,
    #[serde(default)]
    pub matching_text_file_extensions: BTreeSet<String>,
    pub matching_sources_dir: Option<String>,
    pub matching_plugin: Option<String>,
}

fn compile_patterns(feature: &str, patterns: &[String]) -> Result<Option<Vec<RemovalPattern>>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    patterns
        .iter()
        .map(|pattern| RemovalPattern::new(feature, pattern))
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

impl FeatureOverride {
    /// Merge the present fields into `base`
    pub fn apply_to(&self, base: &mut Feature) -> Result<()> {
        if let Some(explanation) = &self.explanation {
            base.explanation = explanation.clone();
        }
        if let Some(advice) = &self.advice {
            base.advice = advice.clone();
        }
        if let Some(patterns) = &self.removal_patterns {
            base.removal_patterns = compile_patterns(&self.name, patterns)?;
        }
        if let Some(dir) = &self.generated_sources_dir {
            base.generated_sources_dir = Some(dir.clone());
        }
        if let Some(extensions) = &self.generated_sources_extensions {
            base.generated_sources_extensions = extensions.clone();
        }
        if let Some(text) = &self.matching_text {
            base.matching_text = text.clone();
        }
        if let Some(extensions) = &self.matching_text_file_extensions {
            base.matching_text_file_extensions = extensions.clone();
        }
        if let Some(dir) = &self.matching_sources_dir {
            base.matching_sources_dir = Some(dir.clone());
        }
        if let Some(plugin) = &self.matching_plugin {
            base.matching_plugin = Some(plugin.clone());
        }
        Ok(())
    }
}

impl FeatureAddition {
    pub fn into_feature(self) -> Result<Feature> {
        let removal_patterns = compile_patterns(&self.name, &self.removal_patterns)?;
        Ok(Feature {
            name: self.name,
            explanation: self.explanation,
            advice: self.advice,
            removal_patterns,
            generated_sources_dir: self.generated_sources_dir,
            generated_sources_extensions: self.generated_sources_extensions,
            matching_text: self.matching_text,
            matching_text_file_extensions: self.matching_text_file_extensions,
            matching_sources_dir: self.matching_sources_dir,
            matching_plugin: self.matching_plugin,
        })
    }
}

impl CatalogOverrides {
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io_at(e, path))?;
        Self::parse(&contents).context(format!("parsing catalog overrides {}", path.display()))
    }

    /// Apply overrides first, then additions. Any failure rejects the document.
    pub fn apply(&self, mut catalog: FeatureCatalog) -> Result<FeatureCatalog> {
        for update in &self.overrides {
            let base = catalog
                .get_mut(&update.name)
                .ok_or_else(|| Error::UnknownFeatureOverride {
                    name: update.name.clone(),
                })?;
            update.apply_to(base)?;
        }

        for addition in &self.additions {
            catalog.add(addition.clone().into_feature()?)?;
        }

        log::debug!(
            "Applied {} feature override(s) and {} addition(s)",
            self.overrides.len(),
            self.additions.len()
        );
        Ok(catalog)
    }
}

/// Load the built-in catalog, applying an override document when given
pub fn load_catalog(overrides: Option<&Path>) -> Result<FeatureCatalog> {
    match overrides {
        Some(path) => CatalogOverrides::load(path)?.apply(FeatureCatalog::builtin()),
        None => Ok(FeatureCatalog::builtin()),
    }
}
