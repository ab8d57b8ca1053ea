//! Per-module inputs and the records produced for each module.
//!
//! The build orchestration layer describes the project with a
//! [`ProjectManifest`]. Every analysis run produces fresh
//! [`ModuleTopography`] and [`ModuleStats`] values for each module; none of
//! them carry identity across runs.

pub mod dependencies;
pub mod tags;

use crate::errors::{Error, Result, ResultExt};
use crate::metrics::LanguageStatsMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub use dependencies::{parse_project_dependencies, ProjectAccessors};
pub use tags::{module_tags, Tag};

/// Everything the orchestration layer knows about the project's modules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectManifest {
    /// Type-safe accessor name (`libraries.foo`) to module path (`:libraries:foo`)
    #[serde(default)]
    pub project_accessors: ProjectAccessors,
    pub modules: Vec<ModuleInput>,
}

impl ProjectManifest {
    /// Load a manifest, resolving each module's directory against the manifest's directory
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io_at(e, path))?;
        let mut manifest: ProjectManifest = serde_json::from_str::<ProjectManifest>(&contents)
            .map_err(Error::from)
            .context(format!("parsing manifest {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for module in &mut manifest.modules {
            if module.project_dir.is_relative() {
                module.project_dir = base.join(&module.project_dir);
            }
        }
        Ok(manifest)
    }
}

/// One module as described by the orchestration layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInput {
    pub name: String,
    /// Canonical module path, e.g. `:libraries:foo`
    pub path: String,
    pub project_dir: PathBuf,
    /// Build file, relative to `project_dir`
    #[serde(default)]
    pub build_file: Option<PathBuf>,
    /// Build-tool plugin identifiers applied to the module
    #[serde(default)]
    pub plugins: BTreeSet<String>,
    /// Feature names the module's build configuration enables
    #[serde(default)]
    pub features: BTreeSet<String>,
    /// Dependencies already resolved to module paths
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
}

impl ModuleInput {
    pub fn build_file_path(&self) -> Option<PathBuf> {
        self.build_file.as_ref().map(|file| self.project_dir.join(file))
    }

    pub fn topography(&self) -> ModuleTopography {
        ModuleTopography {
            name: self.name.clone(),
            gradle_path: self.path.clone(),
            features: self.features.clone(),
            plugins: self.plugins.clone(),
        }
    }
}

/// Enabled features and applied plugins of one module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleTopography {
    pub name: String,
    pub gradle_path: String,
    pub features: BTreeSet<String>,
    pub plugins: BTreeSet<String>,
}

/// Line counts, tags and dependencies of one module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStats {
    pub module_path: String,
    pub source: LanguageStatsMap,
    pub generated: LanguageStatsMap,
    pub tags: BTreeSet<String>,
    pub deps: BTreeSet<String>,
}

impl ModuleStats {
    pub fn total_source(&self) -> LanguageStatsMap {
        crate::metrics::merge_maps(&self.source, &self.generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_manifest_resolves_relative_dirs() {
        let dir = TempDir::new().unwrap();
        let manifest_path = dir.path().join("modules.json");
        fs::write(
            &manifest_path,
            r#"{
                "projectAccessors": {"libraries.foo": ":libraries:foo"},
                "modules": [
                    {"name": "foo", "path": ":libraries:foo", "projectDir": "libraries/foo",
                     "buildFile": "build.gradle.kts", "plugins": ["com.android.library"]}
                ]
            }"#,
        )
        .unwrap();

        let manifest = ProjectManifest::load(&manifest_path).unwrap();
        let module = &manifest.modules[0];
        assert_eq!(module.project_dir, dir.path().join("libraries/foo"));
        assert_eq!(
            module.build_file_path(),
            Some(dir.path().join("libraries/foo/build.gradle.kts"))
        );
        assert!(module.features.is_empty());
        assert_eq!(manifest.project_accessors.len(), 1);
    }

    #[test]
    fn test_topography_serializes_gradle_path() {
        let input = ModuleInput {
            name: "foo".into(),
            path: ":foo".into(),
            project_dir: PathBuf::from("foo"),
            build_file: None,
            plugins: BTreeSet::from(["com.google.devtools.ksp".to_string()]),
            features: BTreeSet::from(["compose".to_string()]),
            dependencies: BTreeSet::new(),
        };
        let json = serde_json::to_value(input.topography()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "foo",
                "gradlePath": ":foo",
                "features": ["compose"],
                "plugins": ["com.google.devtools.ksp"]
            })
        );
    }
}
