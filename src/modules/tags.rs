//! Module tags consumed by the scoring formula.

use crate::features::FeatureCatalog;
use crate::modules::ModuleTopography;
use std::collections::BTreeSet;

/// Tags with a fixed meaning in scoring
pub struct Tag;

impl Tag {
    /// Kotlin annotation processing (KAPT)
    pub const KAPT: &'static str = "kapt";
    /// Kotlin symbol processing (KSP), the faster alternative to KAPT
    pub const KSP: &'static str = "ksp";
    /// The Dagger compiler runs in the module
    pub const DAGGER_COMPILER: &'static str = "dagger-compiler";
    /// The module is built by an Android plugin
    pub const ANDROID: &'static str = "android";
    /// The module bundles Android resources
    pub const ANDROID_RESOURCES: &'static str = "android-resources";
    /// The module builds more than one variant
    pub const ANDROID_VARIANTS: &'static str = "android-variants";
}

/// Plugins that put a module on the Android platform
pub const ANDROID_PLUGINS: &[&str] = &[
    "com.android.application",
    "com.android.library",
    "com.android.test",
];

/// Tags for one module: catalog features matched by plugin, enabled
/// features, and the platform tag.
pub fn module_tags(topography: &ModuleTopography, catalog: &FeatureCatalog) -> BTreeSet<String> {
    let mut tags: BTreeSet<String> = catalog
        .plugin_tags(&topography.plugins)
        .map(String::from)
        .collect();

    tags.extend(topography.features.iter().cloned());

    if ANDROID_PLUGINS
        .iter()
        .any(|plugin| topography.plugins.contains(*plugin))
    {
        tags.insert(Tag::ANDROID.to_string());
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_tags_from_plugins_and_features() {
        let topography = ModuleTopography {
            name: "foo".into(),
            gradle_path: ":foo".into(),
            features: set(&["dagger-compiler", "android-variants"]),
            plugins: set(&["org.jetbrains.kotlin.kapt", "com.android.library"]),
        };
        let tags = module_tags(&topography, &FeatureCatalog::builtin());
        assert_eq!(
            tags,
            set(&[Tag::ANDROID, Tag::ANDROID_VARIANTS, Tag::DAGGER_COMPILER, Tag::KAPT])
        );
    }

    #[test]
    fn test_no_tags_for_plain_jvm_module() {
        let topography = ModuleTopography {
            name: "model".into(),
            gradle_path: ":model".into(),
            features: BTreeSet::new(),
            plugins: set(&["org.jetbrains.kotlin.jvm"]),
        };
        assert!(module_tags(&topography, &FeatureCatalog::builtin()).is_empty());
    }
}
