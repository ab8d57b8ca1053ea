//! End-to-end runs over a project laid out in a temporary directory.

use indoc::indoc;
use modscore::config::{ModscoreConfig, ParallelConfig};
use modscore::errors::Error;
use modscore::features::FeatureCatalog;
use modscore::io::ArtifactWriter;
use modscore::modules::ProjectManifest;
use modscore::pipeline::{run_analysis, AnalysisOutput};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn analyze(manifest: &ProjectManifest) -> AnalysisOutput {
    run_analysis(manifest, &FeatureCatalog::builtin(), &ModscoreConfig::default()).unwrap()
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Four modules: an app over two feature libraries over a shared core,
/// plus a test-fixtures module that closes a tolerated cycle.
fn sample_project(root: &Path) {
    write(
        root,
        "manifest.json",
        indoc! {r#"
            {
              "projectAccessors": {
                "libraries.core": ":libraries:core",
                "libraries.core.testFixtures": ":libraries:core:test-fixtures",
                "features.login": ":features:login",
                "features.feed": ":features:feed"
              },
              "modules": [
                {
                  "name": "app",
                  "path": ":app",
                  "projectDir": "app",
                  "buildFile": "build.gradle.kts",
                  "plugins": ["com.android.application", "org.jetbrains.kotlin.kapt"],
                  "features": ["kapt", "dagger-compiler"]
                },
                {
                  "name": "login",
                  "path": ":features:login",
                  "projectDir": "features/login",
                  "buildFile": "build.gradle.kts",
                  "features": ["compose"]
                },
                {
                  "name": "feed",
                  "path": ":features:feed",
                  "projectDir": "features/feed",
                  "buildFile": "build.gradle.kts"
                },
                {
                  "name": "core",
                  "path": ":libraries:core",
                  "projectDir": "libraries/core",
                  "buildFile": "build.gradle.kts",
                  "dependencies": [":libraries:core:test-fixtures"]
                },
                {
                  "name": "test-fixtures",
                  "path": ":libraries:core:test-fixtures",
                  "projectDir": "libraries/core/test-fixtures",
                  "dependencies": [":libraries:core"]
                }
              ]
            }
        "#},
    );

    write(
        root,
        "app/build.gradle.kts",
        indoc! {r#"
            dependencies {
              implementation(projects.features.login)
              implementation(projects.features.feed)
            }
        "#},
    );
    write(
        root,
        "app/src/main/kotlin/App.kt",
        "@Component\ninterface AppComponent\n",
    );
    write(root, "app/build/generated/source/kapt/DaggerApp.java", "class DaggerApp {}\n");

    for feature in ["login", "feed"] {
        write(
            root,
            &format!("features/{}/build.gradle.kts", feature),
            indoc! {r#"
                dependencies {
                  api(projects.libraries.core)
                  testImplementation(testFixtures(projects.libraries.core))
                }
                foundry {
                  features {
                    compose()
                  }
                }
            "#},
        );
    }
    write(
        root,
        "features/login/src/main/kotlin/Login.kt",
        "// Login screen\nclass Login {\n\n  fun show() = Unit\n}\n",
    );
    write(
        root,
        "features/feed/src/main/java/Feed.java",
        "/*\n * Feed\n */\nclass Feed {\n}\n",
    );

    write(root, "libraries/core/build.gradle.kts", "");
    write(root, "libraries/core/src/main/kotlin/Core.kt", "object Core\n");
    write(
        root,
        "libraries/core/src/main/res/values/strings.xml",
        "<!-- strings -->\n<resources/>\n",
    );
}

#[test]
fn test_report_is_a_stable_permutation_of_modules() {
    let temp = TempDir::new().unwrap();
    sample_project(temp.path());
    let manifest = ProjectManifest::load(&temp.path().join("manifest.json")).unwrap();

    let output = analyze(&manifest);

    let reported: BTreeSet<_> = output
        .aggregate
        .scores
        .iter()
        .map(|s| s.module_path.clone())
        .collect();
    let expected: BTreeSet<_> = manifest.modules.iter().map(|m| m.path.clone()).collect();
    assert_eq!(reported, expected);
    assert_eq!(output.aggregate.scores.len(), manifest.modules.len());

    let scores: Vec<i64> = output.aggregate.scores.iter().map(|s| s.score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "not sorted: {:?}", scores);

    // Ties keep manifest order
    let positions: Vec<usize> = output
        .aggregate
        .scores
        .iter()
        .map(|s| manifest.modules.iter().position(|m| m.path == s.module_path).unwrap())
        .collect();
    for (pair, w) in output.aggregate.scores.windows(2).zip(positions.windows(2)) {
        if pair[0].score == pair[1].score {
            assert!(w[0] < w[1]);
        }
    }
}

#[test]
fn test_fixtures_cycle_is_tolerated_and_deps_resolved() {
    let temp = TempDir::new().unwrap();
    sample_project(temp.path());
    let manifest = ProjectManifest::load(&temp.path().join("manifest.json")).unwrap();
    let output = analyze(&manifest);

    let app = &output.modules[0];
    assert_eq!(
        app.stats.deps,
        BTreeSet::from([":features:feed".to_string(), ":features:login".to_string()])
    );
    let login = &output.modules[1];
    // testFixtures(...) lines are not dependencies
    assert_eq!(login.stats.deps, BTreeSet::from([":libraries:core".to_string()]));

    assert!(output.graph.has_dependency(":libraries:core", ":libraries:core:test-fixtures"));
    assert!(!output.graph.has_dependency(":libraries:core:test-fixtures", ":libraries:core"));

    // Both feature modules route the app to core
    assert_eq!(output.centrality[":features:login"], 1.0);
    assert_eq!(output.centrality[":features:feed"], 1.0);
}

#[test]
fn test_module_results_and_tags() {
    let temp = TempDir::new().unwrap();
    sample_project(temp.path());
    let manifest = ProjectManifest::load(&temp.path().join("manifest.json")).unwrap();
    let output = analyze(&manifest);

    let app = &output.modules[0];
    assert!(app.feature_report.is_empty());
    for tag in ["android", "kapt", "dagger-compiler"] {
        assert!(app.stats.tags.contains(tag), "missing tag {}", tag);
    }
    assert_eq!(app.loc.generated["Java"].code, 1);

    let login = &output.modules[1];
    let kotlin = login.loc.source["Kotlin"];
    assert_eq!((kotlin.code, kotlin.comment, kotlin.blank), (3, 1, 1));
    assert_eq!(login.feature_report.features_to_remove.len(), 1);
    assert_eq!(login.feature_report.features_to_remove[0].name, "compose");

    let feed = &output.modules[2];
    let java = feed.loc.source["Java"];
    assert_eq!((java.code, java.comment, java.blank), (2, 3, 0));
    // compose is not enabled on feed, so its block is left alone
    assert!(feed.fix.is_none());

    let core = &output.modules[3];
    assert_eq!(core.loc.source["XML"].comment, 1);
}

#[test]
fn test_artifacts_written() {
    let temp = TempDir::new().unwrap();
    sample_project(temp.path());
    let manifest = ProjectManifest::load(&temp.path().join("manifest.json")).unwrap();
    let output = analyze(&manifest);

    let out = temp.path().join("out");
    ArtifactWriter::new(&out, false).write_all(&output).unwrap();

    let aggregate: Value =
        serde_json::from_str(&fs::read_to_string(out.join("aggregate.json")).unwrap()).unwrap();
    assert_eq!(aggregate["scores"].as_array().unwrap().len(), 5);
    assert!(aggregate["scores"][0]["moduleName"].is_string());
    assert_eq!(aggregate["scores"][0]["includesGenerated"], true);

    let loc_json = fs::read_to_string(out.join("features_login/loc.json")).unwrap();
    let loc: Value = serde_json::from_str(&loc_json).unwrap();
    assert_eq!(loc["srcs"]["Kotlin"]["code"], 3);
    assert!(loc["generatedSrcs"].as_object().unwrap().is_empty());

    let topography: Value = serde_json::from_str(
        &fs::read_to_string(out.join("features_login/topography.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(topography["gradlePath"], ":features:login");
    assert_eq!(topography["features"], serde_json::json!(["compose"]));

    let stats: Value =
        serde_json::from_str(&fs::read_to_string(out.join("app/stats.json")).unwrap()).unwrap();
    assert_eq!(stats["modulePath"], ":app");
    assert_eq!(stats["deps"], serde_json::json!([":features:feed", ":features:login"]));

    let fixed = fs::read_to_string(out.join("features_login/build-file.fixed")).unwrap();
    assert!(!fixed.contains("compose()"));
    assert!(fixed.contains("api(projects.libraries.core)"));
    assert!(!out.join("features_feed/build-file.fixed").exists());
}

#[test]
fn test_parallel_and_sequential_runs_match() {
    let temp = TempDir::new().unwrap();
    sample_project(temp.path());
    let manifest = ProjectManifest::load(&temp.path().join("manifest.json")).unwrap();
    let catalog = FeatureCatalog::builtin();

    let parallel = run_analysis(&manifest, &catalog, &ModscoreConfig::default()).unwrap();
    let sequential = run_analysis(
        &manifest,
        &catalog,
        &ModscoreConfig {
            parallel: ParallelConfig::sequential(),
            ..ModscoreConfig::default()
        },
    )
    .unwrap();

    assert_eq!(parallel.aggregate, sequential.aggregate);
}

#[test]
fn test_production_cycle_aborts() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "manifest.json",
        indoc! {r#"
            {
              "modules": [
                { "name": "a", "path": ":a", "projectDir": "a", "dependencies": [":b"] },
                { "name": "b", "path": ":b", "projectDir": "b", "dependencies": [":a"] }
              ]
            }
        "#},
    );
    let manifest = ProjectManifest::load(&temp.path().join("manifest.json")).unwrap();

    let err = run_analysis(&manifest, &FeatureCatalog::builtin(), &ModscoreConfig::default())
        .unwrap_err();
    match err {
        Error::DependencyCycle { from, to } => {
            assert_eq!(from, ":b");
            assert_eq!(to, ":a");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_fail_on_unused_policy() {
    let temp = TempDir::new().unwrap();
    sample_project(temp.path());
    let manifest = ProjectManifest::load(&temp.path().join("manifest.json")).unwrap();
    let output = analyze(&manifest);

    assert!(output.enforce_feature_policy(false).is_ok());
    assert!(matches!(
        output.enforce_feature_policy(true),
        Err(Error::UnusedFeatures { ref module, count: 1 }) if module == ":features:login"
    ));
}
