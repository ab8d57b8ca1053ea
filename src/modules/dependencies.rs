//! Textual scan of build files for project dependencies.
//!
//! Recognizes type-safe accessors (`projects.libraries.foo`) and literal
//! paths (`project(":libraries:foo")`). Lines that only pull in another
//! module's test fixtures are skipped.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

/// Accessor name to canonical module path
pub type ProjectAccessors = BTreeMap<String, String>;

static ACCESSOR_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bprojects\.([A-Za-z0-9_.]*[A-Za-z0-9_])").unwrap());
static PATH_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bproject\(\s*(?:path\s*=\s*)?["'](:[^"']*)["']"#).unwrap()
});

const TEST_FIXTURES_REFERENCE: &str = "testFixtures(";

/// Module paths referenced by `build_file`, excluding `module_path` itself
pub fn parse_project_dependencies(
    module_path: &str,
    build_file: &str,
    accessors: &ProjectAccessors,
) -> BTreeSet<String> {
    build_file
        .lines()
        .filter(|line| !line.contains(TEST_FIXTURES_REFERENCE))
        .flat_map(|line| line_references(line, accessors))
        .filter(|path| path != module_path)
        .collect()
}

fn line_references(line: &str, accessors: &ProjectAccessors) -> Vec<String> {
    let from_accessors = ACCESSOR_REFERENCE
        .captures_iter(line)
        .filter_map(|caps| {
            let accessor = &caps[1];
            match accessors.get(accessor) {
                Some(path) => Some(path.clone()),
                None => {
                    log::warn!("Unknown project accessor `projects.{}`", accessor);
                    None
                }
            }
        });

    let from_paths = PATH_REFERENCE
        .captures_iter(line)
        .map(|caps| caps[1].to_string());

    from_accessors.chain(from_paths).collect()
}
