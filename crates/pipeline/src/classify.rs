//! Priority classification — coarse importance tiers from path heuristics.
//!
//! Tiers are advisory: they seed the deterministic fallback ordering and
//! support the request-time coarse filter. The authoritative order comes
//! from the selector when it succeeds.

use repolens_core::{FileCandidate, PriorityTier};

/// File names that reveal the project's purpose or stack at a glance.
const MANIFEST_NAMES: &[&str] = &[
    "package.json",
    "pyproject.toml",
    "setup.py",
    "requirements.txt",
    "cargo.toml",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "gemfile",
    "composer.json",
    "dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "makefile",
];

/// Recognized program entry points.
const ENTRY_POINT_NAMES: &[&str] = &[
    "main.py",
    "app.py",
    "__main__.py",
    "index.js",
    "index.ts",
    "server.js",
    "server.ts",
    "main.rs",
    "lib.rs",
    "main.go",
    "main.c",
    "main.cpp",
    "main.java",
];

/// Directories whose files default to MEDIUM.
const SOURCE_DIRS: &[&str] = &["src", "lib", "app", "core", "pkg", "internal", "server"];

/// Directories whose files default to LOW regardless of location.
const LOW_DIRS: &[&str] = &[
    "test", "tests", "testing", "spec", "specs", "example", "examples", "fixtures", "docs",
];

/// Name fragments suggesting API surface or data models.
const API_NAME_HINTS: &[&str] = &["api", "route", "routes", "model", "models", "schema", "schemas"];

/// Assign a coarse importance tier to a candidate. Pure function of the
/// candidate's path.
pub fn classify(candidate: &FileCandidate) -> PriorityTier {
    let name = candidate.file_name().to_ascii_lowercase();

    // HIGH: docs-at-root, entry points, stack-revealing manifests.
    if name.starts_with("readme") || name.starts_with("license") {
        return PriorityTier::High;
    }
    if MANIFEST_NAMES.contains(&name.as_str()) || ENTRY_POINT_NAMES.contains(&name.as_str()) {
        return PriorityTier::High;
    }

    // Test / example / docs directories are LOW even under src/.
    if has_dir_component(candidate, LOW_DIRS) {
        return PriorityTier::Low;
    }

    // MEDIUM: source-directory files and api/route/model-named files.
    if has_dir_component(candidate, SOURCE_DIRS) {
        return PriorityTier::Medium;
    }
    let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(&name);
    if API_NAME_HINTS.iter().any(|hint| {
        stem == *hint || stem.ends_with(&format!("_{hint}")) || stem.starts_with(&format!("{hint}_"))
    }) {
        return PriorityTier::Medium;
    }

    PriorityTier::Low
}

fn has_dir_component(candidate: &FileCandidate, names: &[&str]) -> bool {
    let mut parts: Vec<&str> = candidate.path.split('/').collect();
    parts.pop(); // drop the file name
    parts
        .iter()
        .any(|part| names.contains(&part.to_ascii_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(path: &str) -> PriorityTier {
        classify(&FileCandidate::new(path, 100))
    }

    #[test]
    fn readme_and_license_are_high() {
        assert_eq!(tier("README.md"), PriorityTier::High);
        assert_eq!(tier("readme.rst"), PriorityTier::High);
        assert_eq!(tier("LICENSE"), PriorityTier::High);
        assert_eq!(tier("LICENSE-MIT"), PriorityTier::High);
    }

    #[test]
    fn manifests_are_high() {
        assert_eq!(tier("package.json"), PriorityTier::High);
        assert_eq!(tier("pyproject.toml"), PriorityTier::High);
        assert_eq!(tier("Cargo.toml"), PriorityTier::High);
        assert_eq!(tier("Dockerfile"), PriorityTier::High);
        assert_eq!(tier("docker-compose.yml"), PriorityTier::High);
    }

    #[test]
    fn entry_points_are_high() {
        assert_eq!(tier("main.py"), PriorityTier::High);
        assert_eq!(tier("src/index.ts"), PriorityTier::High);
        assert_eq!(tier("src/main.rs"), PriorityTier::High);
    }

    #[test]
    fn source_dir_files_are_medium() {
        assert_eq!(tier("src/engine.py"), PriorityTier::Medium);
        assert_eq!(tier("lib/parser.rb"), PriorityTier::Medium);
        assert_eq!(tier("internal/worker/pool.go"), PriorityTier::Medium);
    }

    #[test]
    fn api_named_files_are_medium() {
        assert_eq!(tier("routes.py"), PriorityTier::Medium);
        assert_eq!(tier("user_model.py"), PriorityTier::Medium);
        assert_eq!(tier("schema.sql"), PriorityTier::Medium);
    }

    #[test]
    fn tests_are_low_even_under_src() {
        assert_eq!(tier("tests/test_x.py"), PriorityTier::Low);
        assert_eq!(tier("src/tests/helper.py"), PriorityTier::Low);
        assert_eq!(tier("examples/demo.rs"), PriorityTier::Low);
    }

    #[test]
    fn everything_else_is_low() {
        assert_eq!(tier("notes.txt"), PriorityTier::Low);
        assert_eq!(tier("scripts/deploy.sh"), PriorityTier::Low);
        assert_eq!(tier(".github/workflows/ci.yml"), PriorityTier::Low);
    }

    #[test]
    fn high_patterns_win_over_low_dirs() {
        // A README inside tests/ still documents something worth reading.
        assert_eq!(tier("tests/README.md"), PriorityTier::High);
    }
}
