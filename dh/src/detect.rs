//! Framework auto-detection from the project's dependency manifest

use std::fs;
use std::path::Path;

use eyre::{Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::generator::Framework;

/// Inspect `package.json` and return the framework it implies
///
/// A missing or unreadable manifest is an error; an unrecognized
/// dependency set is `Framework::Unknown`, not an error.
pub fn detect_framework(project_dir: &Path) -> Result<Framework> {
    let manifest = project_dir.join("package.json");
    let content =
        fs::read_to_string(&manifest).wrap_err_with(|| format!("Failed to read manifest {}", manifest.display()))?;
    let json: Value =
        serde_json::from_str(&content).wrap_err_with(|| format!("Failed to parse manifest {}", manifest.display()))?;

    let has_dependency = |name: &str| {
        json.get("dependencies").and_then(|deps| deps.get(name)).is_some()
            || json.get("devDependencies").and_then(|deps| deps.get(name)).is_some()
    };

    let framework = if has_dependency("react") {
        Framework::React
    } else if has_dependency("@angular/core") {
        Framework::Angular
    } else if has_dependency("next") {
        Framework::NextJs
    } else if has_dependency("express") {
        Framework::Node
    } else {
        Framework::Unknown
    };

    debug!(%framework, "Detected framework");
    Ok(framework)
}

/// Entry point declared in the manifest's `main` field, if any
pub fn node_entry_point(project_dir: &Path) -> Option<String> {
    let content = fs::read_to_string(project_dir.join("package.json")).ok()?;
    let json: Value = serde_json::from_str(&content).ok()?;
    json.get("main").and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_manifest(dir: &TempDir, content: &str) {
        fs::write(dir.path().join("package.json"), content).expect("write manifest");
    }

    #[test]
    fn test_detect_by_dependency() {
        let cases = [
            (r#"{"dependencies": {"react": "^18.0.0"}}"#, Framework::React),
            (r#"{"dependencies": {"@angular/core": "^17.0.0"}}"#, Framework::Angular),
            (r#"{"dependencies": {"next": "^14.0.0"}}"#, Framework::NextJs),
            (r#"{"dependencies": {"express": "^4.18.0"}}"#, Framework::Node),
            (r#"{"dependencies": {"left-pad": "^1.3.0"}}"#, Framework::Unknown),
        ];

        for (manifest, expected) in cases {
            let dir = TempDir::new().expect("temp dir");
            write_manifest(&dir, manifest);
            assert_eq!(detect_framework(dir.path()).expect("detect"), expected);
        }
    }

    #[test]
    fn test_dev_dependencies_count() {
        let dir = TempDir::new().expect("temp dir");
        write_manifest(&dir, r#"{"devDependencies": {"react": "^18.0.0"}}"#);
        assert_eq!(detect_framework(dir.path()).expect("detect"), Framework::React);
    }

    #[test]
    fn test_missing_manifest_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        assert!(detect_framework(dir.path()).is_err());
    }

    #[test]
    fn test_malformed_manifest_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        write_manifest(&dir, "not json");
        assert!(detect_framework(dir.path()).is_err());
    }

    #[test]
    fn test_node_entry_point() {
        let dir = TempDir::new().expect("temp dir");
        write_manifest(&dir, r#"{"main": "server.js"}"#);
        assert_eq!(node_entry_point(dir.path()), Some("server.js".to_string()));

        let empty = TempDir::new().expect("temp dir");
        write_manifest(&empty, "{}");
        assert_eq!(node_entry_point(empty.path()), None);
    }
}
