//! One regenerate -> rebuild -> restart cycle
//!
//! Runs the full pipeline for a single triggering change. Per-step
//! failures are logged and abort the cycle without touching artifacts
//! produced by earlier cycles; only a genuine container-removal failure
//! escalates to a hard error, which terminates dev mode.

use std::path::Path;

use eyre::{Context, Result};
use tracing::{info, warn};

use crate::container::{ContainerEngine, RunSpec};
use crate::detect::{detect_framework, node_entry_point};
use crate::generator::{Framework, Generator};

use super::WatchSession;

/// How a single change-triggered cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Build file regenerated, image rebuilt, container recreated
    Completed,
    /// Image rebuilt; restart skipped because auto-restart is off
    BuildOnly,
    /// Regeneration failed; previous build file and container untouched
    RegenerateFailed,
    /// Build file regenerated but the image build failed; the old image
    /// and container keep running
    BuildFailed,
    /// Fresh image built but the new container failed to start
    StartFailed,
}

/// Run one full cycle; holds no state between invocations
pub async fn run_cycle(
    session: &WatchSession,
    generator: &Generator,
    engine: &ContainerEngine,
    project_dir: &Path,
) -> Result<CycleOutcome> {
    // 1. Regenerate the build file from the latest source truth
    let Some(mut options) = generator.derive_options(&session.build_file) else {
        warn!("Skipping cycle: could not derive options from the current build file");
        return Ok(CycleOutcome::RegenerateFailed);
    };

    let framework = match detect_framework(project_dir) {
        Ok(framework) => framework,
        Err(e) => {
            warn!(error = %e, "Skipping cycle: framework detection failed");
            return Ok(CycleOutcome::RegenerateFailed);
        }
    };
    if framework == Framework::Node {
        if let Some(entry) = node_entry_point(project_dir) {
            options.entry_point = entry;
        }
    }

    if let Err(e) = generator.generate(framework, &options, &session.build_file) {
        warn!(error = %e, "Skipping cycle: failed to regenerate build file");
        return Ok(CycleOutcome::RegenerateFailed);
    }
    info!("Build file updated");

    // 2. Rebuild the image; on failure the regenerated build file stays on
    // disk since it reflects the latest sources
    if let Err(e) = engine.build_image(&session.build_file, &session.image_name).await {
        warn!(error = %e, "Image rebuild failed; previous image and container keep running");
        return Ok(CycleOutcome::BuildFailed);
    }

    if !session.auto_restart {
        info!("Skipping container restart (auto-restart disabled)");
        return Ok(CycleOutcome::BuildOnly);
    }

    // 3. Recreate the container under the same name
    engine
        .remove_container(&session.container_name)
        .await
        .wrap_err_with(|| format!("Failed to remove container '{}'", session.container_name))?;

    let spec = RunSpec::detached(&session.image_name, &session.container_name);
    if let Err(e) = engine.run_container(&spec).await {
        warn!(error = %e, "Failed to start container from the fresh image");
        return Ok(CycleOutcome::StartFailed);
    }

    info!(container = %session.container_name, "Container restarted");
    Ok(CycleOutcome::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn session(dir: &TempDir, auto_restart: bool) -> WatchSession {
        WatchSession {
            watch_paths: vec![dir.path().join("src")],
            build_file: dir.path().join("Dockerfile"),
            image_name: "dockhand-test".to_string(),
            container_name: "dockhand-test-container".to_string(),
            auto_restart,
        }
    }

    fn node_project(dir: &TempDir) {
        fs::write(
            dir.path().join("package.json"),
            r#"{"main": "server.js", "dependencies": {"express": "^4.18.0"}}"#,
        )
        .expect("write manifest");
        fs::write(dir.path().join("Dockerfile"), "FROM node:20\nEXPOSE 4000\n").expect("write build file");
    }

    #[tokio::test]
    async fn test_cycle_completes_with_cooperative_engine() {
        let dir = TempDir::new().expect("temp dir");
        node_project(&dir);

        let outcome = run_cycle(
            &session(&dir, true),
            &Generator::new(dir.path()),
            &ContainerEngine::new("true"),
            dir.path(),
        )
        .await
        .expect("cycle");
        assert_eq!(outcome, CycleOutcome::Completed);
    }

    #[tokio::test]
    async fn test_cycle_skips_restart_when_disabled() {
        let dir = TempDir::new().expect("temp dir");
        node_project(&dir);

        let outcome = run_cycle(
            &session(&dir, false),
            &Generator::new(dir.path()),
            &ContainerEngine::new("true"),
            dir.path(),
        )
        .await
        .expect("cycle");
        assert_eq!(outcome, CycleOutcome::BuildOnly);
    }

    #[tokio::test]
    async fn test_failed_build_keeps_regenerated_build_file() {
        let dir = TempDir::new().expect("temp dir");
        node_project(&dir);

        let outcome = run_cycle(
            &session(&dir, true),
            &Generator::new(dir.path()),
            &ContainerEngine::new("false"),
            dir.path(),
        )
        .await
        .expect("cycle");
        assert_eq!(outcome, CycleOutcome::BuildFailed);

        // The regenerated file reflects the derived options and the
        // manifest entry point; it is not rolled back
        let content = fs::read_to_string(dir.path().join("Dockerfile")).expect("read build file");
        assert!(content.contains("FROM node:20"));
        assert!(content.contains("EXPOSE 4000"));
        assert!(content.contains("server.js"));
    }

    #[tokio::test]
    async fn test_missing_build_file_skips_cycle() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("package.json"), r#"{"dependencies": {"express": "1"}}"#).expect("write manifest");

        let outcome = run_cycle(
            &session(&dir, true),
            &Generator::new(dir.path()),
            &ContainerEngine::new("true"),
            dir.path(),
        )
        .await
        .expect("cycle");
        assert_eq!(outcome, CycleOutcome::RegenerateFailed);
    }

    #[tokio::test]
    async fn test_missing_manifest_skips_cycle() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("Dockerfile"), "FROM node:18\n").expect("write build file");

        let outcome = run_cycle(
            &session(&dir, true),
            &Generator::new(dir.path()),
            &ContainerEngine::new("true"),
            dir.path(),
        )
        .await
        .expect("cycle");
        assert_eq!(outcome, CycleOutcome::RegenerateFailed);

        // Previous build file untouched by the aborted cycle
        let content = fs::read_to_string(dir.path().join("Dockerfile")).expect("read build file");
        assert_eq!(content, "FROM node:18\n");
    }
}
