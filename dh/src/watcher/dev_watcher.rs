//! Filesystem watch loop
//!
//! Subscribes to change notifications under the session's watch paths and
//! feeds them through a depth-1 channel into the cycle runner. The bounded
//! channel is the serialization point: at most one cycle runs at a time,
//! at most one further trigger is pending, and anything beyond that is
//! coalesced into the pending trigger and dropped with a log line.

use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::container::ContainerEngine;
use crate::generator::Generator;

use super::WatchSession;
use super::cycle::run_cycle;

/// Directory names excluded from change detection by convention
const IGNORED_DIRS: &[&str] = &["node_modules", ".git", ".dockhand"];

/// Watches a dev-mode session and reacts to changes until interrupted
pub struct DevWatcher {
    session: WatchSession,
    generator: Generator,
    engine: ContainerEngine,
    project_dir: PathBuf,
}

impl DevWatcher {
    pub fn new(session: WatchSession, generator: Generator, engine: ContainerEngine, project_dir: PathBuf) -> Self {
        Self {
            session,
            generator,
            engine,
            project_dir,
        }
    }

    /// Run the watch loop until an interrupt signal arrives
    ///
    /// Setup failures (watch subscription) are hard errors. Per-cycle
    /// failures are logged and the loop keeps watching, except a genuine
    /// container-removal failure which propagates and ends dev mode.
    pub async fn run(&self) -> Result<()> {
        let (tx, mut rx) = mpsc::channel::<PathBuf>(1);

        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| match result {
            Ok(event) => {
                if !is_content_change(&event.kind) {
                    return;
                }
                for path in event.paths {
                    if is_ignored(&path) {
                        continue;
                    }
                    match tx.try_send(path) {
                        Ok(()) => {}
                        Err(mpsc::error::TrySendError::Full(path)) => {
                            debug!(path = %path.display(), "Cycle in flight, coalescing change event");
                        }
                        Err(mpsc::error::TrySendError::Closed(_)) => {}
                    }
                    return;
                }
            }
            Err(e) => warn!(error = %e, "Watch error"),
        })
        .wrap_err("Failed to create filesystem watcher")?;

        for path in &self.session.watch_paths {
            watcher
                .watch(path, RecursiveMode::Recursive)
                .wrap_err_with(|| format!("Failed to watch {}", path.display()))?;
        }
        info!(
            paths = ?self.session.watch_paths,
            image = %self.session.image_name,
            container = %self.session.container_name,
            "Watching for changes"
        );

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupt received, stopping watcher");
                    break;
                }
                changed = rx.recv() => {
                    let Some(path) = changed else { break };
                    info!(path = %path.display(), "File changed");
                    let outcome = run_cycle(&self.session, &self.generator, &self.engine, &self.project_dir).await?;
                    debug!(?outcome, "Cycle finished");
                }
            }
        }
        Ok(())
    }
}

/// Whether an event kind can change file content on disk
fn is_content_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_))
}

/// Whether a path falls under a conventionally ignored directory
fn is_ignored(path: &Path) -> bool {
    path.components()
        .any(|component| matches!(component.as_os_str().to_str(), Some(name) if IGNORED_DIRS.contains(&name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignored_paths() {
        assert!(is_ignored(Path::new("project/node_modules/express/index.js")));
        assert!(is_ignored(Path::new(".git/HEAD")));
        assert!(is_ignored(Path::new("project/.dockhand/backups/Dockerfile.bak")));
        assert!(!is_ignored(Path::new("project/src/index.js")));
        assert!(!is_ignored(Path::new("src/gitlab.rs")));
    }

    #[test]
    fn test_content_change_kinds() {
        assert!(is_content_change(&EventKind::Create(notify::event::CreateKind::File)));
        assert!(is_content_change(&EventKind::Modify(notify::event::ModifyKind::Any)));
        assert!(is_content_change(&EventKind::Remove(notify::event::RemoveKind::File)));
        assert!(!is_content_change(&EventKind::Access(notify::event::AccessKind::Any)));
    }

    #[tokio::test]
    async fn test_trigger_channel_coalesces_when_full() {
        let (tx, mut rx) = mpsc::channel::<PathBuf>(1);

        tx.try_send(PathBuf::from("a.js")).expect("first trigger fits");
        let second = tx.try_send(PathBuf::from("b.js"));
        assert!(matches!(second, Err(mpsc::error::TrySendError::Full(_))));

        // Only the pending trigger is delivered
        assert_eq!(rx.recv().await, Some(PathBuf::from("a.js")));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_run_fails_for_missing_watch_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let session = WatchSession {
            watch_paths: vec![dir.path().join("does-not-exist")],
            build_file: dir.path().join("Dockerfile"),
            image_name: "dockhand-test".to_string(),
            container_name: "dockhand-test-container".to_string(),
            auto_restart: true,
        };
        let watcher = DevWatcher::new(
            session,
            Generator::new(dir.path()),
            ContainerEngine::new("true"),
            dir.path().to_path_buf(),
        );

        assert!(watcher.run().await.is_err());
    }
}
