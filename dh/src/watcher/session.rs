//! Dev-mode session configuration

use std::path::PathBuf;

/// Immutable configuration for one dev-mode run
///
/// Created once from user input when dev mode starts; nothing mutates it
/// for the lifetime of the session.
#[derive(Debug, Clone)]
pub struct WatchSession {
    /// Paths whose changes trigger a cycle
    pub watch_paths: Vec<PathBuf>,

    /// The generated build file, regenerated each cycle
    pub build_file: PathBuf,

    /// Image rebuilt each cycle
    pub image_name: String,

    /// Container recreated each cycle
    pub container_name: String,

    /// Whether to recreate the container after a successful rebuild
    pub auto_restart: bool,
}
