//! Versioned backup store for the generated build file
//!
//! Snapshots are timestamp-named copies of the build file kept in a
//! project-local directory. The timestamp format is zero-padded UTC so
//! lexicographic filename order equals chronological order; "latest" is the
//! maximum under that sort. The store is append-only except for the
//! explicit delete-all operation.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors from backup store operations
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("backup \"{name}\" not found")]
    NotFound { name: String },

    #[error("{op} failed for {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("deleted {deleted} backups, {failed} could not be removed")]
    PartialDelete { deleted: usize, failed: usize },
}

/// Snapshot store rooted at an injected directory
///
/// Both the root and the tracked build file are constructor parameters so
/// tests can point the store at a temporary directory.
#[derive(Debug, Clone)]
pub struct BackupStore {
    root: PathBuf,
    build_file: PathBuf,
}

impl BackupStore {
    pub fn new(root: impl Into<PathBuf>, build_file: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            build_file: build_file.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Idempotent create of the backup root, including parents
    ///
    /// Returns whether the directory is usable. "Already exists" is not a
    /// failure; unrecoverable I/O errors are logged and yield false.
    pub fn ensure_dir(&self) -> bool {
        match fs::create_dir_all(&self.root) {
            Ok(()) => true,
            Err(e) => {
                error!(path = %self.root.display(), error = %e, "Failed to create backup directory");
                false
            }
        }
    }

    /// Non-throwing existence probe of the backup root
    ///
    /// An existing store means the project opted into backups, so later
    /// generations snapshot automatically without being asked again.
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Copy the current build file into a new timestamp-named entry
    ///
    /// No-op (not an error) when the build file does not exist. Never
    /// overwrites an existing entry.
    pub fn snapshot(&self) -> Result<Option<PathBuf>, BackupError> {
        if !self.build_file.exists() {
            info!(path = %self.build_file.display(), "No build file to back up");
            return Ok(None);
        }

        let stem = self
            .build_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Dockerfile".to_string());
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S-%9fZ");
        let target = unique_target(self.root.join(format!("{stem}-{timestamp}.bak")));

        fs::copy(&self.build_file, &target).map_err(|source| BackupError::Io {
            op: "copy",
            path: target.clone(),
            source,
        })?;

        info!(path = %target.display(), "Backup saved");
        Ok(Some(target))
    }

    /// Snapshot before a generation overwrites the build file
    ///
    /// One unambiguous rule: backup iff explicitly requested or the store
    /// already exists, at most once per generation.
    pub fn maybe_snapshot(&self, requested: bool) -> Result<Option<PathBuf>, BackupError> {
        if !requested && !self.exists() {
            return Ok(None);
        }
        if !self.ensure_dir() {
            return Ok(None);
        }
        self.snapshot()
    }

    /// Overwrite the live build file from a snapshot
    ///
    /// With no name, restores the latest entry. A given name must match an
    /// existing entry exactly. An empty or missing store is a no-op.
    pub fn restore(&self, name: Option<&str>) -> Result<(), BackupError> {
        let mut entries = self.entries()?;
        if entries.is_empty() {
            info!("No backups available to restore");
            return Ok(());
        }

        let chosen = match name {
            Some(requested) => {
                if !entries.iter().any(|e| e == requested) {
                    return Err(BackupError::NotFound {
                        name: requested.to_string(),
                    });
                }
                requested.to_string()
            }
            // latest under the lexicographic == chronological ordering
            None => match entries.pop() {
                Some(latest) => latest,
                None => return Ok(()),
            },
        };

        let source = self.root.join(&chosen);
        fs::copy(&source, &self.build_file).map_err(|source_err| BackupError::Io {
            op: "restore",
            path: source.clone(),
            source: source_err,
        })?;

        info!(backup = %source.display(), target = %self.build_file.display(), "Restored backup");
        Ok(())
    }

    /// Remove every entry from the store
    ///
    /// Each deletion is independent: a failure is logged and the remaining
    /// entries are still attempted. The error reports how many succeeded.
    pub fn delete_all(&self) -> Result<(), BackupError> {
        let entries = self.entries()?;
        if entries.is_empty() {
            info!("No backups to delete");
            return Ok(());
        }

        let mut deleted = 0usize;
        let mut failed = 0usize;
        for name in entries {
            let path = self.root.join(&name);
            match fs::remove_file(&path) {
                Ok(()) => {
                    deleted += 1;
                    info!(path = %path.display(), "Deleted backup");
                }
                Err(e) => {
                    failed += 1;
                    warn!(path = %path.display(), error = %e, "Failed to delete backup");
                }
            }
        }

        if failed > 0 {
            return Err(BackupError::PartialDelete { deleted, failed });
        }
        Ok(())
    }

    /// Sorted snapshot names; a missing root reads as an empty store
    ///
    /// Only `.bak` entries count: anything else in the root is a stray,
    /// never a restore candidate.
    fn entries(&self) -> Result<Vec<String>, BackupError> {
        let mut names = Vec::new();
        let dir = match fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(source) => {
                return Err(BackupError::Io {
                    op: "read_dir",
                    path: self.root.clone(),
                    source,
                });
            }
        };

        for entry in dir {
            let entry = entry.map_err(|source| BackupError::Io {
                op: "read_dir",
                path: self.root.clone(),
                source,
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.contains(".bak") {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Resolve a collision-free snapshot path
///
/// A zero-padded numeric suffix after `.bak` still sorts after the base
/// name and in creation order, so the ordering invariant holds within one
/// timestamp tick (up to 99 collisions per nanosecond, which is plenty).
fn unique_target(base: PathBuf) -> PathBuf {
    if !base.exists() {
        return base;
    }
    let mut attempt = 1u32;
    loop {
        let candidate = PathBuf::from(format!("{}.{attempt:02}", base.display()));
        if !candidate.exists() {
            return candidate;
        }
        attempt += 1;
    }
}
