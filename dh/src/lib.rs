//! Dockhand - container build-file generation with live-reload dev mode
//!
//! Dockhand renders a container build file from a framework template,
//! drives image build and container run through an external engine, and
//! watches source paths to regenerate, rebuild, and restart a running
//! container during local development. A snapshot store keeps timestamped
//! versions of the build file for rollback.
//!
//! # Modules
//!
//! - [`generator`] - Build-file rendering and option derivation
//! - [`backup`] - Timestamp-named snapshot store
//! - [`container`] - External engine invocation (build, run, rm)
//! - [`watcher`] - Dev-mode watch loop and per-change cycles
//! - [`runner`] - Child-process execution with captured output
//! - [`detect`] - Framework detection from the dependency manifest
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod backup;
pub mod cli;
pub mod config;
pub mod container;
pub mod detect;
pub mod generator;
pub mod runner;
pub mod watcher;

// Re-export commonly used types
pub use backup::{BackupError, BackupStore};
pub use config::Config;
pub use container::{ContainerEngine, EnvVar, PortMapping, RunSpec};
pub use detect::{detect_framework, node_entry_point};
pub use generator::{BuildOptions, Framework, Generator, GeneratorError};
pub use runner::{CommandError, run_command};
pub use watcher::{CycleOutcome, DevWatcher, WatchSession, run_cycle};
