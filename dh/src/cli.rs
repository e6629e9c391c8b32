//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::container::{EnvVar, PortMapping};
use crate::generator::Framework;

/// Dockhand - container build-file generator with live-reload dev mode
#[derive(Parser)]
#[command(
    name = "dh",
    about = "Generate container build files and keep a dev container in sync with your sources",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Generate the container build file for the project
    Generate {
        /// Framework to render for (auto-detected when omitted)
        #[arg(long)]
        framework: Option<Framework>,

        /// Runtime base-image version
        #[arg(long)]
        runtime_version: Option<String>,

        /// Application port
        #[arg(long)]
        port: Option<String>,

        /// Application entry point file
        #[arg(long)]
        entry_point: Option<String>,

        /// Print the rendered build file instead of writing it
        #[arg(long)]
        preview: bool,

        /// Snapshot the current build file before overwriting it
        #[arg(long)]
        backup: bool,
    },

    /// Build a container image, generating the build file if missing
    Build {
        /// Name of the image
        #[arg(short, long)]
        name: Option<String>,

        /// Tag for the image
        #[arg(long, default_value = "latest")]
        tag: String,

        /// Framework used when the build file must be generated
        #[arg(long)]
        framework: Option<Framework>,

        /// Runtime base-image version
        #[arg(long)]
        runtime_version: Option<String>,

        /// Application port
        #[arg(long)]
        port: Option<String>,

        /// Application entry point file
        #[arg(long)]
        entry_point: Option<String>,
    },

    /// Run a container from an image
    Run {
        /// Image to run
        #[arg(short, long)]
        image: String,

        /// Port mapping (format: host:container)
        #[arg(short, long)]
        port: Vec<PortMapping>,

        /// Environment variables (format: KEY=value)
        #[arg(short, long)]
        env: Vec<EnvVar>,

        /// Name of the container
        #[arg(short, long)]
        name: Option<String>,

        /// Stay attached instead of running detached
        #[arg(long)]
        attach: bool,
    },

    /// Watch source paths and rebuild/restart the container on change
    Dev {
        /// Files or directories to watch
        #[arg(short, long = "watch", default_value = "./src")]
        watch: Vec<PathBuf>,

        /// Path to the build file
        #[arg(long)]
        build_file: Option<PathBuf>,

        /// Image name (generated when omitted)
        #[arg(long)]
        image: Option<String>,

        /// Container name (derived from the image name when omitted)
        #[arg(long)]
        container: Option<String>,

        /// Rebuild only; never restart the container
        #[arg(long)]
        no_restart: bool,
    },

    /// Snapshot the current build file into the backup store
    Backup,

    /// Restore the build file from a backup (latest when none given)
    Undo {
        /// Backup file name to restore
        backup: Option<String>,
    },

    /// Delete every stored backup
    DeleteBackups,
}
