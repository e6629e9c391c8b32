//! Dockhand CLI entry point
//!
//! Parses arguments, loads configuration, and dispatches to the one-shot
//! commands (generate, build, run, backup surface) or the long-running
//! dev-mode watcher.

use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::{Context, Result, eyre};
use tracing::info;

use dockhand::backup::BackupStore;
use dockhand::cli::{Cli, Command};
use dockhand::config::Config;
use dockhand::container::{ContainerEngine, EnvVar, PortMapping, RunSpec};
use dockhand::detect::{detect_framework, node_entry_point};
use dockhand::generator::{BuildOptions, Framework, Generator};
use dockhand::watcher::{DevWatcher, WatchSession};

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let project_dir = std::env::current_dir().context("Failed to resolve working directory")?;

    match cli.command {
        Command::Generate {
            framework,
            runtime_version,
            port,
            entry_point,
            preview,
            backup,
        } => {
            cmd_generate(
                &config,
                &project_dir,
                framework,
                runtime_version,
                port,
                entry_point,
                preview,
                backup,
            )
            .await
        }
        Command::Build {
            name,
            tag,
            framework,
            runtime_version,
            port,
            entry_point,
        } => cmd_build(&config, &project_dir, name, tag, framework, runtime_version, port, entry_point).await,
        Command::Run {
            image,
            port,
            env,
            name,
            attach,
        } => cmd_run(&config, image, port, env, name, attach).await,
        Command::Dev {
            watch,
            build_file,
            image,
            container,
            no_restart,
        } => cmd_dev(&config, &project_dir, watch, build_file, image, container, no_restart).await,
        Command::Backup => cmd_backup(&config, &project_dir),
        Command::Undo { backup } => cmd_undo(&config, &project_dir, backup),
        Command::DeleteBackups => cmd_delete_backups(&config, &project_dir),
    }
}

/// Framework from the flag, or auto-detected from the manifest
fn resolve_framework(requested: Option<Framework>, project_dir: &Path) -> Result<Framework> {
    if let Some(framework) = requested {
        return Ok(framework);
    }
    let detected = detect_framework(project_dir).context("Framework detection failed")?;
    if detected == Framework::Unknown {
        return Err(eyre!(
            "Could not detect a supported framework from package.json; pass --framework"
        ));
    }
    info!(framework = %detected, "Detected framework");
    Ok(detected)
}

/// Fully populated options from flags, config defaults, and the manifest
fn resolve_options(
    config: &Config,
    project_dir: &Path,
    framework: Framework,
    runtime_version: Option<String>,
    port: Option<String>,
    entry_point: Option<String>,
) -> BuildOptions {
    let explicit_entry = entry_point.is_some();
    let mut options = BuildOptions {
        runtime_version: runtime_version.unwrap_or_else(|| config.defaults.runtime_version.clone()),
        port: port.unwrap_or_else(|| config.defaults.port.clone()),
        entry_point: entry_point.unwrap_or_else(|| config.defaults.entry_point.clone()),
        use_env_file: project_dir.join(".env").exists(),
    };

    // The manifest's main field wins for node projects unless the entry
    // point was passed explicitly
    if framework == Framework::Node && !explicit_entry {
        if let Some(entry) = node_entry_point(project_dir) {
            options.entry_point = entry;
        }
    }
    options
}

fn backup_store(config: &Config, project_dir: &Path) -> BackupStore {
    BackupStore::new(
        project_dir.join(&config.paths.backup_dir),
        project_dir.join(&config.paths.build_file),
    )
}

#[allow(clippy::too_many_arguments)]
async fn cmd_generate(
    config: &Config,
    project_dir: &Path,
    framework: Option<Framework>,
    runtime_version: Option<String>,
    port: Option<String>,
    entry_point: Option<String>,
    preview: bool,
    backup: bool,
) -> Result<()> {
    let framework = resolve_framework(framework, project_dir)?;
    let options = resolve_options(config, project_dir, framework, runtime_version, port, entry_point);
    let generator = Generator::new(project_dir);

    if preview {
        let content = generator
            .render(framework, &options)
            .context("Failed to render build file")?;
        println!("{content}");
        return Ok(());
    }

    // Snapshot what is about to be overwritten, per the opt-in rule
    backup_store(config, project_dir)
        .maybe_snapshot(backup)
        .context("Failed to back up the current build file")?;

    let build_file = project_dir.join(&config.paths.build_file);
    generator
        .generate(framework, &options, &build_file)
        .context("Failed to generate build file")?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn cmd_build(
    config: &Config,
    project_dir: &Path,
    name: Option<String>,
    tag: String,
    framework: Option<Framework>,
    runtime_version: Option<String>,
    port: Option<String>,
    entry_point: Option<String>,
) -> Result<()> {
    let build_file = project_dir.join(&config.paths.build_file);

    if !build_file.exists() {
        info!("Build file not found, generating one");
        let framework = resolve_framework(framework, project_dir)?;
        let options = resolve_options(config, project_dir, framework, runtime_version, port, entry_point);
        Generator::new(project_dir)
            .generate(framework, &options, &build_file)
            .context("Failed to generate build file")?;
    } else {
        info!("Build file present, skipping generation");
    }

    let name = name.unwrap_or_else(|| format!("dockhand-image-{}", chrono::Utc::now().timestamp()));
    let image = format!("{name}:{tag}");
    ContainerEngine::new(&config.engine.program)
        .build_image(&build_file, &image)
        .await
        .context("Image build failed")?;
    Ok(())
}

async fn cmd_run(
    config: &Config,
    image: String,
    ports: Vec<PortMapping>,
    env: Vec<EnvVar>,
    name: Option<String>,
    attach: bool,
) -> Result<()> {
    let spec = RunSpec {
        image,
        name,
        ports,
        env,
        detached: !attach,
    };
    ContainerEngine::new(&config.engine.program)
        .run_container(&spec)
        .await
        .context("Failed to run container")?;
    Ok(())
}

async fn cmd_dev(
    config: &Config,
    project_dir: &Path,
    watch: Vec<PathBuf>,
    build_file: Option<PathBuf>,
    image: Option<String>,
    container: Option<String>,
    no_restart: bool,
) -> Result<()> {
    let image_name = image.unwrap_or_else(|| format!("dockhand-{}", chrono::Utc::now().timestamp()));
    let container_name = container.unwrap_or_else(|| format!("{image_name}-container"));
    let session = WatchSession {
        watch_paths: watch,
        build_file: project_dir.join(build_file.unwrap_or_else(|| config.paths.build_file.clone())),
        image_name,
        container_name,
        auto_restart: !no_restart,
    };

    info!("Starting development mode");
    let watcher = DevWatcher::new(
        session,
        Generator::new(project_dir),
        ContainerEngine::new(&config.engine.program),
        project_dir.to_path_buf(),
    );
    watcher.run().await
}

fn cmd_backup(config: &Config, project_dir: &Path) -> Result<()> {
    let store = backup_store(config, project_dir);
    if !store.ensure_dir() {
        return Err(eyre!("Could not create backup directory {}", store.root().display()));
    }
    store.snapshot().context("Backup failed")?;
    Ok(())
}

fn cmd_undo(config: &Config, project_dir: &Path, backup: Option<String>) -> Result<()> {
    backup_store(config, project_dir)
        .restore(backup.as_deref())
        .context("Restore failed")?;
    Ok(())
}

fn cmd_delete_backups(config: &Config, project_dir: &Path) -> Result<()> {
    backup_store(config, project_dir)
        .delete_all()
        .context("Failed to delete backups")?;
    Ok(())
}
