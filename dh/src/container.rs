//! Container engine invocation
//!
//! Thin wrappers over the external engine's build/run/rm commands. The
//! engine binary is injected so tests can point it at a stub; its own
//! semantics are opaque and observed only through exit status and output.

use std::path::Path;

use tracing::{debug, info};

use crate::runner::{CommandError, run_command};

/// Host-to-container port mapping, parsed from `host:container`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    pub host: u16,
    pub container: u16,
}

impl std::str::FromStr for PortMapping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, container) = s
            .split_once(':')
            .ok_or_else(|| format!("Invalid port mapping: {}. Use host:container", s))?;
        let host = host.parse().map_err(|_| format!("Invalid host port: {}", host))?;
        let container = container
            .parse()
            .map_err(|_| format!("Invalid container port: {}", container))?;
        Ok(Self { host, container })
    }
}

/// Environment variable passed to the container, parsed from `KEY=value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for EnvVar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| format!("Invalid environment variable: {}. Use KEY=value", s))?;
        if key.is_empty() {
            return Err(format!("Invalid environment variable: {}. Use KEY=value", s));
        }
        Ok(Self {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

/// Options for starting a container
#[derive(Debug, Clone)]
pub struct RunSpec {
    pub image: String,
    pub name: Option<String>,
    pub ports: Vec<PortMapping>,
    pub env: Vec<EnvVar>,
    pub detached: bool,
}

impl RunSpec {
    /// Detached container under a fixed name, as dev mode recreates it
    pub fn detached(image: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            name: Some(name.into()),
            ports: Vec::new(),
            env: Vec::new(),
            detached: true,
        }
    }
}

/// Handle on the external container engine
pub struct ContainerEngine {
    program: String,
}

impl ContainerEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    /// Build an image from the build file
    pub async fn build_image(&self, build_file: &Path, image: &str) -> Result<(), CommandError> {
        info!(image, build_file = %build_file.display(), "Building container image");
        let build_file = build_file.display().to_string();
        run_command(&self.program, ["build", "-f", &build_file, "-t", image, "."]).await?;
        info!(image, "Container image built");
        Ok(())
    }

    /// Remove a container if it exists
    ///
    /// Removing a container that was never started is the normal first-run
    /// case: an engine error matching the no-such-container signal counts
    /// as success. Anything else propagates.
    pub async fn remove_container(&self, name: &str) -> Result<(), CommandError> {
        match run_command(&self.program, ["rm", "-f", name]).await {
            Ok(_) => {
                debug!(name, "Removed container");
                Ok(())
            }
            Err(CommandError::Failed { ref stderr, .. }) if is_missing_container(stderr) => {
                debug!(name, "No container to remove");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Start a container from an image
    pub async fn run_container(&self, spec: &RunSpec) -> Result<(), CommandError> {
        let mut args = vec!["run".to_string()];
        if spec.detached {
            args.push("-d".to_string());
        }
        for mapping in &spec.ports {
            args.push("-p".to_string());
            args.push(format!("{}:{}", mapping.host, mapping.container));
        }
        for var in &spec.env {
            args.push("-e".to_string());
            args.push(format!("{}={}", var.key, var.value));
        }
        if let Some(name) = &spec.name {
            args.push("--name".to_string());
            args.push(name.clone());
        }
        args.push(spec.image.clone());

        info!(image = %spec.image, "Starting container");
        run_command(&self.program, &args).await?;
        info!(image = %spec.image, "Container started");
        Ok(())
    }
}

/// Engine-agnostic match for the "container does not exist" failure
fn is_missing_container(stderr: &str) -> bool {
    stderr.to_lowercase().contains("no such container")
}
