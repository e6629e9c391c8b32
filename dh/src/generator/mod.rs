//! Build-file synthesis
//!
//! Renders the container build file from a framework template and a fully
//! populated option set, and derives a best-effort option set back out of
//! an existing build file so dev mode can re-render against the latest
//! source truth. Template resolution checks a project override directory
//! first and falls back to the embedded defaults.

mod templates;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use handlebars::Handlebars;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

static RUNTIME_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)FROM\s+node:(\d+)").expect("regex: runtime version"));
static PORT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)EXPOSE\s+(\d+)").expect("regex: port"));

/// Frameworks a template is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framework {
    Node,
    React,
    Angular,
    NextJs,
    Unknown,
}

impl Framework {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::React => "react",
            Self::Angular => "angular",
            Self::NextJs => "nextjs",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Framework {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "node" | "express" => Ok(Self::Node),
            "react" => Ok(Self::React),
            "angular" => Ok(Self::Angular),
            "nextjs" | "next" => Ok(Self::NextJs),
            _ => Err(format!("Unknown framework: {}. Use: node, react, angular, or nextjs", s)),
        }
    }
}

/// Options for one render pass
///
/// Always fully populated; re-derived fresh on every change event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOptions {
    pub runtime_version: String,
    pub port: String,
    pub entry_point: String,
    pub use_env_file: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            runtime_version: "18".to_string(),
            port: "3000".to_string(),
            entry_point: "index.js".to_string(),
            use_env_file: false,
        }
    }
}

/// Errors from build-file synthesis
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("no template registered for framework '{framework}'")]
    UnknownFramework { framework: String },

    #[error("failed to read template override {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render template for '{framework}': {source}")]
    Render {
        framework: String,
        #[source]
        source: handlebars::RenderError,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Key/value pair parsed out of the project's env file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvEntry {
    pub key: String,
    pub value: String,
}

#[derive(Serialize)]
struct TemplateContext<'a> {
    runtime_version: &'a str,
    port: &'a str,
    entry_point: &'a str,
    use_env_file: bool,
    env_vars: Vec<EnvEntry>,
}

/// Renders build files and derives options from existing ones
pub struct Generator {
    hbs: Handlebars<'static>,
    project_dir: PathBuf,
    override_dir: PathBuf,
}

impl Generator {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        let override_dir = project_dir.join(".dockhand").join("templates");
        let mut hbs = Handlebars::new();
        // Build files are plain text, not HTML
        hbs.register_escape_fn(handlebars::no_escape);
        Self {
            hbs,
            project_dir,
            override_dir,
        }
    }

    /// Render the build file content for a framework
    pub fn render(&self, framework: Framework, options: &BuildOptions) -> Result<String, GeneratorError> {
        let template = self.load_template(framework)?;
        let context = TemplateContext {
            runtime_version: &options.runtime_version,
            port: &options.port,
            entry_point: &options.entry_point,
            use_env_file: options.use_env_file,
            env_vars: self.env_vars(options),
        };

        self.hbs
            .render_template(&template, &context)
            .map_err(|source| GeneratorError::Render {
                framework: framework.to_string(),
                source,
            })
    }

    /// Render and write the build file, then refresh the ignore file
    pub fn generate(
        &self,
        framework: Framework,
        options: &BuildOptions,
        build_file: &Path,
    ) -> Result<(), GeneratorError> {
        let content = self.render(framework, options)?;
        fs::write(build_file, &content).map_err(|source| GeneratorError::Write {
            path: build_file.to_path_buf(),
            source,
        })?;
        info!(path = %build_file.display(), framework = %framework, "Build file written");

        self.write_ignore_file(options.use_env_file);
        Ok(())
    }

    /// Recover a best-effort option set from an existing build file
    ///
    /// Only the runtime version and port are recoverable from content;
    /// everything else falls back to fixed defaults. `use_env_file` is
    /// probed live from the project directory, not parsed. An unreadable
    /// file yields `None`: the caller skips the cycle and keeps watching.
    pub fn derive_options(&self, build_file: &Path) -> Option<BuildOptions> {
        let content = match fs::read_to_string(build_file) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %build_file.display(), error = %e, "Failed to read build file for option derivation");
                return None;
            }
        };

        let mut options = BuildOptions::default();
        if let Some(cap) = RUNTIME_VERSION_RE.captures(&content) {
            options.runtime_version = cap[1].to_string();
        }
        if let Some(cap) = PORT_RE.captures(&content) {
            options.port = cap[1].to_string();
        }
        options.use_env_file = self.project_dir.join(".env").exists();
        Some(options)
    }

    fn load_template(&self, framework: Framework) -> Result<String, GeneratorError> {
        let path = self.override_dir.join(format!("{framework}.hbs"));
        if path.exists() {
            debug!(path = %path.display(), "Loading template override");
            return fs::read_to_string(&path).map_err(|source| GeneratorError::TemplateRead { path, source });
        }

        templates::get_embedded(framework)
            .map(str::to_string)
            .ok_or_else(|| GeneratorError::UnknownFramework {
                framework: framework.to_string(),
            })
    }

    fn env_vars(&self, options: &BuildOptions) -> Vec<EnvEntry> {
        if !options.use_env_file {
            return Vec::new();
        }
        match fs::read_to_string(self.project_dir.join(".env")) {
            Ok(content) => parse_env_file(&content),
            Err(_) => Vec::new(),
        }
    }

    /// Write the engine ignore file; failures are logged, never fatal
    fn write_ignore_file(&self, use_env_file: bool) {
        let mut lines: Vec<String> = [
            "node_modules",
            "npm-debug.log",
            "yarn-debug.log",
            "yarn-error.log",
            ".DS_Store",
            ".vscode",
            ".idea",
            ".dockhand",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        if use_env_file {
            lines.push(".env".to_string());
        }

        let mut content = lines.join("\n");
        content.push('\n');

        // Inherit the project's version-control ignores
        if let Ok(gitignore) = fs::read_to_string(self.project_dir.join(".gitignore")) {
            content.push_str(&gitignore);
        }

        let path = self.project_dir.join(".dockerignore");
        match fs::write(&path, content) {
            Ok(()) => info!(path = %path.display(), "Ignore file written"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to write ignore file"),
        }
    }
}

/// Parse env-file content into key/value pairs, skipping blanks and comments
fn parse_env_file(content: &str) -> Vec<EnvEntry> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            Some(EnvEntry {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            })
        })
        .collect()
}
