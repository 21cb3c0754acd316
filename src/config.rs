use anyhow::{Context, Result};
use dirs::config_dir;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

use crate::schema::{self, Configs};

/// Document written on first run when no configuration exists yet
pub const STARTER_CONFIG: &str = r#"# repokeeper configuration
#
# path: directory that holds your local clones
# open_command.repository: command used by `repokeeper open`;
#   {path} is replaced with the clone directory and {name} with the repository name
path: "${HOME}/dev"
open_command:
  repository: "code {path}"

# <owner>:
#   <repository>: [<category or null>]
#   <repository>: [<category or null>, {domain: ..., sync: true, link: ...}]
github_repositories: {}

# - domain: gitlab.com
#   category: work
#   git_ssh: git@gitlab.com:team/project.git
#   sync: true
ssh_repositories: []
"#;

/// Loaded configuration: the validated manifest plus where it came from
#[derive(Debug, Clone)]
pub struct Config {
    pub manifest: Configs,

    /// `manifest.path` with environment variables and `~` expanded
    pub root: PathBuf,

    /// File the configuration was read from
    pub source: PathBuf,
}

impl Config {
    /// Load configuration from the default location, writing the starter
    /// document there first if it does not exist
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
            }

            std::fs::write(&config_path, STARTER_CONFIG)
                .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

            tracing::info!("Created starter configuration at: {:?}", config_path);
        }

        Self::load(&config_path)
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_yaml(&content, path)
    }

    /// Parse and validate a configuration document
    pub fn from_yaml(content: &str, source: &Path) -> Result<Self> {
        let raw: Value = serde_yaml::from_str(content)
            .with_context(|| format!("Failed to parse config file: {:?}", source))?;

        let manifest = schema::parse(&raw)
            .with_context(|| format!("Invalid configuration in {:?}", source))?;

        let root = Self::expand_root(&manifest.path)?;

        Ok(Self {
            manifest,
            root,
            source: source.to_path_buf(),
        })
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("repokeeper").join("config.yml"))
    }

    /// Expand environment variables and `~` in the scan root. A relative
    /// root is taken from the current directory.
    fn expand_root(path: &str) -> Result<PathBuf> {
        let expanded = shellexpand::full(path).context("Failed to expand path")?;
        let absolute = std::path::absolute(expanded.as_ref())
            .with_context(|| format!("Failed to resolve path: {}", expanded))?;

        Ok(path_clean::clean(absolute))
    }
}
