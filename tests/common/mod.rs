//! Common test utilities and helpers for repokeeper tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary repository root plus a configuration file pointing at it
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub config_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("dev");
        std::fs::create_dir_all(&root).expect("Failed to create root dir");
        let config_path = temp_dir.path().join("config.yml");

        Self {
            temp_dir,
            root,
            config_path,
        }
    }

    /// Write a configuration whose `path` is this environment's root.
    /// `body` holds the `github_repositories` and `ssh_repositories` sections.
    pub fn write_config(&self, body: &str) -> &Path {
        let content = format!(
            "path: '{}'\nopen_command:\n  repository: \"true {{path}}\"\n{}",
            self.root.display(),
            body
        );
        self.write_raw_config(&content)
    }

    pub fn write_raw_config(&self, content: &str) -> &Path {
        std::fs::write(&self.config_path, content).expect("Failed to write test config");
        &self.config_path
    }

    /// Create `<root>/<relative>/.git` so the folder counts as a clone
    pub fn add_clone(&self, relative: &str) -> PathBuf {
        let path = self.root.join(relative);
        std::fs::create_dir_all(path.join(".git")).expect("Failed to create clone");
        path
    }

    pub fn add_plain_dir(&self, relative: &str) -> PathBuf {
        let path = self.root.join(relative);
        std::fs::create_dir_all(&path).expect("Failed to create dir");
        path
    }
}

/// Manifest with two GitHub repositories and one SSH repository
pub const MIXED_MANIFEST: &str = r#"github_repositories:
  octocat:
    api: ["work", {sync: true}]
    site: [null]
ssh_repositories:
  - domain: gitlab.com
    category: work
    git_ssh: git@gitlab.com:team/infra.git
    sync: true
"#;
