//! Error types for the catalog core
//!
//! Every core operation returns one of these as a value. Deciding whether a
//! failure ends the process (and with which exit code) is left to `main`.

use std::path::PathBuf;
use thiserror::Error;

/// The configuration document does not have the expected shape.
///
/// Only the first violation is reported; the whole document is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{path}: {message}")]
pub struct ValidationError {
    /// Field path of the offending value, e.g. `ssh_repositories[2].git_ssh`
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn required(path: impl Into<String>) -> Self {
        Self::new(path, "required")
    }
}

/// Failures while turning manifest entries into resolved repositories
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("cannot derive a repository name from '{url}' (expected '<...>/<name>.git')")]
    UnresolvableName { url: String },

    #[error("repository name '{name}' is declared twice: {first} and {second}")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },
}

/// Failures while walking the local directory tree
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("scan root does not exist: {0}")]
    MissingRoot(PathBuf),

    #[error("scan root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to read scan root {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An invoked OS command could not be started or exited unsuccessfully
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("failed to start `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {}", summarize(.stderr, .stdout))]
    Failed {
        command: String,
        status: String,
        stdout: String,
        stderr: String,
    },
}

/// The OS command table has no entry for this platform
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("unsupported platform '{os}' (supported: macos, windows, linux)")]
    Unsupported { os: String },
}

fn summarize(stderr: &str, stdout: &str) -> String {
    let text = if stderr.trim().is_empty() { stdout } else { stderr };
    match text.trim() {
        "" => "no output".to_string(),
        trimmed => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_includes_path() {
        let err = ValidationError::required("ssh_repositories[2].git_ssh");
        assert_eq!(err.to_string(), "ssh_repositories[2].git_ssh: required");
    }

    #[test]
    fn test_execution_error_prefers_stderr() {
        let err = ExecutionError::Failed {
            command: "git pull".to_string(),
            status: "exit status: 1".to_string(),
            stdout: "partial".to_string(),
            stderr: "fatal: not a git repository\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "`git pull` exited with exit status: 1: fatal: not a git repository"
        );
    }

    #[test]
    fn test_execution_error_falls_back_to_stdout() {
        let err = ExecutionError::Failed {
            command: "xdg-open x".to_string(),
            status: "exit status: 4".to_string(),
            stdout: "no handler".to_string(),
            stderr: "   ".to_string(),
        };
        assert!(err.to_string().ends_with("no handler"));
    }
}
