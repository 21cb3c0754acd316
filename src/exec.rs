//! External command execution
//!
//! All OS commands (git, openers, the user's open command) go through the
//! [`CommandRunner`] trait so that callers can be exercised without
//! spawning processes.

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command as AsyncCommand;
use tracing::debug;

use crate::error::ExecutionError;

/// A program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {:?}", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output with surrounding whitespace trimmed
    pub stdout: String,
    pub stderr: String,
}

/// Runs commands to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command and wait for it. A non-zero exit is an
    /// [`ExecutionError::Failed`] carrying the captured output.
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, ExecutionError>;
}

/// Spawns real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, ExecutionError> {
        debug!("Running: {}", command);

        let mut process = AsyncCommand::new(&command.program);
        process.args(&command.args);
        if let Some(dir) = &command.current_dir {
            process.current_dir(dir);
        }

        let output = process.output().await.map_err(|source| ExecutionError::Spawn {
            command: command.to_string(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(ExecutionError::Failed {
                command: command.to_string(),
                status: output.status.to_string(),
                stdout,
                stderr,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

/// Wait before the next step
pub async fn delay(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Fill an open command template. `{path}` becomes the local folder and
/// `{name}` the repository name, both quoted for the platform shell. A
/// template without `{path}` gets the path appended.
pub fn render_template(template: &str, name: &str, path: &Path) -> String {
    let quoted_path = shell_quote(&path.display().to_string());
    let quoted_name = shell_quote(name);

    if template.contains("{path}") {
        template
            .replace("{path}", &quoted_path)
            .replace("{name}", &quoted_name)
    } else {
        format!(
            "{} {}",
            template.replace("{name}", &quoted_name).trim_end(),
            quoted_path
        )
    }
}

/// Quote a value for `sh -c`. Values made only of characters the shell
/// treats literally are returned unchanged.
#[cfg(not(windows))]
pub fn shell_quote(value: &str) -> String {
    if is_shell_safe(value, "/._-+:,@=%") {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}

/// Quote a value for `cmd /C`. Windows paths cannot contain `"`, so double
/// quoting is enough to keep `&`, `|` and spaces literal.
#[cfg(windows)]
pub fn shell_quote(value: &str) -> String {
    if is_shell_safe(value, "\\/._-+:,@=") {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('"', "\"\""))
    }
}

fn is_shell_safe(value: &str, extra: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || extra.contains(c))
}
