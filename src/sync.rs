//! Sync - brings `sync: true` repositories up to date
//!
//! Missing repositories are cloned into the root directory, present ones
//! are pulled. Work is strictly sequential with a short pause between
//! repositories.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::exec::{delay, CommandRunner, CommandSpec};
use crate::reconcile::{ReconcileReport, Status};

/// Pause between two repositories
pub const SYNC_DELAY: Duration = Duration::from_millis(300);

/// What to do for one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    Clone { url: String, target: PathBuf },
    Pull { path: PathBuf },
}

impl SyncAction {
    /// The git invocation performing this action
    pub fn command(&self) -> CommandSpec {
        match self {
            SyncAction::Clone { url, target } => CommandSpec::new("git")
                .args(["clone", url.as_str()])
                .arg(target.display().to_string()),
            SyncAction::Pull { path } => CommandSpec::new("git")
                .args(["pull", "--ff-only"])
                .current_dir(path),
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Clone { url, target } => write!(f, "clone {} -> {}", url, target.display()),
            SyncAction::Pull { path } => write!(f, "pull {}", path.display()),
        }
    }
}

/// One planned unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTask {
    pub name: String,
    pub action: SyncAction,
}

/// Result of a single task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncResult {
    Cloned { name: String, path: PathBuf },
    Pulled { name: String, path: PathBuf },
    Failed { name: String, error: String },
}

/// Results from a complete sync run
#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub total_repositories: usize,
    pub successful_operations: usize,
    pub failed_operations: usize,
    pub duration: Duration,
    pub results: Vec<SyncResult>,
}

impl SyncSummary {
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.results.iter().filter_map(|result| match result {
            SyncResult::Failed { name, error } => Some((name.as_str(), error.as_str())),
            _ => None,
        })
    }
}

/// Plans and runs sync tasks one after another
pub struct SyncEngine<R: CommandRunner> {
    runner: R,
    root: PathBuf,
    pause: Duration,
}

impl<R: CommandRunner> SyncEngine<R> {
    pub fn new(runner: R, root: impl AsRef<Path>) -> Self {
        Self {
            runner,
            root: root.as_ref().to_path_buf(),
            pause: SYNC_DELAY,
        }
    }

    /// Override the pause between repositories
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Decide what to do for every `sync: true` repository in the report
    pub fn plan(&self, report: &ReconcileReport) -> Vec<SyncTask> {
        report
            .repositories
            .iter()
            .filter(|entry| entry.repository.sync)
            .filter_map(|entry| {
                let name = entry.repository.name.clone();
                let action = match (entry.status, &entry.path) {
                    (Status::Present, Some(path)) => SyncAction::Pull { path: path.clone() },
                    (Status::Missing, _) => SyncAction::Clone {
                        url: entry.repository.clone_url(),
                        target: self.root.join(&entry.repository.name),
                    },
                    _ => return None,
                };
                Some(SyncTask { name, action })
            })
            .collect()
    }

    /// Run tasks in order. `progress` is called before each task with its
    /// 1-based position. Failures are recorded and do not stop the run.
    pub async fn run<F>(&self, tasks: &[SyncTask], mut progress: F) -> SyncSummary
    where
        F: FnMut(usize, usize, &SyncTask),
    {
        let start_time = Instant::now();
        let mut results = Vec::with_capacity(tasks.len());

        for (index, task) in tasks.iter().enumerate() {
            if index > 0 && !self.pause.is_zero() {
                delay(self.pause).await;
            }

            progress(index + 1, tasks.len(), task);
            info!("Sync {}: {}", task.name, task.action);

            let result = match self.runner.run(&task.action.command()).await {
                Ok(_) => match &task.action {
                    SyncAction::Clone { target, .. } => SyncResult::Cloned {
                        name: task.name.clone(),
                        path: target.clone(),
                    },
                    SyncAction::Pull { path } => SyncResult::Pulled {
                        name: task.name.clone(),
                        path: path.clone(),
                    },
                },
                Err(e) => {
                    warn!("Sync failed for {}: {}", task.name, e);
                    SyncResult::Failed {
                        name: task.name.clone(),
                        error: e.to_string(),
                    }
                }
            };
            results.push(result);
        }

        let failed_operations = results
            .iter()
            .filter(|r| matches!(r, SyncResult::Failed { .. }))
            .count();

        SyncSummary {
            total_repositories: tasks.len(),
            successful_operations: results.len() - failed_operations,
            failed_operations,
            duration: start_time.elapsed(),
            results,
        }
    }
}
