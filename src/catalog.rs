//! One reconciliation pass: resolve the manifest, scan the root, match them

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ScanError;
use crate::reconcile::{reconcile, ReconcileReport};
use crate::resolve::resolve_manifest;
use crate::scan::{git_working_copies, scan, LocalFolder};

/// Build the categorized view of tracked, missing and untracked repositories.
///
/// A root directory that does not exist yet counts as empty, so every
/// declared repository is reported missing.
pub fn build_report(config: &Config) -> Result<ReconcileReport> {
    let resolution = resolve_manifest(&config.manifest).context("Invalid repository manifest")?;

    let folders = match scan(&config.root) {
        Ok(folders) => folders,
        Err(ScanError::MissingRoot(root)) => {
            warn!("Repository root {} does not exist yet", root.display());
            Vec::new()
        }
        Err(e) => return Err(e).context("Failed to scan repository root"),
    };

    let local: Vec<LocalFolder> = git_working_copies(&folders);
    info!(
        "Found {} git working copies under {}",
        local.len(),
        config.root.display()
    );

    Ok(reconcile(&resolution.repositories, &local, resolution.skipped))
}
