//! Reconciliation of the manifest against local folders
//!
//! Matches resolved repositories with folders found on disk by exact,
//! case-sensitive name and classifies each one.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

use crate::error::ResolveError;
use crate::resolve::ResolvedRepository;
use crate::scan::LocalFolder;

/// Classification of a repository or folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Declared in the manifest and found on disk
    Present,
    /// Declared in the manifest but not found on disk
    Missing,
    /// Found on disk but not declared in the manifest
    Untracked,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Present => "present",
            Status::Missing => "missing",
            Status::Untracked => "untracked",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "present" => Ok(Status::Present),
            "missing" => Ok(Status::Missing),
            "untracked" => Ok(Status::Untracked),
            other => Err(format!(
                "unknown status '{}' (expected present, missing or untracked)",
                other
            )),
        }
    }
}

/// A manifest repository together with its classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledRepository {
    pub repository: ResolvedRepository,
    pub status: Status,
    /// Local folder the repository was matched with, if any
    pub path: Option<PathBuf>,
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    /// Manifest repositories in declaration order
    pub repositories: Vec<ReconciledRepository>,
    /// Folders matching no manifest repository, sorted by name then path
    pub untracked: Vec<LocalFolder>,
    /// Manifest entries that could not be matched at all
    #[serde(serialize_with = "serialize_issues")]
    pub issues: Vec<ResolveError>,
}

/// Classify every resolved repository as present or missing, and every
/// unmatched local folder as untracked.
///
/// When several folders share a repository's name, the first one in scan
/// order is recorded as its location.
pub fn reconcile(
    resolved: &[ResolvedRepository],
    local: &[LocalFolder],
    issues: Vec<ResolveError>,
) -> ReconcileReport {
    let mut by_name: HashMap<&str, &LocalFolder> = HashMap::new();
    for folder in local {
        by_name.entry(folder.name.as_str()).or_insert(folder);
    }

    let repositories: Vec<ReconciledRepository> = resolved
        .iter()
        .map(|repo| {
            let matched = by_name.get(repo.name.as_str());
            ReconciledRepository {
                repository: repo.clone(),
                status: if matched.is_some() {
                    Status::Present
                } else {
                    Status::Missing
                },
                path: matched.map(|folder| folder.path.clone()),
            }
        })
        .collect();

    let declared: HashSet<&str> = resolved.iter().map(|r| r.name.as_str()).collect();
    let mut untracked: Vec<LocalFolder> = local
        .iter()
        .filter(|folder| !declared.contains(folder.name.as_str()))
        .cloned()
        .collect();
    untracked.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));

    debug!(
        "Reconciled {} repositories against {} folders: {} untracked",
        repositories.len(),
        local.len(),
        untracked.len()
    );

    ReconcileReport {
        repositories,
        untracked,
        issues,
    }
}

impl ReconcileReport {
    /// Name to status mapping. Untracked folders appear under their folder
    /// name.
    pub fn statuses(&self) -> BTreeMap<String, Status> {
        let mut statuses: BTreeMap<String, Status> = self
            .untracked
            .iter()
            .map(|folder| (folder.name.clone(), Status::Untracked))
            .collect();

        for entry in &self.repositories {
            statuses.insert(entry.repository.name.clone(), entry.status);
        }

        statuses
    }

    /// Look up a manifest repository by exact name
    pub fn find(&self, name: &str) -> Option<&ReconciledRepository> {
        self.repositories.iter().find(|entry| entry.repository.name == name)
    }

    /// Number of manifest repositories with the given status
    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::Untracked => self.untracked.len(),
            _ => self.repositories.iter().filter(|e| e.status == status).count(),
        }
    }

    /// Manifest repositories grouped by category. Named categories come in
    /// sorted order; uncategorized repositories come last.
    pub fn by_category(&self) -> Vec<(Option<&str>, Vec<&ReconciledRepository>)> {
        let mut named: BTreeMap<&str, Vec<&ReconciledRepository>> = BTreeMap::new();
        let mut uncategorized = Vec::new();

        for entry in &self.repositories {
            match entry.repository.category.as_deref() {
                Some(category) => named.entry(category).or_default().push(entry),
                None => uncategorized.push(entry),
            }
        }

        let mut groups: Vec<_> = named
            .into_iter()
            .map(|(category, entries)| (Some(category), entries))
            .collect();
        if !uncategorized.is_empty() {
            groups.push((None, uncategorized));
        }
        groups
    }
}

fn serialize_issues<S>(issues: &[ResolveError], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(issues.iter().map(|issue| issue.to_string()))
}
