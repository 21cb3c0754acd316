//! Option inheritance
//!
//! Turns manifest entries into [`ResolvedRepository`] values. There are
//! exactly two levels: an entry's explicit value wins, otherwise the
//! inherited default applies.

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::error::ResolveError;
use crate::schema::{Configs, GithubRepositoryEntry, RepositoryOptions, SshRepositoryEntry};

pub const DEFAULT_GITHUB_DOMAIN: &str = "github.com";

/// Defaults an entry falls back to when it does not set an option itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritedOptions {
    pub domain: Option<String>,
    pub sync: bool,
    pub link: Option<String>,
}

impl InheritedOptions {
    /// Defaults for every repository listed under a GitHub group
    pub fn github() -> Self {
        Self {
            domain: Some(DEFAULT_GITHUB_DOMAIN.to_string()),
            sync: false,
            link: None,
        }
    }

    /// Defaults for SSH entries; their domain is always explicit
    pub fn ssh() -> Self {
        Self {
            domain: None,
            sync: false,
            link: None,
        }
    }
}

/// Where a resolved repository was declared
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Source {
    /// Listed under `github_repositories.<owner>`
    Github { owner: String },
    /// Listed in `ssh_repositories`
    Ssh { git_ssh: String },
}

impl Source {
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Github { .. } => "github",
            Source::Ssh { .. } => "ssh",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Github { owner } => write!(f, "github_repositories.{}", owner),
            Source::Ssh { git_ssh } => write!(f, "ssh_repositories ({})", git_ssh),
        }
    }
}

/// A repository after option inheritance has been applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRepository {
    pub name: String,
    pub category: Option<String>,
    pub domain: Option<String>,
    pub sync: bool,
    pub link: Option<String>,
    pub source: Source,
}

impl ResolvedRepository {
    /// URL used to clone the repository
    pub fn clone_url(&self) -> String {
        match &self.source {
            Source::Github { owner } => format!(
                "git@{}:{}/{}.git",
                self.domain.as_deref().unwrap_or(DEFAULT_GITHUB_DOMAIN),
                owner,
                self.name
            ),
            Source::Ssh { git_ssh } => git_ssh.clone(),
        }
    }

    /// Browser URL: the explicit `link` if set, otherwise derived from the remote
    pub fn web_url(&self) -> Option<String> {
        if let Some(link) = &self.link {
            return Some(link.clone());
        }

        let domain = self.domain.as_deref()?;
        match &self.source {
            Source::Github { owner } => Some(format!("https://{}/{}/{}", domain, owner, self.name)),
            Source::Ssh { git_ssh } => {
                let repo_path = ssh_repository_path(git_ssh)?;
                Some(format!("https://{}/{}", domain, repo_path))
            }
        }
    }
}

/// Repository path of an SSH remote without the `.git` suffix.
///
/// Accepts both the scp form `user@host:group/repo.git` and the URL form
/// `ssh://user@host[:port]/group/repo.git`.
fn ssh_repository_path(remote: &str) -> Option<&str> {
    let repo_path = match remote.split_once("://") {
        Some((_, rest)) => rest.split_once('/')?.1,
        None => remote.split_once(':')?.1,
    };

    let repo_path = repo_path.trim_start_matches('/').trim_end_matches(".git");
    (!repo_path.is_empty()).then_some(repo_path)
}

/// Extract the repository name from an SSH clone URL.
///
/// The name is the path segment right before the trailing `.git`:
/// `git@host:org/myrepo.git` gives `myrepo`. Returns `None` when the URL
/// has no such segment.
pub fn extract_repository_name(url: &str) -> Option<&str> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r"/([^/]+)\.git$").expect("unable to compile repository name regex"));

    pattern
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Resolve one GitHub entry against the group defaults.
pub fn resolve_github(
    owner: &str,
    name: &str,
    entry: &GithubRepositoryEntry,
    inherited: &InheritedOptions,
) -> ResolvedRepository {
    let (category, options) = match entry {
        GithubRepositoryEntry::Bare { category } => (category.clone(), None),
        GithubRepositoryEntry::WithOptions { category, options } => (category.clone(), Some(options)),
    };

    let merged = merge(options, inherited);

    ResolvedRepository {
        name: name.to_string(),
        category,
        domain: merged.domain,
        sync: merged.sync,
        link: merged.link,
        source: Source::Github {
            owner: owner.to_string(),
        },
    }
}

/// Resolve one SSH entry. Domain and category are always taken from the
/// entry; only `sync` and `link` inherit.
pub fn resolve_ssh(
    entry: &SshRepositoryEntry,
    inherited: &InheritedOptions,
) -> Result<ResolvedRepository, ResolveError> {
    let name = extract_repository_name(&entry.git_ssh).ok_or_else(|| ResolveError::UnresolvableName {
        url: entry.git_ssh.clone(),
    })?;

    Ok(ResolvedRepository {
        name: name.to_string(),
        category: entry.category.clone(),
        domain: Some(entry.domain.clone()),
        sync: entry.sync.unwrap_or(inherited.sync),
        link: entry.link.clone().or_else(|| inherited.link.clone()),
        source: Source::Ssh {
            git_ssh: entry.git_ssh.clone(),
        },
    })
}

fn merge(options: Option<&RepositoryOptions>, inherited: &InheritedOptions) -> InheritedOptions {
    match options {
        None => inherited.clone(),
        Some(options) => InheritedOptions {
            domain: options.domain.clone().or_else(|| inherited.domain.clone()),
            sync: options.sync.unwrap_or(inherited.sync),
            link: options.link.clone().or_else(|| inherited.link.clone()),
        },
    }
}

/// Every repository of a manifest, resolved, plus the entries that had to
/// be skipped.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub repositories: Vec<ResolvedRepository>,
    pub skipped: Vec<ResolveError>,
}

/// Resolve all entries of a manifest in declaration order: GitHub groups
/// first, then SSH entries.
///
/// SSH entries whose name cannot be derived are skipped and reported in
/// [`Resolution::skipped`]. Two entries resolving to the same name reject
/// the whole manifest.
pub fn resolve_manifest(configs: &Configs) -> Result<Resolution, ResolveError> {
    let github_defaults = InheritedOptions::github();
    let ssh_defaults = InheritedOptions::ssh();

    let mut resolution = Resolution::default();

    for group in &configs.github_repositories {
        for repo in &group.repositories {
            resolution
                .repositories
                .push(resolve_github(&group.name, &repo.name, &repo.entry, &github_defaults));
        }
    }

    for entry in &configs.ssh_repositories {
        match resolve_ssh(entry, &ssh_defaults) {
            Ok(repo) => resolution.repositories.push(repo),
            Err(e) => {
                warn!("Skipping SSH repository: {}", e);
                resolution.skipped.push(e);
            }
        }
    }

    reject_duplicates(&resolution.repositories)?;

    debug!(
        "Resolved {} repositories ({} skipped)",
        resolution.repositories.len(),
        resolution.skipped.len()
    );

    Ok(resolution)
}

fn reject_duplicates(repositories: &[ResolvedRepository]) -> Result<(), ResolveError> {
    let mut seen: HashMap<&str, &Source> = HashMap::new();

    for repo in repositories {
        if let Some(first) = seen.insert(&repo.name, &repo.source) {
            return Err(ResolveError::DuplicateName {
                name: repo.name.clone(),
                first: first.to_string(),
                second: repo.source.to_string(),
            });
        }
    }

    Ok(())
}
