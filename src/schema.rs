//! Manifest schema validation
//!
//! The configuration document is first read into an untyped
//! [`serde_yaml::Value`] and then walked here, so that the first structural
//! violation can be reported together with the field path it occurred at.
//! Validation is all-or-nothing: either the whole document becomes a
//! [`Configs`], or a single [`ValidationError`] is returned.

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::ValidationError;

/// Category tag of a repository; `None` means uncategorized
pub type Category = Option<String>;

/// Per-repository options; absent fields inherit defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryOptions {
    pub domain: Option<String>,
    pub sync: Option<bool>,
    pub link: Option<String>,
}

/// A GitHub repository entry: either just a category, or a category plus
/// explicit option overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GithubRepositoryEntry {
    Bare {
        category: Category,
    },
    WithOptions {
        category: Category,
        options: RepositoryOptions,
    },
}

impl GithubRepositoryEntry {
    pub fn category(&self) -> Option<&str> {
        match self {
            Self::Bare { category } | Self::WithOptions { category, .. } => category.as_deref(),
        }
    }
}

/// One named repository inside a GitHub group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubRepository {
    pub name: String,
    pub entry: GithubRepositoryEntry,
}

/// A GitHub group (the owner account or organization) and its repositories,
/// in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubGroup {
    pub name: String,
    pub repositories: Vec<GithubRepository>,
}

/// An explicitly listed repository reachable over SSH
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshRepositoryEntry {
    pub domain: String,
    pub category: Category,
    pub git_ssh: String,
    pub sync: Option<bool>,
    pub link: Option<String>,
}

/// Commands used to open things in external tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenCommand {
    /// Template for opening a local repository, e.g. `code {path}`
    pub repository: String,
}

/// The validated configuration document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configs {
    /// Root directory that holds the local clones
    pub path: String,
    pub open_command: OpenCommand,
    pub github_repositories: Vec<GithubGroup>,
    pub ssh_repositories: Vec<SshRepositoryEntry>,
}

/// Validate a raw document and convert it into [`Configs`].
pub fn parse(raw: &Value) -> Result<Configs, ValidationError> {
    let root = expect_mapping(raw, "")?;
    log_unknown_keys(
        root,
        "",
        &["path", "open_command", "github_repositories", "ssh_repositories"],
    );

    let path = required_string(root, "", "path")?;
    if path.trim().is_empty() {
        return Err(ValidationError::new("path", "must not be empty"));
    }

    let open_command_raw = required(root, "", "open_command")?;
    let open_command_map = expect_mapping(open_command_raw, "open_command")?;
    let open_command = OpenCommand {
        repository: required_string(open_command_map, "open_command", "repository")?,
    };

    let github_raw = required(root, "", "github_repositories")?;
    let github_repositories = parse_github_groups(github_raw)?;

    let ssh_raw = required(root, "", "ssh_repositories")?;
    let ssh_repositories = parse_ssh_repositories(ssh_raw)?;

    Ok(Configs {
        path,
        open_command,
        github_repositories,
        ssh_repositories,
    })
}

fn parse_github_groups(raw: &Value) -> Result<Vec<GithubGroup>, ValidationError> {
    let groups = expect_mapping(raw, "github_repositories")?;
    let mut parsed = Vec::with_capacity(groups.len());

    for (group_key, group_value) in groups {
        let group_name = expect_key(group_key, "github_repositories")?;
        let group_path = join_key("github_repositories", &group_name);
        let repos = expect_mapping(group_value, &group_path)?;

        let mut repositories = Vec::with_capacity(repos.len());
        for (repo_key, repo_value) in repos {
            let name = expect_key(repo_key, &group_path)?;
            let repo_path = join_key(&group_path, &name);
            let entry = parse_github_entry(repo_value, &repo_path)?;
            repositories.push(GithubRepository { name, entry });
        }

        parsed.push(GithubGroup {
            name: group_name,
            repositories,
        });
    }

    Ok(parsed)
}

fn parse_github_entry(raw: &Value, path: &str) -> Result<GithubRepositoryEntry, ValidationError> {
    let items = match raw {
        Value::Sequence(items) => items,
        other => {
            return Err(ValidationError::new(
                path,
                format!("expected [category] or [category, options], found {}", kind(other)),
            ))
        }
    };

    match items.as_slice() {
        [category] => Ok(GithubRepositoryEntry::Bare {
            category: parse_category(category, &join_index(path, 0))?,
        }),
        [category, options] => Ok(GithubRepositoryEntry::WithOptions {
            category: parse_category(category, &join_index(path, 0))?,
            options: parse_options(options, &join_index(path, 1))?,
        }),
        _ => Err(ValidationError::new(
            path,
            format!("expected 1 or 2 items, found {}", items.len()),
        )),
    }
}

fn parse_options(raw: &Value, path: &str) -> Result<RepositoryOptions, ValidationError> {
    let map = expect_mapping(raw, path)?;
    log_unknown_keys(map, path, &["domain", "sync", "link"]);

    Ok(RepositoryOptions {
        domain: optional_string(map, path, "domain")?,
        sync: optional_bool(map, path, "sync")?,
        link: optional_string(map, path, "link")?,
    })
}

fn parse_ssh_repositories(raw: &Value) -> Result<Vec<SshRepositoryEntry>, ValidationError> {
    let items = match raw {
        Value::Sequence(items) => items,
        other => {
            return Err(ValidationError::new(
                "ssh_repositories",
                format!("expected sequence, found {}", kind(other)),
            ))
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let path = join_index("ssh_repositories", index);
            let map = expect_mapping(item, &path)?;
            log_unknown_keys(map, &path, &["domain", "category", "git_ssh", "sync", "link"]);

            Ok(SshRepositoryEntry {
                domain: required_string(map, &path, "domain")?,
                category: parse_category(required(map, &path, "category")?, &join_key(&path, "category"))?,
                git_ssh: required_string(map, &path, "git_ssh")?,
                sync: optional_bool(map, &path, "sync")?,
                link: optional_string(map, &path, "link")?,
            })
        })
        .collect()
}

fn parse_category(raw: &Value, path: &str) -> Result<Category, ValidationError> {
    match raw {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(ValidationError::new(
            path,
            format!("expected string or null, found {}", kind(other)),
        )),
    }
}

// Field access helpers

fn required<'a>(map: &'a Mapping, parent: &str, key: &str) -> Result<&'a Value, ValidationError> {
    map.get(key)
        .ok_or_else(|| ValidationError::required(join_key(parent, key)))
}

fn required_string(map: &Mapping, parent: &str, key: &str) -> Result<String, ValidationError> {
    let value = required(map, parent, key)?;
    expect_string(value, &join_key(parent, key))
}

fn optional_string(map: &Mapping, parent: &str, key: &str) -> Result<Option<String>, ValidationError> {
    map.get(key)
        .map(|value| expect_string(value, &join_key(parent, key)))
        .transpose()
}

fn optional_bool(map: &Mapping, parent: &str, key: &str) -> Result<Option<bool>, ValidationError> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(ValidationError::new(
            join_key(parent, key),
            format!("expected boolean, found {}", kind(other)),
        )),
    }
}

fn expect_string(value: &Value, path: &str) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(ValidationError::new(
            path,
            format!("expected string, found {}", kind(other)),
        )),
    }
}

fn expect_mapping<'a>(value: &'a Value, path: &str) -> Result<&'a Mapping, ValidationError> {
    match value {
        Value::Mapping(map) => Ok(map),
        other => Err(ValidationError::new(
            display_path(path),
            format!("expected mapping, found {}", kind(other)),
        )),
    }
}

fn expect_key(key: &Value, parent: &str) -> Result<String, ValidationError> {
    match key {
        Value::String(s) => Ok(s.clone()),
        other => Err(ValidationError::new(
            display_path(parent),
            format!("expected string keys, found {} key", kind(other)),
        )),
    }
}

fn log_unknown_keys(map: &Mapping, path: &str, known: &[&str]) {
    for key in map.keys() {
        let is_known = key.as_str().map(|k| known.contains(&k)).unwrap_or(false);
        if !is_known {
            debug!("Ignoring unknown key {:?} in {}", key, display_path(path));
        }
    }
}

fn join_key(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn join_index(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

// Conversion back into a document

impl Configs {
    /// Render the configuration back into a YAML value with the same shape
    /// it was parsed from.
    pub fn to_value(&self) -> Value {
        let mut open_command = Mapping::new();
        open_command.insert("repository".into(), self.open_command.repository.clone().into());

        let mut groups = Mapping::new();
        for group in &self.github_repositories {
            let mut repos = Mapping::new();
            for repo in &group.repositories {
                repos.insert(repo.name.clone().into(), repo.entry.to_value());
            }
            groups.insert(group.name.clone().into(), Value::Mapping(repos));
        }

        let ssh = self
            .ssh_repositories
            .iter()
            .map(SshRepositoryEntry::to_value)
            .collect();

        let mut root = Mapping::new();
        root.insert("path".into(), self.path.clone().into());
        root.insert("open_command".into(), Value::Mapping(open_command));
        root.insert("github_repositories".into(), Value::Mapping(groups));
        root.insert("ssh_repositories".into(), Value::Sequence(ssh));
        Value::Mapping(root)
    }
}

impl GithubRepositoryEntry {
    fn to_value(&self) -> Value {
        match self {
            Self::Bare { category } => Value::Sequence(vec![category_value(category)]),
            Self::WithOptions { category, options } => {
                Value::Sequence(vec![category_value(category), options.to_value()])
            }
        }
    }
}

impl RepositoryOptions {
    fn to_value(&self) -> Value {
        let mut map = Mapping::new();
        if let Some(domain) = &self.domain {
            map.insert("domain".into(), domain.clone().into());
        }
        if let Some(sync) = self.sync {
            map.insert("sync".into(), sync.into());
        }
        if let Some(link) = &self.link {
            map.insert("link".into(), link.clone().into());
        }
        Value::Mapping(map)
    }
}

impl SshRepositoryEntry {
    fn to_value(&self) -> Value {
        let mut map = Mapping::new();
        map.insert("domain".into(), self.domain.clone().into());
        map.insert("category".into(), category_value(&self.category));
        map.insert("git_ssh".into(), self.git_ssh.clone().into());
        if let Some(sync) = self.sync {
            map.insert("sync".into(), sync.into());
        }
        if let Some(link) = &self.link {
            map.insert("link".into(), link.clone().into());
        }
        Value::Mapping(map)
    }
}

fn category_value(category: &Category) -> Value {
    match category {
        Some(c) => c.clone().into(),
        None => Value::Null,
    }
}
