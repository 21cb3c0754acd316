mod common;

use assert_cmd::Command;
use common::{TestEnvironment, MIXED_MANIFEST};
use predicates::prelude::*;

// Integration tests for repokeeper CLI commands
// These tests run the actual binary against temporary configurations

fn repokeeper() -> Command {
    Command::cargo_bin("repokeeper").expect("binary is built")
}

#[test]
fn test_cli_help() {
    repokeeper()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("open"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("sync"));
}

#[test]
fn test_cli_version() {
    repokeeper()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("repokeeper"));
}

#[test]
fn test_invalid_command() {
    repokeeper()
        .arg("nonexistent-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized").or(predicate::str::contains("error")));
}

#[test]
fn test_list_shows_statuses_by_category() {
    let env = TestEnvironment::new();
    env.add_clone("api");
    env.add_clone("scratch");
    env.add_plain_dir("notes");
    let config = env.write_config(MIXED_MANIFEST);

    repokeeper()
        .arg("--config")
        .arg(config)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("work (2)"))
        .stdout(predicate::str::contains("uncategorized (1)"))
        .stdout(predicate::str::contains("untracked (1)"))
        .stdout(predicate::str::contains("scratch"))
        .stdout(predicate::str::contains("notes").not())
        .stdout(predicate::str::contains("1 present, 2 missing, 1 untracked"));
}

#[test]
fn test_list_json_report() {
    let env = TestEnvironment::new();
    env.add_clone("nested/group/infra");
    let config = env.write_config(MIXED_MANIFEST);

    let output = repokeeper()
        .arg("--config")
        .arg(config)
        .args(["list", "--json"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");

    let repositories = report["repositories"].as_array().expect("repositories array");
    assert_eq!(repositories.len(), 3);

    let infra = repositories
        .iter()
        .find(|r| r["repository"]["name"] == "infra")
        .expect("infra is listed");
    assert_eq!(infra["status"], "present");
    assert_eq!(infra["repository"]["source"]["kind"], "ssh");
    assert!(infra["path"]
        .as_str()
        .expect("path is set")
        .ends_with("infra"));
}

#[test]
fn test_list_status_filter() {
    let env = TestEnvironment::new();
    env.add_clone("api");
    env.add_clone("scratch");
    let config = env.write_config(MIXED_MANIFEST);

    repokeeper()
        .arg("--config")
        .arg(config)
        .args(["list", "--status", "missing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("site"))
        .stdout(predicate::str::contains("infra"))
        .stdout(predicate::str::contains("scratch").not());
}

#[test]
fn test_schema_error_reports_field_path() {
    let env = TestEnvironment::new();
    let config = env.write_config(
        "github_repositories: {}\nssh_repositories:\n  - domain: gitlab.com\n    category: null\n",
    );

    repokeeper()
        .arg("--config")
        .arg(config)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ERROR"))
        .stderr(predicate::str::contains("ssh_repositories[0].git_ssh: required"));
}

#[test]
fn test_error_handling_invalid_yaml() {
    let env = TestEnvironment::new();
    let config = env.write_raw_config("invalid: yaml: content: [");

    repokeeper()
        .arg("--config")
        .arg(config)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn test_duplicate_names_are_rejected() {
    let env = TestEnvironment::new();
    let config = env.write_config(
        r#"github_repositories:
  octocat:
    infra: [null]
ssh_repositories:
  - domain: gitlab.com
    category: null
    git_ssh: git@gitlab.com:team/infra.git
"#,
    );

    repokeeper()
        .arg("--config")
        .arg(config)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("declared twice"));
}

#[test]
fn test_unresolvable_ssh_name_is_a_warning() {
    let env = TestEnvironment::new();
    let config = env.write_config(
        r#"github_repositories: {}
ssh_repositories:
  - domain: gitlab.com
    category: null
    git_ssh: git@gitlab.com:team/infra
"#,
    );

    repokeeper()
        .arg("--config")
        .arg(config)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("cannot derive a repository name"));
}

#[test]
fn test_config_print_path() {
    let env = TestEnvironment::new();
    let config = env.write_config(MIXED_MANIFEST);

    repokeeper()
        .args(["config", "--print-path", "--config"])
        .arg(config)
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yml"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_starter_config_is_created() {
    let env = TestEnvironment::new();
    let xdg = env.temp_dir.path().join("xdg");

    repokeeper()
        .args(["config", "--print-path"])
        .env("XDG_CONFIG_HOME", &xdg)
        .assert()
        .success();

    assert!(xdg.join("repokeeper").join("config.yml").exists());
}

#[test]
fn test_open_unknown_repository() {
    let env = TestEnvironment::new();
    let config = env.write_config(MIXED_MANIFEST);

    repokeeper()
        .arg("--config")
        .arg(config)
        .args(["open", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not in the configuration"));
}

#[test]
fn test_open_missing_repository_suggests_sync() {
    let env = TestEnvironment::new();
    let config = env.write_config(MIXED_MANIFEST);

    repokeeper()
        .arg("--config")
        .arg(config)
        .args(["open", "site"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("repokeeper sync"));
}

#[cfg(unix)]
#[test]
fn test_open_present_repository_runs_open_command() {
    let env = TestEnvironment::new();
    env.add_clone("api");
    let config = env.write_config(MIXED_MANIFEST);

    // The test config's open command is `true {path}`.
    repokeeper()
        .arg("--config")
        .arg(config)
        .args(["open", "api"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SUCCESS"));
}

#[test]
fn test_sync_dry_run_plans_clone_and_pull() {
    let env = TestEnvironment::new();
    env.add_clone("api");
    let config = env.write_config(MIXED_MANIFEST);

    repokeeper()
        .arg("--config")
        .arg(config)
        .args(["sync", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api: pull"))
        .stdout(predicate::str::contains(
            "infra: clone git@gitlab.com:team/infra.git",
        ))
        .stdout(predicate::str::contains("site").not())
        .stdout(predicate::str::contains("2 repositories would be synced"));
}
