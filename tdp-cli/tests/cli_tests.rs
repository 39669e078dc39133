//! Integration tests for the tdp CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get the tdp binary
#[allow(deprecated)]
fn tdp_cmd() -> Command {
    let mut cmd = Command::cargo_bin("tdp").unwrap();
    cmd.env_remove("TDP_DATABASE_URL")
        .env_remove("TDP_LOG_LEVEL")
        .env_remove("TDP_LOG_FORMAT");
    cmd
}

fn fixture(pack: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../tests/fixtures/schema")
        .join(pack)
}

/// A temp directory holding the database file.
struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn url(&self) -> String {
        format!("sqlite://{}", self.dir.path().join("app.db").display())
    }

    /// Command running in the project directory against its database.
    fn cmd(&self, args: &[&str]) -> Command {
        let url = self.url();
        let mut cmd = tdp_cmd();
        cmd.current_dir(self.dir.path())
            .args(["--database", url.as_str()])
            .args(args);
        cmd
    }

    fn cmd_with_packs(&self, args: &[&str], packs: &[&str]) -> Command {
        let mut cmd = self.cmd(args);
        for pack in packs {
            cmd.arg(fixture(pack));
        }
        cmd
    }
}

#[test]
fn test_help_command() {
    tdp_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tiny Database Patcher"))
        .stdout(predicate::str::contains("Usage: tdp"))
        .stdout(predicate::str::contains("upgrade"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("retrofit"))
        .stdout(predicate::str::contains("rename"));
}

#[test]
fn test_version_command() {
    tdp_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("Version"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_rename_help() {
    tdp_cmd()
        .args(["rename", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_missing_database_url() {
    let project = Project::new();
    tdp_cmd()
        .current_dir(project.dir.path())
        .arg("init")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no database URL"));
}

#[test]
fn test_init_creates_database() {
    let project = Project::new();
    project
        .cmd(&["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tdp_patch"));

    assert!(project.dir.path().join("app.db").exists());
}

#[test]
fn test_init_writes_starter_config() {
    let project = Project::new();
    project
        .cmd(&["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created tdp.toml"));

    let written = fs::read_to_string(project.dir.path().join("tdp.toml")).unwrap();
    assert!(written.contains(&project.url()));

    // The database URL now comes from the starter config.
    tdp_cmd()
        .current_dir(project.dir.path())
        .arg("plan")
        .arg(fixture("pack-1"))
        .assert()
        .success()
        .stdout(predicate::str::contains("001-initial-schema.sql"));
}

#[test]
fn test_plan_json() {
    let project = Project::new();
    let output = project
        .cmd_with_packs(&["plan", "--json"], &["pack-1", "pack-2"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = plan
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["001-initial-schema.sql", "002-minor-changes.sql", "views.sql"]
    );
    assert_eq!(plan[0]["kind"], "permanent");
    assert_eq!(plan[2]["kind"], "volatile");
}

#[test]
fn test_upgrade_then_plan_is_empty() {
    let project = Project::new();
    project
        .cmd_with_packs(&["upgrade"], &["pack-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("001-initial-schema.sql"))
        .stdout(predicate::str::contains("2 patches applied"));

    project
        .cmd_with_packs(&["plan"], &["pack-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));

    project
        .cmd_with_packs(&["validate", "--compatible"], &["pack-1"])
        .assert()
        .success();
}

#[test]
fn test_mismatch_exits_with_code_2() {
    let project = Project::new();
    project
        .cmd_with_packs(&["upgrade"], &["pack-1"])
        .assert()
        .success();

    project
        .cmd_with_packs(&["upgrade"], &["pack-4"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Applied patch doesn't match configuration: 001-initial-schema.sql",
        ));
}

#[test]
fn test_broken_patch_exits_with_code_1() {
    let project = Project::new();
    project
        .cmd_with_packs(&["upgrade"], &["pack-1", "pack-2"])
        .assert()
        .success();

    let mut cmd = project.cmd(&["upgrade"]);
    cmd.arg(fixture("pack-1/001-initial-schema.sql"))
        .arg(fixture("pack-2"))
        .arg(fixture("pack-5"));
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to apply patch"))
        .stderr(predicate::str::contains("003-broken.sql"));
}

#[test]
fn test_validate_not_configured() {
    let project = Project::new();
    project
        .cmd_with_packs(&["upgrade"], &["pack-1", "pack-2"])
        .assert()
        .success();

    project
        .cmd_with_packs(&["validate"], &["pack-1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("002-minor-changes.sql"));
}

#[test]
fn test_rename_dry_run_then_apply() {
    let project = Project::new();
    project
        .cmd_with_packs(&["upgrade"], &["pack-1", "pack-2"])
        .assert()
        .success();

    let output = project
        .cmd_with_packs(&["rename", "--dry-run", "--json"], &["pack-1", "pack-6"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        plan,
        serde_json::json!({ "002-minor-changes.sql": "002-some-stuff.sql" })
    );

    // A dry run changes nothing.
    project
        .cmd_with_packs(&["validate"], &["pack-1", "pack-6"])
        .assert()
        .code(2);

    project
        .cmd_with_packs(&["rename"], &["pack-1", "pack-6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("002-minor-changes.sql → 002-some-stuff.sql"));

    project
        .cmd_with_packs(&["validate", "--compatible"], &["pack-1", "pack-6"])
        .assert()
        .success();
}

#[test]
fn test_rename_duplicates() {
    let project = Project::new();
    project
        .cmd_with_packs(&["upgrade"], &["pack-1", "pack-2"])
        .assert()
        .success();

    project
        .cmd_with_packs(&["rename"], &["pack-1", "pack-2", "pack-6"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("share signature"));
}

#[test]
fn test_retrofit_requires_confirmation() {
    let project = Project::new();
    project
        .cmd_with_packs(&["retrofit"], &["pack-1"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("cancelled"));

    project
        .cmd_with_packs(&["validate", "--compatible"], &["pack-1"])
        .assert()
        .code(2);
}

#[test]
fn test_retrofit_force() {
    let project = Project::new();
    project
        .cmd_with_packs(&["retrofit", "--force"], &["pack-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered 2 patch(es)"));

    project
        .cmd_with_packs(&["validate", "--compatible"], &["pack-1"])
        .assert()
        .success();
}

#[test]
fn test_status_json() {
    let project = Project::new();
    project
        .cmd_with_packs(&["upgrade"], &["pack-1"])
        .assert()
        .success();

    let output = project
        .cmd_with_packs(&["status", "--json"], &["pack-1", "pack-2"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let states: Vec<(&str, &str)> = report["patches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| (p["name"].as_str().unwrap(), p["state"].as_str().unwrap()))
        .collect();
    assert_eq!(
        states,
        vec![
            ("001-initial-schema.sql", "up_to_date"),
            ("002-minor-changes.sql", "needs_apply"),
            ("views.sql", "up_to_date"),
        ]
    );
    assert_eq!(report["unconfigured"], serde_json::json!([]));
}

#[test]
fn test_config_file() {
    let project = Project::new();
    fs::write(
        project.dir.path().join("tdp.toml"),
        format!(
            "[database]\nurl = \"{}\"\ntable = \"schema_patches\"\n\n[patches]\npaths = [\"{}\", \"{}\"]\n",
            project.url(),
            fixture("pack-1").display(),
            fixture("pack-2").display()
        ),
    )
    .unwrap();

    tdp_cmd()
        .current_dir(project.dir.path())
        .arg("upgrade")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 patches applied"));

    tdp_cmd()
        .current_dir(project.dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("schema_patches"))
        .stdout(predicate::str::contains("Created tdp.toml").not());
}

#[test]
fn test_explicit_config_must_exist() {
    let project = Project::new();
    project
        .cmd(&["--config", "missing.toml", "init"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("IO error"));
}
