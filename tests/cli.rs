use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

/// Return a `Command` for the `plugin-order` binary built by Cargo.
fn plugin_order() -> Command {
    let mut cmd = cargo_bin_cmd!("plugin-order");
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

/// Create `<root>/<rel>/package.json` with the given `plugin` section.
fn write_plugin(root: &Path, rel: &str, plugin: &str) {
    let dir = root.join(rel);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("package.json"),
        format!(r#"{{"name": "{rel}", "plugin": {plugin}}}"#),
    )
    .unwrap();
}

/// A project with three path plugins: `session` needs `redis`, `view` is standalone.
fn sample_project() -> tempfile::TempDir {
    let root = tempdir().unwrap();
    write_plugin(
        root.path(),
        "plugins/session",
        r#"{"name": "session", "dependencies": ["redis"]}"#,
    );
    write_plugin(root.path(), "plugins/redis", r#"{"name": "redis"}"#);
    write_plugin(root.path(), "plugins/view", r#"{"name": "view"}"#);
    fs::write(
        root.path().join("plugins.json"),
        r#"{
            "session": {"path": "plugins/session"},
            "redis": {"path": "plugins/redis"},
            "view": {"path": "plugins/view", "env": ["prod", "test"]}
        }"#,
    )
    .unwrap();
    root
}

// ── Global flags ────────────────────────────────────────────────────

#[test]
fn help_flag() {
    plugin_order()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dependency-ordered activation"));
}

#[test]
fn version_flag() {
    plugin_order()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn about_flag() {
    plugin_order()
        .arg("--about")
        .assert()
        .success()
        .stdout(predicate::str::contains("plugin-order:"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")))
        .stdout(predicate::str::contains("licence:"));
}

#[test]
fn no_args_shows_usage() {
    plugin_order()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

// ── resolve ─────────────────────────────────────────────────────────

#[test]
fn resolve_text_lists_dependencies_first() {
    let root = sample_project();
    let output = plugin_order()
        .arg("resolve")
        .arg(root.path().join("plugins.json"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();
    let names: Vec<&str> = stdout
        .lines()
        .map(|l| l.split_whitespace().nth(1).unwrap())
        .collect();
    assert_eq!(names, ["redis", "view", "session"]);
}

#[test]
fn resolve_json_output() {
    let root = sample_project();
    let output = plugin_order()
        .arg("resolve")
        .arg(root.path().join("plugins.json"))
        .args(["--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let plugins = json.as_array().unwrap();
    assert_eq!(plugins.len(), 3);
    assert_eq!(plugins[2]["name"], "session");
    assert_eq!(plugins[2]["depth"], 1);
    assert_eq!(plugins[2]["dependencies"][0], "redis");
    assert_eq!(plugins[2]["export"]["kind"], "noop");
}

#[test]
fn resolve_env_rejection_is_logged() {
    let root = sample_project();
    plugin_order()
        .arg("resolve")
        .arg(root.path().join("plugins.json"))
        .args(["--env", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("plugins/view").not())
        .stderr(predicate::str::contains("[view reject] config.env = [prod, test]"));
}

#[test]
fn resolve_empty_env_rejects_nothing() {
    let root = sample_project();
    plugin_order()
        .arg("resolve")
        .arg(root.path().join("plugins.json"))
        .args(["--env", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("plugins/view"))
        .stderr(predicate::str::contains("reject").not());
}

#[test]
fn resolve_parent_relative_path_entry() {
    let root = sample_project();
    fs::create_dir(root.path().join("config")).unwrap();
    fs::write(
        root.path().join("config/plugins.json"),
        r#"{"redis": {"path": "../plugins/redis"}}"#,
    )
    .unwrap();
    plugin_order()
        .arg("resolve")
        .arg(root.path().join("config/plugins.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("plugins/redis"))
        .stdout(predicate::str::contains("..").not());
}

#[test]
fn resolve_yaml_config() {
    let root = sample_project();
    fs::write(
        root.path().join("plugins.yaml"),
        "redis:\n  path: plugins/redis\nview:\n  path: plugins/view\n  enable: false\n",
    )
    .unwrap();
    plugin_order()
        .arg("resolve")
        .arg(root.path().join("plugins.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("redis"))
        .stderr(predicate::str::contains("[view reject] config.enable = false"));
}

#[test]
fn resolve_missing_dependency_fails() {
    let root = sample_project();
    fs::write(
        root.path().join("plugins.json"),
        r#"{"session": {"path": "plugins/session"}}"#,
    )
    .unwrap();
    plugin_order()
        .arg("resolve")
        .arg(root.path().join("plugins.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("plugin-order resolve:"))
        .stderr(predicate::str::contains("redis"));
}

#[test]
fn resolve_reserved_alias_fails() {
    let root = tempdir().unwrap();
    fs::write(
        root.path().join("plugins.json"),
        r#"{"project": {"path": "x"}}"#,
    )
    .unwrap();
    plugin_order()
        .arg("resolve")
        .arg(root.path().join("plugins.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("can not be `project`"));
}

#[test]
fn resolve_missing_config_file_fails() {
    let root = tempdir().unwrap();
    plugin_order()
        .arg("resolve")
        .arg(root.path().join("absent.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.json"));
}

#[test]
fn resolve_base_flag_overrides_config_dir() {
    let root = sample_project();
    let elsewhere = tempdir().unwrap();
    fs::copy(
        root.path().join("plugins.json"),
        elsewhere.path().join("plugins.json"),
    )
    .unwrap();
    plugin_order()
        .arg("resolve")
        .arg(elsewhere.path().join("plugins.json"))
        .arg("--base")
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("session"));
}

#[test]
fn resolve_agent_role_requires_agent_flag() {
    let root = sample_project();
    plugin_order()
        .arg("resolve")
        .arg(root.path().join("plugins.json"))
        .args(["--agent-role", "worker"])
        .assert()
        .failure();
}

#[test]
fn resolve_agent_role_filters_plugins() {
    let root = sample_project();
    fs::write(
        root.path().join("plugins.json"),
        r#"{
            "redis": {"path": "plugins/redis", "agent": "worker"},
            "view": {"path": "plugins/view"}
        }"#,
    )
    .unwrap();
    fs::write(
        root.path().join("plugins/redis/agent.json"),
        r#"{"pool": 2}"#,
    )
    .unwrap();
    let output = plugin_order()
        .arg("resolve")
        .arg(root.path().join("plugins.json"))
        .args(["--agent", "--agent-role", "worker", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let plugins = json.as_array().unwrap();
    assert_eq!(plugins.len(), 1);
    assert_eq!(plugins[0]["name"], "redis");
    assert_eq!(plugins[0]["export"]["value"]["pool"], 2);
}
