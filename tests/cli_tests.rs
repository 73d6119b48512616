//! CLI tests for cli-units
//!
//! This test suite covers:
//! - Argument parsing and error handling for invalid arguments
//! - Template rendering and output parsing without a device
//! - Reading, listing and writing against a replay fixture file
//! - Output formats and config file loading

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

// Helper to get a command for testing
fn cli_units_cmd() -> Command {
    let mut cmd = Command::cargo_bin("cli-units").unwrap();
    cmd.env_remove("CLI_UNITS_CONFIG")
        .env_remove("CLI_UNITS_PLATFORM")
        .env_remove("CLI_UNITS_FIXTURES")
        .env_remove("CLI_UNITS_PROGRAM")
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

const FIXTURES: &str = r#"
hostname: R1
responses:
  "show running-config | include ^interface": |
    interface Loopback0
    interface GigabitEthernet0/1
  "show running-config interface Loopback0": |
    Building configuration...
    !
    interface Loopback0
     description router id
     ip address 192.0.2.1 255.255.255.255
    end
  "show running-config | section router bgp": |
    router bgp 65000
     bgp router-id 192.0.2.1
"#;

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn fixture_dir() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let fixtures = write_file(dir.path(), "r1.yaml", FIXTURES);
    (dir, fixtures)
}

// ============================================================================
// Argument handling
// ============================================================================

#[test]
fn test_help() {
    cli_units_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("write"));
}

#[test]
fn test_version() {
    cli_units_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_platform() {
    cli_units_cmd()
        .args(["--platform", "nxos", "units"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown platform"));
}

#[test]
fn test_missing_subcommand() {
    cli_units_cmd().assert().failure();
}

// ============================================================================
// Render and parse
// ============================================================================

#[test]
fn test_render_with_set() {
    cli_units_cmd()
        .args([
            "render",
            "interface {{ name }}\n description {{ desc }}\n{% if mtu %} mtu {{ mtu }}{% endif %}",
            "--set",
            "name=Loopback0",
            "--set",
            "desc=mgmt",
        ])
        .assert()
        .success()
        .stdout("interface Loopback0\ndescription mgmt\n");
}

#[test]
fn test_render_from_files() {
    let dir = tempdir().unwrap();
    let template = write_file(
        dir.path(),
        "bgp.j2",
        "router bgp {{ asn }}\n{% for n in neighbors %}\nneighbor {{ n.ip }} remote-as {{ n.remote_as }}\n{% endfor %}\n",
    );
    let vars = write_file(
        dir.path(),
        "vars.yaml",
        "asn: 65000\nneighbors:\n  - ip: 10.0.0.2\n    remote_as: 65001\n  - ip: 10.0.0.3\n    remote_as: 65002\n",
    );

    cli_units_cmd()
        .args(["--output", "json", "render"])
        .arg(format!("@{}", template.display()))
        .arg("--vars")
        .arg(&vars)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"router bgp 65000\""))
        .stdout(predicate::str::contains(
            "\"neighbor 10.0.0.3 remote-as 65002\"",
        ));
}

#[test]
fn test_render_syntax_error_exit_code() {
    cli_units_cmd()
        .args(["render", "interface {{ name"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("ERROR"));
}

#[test]
fn test_parse_rules_file() {
    let dir = tempdir().unwrap();
    let rules = write_file(
        dir.path(),
        "rules.yaml",
        r#"
rules:
  - field: description
    pattern: 'description (?P<value>.+)'
  - field: mtu
    pattern: 'mtu (?P<value>\d+)'
    type: integer
  - field: shutdown
    pattern: shutdown
    type: flag
"#,
    );
    let output = write_file(
        dir.path(),
        "output.txt",
        "interface Gi0/1\n description uplink\n mtu 9000\n",
    );

    let assert = cli_units_cmd()
        .args(["--output", "json", "parse"])
        .arg(&rules)
        .arg(&output)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let record: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(record["description"], "uplink");
    assert_eq!(record["mtu"], 9000);
    assert_eq!(record["shutdown"], false);
}

#[test]
fn test_parse_missing_rules_file() {
    cli_units_cmd()
        .args(["parse", "/nonexistent/rules.yaml", "/nonexistent/output.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ============================================================================
// Device commands against a replay fixture
// ============================================================================

#[test]
fn test_units_listing() {
    cli_units_cmd()
        .args(["--platform", "junos", "units", "--long"])
        .assert()
        .success()
        .stdout(predicate::str::contains("junos-interfaces"))
        .stdout(predicate::str::contains("/interfaces/interface/config"))
        .stdout(predicate::str::contains("ios-bgp").not());
}

#[test]
fn test_list_interfaces() {
    let (_dir, fixtures) = fixture_dir();
    cli_units_cmd()
        .args(["--platform", "ios", "--fixtures"])
        .arg(&fixtures)
        .args(["list", "/interfaces/interface"])
        .assert()
        .success()
        .stdout(
            "/interfaces/interface[name=Loopback0]\n/interfaces/interface[name=GigabitEthernet0/1]\n",
        );
}

#[test]
fn test_read_interface_json() {
    let (_dir, fixtures) = fixture_dir();
    let assert = cli_units_cmd()
        .args(["--platform", "ios", "--output", "json", "--fixtures"])
        .arg(&fixtures)
        .args(["read", "/interfaces/interface[name=Loopback0]/config"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let record: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(record["name"], "Loopback0");
    assert_eq!(record["type"], "software-loopback");
    assert_eq!(record["description"], "router id");
    assert_eq!(record["enabled"], true);
}

#[test]
fn test_read_unknown_command_fails() {
    let (_dir, fixtures) = fixture_dir();
    cli_units_cmd()
        .args(["--platform", "ios", "--fixtures"])
        .arg(&fixtures)
        .args(["read", "/interfaces/interface[name=Loopback9]/config"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("show running-config interface Loopback9"));
}

#[test]
fn test_read_without_handler() {
    let (_dir, fixtures) = fixture_dir();
    cli_units_cmd()
        .args(["--platform", "huawei", "--fixtures"])
        .arg(&fixtures)
        .args(["read", "/system/config"])
        .assert()
        .code(5);
}

#[test]
fn test_read_without_fixtures() {
    cli_units_cmd()
        .args(["--platform", "ios", "read", "/interfaces/interface[name=Loopback0]/config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fixture"));
}

#[test]
fn test_write_check_with_diff() {
    let (dir, fixtures) = fixture_dir();
    let before = write_file(
        dir.path(),
        "before.yaml",
        "name: Loopback0\ndescription: router id\n",
    );
    let after = write_file(
        dir.path(),
        "after.yaml",
        "name: Loopback0\ndescription: router id\nmtu: 1500\n",
    );

    cli_units_cmd()
        .args(["--platform", "ios", "--fixtures"])
        .arg(&fixtures)
        .args(["write", "/interfaces/interface[name=Loopback0]/config"])
        .arg("--before")
        .arg(&before)
        .arg("--after")
        .arg(&after)
        .args(["--check", "--diff"])
        .assert()
        .success()
        .stdout(predicate::str::contains("check mode"))
        .stdout(predicate::str::contains("interface Loopback0"))
        .stdout(predicate::str::contains("mtu 1500"))
        .stdout(predicate::str::contains("+mtu: 1500"));
}

#[test]
fn test_write_json_report() {
    let (dir, fixtures) = fixture_dir();
    let after = write_file(dir.path(), "after.json", r#"{"name": "Loopback5"}"#);

    let assert = cli_units_cmd()
        .args(["--platform", "ios", "--output", "json", "--fixtures"])
        .arg(&fixtures)
        .args(["write", "/interfaces/interface[name=Loopback5]/config"])
        .arg("--after")
        .arg(&after)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["check_mode"], false);
    assert_eq!(
        report["commands"],
        serde_json::json!(["configure terminal", "interface Loopback5", "no shutdown", "end"])
    );
}

#[test]
fn test_write_needs_data() {
    let (_dir, fixtures) = fixture_dir();
    cli_units_cmd()
        .args(["--platform", "ios", "--fixtures"])
        .arg(&fixtures)
        .args(["write", "/interfaces/interface[name=Loopback0]/config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to write"));
}

#[test]
fn test_write_physical_delete_exit_code() {
    let (dir, fixtures) = fixture_dir();
    let before = write_file(dir.path(), "before.yaml", "name: GigabitEthernet0/1\n");

    cli_units_cmd()
        .args(["--platform", "ios", "--fixtures"])
        .arg(&fixtures)
        .args(["write", "/interfaces/interface[name=GigabitEthernet0/1]/config"])
        .arg("--before")
        .arg(&before)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("physical interface"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_file_sets_platform_and_fixtures() {
    let (dir, fixtures) = fixture_dir();
    let config = write_file(
        dir.path(),
        "config.toml",
        &format!(
            "[device]\nplatform = \"cisco_ios\"\nfixtures = \"{}\"\n",
            fixtures.display()
        ),
    );

    cli_units_cmd()
        .arg("--config")
        .arg(&config)
        .args([
            "--output",
            "yaml",
            "read",
            "/network-instances/network-instance[name=default]/protocols/protocol[identifier=BGP][name=bgp]/bgp/global/config",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("as: 65000"))
        .stdout(predicate::str::contains("router_id: 192.0.2.1"));
}

#[test]
fn test_env_platform_override() {
    let (_dir, fixtures) = fixture_dir();
    cli_units_cmd()
        .env("CLI_UNITS_PLATFORM", "junos")
        .arg("--fixtures")
        .arg(&fixtures)
        .args(["list", "/interfaces/interface"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("show configuration interfaces"));
}

#[test]
fn test_missing_config_file() {
    cli_units_cmd()
        .args(["--config", "/nonexistent/cli-units.toml", "units"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}
