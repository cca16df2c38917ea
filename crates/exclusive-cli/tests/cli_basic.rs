//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary and verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (code, stdout, stderr).
fn run_cli(args: &[&str], config: &Path) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_exclusive-cli"))
        .args(args)
        .env("EXCLUSIVE_CONFIG", config)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

#[test]
fn test_config_show_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    let (code, stdout, _) = run_cli(&["config", "show"], &config);
    assert_eq!(code, 0, "config show failed");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["cooldown"]["tab_switch_ms"], 800);
    assert_eq!(json["cooldown"]["recovery_ms"], 200);
}

#[test]
fn test_config_init_then_get() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nested").join("config.toml");

    let (code, _, _) = run_cli(&["config", "init"], &config);
    assert_eq!(code, 0, "config init failed");
    assert!(config.exists());

    let (code, _, stderr) = run_cli(&["config", "init"], &config);
    assert_ne!(code, 0, "second init must refuse to overwrite");
    assert!(stderr.contains("already exists"));

    let (code, stdout, _) = run_cli(&["config", "get", "cooldown.normal_tap_ms"], &config);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "800");
}

#[test]
fn test_config_get_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let (code, _, stderr) = run_cli(&["config", "get", "cooldown.nope"], &config);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn test_replay_reports_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let script = dir.path().join("double_tap.toml");
    std::fs::write(
        &script,
        "name = \"double tap\"\n\
         [[steps]]\nat_ms = 0\ngate = \"tap\"\n\
         [[steps]]\nat_ms = 120\ngate = \"tap\"\n\
         [[steps]]\nat_ms = 900\ngate = \"tap\"\n",
    )
    .unwrap();

    let (code, stdout, stderr) = run_cli(&["replay", script.to_str().unwrap()], &config);
    assert_eq!(code, 0, "replay failed: {stderr}");

    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["name"], "double tap");
    assert_eq!(report["admitted"], 2);
    assert_eq!(report["rejected"], 1);
    assert_eq!(report["steps"][1]["outcome"], "rejected");
    assert_eq!(report["steps"][1]["blocked_by"], "normal_tap");
}

#[test]
fn test_replay_cooldown_override() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let script = dir.path().join("tabs.json");
    std::fs::write(
        &script,
        r#"{"steps": [{"at_ms": 0, "gate": "tab"}, {"at_ms": 300, "gate": "tab"}]}"#,
    )
    .unwrap();

    let (code, stdout, _) = run_cli(
        &["replay", script.to_str().unwrap(), "--cooldown-ms", "250"],
        &config,
    );
    assert_eq!(code, 0);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["admitted"], 2);
}

#[test]
fn test_replay_rejects_out_of_order_script() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let script = dir.path().join("bad.toml");
    std::fs::write(
        &script,
        "[[steps]]\nat_ms = 500\ngate = \"view\"\n[[steps]]\nat_ms = 100\ngate = \"view\"\n",
    )
    .unwrap();

    let (code, _, stderr) = run_cli(&["replay", script.to_str().unwrap()], &config);
    assert_ne!(code, 0);
    assert!(stderr.contains("comes before the previous step"));
    // Reported once, as a plain `error:` line.
    assert_eq!(stderr.matches("comes before the previous step").count(), 1);
    assert!(stderr.starts_with("error: "));
}
