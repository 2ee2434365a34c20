use assert_cmd::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[pins]
sensor = 27
button = 26
motor_pwm = 15
pot_channel = 0

[control]
tick_ms = 10

[simulation]
initial_pot_raw = 4095
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

/// Every tick line carries the telemetry fields; the last line is the summary.
#[rstest]
fn jsonl_tick_and_summary_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("cruise").unwrap();
    cmd.arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(&cfg)
        .arg("run")
        .arg("--ticks")
        .arg("8");

    let out = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8_lossy(&out);
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("stdout line is JSON"))
        .collect();
    assert_eq!(lines.len(), 9, "stdout was: {stdout}");

    let mut prev_duty = 0u64;
    for tick in &lines[..8] {
        for key in ["t_ms", "rpm", "speed_updated", "pot", "cruise", "source", "commanded", "duty"] {
            assert!(tick.get(key).is_some(), "missing {key} in {tick}");
        }
        assert_eq!(tick["cruise"], "inactive");
        assert_eq!(tick["source"], "knob");
        let duty = tick["duty"].as_u64().expect("duty");
        assert!(duty >= prev_duty && duty - prev_duty <= 20);
        prev_duty = duty;
    }
    assert_eq!(prev_duty, 160);

    let summary = &lines[8];
    assert_eq!(summary["ticks"], 8);
    assert_eq!(summary["failed_ticks"], 0);
    assert!(summary.get("overruns").is_some());
}

#[rstest]
fn json_errors_go_to_stderr_with_reason() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cfg.toml");
    fs::write(&path, "[pins]\nsensor = 1\n").unwrap();

    let mut cmd = Command::cargo_bin("cruise").unwrap();
    cmd.arg("--json").arg("--config").arg(&path).arg("self-check");
    let out = cmd.assert().code(3).get_output().stderr.clone();
    let stderr = String::from_utf8_lossy(&out);
    let line = stderr
        .lines()
        .find(|l| l.trim_start().starts_with('{'))
        .unwrap_or("");
    let v: serde_json::Value = serde_json::from_str(line).expect("stderr JSON");
    assert_eq!(v["reason"], "Config");
    assert_eq!(v["code"], 3);
    assert!(v["message"].as_str().unwrap_or("").contains("button"));
}
