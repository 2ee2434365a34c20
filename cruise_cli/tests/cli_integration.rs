use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Fast loop so budgeted runs finish quickly; pins are unused by the simulator.
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
max_rpm = 20.0
initial_pot_raw = 4095
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["run", "--ticks", "5"], 0, "run complete: ticks=5", "stdout")]
#[case(&["run", "--ticks", "20", "--stats"], 0, "stats: samples=20", "stdout")]
#[case(&["self-check"], 0, "self-check ok", "stdout")]
#[case(&["run", "--ticks", "many"], 2, "invalid value", "stderr")]
#[case(&["launch"], 2, "unrecognized subcommand", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("cruise").unwrap();
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn missing_config_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("cruise").unwrap();
    cmd.arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg("self-check");
    cmd.assert()
        .code(3)
        .stderr(predicate::str::contains("Configuration could not be loaded"));
}

#[rstest]
#[case("[control]\ntick_ms = 0", "tick_ms")]
#[case("[motor]\nramp_step = 0", "ramp_step")]
#[case("[logging]\nrotation = \"weekly\"", "rotation")]
fn invalid_config_values_are_reported(#[case] extra: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cfg.toml");
    let toml = format!(
        "[pins]\nsensor = 27\nbutton = 26\nmotor_pwm = 15\npot_channel = 0\n\n{extra}\n"
    );
    fs::write(&path, toml).unwrap();

    let mut cmd = Command::cargo_bin("cruise").unwrap();
    cmd.arg("--config").arg(&path).arg("self-check");
    cmd.assert()
        .code(3)
        .stderr(predicate::str::contains(needle));
}

#[rstest]
fn cli_reports_bad_script_header() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let bad_csv = dir.path().join("input.csv");
    let mut f = fs::File::create(&bad_csv).unwrap();
    writeln!(f, "time,button,pot").unwrap();
    writeln!(f, "0,released,0").unwrap();

    let mut cmd = Command::cargo_bin("cruise").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("run")
        .arg("--script")
        .arg(&bad_csv);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid headers"));
}

#[rstest]
fn script_press_engages_cruise() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let csv = dir.path().join("input.csv");
    let mut f = fs::File::create(&csv).unwrap();
    writeln!(f, "at_ms,button,pot_raw").unwrap();
    writeln!(f, "0,released,4095").unwrap();
    writeln!(f, "200,pressed,4095").unwrap();
    writeln!(f, "350,released,4095").unwrap();
    writeln!(f, "600,released,4095").unwrap();

    let mut cmd = Command::cargo_bin("cruise").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("run")
        .arg("--script")
        .arg(&csv);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("cruise=active"));
}
