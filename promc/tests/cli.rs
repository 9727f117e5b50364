use std::fs;
use std::process::Command;

fn promc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_promc"))
}

#[test]
fn test_missing_argument_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("metrics.rs");

    let out = promc()
        .args(["--config", "metrics.json", "--output"])
        .arg(&output)
        .output()
        .unwrap();

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("--package"));
    assert!(!output.exists());
}

#[test]
fn test_generates_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("metrics.json");
    let output = dir.path().join("metrics.rs");
    fs::write(&config, r#"{"metrics":[{"name":"jobs_total","type":"counter"}]}"#).unwrap();

    let status = promc()
        .arg("-c")
        .arg(&config)
        .arg("-o")
        .arg(&output)
        .args(["-p", "metrics"])
        .status()
        .unwrap();

    assert!(status.success());
    assert!(fs::read_to_string(&output).unwrap().contains("pub fn IncJobsTotal(&self)"));
}

#[test]
fn test_invalid_config_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("metrics.json");
    let output = dir.path().join("metrics.rs");
    fs::write(&config, r#"{"metrics":[{"name":"x","type":"summary"}]}"#).unwrap();

    let out = promc()
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .args(["--package", "metrics"])
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("$.metrics[0].type"));
    assert!(!output.exists());
}

#[test]
fn test_version_flag() {
    let out = promc().arg("--version").output().unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("promc "));
}
