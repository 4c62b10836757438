#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{SystemTime, UNIX_EPOCH};

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

/// Inventory used by the CLI scenarios; pair with `--as-of 2024-02-01`.
pub const SAMPLE_INVENTORY: &str = r#"{
  "buckets": [
    {"name": "prod-logs", "region": "us-east-1", "sizeGB": 120, "versioning": true,
     "createdOn": "2023-01-01", "lastAccessed": "2024-01-01", "tags": {"team": "infra"}},
    {"name": "ml-datasets", "region": "us-west-2", "sizeGB": 60, "versioning": false,
     "createdOn": "2023-05-01", "lastAccessed": "2024-01-27", "tags": {"team": "data"}},
    {"name": "old-backups", "region": "us-east-1", "sizeGB": 95, "versioning": "Suspended",
     "createdOn": "2023-01-15", "tags": {"team": "infra"}},
    {"name": "scratch", "region": "eu-west-1", "sizeGB": 0, "versioning": false,
     "createdOn": "2024-01-20", "tags": {"team": "web"}}
  ]
}"#;

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_slh") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) { "slh.exe" } else { "slh" };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve slh binary path for integration test"),
    }
}

/// Write `contents` as an inventory file inside `dir`.
pub fn write_inventory(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("buckets.json");
    fs::write(&path, contents).expect("write inventory fixture");
    path
}

pub fn run_cli_case(case_name: &str, args: &[&str]) -> CmdResult {
    run_cli_case_with_env(case_name, args, &[])
}

pub fn run_cli_case_with_env(case_name: &str, args: &[&str], env: &[(&str, &str)]) -> CmdResult {
    let root = std::env::temp_dir().join("slh-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let mut command = Command::new(&bin_path);
    command
        .args(args)
        .env("RUST_BACKTRACE", "1")
        .env_remove("SLH_OUTPUT_FORMAT");
    for (key, value) in env {
        command.env(key, value);
    }
    let output = command.output().expect("execute slh command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}
