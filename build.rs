//! Build script for agent-matcher
//!
//! Embeds git revision, build timestamp, target, profile and rustc version
//! so `agent-matcher version` and `GET /health` can report them.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let git_hash = run(&["git", "rev-parse", "--short=8", "HEAD"]);
    let git_branch = run(&["git", "rev-parse", "--abbrev-ref", "HEAD"]);
    let git_dirty = match Command::new("git").args(["status", "--porcelain"]).output() {
        Ok(out) if out.status.success() => (!out.stdout.is_empty()).to_string(),
        _ => "unknown".to_string(),
    };

    let build_timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let rustc_version = run(&["rustc", "--version"]);

    let vars = [
        ("GIT_HASH", git_hash),
        ("GIT_BRANCH", git_branch),
        ("GIT_DIRTY", git_dirty),
        ("BUILD_TIMESTAMP", build_timestamp),
        ("TARGET", env_or_unknown("TARGET")),
        ("PROFILE", env_or_unknown("PROFILE")),
        ("RUSTC_VERSION", rustc_version),
        ("HOST", env_or_unknown("HOST")),
    ];

    for (key, value) in vars {
        println!("cargo:rustc-env=AGENT_MATCHER_{}={}", key, value);
    }
}

/// Run a command and return its trimmed stdout, or "unknown"
fn run(cmd: &[&str]) -> String {
    Command::new(cmd[0])
        .args(&cmd[1..])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn env_or_unknown(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| "unknown".to_string())
}
