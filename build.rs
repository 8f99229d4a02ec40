//! Build script for ghkit: embeds a human-readable version string.
//!
//! `BUILD_INFO_HUMAN` is `{CARGO_PKG_VERSION} ({git}) {rustc --version}` where
//! `{git}` is the output of `git describe --tags --always --dirty` when a tag
//! is reachable, and otherwise a pseudo-version of the form
//! `v{CARGO_PKG_VERSION}-{yyyymmddHHMMSS}-{sha12}[+dirty]`. Clean trees use
//! the commit timestamp; dirty trees and trees without git use the build time.

use std::process::Command;

use chrono::{DateTime, Utc};

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

fn main() {
    for path in ["src", "build.rs", "Cargo.toml", "Cargo.lock"] {
        println!("cargo:rerun-if-changed={path}");
    }

    let components: Vec<String> = [
        Some(env!("CARGO_PKG_VERSION").to_string()),
        git_version().map(|version| format!("({version})")),
        run("rustc", &["--version"]),
    ]
    .into_iter()
    .flatten()
    .collect();

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={}", components.join(" "));
}

fn run(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn git(args: &[&str]) -> Option<String> {
    run("git", args)
}

/// `None` when git is unavailable; `.cargo-ok` from `cargo install --git`
/// does not count as a local change.
fn is_dirty() -> Option<bool> {
    git(&["status", "--porcelain"])
        .map(|status| {
            status
                .lines()
                .filter_map(|line| line.get(3..))
                .any(|path| path != ".cargo-ok")
        })
        .or_else(|| git(&["rev-parse", "--git-dir"]).map(|_| false))
}

fn git_version() -> Option<String> {
    match git(&["describe", "--tags", "--always", "--dirty"]) {
        Some(described) if described.contains('v') || described.contains("-g") => Some(described),
        _ => Some(pseudo_version()),
    }
}

fn pseudo_version() -> String {
    let sha = git(&["rev-parse", "--short=12", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    let dirty = is_dirty();

    let timestamp = match dirty {
        Some(false) => git(&["log", "-1", "--format=%ct"])
            .and_then(|seconds| seconds.parse::<i64>().ok())
            .and_then(|seconds| DateTime::from_timestamp(seconds, 0)),
        _ => None,
    }
    .unwrap_or_else(Utc::now)
    .format(TIMESTAMP_FORMAT);

    let suffix = if dirty == Some(true) { "+dirty" } else { "" };
    format!(
        "v{version}-{timestamp}-{sha}{suffix}",
        version = env!("CARGO_PKG_VERSION")
    )
}
