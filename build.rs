// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=DEPTH_SENSE_VERSION");

    // Packaged builds pin the version explicitly
    let version = std::env::var("DEPTH_SENSE_VERSION").unwrap_or_else(|_| describe_version());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// "0.1.0-abcdef1" at a tag, "0.1.0-dirty-abcdef1" after it, the package
/// version when git is unavailable
fn describe_version() -> String {
    let package_version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();

    let Some(described) = git(&["describe", "--tags", "--always", "--match", "v*"]) else {
        return package_version;
    };
    let described = described.strip_prefix('v').unwrap_or(&described);

    let parts: Vec<&str> = described.rsplitn(3, '-').collect();
    match parts.as_slice() {
        [hash, _commits, base] => {
            let hash = hash.strip_prefix('g').unwrap_or(hash);
            format!("{}-dirty-{}", base, hash)
        }
        _ if described.contains('.') => {
            let hash = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".into());
            format!("{}-{}", described, hash)
        }
        // Bare commit hash, no tags yet
        _ => format!("{}-{}", package_version, described),
    }
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if output.status.success() {
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        None
    }
}
