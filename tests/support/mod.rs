//! Shared helpers for the binary integration tests

use std::path::PathBuf;
use std::process::Command;

/// Locates a binary built alongside the test executable.
#[allow(dead_code)]
pub fn binary(name: &str) -> PathBuf {
    let mut path = std::env::current_exe().expect("Failed to get current executable path");
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.join(name)
}

#[allow(dead_code)]
pub fn fixture(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

/// A command for `name` with a clean tcci environment.
#[allow(dead_code)]
pub fn command(name: &str) -> Command {
    let mut cmd = Command::new(binary(name));
    for key in [
        "RUST_LOG",
        "TCCI_LOG_LEVEL",
        "TCCI_LOG_JSON",
        "TCCI_BUILD_TOOL",
        "TCCI_BUILD_TIMEOUT_MINUTES",
        "TCCI_INSTALL_ROOT",
        "TCCI_SHARE_SCRIPT",
        "TCCI_TARGET_ADDRESS",
        "TCCI_TARGET_LABEL",
    ] {
        cmd.env_remove(key);
    }
    cmd.env("NO_COLOR", "1");
    cmd
}
