#![allow(deprecated)]

use assert_cmd::Command;
use std::path::Path;

/// `registrar` running inside `dir` with no inherited database override.
pub fn registrar_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("registrar").unwrap();
    cmd.current_dir(dir);
    cmd.env_remove("REGISTRAR_DB_PATH");
    cmd
}

/// Runs one invocation per argument list and expects each to succeed.
pub fn run_all(dir: &Path, invocations: &[&[&str]]) {
    for args in invocations {
        registrar_cmd(dir).args(*args).assert().success();
    }
}

pub const SEED: &[&[&str]] = &[
    &["instructor", "add", "I1", "Bob", "45", "bob@uni.edu"],
    &["course", "add", "C1", "Algorithms", "--instructor", "I1"],
    &["course", "add", "C2", "Ethics"],
    &["student", "add", "S1", "Alice", "20", "alice@example.com"],
    &["register", "S1", "C1"],
];
