//! Shared integration-test harness for running the `valentine` binary.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Runs `valentine` with `args` to completion, stdin closed.
///
/// Logging env overrides are cleared so a developer's shell does not leak
/// into assertions.
#[allow(clippy::missing_panics_doc)]
pub fn run_valentine(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_valentine"))
        .args(args)
        .env_remove("VALENTINE_LOG_LEVEL")
        .env_remove("VALENTINE_CONFIG")
        .env_remove("VALENTINE_COLOR")
        .stdin(Stdio::null())
        .output()
        .expect("failed to run valentine")
}

/// Path to a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// A temporary photo directory holding empty files with these names.
#[allow(clippy::missing_panics_doc)]
pub fn photo_dir(names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in names {
        std::fs::write(dir.path().join(name), b"").expect("write photo");
    }
    dir
}

/// Lossy UTF-8 view of captured output.
pub fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// `path` as `&str`, for argument lists.
#[allow(clippy::missing_panics_doc)]
pub fn arg(path: &Path) -> &str {
    path.to_str().expect("non-UTF-8 path")
}
