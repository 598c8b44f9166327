//! Shared test utilities for integration tests.
//!
//! Provides helpers for writing markdown fixtures into temporary directories
//! and running the built binary.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Markdown fixture exercising every block kind.
pub const SAMPLE: &str = "\
# Guide

Intro with **bold**, `code` and a [link](https://example.com)[^ref].

- [x] done
- [ ] pending

> outer
>> inner

```rust filename=\"main.rs\" showLineNumbers
fn main() {}
```

| Name | Qty |
| :-- | --: |
| apple | 3 |

[^ref]: Reference note.
";

/// Writes markdown content to a file in a fresh temporary directory.
///
/// # Returns
///
/// Temporary directory (kept alive by the caller) and the file path
///
/// # Errors
///
/// Returns error if directory creation or file write fails
pub fn write_markdown(name: &str, content: &str) -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let path = dir.path().join(name);
    fs::write(&path, content)?;
    Ok((dir, path))
}

/// Runs the passport-md binary with the given arguments.
///
/// # Errors
///
/// Returns error if the process cannot be spawned
pub fn run_binary(args: &[&str]) -> Result<Output> {
    Ok(Command::new(env!("CARGO_BIN_EXE_passport-md")).args(args).output()?)
}

/// Converts path to str for command arguments.
pub fn path_arg(path: &Path) -> &str {
    path.to_str().expect("Test path should be valid UTF8")
}
