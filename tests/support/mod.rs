#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A scratch working directory with its own pace directory.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn pace_dir(&self) -> PathBuf {
        self.dir.path().join(".pace")
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let dir = self.pace_dir();
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("config.toml");
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}

pub fn pace_cmd(dir: &TestDir) -> Command {
    let mut cmd = Command::cargo_bin("pace").expect("binary");
    cmd.current_dir(dir.path())
        .env("PACE_DIR", dir.pace_dir())
        .env_remove("RUST_LOG");
    cmd
}

/// Run a command with `--json` and return the envelope's `data`.
pub fn pace_json(dir: &TestDir, args: &[&str]) -> Result<Value, Box<dyn std::error::Error>> {
    let output = pace_cmd(dir).args(args).arg("--json").assert().success();
    let envelope: Value = serde_json::from_slice(&output.get_output().stdout)?;
    Ok(envelope["data"].clone())
}

/// Create a task and return its ID.
pub fn create_task(
    dir: &TestDir,
    title: &str,
    extra: &[&str],
) -> Result<String, Box<dyn std::error::Error>> {
    let mut args = vec!["task", "create", "--title", title];
    args.extend_from_slice(extra);
    let data = pace_json(dir, &args)?;
    Ok(data["id"].as_str().ok_or("missing id")?.to_string())
}
