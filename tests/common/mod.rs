//! Common test utilities and fixtures
//!
//! Shared paths and an isolated environment for CLI runs.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

/// Scratch directory standing in for the user's home, cwd and jar location.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn jar(&self) -> PathBuf {
        self.dir.path().join("cookies.json")
    }

    pub fn jar_str(&self) -> String {
        self.jar().to_string_lossy().into_owned()
    }

    /// `arco-persona` with no config file in reach and the jar inside the sandbox.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("arco-persona").unwrap();
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env("ARCO_JAR_PATH", self.jar())
            .env_remove("ARCO_CONFIG")
            .env_remove("ARCO_PRODUCT_LIMIT")
            .env_remove("ARCO_ARTICLE_LIMIT")
            .env_remove("ARCO_VARIANTS_FILE")
            .env_remove("ARCO_QUIZ_FILE")
            .env_remove("ARCO_LOG_LEVEL")
            .env_remove("ARCO_LOG_FILE")
            .env_remove("RUST_LOG");
        cmd
    }
}
