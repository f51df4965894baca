use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use appcheck_compile::validate::DEFAULT_LINT_RULES;
use log::debug;
use serde::Deserialize;
use tokio::fs;

use crate::path_context;

pub const CONFIG_FILE: &str = "appcheck.toml";
pub const DEFAULT_SCRATCH_DIR: &str = ".appcheck";

/// Optional `appcheck.toml` at the root of a project. Paths are relative to the project.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub template: Option<PathBuf>,
    pub scratch_dir: Option<PathBuf>,
    pub checker: CheckerConfig,
    pub linter: LinterConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CheckerConfig {
    pub command: String,
    pub args: Vec<String>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            command: "tsc".to_string(),
            args: Vec::new(),
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LinterConfig {
    pub command: String,
    pub args: Vec<String>,
    /// JSON rule file, the embedded rules are used otherwise.
    pub config: Option<PathBuf>,
}

impl Default for LinterConfig {
    fn default() -> Self {
        LinterConfig {
            command: "eslint".to_string(),
            args: Vec::new(),
            config: None,
        }
    }
}

impl Config {
    pub async fn load(root: impl AsRef<Path>) -> Result<Config> {
        let path = root.as_ref().join(CONFIG_FILE);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no {} found, using defaults", CONFIG_FILE);
                return Ok(Config::default());
            }
            Err(err) => return Err(err).with_context(path_context!("read", path)),
        };
        toml::from_slice(&bytes).context("appcheck.toml file corrupt")
    }

    pub fn template_path(&self, root: &Path) -> Option<PathBuf> {
        self.template.as_ref().map(|template| root.join(template))
    }

    pub fn scratch_dir(&self, root: &Path) -> PathBuf {
        root.join(
            self.scratch_dir
                .as_deref()
                .unwrap_or_else(|| Path::new(DEFAULT_SCRATCH_DIR)),
        )
    }

    pub async fn lint_rules(&self, root: &Path) -> Result<String> {
        match &self.linter.config {
            Some(config) => {
                let path = root.join(config);
                fs::read_to_string(&path)
                    .await
                    .with_context(path_context!("read linter config", path))
            }
            None => Ok(DEFAULT_LINT_RULES.to_string()),
        }
    }
}
