use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use appcheck_compile::{compile_sources, SyntheticSource};
use async_trait::async_trait;
use clap::Parser;
use log::{debug, info};
use tokio::fs;

use crate::{path_context, Runnable};

use super::{project_dir, Workspace};

/// Writes the JavaScript extracted from queries and event handlers
#[derive(Parser)]
pub struct Sources {
    /// Project directory, the one given to `check` by default
    #[clap(value_parser)]
    pub project: Option<PathBuf>,
    /// Output directory, the project's scratch directory by default
    #[clap(short, long, value_parser)]
    pub output: Option<PathBuf>,
    /// Prints more information
    #[clap(short, long)]
    pub verbose: bool,
}

#[async_trait]
impl Runnable for Sources {
    async fn run(&mut self) -> Result<()> {
        let workspace = Workspace::load(project_dir(&self.project)).await?;
        let sources = compile_sources(&workspace.project);
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| workspace.config.scratch_dir(&workspace.root));

        write_sources(&output, &sources).await?;
        info!("wrote {} sources to '{}'", sources.len(), output.display());

        Ok(())
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}

async fn write_sources(dir: &Path, sources: &[SyntheticSource]) -> Result<()> {
    for source in sources {
        let path = dir.join(&source.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(path_context!("create directory", parent))?;
        }

        fs::write(&path, &source.text)
            .await
            .with_context(path_context!("write", path))?;
        debug!("wrote '{}'", path.display());
    }

    Ok(())
}
