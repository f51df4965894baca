use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use log::info;
use tokio::fs;

use crate::{path_context, Runnable};

use super::{project_dir, Workspace};

/// Prints or writes the generated TypeScript declarations
#[derive(Parser)]
pub struct Declarations {
    /// Project directory, the one given to `check` by default
    #[clap(value_parser)]
    pub project: Option<PathBuf>,
    /// Writes the declarations to a file instead of stdout
    #[clap(short, long, value_parser)]
    pub output: Option<PathBuf>,
    /// Prints more information
    #[clap(short, long)]
    pub verbose: bool,
}

#[async_trait]
impl Runnable for Declarations {
    async fn run(&mut self) -> Result<()> {
        let workspace = Workspace::load(project_dir(&self.project)).await?;
        let declarations = workspace.declarations()?;

        match &self.output {
            Some(output) => {
                fs::write(output, declarations)
                    .await
                    .with_context(path_context!("write", output))?;
                info!("wrote declarations to '{}'", output.display());
            }
            None => print!("{}", declarations),
        }

        Ok(())
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}
