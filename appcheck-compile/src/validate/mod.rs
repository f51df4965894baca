//! Runs the type checker and the linter over the generated artifacts and writes
//! linter fixes back into the project.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use appcheck::{project::Project, script::Script};
use async_trait::async_trait;
use futures::future;
use log::{debug, error, info, warn};

use crate::{error::Error, sources::SyntheticSource};

pub use self::materialize::{materialize, Scratch};
pub use self::writeback::{render_script, write_back};

mod materialize;
mod writeback;

/// Rules used when the project does not configure its own.
pub const DEFAULT_LINT_RULES: &str = include_str!("../../templates/eslintrc.json");

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({},{}): {}",
            self.file.display(),
            self.line,
            self.column,
            self.message
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LintMessage {
    pub line: u32,
    pub column: u32,
    pub rule: Option<String>,
    pub message: String,
}

impl fmt::Display for LintMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.line, self.column, self.message)?;
        if let Some(rule) = &self.rule {
            write!(f, " ({})", rule)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LintOutcome {
    pub output: String,
    /// Set when `output` differs from the linted source.
    pub fixed: bool,
    pub messages: Vec<LintMessage>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LintReport {
    pub name: String,
    pub path: PathBuf,
    pub fixed: bool,
    pub output: String,
    pub messages: Vec<LintMessage>,
}

#[async_trait]
pub trait Checker: Send + Sync {
    /// Type checks `files` using the project config at `config`.
    async fn check(&self, files: &[PathBuf], config: &Path) -> Result<Vec<Diagnostic>, Error>;
}

#[async_trait]
pub trait Linter: Send + Sync {
    /// Lints `source` with the rules at `config`. `label` names the source in messages.
    async fn lint(&self, source: &str, config: &Path, label: &str) -> Result<LintOutcome, Error>;
}

#[derive(Clone, Debug)]
pub struct ValidationOptions {
    /// Recreated on every run.
    pub scratch_dir: PathBuf,
    /// JSON linter configuration.
    pub lint_rules: String,
    /// Skip writing fixes back into the project.
    pub dry_run: bool,
}

impl ValidationOptions {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        ValidationOptions {
            scratch_dir: scratch_dir.into(),
            lint_rules: DEFAULT_LINT_RULES.to_string(),
            dry_run: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub diagnostics: Vec<Diagnostic>,
    pub lint_reports: Vec<LintReport>,
    /// Script files overwritten with linter fixes.
    pub written: Vec<PathBuf>,
}

impl ValidationReport {
    /// A run fails on any type diagnostic. Remaining lint messages are only reported.
    pub fn is_success(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Materializes the artifacts, type checks them, lints every script and writes the
/// fixed scripts back.
///
/// Type diagnostics never stop linting or writeback, they are returned in the report.
pub async fn validate<C, L>(
    project: &Project,
    declarations: &str,
    sources: &[SyntheticSource],
    checker: &C,
    linter: &L,
    options: &ValidationOptions,
) -> Result<ValidationReport, Error>
where
    C: Checker + ?Sized,
    L: Linter + ?Sized,
{
    let scratch = materialize(
        &options.scratch_dir,
        declarations,
        sources,
        &project.scripts,
        &options.lint_rules,
    )
    .await?;

    let files = scratch.file_paths();
    info!("type checking {} files", files.len());
    let diagnostics = checker.check(&files, &scratch.tsconfig).await?;
    for diagnostic in &diagnostics {
        error!("{}", diagnostic);
    }

    let scripts: Vec<&Script> = project
        .scripts
        .iter()
        .filter(|script| !script.is_empty())
        .collect();
    info!("linting {} scripts", scripts.len());
    let lint_reports = future::try_join_all(
        scripts
            .iter()
            .map(|script| lint_script(linter, script, &scratch.lint_config)),
    )
    .await?;

    // reports keep the order of `scripts`
    let writes: Vec<_> = scripts
        .iter()
        .zip(&lint_reports)
        .filter(|(_, report)| report.fixed)
        .map(|(script, report)| (script.path.clone(), render_script(script, &report.output)))
        .collect();

    let written = if options.dry_run {
        for (path, _) in &writes {
            info!("would write fixes to '{}'", path.display());
        }
        Vec::new()
    } else {
        write_back(writes).await?
    };

    Ok(ValidationReport {
        diagnostics,
        lint_reports,
        written,
    })
}

async fn lint_script<L>(linter: &L, script: &Script, config: &Path) -> Result<LintReport, Error>
where
    L: Linter + ?Sized,
{
    let outcome = linter.lint(&script.body, config, &script.name).await?;
    for message in &outcome.messages {
        warn!("{}: {}", script.name, message);
    }
    debug!(
        "linted {} ({} messages, fixed: {})",
        script.name,
        outcome.messages.len(),
        outcome.fixed
    );

    Ok(LintReport {
        name: script.name.clone(),
        path: script.path.clone(),
        fixed: outcome.fixed,
        output: outcome.output,
        messages: outcome.messages,
    })
}
