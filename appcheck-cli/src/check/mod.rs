use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use appcheck::project::Project;
use appcheck_compile::{
    compile_declarations, compile_sources, validate, DeclarationTemplate, ValidationOptions,
};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use log::{debug, info};
use tokio::fs;

use crate::{
    path_context, runnable_cmd,
    tools::{EslintLinter, TscChecker},
    util::Config,
    Runnable,
};

pub use self::declarations::Declarations;
pub use self::sources::Sources;

mod declarations;
mod sources;

/// Type checks and lints the scripts of a project, writing linter fixes back
#[derive(Parser)]
pub struct Check {
    /// Project directory containing `models/`, `views/` and `scripts/`
    #[clap(value_parser, default_value = ".")]
    pub project: PathBuf,
    /// Reports linter fixes without writing them back
    #[clap(long)]
    pub dry_run: bool,
    /// Keeps the scratch directory after a successful run
    #[clap(long)]
    pub keep_scratch: bool,
    #[clap(subcommand)]
    pub subcmd: Option<SubCommand>,
    /// Prints more information
    #[clap(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum SubCommand {
    Declarations(Declarations),
    Sources(Sources),
}

impl Check {
    /// The selected subcommand, falling back to this project when it names none.
    pub fn into_runnable(self) -> Box<dyn Runnable> {
        match self.subcmd {
            Some(SubCommand::Declarations(mut declarations)) => {
                declarations.project.get_or_insert(self.project);
                runnable_cmd!(declarations)
            }
            Some(SubCommand::Sources(mut sources)) => {
                sources.project.get_or_insert(self.project);
                runnable_cmd!(sources)
            }
            None => runnable_cmd!(self),
        }
    }
}

fn project_dir(project: &Option<PathBuf>) -> &Path {
    project.as_deref().unwrap_or_else(|| Path::new("."))
}

#[async_trait]
impl Runnable for Check {
    async fn run(&mut self) -> Result<()> {
        let workspace = Workspace::load(&self.project).await?;
        let declarations = workspace.declarations()?;
        let sources = compile_sources(&workspace.project);
        info!(
            "generated declarations and {} sources for {} models and {} views",
            sources.len(),
            workspace.project.models.len(),
            workspace.project.views.len()
        );

        let options = ValidationOptions {
            scratch_dir: workspace.config.scratch_dir(&workspace.root),
            lint_rules: workspace.config.lint_rules(&workspace.root).await?,
            dry_run: self.dry_run,
        };
        let checker = TscChecker::new(&workspace.config.checker);
        let linter = EslintLinter::new(&workspace.config.linter);

        let report = validate(
            &workspace.project,
            &declarations,
            &sources,
            &checker,
            &linter,
            &options,
        )
        .await?;

        let fixed = report.lint_reports.iter().filter(|report| report.fixed).count();
        info!(
            "linted {} scripts, {} fixed, {} written",
            report.lint_reports.len(),
            fixed,
            report.written.len()
        );

        if !report.is_success() {
            bail!("type checking failed with {} errors", report.diagnostics.len());
        }

        if self.keep_scratch {
            info!("kept scratch directory '{}'", options.scratch_dir.display());
        } else {
            fs::remove_dir_all(&options.scratch_dir)
                .await
                .with_context(path_context!("remove", options.scratch_dir))?;
        }

        Ok(())
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// A loaded project with its configuration and declaration template.
pub(crate) struct Workspace {
    pub root: PathBuf,
    pub config: Config,
    pub template: DeclarationTemplate,
    pub project: Project,
}

impl Workspace {
    /// The template is read first so a broken template fails before any output.
    pub async fn load(root: &Path) -> Result<Workspace> {
        let config = Config::load(root).await?;

        let template = match config.template_path(root) {
            Some(path) => {
                debug!("using declaration template '{}'", path.display());
                DeclarationTemplate::load(&path).await?
            }
            None => DeclarationTemplate::embedded()?,
        };

        let project = Project::load(root)
            .await
            .with_context(path_context!("load project", root))?;

        Ok(Workspace {
            root: root.to_path_buf(),
            config,
            template,
            project,
        })
    }

    pub fn declarations(&self) -> Result<String> {
        Ok(compile_declarations(&self.template, &self.project)?)
    }
}

#[cfg(test)]
mod test {
    use appcheck::tests_cfg;

    use super::*;

    #[tokio::test]
    async fn workspace_with_embedded_template() {
        let dir = tempfile::tempdir().unwrap();
        tests_cfg::write_project(dir.path());

        let workspace = Workspace::load(dir.path()).await.unwrap();
        assert_eq!(workspace.project.models.len(), 2);
        assert!(workspace
            .declarations()
            .unwrap()
            .contains("    OpenOrders: Datasource<Model_Order>;\n"));
    }

    #[tokio::test]
    async fn broken_template_fails_first() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("appcheck.toml"), "template = \"t.d.ts\"\n").unwrap();
        std::fs::write(dir.path().join("t.d.ts"), "type Views = {};\n").unwrap();
        std::fs::create_dir(dir.path().join("models")).unwrap();
        std::fs::write(dir.path().join("models").join("Bad.xml"), "<model").unwrap();

        let err = Workspace::load(dir.path()).await.err().unwrap();
        assert!(err.to_string().starts_with("declaration template must declare"));
    }

    #[test]
    fn cli_arguments() {
        let check = Check::try_parse_from(["check", "app", "--dry-run", "-v"]).unwrap();
        assert_eq!(check.project, PathBuf::from("app"));
        assert!(check.dry_run);
        assert!(!check.keep_scratch);
        assert!(check.verbose);
        assert!(check.subcmd.is_none());

        let check = Check::try_parse_from(["check", "sources", "app", "-o", "out"]).unwrap();
        match check.subcmd {
            Some(SubCommand::Sources(sources)) => {
                assert_eq!(sources.project, Some(PathBuf::from("app")));
                assert_eq!(sources.output, Some(PathBuf::from("out")));
            }
            _ => panic!("expected sources subcommand"),
        }
    }

    #[test]
    fn subcommand_inherits_project() {
        let check = Check::try_parse_from(["check", "app", "sources"]).unwrap();
        assert_eq!(check.project, PathBuf::from("app"));
        match check.subcmd {
            Some(SubCommand::Sources(sources)) => assert_eq!(sources.project, None),
            _ => panic!("expected sources subcommand"),
        }

        let check = Check::try_parse_from(["check", "app", "declarations", "other"]).unwrap();
        match check.subcmd {
            Some(SubCommand::Declarations(declarations)) => {
                assert_eq!(declarations.project, Some(PathBuf::from("other")));
            }
            _ => panic!("expected declarations subcommand"),
        }

        assert_eq!(project_dir(&None), Path::new("."));
    }

    #[tokio::test]
    async fn subcommand_runs_in_parent_project() {
        let dir = tempfile::tempdir().unwrap();
        tests_cfg::write_project(dir.path());
        let output = dir.path().join("types.d.ts");

        let project = dir.path().to_str().unwrap();
        let output_arg = output.to_str().unwrap();
        let check =
            Check::try_parse_from(["check", project, "declarations", "-o", output_arg]).unwrap();
        check.into_runnable().run().await.unwrap();

        let declarations = std::fs::read_to_string(&output).unwrap();
        assert!(declarations.contains("    OpenOrders: Datasource<Model_Order>;\n"));
    }
}
