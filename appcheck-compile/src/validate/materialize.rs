use std::{
    io,
    path::{Path, PathBuf},
};

use appcheck::{project::SCRIPTS_DIR, script::Script};
use log::debug;
use serde_json::json;
use tokio::fs;

use crate::{error::Error, sources::SyntheticSource};

pub const DECLARATIONS_FILE: &str = "declarations.d.ts";
pub const RUNTIME_FILE: &str = "runtime.d.ts";
pub const TSCONFIG_FILE: &str = "tsconfig.json";
pub const LINT_CONFIG_FILE: &str = "eslintrc.json";

const RUNTIME: &str = include_str!("../../templates/runtime.d.ts");

/// The scratch directory handed to the checker and the linter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scratch {
    pub dir: PathBuf,
    /// Checked files relative to `dir`, in `tsconfig.json` order.
    pub files: Vec<PathBuf>,
    pub tsconfig: PathBuf,
    pub lint_config: PathBuf,
}

impl Scratch {
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|file| self.dir.join(file)).collect()
    }
}

/// Recreates `dir` and writes every checkable file plus the checker and linter configs.
pub async fn materialize(
    dir: &Path,
    declarations: &str,
    sources: &[SyntheticSource],
    scripts: &[Script],
    lint_rules: &str,
) -> Result<Scratch, Error> {
    let rules: serde_json::Value =
        serde_json::from_str(lint_rules).map_err(|err| Error::Json("linter configuration", err))?;

    match fs::remove_dir_all(dir).await {
        Ok(()) => debug!("removed previous scratch directory '{}'", dir.display()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(Error::io(dir)(err)),
    }
    fs::create_dir_all(dir).await.map_err(Error::io(dir))?;

    let mut files: Vec<(PathBuf, &str)> = vec![
        (PathBuf::from(DECLARATIONS_FILE), declarations),
        (PathBuf::from(RUNTIME_FILE), RUNTIME),
    ];
    files.extend(
        sources
            .iter()
            .map(|source| (source.path.clone(), source.text.as_str())),
    );
    files.extend(
        scripts
            .iter()
            .filter(|script| !script.is_empty())
            .map(|script| {
                (
                    Path::new(SCRIPTS_DIR).join(format!("{}.js", script.stem())),
                    script.body.as_str(),
                )
            }),
    );

    for (file, contents) in &files {
        write_file(&dir.join(file), contents).await?;
    }

    let tsconfig = json!({
        "compilerOptions": {
            "allowJs": true,
            "checkJs": true,
            "noEmit": true,
            "target": "ES2020",
            "lib": ["ES2020", "DOM"],
        },
        "files": files.iter().map(|(file, _)| slash_path(file)).collect::<Vec<_>>(),
    });
    let tsconfig_path = dir.join(TSCONFIG_FILE);
    write_json(&tsconfig_path, &tsconfig, "tsconfig.json").await?;

    let lint_config = dir.join(LINT_CONFIG_FILE);
    write_json(&lint_config, &rules, "linter configuration").await?;

    debug!(
        "materialized {} files into '{}'",
        files.len(),
        dir.display()
    );

    Ok(Scratch {
        dir: dir.to_path_buf(),
        files: files.into_iter().map(|(file, _)| file).collect(),
        tsconfig: tsconfig_path,
        lint_config,
    })
}

async fn write_file(path: &Path, contents: &str) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(Error::io(parent))?;
    }

    fs::write(path, contents).await.map_err(Error::io(path))
}

async fn write_json(
    path: &Path,
    value: &serde_json::Value,
    what: &'static str,
) -> Result<(), Error> {
    let contents = serde_json::to_string_pretty(value).map_err(|err| Error::Json(what, err))?;
    write_file(path, &(contents + "\n")).await
}

/// `tsconfig.json` paths always use forward slashes.
fn slash_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod test {
    use std::fs as std_fs;

    use appcheck::tests_cfg;

    use super::*;
    use crate::validate::DEFAULT_LINT_RULES;

    #[tokio::test]
    async fn writes_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let scratch_dir = dir.path().join("scratch");
        let project = tests_cfg::project();
        let sources = vec![SyntheticSource {
            path: PathBuf::from("queries/Widget.js"),
            text: "function Widget_All() {\n}\n".to_string(),
        }];

        let scratch = materialize(
            &scratch_dir,
            "type Views = {};\n",
            &sources,
            &project.scripts,
            DEFAULT_LINT_RULES,
        )
        .await
        .unwrap();

        assert_eq!(
            scratch.files,
            [
                PathBuf::from("declarations.d.ts"),
                PathBuf::from("runtime.d.ts"),
                PathBuf::from("queries/Widget.js"),
                PathBuf::from("scripts/Util.js"),
            ]
        );
        assert_eq!(
            std_fs::read_to_string(scratch_dir.join("declarations.d.ts")).unwrap(),
            "type Views = {};\n"
        );
        assert_eq!(
            std_fs::read_to_string(scratch_dir.join("scripts/Util.js")).unwrap(),
            project.scripts[0].body
        );
        assert!(!scratch_dir.join("scripts/Empty.js").exists());

        let tsconfig: serde_json::Value =
            serde_json::from_str(&std_fs::read_to_string(&scratch.tsconfig).unwrap()).unwrap();
        assert_eq!(tsconfig["compilerOptions"]["allowJs"], true);
        assert_eq!(tsconfig["compilerOptions"]["checkJs"], true);
        assert_eq!(tsconfig["compilerOptions"]["noEmit"], true);
        assert_eq!(
            tsconfig["files"],
            json!([
                "declarations.d.ts",
                "runtime.d.ts",
                "queries/Widget.js",
                "scripts/Util.js"
            ])
        );

        let rules: serde_json::Value =
            serde_json::from_str(&std_fs::read_to_string(&scratch.lint_config).unwrap()).unwrap();
        assert_eq!(rules["rules"]["semi"], json!(["error", "always"]));
    }

    #[tokio::test]
    async fn scratch_is_recreated() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("handlers").join("Gone.js");
        std_fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std_fs::write(&stale, "stale").unwrap();

        materialize(dir.path(), "", &[], &[], "{}").await.unwrap();

        assert!(!stale.exists());
        assert!(dir.path().join(RUNTIME_FILE).is_file());
    }

    #[tokio::test]
    async fn invalid_lint_rules() {
        let dir = tempfile::tempdir().unwrap();
        let err = materialize(&dir.path().join("scratch"), "", &[], &[], "{ rules")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Json("linter configuration", _)));
        assert!(!dir.path().join("scratch").exists());
    }
}
