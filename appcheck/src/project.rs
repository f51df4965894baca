use std::{
    io,
    path::{Path, PathBuf},
};

use futures::future;
use log::debug;
use tokio::fs;

use crate::{
    error::Error, model::Model, record::Record, script::Script, view::View, xml::parse_record,
};

pub const SCRIPTS_DIR: &str = "scripts";
pub const MODELS_DIR: &str = "models";
pub const VIEWS_DIR: &str = "views";

const RECORD_EXTENSION: &str = "xml";

/// An exported low-code project.
///
/// Entities keep the order in which their files were listed, which is whatever the
/// filesystem returns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Project {
    pub root: PathBuf,
    pub scripts: Vec<Script>,
    pub models: Vec<Model>,
    pub views: Vec<View>,
}

impl Project {
    /// Reads every record file of the project concurrently.
    ///
    /// The first read or parse failure aborts the whole load.
    pub async fn load(root: impl AsRef<Path>) -> Result<Project, Error> {
        let root = root.as_ref();

        let (scripts, models, views) = futures::try_join!(
            load_entities(root.join(SCRIPTS_DIR), |record, path| Script::from_record(
                &record, path
            )),
            load_entities(root.join(MODELS_DIR), |record, path| Model::from_record(
                &record, path
            )),
            load_entities(root.join(VIEWS_DIR), View::from_record),
        )?;

        debug!(
            "loaded {} scripts, {} models and {} views from '{}'",
            scripts.len(),
            models.len(),
            views.len(),
            root.display()
        );

        Ok(Project {
            root: root.to_path_buf(),
            scripts,
            models,
            views,
        })
    }
}

async fn load_entities<T>(
    dir: PathBuf,
    build: fn(Record, &Path) -> Result<T, Error>,
) -> Result<Vec<T>, Error>
where
    T: Send + 'static,
{
    let paths = list_records(&dir).await?;

    let tasks = paths.into_iter().map(|path| {
        tokio::spawn(async move {
            let record = read_record(&path).await?;
            build(record, &path)
        })
    });

    future::try_join_all(tasks)
        .await?
        .into_iter()
        .collect()
}

async fn list_records(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let io_error = |source: io::Error| Error::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("'{}' does not exist, skipping", dir.display());
            return Ok(Vec::new());
        }
        Err(err) => return Err(io_error(err)),
    };

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
        let path = entry.path();
        let is_record = path
            .extension()
            .map_or(false, |extension| extension == RECORD_EXTENSION);
        if is_record && entry.file_type().await.map_err(io_error)?.is_file() {
            paths.push(path);
        }
    }

    Ok(paths)
}

pub async fn read_record(path: &Path) -> Result<Record, Error> {
    let text = fs::read_to_string(path).await.map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_record(&text).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod test {
    use std::fs as std_fs;

    use super::*;
    use crate::tests_cfg::write_project;

    #[tokio::test]
    async fn load() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path());
        std_fs::write(dir.path().join(MODELS_DIR).join("notes.txt"), "ignored").unwrap();

        let project = Project::load(dir.path()).await.unwrap();

        let mut models: Vec<_> = project.models.iter().map(|m| m.name.as_str()).collect();
        models.sort_unstable();
        assert_eq!(models, ["Order", "Widget"]);

        let mut views: Vec<_> = project.views.iter().map(|v| v.name.as_str()).collect();
        views.sort_unstable();
        assert_eq!(views, ["Header", "Home", "Orders"]);

        assert_eq!(project.scripts.len(), 2);
        assert_eq!(project.root, dir.path());
    }

    #[tokio::test]
    async fn missing_folders_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::load(dir.path()).await.unwrap();
        assert!(project.scripts.is_empty());
        assert!(project.models.is_empty());
        assert!(project.views.is_empty());
    }

    #[tokio::test]
    async fn one_malformed_file_fails_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path());
        std_fs::write(dir.path().join(VIEWS_DIR).join("Broken.xml"), "<view name=").unwrap();

        let err = Project::load(dir.path()).await.unwrap_err();
        match err {
            Error::Parse { path, .. } => assert!(path.ends_with("Broken.xml")),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
