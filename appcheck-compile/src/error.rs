use std::{io, path::PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("declaration template '{}' could not be read: {source}", path.display())]
    MissingTemplate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("declaration template must declare `type {name} = {{}};` exactly once, found {found}")]
    TemplateHole { name: &'static str, found: usize },
    #[error("datasource {name} is declared by both {first} and {second}")]
    DuplicateDatasource {
        name: String,
        first: String,
        second: String,
    },
    #[error("could not write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not serialize {0}: {1}")]
    Json(&'static str, serde_json::Error),
    #[error("type checker failed: {0}")]
    Checker(String),
    #[error("linter failed on {label}: {message}")]
    Linter { label: String, message: String },
    #[error("writeback task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Error {
        let path = path.into();
        move |source| Error::Io { path, source }
    }
}
