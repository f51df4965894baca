use std::{io, path::PathBuf};

use crate::xml::ParseError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("could not read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed record in '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error("malformed record in '{}': {message}", path.display())]
    Malformed { path: PathBuf, message: String },
    #[error("project loader task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }
}
