use std::path::{Path, PathBuf};

use crate::{error::Error, record::Record};

/// A standalone script file from the project's `scripts/` folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script {
    pub key: String,
    pub script_type: String,
    pub name: String,
    pub body: String,
    /// Where the script was read from and where fixes are written back to.
    pub path: PathBuf,
}

impl Script {
    pub fn from_record(record: &Record, path: &Path) -> Result<Script, Error> {
        if record.tag != "script" {
            return Err(Error::malformed(
                path,
                format!("expected <script> but found <{}>", record.tag),
            ));
        }

        let attribute = |name: &str| {
            record
                .attribute(name)
                .map(str::to_string)
                .ok_or_else(|| Error::malformed(path, format!("<script> has no {}", name)))
        };

        Ok(Script {
            key: attribute("key")?,
            script_type: attribute("type")?,
            name: attribute("name")?,
            body: record.text().unwrap_or_default().to_string(),
            path: path.to_path_buf(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// File stem of the original script, used for the extracted source file.
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.name)
    }
}
