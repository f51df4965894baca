use std::{fmt, path::Path, str};

use crate::{error::Error, record::Record};

/// A typed field of a model, a datasource or a view's custom properties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: String,
    pub required: bool,
    pub auto_increment: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            ty: ty.into(),
            required: false,
            auto_increment: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// A field is nullable unless it is required or auto incremented.
    pub fn is_nullable(&self) -> bool {
        !(self.required || self.auto_increment)
    }

    pub fn from_record(record: &Record, path: &Path) -> Result<Field, Error> {
        let name = record
            .attribute("name")
            .ok_or_else(|| Error::malformed(path, format!("<{}> has no name", record.tag)))?;

        Ok(Field {
            name: name.to_string(),
            ty: record.attribute("type").unwrap_or("Dynamic").to_string(),
            required: is_true(record.attribute("required")),
            auto_increment: is_true(record.attribute("autoIncrement")),
        })
    }
}

pub(crate) fn is_true(value: Option<&str>) -> bool {
    value == Some("true")
}

pub(crate) fn fields_of(record: &Record, key: &str, path: &Path) -> Result<Vec<Field>, Error> {
    record
        .all(key)
        .iter()
        .map(|field| Field::from_record(field, path))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataSourceKind {
    Query,
    Sql,
}

pub struct DataSourceKindFromStrError;

impl str::FromStr for DataSourceKind {
    type Err = DataSourceKindFromStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QUERY" => Ok(Self::Query),
            "SQL" => Ok(Self::Sql),
            _ => Err(DataSourceKindFromStrError),
        }
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "QUERY"),
            Self::Sql => write!(f, "SQL"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataSource {
    pub name: String,
    pub kind: DataSourceKind,
    pub custom_query: Option<String>,
    /// Declared when the `<parameters>` element is present, even without fields.
    pub parameters: Option<Vec<Field>>,
    pub custom_properties: Option<Vec<Field>>,
}

impl DataSource {
    pub fn from_record(record: &Record, path: &Path) -> Result<DataSource, Error> {
        let name = record
            .attribute("name")
            .ok_or_else(|| Error::malformed(path, "<dataSource> has no name"))?;
        let kind = record.attribute("type").unwrap_or_default();
        let kind = kind.parse::<DataSourceKind>().map_err(|_| {
            Error::malformed(
                path,
                format!("dataSource {} has unsupported type '{}'", name, kind),
            )
        })?;

        let declared = |key: &str| -> Result<Option<Vec<Field>>, Error> {
            record
                .first(key)
                .map(|shape| fields_of(shape, "field", path))
                .transpose()
        };

        Ok(DataSource {
            name: name.to_string(),
            kind,
            custom_query: record.field_text("customQuery").map(str::to_string),
            parameters: declared("parameters")?,
            custom_properties: declared("customProperties")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Model {
    pub name: String,
    pub fields: Vec<Field>,
    pub data_sources: Vec<DataSource>,
}

impl Model {
    /// Name of the generated record type, `Model_<name>`.
    pub fn type_name(&self) -> String {
        format!("Model_{}", self.name)
    }

    pub fn from_record(record: &Record, path: &Path) -> Result<Model, Error> {
        if record.tag != "model" {
            return Err(Error::malformed(
                path,
                format!("expected <model> but found <{}>", record.tag),
            ));
        }

        let name = record
            .attribute("name")
            .ok_or_else(|| Error::malformed(path, "<model> has no name"))?;

        let data_sources = record
            .all("dataSource")
            .iter()
            .map(|data_source| DataSource::from_record(data_source, path))
            .collect::<Result<_, _>>()?;

        Ok(Model {
            name: name.to_string(),
            fields: fields_of(record, "field", path)?,
            data_sources,
        })
    }
}
