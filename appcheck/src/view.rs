use std::path::Path;

use crate::{
    error::Error,
    model::{fields_of, is_true, Field},
    record::Record,
    traverse::ComponentNode,
};

/// Source expression of the binding which attaches a datasource to a view.
pub const DATA_SOURCE_BINDING: &str = "_dataSource";

const DEFAULT_VIEW_CLASS: &str = "LayoutWidget";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub source_expression: String,
    pub target_expression: String,
    pub target_literal_expression: String,
}

impl Binding {
    /// Datasource named by a `<namespace>.<datasource>` literal target.
    ///
    /// Returns `None` unless the literal has exactly two non-empty segments.
    pub fn data_source_name(&self) -> Option<&str> {
        let mut segments = self.target_literal_expression.split('.');
        let namespace = segments.next()?;
        let name = segments.next()?;
        if segments.next().is_some() || namespace.is_empty() || name.is_empty() {
            return None;
        }

        Some(name)
    }

    fn from_record(record: &Record) -> Binding {
        let attribute = |name| record.attribute(name).unwrap_or_default().to_string();

        Binding {
            source_expression: attribute("sourceExpression"),
            target_expression: attribute("targetExpression"),
            target_literal_expression: attribute("targetLiteralExpression"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct View {
    pub name: String,
    pub key: String,
    pub class: String,
    pub is_view_fragment: bool,
    pub bindings: Vec<Binding>,
    pub custom_properties: Vec<Field>,
    /// The view element doubles as the root component node.
    pub root: Record,
}

impl View {
    pub fn root(&self) -> ComponentNode<'_> {
        ComponentNode::new(&self.root)
    }

    pub fn data_source_binding(&self) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|binding| binding.source_expression == DATA_SOURCE_BINDING)
    }

    /// `View` or `ViewFragment`, used in generated names and markers.
    pub fn kind(&self) -> &'static str {
        if self.is_view_fragment {
            "ViewFragment"
        } else {
            "View"
        }
    }

    /// Name of the generated custom properties record type.
    pub fn custom_properties_type_name(&self) -> String {
        format!("{}_{}_Custom_Properties", self.name, self.kind())
    }

    pub fn from_record(record: Record, path: &Path) -> Result<View, Error> {
        if record.tag != "view" {
            return Err(Error::malformed(
                path,
                format!("expected <view> but found <{}>", record.tag),
            ));
        }

        let name = record
            .attribute("name")
            .ok_or_else(|| Error::malformed(path, "<view> has no name"))?
            .to_string();
        let bindings = record
            .all("binding")
            .iter()
            .map(Binding::from_record)
            .collect();

        Ok(View {
            key: record.attribute("key").unwrap_or_default().to_string(),
            class: record
                .attribute("class")
                .unwrap_or(DEFAULT_VIEW_CLASS)
                .to_string(),
            is_view_fragment: is_true(record.attribute("isViewFragment")),
            bindings,
            custom_properties: fields_of(&record, "customProperty", path)?,
            name,
            root: record,
        })
    }
}
