//! Structured records produced from the exported XML.
//!
//! A record field may hold one nested record or many, depending on how often the tag
//! appeared in the source document. [`OneOrMany::as_slice`] and [`normalize`] collapse
//! that ambiguity into an ordered sequence, and every consumer goes through them.

use std::{collections::BTreeMap, slice};

/// Reserved key holding the nested component records of a composite node.
pub const CHILDREN: &str = "children";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(item) => slice::from_ref(item),
            OneOrMany::Many(items) => items,
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }

    pub fn push(&mut self, item: T) {
        let previous = std::mem::replace(self, OneOrMany::Many(Vec::new()));
        *self = match previous {
            OneOrMany::One(first) => OneOrMany::Many(vec![first, item]),
            OneOrMany::Many(mut items) => {
                items.push(item);
                OneOrMany::Many(items)
            }
        };
    }
}

/// Collapses an optional one-or-many field into a sequence.
///
/// Absent yields an empty slice, a single item yields a one element slice and many
/// items are returned as-is.
pub fn normalize<T>(field: Option<&OneOrMany<T>>) -> &[T] {
    field.map(OneOrMany::as_slice).unwrap_or(&[])
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub text: Option<String>,
    /// Nested records grouped by tag, in order of first appearance.
    pub fields: Vec<(String, OneOrMany<Record>)>,
}

impl Record {
    pub fn new(tag: impl Into<String>) -> Self {
        Record {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_field(mut self, key: &str, record: Record) -> Self {
        self.insert(key, record);
        self
    }

    pub fn with_child(self, record: Record) -> Self {
        self.with_field(CHILDREN, record)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn field(&self, key: &str) -> Option<&OneOrMany<Record>> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Every record stored under `key`, in document order.
    pub fn all(&self, key: &str) -> &[Record] {
        normalize(self.field(key))
    }

    pub fn first(&self, key: &str) -> Option<&Record> {
        self.all(key).first()
    }

    /// Text content of the first record stored under `key`.
    pub fn field_text(&self, key: &str) -> Option<&str> {
        self.first(key).and_then(Record::text)
    }

    pub fn children(&self) -> &[Record] {
        self.all(CHILDREN)
    }

    pub fn insert(&mut self, key: &str, record: Record) {
        match self.fields.iter_mut().find(|(name, _)| name == key) {
            Some((_, value)) => value.push(record),
            None => self
                .fields
                .push((key.to_string(), OneOrMany::One(record))),
        }
    }

    pub fn take(&mut self, key: &str) -> Option<OneOrMany<Record>> {
        let index = self.fields.iter().position(|(name, _)| name == key)?;
        Some(self.fields.remove(index).1)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn normalize_absent_single_and_many() {
        assert!(normalize::<u8>(None).is_empty());
        assert_eq!(normalize(Some(&OneOrMany::One(1))), &[1]);
        assert_eq!(normalize(Some(&OneOrMany::Many(vec![1, 2, 3]))), &[1, 2, 3]);
    }

    #[test]
    fn push_promotes_one_to_many() {
        let mut field = OneOrMany::One("a");
        field.push("b");
        field.push("c");
        assert_eq!(field, OneOrMany::Many(vec!["a", "b", "c"]));
    }

    #[test]
    fn insert_groups_by_key() {
        let record = Record::new("model")
            .with_field("field", Record::new("field").with_attribute("name", "ID"))
            .with_field("dataSource", Record::new("dataSource"))
            .with_field("field", Record::new("field").with_attribute("name", "Name"));

        assert_eq!(record.fields.len(), 2);
        let names: Vec<_> = record
            .all("field")
            .iter()
            .filter_map(|field| field.attribute("name"))
            .collect();
        assert_eq!(names, ["ID", "Name"]);
        assert!(matches!(record.field("dataSource"), Some(OneOrMany::One(_))));
        assert!(record.all("missing").is_empty());
    }

    #[test]
    fn field_text() {
        let record = Record::new("component")
            .with_field("onClick", Record::new("onClick").with_text("go();"));
        assert_eq!(record.field_text("onClick"), Some("go();"));
        assert_eq!(record.field_text("onLoad"), None);
    }
}
