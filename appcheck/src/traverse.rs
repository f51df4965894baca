//! Depth-first walk over a view's component tree.

use crate::record::Record;

/// One widget instance: a class tag and its properties.
#[derive(Clone, Copy, Debug)]
pub struct ComponentNode<'a> {
    record: &'a Record,
}

impl<'a> ComponentNode<'a> {
    pub fn new(record: &'a Record) -> Self {
        ComponentNode { record }
    }

    pub fn class(&self) -> &'a str {
        self.record.attribute("class").unwrap_or_default()
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.record.attribute(name)
    }

    /// Text of the property element `name`, e.g. an event handler body.
    pub fn property(&self, name: &str) -> Option<&'a str> {
        self.record.field_text(name)
    }

    pub fn properties(&self) -> &'a Record {
        self.record
    }

    pub fn children(&self) -> impl Iterator<Item = ComponentNode<'a>> {
        self.record.children().iter().map(ComponentNode::new)
    }
}

pub trait ComponentVisitor<'a> {
    fn enter(&mut self, _node: ComponentNode<'a>) {}

    fn exit(&mut self, _node: ComponentNode<'a>) {}
}

enum Step<'a> {
    Enter(&'a Record),
    Exit(&'a Record),
}

/// Walks `root` and its nested `children`, calling `enter` before and `exit` after
/// each node's subtree.
pub fn traverse<'a, V>(root: &'a Record, visitor: &mut V)
where
    V: ComponentVisitor<'a> + ?Sized,
{
    let mut stack = vec![Step::Enter(root)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(record) => {
                visitor.enter(ComponentNode::new(record));
                stack.push(Step::Exit(record));
                stack.extend(record.children().iter().rev().map(Step::Enter));
            }
            Step::Exit(record) => visitor.exit(ComponentNode::new(record)),
        }
    }
}
