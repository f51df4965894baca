pub use crate::error::Error;
pub use crate::model::{DataSource, DataSourceKind, Field, Model};
pub use crate::project::Project;
pub use crate::record::{normalize, OneOrMany, Record};
pub use crate::script::Script;
pub use crate::traverse::{traverse, ComponentNode, ComponentVisitor};
pub use crate::view::{Binding, View};
pub use crate::xml::{parse_record, ParseError};
