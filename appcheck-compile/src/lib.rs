//! <div align="center">
//!   <h1>appcheck</h1>
//!
//!   <p>
//!     <strong>Type check and lint the scripts hiding inside your low-code app</strong>
//!   </p>
//!
//! </div>
//!
//! # appcheck-compile
//!
//! This crate turns a loaded [`appcheck::project::Project`] into the artifacts
//! checked by `appcheck`:
//!
//! - a TypeScript declaration file describing models, views and datasources
//!   ([`declarations`]),
//! - JavaScript sources extracted from datasource queries and widget event
//!   handlers ([`sources`]),
//! - the validation run which feeds everything to a type checker and a linter and
//!   writes linter fixes back into the project ([`validate`]).

pub mod declarations;
pub mod error;
pub mod events;
pub mod sources;
pub mod template;
mod util;
pub mod validate;

pub use crate::declarations::{compile_declarations, DeclarationCompiler};
pub use crate::error::Error;
pub use crate::sources::{compile_sources, SyntheticSource};
pub use crate::template::DeclarationTemplate;
pub use crate::validate::{validate, Checker, Linter, ValidationOptions, ValidationReport};
