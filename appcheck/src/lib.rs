//! <div align="center">
//!   <h1>appcheck</h1>
//!
//!   <p>
//!     <strong>Type check and lint the scripts hiding inside your low-code app</strong>
//!   </p>
//!
//! </div>
//!
//! # appcheck
//!
//! Appcheck reads an exported low-code project (`models/`, `views/` and `scripts/`)
//! into a typed project model which [`appcheck-compile`] turns into type declarations
//! and checkable sources.
//!
//! This crate holds the project model: the structured records produced from the
//! exported XML, the component tree traversal and the canonical entities.

pub mod error;
pub mod model;
pub mod prelude;
pub mod project;
pub mod record;
pub mod script;
#[doc(hidden)]
pub mod tests_cfg;
pub mod traverse;
pub mod view;
pub mod xml;
