//! Groovy DSL support for gradle-lock.
//!
//! Turns a `build.gradle` into a syntax tree, discovers every dependency
//! declaration and `force` directive that can carry a lock annotation,
//! plans the lock edits and splices them back into the original text:
//!
//! ```text
//! text -> parser -> walker (sites) -> planner (updates) -> rewriter -> text
//! ```

pub mod ast;
pub mod effective;
pub mod error;
pub mod lexer;
pub mod manifest;
pub mod parser;
pub mod planner;
pub mod prepare;
pub mod rewriter;
pub mod variables;
pub mod walker;

#[cfg(test)]
mod test_support;

pub use effective::{EffectiveDeclaration, effective_declarations};
pub use error::{GroovyError, Result};
pub use manifest::Manifest;
pub use planner::{LockUpdate, plan_lock_updates};
pub use prepare::prepare_for_locks;
pub use rewriter::{Edit, apply_edits, apply_lock_updates, strip_locks};
pub use variables::VariableTable;
pub use walker::{Configurations, DeclarationSite, Notation, SiteKind};
