//! Core abstractions for gradle-lock.
//!
//! Provides the pieces shared by every manifest dialect:
//! - [`Coordinate`] / [`ModuleId`] value types and notation parsing
//! - [`ConfigurationScope`] and the caller-supplied [`OverrideMap`]
//! - Gradle version ordering ([`compare_versions`])
//! - Collaborator traits for the module tree and the dependency resolver
//! - [`LockResolver`], which turns a declaration into its locked version

pub mod coordinate;
pub mod error;
pub mod module;
pub mod resolver;
pub mod scope;
pub mod version;

pub use coordinate::{Coordinate, ModuleId, parse_notation};
pub use error::{LockError, Result, SourceLocation};
pub use module::{DependencyResolver, ModulePath, ModuleTree};
pub use resolver::{LockResolver, ResolutionCache};
pub use scope::{ConfigurationModuleId, ConfigurationScope, OverrideMap};
pub use version::{compare_versions, max_version};
