//! Lock dynamic dependency versions in Gradle build scripts.
//!
//! A [`ResolutionReport`] describes the project tree and what resolution
//! selected; a [`LockService`] per module rewrites the module's manifests
//! so each dynamic declaration carries the version it resolved to.

pub mod cli;
pub mod overrides;
pub mod report;
pub mod service;

pub use gradle_lock_core::{LockError, Result};
pub use overrides::{load_overrides, parse_overrides};
pub use report::{ConfigurationReport, ModuleReport, ResolutionReport};
pub use service::{LockService, LockServiceRegistry, ModuleDeclarations};
