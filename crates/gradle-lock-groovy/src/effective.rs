//! The versions a manifest asks resolution for, with or without its locks.

use crate::manifest::Manifest;
use crate::variables::VariableTable;
use crate::walker::{Configurations, SiteKind};
use gradle_lock_core::{ConfigurationScope, ModuleId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveDeclaration {
    pub scope: ConfigurationScope,
    pub module: ModuleId,
    pub force: bool,
    pub ignored: bool,
    /// Version written in the notation, variables expanded.
    pub declared: Option<String>,
    /// Version pinned by the lock clause.
    pub locked: Option<String>,
    /// What resolution requests: the lock unless locks are ignored.
    pub requested: Option<String>,
}

/// Lists every dependency and force declaration with the version it
/// requests. With `ignore_locks` every lock clause is treated as absent,
/// which gives a lock-free view of the manifest without rewriting it.
pub fn effective_declarations(
    manifest: &Manifest,
    configurations: &dyn Configurations,
    variables: &VariableTable,
    ignore_locks: bool,
) -> Vec<EffectiveDeclaration> {
    manifest
        .sites(configurations)
        .into_iter()
        .filter_map(|site| {
            let coordinate = site.coordinate(variables)?;
            let locked = site.lock_version();
            let requested = match &locked {
                Some(lock) if !ignore_locks => Some(lock.clone()),
                _ => coordinate.version.clone(),
            };
            Some(EffectiveDeclaration {
                scope: site.scope(),
                module: coordinate.module_id(),
                force: matches!(site.kind, SiteKind::Force { .. }),
                ignored: site.ignored,
                declared: coordinate.version,
                locked,
                requested,
            })
        })
        .collect()
}
