//! Decides which declarations need their lock clause added, changed or
//! removed.

use crate::error::{GroovyError, Result};
use crate::manifest::Manifest;
use crate::variables::VariableTable;
use crate::walker::DeclarationSite;
use gradle_lock_core::LockResolver;

/// Target state for one declaration's lock clause. `locked: None`
/// removes an existing clause.
#[derive(Debug, Clone, PartialEq)]
pub struct LockUpdate {
    pub site: DeclarationSite,
    pub locked: Option<String>,
}

/// Plans the lock edits for every non-ignored declaration of `manifest`.
///
/// A declaration whose declared version already equals the resolved one
/// needs no lock; one whose existing lock already matches produces no
/// update. A call listing several coordinates under one (potential) lock
/// clause fails with [`GroovyError::AmbiguousLockTarget`].
pub fn plan_lock_updates(
    manifest: &Manifest,
    variables: &VariableTable,
    resolver: &LockResolver<'_>,
) -> Result<Vec<LockUpdate>> {
    let sites = manifest.sites(resolver);
    let mut updates = Vec::new();

    for site in &sites {
        if site.ignored {
            tracing::debug!("Skipping ignored declaration {}", site.notation.raw());
            continue;
        }
        if site.coordinate_args > 1 {
            return Err(ambiguous(manifest, site, &sites));
        }

        let Some(coordinate) = site.coordinate(variables) else {
            tracing::debug!("Skipping unparseable notation {}", site.notation.raw());
            continue;
        };

        let resolved = resolver.resolve(&site.scope(), &coordinate.module_id());
        let target = if resolved == coordinate.version {
            None
        } else {
            resolved
        };

        if target == site.lock_version() {
            continue;
        }
        tracing::debug!(
            "Lock for {} in {} changes from {:?} to {:?}",
            coordinate,
            site.scope(),
            site.lock_version(),
            target
        );
        updates.push(LockUpdate {
            site: site.clone(),
            locked: target,
        });
    }

    Ok(updates)
}

fn ambiguous(manifest: &Manifest, site: &DeclarationSite, sites: &[DeclarationSite]) -> GroovyError {
    GroovyError::AmbiguousLockTarget {
        location: manifest.location(site.call_span.start),
        call: site.call.clone(),
        coordinates: sites
            .iter()
            .filter(|other| other.call_span == site.call_span)
            .map(|other| other.notation.raw())
            .collect(),
    }
}
