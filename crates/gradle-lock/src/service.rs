//! Per-module lock operations over a project tree.
//!
//! Every operation works on the owning module, the root and the modules
//! below the owner, each manifest once. New manifest text is computed for
//! all of them and staged beside each manifest before the first rename, so
//! a parse failure or an ambiguous declaration anywhere leaves every
//! manifest untouched.

use dashmap::DashMap;
use gradle_lock_core::{
    DependencyResolver, LockError, LockResolver, ModulePath, ModuleTree, OverrideMap,
    ResolutionCache, Result,
};
use gradle_lock_groovy::{
    EffectiveDeclaration, Manifest, VariableTable, apply_lock_updates, effective_declarations,
    plan_lock_updates, prepare_for_locks, strip_locks,
};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// A manifest selected for an operation.
#[derive(Debug, Clone)]
struct Target {
    module: ModulePath,
    path: PathBuf,
    text: String,
}

/// Declarations of one manifest as resolution would see them.
#[derive(Debug, Clone)]
pub struct ModuleDeclarations {
    pub module: ModulePath,
    pub manifest: PathBuf,
    pub declarations: Vec<EffectiveDeclaration>,
}

/// Lock operations for one module of the project tree.
#[derive(Debug)]
pub struct LockService {
    module: ModulePath,
}

impl LockService {
    pub fn new(module: ModulePath) -> Self {
        Self { module }
    }

    pub fn module(&self) -> &ModulePath {
        &self.module
    }

    /// Recomputes every lock and rewrites the manifests that change.
    /// Returns the manifests written.
    pub fn update_locks<P>(&self, project: &P, overrides: &OverrideMap) -> Result<Vec<PathBuf>>
    where
        P: ModuleTree + DependencyResolver,
    {
        let targets = self.targets(project)?;
        let cache = ResolutionCache::new();

        let mut prepared = Vec::with_capacity(targets.len());
        for target in &targets {
            let resolver = LockResolver::new(
                project,
                project,
                overrides,
                &cache,
                target.module.clone(),
            );
            let manifest = parse(&target.text, &target.path)?;
            let manifest = parse(&prepare_for_locks(&manifest, &resolver), &target.path)?;
            prepared.push(manifest);
        }

        let root_variables = root_variables(project, &targets, &prepared);

        let mut rewritten = Vec::with_capacity(targets.len());
        for (target, manifest) in targets.iter().zip(&prepared) {
            let resolver = LockResolver::new(
                project,
                project,
                overrides,
                &cache,
                target.module.clone(),
            );
            let mut variables = manifest.variables().clone();
            variables.inherit(&root_variables);

            let updates = plan_lock_updates(manifest, &variables, &resolver)
                .map_err(|err| err.in_manifest(&target.path))?;
            tracing::debug!(
                "Planned {} lock updates for {}",
                updates.len(),
                target.path.display()
            );
            rewritten.push(apply_lock_updates(manifest, &updates));
        }
        tracing::debug!(
            "Resolved {} configurations across {} manifests",
            cache.resolved_pairs(),
            targets.len()
        );

        write_changed(&targets, rewritten, "Updated locks in")
    }

    /// Removes every lock clause outside `ignore` blocks.
    pub fn strip_locks<P>(&self, project: &P) -> Result<Vec<PathBuf>>
    where
        P: ModuleTree + DependencyResolver,
    {
        self.rewrite_each(project, "Stripped locks from", |manifest, resolver| {
            strip_locks(manifest, resolver)
        })
    }

    /// Splits multi-coordinate declarations so each can carry a lock.
    pub fn prepare_for_locks<P>(&self, project: &P) -> Result<Vec<PathBuf>>
    where
        P: ModuleTree + DependencyResolver,
    {
        self.rewrite_each(project, "Prepared", |manifest, resolver| {
            prepare_for_locks(manifest, resolver)
        })
    }

    /// Lists the version each declaration requests, optionally as if no
    /// lock clause were present.
    pub fn show<P>(&self, project: &P, ignore_locks: bool) -> Result<Vec<ModuleDeclarations>>
    where
        P: ModuleTree + DependencyResolver,
    {
        let targets = self.targets(project)?;
        let manifests = targets
            .iter()
            .map(|target| parse(&target.text, &target.path))
            .collect::<Result<Vec<_>>>()?;
        let root_variables = root_variables(project, &targets, &manifests);

        let cache = ResolutionCache::new();
        let overrides = OverrideMap::new();
        let mut listing = Vec::with_capacity(targets.len());
        for (target, manifest) in targets.into_iter().zip(&manifests) {
            let resolver =
                LockResolver::new(project, project, &overrides, &cache, target.module.clone());
            let mut variables = manifest.variables().clone();
            variables.inherit(&root_variables);
            listing.push(ModuleDeclarations {
                declarations: effective_declarations(manifest, &resolver, &variables, ignore_locks),
                module: target.module,
                manifest: target.path,
            });
        }
        Ok(listing)
    }

    fn rewrite_each<P, F>(&self, project: &P, action: &str, rewrite: F) -> Result<Vec<PathBuf>>
    where
        P: ModuleTree + DependencyResolver,
        F: Fn(&Manifest, &LockResolver<'_>) -> String,
    {
        let targets = self.targets(project)?;
        let cache = ResolutionCache::new();
        let overrides = OverrideMap::new();

        let mut rewritten = Vec::with_capacity(targets.len());
        for target in &targets {
            let manifest = parse(&target.text, &target.path)?;
            let resolver =
                LockResolver::new(project, project, &overrides, &cache, target.module.clone());
            rewritten.push(rewrite(&manifest, &resolver));
        }
        write_changed(&targets, rewritten, action)
    }

    /// The owner, the root and the owner's descendants, one entry per
    /// existing Groovy manifest.
    fn targets<P: ModuleTree>(&self, project: &P) -> Result<Vec<Target>> {
        if !project.modules().contains(&self.module) {
            return Err(LockError::UnknownModule(self.module.to_string()));
        }

        let mut modules = vec![self.module.clone(), project.root()];
        modules.extend(project.descendants(&self.module));

        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for module in modules {
            let Some(path) = project.manifest_path(&module) else {
                continue;
            };
            if !seen.insert(path.clone()) {
                continue;
            }
            if !is_groovy_manifest(&path) {
                tracing::debug!("Skipping non-Groovy manifest {}", path.display());
                continue;
            }
            if !path.is_file() {
                tracing::debug!("Module {} has no manifest at {}", module, path.display());
                continue;
            }
            let text = std::fs::read_to_string(&path)?;
            targets.push(Target { module, path, text });
        }
        Ok(targets)
    }
}

/// Variables of the root manifest, when it is among the targets.
fn root_variables<P: ModuleTree>(
    project: &P,
    targets: &[Target],
    manifests: &[Manifest],
) -> VariableTable {
    let root = project.root();
    targets
        .iter()
        .zip(manifests)
        .find(|(target, _)| target.module == root)
        .map(|(_, manifest)| manifest.variables().clone())
        .unwrap_or_default()
}

fn is_groovy_manifest(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gradle")
}

fn parse(text: &str, path: &Path) -> Result<Manifest> {
    Manifest::parse(text).map_err(|err| err.in_manifest(path))
}

/// Stages every changed manifest in a temporary file beside it, then
/// renames them into place. A failure while staging leaves every manifest
/// as it was.
fn write_changed(targets: &[Target], rewritten: Vec<String>, action: &str) -> Result<Vec<PathBuf>> {
    let mut staged = Vec::new();
    for (target, text) in targets.iter().zip(rewritten) {
        if text == target.text {
            continue;
        }
        staged.push((stage(&target.path, &text)?, target.path.clone()));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (temp, path) in staged {
        temp.persist(&path).map_err(|err| err.error)?;
        tracing::info!("{} {}", action, path.display());
        written.push(path);
    }
    Ok(written)
}

fn stage(path: &Path, text: &str) -> Result<NamedTempFile> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(text.as_bytes())?;
    temp.as_file().sync_all()?;
    std::fs::set_permissions(temp.path(), std::fs::metadata(path)?.permissions())?;
    Ok(temp)
}

/// At most one [`LockService`] per module, created on first use.
#[derive(Debug, Default)]
pub struct LockServiceRegistry {
    services: DashMap<ModulePath, Arc<LockService>>,
}

impl LockServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_module(&self, module: &ModulePath) -> Arc<LockService> {
        let entry = self
            .services
            .entry(module.clone())
            .or_insert_with(|| Arc::new(LockService::new(module.clone())));
        Arc::clone(entry.value())
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
