//! Lock resolution: the authoritative version for a declaration.
//!
//! A declaration written in module `M` for scope `S` locks to the highest
//! version (Gradle precedence) selected for its module identity across the
//! configurations in `S`. In the root of a multi-module tree the answer
//! is aggregated over every submodule instead, because root manifests
//! typically configure their children (`subprojects { dependencies { } }`).

use crate::coordinate::ModuleId;
use crate::module::{DependencyResolver, ModulePath, ModuleTree};
use crate::scope::{ConfigurationScope, OverrideMap};
use crate::version::max_version;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

type Selection = Rc<BTreeMap<ModuleId, String>>;

/// Per-run memo of resolver answers.
///
/// The external resolver is queried at most once per `(module, configuration)`
/// pair for the lifetime of the cache. Create one per update run.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    selections: RefCell<HashMap<(ModulePath, String), Selection>>,
    declared: RefCell<HashMap<ModulePath, Rc<BTreeSet<String>>>>,
    resolvable: RefCell<HashMap<ModulePath, Rc<BTreeSet<String>>>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn selection(
        &self,
        resolver: &dyn DependencyResolver,
        module: &ModulePath,
        configuration: &str,
    ) -> Selection {
        let key = (module.clone(), configuration.to_string());
        if let Some(hit) = self.selections.borrow().get(&key) {
            return Rc::clone(hit);
        }
        tracing::debug!("Resolving configuration {} of {}", configuration, module);
        let selection = Rc::new(resolver.first_level_versions(module, configuration));
        self.selections
            .borrow_mut()
            .insert(key, Rc::clone(&selection));
        selection
    }

    fn declared(
        &self,
        resolver: &dyn DependencyResolver,
        module: &ModulePath,
    ) -> Rc<BTreeSet<String>> {
        Rc::clone(
            self.declared
                .borrow_mut()
                .entry(module.clone())
                .or_insert_with(|| Rc::new(resolver.declared_configurations(module))),
        )
    }

    fn resolvable(
        &self,
        resolver: &dyn DependencyResolver,
        module: &ModulePath,
    ) -> Rc<BTreeSet<String>> {
        Rc::clone(
            self.resolvable
                .borrow_mut()
                .entry(module.clone())
                .or_insert_with(|| Rc::new(resolver.resolvable_configurations(module))),
        )
    }

    /// Number of distinct `(module, configuration)` pairs resolved so far.
    pub fn resolved_pairs(&self) -> usize {
        self.selections.borrow().len()
    }
}

/// Computes locked versions for declarations found in one module's manifest.
pub struct LockResolver<'a> {
    tree: &'a dyn ModuleTree,
    resolver: &'a dyn DependencyResolver,
    overrides: &'a OverrideMap,
    cache: &'a ResolutionCache,
    module: ModulePath,
}

impl<'a> LockResolver<'a> {
    pub fn new(
        tree: &'a dyn ModuleTree,
        resolver: &'a dyn DependencyResolver,
        overrides: &'a OverrideMap,
        cache: &'a ResolutionCache,
        module: ModulePath,
    ) -> Self {
        Self {
            tree,
            resolver,
            overrides,
            cache,
            module,
        }
    }

    /// Module whose manifest is being locked.
    pub fn module(&self) -> &ModulePath {
        &self.module
    }

    /// Whether `name` is a configuration of the owning module or any of
    /// its submodules.
    pub fn is_configuration(&self, name: &str) -> bool {
        if self.cache.declared(self.resolver, &self.module).contains(name) {
            return true;
        }
        self.tree
            .descendants(&self.module)
            .iter()
            .any(|sub| self.cache.declared(self.resolver, sub).contains(name))
    }

    /// Locked version for `id` within `scope`, or `None` when nothing in
    /// scope selected it.
    pub fn resolve(&self, scope: &ConfigurationScope, id: &ModuleId) -> Option<String> {
        let locked = if self.tree.is_root(&self.module) {
            let subs = self.tree.descendants(&self.module);
            if subs.is_empty() {
                self.resolve_in(&self.module, scope, id)
            } else {
                max_version(subs.iter().filter_map(|sub| self.resolve_in(sub, scope, id)))
            }
        } else {
            self.resolve_in(&self.module, scope, id)
        };

        tracing::debug!(
            "Locked {} in {} of {} to {:?}",
            id,
            scope,
            self.module,
            locked
        );
        locked
    }

    fn resolve_in(
        &self,
        module: &ModulePath,
        scope: &ConfigurationScope,
        id: &ModuleId,
    ) -> Option<String> {
        let resolvable = self.cache.resolvable(self.resolver, module);
        let configurations: Vec<&str> = match scope {
            ConfigurationScope::All => resolvable.iter().map(String::as_str).collect(),
            ConfigurationScope::Named(name) if resolvable.contains(name) => vec![name.as_str()],
            ConfigurationScope::Named(_) => Vec::new(),
        };

        let versions = configurations.into_iter().filter_map(|conf| {
            if let Some(forced) = self.overrides.get(id, conf) {
                return Some(forced.to_string());
            }
            self.cache
                .selection(self.resolver, module, conf)
                .get(id)
                .cloned()
        });

        max_version(versions)
    }
}
