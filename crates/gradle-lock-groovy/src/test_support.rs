//! In-memory project used by unit tests.

use gradle_lock_core::{DependencyResolver, ModuleId, ModulePath, ModuleTree};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;

type ConfigurationTable = BTreeMap<String, (bool, BTreeMap<ModuleId, String>)>;

#[derive(Default)]
pub(crate) struct FakeBuild {
    children: HashMap<ModulePath, Vec<ModulePath>>,
    modules: HashMap<ModulePath, ConfigurationTable>,
}

impl FakeBuild {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn child(mut self, parent: &str, child: &str) -> Self {
        self.children
            .entry(ModulePath::new(parent))
            .or_default()
            .push(ModulePath::new(child));
        self
    }

    pub(crate) fn configuration(mut self, module: &str, conf: &str, resolvable: bool) -> Self {
        self.modules
            .entry(ModulePath::new(module))
            .or_default()
            .entry(conf.to_string())
            .or_insert((resolvable, BTreeMap::new()))
            .0 = resolvable;
        self
    }

    pub(crate) fn select(mut self, module: &str, conf: &str, id: &str, version: &str) -> Self {
        self.modules
            .entry(ModulePath::new(module))
            .or_default()
            .entry(conf.to_string())
            .or_insert((true, BTreeMap::new()))
            .1
            .insert(ModuleId::parse(id).unwrap(), version.to_string());
        self
    }
}

impl ModuleTree for FakeBuild {
    fn root(&self) -> ModulePath {
        ModulePath::root()
    }

    fn submodules(&self, module: &ModulePath) -> Vec<ModulePath> {
        self.children.get(module).cloned().unwrap_or_default()
    }

    fn manifest_path(&self, _module: &ModulePath) -> Option<PathBuf> {
        None
    }
}

impl DependencyResolver for FakeBuild {
    fn declared_configurations(&self, module: &ModulePath) -> BTreeSet<String> {
        self.modules
            .get(module)
            .map(|confs| confs.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn resolvable_configurations(&self, module: &ModulePath) -> BTreeSet<String> {
        self.modules
            .get(module)
            .map(|confs| {
                confs
                    .iter()
                    .filter(|(_, (resolvable, _))| *resolvable)
                    .map(|(name, _)| name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn first_level_versions(
        &self,
        module: &ModulePath,
        configuration: &str,
    ) -> BTreeMap<ModuleId, String> {
        self.modules
            .get(module)
            .and_then(|confs| confs.get(configuration))
            .map(|(_, selected)| selected.clone())
            .unwrap_or_default()
    }
}
