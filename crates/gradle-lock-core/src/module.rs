//! Collaborator interfaces: the module tree and the dependency resolver.

use crate::coordinate::ModuleId;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// Gradle-style project path: `:` for the root, `:sub`, `:parent:child`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModulePath(String);

impl ModulePath {
    pub fn root() -> Self {
        Self(":".to_string())
    }

    /// Normalizes `sub`, `:sub` and `:sub:` to `:sub`.
    pub fn new(path: impl AsRef<str>) -> Self {
        let trimmed = path.as_ref().trim().trim_matches(':');
        if trimmed.is_empty() {
            Self::root()
        } else {
            Self(format!(":{trimmed}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root_path(&self) -> bool {
        self.0 == ":"
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shape of a (possibly multi-module) project.
pub trait ModuleTree: Send + Sync {
    fn root(&self) -> ModulePath;

    /// Direct children of `module`, in declaration order.
    fn submodules(&self, module: &ModulePath) -> Vec<ModulePath>;

    /// Build manifest of `module`, if it has one.
    fn manifest_path(&self, module: &ModulePath) -> Option<PathBuf>;

    fn is_root(&self, module: &ModulePath) -> bool {
        *module == self.root()
    }

    /// Every module below `module`, depth first, in tree order.
    fn descendants(&self, module: &ModulePath) -> Vec<ModulePath> {
        let mut out = Vec::new();
        let mut stack: Vec<ModulePath> = self.submodules(module).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            stack.extend(self.submodules(&next).into_iter().rev());
            out.push(next);
        }
        out
    }

    /// The root followed by all of its descendants.
    fn modules(&self) -> Vec<ModulePath> {
        let root = self.root();
        let mut out = vec![root.clone()];
        out.extend(self.descendants(&root));
        out
    }
}

/// The external dependency resolution engine.
///
/// Implementations answer for versions that were actually selected, not
/// for what a manifest declares.
pub trait DependencyResolver: Send + Sync {
    /// Configurations declared by `module` (e.g. `compile`, `myconfig`).
    fn declared_configurations(&self, module: &ModulePath) -> BTreeSet<String>;

    /// Declared configurations that can be resolved (BOM-only ones cannot).
    fn resolvable_configurations(&self, module: &ModulePath) -> BTreeSet<String>;

    fn is_resolvable(&self, module: &ModulePath, configuration: &str) -> bool {
        self.resolvable_configurations(module).contains(configuration)
    }

    /// Versions selected for the first-level dependencies of one configuration.
    fn first_level_versions(
        &self,
        module: &ModulePath,
        configuration: &str,
    ) -> BTreeMap<ModuleId, String>;

    /// Version selected for `id` within `configuration`, if it was a
    /// first-level dependency there.
    fn selected_version(
        &self,
        module: &ModulePath,
        configuration: &str,
        id: &ModuleId,
    ) -> Option<String> {
        self.first_level_versions(module, configuration)
            .remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Tree {
        children: HashMap<ModulePath, Vec<ModulePath>>,
    }

    impl ModuleTree for Tree {
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

    #[test]
    fn test_module_path_normalization() {
        assert_eq!(ModulePath::new("sub").as_str(), ":sub");
        assert_eq!(ModulePath::new(":sub:").as_str(), ":sub");
        assert_eq!(ModulePath::new(":a:b").as_str(), ":a:b");
        assert!(ModulePath::new(":").is_root_path());
        assert!(ModulePath::new("").is_root_path());
    }

    #[test]
    fn test_descendants_in_tree_order() {
        let mut children = HashMap::new();
        children.insert(
            ModulePath::root(),
            vec![ModulePath::new(":a"), ModulePath::new(":b")],
        );
        children.insert(ModulePath::new(":a"), vec![ModulePath::new(":a:x")]);
        let tree = Tree { children };

        let names: Vec<_> = tree
            .modules()
            .iter()
            .map(|m| m.as_str().to_string())
            .collect();
        assert_eq!(names, vec![":", ":a", ":a:x", ":b"]);
        assert!(tree.is_root(&ModulePath::root()));
        assert!(!tree.is_root(&ModulePath::new(":a")));
    }
}
