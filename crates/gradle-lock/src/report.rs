//! JSON resolution report: the project tree and the versions resolution
//! actually selected, as exported from a Gradle run.
//!
//! ```json
//! {
//!   "path": ":",
//!   "manifest": "build.gradle",
//!   "configurations": {
//!     "compile": {
//!       "resolvable": true,
//!       "dependencies": { "com.google.guava:guava": "18.0" }
//!     }
//!   },
//!   "children": [{ "path": ":core", "manifest": "core/build.gradle" }]
//! }
//! ```
//!
//! Manifest paths are relative to the report's directory. A module without
//! a `manifest` entry uses `build.gradle` in its project directory.

use gradle_lock_core::{DependencyResolver, LockError, ModuleId, ModulePath, ModuleTree, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleReport {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
    #[serde(default)]
    pub configurations: BTreeMap<String, ConfigurationReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ModuleReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationReport {
    #[serde(default = "default_resolvable")]
    pub resolvable: bool,
    /// `group:name` → selected version of first-level dependencies.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

const fn default_resolvable() -> bool {
    true
}

#[derive(Debug, Clone)]
struct ModuleEntry {
    manifest: PathBuf,
    children: Vec<ModulePath>,
    configurations: BTreeMap<String, (bool, BTreeMap<ModuleId, String>)>,
}

/// A loaded report, answering for both the module tree and the resolver.
#[derive(Debug, Clone)]
pub struct ResolutionReport {
    root: ModulePath,
    modules: HashMap<ModulePath, ModuleEntry>,
}

impl ResolutionReport {
    /// Reads a report file; manifest paths resolve against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let root: ModuleReport =
            serde_json::from_str(&content).map_err(|source| LockError::Report {
                path: path.to_path_buf(),
                source,
            })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let report = Self::from_modules(root, base_dir);
        tracing::debug!(
            "Loaded resolution report {} with {} modules",
            path.display(),
            report.modules.len()
        );
        Ok(report)
    }

    pub fn from_modules(root: ModuleReport, base_dir: &Path) -> Self {
        let mut report = Self {
            root: ModulePath::new(&root.path),
            modules: HashMap::new(),
        };
        report.add(root, base_dir);
        report
    }

    fn add(&mut self, module: ModuleReport, base_dir: &Path) -> ModulePath {
        let path = ModulePath::new(&module.path);
        let manifest = module
            .manifest
            .unwrap_or_else(|| default_manifest(&path));

        let configurations = module
            .configurations
            .into_iter()
            .map(|(name, conf)| {
                let selected = conf
                    .dependencies
                    .into_iter()
                    .filter_map(|(key, version)| match ModuleId::parse(&key) {
                        Some(id) => Some((id, version)),
                        None => {
                            tracing::warn!("Ignoring malformed module '{}' in {}", key, path);
                            None
                        }
                    })
                    .collect();
                (name, (conf.resolvable, selected))
            })
            .collect();

        let children = module
            .children
            .into_iter()
            .map(|child| self.add(child, base_dir))
            .collect();

        self.modules.insert(
            path.clone(),
            ModuleEntry {
                manifest: base_dir.join(manifest),
                children,
                configurations,
            },
        );
        path
    }

    pub fn contains(&self, module: &ModulePath) -> bool {
        self.modules.contains_key(module)
    }
}

/// `:` → `build.gradle`, `:a:b` → `a/b/build.gradle`.
fn default_manifest(module: &ModulePath) -> PathBuf {
    module
        .as_str()
        .split(':')
        .filter(|segment| !segment.is_empty())
        .collect::<PathBuf>()
        .join("build.gradle")
}

impl ModuleTree for ResolutionReport {
    fn root(&self) -> ModulePath {
        self.root.clone()
    }

    fn submodules(&self, module: &ModulePath) -> Vec<ModulePath> {
        self.modules
            .get(module)
            .map(|entry| entry.children.clone())
            .unwrap_or_default()
    }

    fn manifest_path(&self, module: &ModulePath) -> Option<PathBuf> {
        self.modules.get(module).map(|entry| entry.manifest.clone())
    }
}

impl DependencyResolver for ResolutionReport {
    fn declared_configurations(&self, module: &ModulePath) -> BTreeSet<String> {
        self.modules
            .get(module)
            .map(|entry| entry.configurations.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn resolvable_configurations(&self, module: &ModulePath) -> BTreeSet<String> {
        self.modules
            .get(module)
            .map(|entry| {
                entry
                    .configurations
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
            .and_then(|entry| entry.configurations.get(configuration))
            .map(|(_, selected)| selected.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"{
        "path": ":",
        "configurations": {
            "compile": { "dependencies": { "com.google.guava:guava": "18.0" } },
            "bom": { "resolvable": false }
        },
        "children": [
            {
                "path": ":core",
                "configurations": {
                    "compile": { "dependencies": { "com.google.guava:guava": "16.0", "a:b:c": "1" } }
                },
                "children": [{ "path": ":core:api", "manifest": "api.gradle" }]
            }
        ]
    }"#;

    fn report() -> ResolutionReport {
        let root: ModuleReport = serde_json::from_str(REPORT).unwrap();
        ResolutionReport::from_modules(root, Path::new("/work"))
    }

    #[test]
    fn test_tree_shape() {
        let report = report();
        let core = ModulePath::new(":core");
        assert_eq!(report.root(), ModulePath::root());
        assert_eq!(report.submodules(&ModulePath::root()), vec![core.clone()]);
        assert_eq!(
            report.descendants(&ModulePath::root()),
            vec![core.clone(), ModulePath::new(":core:api")]
        );
        assert!(report.contains(&core));
        assert!(!report.contains(&ModulePath::new(":missing")));
    }

    #[test]
    fn test_manifest_paths() {
        let report = report();
        assert_eq!(
            report.manifest_path(&ModulePath::root()),
            Some(PathBuf::from("/work/build.gradle"))
        );
        assert_eq!(
            report.manifest_path(&ModulePath::new(":core")),
            Some(PathBuf::from("/work/core/build.gradle"))
        );
        assert_eq!(
            report.manifest_path(&ModulePath::new(":core:api")),
            Some(PathBuf::from("/work/api.gradle"))
        );
    }

    #[test]
    fn test_configurations() {
        let report = report();
        let root = ModulePath::root();
        assert_eq!(report.declared_configurations(&root).len(), 2);
        assert!(report.is_resolvable(&root, "compile"));
        assert!(!report.is_resolvable(&root, "bom"));

        let guava = ModuleId::parse("com.google.guava:guava").unwrap();
        assert_eq!(
            report.selected_version(&ModulePath::new(":core"), "compile", &guava),
            Some("16.0".to_string())
        );
        // Malformed keys are dropped.
        assert_eq!(
            report
                .first_level_versions(&ModulePath::new(":core"), "compile")
                .len(),
            1
        );
    }

    #[test]
    fn test_load_reports_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ResolutionReport::load(&path),
            Err(LockError::Report { .. })
        ));
    }

    #[test]
    fn test_load_resolves_against_report_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(&path, REPORT).unwrap();
        let report = ResolutionReport::load(&path).unwrap();
        assert_eq!(
            report.manifest_path(&ModulePath::new(":core")),
            Some(dir.path().join("core/build.gradle"))
        );
    }
}
