//! Integration tests for lock planning and rewriting using fixture files.

use gradle_lock_core::{
    ConfigurationModuleId, DependencyResolver, LockResolver, ModuleId, ModulePath, ModuleTree,
    OverrideMap, ResolutionCache,
};
use gradle_lock_groovy::{
    GroovyError, Manifest, apply_lock_updates, plan_lock_updates, prepare_for_locks, strip_locks,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;

#[derive(Default)]
struct Project {
    children: HashMap<ModulePath, Vec<ModulePath>>,
    selected: HashMap<(ModulePath, String), BTreeMap<ModuleId, String>>,
}

impl Project {
    fn child(mut self, parent: &str, child: &str) -> Self {
        self.children
            .entry(ModulePath::new(parent))
            .or_default()
            .push(ModulePath::new(child));
        self
    }

    fn select(mut self, module: &str, conf: &str, id: &str, version: &str) -> Self {
        self.selected
            .entry((ModulePath::new(module), conf.to_string()))
            .or_default()
            .insert(ModuleId::parse(id).unwrap(), version.to_string());
        self
    }

    fn fixture() -> Self {
        Self::default()
            .select(":", "compile", "com.google.guava:guava", "17.0")
            .select(":", "compile", "commons-lang:commons-lang", "2.6")
            .select(":", "compile", "org.springframework:spring-core", "4.3.0.RELEASE")
            .select(":", "compile", "com.fasterxml.jackson.core:jackson-databind", "2.8.0")
            .select(":", "compile", "org.latencyutils:LatencyUtils", "2.0.3")
            .select(":", "compile", "io.reactivex:rxjava", "1.3.0")
            .select(":", "testCompile", "com.google.guava:guava", "14.0.1")
            .select(":", "testCompile", "junit:junit", "4.12")
            .select(":", "myconfig", "org.slf4j:slf4j-api", "1.7.21")
    }
}

impl ModuleTree for Project {
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

impl DependencyResolver for Project {
    fn declared_configurations(&self, module: &ModulePath) -> BTreeSet<String> {
        self.selected
            .keys()
            .filter(|(m, _)| m == module)
            .map(|(_, conf)| conf.clone())
            .collect()
    }

    fn resolvable_configurations(&self, module: &ModulePath) -> BTreeSet<String> {
        self.declared_configurations(module)
    }

    fn first_level_versions(
        &self,
        module: &ModulePath,
        configuration: &str,
    ) -> BTreeMap<ModuleId, String> {
        self.selected
            .get(&(module.clone(), configuration.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

fn update_with(
    project: &Project,
    module: &str,
    overrides: &OverrideMap,
    src: &str,
) -> Result<String, GroovyError> {
    let cache = ResolutionCache::new();
    let resolver = LockResolver::new(project, project, overrides, &cache, ModulePath::new(module));
    let prepared = prepare_for_locks(&Manifest::parse(src)?, &resolver);
    let manifest = Manifest::parse(prepared)?;
    let updates = plan_lock_updates(&manifest, manifest.variables(), &resolver)?;
    Ok(apply_lock_updates(&manifest, &updates))
}

fn update(project: &Project, src: &str) -> Result<String, GroovyError> {
    update_with(project, ":", &OverrideMap::new(), src)
}

fn strip(project: &Project, src: &str) -> String {
    let cache = ResolutionCache::new();
    let overrides = OverrideMap::new();
    let resolver = LockResolver::new(project, project, &overrides, &cache, ModulePath::root());
    strip_locks(&Manifest::parse(src).unwrap(), &resolver)
}

// --- Fixture manifest ---

#[test]
fn test_fixture_update() {
    let content = include_str!("fixtures/build.gradle");
    let locked = update(&Project::fixture(), content).unwrap();
    assert_eq!(locked, include_str!("fixtures/build.locked.gradle"));
}

#[test]
fn test_fixture_update_is_idempotent() {
    let project = Project::fixture();
    let locked = include_str!("fixtures/build.locked.gradle");
    assert_eq!(update(&project, locked).unwrap(), locked);
}

#[test]
fn test_fixture_strip() {
    let stripped = strip(&Project::fixture(), include_str!("fixtures/build.locked.gradle"));
    assert_eq!(stripped, include_str!("fixtures/build.stripped.gradle"));
}

#[test]
fn test_fixture_strip_then_update_round_trip() {
    let project = Project::fixture();
    let locked = include_str!("fixtures/build.locked.gradle");
    let stripped = strip(&project, locked);
    assert_eq!(update(&project, &stripped).unwrap(), locked);
}

// --- Literal scenarios ---

#[test]
fn test_scenario_add_lock() {
    let project = Project::default().select(":", "compile", "com.google.guava:guava", "18.0");
    assert_eq!(
        update(&project, "dependencies {\n    compile 'com.google.guava:guava:18.+'\n}\n").unwrap(),
        "dependencies {\n    compile 'com.google.guava:guava:18.+' lock '18.0'\n}\n"
    );
}

#[test]
fn test_scenario_update_lock() {
    let project = Project::default().select(":", "compile", "com.google.guava:guava", "18.0");
    assert_eq!(
        update(
            &project,
            "dependencies {\n    compile 'com.google.guava:guava:18.+' lock '16.0'\n}\n"
        )
        .unwrap(),
        "dependencies {\n    compile 'com.google.guava:guava:18.+' lock '18.0'\n}\n"
    );
}

#[test]
fn test_scenario_remove_lock_on_exact_match() {
    let project = Project::default().select(":", "compile", "com.google.guava:guava", "18.0");
    assert_eq!(
        update(
            &project,
            "dependencies {\n    compile 'com.google.guava:guava:18.0' lock '18.0'\n}\n"
        )
        .unwrap(),
        "dependencies {\n    compile 'com.google.guava:guava:18.0'\n}\n"
    );
}

#[test]
fn test_scenario_ambiguous_lock_target() {
    let project = Project::default().select(":", "compile", "a:b", "1.0");
    let err = update(
        &project,
        "dependencies {\n    compile('a:b:latest.release', 'c:d:latest.release') lock '1.0'\n}\n",
    )
    .unwrap_err();
    assert!(matches!(err, GroovyError::AmbiguousLockTarget { ref coordinates, .. } if coordinates.len() == 2));
}

#[test]
fn test_scenario_dynamic_forces() {
    let project = Project::default()
        .select(":", "compile", "com.google.guava:guava", "17.0")
        .select(":", "testCompile", "com.google.guava:guava", "14.0.1");
    let src = "configurations.all {\n    resolutionStrategy {\n        force 'com.google.guava:guava:16.+'\n    }\n}\nconfigurations.compile {\n    resolutionStrategy {\n        force 'com.google.guava:guava:17.+'\n    }\n}\n";
    assert_eq!(
        update(&project, src).unwrap(),
        "configurations.all {\n    resolutionStrategy {\n        force 'com.google.guava:guava:16.+' lock '17.0'\n    }\n}\nconfigurations.compile {\n    resolutionStrategy {\n        force 'com.google.guava:guava:17.+' lock '17.0'\n    }\n}\n"
    );
}

// --- Properties ---

#[test]
fn test_prepare_splits_before_locking() {
    let project = Project::default()
        .select(":", "compile", "com.google.guava:guava", "18.0")
        .select(":", "compile", "commons-lang:commons-lang", "2.6");
    assert_eq!(
        update(
            &project,
            "dependencies {\n    compile 'com.google.guava:guava:18.+',\n        'commons-lang:commons-lang:2.+'\n}\n"
        )
        .unwrap(),
        "dependencies {\n    compile 'com.google.guava:guava:18.+' lock '18.0'\n    compile 'commons-lang:commons-lang:2.+' lock '2.6'\n}\n"
    );
}

#[test]
fn test_scope_isolation() {
    let project = Project::default()
        .select(":", "compile", "com.google.guava:guava", "18.0")
        .select(":", "testCompile", "com.google.guava:guava", "16.0.1");
    let src = "dependencies {\n    compile 'com.google.guava:guava:18.+' lock '18.0'\n    testCompile 'com.google.guava:guava:16.+'\n}\n";
    assert_eq!(
        update(&project, src).unwrap(),
        "dependencies {\n    compile 'com.google.guava:guava:18.+' lock '18.0'\n    testCompile 'com.google.guava:guava:16.+' lock '16.0.1'\n}\n"
    );
}

#[test]
fn test_ignore_suppression() {
    let project = Project::default().select(":", "compile", "com.google.guava:guava", "18.0");
    let src = "dependencies {\n    ignore {\n        compile 'com.google.guava:guava:18.+' lock '16.0'\n    }\n}\n";
    assert_eq!(update(&project, src).unwrap(), src);
    assert_eq!(strip(&project, src), src);
}

#[test]
fn test_multi_module_aggregation() {
    let project = Project::default()
        .child(":", ":a")
        .child(":", ":b")
        .select(":a", "compile", "com.google.guava:guava", "16.0")
        .select(":b", "compile", "com.google.guava:guava", "18.0");
    let src = "allprojects {\n    configurations.all {\n        resolutionStrategy {\n            force 'com.google.guava:guava:latest.release'\n        }\n    }\n}\n";
    assert_eq!(
        update(&project, src).unwrap(),
        "allprojects {\n    configurations.all {\n        resolutionStrategy {\n            force 'com.google.guava:guava:latest.release' lock '18.0'\n        }\n    }\n}\n"
    );

    // A submodule resolves only within itself.
    let sub = "dependencies {\n    compile 'com.google.guava:guava:latest.release'\n}\n";
    assert_eq!(
        update_with(&project, ":a", &OverrideMap::new(), sub).unwrap(),
        "dependencies {\n    compile 'com.google.guava:guava:latest.release' lock '16.0'\n}\n"
    );
}

#[test]
fn test_overrides_take_precedence() {
    let project = Project::default().select(":", "compile", "com.google.guava:guava", "18.0");
    let overrides: OverrideMap = [(
        ConfigurationModuleId::new(ModuleId::parse("com.google.guava:guava").unwrap(), "compile"),
        "19.0".to_string(),
    )]
    .into_iter()
    .collect();
    let src = "dependencies {\n    compile 'com.google.guava:guava:18.+'\n}\n";
    assert_eq!(
        update_with(&project, ":", &overrides, src).unwrap(),
        "dependencies {\n    compile 'com.google.guava:guava:18.+' lock '19.0'\n}\n"
    );
}

#[test]
fn test_parse_failure_reports_location() {
    let err = update(&Project::default(), "dependencies {\n    compile 'a:b:1.0'\n").unwrap_err();
    assert!(matches!(err, GroovyError::Parse { .. }));
    assert_eq!(err.location().line, 1);
}
