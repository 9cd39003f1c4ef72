//! Discovery of lockable declarations in a manifest tree.
//!
//! The walk carries an immutable chain of scope frames, one per enclosing
//! call. A frame holds the call's receiver path segments followed by its
//! method name, so `configurations.compile { resolutionStrategy { } }`
//! and `configurations { compile { resolutionStrategy { } } }` produce
//! the same name stack. Leaving a subtree simply drops its frame.
//!
//! Classification of a call looks at the names enclosing it (ancestor
//! frames plus its own receiver segments):
//! - under `dependencies`, a call named after a known configuration that
//!   carries coordinate arguments is a dependency declaration;
//! - under `resolutionStrategy`, a `force` call is a force declaration
//!   scoped to the name following the nearest `configurations`;
//! - under `ignore`, the declaration is reported with `ignored` set.

use crate::ast::{Block, Call, Expr, LockClause, MapLit, Span, Statement, StrLit};
use crate::variables::VariableTable;
use gradle_lock_core::{Coordinate, ConfigurationScope, LockResolver, parse_notation};
use std::collections::{BTreeSet, HashSet};

const DEPENDENCIES: &str = "dependencies";
const RESOLUTION_STRATEGY: &str = "resolutionStrategy";
const CONFIGURATIONS: &str = "configurations";
const IGNORE: &str = "ignore";
const FORCE: &str = "force";

/// Known configuration names of the module owning a manifest.
pub trait Configurations {
    fn contains_configuration(&self, name: &str) -> bool;
}

impl Configurations for LockResolver<'_> {
    fn contains_configuration(&self, name: &str) -> bool {
        self.is_configuration(name)
    }
}

impl Configurations for BTreeSet<String> {
    fn contains_configuration(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl Configurations for HashSet<String> {
    fn contains_configuration(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl<const N: usize> Configurations for [&str; N] {
    fn contains_configuration(&self, name: &str) -> bool {
        self.iter().any(|candidate| *candidate == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteKind {
    Dependency { configuration: String },
    Force { scope: ConfigurationScope },
}

impl SiteKind {
    pub fn scope(&self) -> ConfigurationScope {
        match self {
            Self::Dependency { configuration } => ConfigurationScope::named(configuration),
            Self::Force { scope } => scope.clone(),
        }
    }
}

/// How a coordinate is written.
#[derive(Debug, Clone, PartialEq)]
pub enum Notation {
    /// `'group:name:version'`, possibly interpolated.
    String(StrLit),
    /// `group: '...', name: '...', version: '...'`
    Map(MapLit),
}

impl Notation {
    pub fn span(&self) -> Span {
        match self {
            Self::String(lit) => lit.span,
            Self::Map(map) => map.span,
        }
    }

    /// The notation as written, interpolations rendered `${name}`.
    pub fn raw(&self) -> String {
        match self {
            Self::String(lit) => lit.raw(),
            Self::Map(map) => ["group", "name", "version"]
                .iter()
                .map(|key| map_value(map, key).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(":"),
        }
    }
}

/// One lockable coordinate inside a dependency or `force` call.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationSite {
    pub kind: SiteKind,
    /// Method name of the declaring call (`compile`, `force`, ...).
    pub call: String,
    /// The declaring call, from receiver through arguments and closure.
    pub call_span: Span,
    pub method_span: Span,
    /// Coordinate arguments of the call; more than one makes a single
    /// trailing lock clause ambiguous.
    pub coordinate_args: usize,
    /// Arguments that are not coordinates (`optional`, `project(...)`).
    pub extra_args: usize,
    pub has_closure: bool,
    pub notation: Notation,
    pub lock: Option<LockClause>,
    /// Offset where a new ` lock '<v>'` clause is inserted.
    pub anchor: usize,
    pub ignored: bool,
}

impl DeclarationSite {
    pub fn scope(&self) -> ConfigurationScope {
        self.kind.scope()
    }

    pub fn is_force(&self) -> bool {
        matches!(self.kind, SiteKind::Force { .. })
    }

    /// Resolves the written notation into a coordinate.
    ///
    /// String notation is split first and only then has its version
    /// segment expanded; an undefined variable leaves the version unset.
    pub fn coordinate(&self, variables: &VariableTable) -> Option<Coordinate> {
        let mut coordinate = match &self.notation {
            Notation::String(lit) => parse_notation(&lit.raw())?,
            Notation::Map(map) => Coordinate {
                group: map_value(map, "group").filter(|g| !g.is_empty()),
                name: map_value(map, "name")?,
                version: map_value(map, "version"),
            },
        };
        coordinate.version = coordinate
            .version
            .and_then(|version| variables.substitute(&version));
        Some(coordinate)
    }

    /// Version pinned by the existing lock clause.
    pub fn lock_version(&self) -> Option<String> {
        self.lock.as_ref().map(|lock| lock.value.version())
    }
}

/// Text of a map entry value; identifiers become `${path}` references.
fn map_value(map: &MapLit, key: &str) -> Option<String> {
    match &map.get(key)?.value {
        Expr::Str(lit) => Some(lit.raw()),
        Expr::Number(number) => Some(number.text.clone()),
        expr => expr.path().map(|path| format!("${{{}}}", path.join("."))),
    }
}

struct Frame<'a, 'p> {
    names: Vec<&'a str>,
    parent: Option<&'p Frame<'a, 'p>>,
}

impl<'a> Frame<'a, '_> {
    /// Names from the outermost frame down to this one.
    fn stack(&self) -> Vec<&'a str> {
        let mut frames = vec![self];
        let mut current = self.parent;
        while let Some(frame) = current {
            frames.push(frame);
            current = frame.parent;
        }
        frames
            .into_iter()
            .rev()
            .flat_map(|frame| frame.names.iter().copied())
            .collect()
    }
}

/// Finds every dependency and force declaration under `root`.
pub fn walk(root: &Block, configurations: &dyn Configurations) -> Vec<DeclarationSite> {
    let mut walker = Walker {
        configurations,
        sites: Vec::new(),
    };
    walker.block(root, None);
    walker.sites
}

struct Walker<'c> {
    configurations: &'c dyn Configurations,
    sites: Vec<DeclarationSite>,
}

impl Walker<'_> {
    fn block(&mut self, block: &Block, frame: Option<&Frame<'_, '_>>) {
        for statement in &block.statements {
            match statement {
                Statement::Expr(expr) => self.expr(expr, frame),
                Statement::Assign(assign) => self.expr(&assign.value, frame),
            }
        }
    }

    fn expr(&mut self, expr: &Expr, frame: Option<&Frame<'_, '_>>) {
        match expr {
            Expr::Call(call) => self.call(call, frame),
            Expr::Property(property) => self.expr(&property.target, frame),
            Expr::Map(map) => map.entries.iter().for_each(|e| self.expr(&e.value, frame)),
            Expr::List(list) => list.items.iter().for_each(|i| self.expr(i, frame)),
            Expr::Closure(block) => self.block(block, frame),
            Expr::Other(compound) => compound.children.iter().for_each(|c| self.expr(c, frame)),
            Expr::Str(_) | Expr::Number(_) | Expr::Ident(_) => {}
        }
    }

    fn call(&mut self, call: &Call, parent: Option<&Frame<'_, '_>>) {
        // Chained and computed receivers are walked in the enclosing scope.
        if let Some(receiver) = &call.receiver {
            if receiver.path().is_none() {
                self.expr(receiver, parent);
            }
        }

        let mut names = call.receiver_path();
        names.push(call.method.as_str());
        let frame = Frame { names, parent };

        let stack = frame.stack();
        let enclosing = &stack[..stack.len() - 1];
        self.classify(call, enclosing);

        for arg in &call.args {
            self.expr(arg, Some(&frame));
        }
        if let Some(closure) = &call.closure {
            self.block(closure, Some(&frame));
        }
    }

    fn classify(&mut self, call: &Call, enclosing: &[&str]) {
        let ignored = enclosing.contains(&IGNORE);

        let kind = if call.method == FORCE && enclosing.contains(&RESOLUTION_STRATEGY) {
            let Some(scope) = force_scope(enclosing) else {
                return;
            };
            if scope != ConfigurationScope::All
                && !self.configurations.contains_configuration(scope.name())
            {
                return;
            }
            SiteKind::Force { scope }
        } else if enclosing.contains(&DEPENDENCIES)
            && self.configurations.contains_configuration(&call.method)
        {
            SiteKind::Dependency {
                configuration: call.method.clone(),
            }
        } else {
            return;
        };

        let notations: Vec<Notation> = call.args.iter().filter_map(coordinate_arg).collect();
        if notations.is_empty() {
            return;
        }
        let coordinate_args = notations.len();
        let extra_args = call.args.len() - coordinate_args;

        tracing::debug!(
            "Found {:?} declaration '{}' with {} coordinate(s){}",
            kind,
            call.method,
            coordinate_args,
            if ignored { " (ignored)" } else { "" }
        );

        for notation in notations {
            self.sites.push(DeclarationSite {
                kind: kind.clone(),
                call: call.method.clone(),
                call_span: call.span,
                method_span: call.method_span,
                coordinate_args,
                extra_args,
                has_closure: call.closure.is_some(),
                notation,
                lock: call.lock.clone(),
                anchor: call.span.end,
                ignored,
            });
        }
    }
}

/// The name following the nearest enclosing `configurations`.
fn force_scope(enclosing: &[&str]) -> Option<ConfigurationScope> {
    let idx = enclosing.iter().rposition(|name| *name == CONFIGURATIONS)?;
    let name = enclosing.get(idx + 1)?;
    if *name == RESOLUTION_STRATEGY {
        return None;
    }
    Some(ConfigurationScope::parse(name))
}

fn coordinate_arg(arg: &Expr) -> Option<Notation> {
    match arg {
        Expr::Str(lit) => Some(Notation::String(lit.clone())),
        Expr::Map(map) if map.get("name").is_some() => Some(Notation::Map(map.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_script;

    const CONFS: [&str; 4] = ["compile", "testCompile", "myconfig", "runtime"];

    fn sites(src: &str) -> Vec<DeclarationSite> {
        walk(&parse_script(src).unwrap(), &CONFS)
    }

    fn notations(sites: &[DeclarationSite]) -> Vec<String> {
        sites.iter().map(|s| s.notation.raw()).collect()
    }

    #[test]
    fn test_dependency_sites() {
        let found = sites(
            "dependencies {\n    compile 'com.google.guava:guava:18.+'\n    testCompile 'junit:junit:4.+'\n}\n",
        );
        assert_eq!(found.len(), 2);
        assert_eq!(
            found[0].kind,
            SiteKind::Dependency {
                configuration: "compile".into()
            }
        );
        assert_eq!(found[1].scope(), ConfigurationScope::named("testCompile"));
        assert!(found.iter().all(|s| !s.ignored && s.lock.is_none()));
    }

    #[test]
    fn test_unknown_configuration_is_not_a_site() {
        let found = sites("dependencies {\n    helper 'a:b:1.0'\n    compile project(':core')\n}\n");
        assert!(found.is_empty());
    }

    #[test]
    fn test_calls_outside_dependencies_are_not_sites() {
        let found = sites("compile 'a:b:1.0'\nrepositories {\n    compile 'a:b:1.0'\n}\n");
        assert!(found.is_empty());
    }

    #[test]
    fn test_sibling_blocks_are_unaffected() {
        let found = sites(
            "dependencies {\n    compile 'a:b:1.+'\n}\ntask foo {\n    compile 'c:d:1.+'\n}\n",
        );
        assert_eq!(notations(&found), vec!["a:b:1.+"]);
    }

    #[test]
    fn test_receiver_segments_count_as_scope() {
        let found = sites("dependencies.compile 'a:b:1.+'\nsubprojects {\n    dependencies {\n        runtime 'c:d:2.+'\n    }\n}\n");
        assert_eq!(notations(&found), vec!["a:b:1.+", "c:d:2.+"]);
    }

    #[test]
    fn test_map_notation_site() {
        let found = sites(
            "dependencies {\n    compile group: 'commons-lang', name: 'commons-lang', version: '2.+'\n}\n",
        );
        assert_eq!(found.len(), 1);
        let coordinate = found[0].coordinate(&VariableTable::new()).unwrap();
        assert_eq!(coordinate.group.as_deref(), Some("commons-lang"));
        assert_eq!(coordinate.version.as_deref(), Some("2.+"));
        assert!(matches!(found[0].notation, Notation::Map(_)));
    }

    #[test]
    fn test_multiple_coordinates_share_a_call() {
        let found = sites("dependencies {\n    compile('a:b:1.+', 'c:d:2.+') lock '1.0'\n}\n");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|s| s.coordinate_args == 2));
        assert_eq!(found[0].call_span, found[1].call_span);
    }

    #[test]
    fn test_ignore_block_flags_sites() {
        let found = sites(
            "dependencies {\n    ignore {\n        compile 'a:b:1.+'\n    }\n    compile 'c:d:1.+'\n}\n",
        );
        assert_eq!(found.len(), 2);
        assert!(found[0].ignored);
        assert!(!found[1].ignored);
    }

    #[test]
    fn test_force_scopes() {
        let src = "configurations.all {\n    resolutionStrategy {\n        force 'com.google.guava:guava:16.+'\n    }\n}\nconfigurations.compile {\n    resolutionStrategy {\n        force 'com.google.guava:guava:17.+'\n    }\n}\nconfigurations {\n    testCompile {\n        resolutionStrategy {\n            force 'com.google.guava:guava:14.+'\n        }\n    }\n}\n";
        let scopes: Vec<_> = sites(src).iter().map(DeclarationSite::scope).collect();
        assert_eq!(
            scopes,
            vec![
                ConfigurationScope::All,
                ConfigurationScope::named("compile"),
                ConfigurationScope::named("testCompile"),
            ]
        );
    }

    #[test]
    fn test_force_on_dotted_receiver() {
        let found = sites("configurations.compile.resolutionStrategy.force 'a:b:1.+'\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].scope(), ConfigurationScope::named("compile"));
    }

    #[test]
    fn test_force_with_unknown_scope_is_skipped() {
        let found = sites("configurations.bogus {\n    resolutionStrategy {\n        force 'a:b:1.+'\n    }\n}\n");
        assert!(found.is_empty());
    }

    #[test]
    fn test_force_lists_several_coordinates() {
        let found = sites(
            "configurations.all {\n    resolutionStrategy {\n        force 'a:b:1.+', 'c:d:2.+'\n    }\n}\n",
        );
        assert_eq!(notations(&found), vec!["a:b:1.+", "c:d:2.+"]);
        assert!(found.iter().all(DeclarationSite::is_force));
    }

    #[test]
    fn test_ignored_force() {
        let found = sites("configurations.all {\n    resolutionStrategy {\n        ignore {\n            force 'a:b:1.+'\n        }\n    }\n}\n");
        assert_eq!(found.len(), 1);
        assert!(found[0].ignored);
    }

    #[test]
    fn test_closure_and_lock_are_recorded() {
        let src = "dependencies {\n    compile('a:b:latest.release') {\n        exclude group: 'x'\n    } lock '2.0'\n}\n";
        let found = sites(src);
        assert_eq!(found.len(), 1);
        assert!(found[0].has_closure);
        assert_eq!(found[0].lock_version().as_deref(), Some("2.0"));
        assert_eq!(&src[found[0].anchor - 1..found[0].anchor], "}");
    }

    #[test]
    fn test_interpolated_version_coordinate() {
        let found = sites("dependencies {\n    compile \"com.google.guava:guava:$guavaVersion\"\n}\n");
        let mut vars = VariableTable::new();
        assert_eq!(found[0].coordinate(&vars).unwrap().version, None);
        vars.insert("guavaVersion", "18.0");
        assert_eq!(
            found[0].coordinate(&vars).unwrap().version.as_deref(),
            Some("18.0")
        );
    }

    #[test]
    fn test_optional_argument_counts_as_extra() {
        let found = sites("dependencies {\n    compile 'a:b:1.+', optional\n}\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].extra_args, 1);
    }
}
