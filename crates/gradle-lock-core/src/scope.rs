//! Configuration scopes and caller-supplied version overrides.

use crate::coordinate::ModuleId;
use std::collections::HashMap;
use std::fmt;

/// Sentinel configuration name meaning "every configuration of the module".
pub const ALL_CONFIGURATIONS: &str = "all";

/// Which configurations of a module a declaration applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigurationScope {
    All,
    Named(String),
}

impl ConfigurationScope {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Maps the literal `all` to [`ConfigurationScope::All`].
    pub fn parse(name: &str) -> Self {
        if name == ALL_CONFIGURATIONS {
            Self::All
        } else {
            Self::Named(name.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::All => ALL_CONFIGURATIONS,
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for ConfigurationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A module identity within one named configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigurationModuleId {
    pub module: ModuleId,
    pub configuration: String,
}

impl ConfigurationModuleId {
    pub fn new(module: ModuleId, configuration: impl Into<String>) -> Self {
        Self {
            module,
            configuration: configuration.into(),
        }
    }
}

/// Versions forced by the caller, short-circuiting resolution.
#[derive(Debug, Clone, Default)]
pub struct OverrideMap {
    entries: HashMap<ConfigurationModuleId, String>,
}

impl OverrideMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ConfigurationModuleId, version: impl Into<String>) {
        self.entries.insert(key, version.into());
    }

    pub fn get(&self, module: &ModuleId, configuration: &str) -> Option<&str> {
        self.entries
            .get(&ConfigurationModuleId::new(module.clone(), configuration))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ConfigurationModuleId, String)> for OverrideMap {
    fn from_iter<T: IntoIterator<Item = (ConfigurationModuleId, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
