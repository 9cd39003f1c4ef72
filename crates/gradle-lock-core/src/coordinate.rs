//! Dependency coordinates and `group:name:version` notation.

use regex::Regex;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

/// `group:name[:version][@ext]`; group and version may be empty.
static NOTATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^:]*):([^:]+):?([^@:]*).*$").expect("Invalid regex")
});

/// Module identity: a coordinate without its version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId {
    pub group: Option<String>,
    pub name: String,
}

impl ModuleId {
    pub fn new(group: Option<impl Into<String>>, name: impl Into<String>) -> Self {
        Self {
            group: group.map(Into::into),
            name: name.into(),
        }
    }

    /// Parses `group:name` (or a bare `name`).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        match s.split_once(':') {
            Some((_, "")) => None,
            Some((group, name)) if !name.contains(':') => Some(Self {
                group: non_empty(group),
                name: name.to_string(),
            }),
            Some(_) => None,
            None if s.is_empty() => None,
            None => Some(Self {
                group: None,
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{group}:{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A declared dependency coordinate.
///
/// Only `name` is mandatory; group and version may be inherited from a
/// platform or BOM. Equality ignores the version.
#[derive(Debug, Clone)]
pub struct Coordinate {
    pub group: Option<String>,
    pub name: String,
    pub version: Option<String>,
}

impl Coordinate {
    pub fn new(
        group: Option<impl Into<String>>,
        name: impl Into<String>,
        version: Option<impl Into<String>>,
    ) -> Self {
        Self {
            group: group.map(Into::into),
            name: name.into(),
            version: version.map(Into::into),
        }
    }

    pub fn module_id(&self) -> ModuleId {
        ModuleId {
            group: self.group.clone(),
            name: self.name.clone(),
        }
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.group == other.group && self.name == other.name
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group.as_deref().unwrap_or(""), self.name)?;
        if let Some(version) = &self.version {
            write!(f, ":{version}")?;
        }
        Ok(())
    }
}

/// Splits raw `group:name[:version][@ext]` notation.
///
/// Returns `None` when the string has no `:` separator at all. Empty group
/// or version segments become `None`; anything after `@` or a fourth
/// segment (classifier) is ignored.
///
/// # Examples
///
/// ```
/// use gradle_lock_core::parse_notation;
///
/// let c = parse_notation("com.google.guava:guava:18.+@jar").unwrap();
/// assert_eq!(c.group.as_deref(), Some("com.google.guava"));
/// assert_eq!(c.name, "guava");
/// assert_eq!(c.version.as_deref(), Some("18.+"));
/// ```
pub fn parse_notation(notation: &str) -> Option<Coordinate> {
    let caps = NOTATION_PATTERN.captures(notation)?;
    Some(Coordinate {
        group: non_empty(&caps[1]),
        name: caps[2].to_string(),
        version: non_empty(&caps[3]),
    })
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
