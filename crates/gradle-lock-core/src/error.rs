//! Error taxonomy shared across gradle-lock crates.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// 1-based line/column position inside a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Error, Debug)]
pub enum LockError {
    /// The manifest could not be turned into a syntax tree.
    #[error("Failed to parse {manifest}:{location}: {message}")]
    Parse {
        manifest: PathBuf,
        location: SourceLocation,
        message: String,
    },

    /// A single lock clause would apply to several coordinates.
    #[error(
        "Cannot lock {manifest}:{location}: '{call}' declares {} coordinates ({}) under one lock",
        coordinates.len(),
        coordinates.join(", ")
    )]
    AmbiguousLockTarget {
        manifest: PathBuf,
        location: SourceLocation,
        call: String,
        coordinates: Vec<String>,
    },

    #[error("Unknown module '{0}'")]
    UnknownModule(String),

    #[error("Invalid override for '{key}': {message}")]
    InvalidOverride { key: String, message: String },

    #[error("Failed to read resolution report {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LockError>;

impl LockError {
    /// Whether the failure points at a location inside a manifest.
    pub fn is_manifest_error(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::AmbiguousLockTarget { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = LockError::Parse {
            manifest: PathBuf::from("build.gradle"),
            location: SourceLocation::new(3, 7),
            message: "unterminated string".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse build.gradle:3:7: unterminated string"
        );
        assert!(err.is_manifest_error());
    }

    #[test]
    fn test_ambiguous_display() {
        let err = LockError::AmbiguousLockTarget {
            manifest: PathBuf::from("sub/build.gradle"),
            location: SourceLocation::new(2, 5),
            call: "compile".into(),
            coordinates: vec!["a:b:latest.release".into(), "c:d:latest.release".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("sub/build.gradle:2:5"));
        assert!(msg.contains("2 coordinates"));
        assert!(msg.contains("a:b:latest.release, c:d:latest.release"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::from(std::io::ErrorKind::NotFound);
        let err: LockError = io_err.into();
        assert!(matches!(err, LockError::Io(_)));
        assert!(!err.is_manifest_error());
    }
}
