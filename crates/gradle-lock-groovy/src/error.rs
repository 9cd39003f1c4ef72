//! Errors specific to Groovy manifest handling.

use gradle_lock_core::{LockError, SourceLocation};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroovyError {
    #[error("Failed to parse Groovy DSL at {location}: {message}")]
    Parse {
        location: SourceLocation,
        message: String,
    },

    #[error("Ambiguous lock target at {location}: '{call}' lists {} coordinates", coordinates.len())]
    AmbiguousLockTarget {
        location: SourceLocation,
        call: String,
        coordinates: Vec<String>,
    },
}

pub type Result<T> = std::result::Result<T, GroovyError>;

impl GroovyError {
    pub fn location(&self) -> SourceLocation {
        match self {
            Self::Parse { location, .. } | Self::AmbiguousLockTarget { location, .. } => *location,
        }
    }

    /// Attaches the manifest the error was found in.
    pub fn in_manifest(self, manifest: &Path) -> LockError {
        match self {
            Self::Parse { location, message } => LockError::Parse {
                manifest: manifest.to_path_buf(),
                location,
                message,
            },
            Self::AmbiguousLockTarget {
                location,
                call,
                coordinates,
            } => LockError::AmbiguousLockTarget {
                manifest: manifest.to_path_buf(),
                location,
                call,
                coordinates,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = GroovyError::Parse {
            location: SourceLocation::new(4, 1),
            message: "unexpected '}'".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse Groovy DSL at 4:1: unexpected '}'"
        );
    }

    #[test]
    fn test_conversion_names_manifest() {
        let err = GroovyError::AmbiguousLockTarget {
            location: SourceLocation::new(2, 5),
            call: "compile".into(),
            coordinates: vec!["a:b:1.+".into(), "c:d:2.+".into()],
        };
        assert_eq!(err.location(), SourceLocation::new(2, 5));

        let lock_err = err.in_manifest(Path::new("sub/build.gradle"));
        assert!(matches!(lock_err, LockError::AmbiguousLockTarget { .. }));
        assert!(lock_err.to_string().contains("sub/build.gradle:2:5"));
    }

    #[test]
    fn test_parse_conversion() {
        let err = GroovyError::Parse {
            location: SourceLocation::new(1, 1),
            message: "unterminated string".into(),
        };
        let lock_err = err.in_manifest(Path::new("build.gradle"));
        assert!(matches!(lock_err, LockError::Parse { .. }));
    }
}
