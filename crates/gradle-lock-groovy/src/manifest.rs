//! A parsed `build.gradle`: source text, syntax tree and variable table.

use crate::ast::Block;
use crate::error::{GroovyError, Result};
use crate::parser::parse_script;
use crate::variables::VariableTable;
use crate::walker::{self, Configurations, DeclarationSite};
use gradle_lock_core::SourceLocation;

/// Maps byte offsets to 1-based line/column positions.
#[derive(Debug, Clone)]
struct LineOffsetTable {
    line_starts: Vec<usize>,
}

impl LineOffsetTable {
    fn new(content: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in content.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    fn location(&self, content: &str, offset: usize) -> SourceLocation {
        let offset = offset.min(content.len());
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line];
        let column = content
            .get(line_start..offset)
            .map_or(0, |prefix| prefix.chars().count());
        SourceLocation::new(line + 1, column + 1)
    }
}

#[derive(Debug, Clone)]
pub struct Manifest {
    source: String,
    root: Block,
    variables: VariableTable,
    lines: LineOffsetTable,
}

impl Manifest {
    /// Parses manifest text. Unbalanced delimiters and unterminated
    /// literals fail with [`GroovyError::Parse`].
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let lines = LineOffsetTable::new(&source);
        let root = parse_script(&source).map_err(|err| GroovyError::Parse {
            location: lines.location(&source, err.offset),
            message: err.message,
        })?;
        let variables = VariableTable::from_block(&root);
        tracing::debug!("Parsed manifest with {} variables", variables.len());

        Ok(Self {
            source,
            root,
            variables,
            lines,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Block {
        &self.root
    }

    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    pub fn location(&self, offset: usize) -> SourceLocation {
        self.lines.location(&self.source, offset)
    }

    /// Every dependency and force declaration, ignored ones included.
    pub fn sites(&self, configurations: &dyn Configurations) -> Vec<DeclarationSite> {
        walker::walk(&self.root, configurations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_is_one_based() {
        let manifest = Manifest::parse("dependencies {\n    compile 'a:b:1.0'\n}\n").unwrap();
        assert_eq!(manifest.location(0), SourceLocation::new(1, 1));
        assert_eq!(manifest.location(19), SourceLocation::new(2, 5));
    }

    #[test]
    fn test_parse_error_location() {
        let err = Manifest::parse("repositories {\n    mavenCentral()\n}\n}\n").unwrap_err();
        assert_eq!(err.location(), SourceLocation::new(4, 1));
        assert!(matches!(err, GroovyError::Parse { .. }));
    }

    #[test]
    fn test_unterminated_string_fails() {
        let err = Manifest::parse("dependencies {\n  compile 'a:b:1.0\n}\n").unwrap_err();
        assert_eq!(err.location().line, 2);
    }

    #[test]
    fn test_variables_are_extracted() {
        let manifest = Manifest::parse("ext.guavaVersion = '18.0'\n").unwrap();
        assert_eq!(manifest.variables().get("guavaVersion"), Some("18.0"));
    }

    #[test]
    fn test_location_counts_characters() {
        let manifest = Manifest::parse("// é\nx = 1\n").unwrap();
        assert_eq!(manifest.location(6), SourceLocation::new(2, 1));
        assert_eq!(manifest.location(5), SourceLocation::new(1, 5));
    }
}
