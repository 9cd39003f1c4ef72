//! Splices lock clauses into manifest text.
//!
//! Edits are collected as `(span, replacement)` pairs and applied from the
//! end of the text backwards, so offsets computed on the original text
//! stay valid. Everything outside an edited span is copied verbatim.

use crate::ast::{LockValue, Quote, Span};
use crate::manifest::Manifest;
use crate::planner::LockUpdate;
use crate::walker::{Configurations, DeclarationSite};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Span,
    pub replacement: String,
}

impl Edit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(Span::new(at, at), text)
    }

    pub fn replace(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            replacement: text.into(),
        }
    }

    pub fn delete(span: Span) -> Self {
        Self::replace(span, "")
    }
}

/// Applies `edits` to `source` in descending start order.
///
/// Duplicate edits are applied once; an edit overlapping one already
/// applied is skipped.
pub fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by(|a, b| {
        b.span
            .start
            .cmp(&a.span.start)
            .then(b.span.end.cmp(&a.span.end))
    });
    edits.dedup();

    let mut out = source.to_string();
    let mut applied_from = source.len();
    for edit in edits {
        if edit.span.end > applied_from || edit.span.start > edit.span.end {
            tracing::warn!(
                "Skipping edit at {}..{} overlapping an earlier edit",
                edit.span.start,
                edit.span.end
            );
            continue;
        }
        out.replace_range(edit.span.start..edit.span.end, &edit.replacement);
        applied_from = edit.span.start;
    }
    out
}

/// Rewrites `manifest` with the planned lock updates.
pub fn apply_lock_updates(manifest: &Manifest, updates: &[LockUpdate]) -> String {
    let edits = updates
        .iter()
        .filter_map(|update| lock_edit(manifest.source(), &update.site, update.locked.as_deref()))
        .collect();
    apply_edits(manifest.source(), edits)
}

/// Removes every lock clause outside `ignore` blocks.
pub fn strip_locks(manifest: &Manifest, configurations: &dyn Configurations) -> String {
    let edits = manifest
        .sites(configurations)
        .iter()
        .filter(|site| !site.ignored)
        .filter_map(|site| lock_edit(manifest.source(), site, None))
        .collect();
    apply_edits(manifest.source(), edits)
}

fn lock_edit(source: &str, site: &DeclarationSite, locked: Option<&str>) -> Option<Edit> {
    match (&site.lock, locked) {
        (None, None) => None,
        (None, Some(version)) => Some(Edit::insert(site.anchor, format!(" lock '{version}'"))),
        (Some(clause), Some(version)) => {
            let quote = match &clause.value {
                LockValue::Str(lit) if lit.quote == Quote::Double => "\"",
                _ => "'",
            };
            Some(Edit::replace(
                clause.value.span(),
                format!("{quote}{version}{quote}"),
            ))
        }
        (Some(clause), None) => {
            // Comments between the declaration and the keyword stay.
            let gap = &source[site.anchor..clause.span.start];
            let start = site.anchor + gap.trim_end().len();
            Some(Edit::delete(Span::new(start, clause.span.end)))
        }
    }
}
