//! Normalizes multi-coordinate declarations before locking.

use crate::manifest::Manifest;
use crate::rewriter::{Edit, apply_edits};
use crate::walker::{Configurations, DeclarationSite, Notation};
use std::collections::BTreeMap;

/// Splits every unlocked call that lists several coordinates into one
/// declaration per coordinate, so each can carry its own lock:
///
/// ```text
/// compile 'a:b:1.+',          compile 'a:b:1.+'
///         'c:d:2.+'     ->    compile 'c:d:2.+'
/// ```
///
/// Calls with a closure, extra arguments or an existing lock clause are
/// left as written; locking them later reports the ambiguity instead.
pub fn prepare_for_locks(manifest: &Manifest, configurations: &dyn Configurations) -> String {
    let source = manifest.source();

    let mut calls: BTreeMap<usize, Vec<DeclarationSite>> = BTreeMap::new();
    for site in manifest.sites(configurations) {
        if site.ignored
            || site.coordinate_args < 2
            || site.has_closure
            || site.extra_args > 0
            || site.lock.is_some()
        {
            continue;
        }
        calls.entry(site.call_span.start).or_default().push(site);
    }

    let edits = calls
        .into_values()
        .map(|sites| split_call(source, &sites))
        .collect();
    apply_edits(source, edits)
}

fn split_call(source: &str, sites: &[DeclarationSite]) -> Edit {
    let first = &sites[0];
    let call_span = first.call_span;
    let callee = &source[call_span.start..first.method_span.end];

    let line_start = source[..call_span.start].rfind('\n').map_or(0, |i| i + 1);
    let indent = &source[line_start..call_span.start];
    let separator = if indent.chars().all(char::is_whitespace) {
        format!("\n{indent}")
    } else {
        "; ".to_string()
    };

    tracing::debug!(
        "Splitting {} coordinates of '{}' into separate declarations",
        sites.len(),
        first.call
    );

    let declarations: Vec<String> = sites
        .iter()
        .map(|site| {
            let text = site.notation.span().slice(source);
            match site.notation {
                Notation::String(_) => format!("{callee} {text}"),
                Notation::Map(_) => format!("{callee}({text})"),
            }
        })
        .collect();
    Edit::replace(call_span, declarations.join(&separator))
}
