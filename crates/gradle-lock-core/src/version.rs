//! Gradle version ordering.
//!
//! Follows the precedence rules Gradle applies when picking the highest
//! of several candidate versions, which differ from plain string or
//! semver ordering (`18.0 > 16.0`, `1.10 > 1.9`, `1.0 > 1.0-rc1`).

use std::cmp::Ordering;

/// Qualifiers ranked above any other non-numeric part, lowest first.
const SPECIAL_QUALIFIERS: &[&str] = &["rc", "snapshot", "final", "ga", "release", "sp"];

#[derive(Debug, PartialEq, Eq)]
enum Part<'a> {
    Numeric(u64),
    Text(&'a str),
}

fn split_version(v: &str) -> Vec<Part<'_>> {
    let mut parts = Vec::new();
    for chunk in v.split(['.', '-', '_', '+']) {
        let mut start = 0;
        let bytes = chunk.as_bytes();
        for i in 1..=bytes.len() {
            let boundary =
                i == bytes.len() || bytes[i].is_ascii_digit() != bytes[i - 1].is_ascii_digit();
            if boundary {
                let piece = &chunk[start..i];
                if !piece.is_empty() {
                    parts.push(to_part(piece));
                }
                start = i;
            }
        }
    }
    parts
}

fn to_part(piece: &str) -> Part<'_> {
    if piece.bytes().all(|b| b.is_ascii_digit()) {
        // Overlong numeric runs saturate rather than fall back to text.
        Part::Numeric(piece.parse().unwrap_or(u64::MAX))
    } else {
        Part::Text(piece)
    }
}

fn text_rank(text: &str) -> Option<usize> {
    let lower = text.to_ascii_lowercase();
    SPECIAL_QUALIFIERS.iter().position(|q| *q == lower)
}

fn compare_parts(a: &Part<'_>, b: &Part<'_>) -> Ordering {
    match (a, b) {
        (Part::Numeric(x), Part::Numeric(y)) => x.cmp(y),
        (Part::Numeric(_), Part::Text(_)) => Ordering::Greater,
        (Part::Text(_), Part::Numeric(_)) => Ordering::Less,
        (Part::Text(x), Part::Text(y)) => {
            let x_dev = x.eq_ignore_ascii_case("dev");
            let y_dev = y.eq_ignore_ascii_case("dev");
            match (x_dev, y_dev) {
                (true, true) => return Ordering::Equal,
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                (false, false) => {}
            }
            match (text_rank(x), text_rank(y)) {
                (Some(rx), Some(ry)) => rx.cmp(&ry),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => x.cmp(y),
            }
        }
    }
}

/// Compares two version strings using Gradle precedence.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_parts = split_version(a);
    let b_parts = split_version(b);

    for (ap, bp) in a_parts.iter().zip(b_parts.iter()) {
        let ord = compare_parts(ap, bp);
        if ord != Ordering::Equal {
            return ord;
        }
    }

    // One is a prefix of the other: an extra numeric part wins, an extra
    // qualifier loses.
    match a_parts.len().cmp(&b_parts.len()) {
        Ordering::Equal => a.cmp(b),
        Ordering::Greater => match a_parts[b_parts.len()] {
            Part::Numeric(_) => Ordering::Greater,
            Part::Text(_) => Ordering::Less,
        },
        Ordering::Less => match b_parts[a_parts.len()] {
            Part::Numeric(_) => Ordering::Less,
            Part::Text(_) => Ordering::Greater,
        },
    }
}

/// Returns the highest version by Gradle precedence.
pub fn max_version<I, S>(versions: I) -> Option<S>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    versions
        .into_iter()
        .max_by(|a, b| compare_versions(a.as_ref(), b.as_ref()))
}
