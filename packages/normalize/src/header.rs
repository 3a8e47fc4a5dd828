//! Header label canonicalization.

use std::collections::{BTreeMap, BTreeSet};

use crate::NormalizeOptions;

/// Prefix for labels given to columns with no header text.
pub const UNNAMED_PREFIX: &str = "UNNAMED";

/// Canonical form of a cell or label: carriage-return artifacts removed,
/// whitespace collapsed, uppercased.
#[must_use]
pub fn canonical(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Replaces embedded `\r\n` / `\r` with a single space and trims.
#[must_use]
pub fn clean_cell(cell: &str) -> String {
    cell.replace("\r\n", " ").replace('\r', " ").trim().to_owned()
}

/// Builds the canonical header for a table `width` cells wide from the
/// raw header row.
///
/// Labels are canonicalized and passed through the alias table. Blank
/// labels, and positions past the end of `raw`, become `UNNAMED <n>` where
/// `n` is the column index. Repeated labels get a `.1`, `.2`, ... suffix.
#[must_use]
pub fn canonical_header(raw: &[String], width: usize, options: &NormalizeOptions) -> Vec<String> {
    let aliases: BTreeMap<String, &str> = options
        .header_aliases
        .iter()
        .map(|(from, to)| (canonical(from), to.as_str()))
        .collect();

    let mut seen = BTreeSet::new();
    (0..width.max(raw.len()))
        .map(|i| {
            let label = raw.get(i).map(|s| canonical(s)).unwrap_or_default();
            let label = if label.is_empty() {
                format!("{UNNAMED_PREFIX} {i}")
            } else {
                aliases.get(&label).map_or(label, |to| canonical(to))
            };
            dedupe(label, &mut seen)
        })
        .collect()
}

fn dedupe(label: String, seen: &mut BTreeSet<String>) -> String {
    if seen.insert(label.clone()) {
        return label;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{label}.{n}");
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn canonicalizes_whitespace_and_case() {
        assert_eq!(canonical("  Application\r\n  Number "), "APPLICATION NUMBER");
    }

    #[test]
    fn applies_aliases_after_canonicalization() {
        let header = canonical_header(&labels(&["No.", "date "]), 2, &NormalizeOptions::default());
        assert_eq!(header, vec!["NO.", "APPROVAL DATE"]);
    }

    #[test]
    fn labels_blank_and_extra_columns() {
        let header = canonical_header(&labels(&["A", ""]), 4, &NormalizeOptions::default());
        assert_eq!(header, vec!["A", "UNNAMED 1", "UNNAMED 2", "UNNAMED 3"]);
    }

    #[test]
    fn suffixes_duplicate_labels() {
        let raw = labels(&["Name", "NAME", "name"]);
        let header = canonical_header(&raw, 3, &NormalizeOptions::default());
        assert_eq!(header, vec!["NAME", "NAME.1", "NAME.2"]);
    }

    #[test]
    fn cleans_carriage_returns() {
        assert_eq!(clean_cell(" Drug\r\nName\rX "), "Drug Name X");
    }
}
