//! Counting and pivoting [`Keyed`] rows.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{Keyed, UNKNOWN_CATEGORY};

/// Number of rows counted under one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearCount {
    /// Calendar year of approval.
    pub year: i32,
    /// Rows counted for `year`.
    pub count: usize,
}

/// Number of rows with one category value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// Category value, or [`UNKNOWN_CATEGORY`] for rows lacking the key.
    pub category: String,
    /// Rows with this value.
    pub count: usize,
}

/// A category's slice of the whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    /// Category value.
    pub category: String,
    /// Rows with this value.
    pub count: usize,
    /// Percentage of all counted rows, `0.0..=100.0`.
    pub percent: f64,
}

/// Counts per year and category.
///
/// `years` are ascending. `categories` are ordered by total count
/// (largest first, ties alphabetical), which is also the stacking order
/// used by [`chart::stacked_bar_chart`](crate::chart::stacked_bar_chart).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pivot {
    /// Years with at least one row, ascending.
    pub years: Vec<i32>,
    /// Category values in stacking order.
    pub categories: Vec<String>,
    /// `counts[y][c]` is the count for `years[y]` and `categories[c]`.
    pub counts: Vec<Vec<usize>>,
}

impl Pivot {
    /// Count for `year` and `category`, zero if either is absent.
    #[must_use]
    pub fn get(&self, year: i32, category: &str) -> usize {
        let Some(y) = self.years.iter().position(|&v| v == year) else {
            return 0;
        };
        self.categories
            .iter()
            .position(|c| c == category)
            .map_or(0, |c| self.counts[y][c])
    }

    /// Total across categories for `year`.
    #[must_use]
    pub fn year_total(&self, year: i32) -> usize {
        self.years
            .iter()
            .position(|&v| v == year)
            .map_or(0, |y| self.counts[y].iter().sum())
    }

    /// Whether no row had a year.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// Counts rows per year, ascending. Rows without a year are skipped.
pub fn count_by_year<R: Keyed>(rows: impl IntoIterator<Item = R>) -> Vec<YearCount> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    let mut skipped = 0;
    for row in rows {
        match row.year() {
            Some(year) => *counts.entry(year).or_default() += 1,
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        log::debug!("{skipped} rows have no year");
    }

    counts
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

fn category_of<R: Keyed>(row: &R, key: &str) -> String {
    row.key(key).unwrap_or_else(|| UNKNOWN_CATEGORY.to_owned())
}

fn sorted_by_count(counts: BTreeMap<String, usize>) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    // BTreeMap order breaks ties alphabetically; the sort is stable.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Counts rows per value of `key`, largest first. Rows lacking the key
/// are counted as [`UNKNOWN_CATEGORY`].
pub fn count_by_column<R: Keyed>(
    rows: impl IntoIterator<Item = R>,
    key: &str,
) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in rows {
        *counts.entry(category_of(&row, key)).or_default() += 1;
    }
    sorted_by_count(counts)
}

/// Counts rows per year and value of `key`. Rows without a year are
/// skipped; rows lacking the key count as [`UNKNOWN_CATEGORY`].
pub fn pivot<R: Keyed>(rows: impl IntoIterator<Item = R>, key: &str) -> Pivot {
    let mut cells: BTreeMap<(i32, String), usize> = BTreeMap::new();
    let mut totals: BTreeMap<String, usize> = BTreeMap::new();
    for row in rows {
        let Some(year) = row.year() else {
            continue;
        };
        let category = category_of(&row, key);
        *totals.entry(category.clone()).or_default() += 1;
        *cells.entry((year, category)).or_default() += 1;
    }

    let categories: Vec<String> = sorted_by_count(totals)
        .into_iter()
        .map(|c| c.category)
        .collect();
    let mut years: Vec<i32> = cells.keys().map(|(year, _)| *year).collect();
    years.dedup();

    let counts = years
        .iter()
        .map(|&year| {
            categories
                .iter()
                .map(|category| {
                    cells
                        .get(&(year, category.clone()))
                        .copied()
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    Pivot {
        years,
        categories,
        counts,
    }
}

/// Converts category counts into percentage shares, keeping their order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn shares(counts: &[CategoryCount]) -> Vec<Share> {
    let total: usize = counts.iter().map(|c| c.count).sum();
    if total == 0 {
        return Vec::new();
    }
    counts
        .iter()
        .map(|c| Share {
            category: c.category.clone(),
            count: c.count,
            percent: c.count as f64 * 100.0 / total as f64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Approval {
        year: Option<i32>,
        kind: Option<&'static str>,
    }

    impl Keyed for Approval {
        fn year(&self) -> Option<i32> {
            self.year
        }

        fn key(&self, key: &str) -> Option<String> {
            (key == "kind").then(|| self.kind.map(str::to_owned)).flatten()
        }
    }

    fn approvals() -> Vec<Approval> {
        [
            (Some(2021), Some("Antibody")),
            (Some(2020), Some("Small molecule")),
            (Some(2021), Some("Small molecule")),
            (Some(2021), None),
            (None, Some("Peptide")),
            (Some(2020), Some("Small molecule")),
        ]
        .into_iter()
        .map(|(year, kind)| Approval { year, kind })
        .collect()
    }

    #[test]
    fn counts_years_ascending_and_skips_yearless_rows() {
        assert_eq!(
            count_by_year(&approvals()),
            vec![
                YearCount { year: 2020, count: 2 },
                YearCount { year: 2021, count: 3 },
            ]
        );
    }

    #[test]
    fn counts_categories_largest_first() {
        let counts = count_by_column(&approvals(), "kind");
        let pairs: Vec<(&str, usize)> = counts
            .iter()
            .map(|c| (c.category.as_str(), c.count))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Small molecule", 3),
                ("Antibody", 1),
                ("Peptide", 1),
                ("Unknown", 1),
            ]
        );
    }

    #[test]
    fn pivots_year_by_category() {
        let pivot = pivot(&approvals(), "kind");
        assert_eq!(pivot.years, vec![2020, 2021]);
        assert_eq!(pivot.categories, vec!["Small molecule", "Antibody", "Unknown"]);
        assert_eq!(pivot.get(2020, "Small molecule"), 2);
        assert_eq!(pivot.get(2021, "Antibody"), 1);
        assert_eq!(pivot.get(2020, "Antibody"), 0);
        assert_eq!(pivot.get(1999, "Antibody"), 0);
        assert_eq!(pivot.year_total(2021), 3);
    }

    #[test]
    fn shares_add_up_to_one_hundred() {
        let shares = shares(&count_by_column(&approvals(), "kind"));
        let total: f64 = shares.iter().map(|s| s.percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!((shares[0].percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn no_rows_no_shares() {
        assert!(shares(&[]).is_empty());
        assert!(pivot(Vec::<Approval>::new(), "kind").is_empty());
    }
}
