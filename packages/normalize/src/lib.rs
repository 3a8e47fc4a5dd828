#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Turns raw extracted tables into a canonical tabular schema.
//!
//! Extraction gives back whatever the document layout produced: a cover
//! page, page headers repeated on every page, section-header rows in the
//! middle of the data, blank padding columns, and carriage returns inside
//! cells. [`normalize`] cleans all of that up into a
//! [`NormalizedTable`] whose first row was promoted to the header.
//!
//! Two strategies are tried in [`Strategy::ORDER`]:
//!
//! 1. [`Strategy::PageGrid`] handles the usual multi-page grid.
//! 2. [`Strategy::FormTranspose`] handles documents laid out as a single
//!    form (a label row above a value row).
//!
//! The result records which strategy succeeded so that callers can tell
//! when the fallback was used.

pub mod header;
pub mod options;
pub mod strategy;

use std::fmt::Write as _;

use drug_nme_approval_models::{NormalizedTable, RawExtraction};

pub use options::{APPLICATION_NUMBER, APPROVAL_DATE, NormalizeOptions};
pub use strategy::{Strategy, StrategyError};

/// Errors from [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    /// No strategy could identify a usable header row.
    #[error("malformed table: {}", describe_attempts(.attempts))]
    Malformed {
        /// Every strategy tried, with the reason it failed.
        attempts: Vec<(Strategy, StrategyError)>,
    },
}

fn describe_attempts(attempts: &[(Strategy, StrategyError)]) -> String {
    let mut out = String::new();
    for (i, (strategy, error)) in attempts.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        let _ = write!(out, "{strategy}: {error}");
    }
    out
}

/// A normalized table and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// The cleaned table.
    pub table: NormalizedTable,
    /// Which strategy succeeded.
    pub strategy: Strategy,
}

impl Normalized {
    /// Whether a fallback strategy was needed.
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.strategy != Strategy::ORDER[0]
    }
}

/// Normalizes `raw`, trying each strategy in [`Strategy::ORDER`].
///
/// # Errors
///
/// Returns [`NormalizeError::Malformed`] listing every strategy's failure
/// if none of them succeeds.
pub fn normalize(
    raw: &RawExtraction,
    options: &NormalizeOptions,
) -> Result<Normalized, NormalizeError> {
    let mut attempts = Vec::new();

    for strategy in Strategy::ORDER {
        match strategy.apply(raw, options) {
            Ok(table) => {
                if let Some((primary, error)) = attempts.first() {
                    log::warn!("{primary} failed ({error}); fell back to {strategy}");
                }
                log::debug!(
                    "Normalized {} rows x {} columns with {strategy}",
                    table.len(),
                    table.header().len()
                );
                return Ok(Normalized { table, strategy });
            }
            Err(error) => attempts.push((strategy, error)),
        }
    }

    Err(NormalizeError::Malformed { attempts })
}

#[cfg(test)]
mod tests {
    use drug_nme_approval_models::{PageTable, is_missing};

    use super::*;

    fn raw(pages: &[&[&[&str]]]) -> RawExtraction {
        RawExtraction::new(
            pages
                .iter()
                .map(|rows| PageTable::from_rows(rows.iter().map(|r| r.iter().copied())))
                .collect(),
        )
    }

    fn fda_fixture() -> RawExtraction {
        raw(&[
            &[&["junk header"]],
            &[
                &["APPLICATION NUMBER", "DRUG NAME"],
                &["NDA000111", "Drugalin"],
                &["BLA NUMBER", "(header)"],
                &["BLA000222", "Biologicine"],
            ],
        ])
    }

    #[test]
    fn normalizes_fda_report_layout() {
        let result = normalize(&fda_fixture(), &NormalizeOptions::default()).unwrap();
        assert_eq!(result.strategy, Strategy::PageGrid);
        assert!(!result.used_fallback());
        assert_eq!(result.table.header(), ["APPLICATION NUMBER", "DRUG NAME"]);
        assert_eq!(
            result.table.rows(),
            [vec!["NDA000111", "Drugalin"], vec!["BLA000222", "Biologicine"]]
        );
    }

    #[test]
    fn never_keeps_rows_from_the_cover_page() {
        let input = raw(&[
            &[&["APPLICATION NUMBER", "DRUG NAME"], &["NDA999999", "Cover Only"]],
            &[&["APPLICATION NUMBER", "DRUG NAME"], &["NDA000111", "Drugalin"]],
            &[&["NDA000333", "Thirdine"]],
        ]);
        let result = normalize(&input, &NormalizeOptions::default()).unwrap();
        assert_eq!(result.table.len(), 2);
        assert!(
            result
                .table
                .column("APPLICATION NUMBER")
                .unwrap()
                .iter()
                .all(|v| *v != "NDA999999")
        );
    }

    #[test]
    fn output_has_no_blank_rows_or_columns() {
        let input = raw(&[
            &[],
            &[
                &["APPLICATION NUMBER", "", "DRUG NAME", "NOTES"],
                &["NDA000111", "", "Drugalin", ""],
                &["", "", "", ""],
                &["BLA000222", "", "Biologicine", "  "],
            ],
        ]);
        let table = normalize(&input, &NormalizeOptions::default()).unwrap().table;
        assert_eq!(table.header(), ["APPLICATION NUMBER", "DRUG NAME"]);
        for row in table.rows() {
            assert!(!row.iter().all(|c| is_missing(c)));
        }
        for label in table.header() {
            assert!(!table.column(label).unwrap().iter().all(|c| is_missing(c)));
        }
    }

    #[test]
    fn strips_section_header_sentinels() {
        let table = normalize(&fda_fixture(), &NormalizeOptions::default())
            .unwrap()
            .table;
        let apps = table.column("APPLICATION NUMBER").unwrap();
        assert!(!apps.contains(&"BLA NUMBER"));
    }

    #[test]
    fn normalizing_a_normalized_table_is_a_no_op() {
        let first = normalize(&fda_fixture(), &NormalizeOptions::default())
            .unwrap()
            .table;
        let second = normalize(&first.to_raw_extraction(), &NormalizeOptions::default())
            .unwrap()
            .table;
        assert_eq!(first, second);
    }

    #[test]
    fn falls_back_to_form_transpose_for_single_page_forms() {
        let input = raw(&[&[
            &["Application Number", "Drug Name"],
            &["NDA000111", "Drugalin"],
        ]]);
        let result = normalize(&input, &NormalizeOptions::default()).unwrap();
        assert_eq!(result.strategy, Strategy::FormTranspose);
        assert!(result.used_fallback());
        assert_eq!(result.table.get(0, "DRUG NAME"), Some("Drugalin"));
    }

    #[test]
    fn report_without_application_numbers_falls_back() {
        let input = raw(&[
            &[],
            &[&["DRUG NAME", "APPROVAL DATE"], &["Drugalin", "01/15/2020"]],
        ]);
        let result = normalize(&input, &NormalizeOptions::default()).unwrap();
        assert_eq!(result.strategy, Strategy::FormTranspose);
        assert_eq!(result.table.header(), ["DRUG NAME", "APPROVAL DATE"]);
        assert_eq!(result.table.get(0, "DRUG NAME"), Some("Drugalin"));
    }

    #[test]
    fn reports_every_failed_strategy() {
        let input = raw(&[&[&["lonely"]]]);
        let err = normalize(&input, &NormalizeOptions::default()).unwrap_err();
        let NormalizeError::Malformed { attempts } = &err;
        assert_eq!(
            attempts,
            &vec![
                (Strategy::PageGrid, StrategyError::NoDataPages),
                (Strategy::FormTranspose, StrategyError::TooFewRows { rows: 1 }),
            ]
        );
        assert!(err.to_string().contains("page_grid"));
    }

    #[test]
    fn carriage_returns_become_spaces() {
        let input = raw(&[&[], &[&["DRUG\r\nNAME"], &["Long\rName"]]]);
        let options = NormalizeOptions::default().with_required_sentinel_column(false);
        let table = normalize(&input, &options).unwrap().table;
        assert_eq!(table.get(0, "DRUG NAME"), Some("Long Name"));
    }
}
