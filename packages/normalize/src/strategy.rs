//! The individual normalization strategies.
//!
//! Each strategy is a pure function from a [`RawExtraction`] to a
//! [`NormalizedTable`]. [`normalize`](crate::normalize) tries them in
//! [`Strategy::ORDER`].

use drug_nme_approval_models::{NormalizedTable, RawExtraction, Row, is_missing};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter};

use crate::NormalizeOptions;
use crate::header::{canonical, canonical_header, clean_cell};

/// Why a single strategy could not produce a table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StrategyError {
    /// Nothing remained after discarding the cover page.
    #[error("no page-tables after the first page")]
    NoDataPages,

    /// Every row was entirely missing, so no header could be promoted.
    #[error("no non-empty row to use as a header")]
    NoHeaderRow,

    /// The header lacks a column the options require.
    #[error("header {header:?} has no '{column}' column")]
    MissingColumn {
        /// The required column.
        column: String,
        /// The header that was found.
        header: Vec<String>,
    },

    /// The form layout needs a label row and a value row.
    #[error("expected a label row and a value row, found {rows} non-empty row(s)")]
    TooFewRows {
        /// Number of non-empty rows found.
        rows: usize,
    },

    /// The label row of a form layout was blank.
    #[error("label row has no labels")]
    NoLabels,
}

/// A normalization strategy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Strategy {
    /// Multi-page grid: skip the cover page, promote the first row to the
    /// header and clean the rows beneath it.
    PageGrid,
    /// Single-record form: the first two rows are a label row and a value
    /// row, transposed into one record.
    FormTranspose,
}

impl Strategy {
    /// The order in which strategies are attempted.
    pub const ORDER: [Self; 2] = [Self::PageGrid, Self::FormTranspose];

    /// Runs this strategy.
    ///
    /// # Errors
    ///
    /// Returns a [`StrategyError`] if the input does not fit the layout
    /// this strategy expects.
    pub fn apply(
        self,
        raw: &RawExtraction,
        options: &NormalizeOptions,
    ) -> Result<NormalizedTable, StrategyError> {
        match self {
            Self::PageGrid => page_grid(raw, options),
            Self::FormTranspose => form_transpose(raw, options),
        }
    }
}

/// Normalizes a multi-page grid.
///
/// # Errors
///
/// Returns [`StrategyError::NoDataPages`] if discarding the first page
/// leaves nothing, [`StrategyError::NoHeaderRow`] if every row is blank,
/// or [`StrategyError::MissingColumn`] if the sentinel column is required
/// but absent.
pub fn page_grid(
    raw: &RawExtraction,
    options: &NormalizeOptions,
) -> Result<NormalizedTable, StrategyError> {
    let skip = usize::from(options.discard_first_page);
    if raw.pages.len() <= skip {
        return Err(StrategyError::NoDataPages);
    }

    let mut rows = raw
        .pages
        .iter()
        .skip(skip)
        .flat_map(|page| page.rows.iter())
        .map(|row| clean_row(row))
        .skip_while(|row| row.iter().all(|cell| is_missing(cell)));

    let raw_header = rows.next().ok_or(StrategyError::NoHeaderRow)?;
    let rows: Vec<Row> = rows.collect();

    let width = rows.iter().map(Vec::len).fold(raw_header.len(), usize::max);
    let header = canonical_header(&raw_header, width, options);

    let sentinel_col = header
        .iter()
        .position(|label| *label == canonical(&options.sentinel_column));
    if sentinel_col.is_none() && options.require_sentinel_column {
        return Err(StrategyError::MissingColumn {
            column: options.sentinel_column.clone(),
            header,
        });
    }
    let sentinels: Vec<String> = options.sentinel_values.iter().map(|v| canonical(v)).collect();
    let repeated_header: Vec<String> = raw_header.iter().map(|c| canonical(c)).collect();

    let before = rows.len();
    let rows: Vec<Row> = rows
        .into_iter()
        .filter(|row| {
            let is_sentinel = sentinel_col
                .and_then(|col| row.get(col))
                .is_some_and(|cell| sentinels.contains(&canonical(cell)));
            let is_repeated_header = row
                .iter()
                .map(|c| canonical(c))
                .eq(repeated_header.iter().cloned());
            !is_sentinel && !is_repeated_header
        })
        .collect();
    if rows.len() < before {
        log::debug!("Removed {} section-header rows", before - rows.len());
    }

    Ok(finish(header, rows, options))
}

/// Normalizes a single-record form.
///
/// # Errors
///
/// Returns [`StrategyError::TooFewRows`] if there is no label row and
/// value row, or [`StrategyError::NoLabels`] if the label row is blank.
pub fn form_transpose(
    raw: &RawExtraction,
    options: &NormalizeOptions,
) -> Result<NormalizedTable, StrategyError> {
    let rows: Vec<Row> = raw
        .flatten()
        .rows
        .iter()
        .map(|row| clean_row(row))
        .filter(|row| !row.iter().all(|cell| is_missing(cell)))
        .collect();

    let [labels, values, ..] = rows.as_slice() else {
        return Err(StrategyError::TooFewRows { rows: rows.len() });
    };

    let pairs: Vec<(&String, String)> = labels
        .iter()
        .enumerate()
        .filter(|(_, label)| !is_missing(label))
        .map(|(i, label)| (label, values.get(i).cloned().unwrap_or_default()))
        .collect();
    if pairs.is_empty() {
        return Err(StrategyError::NoLabels);
    }

    let raw_header: Vec<String> = pairs.iter().map(|(label, _)| (*label).clone()).collect();
    let header = canonical_header(&raw_header, raw_header.len(), options);
    let record = pairs.into_iter().map(|(_, value)| value).collect();

    Ok(finish(header, vec![record], options))
}

fn clean_row(row: &[String]) -> Row {
    row.iter().map(|cell| clean_cell(cell)).collect()
}

/// Drops configured columns, blank rows and blank columns.
///
/// With no rows left the header is kept as-is.
fn finish(header: Vec<String>, rows: Vec<Row>, options: &NormalizeOptions) -> NormalizedTable {
    let mut table = NormalizedTable::new(header, rows);
    for name in &options.drop_columns {
        table.drop_column(&canonical(name));
    }

    let (header, rows) = table.into_parts();
    let rows: Vec<Row> = rows
        .into_iter()
        .filter(|row| !row.iter().all(|cell| is_missing(cell)))
        .collect();
    if rows.is_empty() {
        return NormalizedTable::empty(header);
    }

    let keep: Vec<bool> = (0..header.len())
        .map(|col| rows.iter().any(|row| !is_missing(&row[col])))
        .collect();
    let select = |cells: Vec<String>| -> Row {
        cells
            .into_iter()
            .zip(&keep)
            .filter_map(|(cell, &k)| k.then_some(cell))
            .collect()
    };

    NormalizedTable::new(select(header), rows.into_iter().map(select).collect())
}

#[cfg(test)]
mod tests {
    use drug_nme_approval_models::PageTable;

    use super::*;

    fn raw(pages: &[&[&[&str]]]) -> RawExtraction {
        RawExtraction::new(
            pages
                .iter()
                .map(|rows| PageTable::from_rows(rows.iter().map(|r| r.iter().copied())))
                .collect(),
        )
    }

    fn lenient() -> NormalizeOptions {
        NormalizeOptions::default().with_required_sentinel_column(false)
    }

    #[test]
    fn page_grid_needs_pages_after_cover() {
        let input = raw(&[&[&["only page"]]]);
        assert_eq!(
            page_grid(&input, &NormalizeOptions::default()),
            Err(StrategyError::NoDataPages)
        );
    }

    #[test]
    fn page_grid_skips_blank_leading_rows() {
        let input = raw(&[&[], &[&["", ""], &["A", "B"], &["1", "2"]]]);
        let table = page_grid(&input, &lenient()).unwrap();
        assert_eq!(table.header(), ["A", "B"]);
        assert_eq!(table.rows(), [vec!["1", "2"]]);
    }

    #[test]
    fn page_grid_removes_repeated_page_headers() {
        let input = raw(&[
            &[],
            &[&["Drug Name", "Date"], &["Drugalin", "01/15/2020"]],
            &[&["DRUG NAME", "DATE"], &["Biologicine", "02/20/2020"]],
        ]);
        let table = page_grid(&input, &lenient()).unwrap();
        assert_eq!(table.header(), ["DRUG NAME", "APPROVAL DATE"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1, "DRUG NAME"), Some("Biologicine"));
    }

    #[test]
    fn page_grid_requires_sentinel_column_by_default() {
        let input = raw(&[&[], &[&["DRUG NAME"], &["Drugalin"]]]);
        assert!(matches!(
            page_grid(&input, &NormalizeOptions::default()),
            Err(StrategyError::MissingColumn { .. })
        ));
        assert!(page_grid(&input, &lenient()).is_ok());
    }

    #[test]
    fn page_grid_widens_header_for_ragged_rows() {
        let input = raw(&[&[], &[&["A"], &["1", "extra"]]]);
        let table = page_grid(&input, &lenient()).unwrap();
        assert_eq!(table.header(), ["A", "UNNAMED 1"]);
        assert_eq!(table.get(0, "UNNAMED 1"), Some("extra"));
    }

    #[test]
    fn page_grid_drops_configured_and_blank_columns() {
        let input = raw(&[&[
            &["No.", "Drug Name", "Notes"],
            &["1", "Drugalin", ""],
            &["2", "Biologicine", " "],
        ]]);
        let table = page_grid(&input, &NormalizeOptions::for_html()).unwrap();
        assert_eq!(table.header(), ["DRUG NAME"]);
        assert_eq!(table.column("DRUG NAME").unwrap(), vec!["Drugalin", "Biologicine"]);
    }

    #[test]
    fn page_grid_keeps_header_when_no_rows_remain() {
        let input = raw(&[&[], &[&["APPLICATION NUMBER", "DRUG NAME"], &["BLA NUMBER", ""]]]);
        let table = page_grid(&input, &NormalizeOptions::default()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.header(), ["APPLICATION NUMBER", "DRUG NAME"]);
    }

    #[test]
    fn form_transpose_builds_single_record() {
        let input = raw(&[&[
            &["Application Number", "", "Drug Name", "Date"],
            &["NDA000111", "ignored", "Drugalin", "01/15/2020"],
            &["trailing", "rows", "are", "ignored"],
        ]]);
        let table = form_transpose(&input, &NormalizeOptions::default()).unwrap();
        assert_eq!(table.header(), ["APPLICATION NUMBER", "DRUG NAME", "APPROVAL DATE"]);
        assert_eq!(table.rows(), [vec!["NDA000111", "Drugalin", "01/15/2020"]]);
    }

    #[test]
    fn form_transpose_reads_across_pages() {
        let input = raw(&[&[&["Drug Name"]], &[&["Drugalin"]]]);
        let table = form_transpose(&input, &NormalizeOptions::default()).unwrap();
        assert_eq!(table.get(0, "DRUG NAME"), Some("Drugalin"));
    }

    #[test]
    fn form_transpose_needs_two_rows() {
        let input = raw(&[&[&["only labels"]]]);
        assert_eq!(
            form_transpose(&input, &NormalizeOptions::default()),
            Err(StrategyError::TooFewRows { rows: 1 })
        );
    }
}
