//! Tabular types moved between extraction, normalization and aggregation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A row of cell strings.
pub type Row = Vec<String>;

/// Whether a cell counts as missing (empty after trimming whitespace).
#[must_use]
pub fn is_missing(cell: &str) -> bool {
    cell.trim().is_empty()
}

/// One page-level table as produced by an extraction primitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTable {
    /// Rows in document order. Rows may have differing lengths.
    pub rows: Vec<Row>,
}

impl PageTable {
    /// Creates a page from owned rows.
    #[must_use]
    pub const fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Creates a page from anything string-like, mostly for fixtures.
    #[must_use]
    pub fn from_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Number of rows on the page.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the page has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An ordered sequence of page tables for one document.
///
/// Page order is physical document order. Extraction results are consumed
/// by a single normalization call and never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawExtraction {
    /// Page tables in document order.
    pub pages: Vec<PageTable>,
}

impl RawExtraction {
    /// Wraps the given pages.
    #[must_use]
    pub const fn new(pages: Vec<PageTable>) -> Self {
        Self { pages }
    }

    /// A document that the extractor returned as one flattened table.
    #[must_use]
    pub fn single(page: PageTable) -> Self {
        Self { pages: vec![page] }
    }

    /// Concatenates every page (including the first) into one table.
    #[must_use]
    pub fn flatten(&self) -> PageTable {
        PageTable::new(
            self.pages
                .iter()
                .flat_map(|page| page.rows.iter().cloned())
                .collect(),
        )
    }

    /// Total number of rows across all pages.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.pages.iter().map(PageTable::len).sum()
    }

    /// Whether the extraction contains no pages.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// A cleaned table with a canonical header and one row per approved entity.
///
/// Every row has exactly as many cells as the header has labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTable {
    header: Vec<String>,
    rows: Vec<Row>,
}

impl NormalizedTable {
    /// Creates a table, padding short rows with empty cells and truncating
    /// rows wider than the header.
    #[must_use]
    pub fn new(header: Vec<String>, rows: Vec<Row>) -> Self {
        let width = header.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { header, rows }
    }

    /// A table with a header and no rows.
    #[must_use]
    pub const fn empty(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Column labels.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Data rows.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of data rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column labelled `name`.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|label| label == name)
    }

    /// Cell at `row` in the column labelled `name`.
    #[must_use]
    pub fn get(&self, row: usize, name: &str) -> Option<&str> {
        let col = self.column_index(name)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    /// All values of the column labelled `name`, or `None` if absent.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[col].as_str()).collect())
    }

    /// Removes the column labelled `name`. Returns whether it existed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(col) = self.column_index(name) else {
            return false;
        };
        self.header.remove(col);
        for row in &mut self.rows {
            row.remove(col);
        }
        true
    }

    /// Wraps the table as a two-page extraction: an empty cover page
    /// followed by a page holding the header row and the data rows.
    ///
    /// Normalizing the result reproduces the table.
    #[must_use]
    pub fn to_raw_extraction(&self) -> RawExtraction {
        let mut rows = Vec::with_capacity(self.rows.len() + 1);
        rows.push(self.header.clone());
        rows.extend(self.rows.iter().cloned());
        RawExtraction::new(vec![PageTable::default(), PageTable::new(rows)])
    }

    /// Consumes the table, returning its header and rows.
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.header, self.rows)
    }
}

/// A row of the aggregated table, tagged with the year it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedRow {
    /// Year of the link this row was extracted from.
    pub year: i32,
    /// Cells aligned to [`AggregatedTable::columns`]. Cells past the end of
    /// this vector are missing (the column first appeared in a later year).
    pub cells: Vec<Option<String>>,
    /// Parsed approval date; `None` when absent or unparseable.
    pub approval_date: Option<NaiveDate>,
}

impl AggregatedRow {
    /// Cell at column index `col`.
    #[must_use]
    pub fn cell(&self, col: usize) -> Option<&str> {
        self.cells.get(col).and_then(Option::as_deref)
    }
}

/// A year that could not be fetched or normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearFailure {
    /// The year that failed.
    pub year: i32,
    /// URL that was being processed.
    pub url: String,
    /// Human-readable error.
    pub error: String,
}

/// Concatenation of per-year normalized tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedTable {
    columns: Vec<String>,
    rows: Vec<AggregatedRow>,
    failures: Vec<YearFailure>,
}

impl AggregatedTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Appends every row of `table`, tagged with `year`.
    ///
    /// Columns not seen before are added to the end of the column list.
    pub fn append(&mut self, year: i32, table: &NormalizedTable) {
        let mapping: Vec<usize> = table
            .header()
            .iter()
            .map(|label| {
                self.columns
                    .iter()
                    .position(|c| c == label)
                    .unwrap_or_else(|| {
                        self.columns.push(label.clone());
                        self.columns.len() - 1
                    })
            })
            .collect();

        for row in table.rows() {
            let mut cells = vec![None; self.columns.len()];
            for (value, &col) in row.iter().zip(&mapping) {
                cells[col] = Some(value.clone());
            }
            self.rows.push(AggregatedRow {
                year,
                cells,
                approval_date: None,
            });
        }
    }

    /// Records a failed year.
    pub fn push_failure(&mut self, failure: YearFailure) {
        self.failures.push(failure);
    }

    /// Column labels in order of first appearance.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in append order.
    #[must_use]
    pub fn rows(&self) -> &[AggregatedRow] {
        &self.rows
    }

    /// Years that failed, in processing order.
    #[must_use]
    pub fn failures(&self) -> &[YearFailure] {
        &self.failures
    }

    /// Number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column labelled `name`.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell of `row` in the column labelled `name`.
    #[must_use]
    pub fn value(&self, row: usize, name: &str) -> Option<&str> {
        let col = self.column_index(name)?;
        self.rows.get(row)?.cell(col)
    }

    /// Parses the `column` of every row with `parse`, storing the result as
    /// the row's approval date. Returns how many non-missing cells failed
    /// to parse.
    pub fn parse_dates(
        &mut self,
        column: &str,
        parse: impl Fn(&str) -> Option<NaiveDate>,
    ) -> usize {
        let Some(col) = self.column_index(column) else {
            return 0;
        };
        let mut unparsed = 0;
        for row in &mut self.rows {
            let raw = row.cells.get(col).and_then(Option::as_deref);
            row.approval_date = raw.and_then(&parse);
            if row.approval_date.is_none() && raw.is_some_and(|s| !is_missing(s)) {
                unparsed += 1;
            }
        }
        unparsed
    }

    /// Stable-sorts rows by year, keeping within-year order.
    pub fn sort_by_year(&mut self) {
        self.rows.sort_by_key(|row| row.year);
        self.failures.sort_by_key(|failure| failure.year);
    }

    /// Returns every `(key, approval date)` combination that occurs more
    /// than once, with its occurrence count. Duplicates are kept in the
    /// table; this only reports them.
    #[must_use]
    pub fn duplicate_keys(&self, key_column: &str) -> Vec<(String, Option<NaiveDate>, usize)> {
        let Some(col) = self.column_index(key_column) else {
            return Vec::new();
        };
        let mut counts: BTreeMap<(String, Option<NaiveDate>), usize> = BTreeMap::new();
        for row in &self.rows {
            if let Some(key) = row.cell(col).filter(|s| !is_missing(s)) {
                *counts
                    .entry((key.to_owned(), row.approval_date))
                    .or_default() += 1;
            }
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|((key, date), count)| (key, date, count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(header: &[&str], rows: &[&[&str]]) -> NormalizedTable {
        NormalizedTable::new(
            header.iter().map(|s| (*s).to_owned()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| (*s).to_owned()).collect())
                .collect(),
        )
    }

    #[test]
    fn pads_short_rows_to_header_width() {
        let t = table(&["A", "B", "C"], &[&["1"]]);
        assert_eq!(t.rows()[0], vec!["1", "", ""]);
    }

    #[test]
    fn drops_column_once() {
        let mut t = table(&["A", "B"], &[&["1", "2"], &["3", "4"]]);
        assert!(t.drop_column("A"));
        assert!(!t.drop_column("A"));
        assert_eq!(t.header(), ["B"]);
        assert_eq!(t.rows()[1], vec!["4"]);
    }

    #[test]
    fn to_raw_extraction_puts_data_behind_cover_page() {
        let t = table(&["A"], &[&["1"]]);
        let raw = t.to_raw_extraction();
        assert_eq!(raw.pages.len(), 2);
        assert!(raw.pages[0].is_empty());
        assert_eq!(raw.pages[1].rows, vec![vec!["A"], vec!["1"]]);
    }

    #[test]
    fn aggregated_table_unions_columns() {
        let mut agg = AggregatedTable::new();
        agg.append(2020, &table(&["A", "B"], &[&["a1", "b1"]]));
        agg.append(2021, &table(&["B", "C"], &[&["b2", "c2"]]));

        assert_eq!(agg.columns(), ["A", "B", "C"]);
        assert_eq!(agg.value(0, "A"), Some("a1"));
        assert_eq!(agg.value(0, "C"), None);
        assert_eq!(agg.value(1, "A"), None);
        assert_eq!(agg.value(1, "C"), Some("c2"));
        assert_eq!(agg.rows()[1].year, 2021);
    }

    #[test]
    fn parse_dates_counts_failures() {
        let mut agg = AggregatedTable::new();
        agg.append(
            2020,
            &table(&["DATE"], &[&["01/02/2020"], &["garbage"], &[""]]),
        );
        let unparsed = agg.parse_dates("DATE", |s| NaiveDate::parse_from_str(s, "%m/%d/%Y").ok());
        assert_eq!(unparsed, 1);
        assert_eq!(agg.rows()[0].approval_date, NaiveDate::from_ymd_opt(2020, 1, 2));
        assert_eq!(agg.rows()[1].approval_date, None);
    }

    #[test]
    fn reports_duplicates_without_dropping() {
        let mut agg = AggregatedTable::new();
        agg.append(2020, &table(&["APP"], &[&["NDA1"], &["NDA1"], &["NDA2"]]));
        let dups = agg.duplicate_keys("APP");
        assert_eq!(dups, vec![("NDA1".to_owned(), None, 2)]);
        assert_eq!(agg.len(), 3);
    }

    #[test]
    fn sort_by_year_is_stable() {
        let mut agg = AggregatedTable::new();
        agg.append(2022, &table(&["A"], &[&["x"]]));
        agg.append(2021, &table(&["A"], &[&["y"], &["z"]]));
        agg.sort_by_year();
        let values: Vec<_> = (0..agg.len()).map(|i| agg.value(i, "A").unwrap()).collect();
        assert_eq!(values, vec!["y", "z", "x"]);
    }
}
