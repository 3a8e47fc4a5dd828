//! HTML table extraction.
//!
//! Locates a `<table>` element via CSS selector and returns each of its rows
//! (header row included) as a list of cell strings. Optionally appends a
//! `LINK` column holding the resolved `href` of the first anchor in each
//! row, which is how the yearly approval pages link to drug labels.

use drug_nme_approval_models::{PageTable, RawExtraction};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::ScrapeError;

/// Label used for the captured link column.
pub const LINK_COLUMN: &str = "LINK";

/// Extracts rows from HTML tables.
///
/// The default selectors take the first `<table>` in the document, every
/// `<tr>` inside it, and both `<th>` and `<td>` cells, so the header row
/// comes out as the first row.
#[derive(Debug, Clone)]
pub struct HtmlTableExtractor {
    /// CSS selector for the target table element.
    table_selector: String,
    /// CSS selector for rows inside the table.
    row_selector: String,
    /// CSS selector for cells within a row.
    cell_selector: String,
    /// Whether to append a column with each row's first link.
    capture_links: bool,
}

impl Default for HtmlTableExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlTableExtractor {
    /// Creates an extractor with the default selectors.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table_selector: "table".to_owned(),
            row_selector: "tr".to_owned(),
            cell_selector: "th, td".to_owned(),
            capture_links: false,
        }
    }

    /// Appends a [`LINK_COLUMN`] column with each row's first link.
    #[must_use]
    pub const fn with_links(mut self, capture: bool) -> Self {
        self.capture_links = capture;
        self
    }

    /// Extracts the first matching table as a single page.
    ///
    /// Relative link targets are resolved against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Parse`] if a selector is invalid or no table
    /// matches.
    pub fn extract(&self, html: &str, base_url: Option<&Url>) -> Result<PageTable, ScrapeError> {
        let document = Html::parse_document(html);
        let table_sel = parse_selector(&self.table_selector)?;
        let table = document.select(&table_sel).next().ok_or_else(|| {
            ScrapeError::Parse(format!(
                "no element matching '{}' found in document",
                self.table_selector
            ))
        })?;
        self.extract_rows(table, base_url)
    }

    /// Extracts every matching table, one page per table.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Parse`] if a selector is invalid.
    pub fn extract_all(
        &self,
        html: &str,
        base_url: Option<&Url>,
    ) -> Result<RawExtraction, ScrapeError> {
        let document = Html::parse_document(html);
        let table_sel = parse_selector(&self.table_selector)?;
        let pages = document
            .select(&table_sel)
            .map(|table| self.extract_rows(table, base_url))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RawExtraction::new(pages))
    }

    fn extract_rows(
        &self,
        table: ElementRef<'_>,
        base_url: Option<&Url>,
    ) -> Result<PageTable, ScrapeError> {
        let row_sel = parse_selector(&self.row_selector)?;
        let cell_sel = parse_selector(&self.cell_selector)?;
        let link_sel = parse_selector("a[href]")?;

        let mut rows = Vec::new();
        for row in table.select(&row_sel) {
            let mut cells: Vec<String> =
                row.select(&cell_sel).map(|el| element_text(&el)).collect();
            if cells.is_empty() {
                continue;
            }

            if self.capture_links {
                let link = if rows.is_empty() {
                    LINK_COLUMN.to_owned()
                } else {
                    row.select(&link_sel)
                        .next()
                        .and_then(|a| a.value().attr("href"))
                        .map(|href| resolve_href(href, base_url))
                        .unwrap_or_default()
                };
                cells.push(link);
            }

            rows.push(cells);
        }

        log::debug!("Extracted {} rows from HTML table", rows.len());
        Ok(PageTable::new(rows))
    }
}

/// Collapses an element's text nodes into a single-spaced string.
fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves `href` against `base_url`, leaving it unchanged if there is no
/// base or it cannot be joined.
fn resolve_href(href: &str, base_url: Option<&Url>) -> String {
    base_url
        .and_then(|base| base.join(href).ok())
        .map_or_else(|| href.to_owned(), String::from)
}

/// Parses a CSS selector string, returning a [`ScrapeError`] on failure.
pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector)
        .map_err(|e| ScrapeError::Parse(format!("invalid CSS selector '{selector}': {e}")))
}
