//! Splitting extracted PDF text into table rows.
//!
//! Handles two common layouts:
//! - **Gap-separated columns**: cells separated by runs of whitespace or tabs
//! - **Fixed-width columns**: cells at known character positions

use drug_nme_approval_models::{PageTable, Row};
use regex::Regex;

use crate::PdfError;

/// How a line of text is cut into cells.
#[derive(Debug, Clone)]
pub enum ColumnSplit {
    /// Split wherever at least `min_gap` consecutive spaces (or a tab)
    /// occur.
    Gaps {
        /// Minimum run of spaces treated as a column boundary.
        min_gap: usize,
    },

    /// Cut each line at fixed character positions. For example, `[0, 12,
    /// 30]` means column 1 is chars 0..12, column 2 is chars 12..30 and
    /// column 3 runs to the end of the line. Positions must be ascending.
    Positions(Vec<usize>),
}

impl Default for ColumnSplit {
    fn default() -> Self {
        Self::Gaps { min_gap: 2 }
    }
}

/// Converts one page of text into a [`PageTable`].
///
/// Blank lines are skipped. Cells are trimmed.
///
/// # Errors
///
/// Returns [`PdfError::Regex`] if a gap pattern cannot be built, or
/// [`PdfError::UnsortedPositions`] if fixed positions are out of order.
pub fn page_rows(text: &str, split: &ColumnSplit) -> Result<PageTable, PdfError> {
    let rows = match split {
        ColumnSplit::Gaps { min_gap } => {
            let re = Regex::new(&format!(r"\t+| {{{},}}", (*min_gap).max(1)))?;
            text.lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| split_gaps(line, &re))
                .collect()
        }
        ColumnSplit::Positions(starts) => {
            if !starts.is_sorted() {
                return Err(PdfError::UnsortedPositions(starts.clone()));
            }
            text.lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| split_positions(line, starts))
                .collect()
        }
    };
    Ok(PageTable::new(rows))
}

fn split_gaps(line: &str, re: &Regex) -> Row {
    re.split(line.trim())
        .map(|cell| cell.trim().to_owned())
        .collect()
}

fn split_positions(line: &str, starts: &[usize]) -> Row {
    let chars: Vec<char> = line.chars().collect();
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(chars.len());
            // Lines shorter than the layout yield empty trailing cells
            if start < chars.len() {
                chars[start..end.min(chars.len())]
                    .iter()
                    .collect::<String>()
                    .trim()
                    .to_owned()
            } else {
                String::new()
            }
        })
        .collect()
}
