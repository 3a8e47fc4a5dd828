#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! PDF table extraction for drug approval reports.
//!
//! The FDA publishes each year's NME approvals as a PDF whose first page is
//! a title block and whose remaining pages hold the approvals table. This
//! crate turns such a document into a
//! [`RawExtraction`](drug_nme_approval_models::RawExtraction) using
//! pure-Rust text extraction ([`pdf_extract`]) and a configurable column
//! splitter ([`text_table`]).
//!
//! Normalizing the extracted pages is the job of `drug_nme_normalize`.

pub mod text_table;

use std::panic::{self, AssertUnwindSafe};

use drug_nme_approval_models::{PageTable, RawExtraction};
use text_table::ColumnSplit;

/// Errors specific to PDF extraction.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// PDF text extraction failed.
    #[error("PDF extraction error: {0}")]
    Extraction(String),

    /// The underlying extractor panicked on a malformed document.
    #[error("PDF extraction panicked (malformed document)")]
    Panicked,

    /// The column splitter pattern failed to compile.
    #[error("Invalid column pattern: {0}")]
    Regex(#[from] regex::Error),

    /// Fixed column positions were not in ascending order.
    #[error("Column positions must be ascending, got {0:?}")]
    UnsortedPositions(Vec<usize>),
}

/// Whether a document comes out as one table per page or one table total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractionMode {
    /// One [`PageTable`] per physical page.
    #[default]
    PerPage,
    /// All pages concatenated into a single [`PageTable`].
    Flattened,
}

/// Extracts page tables from PDF bytes.
#[derive(Debug, Clone, Default)]
pub struct PdfTableExtractor {
    mode: ExtractionMode,
    split: ColumnSplit,
}

impl PdfTableExtractor {
    /// Creates an extractor producing one table per page, splitting
    /// columns on whitespace gaps.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the extraction mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: ExtractionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets how lines are split into cells.
    #[must_use]
    pub fn with_split(mut self, split: ColumnSplit) -> Self {
        self.split = split;
        self
    }

    /// Extracts page tables from an in-memory PDF.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the document cannot be read.
    pub fn extract(&self, bytes: &[u8]) -> Result<RawExtraction, PdfError> {
        let pages = page_texts(bytes)?;
        log::debug!("Extracted text from {} PDF pages", pages.len());
        self.extract_from_texts(&pages)
    }

    /// Splits already-extracted page texts into tables.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Regex`] or [`PdfError::UnsortedPositions`] if
    /// the column splitter is invalid.
    pub fn extract_from_texts<S: AsRef<str>>(
        &self,
        pages: &[S],
    ) -> Result<RawExtraction, PdfError> {
        let tables = pages
            .iter()
            .map(|text| text_table::page_rows(text.as_ref(), &self.split))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match self.mode {
            ExtractionMode::PerPage => RawExtraction::new(tables),
            ExtractionMode::Flattened => RawExtraction::single(PageTable::new(
                tables.into_iter().flat_map(|page| page.rows).collect(),
            )),
        })
    }
}

/// Extracts one string per page, converting extractor panics into
/// [`PdfError::Panicked`].
fn page_texts(bytes: &[u8]) -> Result<Vec<String>, PdfError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(PdfError::Extraction(format!(
            "failed to extract text from PDF: {e}"
        ))),
        Err(_) => Err(PdfError::Panicked),
    }
}
