//! Multi-year aggregation.
//!
//! For each `(year, url)` pair: fetch the document, extract its tables,
//! normalize them and append the rows tagged with the year. A year that
//! fails at any step is logged and recorded in
//! [`AggregatedTable::failures`], and the run moves on to the next year.
//! Once every year is in, the approval date column is parsed.

use drug_nme_approval_models::{
    AggregatedTable, NormalizedTable, RawExtraction, YearFailure, YearLinks,
};
use drug_nme_normalize::{APPLICATION_NUMBER, APPROVAL_DATE, NormalizeOptions, normalize};
use drug_nme_pdf::PdfTableExtractor;
use drug_nme_scraper::html_table::HtmlTableExtractor;
use drug_nme_scraper::progress::{NullProgress, ProgressCallback};
use drug_nme_scraper::{DocumentFetcher, csv_table};
use futures::stream::{self, StreamExt as _};
use reqwest::Url;

use crate::SourceError;
use crate::parsing::{APPROVAL_DATE_FORMAT, parse_approval_date};

/// How a fetched document is turned into page tables.
#[derive(Debug, Clone)]
pub enum DocumentKind {
    /// A PDF report, one table per page.
    Pdf(PdfTableExtractor),
    /// An HTML page; the first matching table is used.
    Html(HtmlTableExtractor),
    /// A CSV file with the given delimiter.
    Csv {
        /// Field delimiter byte.
        delimiter: u8,
    },
}

impl DocumentKind {
    /// Extracts page tables from a fetched document.
    ///
    /// Relative links in HTML documents are resolved against `url`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the document cannot be parsed.
    pub fn extract(&self, bytes: &[u8], url: &str) -> Result<RawExtraction, SourceError> {
        match self {
            Self::Pdf(extractor) => Ok(extractor.extract(bytes)?),
            Self::Html(extractor) => {
                let html = String::from_utf8_lossy(bytes);
                let base = Url::parse(url).ok();
                Ok(RawExtraction::single(extractor.extract(&html, base.as_ref())?))
            }
            Self::Csv { delimiter } => Ok(RawExtraction::single(csv_table::parse(
                bytes, *delimiter,
            )?)),
        }
    }
}

/// Settings for an aggregation run.
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// How each year's tables are normalized.
    pub normalize: NormalizeOptions,
    /// Column parsed into each row's
    /// [`approval_date`](drug_nme_approval_models::AggregatedRow).
    pub date_column: String,
    /// `chrono` format of `date_column` once whitespace is removed.
    pub date_format: String,
}

impl AggregateOptions {
    /// Options with the canonical approval date column and format.
    #[must_use]
    pub fn new(normalize: NormalizeOptions) -> Self {
        Self {
            normalize,
            date_column: APPROVAL_DATE.to_owned(),
            date_format: APPROVAL_DATE_FORMAT.to_owned(),
        }
    }

    /// Overrides the date format.
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self::new(NormalizeOptions::default())
    }
}

/// Fetches, extracts and normalizes a single year's document.
///
/// # Errors
///
/// Returns [`SourceError`] if fetching or extraction fails, or
/// [`SourceError::MalformedTable`] if no strategy can normalize it.
pub async fn process_year(
    fetcher: &impl DocumentFetcher,
    kind: &DocumentKind,
    options: &NormalizeOptions,
    year: i32,
    url: &str,
) -> Result<NormalizedTable, SourceError> {
    let bytes = fetcher.fetch(url, &NullProgress).await?;
    let raw = kind.extract(&bytes, url)?;
    let normalized = normalize(&raw, options).map_err(|source| SourceError::MalformedTable {
        year,
        url: url.to_owned(),
        source,
    })?;
    Ok(normalized.table)
}

/// Aggregates every year in `links`, one at a time, in the links' order.
///
/// Never fails as a whole: per-year errors end up in
/// [`AggregatedTable::failures`].
pub async fn aggregate(
    fetcher: &impl DocumentFetcher,
    links: &YearLinks,
    kind: &DocumentKind,
    options: &AggregateOptions,
    progress: &dyn ProgressCallback,
) -> AggregatedTable {
    progress.set_total(links.len() as u64);

    let mut results = Vec::with_capacity(links.len());
    for link in links {
        progress.set_message(link.year.to_string());
        let result = process_year(fetcher, kind, &options.normalize, link.year, &link.url).await;
        results.push((link.year, link.url.clone(), result));
        progress.inc(1);
    }

    let table = assemble(results, options);
    progress.finish(format!("Extracted {} rows", table.len()));
    table
}

/// Like [`aggregate`], but keeps up to `max_in_flight` downloads running at
/// once. Rows come out ordered by year whatever order the downloads finish
/// in.
pub async fn aggregate_concurrent(
    fetcher: &impl DocumentFetcher,
    links: &YearLinks,
    kind: &DocumentKind,
    options: &AggregateOptions,
    max_in_flight: usize,
    progress: &dyn ProgressCallback,
) -> AggregatedTable {
    progress.set_total(links.len() as u64);
    log::info!(
        "Aggregating {} years (concurrency={max_in_flight})...",
        links.len()
    );

    let mut results: Vec<_> = stream::iter(links.iter().map(|link| async move {
        let result = process_year(fetcher, kind, &options.normalize, link.year, &link.url).await;
        progress.inc(1);
        (link.year, link.url.clone(), result)
    }))
    .buffer_unordered(max_in_flight.max(1))
    .collect()
    .await;
    results.sort_by_key(|(year, _, _)| *year);

    let table = assemble(results, options);
    progress.finish(format!("Extracted {} rows", table.len()));
    table
}

fn assemble(
    results: Vec<(i32, String, Result<NormalizedTable, SourceError>)>,
    options: &AggregateOptions,
) -> AggregatedTable {
    let mut table = AggregatedTable::new();

    for (year, url, result) in results {
        match result {
            Ok(normalized) => {
                log::debug!("{year}: {} rows", normalized.len());
                table.append(year, &normalized);
            }
            Err(e) => {
                log::warn!("Skipping {year} ({url}): {e}");
                table.push_failure(YearFailure {
                    year,
                    url,
                    error: e.to_string(),
                });
            }
        }
    }

    let unparsed = table.parse_dates(&options.date_column, |s| {
        parse_approval_date(s, &options.date_format)
    });
    if unparsed > 0 {
        log::debug!("{unparsed} approval dates could not be parsed");
    }

    let duplicates = table.duplicate_keys(APPLICATION_NUMBER);
    if !duplicates.is_empty() {
        log::debug!(
            "{} application numbers appear more than once on the same date",
            duplicates.len()
        );
    }

    log::info!(
        "Aggregated {} rows ({} years failed)",
        table.len(),
        table.failures().len()
    );
    table
}
