//! FDA approval reports and pages.
//!
//! Three publications are covered:
//!
//! - the yearly NME approval PDFs linked from the NME listing page,
//! - the CSV compilation of all NME and new biologic approvals,
//! - the yearly "Novel Drug Approvals" HTML pages.

use drug_nme_approval_models::{AggregatedTable, NormalizedTable, RawExtraction, YearLinks};
use drug_nme_normalize::{NormalizeOptions, normalize};
use drug_nme_pdf::PdfTableExtractor;
use drug_nme_scraper::html_table::HtmlTableExtractor;
use drug_nme_scraper::links::{fetch_named_link, fetch_year_links, year_template_links};
use drug_nme_scraper::progress::ProgressCallback;
use drug_nme_scraper::{DocumentFetcher, HttpFetcher, ScrapeError, csv_table, fetch_text};
use reqwest::Url;

use crate::aggregate::{
    AggregateOptions, DocumentKind, aggregate, aggregate_concurrent, process_year,
};
use crate::{SourceConfig, SourceError};

/// Scrapes FDA approval data through a [`DocumentFetcher`].
#[derive(Debug, Clone)]
pub struct FdaScraper<F: DocumentFetcher> {
    fetcher: F,
    config: SourceConfig,
}

impl FdaScraper<HttpFetcher> {
    /// Creates a scraper that fetches over HTTP with the configured headers.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP client cannot be built.
    pub fn from_config(config: SourceConfig) -> Result<Self, SourceError> {
        let fetcher = HttpFetcher::with_headers(&config.headers)?;
        Ok(Self::new(fetcher, config))
    }
}

impl<F: DocumentFetcher> FdaScraper<F> {
    /// Creates a scraper with the given fetcher.
    #[must_use]
    pub const fn new(fetcher: F, config: SourceConfig) -> Self {
        Self { fetcher, config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Discovers the yearly NME report links.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the listing page cannot be fetched or has
    /// no yearly links.
    pub async fn pdf_links(
        &self,
        progress: &dyn ProgressCallback,
    ) -> Result<YearLinks, SourceError> {
        let query = self.config.year_query()?;
        Ok(fetch_year_links(&self.fetcher, &self.config.nme_listing_url, &query, progress).await?)
    }

    fn pdf_kind() -> DocumentKind {
        DocumentKind::Pdf(PdfTableExtractor::new())
    }

    fn pdf_options(&self) -> AggregateOptions {
        AggregateOptions::new(self.config.normalize.clone())
            .with_date_format(self.config.date_format.clone())
    }

    /// Extracts a single year's NME report.
    ///
    /// Unlike [`extract_all`](Self::extract_all), any failure is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::YearNotFound`] if `links` has no such year,
    /// or the fetch/extraction/normalization error.
    pub async fn extract_year(
        &self,
        links: &YearLinks,
        year: i32,
    ) -> Result<AggregatedTable, SourceError> {
        let url = links.get(year).ok_or(SourceError::YearNotFound(year))?;
        let options = self.pdf_options();
        let normalized =
            process_year(&self.fetcher, &Self::pdf_kind(), &options.normalize, year, url).await?;

        let mut table = AggregatedTable::new();
        table.append(year, &normalized);
        table.parse_dates(&options.date_column, |s| {
            crate::parsing::parse_approval_date(s, &options.date_format)
        });
        log::info!("Extracted {} approvals for {year}", table.len());
        Ok(table)
    }

    /// Extracts every year in `links`, skipping (and recording) years that
    /// fail.
    pub async fn extract_all(
        &self,
        links: &YearLinks,
        progress: &dyn ProgressCallback,
    ) -> AggregatedTable {
        let kind = Self::pdf_kind();
        let options = self.pdf_options();
        if self.config.max_in_flight > 1 {
            aggregate_concurrent(
                &self.fetcher,
                links,
                &kind,
                &options,
                self.config.max_in_flight,
                progress,
            )
            .await
        } else {
            aggregate(&self.fetcher, links, &kind, &options, progress).await
        }
    }

    /// Resolves the link titled `title` on `page_url`.
    async fn named_link(
        &self,
        page_url: &str,
        title: &str,
        progress: &dyn ProgressCallback,
    ) -> Result<String, SourceError> {
        fetch_named_link(&self.fetcher, page_url, title, progress)
            .await
            .map_err(|e| match e {
                ScrapeError::NoMatchingLinks { url, .. } => SourceError::LinkNotFound {
                    url,
                    title: title.to_owned(),
                },
                other => other.into(),
            })
    }

    /// Downloads the CSV compilation of every NME and new biologic
    /// approval.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::LinkNotFound`] if the compilation page has no
    /// compilation link, or the fetch/parse error.
    pub async fn compilation(
        &self,
        progress: &dyn ProgressCallback,
    ) -> Result<NormalizedTable, SourceError> {
        let url = self
            .named_link(
                &self.config.compilation_page_url,
                &self.config.compilation_link_title,
                progress,
            )
            .await?;
        log::info!("Downloading compilation from {url}");

        let bytes = self.fetcher.fetch(&url, progress).await?;
        let raw = RawExtraction::single(csv_table::parse(&bytes, b',')?);
        let options = NormalizeOptions::default()
            .with_discard_first_page(false)
            .with_required_sentinel_column(false);
        Ok(normalize(&raw, &options)?.table)
    }

    /// Scrapes the "Novel Drug Approvals for `year`" page linked from the
    /// novel approvals listing.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::LinkNotFound`] if the listing has no page for
    /// `year`, or the fetch/parse error.
    pub async fn current_year(
        &self,
        year: i32,
        progress: &dyn ProgressCallback,
    ) -> Result<NormalizedTable, SourceError> {
        let title = format!("{} {year}", self.config.novel_link_title);
        let url = self
            .named_link(&self.config.novel_listing_url, &title, progress)
            .await?;

        let html = fetch_text(&self.fetcher, &url, progress).await?;
        let base = Url::parse(&url).ok();
        let page = HtmlTableExtractor::new().extract(&html, base.as_ref())?;
        let table = normalize(&RawExtraction::single(page), &NormalizeOptions::for_html())?.table;
        log::info!("Found {} novel approvals for {year}", table.len());
        Ok(table)
    }

    /// Scrapes the yearly "Novel Drug Approvals" pages for `start..=end`.
    ///
    /// Each row carries a `LINK` column with the resolved URL of the row's
    /// first link (usually the drug's label or press release).
    pub async fn novel_approvals(
        &self,
        start: i32,
        end: i32,
        progress: &dyn ProgressCallback,
    ) -> AggregatedTable {
        let links = year_template_links(&self.config.novel_year_template, start..=end);
        let kind = DocumentKind::Html(HtmlTableExtractor::new().with_links(true));
        let options = AggregateOptions::new(NormalizeOptions::for_html())
            .with_date_format(self.config.date_format.clone());
        aggregate(&self.fetcher, &links, &kind, &options, progress).await
    }
}

#[cfg(test)]
mod tests {
    use drug_nme_scraper::MemoryFetcher;
    use drug_nme_scraper::progress::NullProgress;

    use super::*;

    fn config() -> SourceConfig {
        SourceConfig {
            nme_listing_url: "https://fda.test/nme".to_owned(),
            compilation_page_url: "https://fda.test/compilation".to_owned(),
            novel_listing_url: "https://fda.test/novel".to_owned(),
            novel_year_template: "https://fda.test/novel-{year}".to_owned(),
            max_in_flight: 1,
            ..SourceConfig::default()
        }
    }

    const NOVEL_2023: &str = r#"
        <table>
          <tr><th>No.</th><th>Drug  Name</th><th>Active Ingredient</th><th>Approval Date</th></tr>
          <tr><td>1</td><td><a href="/drugs/leqembi">Leqembi</a></td><td>lecanemab-irmb</td><td>1/6/2023</td></tr>
          <tr><td>2</td><td><a href="/drugs/brenzavvy">Brenzavvy</a></td><td>bexagliflozin</td><td>1/20/2023</td></tr>
        </table>
    "#;

    #[tokio::test]
    async fn discovers_pdf_links() {
        let fetcher = MemoryFetcher::new().with_document(
            "https://fda.test/nme",
            r#"<a href="/media/1/download" title="NME Drug and New Biologic Approvals in 2015">2015</a>"#,
        );
        let scraper = FdaScraper::new(fetcher, config());
        let links = scraper.pdf_links(&NullProgress).await.unwrap();
        assert_eq!(links.get(2015), Some("https://fda.test/media/1/download"));
    }

    #[tokio::test]
    async fn unknown_year_is_an_error() {
        let scraper = FdaScraper::new(MemoryFetcher::new(), config());
        let err = scraper
            .extract_year(&YearLinks::new(), 1999)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::YearNotFound(1999)));
    }

    #[tokio::test]
    async fn unreadable_reports_are_recorded_as_failures() {
        let fetcher = MemoryFetcher::new().with_document("https://fda.test/2015.pdf", "not a pdf");
        let scraper = FdaScraper::new(fetcher, config());
        let links: YearLinks = vec![(2015, "https://fda.test/2015.pdf")].into_iter().collect();

        let table = scraper.extract_all(&links, &NullProgress).await;
        assert!(table.is_empty());
        assert_eq!(table.failures().len(), 1);
    }

    #[tokio::test]
    async fn downloads_compilation_csv() {
        let fetcher = MemoryFetcher::new()
            .with_document(
                "https://fda.test/compilation",
                r#"<a href="/media/89149/download">Compilation Of CDER NME And New Biologic Approvals 1985-2022 (CSV)</a>"#,
            )
            .with_document(
                "https://fda.test/media/89149/download",
                "NDA/BLA,Proprietary Name,Approval Date\n021436,Drugalin,01/15/2020\n",
            );
        let scraper = FdaScraper::new(fetcher, config());

        let table = scraper.compilation(&NullProgress).await.unwrap();
        assert_eq!(table.header(), ["NDA/BLA", "PROPRIETARY NAME", "APPROVAL DATE"]);
        assert_eq!(table.get(0, "PROPRIETARY NAME"), Some("Drugalin"));
    }

    #[tokio::test]
    async fn missing_compilation_link_is_reported() {
        let fetcher = MemoryFetcher::new().with_document("https://fda.test/compilation", "<p></p>");
        let scraper = FdaScraper::new(fetcher, config());
        let err = scraper.compilation(&NullProgress).await.unwrap_err();
        assert!(matches!(err, SourceError::LinkNotFound { .. }));
    }

    #[tokio::test]
    async fn scrapes_current_year_page() {
        let fetcher = MemoryFetcher::new()
            .with_document(
                "https://fda.test/novel",
                r#"<a href="/novel-2023" title="Novel Drug Approvals for 2023">2023</a>"#,
            )
            .with_document("https://fda.test/novel-2023", NOVEL_2023);
        let scraper = FdaScraper::new(fetcher, config());

        let table = scraper.current_year(2023, &NullProgress).await.unwrap();
        assert_eq!(
            table.header(),
            ["DRUG NAME", "ACTIVE INGREDIENT", "APPROVAL DATE"]
        );
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn novel_approvals_capture_links() {
        let fetcher = MemoryFetcher::new().with_document("https://fda.test/novel-2023", NOVEL_2023);
        let scraper = FdaScraper::new(fetcher, config());

        let table = scraper.novel_approvals(2022, 2023, &NullProgress).await;
        assert_eq!(table.len(), 2);
        assert_eq!(table.failures()[0].year, 2022);
        assert_eq!(table.value(0, "LINK"), Some("https://fda.test/drugs/leqembi"));
        assert_eq!(
            table.rows()[1].approval_date,
            chrono::NaiveDate::from_ymd_opt(2023, 1, 20)
        );
    }
}
