//! Year-keyed link discovery on listing pages.
//!
//! Regulatory sites publish one document per year and link them from a
//! listing page. [`discover_links`] scans every anchor on such a page,
//! pulls a four-digit year out of the anchor's title (or its text when it
//! has no title), and resolves the `href` against the listing URL.

use std::ops::RangeInclusive;

use drug_nme_approval_models::YearLinks;
use regex::Regex;
use reqwest::Url;
use scraper::Html;

use crate::html_table::parse_selector;
use crate::progress::ProgressCallback;
use crate::{DocumentFetcher, ScrapeError, fetch_text};

/// Default pattern for pulling a year out of a link label.
pub const DEFAULT_YEAR_PATTERN: &str = r"\b(\d{4})\b";

/// Placeholder replaced by [`year_template_links`].
pub const YEAR_PLACEHOLDER: &str = "{year}";

/// What to look for when scanning a listing page.
#[derive(Debug, Clone)]
pub struct LinkQuery {
    /// Pattern matched against each anchor label. The year is the first
    /// capture group, or the whole match if the pattern has no groups.
    pub year_pattern: Regex,
    /// Only consider anchors whose label contains this text
    /// (case-insensitive).
    pub title_contains: Option<String>,
    /// Only consider anchors whose `href` contains this text
    /// (case-insensitive).
    pub href_contains: Option<String>,
}

impl Default for LinkQuery {
    fn default() -> Self {
        Self {
            year_pattern: default_year_regex(),
            title_contains: None,
            href_contains: None,
        }
    }
}

impl LinkQuery {
    /// Creates a query with a custom year pattern.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] if `pattern` does not compile.
    pub fn with_pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            year_pattern: Regex::new(pattern)?,
            ..Self::default()
        })
    }

    /// Restricts the scan to anchors whose label contains `text`.
    #[must_use]
    pub fn title_contains(mut self, text: impl Into<String>) -> Self {
        self.title_contains = Some(text.into());
        self
    }

    /// Restricts the scan to anchors whose `href` contains `text`.
    #[must_use]
    pub fn href_contains(mut self, text: impl Into<String>) -> Self {
        self.href_contains = Some(text.into());
        self
    }

    /// Human-readable description used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut parts = vec![format!("year /{}/", self.year_pattern.as_str())];
        if let Some(title) = &self.title_contains {
            parts.push(format!("title containing '{title}'"));
        }
        if let Some(href) = &self.href_contains {
            parts.push(format!("href containing '{href}'"));
        }
        parts.join(", ")
    }

    fn year_in(&self, label: &str) -> Option<i32> {
        let caps = self.year_pattern.captures(label)?;
        let matched = caps.get(1).or_else(|| caps.get(0))?;
        matched.as_str().parse().ok()
    }
}

fn default_year_regex() -> Regex {
    Regex::new(DEFAULT_YEAR_PATTERN).unwrap_or_else(|_| unreachable!())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// An anchor's label and raw `href`, in document order.
fn anchors(html: &str) -> Vec<(String, String)> {
    let document = Html::parse_document(html);
    let Ok(selector) = parse_selector("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim().to_owned();
            let label = a.value().attr("title").map_or_else(
                || a.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" "),
                |title| title.trim().to_owned(),
            );
            Some((label, href))
        })
        .collect()
}

/// Scans `html` for anchors whose label carries a year.
///
/// Relative hrefs are resolved against `base_url`; hrefs that cannot be
/// resolved are skipped. When several anchors carry the same year, the
/// last one in document order wins.
#[must_use]
pub fn discover_links(html: &str, base_url: &Url, query: &LinkQuery) -> YearLinks {
    let mut links = YearLinks::new();

    for (label, href) in anchors(html) {
        if let Some(wanted) = &query.title_contains
            && !contains_ignore_case(&label, wanted)
        {
            continue;
        }
        if let Some(wanted) = &query.href_contains
            && !contains_ignore_case(&href, wanted)
        {
            continue;
        }
        let Some(year) = query.year_in(&label) else {
            continue;
        };
        let Ok(url) = base_url.join(&href) else {
            log::debug!("Skipping unresolvable link '{href}' for {year}");
            continue;
        };
        if let Some(previous) = links.insert_or_replace(year, url.to_string()) {
            log::debug!("Replacing link for {year}: {previous} -> {url}");
        }
    }

    links
}

/// Returns the resolved URL of the first anchor whose label contains
/// `title_contains` (case-insensitive).
#[must_use]
pub fn find_link(html: &str, base_url: &Url, title_contains: &str) -> Option<String> {
    anchors(html)
        .into_iter()
        .filter(|(label, _)| contains_ignore_case(label, title_contains))
        .find_map(|(_, href)| base_url.join(&href).ok())
        .map(String::from)
}

fn parse_base(url: &str) -> Result<Url, ScrapeError> {
    Url::parse(url).map_err(|e| ScrapeError::InvalidUrl {
        url: url.to_owned(),
        message: e.to_string(),
    })
}

/// Fetches `listing_url` and runs [`discover_links`] on it.
///
/// # Errors
///
/// Returns [`ScrapeError::NoMatchingLinks`] if nothing matched, or any
/// fetch error.
pub async fn fetch_year_links(
    fetcher: &impl DocumentFetcher,
    listing_url: &str,
    query: &LinkQuery,
    progress: &dyn ProgressCallback,
) -> Result<YearLinks, ScrapeError> {
    let base = parse_base(listing_url)?;
    let html = fetch_text(fetcher, listing_url, progress).await?;
    let links = discover_links(&html, &base, query);

    if links.is_empty() {
        return Err(ScrapeError::NoMatchingLinks {
            url: listing_url.to_owned(),
            pattern: query.describe(),
        });
    }

    log::info!("Found {} yearly links on {listing_url}", links.len());
    Ok(links)
}

/// Fetches `listing_url` and runs [`find_link`] on it.
///
/// # Errors
///
/// Returns [`ScrapeError::NoMatchingLinks`] if no anchor matched, or any
/// fetch error.
pub async fn fetch_named_link(
    fetcher: &impl DocumentFetcher,
    listing_url: &str,
    title_contains: &str,
    progress: &dyn ProgressCallback,
) -> Result<String, ScrapeError> {
    let base = parse_base(listing_url)?;
    let html = fetch_text(fetcher, listing_url, progress).await?;
    find_link(&html, &base, title_contains).ok_or_else(|| ScrapeError::NoMatchingLinks {
        url: listing_url.to_owned(),
        pattern: format!("title containing '{title_contains}'"),
    })
}

/// Expands a URL template by replacing [`YEAR_PLACEHOLDER`] with each year
/// in `years`.
///
/// ```
/// use drug_nme_scraper::links::year_template_links;
///
/// let links = year_template_links("https://fda.example/approvals-{year}", 2021..=2022);
/// assert_eq!(links.get(2022), Some("https://fda.example/approvals-2022"));
/// ```
#[must_use]
pub fn year_template_links(template: &str, years: RangeInclusive<i32>) -> YearLinks {
    years
        .map(|year| (year, template.replace(YEAR_PLACEHOLDER, &year.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryFetcher;
    use crate::progress::NullProgress;

    const LISTING: &str = r#"
        <ul>
          <li><a href="/drugs/novel-drug-approvals-2023" title="Novel Drug Approvals for 2023">2023</a></li>
          <li><a href="/drugs/novel-drug-approvals-2022" title="Novel Drug Approvals for 2022">2022</a></li>
          <li><a href="/about">About FDA</a></li>
        </ul>
    "#;

    fn base() -> Url {
        Url::parse("https://www.fda.gov/drugs/novel-drug-approvals-fda").unwrap()
    }

    #[test]
    fn resolves_titled_links_against_site_root() {
        let links = discover_links(LISTING, &base(), &LinkQuery::default());
        assert_eq!(links.years(), vec![2023, 2022]);
        assert_eq!(
            links.get(2023),
            Some("https://www.fda.gov/drugs/novel-drug-approvals-2023")
        );
        assert_eq!(
            links.get(2022),
            Some("https://www.fda.gov/drugs/novel-drug-approvals-2022")
        );
    }

    #[test]
    fn falls_back_to_anchor_text_and_keeps_last_per_year() {
        let html = r#"
            <a href="nme-2019.pdf">NME approvals 2019 (PDF)</a>
            <a href="nme-2019-corrected.pdf">NME approvals 2019 corrected</a>
        "#;
        let base = Url::parse("https://www.fda.gov/drugs/nda-and-bla-approvals/listing").unwrap();
        let links = discover_links(html, &base, &LinkQuery::default());
        assert_eq!(links.len(), 1);
        assert_eq!(
            links.get(2019),
            Some("https://www.fda.gov/drugs/nda-and-bla-approvals/nme-2019-corrected.pdf")
        );
    }

    #[test]
    fn later_anchor_replaces_earlier_year_in_place() {
        let html = r#"
            <a href="/old-2019.pdf">NME approvals 2019</a>
            <a href="/nme-2020.pdf">NME approvals 2020</a>
            <a href="/new-2019.pdf">NME approvals 2019</a>
        "#;
        let links = discover_links(html, &base(), &LinkQuery::default());
        assert_eq!(links.years(), vec![2019, 2020]);
        assert_eq!(links.get(2019), Some("https://www.fda.gov/new-2019.pdf"));
    }

    #[test]
    fn filters_narrow_the_scan() {
        let html = r#"
            <a href="/a.pdf">Report 2020</a>
            <a href="/b.html">Report 2021</a>
        "#;
        let query = LinkQuery::default().href_contains(".PDF");
        let links = discover_links(html, &base(), &query);
        assert_eq!(links.years(), vec![2020]);

        let query = LinkQuery::default().title_contains("nothing like this");
        assert!(discover_links(html, &base(), &query).is_empty());
    }

    #[test]
    fn pattern_without_groups_uses_whole_match() {
        let query = LinkQuery::with_pattern(r"\d{4}").unwrap();
        let links = discover_links(r#"<a href="/x">FY2018</a>"#, &base(), &query);
        assert_eq!(links.years(), vec![2018]);
    }

    #[test]
    fn finds_named_link() {
        let html = r#"<a href="/media/89149/download">Compilation Of CDER NME And New Biologic Approvals 1985-2022</a>"#;
        let url = find_link(html, &base(), "compilation of cder nme");
        assert_eq!(url.as_deref(), Some("https://www.fda.gov/media/89149/download"));
        assert_eq!(find_link(html, &base(), "missing"), None);
    }

    #[test]
    fn expands_year_template() {
        let links = year_template_links("https://x.test/novel-{year}", 2018..=2020);
        assert_eq!(links.years(), vec![2018, 2019, 2020]);
        assert_eq!(links.get(2019), Some("https://x.test/novel-2019"));
    }

    #[tokio::test]
    async fn fetching_without_matches_is_an_error() {
        let fetcher = MemoryFetcher::new().with_document("https://x.test/list", "<p>none</p>");
        let err = fetch_year_links(
            &fetcher,
            "https://x.test/list",
            &LinkQuery::default(),
            &NullProgress,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScrapeError::NoMatchingLinks { .. }));
    }

    #[tokio::test]
    async fn fetches_named_link() {
        let fetcher = MemoryFetcher::new().with_document("https://x.test/list", LISTING);
        let url = fetch_named_link(&fetcher, "https://x.test/list", "for 2022", &NullProgress)
            .await
            .unwrap();
        assert_eq!(url, "https://x.test/drugs/novel-drug-approvals-2022");
    }
}
