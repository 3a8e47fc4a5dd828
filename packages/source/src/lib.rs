#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Drug approval data sources.
//!
//! - [`fda`]: FDA NME approval reports (yearly PDFs), the CSV compilation,
//!   and the yearly "Novel Drug Approvals" pages.
//! - [`aggregate`]: fetch, extract and normalize one document per year and
//!   concatenate the results.
//! - [`pharmacology`]: approved ligands from the Guide to Pharmacology.
//! - [`openfda`]: New Molecular Entity submissions from the openFDA
//!   `drugsfda` bulk download.
//! - [`target`]: protein targets and their database cross-references from
//!   the Guide to Pharmacology.
//!
//! Endpoints come from [`config::SourceConfig`].

pub mod aggregate;
pub mod config;
pub mod fda;
pub mod json_table;
pub mod location;
pub mod openfda;
pub mod parsing;
pub mod pharmacology;
pub mod target;

use drug_nme_approval_models::UnknownAgencyError;
use drug_nme_normalize::NormalizeError;
use drug_nme_pdf::PdfError;
use drug_nme_scraper::ScrapeError;

pub use config::SourceConfig;

/// Errors that can occur during data source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Fetching or parsing a document failed.
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    /// Extracting text from a PDF failed.
    #[error(transparent)]
    Pdf(#[from] PdfError),

    /// A single document could not be normalized.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// One year's document could not be normalized.
    #[error("{year} ({url}): {source}")]
    MalformedTable {
        /// Year being processed.
        year: i32,
        /// Document URL.
        url: String,
        /// Why normalization failed.
        source: NormalizeError,
    },

    /// A named link was not found on a page.
    #[error("No link titled '{title}' found on {url}")]
    LinkNotFound {
        /// Page that was scanned.
        url: String,
        /// Title text that was looked for.
        title: String,
    },

    /// A requested year has no link.
    #[error("No link for year {0}")]
    YearNotFound(i32),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reading a zip archive failed.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A config file could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// A configured pattern failed to compile.
    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    /// An agency name is not supported.
    #[error(transparent)]
    UnknownAgency(#[from] UnknownAgencyError),

    /// A species name is not supported.
    #[error("Unknown species '{0}' (expected Human, Mouse, Rat or All)")]
    UnknownSpecies(String),

    /// A response did not have the expected shape.
    #[error("Unexpected response from {url}: {message}")]
    UnexpectedResponse {
        /// Where the response came from.
        url: String,
        /// What was wrong with it.
        message: String,
    },
}
