//! New Molecular Entity submissions from the openFDA `drugsfda` dataset.
//!
//! The bulk download is a zip archive holding a single JSON document with
//! one entry per application. Each application lists products (with their
//! active ingredients) and submissions; those are flattened into one
//! [`SubmissionRecord`] per ingredient and submission.

use std::collections::BTreeSet;
use std::io::{Cursor, Read as _};

use drug_nme_approval_models::SubmissionRecord;
use drug_nme_scraper::DocumentFetcher;
use drug_nme_scraper::progress::ProgressCallback;
use serde::Deserialize;

use crate::location::DataLocation;
use crate::{SourceConfig, SourceError};

/// Submission class description marking a New Molecular Entity.
pub const NME_CLASS_DESCRIPTION: &str = "New Molecular Entity";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

#[derive(Debug, Default, Deserialize)]
struct DrugsFda {
    #[serde(default)]
    results: Vec<Application>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Application {
    application_number: Option<String>,
    sponsor_name: Option<String>,
    products: Vec<Product>,
    submissions: Vec<Submission>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Product {
    brand_name: Option<String>,
    active_ingredients: Vec<ActiveIngredient>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ActiveIngredient {
    name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Submission {
    submission_type: Option<String>,
    submission_number: Option<String>,
    submission_status: Option<String>,
    submission_status_date: Option<String>,
    review_priority: Option<String>,
    submission_class_code: Option<String>,
    submission_class_code_description: Option<String>,
}

/// Returns the JSON document inside `bytes`, unzipping it first if
/// `bytes` is a zip archive (the first entry is used).
///
/// # Errors
///
/// Returns [`SourceError::Zip`] for a broken or empty archive.
pub fn unwrap_json(bytes: Vec<u8>) -> Result<Vec<u8>, SourceError> {
    if !bytes.starts_with(ZIP_MAGIC) {
        return Ok(bytes);
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut entry = archive.by_index(0)?;
    log::debug!("Reading {} from zip archive", entry.name());
    let mut json = Vec::new();
    entry.read_to_end(&mut json)?;
    Ok(json)
}

/// Flattens a `drugsfda` JSON document into submission records for NDA
/// and BLA applications.
///
/// # Errors
///
/// Returns [`SourceError::Json`] if the document is malformed.
pub fn flatten_submissions(json: &[u8]) -> Result<Vec<SubmissionRecord>, SourceError> {
    let document: DrugsFda = serde_json::from_slice(json)?;
    let mut records = Vec::new();

    for application in document.results {
        let Some(number) = application
            .application_number
            .filter(|n| n.starts_with("NDA") || n.starts_with("BLA"))
        else {
            continue;
        };

        for product in &application.products {
            for ingredient in &product.active_ingredients {
                for submission in &application.submissions {
                    let submission = submission.clone();
                    records.push(SubmissionRecord {
                        application_number: number.clone(),
                        sponsor_name: application.sponsor_name.clone(),
                        active_ingredient: ingredient.name.clone(),
                        brand_name: product.brand_name.clone(),
                        submission_type: submission.submission_type,
                        submission_number: submission.submission_number,
                        submission_status: submission.submission_status,
                        submission_status_date: submission.submission_status_date,
                        review_priority: submission.review_priority,
                        submission_class_code: submission.submission_class_code,
                        submission_class_code_description: submission
                            .submission_class_code_description,
                    });
                }
            }
        }
    }

    log::debug!("Flattened {} submission records", records.len());
    Ok(records)
}

/// Keeps New Molecular Entity submissions, one per active ingredient (the
/// first one seen wins).
#[must_use]
pub fn nme_submissions(records: Vec<SubmissionRecord>) -> Vec<SubmissionRecord> {
    let needle = NME_CLASS_DESCRIPTION.to_lowercase();
    let mut seen = BTreeSet::new();

    records
        .into_iter()
        .filter(|record| {
            record
                .submission_class_code_description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .filter(|record| seen.insert(record.active_ingredient.clone()))
        .collect()
}

/// Fetches NME submissions from openFDA.
#[derive(Debug, Clone)]
pub struct OpenFdaFetcher<F: DocumentFetcher> {
    fetcher: F,
    location: DataLocation,
}

impl<F: DocumentFetcher> OpenFdaFetcher<F> {
    /// Creates a fetcher reading the configured bulk download.
    #[must_use]
    pub fn new(fetcher: F, config: &SourceConfig) -> Self {
        Self {
            fetcher,
            location: DataLocation::Url(config.openfda_url.clone()),
        }
    }

    /// Reads the dataset from `location` instead (e.g. a saved JSON file).
    #[must_use]
    pub fn with_location(mut self, location: DataLocation) -> Self {
        self.location = location;
        self
    }

    /// Downloads (or reads) the dataset and returns NME submissions.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the data cannot be read, unzipped or
    /// parsed.
    pub async fn nme_submissions(
        &self,
        progress: &dyn ProgressCallback,
    ) -> Result<Vec<SubmissionRecord>, SourceError> {
        progress.set_message("Downloading data from openFDA".to_owned());
        let bytes = self.location.read(&self.fetcher, progress).await?;
        let json = unwrap_json(bytes)?;
        let records = nme_submissions(flatten_submissions(&json)?);
        log::info!("Found {} NME submissions in {}", records.len(), self.location);
        Ok(records)
    }
}
