//! Approved ligands from the Guide to Pharmacology.
//!
//! The approved-ligands endpoint returns every ligand with an
//! `approvalSource` free-text field such as `"FDA (2001), EMA (2003)"`.
//! The text is inconsistent, so each agency's year is looked for with
//! three progressively looser patterns.

use std::str::FromStr as _;

use drug_nme_approval_models::{Agency, AgencySelection, LigandApproval};
use drug_nme_scraper::DocumentFetcher;
use drug_nme_scraper::progress::ProgressCallback;
use regex::Regex;
use serde::Deserialize;

use crate::location::DataLocation;
use crate::{SourceConfig, SourceError};

/// A ligand as returned by the approved-ligands endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ligand {
    /// Ligand identifier.
    pub ligand_id: Option<i64>,
    /// Ligand name.
    pub name: Option<String>,
    /// Ligand type.
    #[serde(rename = "type")]
    pub ligand_type: Option<String>,
    /// Free-text approval history.
    pub approval_source: Option<String>,
    /// Whether the ligand has been withdrawn.
    pub withdrawn: Option<bool>,
    /// Whether the ligand is a WHO essential medicine.
    pub who_essential: Option<bool>,
}

/// Year-matching patterns for one agency, strictest first.
struct AgencyPatterns {
    agency: Agency,
    patterns: [Regex; 3],
}

impl AgencyPatterns {
    fn new(agency: Agency) -> Result<Self, regex::Error> {
        let label = regex::escape(agency.label());
        Ok(Self {
            agency,
            patterns: [
                // FDA (2001)
                Regex::new(&format!(r"(?i)\b{label}\b[^()]*\(\s*(\d{{4}})\s*\)"))?,
                // FDA (2001, withdrawn 2005)
                Regex::new(&format!(r"(?i)\b{label}\b[^()]*\(\s*(\d{{4}})\s*(?:[^)]*)?\)"))?,
                // FDA approved 2001
                Regex::new(&format!(r"(?i)\b{label}\b.*\b(\d{{4}})\b"))?,
            ],
        })
    }

    fn year_in(&self, text: &str) -> Option<i32> {
        self.patterns
            .iter()
            .find_map(|re| re.captures(text))
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

/// Finds `agency`'s approval year in an `approvalSource` string.
///
/// # Errors
///
/// Returns [`SourceError::Regex`] if the agency pattern cannot be built.
pub fn approval_year(text: &str, agency: Agency) -> Result<Option<i32>, SourceError> {
    Ok(AgencyPatterns::new(agency)?.year_in(text))
}

/// Converts ligands into one approval record per matched agency, dropping
/// ligands with no approval by any selected agency.
///
/// # Errors
///
/// Returns [`SourceError::Regex`] if an agency pattern cannot be built.
pub fn extract_approvals(
    ligands: &[Ligand],
    agencies: &AgencySelection,
) -> Result<Vec<LigandApproval>, SourceError> {
    let patterns = agencies
        .agencies()
        .iter()
        .map(|&agency| AgencyPatterns::new(agency))
        .collect::<Result<Vec<_>, _>>()?;

    let mut approvals = Vec::new();
    for ligand in ligands {
        let Some(source) = ligand.approval_source.as_deref().filter(|s| !s.trim().is_empty())
        else {
            continue;
        };
        for agency in &patterns {
            if let Some(year) = agency.year_in(source) {
                approvals.push(LigandApproval {
                    ligand_id: ligand.ligand_id,
                    name: ligand.name.clone().unwrap_or_default(),
                    ligand_type: ligand.ligand_type.clone().unwrap_or_default(),
                    withdrawn: ligand.withdrawn,
                    who_essential: ligand.who_essential,
                    agency: agency.agency,
                    year,
                });
            }
        }
    }

    log::debug!(
        "{} of {} ligands have a matching approval",
        approvals.len(),
        ligands.len()
    );
    Ok(approvals)
}

/// Parses agency names given on the command line or in config.
///
/// # Errors
///
/// Returns [`SourceError::UnknownAgency`] for an unsupported name.
pub fn parse_agencies<S: AsRef<str>>(names: &[S]) -> Result<AgencySelection, SourceError> {
    if let [single] = names {
        return Ok(AgencySelection::from_str(single.as_ref())?);
    }
    Ok(AgencySelection::parse_names(names)?)
}

/// Fetches approved ligands from the Guide to Pharmacology.
#[derive(Debug, Clone)]
pub struct PharmacologyFetcher<F: DocumentFetcher> {
    fetcher: F,
    location: DataLocation,
    kinase_label: String,
    kinase_suffixes: Vec<String>,
}

impl<F: DocumentFetcher> PharmacologyFetcher<F> {
    /// Creates a fetcher reading the configured ligands endpoint.
    #[must_use]
    pub fn new(fetcher: F, config: &SourceConfig) -> Self {
        Self {
            fetcher,
            location: DataLocation::Url(config.ligands_url.clone()),
            kinase_label: config.kinase_label.clone(),
            kinase_suffixes: config.kinase_suffixes.clone(),
        }
    }

    /// Reads the ligands from `location` instead (e.g. a saved JSON file).
    #[must_use]
    pub fn with_location(mut self, location: DataLocation) -> Self {
        self.location = location;
        self
    }

    /// Downloads (or reads) and parses the ligand list.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the data cannot be read or is not a JSON
    /// array of ligands.
    pub async fn ligands(
        &self,
        progress: &dyn ProgressCallback,
    ) -> Result<Vec<Ligand>, SourceError> {
        progress.set_message("Downloading data from Guide to Pharmacology".to_owned());
        let bytes = self.location.read(&self.fetcher, progress).await?;
        let ligands: Vec<Ligand> = serde_json::from_slice(&bytes)?;
        log::info!("Loaded {} ligands from {}", ligands.len(), self.location);
        Ok(ligands)
    }

    /// Fetches the ligands and extracts approvals for `agencies`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the ligands cannot be loaded.
    pub async fn approvals(
        &self,
        agencies: &AgencySelection,
        progress: &dyn ProgressCallback,
    ) -> Result<Vec<LigandApproval>, SourceError> {
        let ligands = self.ligands(progress).await?;
        extract_approvals(&ligands, agencies)
    }

    /// Relabels the type of ligands whose name ends with a kinase
    /// inhibitor suffix. Returns how many were relabelled.
    pub fn label_kinases(&self, approvals: &mut [LigandApproval]) -> usize {
        let mut relabelled = 0;
        for approval in approvals {
            let name = approval.name.to_lowercase();
            if self
                .kinase_suffixes
                .iter()
                .any(|suffix| name.ends_with(&suffix.to_lowercase()))
            {
                approval.ligand_type.clone_from(&self.kinase_label);
                relabelled += 1;
            }
        }
        relabelled
    }
}
