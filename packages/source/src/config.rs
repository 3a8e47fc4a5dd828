//! Endpoint and extraction settings.
//!
//! [`SourceConfig::default`] carries the public endpoints. An override file
//! in the same shape as the embedded [`DEFAULT_CONFIG_TOML`] can replace any
//! subset of the values.

use std::collections::BTreeMap;
use std::path::Path;

use drug_nme_normalize::NormalizeOptions;
use drug_nme_scraper::links::{DEFAULT_YEAR_PATTERN, LinkQuery};
use serde::Deserialize;

use crate::SourceError;

/// The documented defaults, embedded at compile time.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

/// Settings shared by every source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Listing page linking one NME approvals PDF per year.
    pub nme_listing_url: String,
    /// Page linking the CSV compilation.
    pub compilation_page_url: String,
    /// Title of the compilation CSV link.
    pub compilation_link_title: String,
    /// Page linking the yearly novel approval pages.
    pub novel_listing_url: String,
    /// Title prefix of a yearly novel approval link; the year is appended.
    pub novel_link_title: String,
    /// Yearly novel approval page URL with a `{year}` placeholder.
    pub novel_year_template: String,
    /// Regex pulling the year out of a link title.
    pub year_pattern: String,
    /// `chrono` format of approval dates.
    pub date_format: String,
    /// Concurrent downloads for multi-year runs. `1` runs years in order.
    pub max_in_flight: usize,
    /// Guide to Pharmacology approved-ligands endpoint.
    pub ligands_url: String,
    /// Guide to Pharmacology targets endpoint.
    pub targets_url: String,
    /// openFDA drugsfda bulk download.
    pub openfda_url: String,
    /// Ligand type assigned to kinase inhibitors.
    pub kinase_label: String,
    /// Name endings identifying kinase inhibitors.
    pub kinase_suffixes: Vec<String>,
    /// Extra HTTP headers sent with every request.
    pub headers: BTreeMap<String, String>,
    /// Normalization of the yearly PDF reports.
    pub normalize: NormalizeOptions,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            nme_listing_url: "https://www.fda.gov/drugs/nda-and-bla-approvals/new-molecular-entity-nme-drug-and-new-biologic-approvals".to_owned(),
            compilation_page_url: "https://www.fda.gov/drugs/drug-approvals-and-databases/compilation-cder-new-molecular-entity-nme-drug-and-new-biologic-approvals".to_owned(),
            compilation_link_title: "Compilation Of CDER NME And New Biologic Approvals".to_owned(),
            novel_listing_url: "https://www.fda.gov/drugs/development-approval-process-drugs/novel-drug-approvals-fda".to_owned(),
            novel_link_title: "Novel Drug Approvals for".to_owned(),
            novel_year_template: "https://www.fda.gov/drugs/new-drugs-fda-cders-new-molecular-entities-and-new-therapeutic-biological-products/novel-drug-approvals-{year}".to_owned(),
            year_pattern: DEFAULT_YEAR_PATTERN.to_owned(),
            date_format: "%m/%d/%Y".to_owned(),
            max_in_flight: 1,
            ligands_url: "https://www.guidetopharmacology.org/services/ligands?type=Approved".to_owned(),
            targets_url: "https://www.guidetopharmacology.org/services/targets".to_owned(),
            openfda_url: "https://download.open.fda.gov/drug/drugsfda/drug-drugsfda-0001-of-0001.json.zip".to_owned(),
            kinase_label: "Kinase".to_owned(),
            kinase_suffixes: [
                "nib",
                "tib",
                "lib",
                "belumosudil",
                "sirolimus",
                "everolimus",
                "midostaurin",
                "netarsudil",
            ]
            .map(String::from)
            .to_vec(),
            headers: BTreeMap::new(),
            normalize: NormalizeOptions::default(),
        }
    }
}

impl SourceConfig {
    /// Parses a config from TOML. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if the TOML is malformed.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, SourceError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Io`] if the file cannot be read, or
    /// [`SourceError::Config`] if it is malformed.
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// The link query for yearly report listings.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Regex`] if `year_pattern` does not compile.
    pub fn year_query(&self) -> Result<LinkQuery, SourceError> {
        Ok(LinkQuery::with_pattern(&self.year_pattern)?)
    }
}
