//! Records produced by the API-backed sources.

use serde::{Deserialize, Serialize};

use crate::Agency;

/// An approved ligand from Guide to Pharmacology with one agency approval.
///
/// A ligand approved by several selected agencies yields one record per
/// agency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LigandApproval {
    /// Guide to Pharmacology ligand identifier.
    pub ligand_id: Option<i64>,
    /// Ligand name (e.g. `"imatinib"`).
    pub name: String,
    /// Ligand type (e.g. `"Synthetic organic"`, or a relabel such as
    /// `"Kinase"`).
    #[serde(rename = "type")]
    pub ligand_type: String,
    /// Whether the ligand has been withdrawn.
    pub withdrawn: Option<bool>,
    /// Whether the ligand is on the WHO essential medicines list.
    pub who_essential: Option<bool>,
    /// Agency whose approval this record describes.
    pub agency: Agency,
    /// Year of that agency's approval.
    pub year: i32,
}

/// One submission of an NDA/BLA application from the openFDA `drugsfda`
/// dataset, flattened across products and active ingredients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Application number (e.g. `"NDA021436"`).
    pub application_number: String,
    /// Sponsor name.
    pub sponsor_name: Option<String>,
    /// Active ingredient name.
    pub active_ingredient: Option<String>,
    /// Product brand name.
    pub brand_name: Option<String>,
    /// Submission type (`"ORIG"`, `"SUPPL"`).
    pub submission_type: Option<String>,
    /// Submission number.
    pub submission_number: Option<String>,
    /// Submission status (`"AP"` for approved).
    pub submission_status: Option<String>,
    /// Status date as `YYYYMMDD`.
    pub submission_status_date: Option<String>,
    /// Review priority (`"STANDARD"`, `"PRIORITY"`).
    pub review_priority: Option<String>,
    /// Submission class code (e.g. `"TYPE 1"`).
    pub submission_class_code: Option<String>,
    /// Submission class description (e.g. `"New Molecular Entity"`).
    pub submission_class_code_description: Option<String>,
}

/// A database cross-reference for a Guide to Pharmacology target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseLink {
    /// Guide to Pharmacology target identifier the link belongs to.
    #[serde(default)]
    pub target_id: i64,
    /// Accession in the external database.
    pub accession: String,
    /// External database name (e.g. `"UniProtKB"`).
    pub database: String,
    /// Species the accession refers to.
    pub species: String,
}
