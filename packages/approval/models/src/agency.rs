//! Regulatory agencies and species selectors validated at the boundary.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// An agency whose approvals appear in Guide to Pharmacology
/// `approvalSource` text (e.g. `"FDA (2001), EMA (2003)"`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Agency {
    /// U.S. Food and Drug Administration
    #[serde(rename = "FDA")]
    #[strum(to_string = "FDA")]
    Fda,
    /// European Medicines Agency
    #[serde(rename = "EMA")]
    #[strum(to_string = "EMA")]
    Ema,
    /// UK Medicines and Healthcare products Regulatory Agency
    #[serde(rename = "UK")]
    #[strum(to_string = "UK")]
    Uk,
    /// Japanese Pharmaceuticals and Medical Devices Agency
    #[serde(rename = "Japan")]
    #[strum(to_string = "Japan")]
    Japan,
    /// Health Canada
    #[serde(rename = "Health Canada")]
    #[strum(to_string = "Health Canada", serialize = "health_canada", serialize = "canada")]
    HealthCanada,
    /// China National Medical Products Administration
    #[serde(rename = "China")]
    #[strum(to_string = "China")]
    China,
}

impl Agency {
    /// The label as it appears in `approvalSource` text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fda => "FDA",
            Self::Ema => "EMA",
            Self::Uk => "UK",
            Self::Japan => "Japan",
            Self::HealthCanada => "Health Canada",
            Self::China => "China",
        }
    }
}

/// Error returned when an agency name is not one of [`Agency`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAgencyError {
    /// The name that failed to parse.
    pub name: String,
}

impl std::fmt::Display for UnknownAgencyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown agency '{}'", self.name)
    }
}

impl std::error::Error for UnknownAgencyError {}

/// One agency or a collection of agencies to extract approvals for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgencySelection {
    /// A single agency.
    One(Agency),
    /// Several agencies, extracted in the given order.
    Many(Vec<Agency>),
}

impl AgencySelection {
    /// Parses a list of agency names.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownAgencyError`] for the first name that is not a
    /// supported agency, or for an empty list.
    pub fn parse_names<S: AsRef<str>>(names: &[S]) -> Result<Self, UnknownAgencyError> {
        let agencies = names
            .iter()
            .map(|name| {
                let name = name.as_ref().trim();
                Agency::from_str(name).map_err(|_| UnknownAgencyError {
                    name: name.to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        match agencies.as_slice() {
            [] => Err(UnknownAgencyError {
                name: String::new(),
            }),
            [one] => Ok(Self::One(*one)),
            _ => Ok(Self::Many(agencies)),
        }
    }

    /// The selected agencies.
    #[must_use]
    pub fn agencies(&self) -> &[Agency] {
        match self {
            Self::One(agency) => std::slice::from_ref(agency),
            Self::Many(agencies) => agencies,
        }
    }
}

impl Default for AgencySelection {
    fn default() -> Self {
        Self::One(Agency::Fda)
    }
}

impl FromStr for AgencySelection {
    type Err = UnknownAgencyError;

    /// Parses a comma-separated list such as `"fda,ema"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let names: Vec<&str> = s.split(',').filter(|n| !n.trim().is_empty()).collect();
        Self::parse_names(&names)
    }
}

/// Species filter for target database links.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Species {
    /// Homo sapiens
    Human,
    /// Mus musculus
    Mouse,
    /// Rattus norvegicus
    Rat,
    /// Any of the above
    All,
}

impl Species {
    /// Whether a `species` field value is selected by this filter.
    #[must_use]
    pub fn matches(self, species: &str) -> bool {
        match self {
            Self::All => ["Human", "Mouse", "Rat"]
                .iter()
                .any(|s| s.eq_ignore_ascii_case(species)),
            _ => self.as_ref().eq_ignore_ascii_case(species),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_agencies_case_insensitively() {
        assert_eq!(Agency::from_str("fda").unwrap(), Agency::Fda);
        assert_eq!(Agency::from_str("Ema").unwrap(), Agency::Ema);
        assert_eq!(
            Agency::from_str("health canada").unwrap(),
            Agency::HealthCanada
        );
        assert_eq!(Agency::HealthCanada.to_string(), "Health Canada");
    }

    #[test]
    fn single_name_is_one() {
        let selection: AgencySelection = "fda".parse().unwrap();
        assert_eq!(selection, AgencySelection::One(Agency::Fda));
        assert_eq!(selection.agencies(), [Agency::Fda]);
    }

    #[test]
    fn list_is_many() {
        let selection: AgencySelection = "FDA, ema,uk".parse().unwrap();
        assert_eq!(
            selection.agencies(),
            [Agency::Fda, Agency::Ema, Agency::Uk]
        );
    }

    #[test]
    fn rejects_unknown_agency() {
        let err = "fda,moon".parse::<AgencySelection>().unwrap_err();
        assert_eq!(err.name, "moon");
        assert!("".parse::<AgencySelection>().is_err());
    }

    #[test]
    fn species_all_matches_supported_species() {
        assert!(Species::All.matches("Rat"));
        assert!(!Species::All.matches("Zebrafish"));
        assert!(Species::Human.matches("human"));
        assert!(!Species::Human.matches("Mouse"));
        assert_eq!("mouse".parse::<Species>().unwrap(), Species::Mouse);
    }
}
