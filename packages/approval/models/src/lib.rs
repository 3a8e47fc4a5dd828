#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the drug approval toolkit.
//!
//! Every stage of the pipeline speaks in terms of these types: table
//! extraction primitives produce a [`RawExtraction`], the normalizer turns
//! it into a [`NormalizedTable`], and the yearly aggregator concatenates
//! those into an [`AggregatedTable`]. Link discovery produces
//! [`YearLinks`].
//!
//! The API-backed sources (Guide to Pharmacology, openFDA) produce the
//! record types in [`records`].

pub mod agency;
pub mod records;
pub mod table;

pub use agency::{Agency, AgencySelection, Species, UnknownAgencyError};
pub use records::{DatabaseLink, LigandApproval, SubmissionRecord};
pub use table::{
    AggregatedRow, AggregatedTable, NormalizedTable, PageTable, RawExtraction, Row, YearFailure,
    is_missing,
};

use serde::{Deserialize, Serialize};

/// A resource URL for a single year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearLink {
    /// Four-digit year the resource covers.
    pub year: i32,
    /// Absolute URL of the resource.
    pub url: String,
}

/// An ordered year → URL mapping.
///
/// Iteration follows insertion order and a year appears at most once.
/// [`insert`](Self::insert) keeps the first URL for a year;
/// [`insert_or_replace`](Self::insert_or_replace) keeps the latest one in
/// the year's original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearLinks {
    links: Vec<YearLink>,
}

impl YearLinks {
    /// Creates an empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self { links: Vec::new() }
    }

    /// Records `url` for `year` unless the year is already present.
    ///
    /// Returns `true` if the link was added.
    pub fn insert(&mut self, year: i32, url: impl Into<String>) -> bool {
        if self.get(year).is_some() {
            return false;
        }
        self.links.push(YearLink {
            year,
            url: url.into(),
        });
        true
    }

    /// Records `url` for `year`, replacing any URL already recorded. The
    /// year keeps its original position.
    ///
    /// Returns the replaced URL.
    pub fn insert_or_replace(&mut self, year: i32, url: impl Into<String>) -> Option<String> {
        let url = url.into();
        if let Some(link) = self.links.iter_mut().find(|link| link.year == year) {
            return Some(std::mem::replace(&mut link.url, url));
        }
        self.links.push(YearLink { year, url });
        None
    }

    /// Returns the URL recorded for `year`.
    #[must_use]
    pub fn get(&self, year: i32) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.year == year)
            .map(|link| link.url.as_str())
    }

    /// Iterates links in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, YearLink> {
        self.links.iter()
    }

    /// Returns the years in insertion order.
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        self.links.iter().map(|link| link.year).collect()
    }

    /// Returns a copy ordered by ascending year.
    #[must_use]
    pub fn sorted(&self) -> Self {
        let mut links = self.links.clone();
        links.sort_by_key(|link| link.year);
        Self { links }
    }

    /// Number of years in the mapping.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the mapping has no links.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(i32, S)> for YearLinks {
    fn from_iter<T: IntoIterator<Item = (i32, S)>>(iter: T) -> Self {
        let mut links = Self::new();
        for (year, url) in iter {
            links.insert(year, url);
        }
        links
    }
}

impl<'a> IntoIterator for &'a YearLinks {
    type Item = &'a YearLink;
    type IntoIter = std::slice::Iter<'a, YearLink>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_link_per_year_wins() {
        let mut links = YearLinks::new();
        assert!(links.insert(2023, "https://a.example/2023"));
        assert!(!links.insert(2023, "https://b.example/2023"));
        assert_eq!(links.get(2023), Some("https://a.example/2023"));
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn replacing_keeps_position_of_year() {
        let mut links: YearLinks = vec![(2019, "old"), (2020, "x")].into_iter().collect();
        assert_eq!(links.insert_or_replace(2019, "new"), Some("old".to_owned()));
        assert_eq!(links.insert_or_replace(2021, "y"), None);
        assert_eq!(links.years(), vec![2019, 2020, 2021]);
        assert_eq!(links.get(2019), Some("new"));
    }

    #[test]
    fn preserves_insertion_order() {
        let links: YearLinks = vec![(2023, "c"), (2021, "a"), (2022, "b")]
            .into_iter()
            .collect();
        assert_eq!(links.years(), vec![2023, 2021, 2022]);
        assert_eq!(links.sorted().years(), vec![2021, 2022, 2023]);
    }
}
