#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Grouping and text charts for approval data.
//!
//! Anything implementing [`Keyed`] can be counted per year
//! ([`group::count_by_year`]), per category ([`group::count_by_column`]),
//! pivoted into a year × category grid ([`group::pivot`]) and turned into
//! percentage shares ([`group::shares`]). [`chart`] renders those results
//! as plain-text bar, stacked-bar and donut-legend charts.

pub mod chart;
pub mod group;

use drug_nme_approval_models::{AggregatedRow, AggregatedTable, LigandApproval, SubmissionRecord};

/// Category used when a row has no value for the grouping key.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// A row that has a year and named fields to group by.
pub trait Keyed {
    /// The year the row is counted under, if it has one.
    fn year(&self) -> Option<i32>;

    /// The value of field `key`, or `None` if the row has no such field or
    /// the value is missing.
    fn key(&self, key: &str) -> Option<String>;
}

impl<T: Keyed + ?Sized> Keyed for &T {
    fn year(&self) -> Option<i32> {
        (**self).year()
    }

    fn key(&self, key: &str) -> Option<String> {
        (**self).key(key)
    }
}

/// Field names accepted by [`LigandApproval`]'s [`Keyed::key`], matching
/// its serialized column names.
pub const LIGAND_KEYS: [&str; 5] = ["type", "agency", "name", "withdrawn", "whoEssential"];

impl Keyed for LigandApproval {
    fn year(&self) -> Option<i32> {
        Some(self.year)
    }

    fn key(&self, key: &str) -> Option<String> {
        match key {
            "type" => Some(self.ligand_type.clone()),
            "agency" => Some(self.agency.to_string()),
            "name" => Some(self.name.clone()),
            "withdrawn" => self.withdrawn.map(|b| b.to_string()),
            "whoEssential" => self.who_essential.map(|b| b.to_string()),
            _ => None,
        }
        .filter(|v| !v.trim().is_empty())
    }
}

impl Keyed for SubmissionRecord {
    /// Year of the submission status date (`YYYYMMDD`).
    fn year(&self) -> Option<i32> {
        self.submission_status_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }

    fn key(&self, key: &str) -> Option<String> {
        let value = match key {
            "application_number" => Some(&self.application_number),
            "sponsor_name" => self.sponsor_name.as_ref(),
            "active_ingredient" => self.active_ingredient.as_ref(),
            "brand_name" => self.brand_name.as_ref(),
            "submission_type" => self.submission_type.as_ref(),
            "submission_status" => self.submission_status.as_ref(),
            "review_priority" => self.review_priority.as_ref(),
            "submission_class_code" => self.submission_class_code.as_ref(),
            "submission_class_code_description" => self.submission_class_code_description.as_ref(),
            _ => None,
        };
        value.filter(|v| !v.trim().is_empty()).cloned()
    }
}

/// A row of an [`AggregatedTable`] together with the table's columns.
#[derive(Debug, Clone, Copy)]
pub struct TableRow<'a> {
    table: &'a AggregatedTable,
    row: &'a AggregatedRow,
}

impl Keyed for TableRow<'_> {
    /// The year of the report the row came from.
    fn year(&self) -> Option<i32> {
        Some(self.row.year)
    }

    fn key(&self, key: &str) -> Option<String> {
        let col = self.table.column_index(key)?;
        self.row
            .cell(col)
            .filter(|v| !v.trim().is_empty())
            .map(str::to_owned)
    }
}

/// Iterates `table`'s rows as [`Keyed`] rows keyed by column name.
pub fn table_rows(table: &AggregatedTable) -> impl Iterator<Item = TableRow<'_>> {
    table.rows().iter().map(move |row| TableRow { table, row })
}

#[cfg(test)]
mod tests {
    use drug_nme_approval_models::{Agency, NormalizedTable};

    use super::*;

    #[test]
    fn submission_year_comes_from_status_date() {
        let record = SubmissionRecord {
            submission_status_date: Some("20190412".to_owned()),
            review_priority: Some("PRIORITY".to_owned()),
            sponsor_name: Some("  ".to_owned()),
            ..SubmissionRecord::default()
        };
        assert_eq!(record.year(), Some(2019));
        assert_eq!(record.key("review_priority").as_deref(), Some("PRIORITY"));
        assert_eq!(record.key("sponsor_name"), None);
        assert_eq!(SubmissionRecord::default().year(), None);
    }

    #[test]
    fn ligand_keys_use_serialized_names() {
        let ligand = LigandApproval {
            ligand_id: Some(1),
            name: "imatinib".to_owned(),
            ligand_type: "Kinase".to_owned(),
            withdrawn: None,
            who_essential: Some(true),
            agency: Agency::HealthCanada,
            year: 2001,
        };
        assert_eq!(ligand.key("type").as_deref(), Some("Kinase"));
        assert_eq!(ligand.key("agency").as_deref(), Some("Health Canada"));
        assert_eq!(ligand.key("whoEssential").as_deref(), Some("true"));
        assert_eq!(ligand.key("withdrawn"), None);
        assert_eq!(ligand.key("colour"), None);
    }

    #[test]
    fn table_rows_are_keyed_by_column() {
        let mut table = AggregatedTable::new();
        table.append(
            2021,
            &NormalizedTable::new(
                vec!["DRUG NAME".to_owned(), "REVIEW".to_owned()],
                vec![vec!["Drugalin".to_owned(), String::new()]],
            ),
        );
        let rows: Vec<TableRow<'_>> = table_rows(&table).collect();
        assert_eq!(rows[0].year(), Some(2021));
        assert_eq!(rows[0].key("DRUG NAME").as_deref(), Some("Drugalin"));
        assert_eq!(rows[0].key("REVIEW"), None);
        assert_eq!(rows[0].key("MISSING"), None);
    }
}
