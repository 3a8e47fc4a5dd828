//! Knobs controlling how raw tables are normalized.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Column holding the application number in FDA approval tables.
pub const APPLICATION_NUMBER: &str = "APPLICATION NUMBER";

/// Column holding the approval date once aliases are applied.
pub const APPROVAL_DATE: &str = "APPROVAL DATE";

/// Options for [`normalize`](crate::normalize).
///
/// Label-valued options are compared after header canonicalization, so
/// `"Application Number"` and `"APPLICATION  NUMBER"` both match
/// [`APPLICATION_NUMBER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Drop the first page-table before looking for a header. PDF reports
    /// put a title block there; HTML extractions have no such page.
    pub discard_first_page: bool,
    /// Column checked for section-header sentinel values.
    pub sentinel_column: String,
    /// Values that mark a row as a repeated section header rather than
    /// data (e.g. `BLA NUMBER` between the NDA and BLA sections).
    pub sentinel_values: Vec<String>,
    /// Fail the grid strategy when the header lacks `sentinel_column`, so a
    /// report whose layout moved on falls through to the next strategy.
    pub require_sentinel_column: bool,
    /// Header label renames applied after canonicalization.
    pub header_aliases: BTreeMap<String, String>,
    /// Columns removed from the output.
    pub drop_columns: Vec<String>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            discard_first_page: true,
            sentinel_column: APPLICATION_NUMBER.to_owned(),
            sentinel_values: vec!["BLA NUMBER".to_owned()],
            require_sentinel_column: true,
            header_aliases: BTreeMap::from([("DATE".to_owned(), APPROVAL_DATE.to_owned())]),
            drop_columns: Vec::new(),
        }
    }
}

impl NormalizeOptions {
    /// Options for tables scraped from HTML pages: no cover page, no
    /// required application-number column, and the row-number column is
    /// dropped.
    #[must_use]
    pub fn for_html() -> Self {
        Self {
            discard_first_page: false,
            require_sentinel_column: false,
            drop_columns: vec!["NO.".to_owned()],
            ..Self::default()
        }
    }

    /// Sets whether the first page-table is discarded.
    #[must_use]
    pub const fn with_discard_first_page(mut self, discard: bool) -> Self {
        self.discard_first_page = discard;
        self
    }

    /// Sets whether the grid strategy needs the sentinel column.
    #[must_use]
    pub const fn with_required_sentinel_column(mut self, required: bool) -> Self {
        self.require_sentinel_column = required;
        self
    }
}
