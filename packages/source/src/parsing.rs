//! Shared parsing utilities for approval sources.

use chrono::NaiveDate;

/// Format of approval dates in FDA reports and pages.
pub const APPROVAL_DATE_FORMAT: &str = "%m/%d/%Y";

/// Parses an approval date after removing all whitespace, which PDF
/// extraction tends to scatter inside dates (`"01/ 15/2020"`).
#[must_use]
pub fn parse_approval_date(s: &str, format: &str) -> Option<NaiveDate> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(&compact, format).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_approval_date_with_stray_whitespace() {
        let date = parse_approval_date(" 01/ 15/\r2020 ", APPROVAL_DATE_FORMAT).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 1, 15).unwrap());
    }

    #[test]
    fn rejects_invalid_approval_date() {
        assert!(parse_approval_date("pending", APPROVAL_DATE_FORMAT).is_none());
        assert!(parse_approval_date("  ", APPROVAL_DATE_FORMAT).is_none());
    }
}
