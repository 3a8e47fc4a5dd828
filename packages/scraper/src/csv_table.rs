//! CSV parsing into a page table.
//!
//! The header row is kept as the first row of the page so that the
//! normalizer can canonicalize it like any other extracted header.

use drug_nme_approval_models::PageTable;

use crate::ScrapeError;

/// Parses CSV `bytes` into a single page, header row included.
///
/// Records may have differing field counts. A UTF-8 byte-order mark at
/// the start of the file is stripped.
///
/// # Errors
///
/// Returns [`ScrapeError::Csv`] on malformed CSV, or
/// [`ScrapeError::Parse`] if the file holds no rows at all.
pub fn parse(bytes: &[u8], delimiter: u8) -> Result<PageTable, ScrapeError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(|field| field.trim().to_owned()).collect());
    }

    if rows.is_empty() {
        return Err(ScrapeError::Parse("CSV file contains no rows".to_owned()));
    }

    log::debug!("Parsed {} CSV rows", rows.len());
    Ok(PageTable::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_header_as_first_row() {
        let page = parse(b"NDA,Name\n021436,Drugalin\n", b',').unwrap();
        assert_eq!(page.rows, vec![vec!["NDA", "Name"], vec!["021436", "Drugalin"]]);
    }

    #[test]
    fn strips_bom_and_tolerates_ragged_rows() {
        let page = parse(b"\xEF\xBB\xBFa,b,c\n1,2\n", b',').unwrap();
        assert_eq!(page.rows[0][0], "a");
        assert_eq!(page.rows[1].len(), 2);
    }

    #[test]
    fn rejects_empty_file() {
        assert!(matches!(parse(b"", b','), Err(ScrapeError::Parse(_))));
    }
}
