//! CSV output to stdout or a file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use drug_nme_approval_models::{AggregatedTable, NormalizedTable, YearLinks};
use drug_nme_source::parsing::APPROVAL_DATE_FORMAT;
use serde::Serialize;

/// Column holding the report year in aggregated output.
pub const YEAR_COLUMN: &str = "YEAR";

/// Opens a CSV writer on `path`, or stdout when there is none.
///
/// # Errors
///
/// Returns an error if the file cannot be created.
pub fn writer(path: Option<&Path>) -> io::Result<csv::Writer<Box<dyn Write>>> {
    let sink: Box<dyn Write> = match path {
        Some(path) => {
            log::info!("Writing {}", path.display());
            Box::new(BufWriter::new(File::create(path)?))
        }
        None => Box::new(io::stdout()),
    };
    Ok(csv::Writer::from_writer(sink))
}

/// Writes `(year, url)` rows.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_links<W: Write>(out: &mut csv::Writer<W>, links: &YearLinks) -> csv::Result<()> {
    out.write_record(["year", "url"])?;
    for link in links {
        out.write_record([link.year.to_string().as_str(), link.url.as_str()])?;
    }
    out.flush()?;
    Ok(())
}

/// Writes a normalized table with its header.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_table<W: Write>(out: &mut csv::Writer<W>, table: &NormalizedTable) -> csv::Result<()> {
    out.write_record(table.header())?;
    for row in table.rows() {
        out.write_record(row)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes an aggregated table with a leading [`YEAR_COLUMN`].
///
/// The `date_column` cells are replaced by the parsed approval date
/// (`MM/DD/YYYY`), or left empty when the date could not be parsed.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_aggregated<W: Write>(
    out: &mut csv::Writer<W>,
    table: &AggregatedTable,
    date_column: &str,
) -> csv::Result<()> {
    let date_col = table.column_index(date_column);

    let mut header = vec![YEAR_COLUMN];
    header.extend(table.columns().iter().map(String::as_str));
    out.write_record(&header)?;

    for row in table.rows() {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.year.to_string());
        for col in 0..table.columns().len() {
            let cell = if Some(col) == date_col {
                row.approval_date
                    .map(|d| d.format(APPROVAL_DATE_FORMAT).to_string())
                    .unwrap_or_default()
            } else {
                row.cell(col).unwrap_or_default().to_owned()
            };
            record.push(cell);
        }
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes serializable records, one per row, with a header taken from
/// the field names.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_records<W: Write, T: Serialize>(
    out: &mut csv::Writer<W>,
    records: &[T],
) -> csv::Result<()> {
    for record in records {
        out.serialize(record)?;
    }
    out.flush()?;
    Ok(())
}
