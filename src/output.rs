//! CSV output.

use crate::collector::Collection;
use crate::table::{HeaderSet, Row};
use crate::{Error, Result};
use csv::{Writer, WriterBuilder};
use std::io;
use std::path::Path;
use tracing::{info, warn};

/// Header columns that occur in some row, in header order, then every other
/// column in the order it was first seen.
pub fn column_order(headers: &HeaderSet, rows: &[Row]) -> Vec<String> {
    let present = |column: &str| rows.iter().any(|r| r.get(column).is_some());
    let mut columns: Vec<String> = headers
        .iter()
        .filter(|c| present(*c))
        .map(str::to_string)
        .collect();
    for row in rows {
        for column in row.columns() {
            if !headers.contains(column) && !columns.iter().any(|c| c == column) {
                columns.push(column.to_string());
            }
        }
    }
    columns
}

fn write_records<W: io::Write>(writer: &mut Writer<W>, collection: &Collection) -> Result<()> {
    let columns = column_order(&collection.headers, &collection.rows);
    writer.write_record(&columns)?;
    for row in &collection.rows {
        writer.write_record(columns.iter().map(|c| row.get(c).unwrap_or("")))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the collection to `path`. Nothing is written when there are no rows;
/// returns whether a file was written.
pub fn write_csv(path: &Path, collection: &Collection) -> Result<bool> {
    if collection.rows.is_empty() {
        warn!("No rows extracted; nothing to save.");
        return Ok(false);
    }
    let mut writer = WriterBuilder::new().from_path(path)?;
    write_records(&mut writer, collection)?;
    info!("Saved {} rows to {}", collection.rows.len(), path.display());
    Ok(true)
}

/// Render the collection as CSV text (header line included).
pub fn to_csv_string(collection: &Collection) -> Result<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::<u8>::new());
    write_records(&mut writer, collection)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::StopReason;
    use pretty_assertions::assert_eq;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn collection(headers: HeaderSet, rows: Vec<Vec<String>>) -> Collection {
        let rows = rows
            .into_iter()
            .map(|c| Row::from_cells(c, &headers))
            .collect();
        Collection {
            headers,
            rows,
            expected_total: None,
            stop: StopReason::NoProgress,
            iterations: 1,
            passes: 1,
        }
    }

    #[test]
    fn test_named_columns_then_extras() {
        let headers = HeaderSet::from_header_cells(["Rank", "Name", "Score"]);
        let c = collection(
            headers,
            vec![cells(&["1", "Alpha", "90"]), cells(&["3", "Gamma"])],
        );
        assert_eq!(
            column_order(&c.headers, &c.rows),
            vec!["Rank", "Name", "Score", "col_0", "col_1"]
        );
        assert_eq!(
            to_csv_string(&c).unwrap(),
            "Rank,Name,Score,col_0,col_1\n1,Alpha,90,,\n,,,3,Gamma\n"
        );
    }

    #[test]
    fn test_repeated_headers_keep_every_value() {
        let headers = HeaderSet::from_header_cells(["Name", "Score", "Score"]);
        let c = collection(headers, vec![cells(&["A", "90", "55"])]);
        assert_eq!(
            column_order(&c.headers, &c.rows),
            vec!["Name", "Score", "Score_2"]
        );
        assert_eq!(to_csv_string(&c).unwrap(), "Name,Score,Score_2\nA,90,55\n");
    }

    #[test]
    fn test_absent_header_columns_are_dropped() {
        let headers = HeaderSet::from_header_cells(["Rank", "Name", "Score"]);
        let c = collection(headers, vec![cells(&["only", "two"])]);
        assert_eq!(column_order(&c.headers, &c.rows), vec!["col_0", "col_1"]);
    }

    #[test]
    fn test_values_are_quoted() {
        let headers = HeaderSet::from_header_cells(["Name", "Location"]);
        let c = collection(headers, vec![cells(&["Oxford", "Oxford, United Kingdom"])]);
        assert_eq!(
            to_csv_string(&c).unwrap(),
            "Name,Location\nOxford,\"Oxford, United Kingdom\"\n"
        );
    }

    #[test]
    fn test_write_csv_skips_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let c = collection(HeaderSet::positional(2), vec![]);
        assert!(!write_csv(&path, &c).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_write_csv_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let headers = HeaderSet::from_header_cells(["Rank", "Name"]);
        let c = collection(headers, vec![cells(&["1", "Alpha"]), cells(&["2", "Beta"])]);
        assert!(write_csv(&path, &c).unwrap());
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Rank,Name\n1,Alpha\n2,Beta\n");
    }
}
