// Spreadsheet I/O: history export (with parse-back) and layout grid import/export.
// Sheets are comma-separated; one sheet per file.

use std::fs;
use std::io::Read;
use std::path::Path;

use chrono::NaiveTime;
use log::{debug, info};

use crate::constants::*;
use crate::error::{MonitorError, Result};
use crate::layout::{check_shape, LayoutTable};
use crate::types::MetricRecord;

/// Default file name for a history export.
pub fn export_file_name() -> String {
    format!("{}.csv", EXPORT_SHEET_NAME)
}

/// Serialize history records (oldest first) under the fixed export header.
pub fn export_history(records: &[MetricRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADERS)?;
    for record in records {
        writer.write_record([
            record.timestamp.clone(),
            record.consumption.to_string(),
            record.arterial_content.to_string(),
            record.venous_content.to_string(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| MonitorError::Io(e.into_error()))?;
    debug!("exported {} history rows ({} bytes)", records.len(), bytes.len());
    Ok(bytes)
}

/// Read back a history export produced by [`export_history`].
pub fn parse_history<R: Read>(reader: R) -> Result<Vec<MetricRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    if headers != EXPORT_HEADERS {
        return Err(MonitorError::ImportParse(format!(
            "unexpected header row: {}",
            headers.join(",")
        )));
    }

    let mut records = Vec::new();
    for (row, result) in csv_reader.records().enumerate() {
        let row = row + 1;
        let fields = result?;
        let timestamp = fields.get(0).unwrap_or_default();
        NaiveTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).map_err(|_| {
            MonitorError::ImportParse(format!("row {}: invalid time '{}'", row, timestamp))
        })?;
        records.push(MetricRecord {
            timestamp: timestamp.to_string(),
            consumption: parse_cell(fields.get(1), row, 1)?,
            arterial_content: parse_cell(fields.get(2), row, 2)?,
            venous_content: parse_cell(fields.get(3), row, 3)?,
        });
    }
    Ok(records)
}

/// Read a headerless layout sheet into a raw grid, validated as 7×6.
///
/// The shape is checked before any cell is interpreted, so a wrongly sized sheet
/// always reports [`MonitorError::Shape`] or [`MonitorError::RaggedShape`].
pub fn import_layout_grid<R: Read>(reader: R) -> Result<Vec<Vec<f64>>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut cells: Vec<Vec<String>> = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        cells.push(record.iter().map(str::to_string).collect());
    }
    check_shape(&cells)?;

    cells
        .iter()
        .enumerate()
        .map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(|(c, cell)| parse_cell(Some(cell.as_str()), r + 1, c))
                .collect::<Result<Vec<f64>>>()
        })
        .collect()
}

/// Import and load in one step. Leaves nothing behind on failure.
pub fn import_layout<R: Read>(reader: R) -> Result<LayoutTable> {
    let grid = import_layout_grid(reader)?;
    LayoutTable::load(&grid)
}

/// Write a layout table back as a headerless 7×6 sheet.
pub fn export_layout(table: &LayoutTable) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for row in table.to_grid()? {
        writer.write_record(row.iter().map(f64::to_string))?;
    }
    writer
        .into_inner()
        .map_err(|e| MonitorError::Io(e.into_error()))
}

pub fn read_layout_file<P: AsRef<Path>>(path: P) -> Result<LayoutTable> {
    let path = path.as_ref();
    let file = fs::File::open(path)?;
    let table = import_layout(std::io::BufReader::new(file))?;
    info!("layout imported from {}", path.display());
    Ok(table)
}

/// Write bytes through a sibling temp file and rename, so readers never see a partial sheet.
pub fn write_file_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".partial");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    info!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

fn parse_cell(cell: Option<&str>, row: usize, col: usize) -> Result<f64> {
    let raw = cell.unwrap_or_default();
    raw.parse::<f64>().map_err(|_| {
        MonitorError::ImportParse(format!(
            "row {}, column {}: '{}' is not a number",
            row,
            col + 1,
            raw
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout_labels;

    fn record(ts: &str, c: f64, a: f64, v: f64) -> MetricRecord {
        MetricRecord {
            timestamp: ts.to_string(),
            consumption: c,
            arterial_content: a,
            venous_content: v,
        }
    }

    fn grid_csv(rows: usize, cols: usize) -> String {
        let mut out = String::new();
        for r in 0..rows {
            let row: Vec<String> = (0..cols).map(|c| format!("{}", r * cols + c)).collect();
            out.push_str(&row.join(","));
            out.push('\n');
        }
        out
    }

    #[test]
    fn export_has_header_row() {
        let bytes = export_history(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "Time,VO2ren (mL/min),AOC (mL O2/dL),RVOC (mL O2/dL)\n");
    }

    #[test]
    fn export_then_parse_returns_the_records() {
        let records = vec![
            record("09:15:02", 2187.92, 18.6548, 13.185),
            record("09:15:07", -12.5, 13.0, 13.03125),
        ];
        let bytes = export_history(&records).unwrap();
        let parsed = parse_history(bytes.as_slice()).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn parse_rejects_bad_time() {
        let text = "Time,VO2ren (mL/min),AOC (mL O2/dL),RVOC (mL O2/dL)\nnoon,1,2,3\n";
        assert!(matches!(
            parse_history(text.as_bytes()),
            Err(MonitorError::ImportParse(_))
        ));
    }

    #[test]
    fn parse_rejects_foreign_header() {
        let text = "When,A,B,C\n10:00:00,1,2,3\n";
        assert!(matches!(
            parse_history(text.as_bytes()),
            Err(MonitorError::ImportParse(_))
        ));
    }

    #[test]
    fn import_valid_grid() {
        let grid = import_layout_grid(grid_csv(7, 6).as_bytes()).unwrap();
        assert_eq!(grid.len(), 7);
        assert_eq!(grid[6][5], 41.0);
    }

    #[test]
    fn import_wrong_shape_is_shape_error() {
        for (rows, cols) in [(6, 6), (8, 6), (7, 5)] {
            let err = import_layout_grid(grid_csv(rows, cols).as_bytes()).unwrap_err();
            match err {
                MonitorError::Shape { rows: r, cols: c } => assert_eq!((r, c), (rows, cols)),
                other => panic!("unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn shape_is_checked_before_cells() {
        let text = "a,b\nc,d\n";
        assert!(matches!(
            import_layout_grid(text.as_bytes()),
            Err(MonitorError::Shape { rows: 2, cols: 2 })
        ));
    }

    #[test]
    fn short_row_in_sheet_is_ragged_error() {
        let text = format!("{}1,2,3,4,5\n", "1,2,3,4,5,6\n".repeat(6));
        let err = import_layout_grid(text.as_bytes()).unwrap_err();
        assert!(matches!(err, MonitorError::RaggedShape { row: 7, cols: 5 }));
        assert_eq!(
            err.to_string(),
            "Layout must be 7 rows × 6 columns, found ragged rows: row 7 has 5 columns"
        );
    }

    #[test]
    fn non_numeric_cell_is_parse_error() {
        let mut text = grid_csv(7, 6);
        text = text.replacen("3", "x", 1);
        assert!(matches!(
            import_layout_grid(text.as_bytes()),
            Err(MonitorError::ImportParse(_))
        ));
    }

    #[test]
    fn layout_export_reimports_to_same_table() {
        let table = import_layout(grid_csv(7, 6).as_bytes()).unwrap();
        let bytes = export_layout(&table).unwrap();
        let again = import_layout(bytes.as_slice()).unwrap();
        assert_eq!(again, table);
        assert_eq!(again.get(&layout_labels()[41]).unwrap(), 41.0);
    }

    #[test]
    fn atomic_write_leaves_only_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(export_file_name());
        write_file_atomic(&path, b"Time\n").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"Time\n");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
