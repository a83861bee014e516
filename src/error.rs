// Errors: every failure is scoped to the command that raised it.

use crate::constants::{LAYOUT_COLS, LAYOUT_ROWS};

/// Errors raised by session commands, layout loading and spreadsheet I/O.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Import grid is not 7 rows × 6 columns
    #[error(
        "Layout must be {want_rows} rows × {want_cols} columns, found {rows} rows × {cols} columns",
        want_rows = LAYOUT_ROWS,
        want_cols = LAYOUT_COLS
    )]
    Shape { rows: usize, cols: usize },

    /// Import grid has 7 rows but one of them is not 6 cells wide (`row` is 1-based)
    #[error(
        "Layout must be {want_rows} rows × {want_cols} columns, found ragged rows: row {row} has {cols} columns",
        want_rows = LAYOUT_ROWS,
        want_cols = LAYOUT_COLS
    )]
    RaggedShape { row: usize, cols: usize },

    /// Label absent from the layout table
    #[error("Layout label not found: {0}")]
    KeyNotFound(String),

    /// Cell or timestamp that cannot be parsed
    #[error("Import parse error: {0}")]
    ImportParse(String),

    /// CSV reading/writing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error reading or writing a spreadsheet
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Metrics requested before any layout was imported
    #[error("No layout loaded; import a layout spreadsheet first")]
    LayoutNotLoaded,

    /// Metrics requested while the emergency stop is latched
    #[error("Emergency stop active; resume before generating metrics")]
    EmergencyStop,
}

pub type Result<T> = std::result::Result<T, MonitorError>;
