// Constants: device limits, formula coefficients and the fixed layout shape.

use crate::types::{Celsius, MmHg};

// Oxygen content: 1.34 mL O2 per g Hb at full saturation, 0.003 mL O2/dL per mmHg dissolved
pub const HB_OXYGEN_CAPACITY: f64 = 1.34;
pub const DISSOLVED_OXYGEN_COEFFICIENT: f64 = 0.003;

// Rolling history
pub const HISTORY_CAPACITY: usize = 20;

// Setpoint limits
pub const PRESSURE_MIN: MmHg = 50;
pub const PRESSURE_MAX: MmHg = 200;
pub const PRESSURE_DEFAULT: MmHg = 100;
pub const TEMPERATURE_MIN: Celsius = 30;
pub const TEMPERATURE_MAX: Celsius = 45;
pub const TEMPERATURE_DEFAULT: Celsius = 37;
pub const SETPOINT_STEP: i64 = 1;

// Status bands (inclusive)
pub const TEMPERATURE_NORMAL_LOW: Celsius = 35;
pub const TEMPERATURE_NORMAL_HIGH: Celsius = 38;
pub const PRESSURE_NORMAL_LOW: MmHg = 70;
pub const PRESSURE_NORMAL_HIGH: MmHg = 100;
pub const PRESSURE_WARNING_LOW: MmHg = 60;

// Simulated battery readout (%)
pub const BATTERY_LEVEL_PERCENT: u8 = 85;

// Fixed hematocrit panel value (%)
pub const HEMATOCRIT_PERCENT: u8 = 36;

// Layout import grid
pub const LAYOUT_ROWS: usize = 7;
pub const LAYOUT_COLS: usize = 6;
pub const LAYOUT_CELLS: usize = LAYOUT_ROWS * LAYOUT_COLS;

// History export
pub const EXPORT_SHEET_NAME: &str = "Oxygen Metrics";
pub const EXPORT_HEADERS: [&str; 4] = [
    "Time",
    "VO2ren (mL/min)",
    "AOC (mL O2/dL)",
    "RVOC (mL O2/dL)",
];
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// Built-in layout used when no file has been uploaded (demo/simulation only).
/// Rows follow the import wire order: each row holds min/max for tiers high, medium, low.
pub const DEMO_LAYOUT_GRID: [[f64; LAYOUT_COLS]; LAYOUT_ROWS] = [
    // arterial hemoglobin (g/dL)
    [13.0, 15.0, 11.0, 16.5, 9.0, 18.0],
    // venous hemoglobin (g/dL)
    [12.5, 14.5, 10.5, 16.0, 8.5, 17.5],
    // arterial saturation (%)
    [96.0, 99.0, 92.0, 100.0, 85.0, 100.0],
    // venous saturation (%)
    [70.0, 80.0, 62.0, 85.0, 50.0, 90.0],
    // arterial partial pressure (mmHg)
    [85.0, 100.0, 75.0, 110.0, 60.0, 130.0],
    // venous partial pressure (mmHg)
    [38.0, 45.0, 32.0, 50.0, 25.0, 60.0],
    // flow rate (mL/min)
    [380.0, 420.0, 330.0, 470.0, 250.0, 550.0],
];
