// Types: readings, derived records, setpoints, layout schema enums and session commands.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::Deserialize;

use crate::constants::*;

/// Pressure setpoint (mmHg)
pub type MmHg = i64;

/// Temperature setpoint (°C)
pub type Celsius = i64;

/// One side of a blood-gas draw. Values are passed through unchecked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloodGasReading {
    /// g/dL
    pub hemoglobin: f64,
    /// percent, 0..=100 expected
    pub saturation: f64,
    /// mmHg
    pub partial_pressure: f64,
}

/// Derived metrics of one sampling event.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    /// Wall-clock time of the sample, `HH:MM:SS`.
    pub timestamp: String,
    /// VO2ren, mL/min
    pub consumption: f64,
    /// AOC, mL O2/dL
    pub arterial_content: f64,
    /// RVOC, mL O2/dL
    pub venous_content: f64,
}

impl MetricRecord {
    pub fn average_content(&self) -> f64 {
        (self.arterial_content + self.venous_content) / 2.0
    }
}

/// User-adjustable perfusion setpoints. Always within their clamp bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setpoints {
    pressure: MmHg,
    temperature: Celsius,
}

impl Setpoints {
    /// Build setpoints, clamping both values into range.
    pub fn new(pressure: MmHg, temperature: Celsius) -> Self {
        Self {
            pressure: pressure.clamp(PRESSURE_MIN, PRESSURE_MAX),
            temperature: temperature.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX),
        }
    }

    pub fn pressure(&self) -> MmHg {
        self.pressure
    }

    pub fn temperature(&self) -> Celsius {
        self.temperature
    }
}

impl Default for Setpoints {
    fn default() -> Self {
        Self::new(PRESSURE_DEFAULT, TEMPERATURE_DEFAULT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vessel {
    Arterial,
    Venous,
}

impl Vessel {
    pub const ALL: [Vessel; 2] = [Vessel::Arterial, Vessel::Venous];

    pub fn as_str(&self) -> &'static str {
        match self {
            Vessel::Arterial => "arterial",
            Vessel::Venous => "venous",
        }
    }
}

/// Confidence band of a simulated measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    #[default]
    High,
    Medium,
    Low,
}

impl QualityTier {
    pub const ALL: [QualityTier; 3] = [QualityTier::High, QualityTier::Medium, QualityTier::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::High => "high",
            QualityTier::Medium => "medium",
            QualityTier::Low => "low",
        }
    }
}

impl FromStr for QualityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(QualityTier::High),
            "medium" => Ok(QualityTier::Medium),
            "low" => Ok(QualityTier::Low),
            other => Err(format!(
                "unknown quality tier '{}' (expected high, medium or low)",
                other
            )),
        }
    }
}

/// Which end of a simulation range a layout cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundEnd {
    Min,
    Max,
}

impl BoundEnd {
    pub const ALL: [BoundEnd; 2] = [BoundEnd::Min, BoundEnd::Max];

    pub fn as_str(&self) -> &'static str {
        match self {
            BoundEnd::Min => "min",
            BoundEnd::Max => "max",
        }
    }
}

/// Measured quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Hemoglobin,
    Saturation,
    PartialPressure,
    FlowRate,
}

impl Channel {
    pub const BLOOD: [Channel; 3] = [
        Channel::Hemoglobin,
        Channel::Saturation,
        Channel::PartialPressure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Hemoglobin => "hemoglobin",
            Channel::Saturation => "saturation",
            Channel::PartialPressure => "partial_pressure",
            Channel::FlowRate => "flow_rate",
        }
    }
}

/// Simulation range. `low > high` is tolerated by the sampler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundPair {
    pub low: f64,
    pub high: f64,
}

/// Ranges for the three blood-gas channels of one vessel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingBounds {
    pub hemoglobin: BoundPair,
    pub saturation: BoundPair,
    pub partial_pressure: BoundPair,
}

/// Everything needed for one sampling event at a given quality tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierBounds {
    pub arterial: ReadingBounds,
    pub venous: ReadingBounds,
    pub flow: BoundPair,
}

/// Colour band used by the setpoint panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Normal,
    Warning,
    Critical,
}

impl StatusLevel {
    /// Panel colour shown by the dashboard.
    pub fn color(&self) -> &'static str {
        match self {
            StatusLevel::Normal => "#0074D9",
            StatusLevel::Warning => "#F7E72A",
            StatusLevel::Critical => "#FF6B6B",
        }
    }
}

/// Session commands, one per user interaction. Parameters are resolved so a
/// sequence of commands replays deterministically given the same sampler.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Generate { at: NaiveTime },
    AdjustPressure { delta: i64 },
    AdjustTemperature { delta: i64 },
    SelectTier { tier: QualityTier },
    Import { bytes: Vec<u8> },
    Export,
    EmergencyStop,
    Resume,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Generate { at } => write!(f, "Generate({})", at.format(TIMESTAMP_FORMAT)),
            Command::AdjustPressure { delta } => write!(f, "AdjustPressure({:+})", delta),
            Command::AdjustTemperature { delta } => write!(f, "AdjustTemperature({:+})", delta),
            Command::SelectTier { tier } => write!(f, "SelectTier({})", tier),
            Command::Import { bytes } => write!(f, "Import({} bytes)", bytes.len()),
            Command::Export => write!(f, "Export"),
            Command::EmergencyStop => write!(f, "EmergencyStop"),
            Command::Resume => write!(f, "Resume"),
        }
    }
}

/// What a successful command produced, besides the new session.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Recorded(MetricRecord),
    SetpointsChanged(Setpoints),
    TierSelected(QualityTier),
    LayoutLoaded,
    Exported(Vec<u8>),
    Stopped,
    Resumed,
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl fmt::Display for Setpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mmHg / {} °C", self.pressure, self.temperature)
    }
}

impl fmt::Display for MetricRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  VO2ren {:.2} mL/min  AOC {:.2}  RVOC {:.2} mL O2/dL",
            self.timestamp, self.consumption, self.arterial_content, self.venous_content
        )
    }
}
