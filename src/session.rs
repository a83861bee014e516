// Session state and command handlers.
//
// Each handler is a pure function of (current session, input) -> new session plus
// an outcome. On error the caller keeps the session it passed in; nothing is
// partially applied.

use std::fmt;

use chrono::NaiveTime;
use log::{info, warn};

use crate::constants::*;
use crate::error::{MonitorError, Result};
use crate::history::HistoryBuffer;
use crate::layout::LayoutTable;
use crate::logic;
use crate::sampler::{sample_tier, UniformSampler};
use crate::spreadsheet;
use crate::types::*;

/// Everything one user session mutates. Owned by whoever drives the session;
/// never shared between sessions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    pub history: HistoryBuffer,
    pub layout: Option<LayoutTable>,
    pub setpoints: Setpoints,
    pub tier: QualityTier,
    pub emergency_stopped: bool,
}

/// New session plus what the command produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    pub session: Session,
    pub outcome: Outcome,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session with a layout already loaded.
    pub fn with_layout(layout: LayoutTable) -> Self {
        Self {
            layout: Some(layout),
            ..Self::default()
        }
    }

    /// Current values for the dashboard panels.
    pub fn readout(&self) -> Readout {
        let latest = self.history.latest().cloned();
        Readout {
            average_content: latest.as_ref().map(MetricRecord::average_content),
            latest,
            setpoints: self.setpoints,
            pressure_status: logic::pressure_status(self.setpoints.pressure()),
            temperature_status: logic::temperature_status(self.setpoints.temperature()),
            battery_percent: BATTERY_LEVEL_PERCENT,
            hematocrit_percent: HEMATOCRIT_PERCENT,
            tier: self.tier,
            emergency_stopped: self.emergency_stopped,
            history_len: self.history.len(),
        }
    }
}

fn changed(session: Session, outcome: Outcome) -> Result<CommandResult> {
    Ok(CommandResult { session, outcome })
}

/// One full sample → compute → append cycle at the session's quality tier.
pub fn on_generate(
    session: &Session,
    sampler: &mut impl UniformSampler,
    at: NaiveTime,
) -> Result<CommandResult> {
    if session.emergency_stopped {
        warn!("generate refused: emergency stop active");
        return Err(MonitorError::EmergencyStop);
    }
    let layout = session.layout.as_ref().ok_or(MonitorError::LayoutNotLoaded)?;
    let bounds = layout.tier_bounds(session.tier)?;

    let raw = sample_tier(sampler, &bounds);
    let record = logic::derive_record(
        at.format(TIMESTAMP_FORMAT).to_string(),
        &raw.arterial,
        &raw.venous,
        raw.flow_rate,
    );

    let mut next = session.clone();
    next.history.append(record.clone());
    info!("sample recorded: {}", record);
    changed(next, Outcome::Recorded(record))
}

pub fn on_adjust_pressure(session: &Session, delta: i64) -> Result<CommandResult> {
    let setpoints = logic::adjust_pressure(session.setpoints, delta);
    changed(
        Session {
            setpoints,
            ..session.clone()
        },
        Outcome::SetpointsChanged(setpoints),
    )
}

pub fn on_adjust_temperature(session: &Session, delta: i64) -> Result<CommandResult> {
    let setpoints = logic::adjust_temperature(session.setpoints, delta);
    changed(
        Session {
            setpoints,
            ..session.clone()
        },
        Outcome::SetpointsChanged(setpoints),
    )
}

pub fn on_select_tier(session: &Session, tier: QualityTier) -> Result<CommandResult> {
    changed(
        Session {
            tier,
            ..session.clone()
        },
        Outcome::TierSelected(tier),
    )
}

/// Replace the layout table from an uploaded sheet. A bad sheet leaves the
/// previous layout (if any) in place.
pub fn on_import(session: &Session, bytes: &[u8]) -> Result<CommandResult> {
    let layout = spreadsheet::import_layout(bytes).map_err(|e| {
        warn!("layout import rejected: {}", e);
        e
    })?;
    changed(
        Session {
            layout: Some(layout),
            ..session.clone()
        },
        Outcome::LayoutLoaded,
    )
}

/// Serialize the current history. The session is unchanged.
pub fn on_export(session: &Session) -> Result<CommandResult> {
    let bytes = spreadsheet::export_history(&session.history.snapshot())?;
    changed(session.clone(), Outcome::Exported(bytes))
}

pub fn on_emergency_stop(session: &Session) -> Result<CommandResult> {
    warn!("emergency stop activated");
    changed(
        Session {
            emergency_stopped: true,
            ..session.clone()
        },
        Outcome::Stopped,
    )
}

pub fn on_resume(session: &Session) -> Result<CommandResult> {
    if session.emergency_stopped {
        info!("emergency stop cleared");
    }
    changed(
        Session {
            emergency_stopped: false,
            ..session.clone()
        },
        Outcome::Resumed,
    )
}

/// Dashboard panel values derived from one session.
#[derive(Debug, Clone, PartialEq)]
pub struct Readout {
    pub latest: Option<MetricRecord>,
    pub average_content: Option<f64>,
    pub setpoints: Setpoints,
    pub pressure_status: StatusLevel,
    pub temperature_status: StatusLevel,
    pub battery_percent: u8,
    pub hematocrit_percent: u8,
    pub tier: QualityTier,
    pub emergency_stopped: bool,
    pub history_len: usize,
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.latest {
            Some(rec) => {
                writeln!(f, "  VO2ren:        {:.2} mL/min", rec.consumption)?;
                writeln!(f, "  AOC:           {:.2} mL O2/dL", rec.arterial_content)?;
                writeln!(f, "  RVOC:          {:.2} mL O2/dL", rec.venous_content)?;
                writeln!(
                    f,
                    "  OC:            {:.2} mL O2/dL",
                    self.average_content.unwrap_or_default()
                )?;
                writeln!(f, "  sampled at:    {}", rec.timestamp)?;
            }
            None => writeln!(f, "  no samples yet")?,
        }
        writeln!(
            f,
            "  temperature:   {} °C ({})",
            self.setpoints.temperature(),
            self.temperature_status
        )?;
        writeln!(
            f,
            "  pressure:      {} mmHg ({})",
            self.setpoints.pressure(),
            self.pressure_status
        )?;
        writeln!(f, "  quality tier:  {}", self.tier)?;
        writeln!(f, "  history:       {}/{}", self.history_len, HISTORY_CAPACITY)?;
        writeln!(f, "  Hct:           {}%", self.hematocrit_percent)?;
        writeln!(f, "  battery:       {}%", self.battery_percent)?;
        write!(
            f,
            "  emergency stop: {}",
            if self.emergency_stopped { "ACTIVE" } else { "off" }
        )
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.readout())
    }
}
