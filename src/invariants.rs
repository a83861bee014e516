// Session invariants, checked after every command during replay and simulation.

use crate::constants::*;
use crate::layout::layout_keys;
use crate::session::Session;

/// History never grows past its capacity.
pub fn history_within_capacity(session: &Session) -> bool {
    session.history.len() <= HISTORY_CAPACITY
}

pub fn pressure_within_bounds(session: &Session) -> bool {
    (PRESSURE_MIN..=PRESSURE_MAX).contains(&session.setpoints.pressure())
}

pub fn temperature_within_bounds(session: &Session) -> bool {
    (TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&session.setpoints.temperature())
}

/// A loaded layout resolves every one of the 42 schema labels.
pub fn layout_complete(session: &Session) -> bool {
    match &session.layout {
        None => true,
        Some(table) => {
            table.len() == LAYOUT_CELLS && layout_keys().into_iter().all(|k| table.value(k).is_ok())
        }
    }
}

/// Every record's timestamp is a wall-clock `HH:MM:SS`.
pub fn timestamps_well_formed(session: &Session) -> bool {
    session
        .history
        .iter()
        .all(|r| chrono::NaiveTime::parse_from_str(&r.timestamp, TIMESTAMP_FORMAT).is_ok())
}

/// All individual invariants with names for reporting.
pub const ALL_INVARIANTS: &[(&str, fn(&Session) -> bool)] = &[
    ("historyWithinCapacity", history_within_capacity),
    ("pressureWithinBounds", pressure_within_bounds),
    ("temperatureWithinBounds", temperature_within_bounds),
    ("layoutComplete", layout_complete),
    ("timestampsWellFormed", timestamps_well_formed),
];

pub fn session_invariant(session: &Session) -> bool {
    ALL_INVARIANTS.iter().all(|(_, check)| check(session))
}

/// Check all invariants and return the name of the first violated one, if any.
pub fn check_invariants(session: &Session) -> Result<(), &'static str> {
    for (name, check) in ALL_INVARIANTS {
        if !check(session) {
            return Err(name);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutTable;
    use crate::types::MetricRecord;

    #[test]
    fn fresh_session_satisfies_all() {
        assert!(session_invariant(&Session::new()));
        assert!(session_invariant(&Session::with_layout(LayoutTable::demo())));
    }

    #[test]
    fn malformed_timestamp_is_reported() {
        let mut session = Session::new();
        session.history.append(MetricRecord {
            timestamp: "yesterday".into(),
            consumption: 0.0,
            arterial_content: 0.0,
            venous_content: 0.0,
        });
        assert_eq!(check_invariants(&session), Err("timestampsWellFormed"));
    }
}
