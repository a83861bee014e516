// Simulator: drives sessions with random command streams.
// Picks commands at random, resolves their parameters from the same generator and
// checks every session invariant after each step.

use chrono::{Duration, NaiveTime};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::constants::*;
use crate::invariants;
use crate::replay::apply_command;
use crate::sampler::RandomSampler;
use crate::session::Session;
use crate::types::*;

/// The set of interactions a simulated user can perform.
#[derive(Debug, Clone, Copy)]
pub enum Action {
    Generate,
    AdjustPressure,
    AdjustTemperature,
    SelectTier,
    ImportLayout,
    Export,
    EmergencyStop,
    Resume,
}

const ALL_ACTIONS: &[Action] = &[
    Action::Generate,
    Action::AdjustPressure,
    Action::AdjustTemperature,
    Action::SelectTier,
    Action::ImportLayout,
    Action::Export,
    Action::EmergencyStop,
    Action::Resume,
];

/// Step sizes a user can press in one go (single clicks and held buttons).
pub const SETPOINT_DELTAS: &[i64] = &[-10, -1, 1, 10];

/// Seconds of wall-clock time between simulated interactions.
pub const STEP_INTERVAL_SECS: i64 = 5;

pub fn start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default()
}

/// The built-in demo layout as an uploadable sheet.
pub fn demo_sheet() -> Vec<u8> {
    let mut out = String::new();
    for row in DEMO_LAYOUT_GRID.iter() {
        let cells: Vec<String> = row.iter().map(f64::to_string).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out.into_bytes()
}

fn resolve_command(action: Action, at: NaiveTime, rng: &mut impl Rng) -> Command {
    match action {
        Action::Generate => Command::Generate { at },
        Action::AdjustPressure => Command::AdjustPressure {
            delta: *SETPOINT_DELTAS.choose(rng).unwrap_or(&SETPOINT_STEP),
        },
        Action::AdjustTemperature => Command::AdjustTemperature {
            delta: *SETPOINT_DELTAS.choose(rng).unwrap_or(&SETPOINT_STEP),
        },
        Action::SelectTier => Command::SelectTier {
            tier: *QualityTier::ALL.choose(rng).unwrap_or(&QualityTier::High),
        },
        Action::ImportLayout => Command::Import {
            bytes: demo_sheet(),
        },
        Action::Export => Command::Export,
        Action::EmergencyStop => Command::EmergencyStop,
        Action::Resume => Command::Resume,
    }
}

/// Execute a single random step.
/// Actions are tried in shuffled order until one is accepted; rejected commands
/// (for example generate before any layout) fall through to the next action.
/// Returns the accepted command, or `None` with the session unchanged.
pub fn step(session: &Session, at: NaiveTime, rng: &mut impl Rng) -> (Option<Command>, Session) {
    let mut actions: Vec<Action> = ALL_ACTIONS.to_vec();
    actions.shuffle(rng);

    for action in actions {
        let command = resolve_command(action, at, rng);
        let mut sampler = RandomSampler::new(&mut *rng);
        match apply_command(session, &command, &mut sampler) {
            Ok(result) => return (Some(command), result.session),
            Err(e) => debug!("{} rejected: {}", command, e),
        }
    }

    (None, session.clone())
}

/// Result of running one simulation trace.
pub struct TraceResult {
    pub steps: usize,
    pub samples_recorded: usize,
    pub violation: Option<(&'static str, usize, Session)>,
    pub final_session: Session,
}

/// Run a single simulation trace for up to `max_steps`.
/// Checks all session invariants after each step.
pub fn run_trace(max_steps: usize, rng: &mut impl Rng, verbose: bool) -> TraceResult {
    let mut session = Session::new();
    let mut clock = start_time();
    let mut samples_recorded = 0;

    if verbose {
        println!("[Step 0] init");
        println!("{}\n", session);
    }

    for step_num in 1..=max_steps {
        clock += Duration::seconds(STEP_INTERVAL_SECS);
        let (command, next) = step(&session, clock, rng);

        if matches!(command, Some(Command::Generate { .. })) {
            samples_recorded += 1;
        }
        if verbose {
            if let Some(command) = &command {
                println!("[Step {}] {}", step_num, command);
                println!("{}\n", next);
            }
        }

        session = next;

        if let Err(violated) = invariants::check_invariants(&session) {
            if verbose {
                println!("!!! INVARIANT VIOLATION: {} at step {}", violated, step_num);
            }
            return TraceResult {
                steps: step_num,
                samples_recorded,
                violation: Some((violated, step_num, session.clone())),
                final_session: session,
            };
        }
    }

    TraceResult {
        steps: max_steps,
        samples_recorded,
        violation: None,
        final_session: session,
    }
}

/// Run many simulation traces from one seed.
pub fn run_simulation(
    max_steps: usize,
    max_samples: usize,
    seed: u64,
    verbose: bool,
) -> SimulationResult {
    use rand::SeedableRng;
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let start = std::time::Instant::now();
    let mut violation = None;
    let mut samples_recorded = 0;

    for trace_num in 0..max_samples {
        let result = run_trace(max_steps, &mut rng, verbose && trace_num == 0);
        samples_recorded += result.samples_recorded;

        if let Some((inv_name, step, session)) = result.violation {
            violation = Some(ViolationInfo {
                invariant: inv_name,
                trace: trace_num,
                step,
                session,
            });
            break;
        }
    }

    let elapsed = start.elapsed();

    SimulationResult {
        max_steps,
        max_samples,
        seed,
        samples_recorded,
        elapsed,
        violation,
    }
}

pub struct ViolationInfo {
    pub invariant: &'static str,
    pub trace: usize,
    pub step: usize,
    pub session: Session,
}

pub struct SimulationResult {
    pub max_steps: usize,
    pub max_samples: usize,
    pub seed: u64,
    pub samples_recorded: usize,
    pub elapsed: std::time::Duration,
    pub violation: Option<ViolationInfo>,
}

impl std::fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let traces_per_sec = self.max_samples as f64 / self.elapsed.as_secs_f64().max(1e-9);
        writeln!(f)?;
        match &self.violation {
            None => {
                writeln!(
                    f,
                    "[ok] No violation found ({:.0}ms at {:.0} traces/second).",
                    self.elapsed.as_millis(),
                    traces_per_sec,
                )?;
                writeln!(
                    f,
                    "Checked {} traces of {} steps each ({} samples recorded).",
                    self.max_samples, self.max_steps, self.samples_recorded,
                )?;
            }
            Some(v) => {
                writeln!(
                    f,
                    "[VIOLATION] Invariant '{}' violated at trace {} step {}.",
                    v.invariant, v.trace, v.step,
                )?;
                writeln!(f, "Session at violation:")?;
                writeln!(f, "{}", v.session)?;
            }
        }
        writeln!(f, "Seed: {} ", self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn demo_sheet_imports_to_demo_layout() {
        let table = crate::spreadsheet::import_layout(demo_sheet().as_slice()).unwrap();
        assert_eq!(table, crate::layout::LayoutTable::demo());
    }

    #[test]
    fn short_simulation_finds_no_violation() {
        let result = run_simulation(60, 20, 11, false);
        assert!(result.violation.is_none());
    }

    #[test]
    fn same_seed_same_final_session() {
        let mut a = rand::rngs::StdRng::seed_from_u64(5);
        let mut b = rand::rngs::StdRng::seed_from_u64(5);
        let ta = run_trace(40, &mut a, false);
        let tb = run_trace(40, &mut b, false);
        assert_eq!(ta.final_session, tb.final_session);
        assert_eq!(ta.samples_recorded, tb.samples_recorded);
    }

    #[test]
    fn long_trace_respects_history_capacity() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(99);
        let trace = run_trace(500, &mut rng, false);
        assert!(trace.violation.is_none());
        assert!(trace.final_session.history.len() <= HISTORY_CAPACITY);
    }
}
