// Deterministic command replay.
// Given a sequence of commands and a sampler, applies each to the session and
// returns the resulting session sequence, checking invariants after every step.

use crate::error::Result;
use crate::invariants;
use crate::sampler::UniformSampler;
use crate::session::{self, CommandResult, Session};
use crate::types::*;

/// Apply a single command to the session.
/// Dispatches to the matching handler using the parameters carried by the command.
pub fn apply_command(
    state: &Session,
    command: &Command,
    sampler: &mut impl UniformSampler,
) -> Result<CommandResult> {
    match command {
        Command::Generate { at } => session::on_generate(state, sampler, *at),
        Command::AdjustPressure { delta } => session::on_adjust_pressure(state, *delta),
        Command::AdjustTemperature { delta } => session::on_adjust_temperature(state, *delta),
        Command::SelectTier { tier } => session::on_select_tier(state, *tier),
        Command::Import { bytes } => session::on_import(state, bytes),
        Command::Export => session::on_export(state),
        Command::EmergencyStop => session::on_emergency_stop(state),
        Command::Resume => session::on_resume(state),
    }
}

/// One replayed step: the command, its outcome (or the error that rejected it)
/// and the session after it.
#[derive(Debug)]
pub struct ReplayStep {
    pub command: Command,
    pub outcome: Result<Outcome>,
    pub session: Session,
}

/// Replay a full command sequence starting from `init`.
///
/// Rejected commands leave the session as it was and replay continues, the same
/// way the dashboard keeps running after a bad upload. Panics with a descriptive
/// message if an invariant breaks.
pub fn replay_trace(
    init: Session,
    commands: &[Command],
    sampler: &mut impl UniformSampler,
) -> Vec<ReplayStep> {
    let mut trace = Vec::with_capacity(commands.len());
    let mut state = init;

    for (i, command) in commands.iter().enumerate() {
        let outcome = match apply_command(&state, command, sampler) {
            Ok(result) => {
                state = result.session;
                Ok(result.outcome)
            }
            Err(e) => Err(e),
        };

        if let Err(violated) = invariants::check_invariants(&state) {
            panic!(
                "Invariant '{}' violated after step {} ({})\nSession:\n{}",
                violated, i, command, state,
            );
        }

        trace.push(ReplayStep {
            command: command.clone(),
            outcome,
            session: state.clone(),
        });
    }

    trace
}
