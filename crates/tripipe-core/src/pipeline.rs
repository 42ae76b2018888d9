//! Single-cycle pipeline advancement.
//!
//! Stages run back to front so each stage consumes its input latch before the
//! stage upstream of it refills that latch:
//! 1. Capture `ID/EX` into the execute shadow
//! 2. Execute
//! 3. Decode
//! 4. Fetch, only while `PC` is inside the instruction store
//!
//! A taken branch in step 2 flushes `IF/ID`, so decode has nothing to promote
//! in the same cycle.

use crate::decoder::decode_stage;
use crate::execute::{execute_stage, ExecuteOutcome};
use crate::fetch::{fetch_stage, FetchOutcome};
use crate::memory::INSTRUCTION_STORE_BOUND;
use crate::state::ExecuteShadow;
use crate::{CoreState, TraceSink};

/// What each stage did during one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Execute-stage result.
    pub execute: ExecuteOutcome,
    /// Whether decode promoted an instruction into `ID/EX`.
    pub decoded: bool,
    /// Fetch-stage result; `Skipped` when `PC` was out of range.
    pub fetch: FetchOutcome,
}

/// Advances the pipeline by exactly one cycle and updates [`crate::CoreStats`].
pub fn advance_cycle(state: &mut CoreState, trace_sink: &mut dyn TraceSink) -> CycleReport {
    state.ex_shadow = ExecuteShadow::capture(&state.id_ex);

    let execute = execute_stage(state, trace_sink);
    let decoded = decode_stage(state, trace_sink);
    let fetch = if state.arch.pc() < INSTRUCTION_STORE_BOUND {
        fetch_stage(state, trace_sink)
    } else {
        FetchOutcome::Skipped
    };

    state.stats.cycles += 1;
    match execute {
        ExecuteOutcome::Idle => {}
        ExecuteOutcome::Retired { .. } => state.stats.retired += 1,
        ExecuteOutcome::Redirected { .. } => {
            state.stats.retired += 1;
            state.stats.flushes += 1;
        }
    }

    CycleReport {
        execute,
        decoded,
        fetch,
    }
}

/// Returns `true` once the execute shadow and both latches are empty and `PC`
/// is at or past the instruction-store bound.
#[must_use]
pub const fn is_drained(state: &CoreState) -> bool {
    !state.ex_shadow.valid
        && !state.if_id.valid
        && !state.id_ex.valid
        && state.arch.pc() >= INSTRUCTION_STORE_BOUND
}
