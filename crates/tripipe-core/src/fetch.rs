//! Fetch stage.

use tracing::debug;

use crate::memory::INSTRUCTION_STORE_BOUND;
use crate::state::IfIdLatch;
use crate::{CoreState, TraceEvent, TraceSink};

/// Outcome of one fetch-stage invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchOutcome {
    /// `PC` was already at or past the instruction-store bound.
    Skipped,
    /// Sentinel word read; `PC` clamped to the bound.
    EndOfProgram {
        /// Program counter the sentinel was read from.
        pc: u16,
    },
    /// Instruction placed in `IF/ID`.
    Fetched {
        /// Program counter the word was read from.
        pc: u16,
        /// Raw instruction word.
        instruction: u16,
    },
}

/// Runs the fetch stage for one cycle.
///
/// A zero word marks the end of the program: the program counter is clamped to
/// [`INSTRUCTION_STORE_BOUND`] and `IF/ID` is left untouched.
pub fn fetch_stage(state: &mut CoreState, trace_sink: &mut dyn TraceSink) -> FetchOutcome {
    let pc = state.arch.pc();
    if pc >= INSTRUCTION_STORE_BOUND {
        return FetchOutcome::Skipped;
    }

    let instruction = state.instructions.word(pc);
    if instruction == 0 {
        state.arch.set_pc(INSTRUCTION_STORE_BOUND);
        debug!(pc, "end-of-program sentinel");
        trace_sink.on_event(TraceEvent::EndOfProgram { pc });
        return FetchOutcome::EndOfProgram { pc };
    }

    state.if_id = IfIdLatch {
        instruction,
        pc,
        valid: true,
    };
    state.arch.set_pc(pc.wrapping_add(1));

    debug!(pc, instruction, "fetch");
    trace_sink.on_event(TraceEvent::Fetched { pc, instruction });
    FetchOutcome::Fetched { pc, instruction }
}
