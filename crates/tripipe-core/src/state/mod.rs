//! Architectural CPU state and pipeline latch primitives.

/// Inter-stage pipeline latches.
pub mod latches;
/// Architectural register file types and storage model.
pub mod registers;
mod run_state;

pub use latches::{ExecuteShadow, IdExLatch, IfIdLatch};
pub use registers::{
    ArchitecturalState, GeneralRegister, GENERAL_REGISTER_COUNT, SREG_ACTIVE_MASK, SREG_C, SREG_N,
    SREG_S, SREG_V, SREG_Z,
};
pub use run_state::RunState;
