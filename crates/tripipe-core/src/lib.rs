//! Core pipeline engine for the tripipe three-stage processor simulator.
//!
//! The modelled machine has a Harvard memory layout (1024 instruction words,
//! 2048 data bytes), 64 eight-bit registers and a fetch/decode/execute
//! pipeline with no hazard detection: decode snapshots register operands and
//! later writes never refresh them.

/// Instruction-store and data-store models plus binary image helpers.
pub mod memory;
pub use memory::{
    decode_image, encode_image, DataStore, InstructionStore, DATA_STORE_BYTES,
    INSTRUCTION_STORE_BOUND, INSTRUCTION_STORE_WORDS,
};

/// Public host-facing API contract and run driver.
pub mod api;
pub use api::{
    run_until_drained, step_cycle, CoreConfig, CoreSnapshot, CoreState, CoreStats,
    NullTraceSink, RunOutcome, RunStop, SnapshotVersion, StepOutcome, TraceEvent, TraceSink,
    DEFAULT_MAX_CYCLES,
};

/// Architectural state and pipeline latches.
pub mod state;
pub use state::{
    ArchitecturalState, ExecuteShadow, GeneralRegister, IdExLatch, IfIdLatch, RunState,
    GENERAL_REGISTER_COUNT, SREG_C, SREG_N, SREG_S, SREG_V, SREG_Z,
};

/// Opcode table and 16-bit instruction word packing.
pub mod encoding;
pub use encoding::{decode_fields, encode, Opcode, OperandForm, OPCODE_ENCODING_TABLE};

/// Instruction decode and the decode stage.
pub mod decoder;
pub use decoder::{decode_stage, DecodedInstruction, Decoder, Operands};

/// Load-time error types.
pub mod error;
pub use error::ImageError;

/// Fetch stage.
pub mod fetch;
pub use fetch::{fetch_stage, FetchOutcome};

/// Execute stage and ALU semantics.
pub mod execute;
pub use execute::{
    commit_execution, execute_instruction, execute_stage, ExecuteOutcome, ExecuteState,
    FlagsUpdate,
};

/// One-cycle pipeline orchestration.
pub mod pipeline;
pub use pipeline::{advance_cycle, is_drained, CycleReport};

/// Instruction disassembly.
pub mod disasm;
pub use disasm::{disassemble, disassemble_program, disassemble_window, DisassemblyRow};

/// Human-readable state dumps.
pub mod report;
pub use report::{
    flag_string, format_data_memory, format_instruction_memory, format_pipeline_row,
    format_registers, FinalReport, PipelineRow,
};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
