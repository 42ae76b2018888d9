//! Assembler and program loader for the tripipe pipeline simulator.

use tracing_subscriber as _;

/// Top-level assembler pipeline and program loader.
pub mod assembler;
/// Instruction encoding.
pub mod encoder;
/// Structured assembly and loading error types.
pub mod errors;
/// Mnemonic resolution against the core opcode table.
pub mod mnemonic;
/// Line parser for instructions.
pub mod parser;
/// Source file loading.
pub mod source;

pub use assembler::{
    assemble_file, assemble_source, is_image_path, load_program, AssembleResult, AssembleWarning,
    ListingEntry,
};
pub use errors::{AssemblerError, AssemblerErrorKind, ErrorCollection};
