//! Instruction encoding.
//!
//! Packing is delegated to [`tripipe_core::encode`] so the assembler and the
//! simulator share one definition of the word layout.

use tripipe_core::encode;

use crate::parser::{ParsedInstruction, ParsedLine};

/// Encodes an instruction into its 16-bit word.
///
/// Bit layout: `[OP:4][RS:6][RT/IMM:6]`
#[must_use]
pub fn encode_instruction(instr: &ParsedInstruction) -> u16 {
    let (op, _, _) = instr.resolution;
    encode(op, instr.rs.number(), instr.operand.field())
}

/// Encodes a parsed line; blank lines produce no word.
#[must_use]
pub fn encode_line(line: &ParsedLine) -> Option<u16> {
    match line {
        ParsedLine::Blank => None,
        ParsedLine::Instruction { instruction } => Some(encode_instruction(instruction)),
    }
}
