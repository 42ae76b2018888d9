//! Instruction disassembly for the tripipe ISA.
//!
//! Every instruction is a single 16-bit word, so any address is a valid
//! instruction boundary and windows need no backward scanning.

use crate::decoder::{Decoder, Operands};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassemblyRow {
    /// Instruction-store address.
    pub addr: u16,
    /// Raw instruction word.
    pub raw_word: u16,
    /// Upper-case mnemonic, or `.word` for reserved opcodes.
    pub mnemonic: String,
    /// Formatted operands (e.g. `R1 R2` or `R1 -3`).
    pub operands: String,
    /// Whether the opcode is one of the reserved values 12..=15.
    pub is_reserved: bool,
}

impl DisassemblyRow {
    /// Renders the row as assembler source text.
    #[must_use]
    pub fn text(&self) -> String {
        format!("{} {}", self.mnemonic, self.operands)
    }
}

/// Disassembles one word at `addr`.
#[must_use]
pub fn disassemble_row(addr: u16, word: u16) -> DisassemblyRow {
    let decoded = Decoder::decode(word);
    let Some(opcode) = decoded.opcode else {
        return DisassemblyRow {
            addr,
            raw_word: word,
            mnemonic: ".word".to_string(),
            operands: format!("0x{word:04X}"),
            is_reserved: true,
        };
    };

    let operands = match decoded.operands {
        Operands::TwoRegister { rs, rt } => format!("{rs} {rt}"),
        Operands::RegisterImmediate { rs, imm } => format!("{rs} {imm}"),
    };

    DisassemblyRow {
        addr,
        raw_word: word,
        mnemonic: opcode.mnemonic().to_string(),
        operands,
        is_reserved: false,
    }
}

/// Disassembles a single word to assembler source text.
///
/// The output re-assembles to the same word for every assigned opcode.
#[must_use]
pub fn disassemble(word: u16) -> String {
    disassemble_row(0, word).text()
}

/// Disassembles `words` from slot 0 up to the first zero sentinel.
#[must_use]
pub fn disassemble_program(words: &[u16]) -> Vec<DisassemblyRow> {
    (0u16..)
        .zip(words)
        .take_while(|(_, word)| **word != 0)
        .map(|(addr, word)| disassemble_row(addr, *word))
        .collect()
}

/// Disassembles up to `before` words before and `after` words after `center`.
///
/// Rows outside `words` are omitted.
#[must_use]
pub fn disassemble_window(
    center: u16,
    before: u16,
    after: u16,
    words: &[u16],
) -> Vec<DisassemblyRow> {
    let start = center.saturating_sub(before);
    let end = center.saturating_add(after);
    (start..=end)
        .filter_map(|addr| {
            words
                .get(usize::from(addr))
                .map(|word| disassemble_row(addr, *word))
        })
        .collect()
}
