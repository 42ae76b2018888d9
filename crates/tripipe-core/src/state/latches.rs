//! Inter-stage pipeline registers.
//!
//! Each latch holds at most one in-flight instruction and carries its own
//! validity bit. Invalidating a latch leaves the stale payload in place; only
//! the validity bit is authoritative.

use crate::encoding::{operand_form, OperandForm};
use crate::state::GeneralRegister;

/// Fetch-to-decode latch (`IF/ID`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct IfIdLatch {
    /// Raw instruction word.
    pub instruction: u16,
    /// Program counter the word was fetched from.
    pub pc: u16,
    /// Whether the latch holds an instruction.
    pub valid: bool,
}

impl IfIdLatch {
    /// Drops the held instruction.
    pub const fn invalidate(&mut self) {
        self.valid = false;
    }
}

/// Decode-to-execute latch (`ID/EX`).
///
/// Operand values are snapshotted from the register file when the instruction
/// is decoded and are not refreshed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct IdExLatch {
    /// Raw instruction word.
    pub instruction: u16,
    /// Program counter the word was fetched from.
    pub pc: u16,
    /// Raw 4-bit opcode, reserved values included.
    pub opcode: u8,
    /// Source (and destination) register.
    pub rs: GeneralRegister,
    /// Second register; `R0` for immediate-form opcodes.
    pub rt: GeneralRegister,
    /// Sign-extended immediate; `0` for register-form opcodes.
    pub imm: i8,
    /// Value of `rs` at decode time.
    pub value_rs: u8,
    /// Value of `rt` at decode time.
    pub value_rt: u8,
    /// Whether the latch holds an instruction.
    pub valid: bool,
}

impl IdExLatch {
    /// Drops the held instruction.
    pub const fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Operand form implied by the held opcode.
    #[must_use]
    pub const fn operand_form(&self) -> OperandForm {
        operand_form(self.opcode)
    }
}

/// Record of what the execute stage picked up at the start of a cycle.
///
/// Reporting and termination read this; execute never mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ExecuteShadow {
    /// Raw instruction word.
    pub instruction: u16,
    /// Program counter the word was fetched from.
    pub pc: u16,
    /// Whether execute had an instruction this cycle.
    pub valid: bool,
}

impl ExecuteShadow {
    /// Captures the identity of the instruction currently staged for execute.
    #[must_use]
    pub const fn capture(latch: &IdExLatch) -> Self {
        Self {
            instruction: latch.instruction,
            pc: latch.pc,
            valid: latch.valid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ExecuteShadow, IdExLatch, IfIdLatch};
    use crate::encoding::OperandForm;
    use crate::state::GeneralRegister;

    #[test]
    fn latches_default_to_invalid() {
        assert!(!IfIdLatch::default().valid);
        assert!(!IdExLatch::default().valid);
        assert!(!ExecuteShadow::default().valid);
    }

    #[test]
    fn invalidate_keeps_payload_but_clears_valid_bit() {
        let mut latch = IfIdLatch {
            instruction: 0x30C5,
            pc: 7,
            valid: true,
        };
        latch.invalidate();

        assert!(!latch.valid);
        assert_eq!(latch.instruction, 0x30C5);
        assert_eq!(latch.pc, 7);
    }

    #[test]
    fn shadow_capture_is_decoupled_from_later_latch_changes() {
        let mut latch = IdExLatch {
            instruction: 0x0042,
            pc: 3,
            opcode: 0,
            rs: GeneralRegister::from_u6(1),
            rt: GeneralRegister::from_u6(2),
            valid: true,
            ..IdExLatch::default()
        };
        let shadow = ExecuteShadow::capture(&latch);
        latch.invalidate();

        assert!(shadow.valid);
        assert_eq!(shadow.instruction, 0x0042);
        assert_eq!(shadow.pc, 3);
    }

    #[test]
    fn operand_form_follows_held_opcode() {
        let mut latch = IdExLatch::default();
        assert_eq!(latch.operand_form(), OperandForm::TwoRegister);
        latch.opcode = 0xA;
        assert_eq!(latch.operand_form(), OperandForm::RegisterImmediate);
    }
}
