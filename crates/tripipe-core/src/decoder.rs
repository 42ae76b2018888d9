//! Instruction decode for the tripipe ISA.
//!
//! [`Decoder::decode`] is the pure field split; [`decode_stage`] is the
//! pipeline stage that moves an instruction from `IF/ID` into `ID/EX` and
//! snapshots its register operands.

use tracing::debug;

use crate::encoding::{decode_fields, encode, operand_form, sign_extend_6bit, Opcode, OperandForm};
use crate::state::{GeneralRegister, IdExLatch};
use crate::{CoreState, TraceEvent, TraceSink};

/// Operand fields, tagged by how the opcode reads the low six bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Operands {
    /// `OP Rs Rt`.
    TwoRegister {
        /// Source and destination register.
        rs: GeneralRegister,
        /// Second register.
        rt: GeneralRegister,
    },
    /// `OP Rs imm`.
    RegisterImmediate {
        /// Source and destination register.
        rs: GeneralRegister,
        /// Sign-extended 6-bit immediate.
        imm: i8,
    },
}

/// Decoded instruction with all fields extracted.
///
/// Decoding never fails: reserved opcodes keep their raw value and decode
/// with register-form operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DecodedInstruction {
    /// Raw 4-bit opcode.
    pub opcode_bits: u8,
    /// Assigned opcode, `None` for reserved values.
    pub opcode: Option<Opcode>,
    /// Operand fields.
    pub operands: Operands,
}

impl DecodedInstruction {
    /// Source (and destination) register.
    #[must_use]
    pub const fn rs(&self) -> GeneralRegister {
        match self.operands {
            Operands::TwoRegister { rs, .. } | Operands::RegisterImmediate { rs, .. } => rs,
        }
    }

    /// Second register, or `R0` for immediate-form instructions.
    #[must_use]
    pub const fn rt(&self) -> GeneralRegister {
        match self.operands {
            Operands::TwoRegister { rt, .. } => rt,
            Operands::RegisterImmediate { .. } => GeneralRegister::R0,
        }
    }

    /// Immediate, or `0` for register-form instructions.
    #[must_use]
    pub const fn imm(&self) -> i8 {
        match self.operands {
            Operands::TwoRegister { .. } => 0,
            Operands::RegisterImmediate { imm, .. } => imm,
        }
    }

    /// Re-encodes this decoded instruction back to a 16-bit word.
    #[must_use]
    pub const fn encode(self) -> u16 {
        match self.operands {
            Operands::TwoRegister { rs, rt } => {
                encode(self.opcode_bits, rs.number(), rt.number() as i16)
            }
            Operands::RegisterImmediate { rs, imm } => {
                encode(self.opcode_bits, rs.number(), imm as i16)
            }
        }
    }
}

/// Instruction decoder for the tripipe ISA.
#[derive(Debug, Clone, Copy)]
pub struct Decoder;

impl Decoder {
    /// Decodes a 16-bit instruction word.
    #[must_use]
    pub const fn decode(word: u16) -> DecodedInstruction {
        let (op, rs_bits, low6) = decode_fields(word);
        let rs = GeneralRegister::from_u6(rs_bits);

        let operands = match operand_form(op) {
            OperandForm::TwoRegister => Operands::TwoRegister {
                rs,
                rt: GeneralRegister::from_u6(low6),
            },
            OperandForm::RegisterImmediate => Operands::RegisterImmediate {
                rs,
                imm: sign_extend_6bit(low6),
            },
        };

        DecodedInstruction {
            opcode_bits: op,
            opcode: Opcode::from_u4(op),
            operands,
        }
    }
}

/// Runs the decode stage for one cycle.
///
/// Promotes `IF/ID` into `ID/EX`, reading both operand registers from the
/// register file as it stands right now. Returns whether an instruction moved.
pub fn decode_stage(state: &mut CoreState, trace_sink: &mut dyn TraceSink) -> bool {
    if !state.if_id.valid {
        return false;
    }

    let instruction = state.if_id.instruction;
    let pc = state.if_id.pc;
    let decoded = Decoder::decode(instruction);
    let rs = decoded.rs();
    let rt = decoded.rt();

    state.id_ex = IdExLatch {
        instruction,
        pc,
        opcode: decoded.opcode_bits,
        rs,
        rt,
        imm: decoded.imm(),
        value_rs: state.arch.gpr(rs),
        value_rt: state.arch.gpr(rt),
        valid: true,
    };
    state.if_id.invalidate();

    debug!(
        pc,
        opcode = decoded.opcode_bits,
        %rs,
        value_rs = state.id_ex.value_rs,
        value_rt = state.id_ex.value_rt,
        imm = state.id_ex.imm,
        "decode"
    );
    trace_sink.on_event(TraceEvent::Decoded { pc, instruction });
    true
}
