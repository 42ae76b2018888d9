//! Human-readable dumps of core state.
//!
//! Each report is a borrowed [`Display`] view so callers can stream it to any
//! writer; the `format_*` helpers render to a `String`.

use std::fmt::{self, Display, Formatter};

use crate::encoding::{decode_fields, OperandForm};
use crate::memory::{DataStore, InstructionStore};
use crate::state::{ArchitecturalState, SREG_C, SREG_N, SREG_S, SREG_V, SREG_Z};
use crate::CoreState;

const REGISTERS_PER_LINE: usize = 8;

/// Register file followed by the `SREG` flag line.
#[derive(Debug, Clone, Copy)]
pub struct RegisterReport<'a>(pub &'a ArchitecturalState);

impl Display for RegisterReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Registers:")?;
        let registers = self.0.registers();
        for (row, chunk) in registers.chunks(REGISTERS_PER_LINE).enumerate() {
            for (col, value) in chunk.iter().enumerate() {
                if col > 0 {
                    write!(f, "  ")?;
                }
                write!(f, "R{:02}: 0x{value:02X}", row * REGISTERS_PER_LINE + col)?;
            }
            writeln!(f)?;
        }
        if registers.iter().skip(1).all(|value| *value == 0) {
            writeln!(f, "(all zero except R0)")?;
        }
        writeln!(f, "SREG: [{}]", flag_string(self.0.sreg()))
    }
}

/// Renders `sreg` as `CVNSZ` with `-` for each clear flag.
#[must_use]
pub fn flag_string(sreg: u8) -> String {
    [
        (SREG_C, 'C'),
        (SREG_V, 'V'),
        (SREG_N, 'N'),
        (SREG_S, 'S'),
        (SREG_Z, 'Z'),
    ]
    .iter()
    .map(|(mask, name)| if sreg & mask != 0 { *name } else { '-' })
    .collect()
}

/// One row of the per-cycle pipeline table.
#[derive(Debug, Clone, Copy)]
pub struct PipelineRow<'a> {
    /// 1-based cycle number.
    pub cycle: u64,
    /// State after the cycle advanced.
    pub state: &'a CoreState,
}

impl Display for PipelineRow<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.state;
        let fetch = if state.if_id.valid {
            instruction_label(state.if_id.pc)
        } else {
            "-".to_string()
        };

        let decode = if state.id_ex.valid {
            let latch = &state.id_ex;
            let second = match latch.operand_form() {
                OperandForm::TwoRegister => {
                    format!("rt={}={}", latch.rt, latch.value_rt)
                }
                // Immediate rows keep an empty rt slot.
                OperandForm::RegisterImmediate => format!(", imm={}", latch.imm),
            };
            format!(
                "Instruction {} (opcode={}, rs={}={}, {second})",
                u32::from(latch.pc) + 1,
                latch.opcode,
                latch.rs,
                latch.value_rs,
            )
        } else {
            "-".to_string()
        };

        let execute = if state.ex_shadow.valid {
            instruction_label(state.ex_shadow.pc)
        } else {
            "-".to_string()
        };

        writeln!(f, "Clock Cycle {}", self.cycle)?;
        writeln!(f, "| {fetch:<30} | {decode:<60} | {execute:<30} |")
    }
}

fn instruction_label(pc: u16) -> String {
    format!("Instruction {} (PC={pc})", u32::from(pc) + 1)
}

/// Non-zero instruction words with their raw fields.
#[derive(Debug, Clone, Copy)]
pub struct InstructionMemoryReport<'a>(pub &'a InstructionStore);

impl Display for InstructionMemoryReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Instruction Memory:")?;
        for (addr, word) in self.0.words().iter().enumerate() {
            if *word == 0 {
                continue;
            }
            let (opcode, rs, rt) = decode_fields(*word);
            writeln!(
                f,
                "0x{addr:04X}: 0x{word:04X} (opcode={opcode}, rs={rs}, rt={rt})"
            )?;
        }
        Ok(())
    }
}

/// Non-zero data-store bytes.
#[derive(Debug, Clone, Copy)]
pub struct DataMemoryReport<'a>(pub &'a DataStore);

impl Display for DataMemoryReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Data Memory:")?;
        for (addr, byte) in self.0.bytes().iter().enumerate() {
            if *byte != 0 {
                writeln!(f, "0x{addr:04X}: 0x{byte:02X}")?;
            }
        }
        Ok(())
    }
}

/// End-of-run dump: registers, `PC`, `SREG` and both memories.
#[derive(Debug, Clone, Copy)]
pub struct FinalReport<'a>(pub &'a CoreState);

impl Display for FinalReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.0;
        writeln!(f, "===== Final Registers =====")?;
        write!(f, "{}", RegisterReport(&state.arch))?;
        writeln!(f, "PC: 0x{:04X}", state.arch.pc())?;
        writeln!(f, "SREG: 0x{:02X}", state.arch.sreg())?;
        writeln!(f)?;
        writeln!(f, "===== Final Instruction Memory =====")?;
        write!(f, "{}", InstructionMemoryReport(&state.instructions))?;
        writeln!(f)?;
        writeln!(f, "===== Final Data Memory =====")?;
        write!(f, "{}", DataMemoryReport(&state.data))
    }
}

/// Renders the register file and flags.
#[must_use]
pub fn format_registers(arch: &ArchitecturalState) -> String {
    RegisterReport(arch).to_string()
}

/// Renders the pipeline table row for `cycle`.
#[must_use]
pub fn format_pipeline_row(cycle: u64, state: &CoreState) -> String {
    PipelineRow { cycle, state }.to_string()
}

/// Renders every non-zero instruction word.
#[must_use]
pub fn format_instruction_memory(store: &InstructionStore) -> String {
    InstructionMemoryReport(store).to_string()
}

/// Renders every non-zero data byte.
#[must_use]
pub fn format_data_memory(data: &DataStore) -> String {
    DataMemoryReport(data).to_string()
}
