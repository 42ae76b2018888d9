//! Execute stage for the tripipe ISA.
//!
//! Execution is split in two phases: [`execute_instruction`] computes every
//! side effect of the instruction held in `ID/EX` without touching state, and
//! [`commit_execution`] applies them in a fixed order:
//! 1. Data-store write
//! 2. Taken control transfer: `PC` redirect, flush of `IF/ID` and `ID/EX`, done
//! 3. Destination register write (suppressed for `R0`)
//! 4. `SREG` update
//! 5. Retire: `ID/EX` invalidated

mod flags;
mod helpers;

pub use flags::FlagsUpdate;
pub use helpers::{
    add8, immediate_operand, shift_left, shift_right_arithmetic, sub8, ArithResult,
};

use tracing::{debug, trace};

use crate::encoding::{Opcode, OperandForm};
use crate::memory::immediate_address;
use crate::state::{ArchitecturalState, GeneralRegister, IdExLatch};
use crate::{CoreState, DataStore, TraceEvent, TraceSink};

/// Outcome of one execute-stage invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// `ID/EX` held nothing.
    Idle,
    /// Instruction completed in place.
    Retired {
        /// Fetch-time program counter of the instruction.
        pc: u16,
    },
    /// Control transfer taken; upstream latches were flushed.
    Redirected {
        /// Fetch-time program counter of the branch.
        pc: u16,
        /// New program counter.
        target: u16,
    },
}

/// Side effects accumulated while executing one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecuteState {
    /// First ALU operand (snapshotted `rs`).
    pub operand_a: u8,
    /// Second ALU operand (snapshotted `rt` or immediate pattern).
    pub operand_b: u8,
    /// Register write-back, before `R0` suppression.
    pub dest: Option<(GeneralRegister, u8)>,
    /// Pending data-store write as `(address, value)`.
    pub data_write: Option<(u16, u8)>,
    /// `SREG` update to apply.
    pub flags_update: FlagsUpdate,
    /// Taken control transfer target; implies a flush.
    pub redirect: Option<u16>,
}

/// Computes the side effects of the instruction held in `latch`.
///
/// ALU operands come from the decode-time snapshot. `BEQZ`, `BR` and `STR`
/// read their registers live from `arch`.
#[must_use]
pub fn execute_instruction(
    latch: &IdExLatch,
    arch: &ArchitecturalState,
    data: &DataStore,
) -> ExecuteState {
    let operand_a = latch.value_rs;
    let operand_b = match latch.operand_form() {
        OperandForm::TwoRegister => latch.value_rt,
        OperandForm::RegisterImmediate => immediate_operand(latch.imm),
    };

    let mut exec = ExecuteState {
        operand_a,
        operand_b,
        ..ExecuteState::default()
    };

    let Some(opcode) = Opcode::from_u4(latch.opcode) else {
        exec.flags_update = FlagsUpdate::logical(0);
        return exec;
    };

    match opcode {
        Opcode::Add => write_arith(&mut exec, latch.rs, add8(operand_a, operand_b)),
        Opcode::Sub => write_arith(&mut exec, latch.rs, sub8(operand_a, operand_b)),
        Opcode::Mul => write_logical(&mut exec, latch.rs, operand_a.wrapping_mul(operand_b)),
        Opcode::Movi => write_logical(&mut exec, latch.rs, operand_b),
        Opcode::Andi => write_logical(&mut exec, latch.rs, operand_a & operand_b),
        Opcode::Eor => write_logical(&mut exec, latch.rs, operand_a ^ operand_b),
        Opcode::Sal => write_logical(&mut exec, latch.rs, shift_left(operand_a, operand_b)),
        Opcode::Sar => write_logical(
            &mut exec,
            latch.rs,
            shift_right_arithmetic(operand_a, operand_b),
        ),
        Opcode::Ldr => {
            let value = data.read(immediate_address(latch.imm));
            write_logical(&mut exec, latch.rs, value);
        }
        Opcode::Str => {
            exec.data_write = Some((immediate_address(latch.imm), arch.gpr(latch.rs)));
        }
        Opcode::Beqz => {
            if arch.gpr(latch.rs) == 0 {
                let target = latch
                    .pc
                    .wrapping_add(1)
                    .wrapping_add(immediate_address(latch.imm));
                exec.redirect = Some(target);
            } else {
                exec.flags_update = FlagsUpdate::logical(0);
            }
        }
        Opcode::Br => {
            let target = u16::from_be_bytes([arch.gpr(latch.rs), arch.gpr(latch.rt)]);
            exec.redirect = Some(target);
        }
    }

    exec
}

fn write_arith(exec: &mut ExecuteState, rs: GeneralRegister, result: ArithResult) {
    exec.dest = Some((rs, result.value));
    exec.flags_update = FlagsUpdate::arithmetic(result.value, result.carry, result.overflow);
}

fn write_logical(exec: &mut ExecuteState, rs: GeneralRegister, result: u8) {
    exec.dest = Some((rs, result));
    exec.flags_update = FlagsUpdate::logical(result);
}

/// Applies the side effects from [`execute_instruction`] to the core state
/// and retires the instruction held in `ID/EX`.
pub fn commit_execution(
    state: &mut CoreState,
    exec: &ExecuteState,
    trace_sink: &mut dyn TraceSink,
) -> ExecuteOutcome {
    let pc = state.id_ex.pc;

    if let Some((addr, value)) = exec.data_write {
        if state.data.write(addr, value) {
            state.stats.data_writes += 1;
            trace!(addr, value, "data store write");
            trace_sink.on_event(TraceEvent::DataWrite { addr, value });
        } else {
            trace!(addr, "data store write out of range, dropped");
        }
    }

    if let Some(target) = exec.redirect {
        state.arch.set_pc(target);
        state.if_id.invalidate();
        state.id_ex.invalidate();
        debug!(pc, target, "control transfer, pipeline flushed");
        trace_sink.on_event(TraceEvent::Flushed { pc, target });
        return ExecuteOutcome::Redirected { pc, target };
    }

    if let Some((reg, value)) = exec.dest {
        if state.arch.set_gpr(reg, value) {
            trace_sink.on_event(TraceEvent::RegisterWrite {
                reg: reg.number(),
                value,
            });
        }
    }

    let sreg = exec.flags_update.apply(state.arch.sreg());
    if sreg != state.arch.sreg() {
        trace!(sreg, "sreg update");
    }
    state.arch.set_sreg(sreg);

    state.id_ex.invalidate();
    ExecuteOutcome::Retired { pc }
}

/// Runs the execute stage for one cycle.
pub fn execute_stage(state: &mut CoreState, trace_sink: &mut dyn TraceSink) -> ExecuteOutcome {
    if !state.id_ex.valid {
        return ExecuteOutcome::Idle;
    }

    let pc = state.id_ex.pc;
    let instruction = state.id_ex.instruction;
    let exec = execute_instruction(&state.id_ex, &state.arch, &state.data);
    debug!(
        pc,
        opcode = state.id_ex.opcode,
        a = exec.operand_a,
        b = exec.operand_b,
        "execute"
    );
    let outcome = commit_execution(state, &exec, trace_sink);
    trace_sink.on_event(TraceEvent::Retired { pc, instruction });
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::encode;
    use crate::state::{SREG_C, SREG_N, SREG_S, SREG_V, SREG_Z};
    use crate::{Decoder, NullTraceSink};

    fn reg(n: u8) -> GeneralRegister {
        GeneralRegister::from_u6(n)
    }

    /// Stages `word` in `ID/EX` as though decoded at `pc` against the current registers.
    fn stage(state: &mut CoreState, word: u16, pc: u16) {
        let decoded = Decoder::decode(word);
        state.id_ex = IdExLatch {
            instruction: word,
            pc,
            opcode: decoded.opcode_bits,
            rs: decoded.rs(),
            rt: decoded.rt(),
            imm: decoded.imm(),
            value_rs: state.arch.gpr(decoded.rs()),
            value_rt: state.arch.gpr(decoded.rt()),
            valid: true,
        };
    }

    fn run(state: &mut CoreState, word: u16, pc: u16) -> ExecuteOutcome {
        stage(state, word, pc);
        execute_stage(state, &mut NullTraceSink)
    }

    #[test]
    fn idle_without_valid_latch() {
        let mut state = CoreState::default();
        assert_eq!(execute_stage(&mut state, &mut NullTraceSink), ExecuteOutcome::Idle);
    }

    #[test]
    fn add_writes_back_to_source_register() {
        let mut state = CoreState::default();
        state.arch.set_gpr(reg(1), 5);
        state.arch.set_gpr(reg(2), 3);

        let outcome = run(&mut state, encode(0x0, 1, 2), 0);

        assert_eq!(outcome, ExecuteOutcome::Retired { pc: 0 });
        assert_eq!(state.arch.gpr(reg(1)), 8);
        assert_eq!(state.arch.gpr(reg(2)), 3);
        assert_eq!(state.arch.sreg(), 0);
        assert!(!state.id_ex.valid);
    }

    #[test]
    fn add_wraps_and_sets_carry() {
        let mut state = CoreState::default();
        state.arch.set_gpr(reg(1), 200);
        state.arch.set_gpr(reg(2), 100);

        let _ = run(&mut state, encode(0x0, 1, 2), 0);

        assert_eq!(state.arch.gpr(reg(1)), 44);
        assert!(state.arch.flag_is_set(SREG_C));
        assert!(!state.arch.flag_is_set(SREG_Z));
    }

    #[test]
    fn sub_negative_result() {
        let mut state = CoreState::default();
        state.arch.set_gpr(reg(1), 3);
        state.arch.set_gpr(reg(2), 5);

        let _ = run(&mut state, encode(0x1, 1, 2), 0);

        assert_eq!(state.arch.gpr(reg(1)), 0xFE);
        assert!(state.arch.flag_is_set(SREG_N));
        assert!(!state.arch.flag_is_set(SREG_Z));
        assert!(state.arch.flag_is_set(SREG_C));
        assert!(state.arch.flag_is_set(SREG_V));
        assert!(!state.arch.flag_is_set(SREG_S));
    }

    #[test]
    fn mul_clears_carry_and_overflow() {
        let mut state = CoreState::default();
        state.arch.set_sreg(SREG_C | SREG_V);
        state.arch.set_gpr(reg(4), 16);
        state.arch.set_gpr(reg(5), 16);

        let _ = run(&mut state, encode(0x2, 4, 5), 0);

        assert_eq!(state.arch.gpr(reg(4)), 0);
        assert_eq!(state.arch.sreg(), SREG_Z);
    }

    #[test]
    fn mul_with_high_bit_sets_negative_only() {
        let mut state = CoreState::default();
        state.arch.set_gpr(reg(1), 16);
        state.arch.set_gpr(reg(2), 8);

        let _ = run(&mut state, encode(0x2, 1, 2), 0);

        assert_eq!(state.arch.gpr(reg(1)), 0x80);
        assert_eq!(state.arch.sreg(), SREG_N);
    }

    #[test]
    fn movi_loads_sign_extended_immediate() {
        let mut state = CoreState::default();

        let _ = run(&mut state, encode(0x3, 7, -3), 0);

        assert_eq!(state.arch.gpr(reg(7)), 0xFD);
        assert_eq!(state.arch.sreg(), SREG_N);
    }

    #[test]
    fn andi_eor_and_shifts() {
        let mut state = CoreState::default();
        state.arch.set_gpr(reg(1), 0b1011_0110);
        let _ = run(&mut state, encode(0x5, 1, 0x0F), 0);
        assert_eq!(state.arch.gpr(reg(1)), 0b0000_0110);

        state.arch.set_gpr(reg(2), 0b0000_0011);
        let _ = run(&mut state, encode(0x6, 1, 2), 1);
        assert_eq!(state.arch.gpr(reg(1)), 0b0000_0101);

        let _ = run(&mut state, encode(0x8, 1, 5), 2);
        assert_eq!(state.arch.gpr(reg(1)), 0b1010_0000);

        let _ = run(&mut state, encode(0x9, 1, 2), 3);
        assert_eq!(state.arch.gpr(reg(1)), 0b1110_1000);
        assert_eq!(state.arch.sreg(), SREG_N);
    }

    #[test]
    fn writes_to_r0_are_suppressed_but_flags_update() {
        let mut state = CoreState::default();

        let _ = run(&mut state, encode(0x3, 0, -1), 0);

        assert_eq!(state.arch.gpr(GeneralRegister::R0), 0);
        assert_eq!(state.arch.sreg(), SREG_N);
    }

    #[test]
    fn store_then_load_round_trips_through_data_store() {
        let mut state = CoreState::default();
        state.arch.set_gpr(reg(1), 0x5A);
        state.arch.set_sreg(SREG_C);

        let _ = run(&mut state, encode(0xB, 1, 10), 0);
        assert_eq!(state.data.read(10), 0x5A);
        assert_eq!(state.arch.sreg(), SREG_C);

        let _ = run(&mut state, encode(0xA, 2, 10), 1);
        assert_eq!(state.arch.gpr(reg(2)), 0x5A);
        assert_eq!(state.arch.sreg(), 0);
    }

    #[test]
    fn store_uses_live_register_value() {
        let mut state = CoreState::default();
        state.arch.set_gpr(reg(1), 1);
        stage(&mut state, encode(0xB, 1, 3), 0);
        state.arch.set_gpr(reg(1), 2);

        let _ = execute_stage(&mut state, &mut NullTraceSink);

        assert_eq!(state.data.read(3), 2);
    }

    #[test]
    fn negative_address_load_reads_zero_and_store_is_dropped() {
        let mut state = CoreState::default();
        state.arch.set_gpr(reg(1), 0x77);
        state.arch.set_gpr(reg(2), 0x11);

        let _ = run(&mut state, encode(0xB, 1, -1), 0);
        assert!(state.data.bytes().iter().all(|byte| *byte == 0));

        let _ = run(&mut state, encode(0xA, 2, -1), 1);
        assert_eq!(state.arch.gpr(reg(2)), 0);
        assert_eq!(state.arch.sreg(), SREG_Z);
    }

    #[test]
    fn beqz_taken_redirects_and_flushes() {
        let mut state = CoreState::default();
        state.arch.set_sreg(SREG_C);
        state.if_id.valid = true;

        let outcome = run(&mut state, encode(0x4, 1, -2), 10);

        assert_eq!(outcome, ExecuteOutcome::Redirected { pc: 10, target: 9 });
        assert_eq!(state.arch.pc(), 9);
        assert!(!state.if_id.valid);
        assert!(!state.id_ex.valid);
        assert_eq!(state.arch.sreg(), SREG_C);
    }

    #[test]
    fn beqz_uses_live_register_not_snapshot() {
        let mut state = CoreState::default();
        stage(&mut state, encode(0x4, 1, 5), 0);
        state.arch.set_gpr(reg(1), 9);

        let outcome = execute_stage(&mut state, &mut NullTraceSink);

        assert_eq!(outcome, ExecuteOutcome::Retired { pc: 0 });
    }

    #[test]
    fn beqz_not_taken_updates_flags_without_write_back() {
        let mut state = CoreState::default();
        state.arch.set_gpr(reg(1), 4);
        state.arch.set_pc(3);
        state.if_id.valid = true;

        let outcome = run(&mut state, encode(0x4, 1, 5), 1);

        assert_eq!(outcome, ExecuteOutcome::Retired { pc: 1 });
        assert_eq!(state.arch.pc(), 3);
        assert_eq!(state.arch.gpr(reg(1)), 4);
        assert_eq!(state.arch.sreg(), SREG_Z);
        assert!(state.if_id.valid);
    }

    #[test]
    fn br_jumps_to_register_pair() {
        let mut state = CoreState::default();
        state.arch.set_gpr(reg(1), 0x01);
        state.arch.set_gpr(reg(2), 0x02);
        state.arch.set_sreg(SREG_Z);
        state.if_id.valid = true;

        let outcome = run(&mut state, encode(0x7, 1, 2), 4);

        assert_eq!(
            outcome,
            ExecuteOutcome::Redirected {
                pc: 4,
                target: 0x0102
            }
        );
        assert_eq!(state.arch.pc(), 0x0102);
        assert!(!state.if_id.valid);
        assert!(!state.id_ex.valid);
        assert_eq!(state.arch.sreg(), SREG_Z);
    }

    #[test]
    fn reserved_opcode_is_flag_updating_noop() {
        let mut state = CoreState::default();
        state.arch.set_gpr(reg(1), 0x42);
        state.arch.set_sreg(SREG_C | SREG_N);

        let outcome = run(&mut state, encode(0xC, 1, 2), 0);

        assert_eq!(outcome, ExecuteOutcome::Retired { pc: 0 });
        assert_eq!(state.arch.gpr(reg(1)), 0x42);
        assert_eq!(state.arch.sreg(), SREG_Z);
        assert!(!state.id_ex.valid);
    }

    #[test]
    fn alu_reads_decode_time_snapshot() {
        let mut state = CoreState::default();
        state.arch.set_gpr(reg(1), 1);
        state.arch.set_gpr(reg(2), 1);
        stage(&mut state, encode(0x0, 1, 2), 0);
        state.arch.set_gpr(reg(2), 100);

        let _ = execute_stage(&mut state, &mut NullTraceSink);

        assert_eq!(state.arch.gpr(reg(1)), 2);
    }
}
