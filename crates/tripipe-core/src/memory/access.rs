//! Bounds policy for the two Harvard stores.
//!
//! Neither store faults: out-of-range fetches read the empty sentinel, and
//! out-of-range data accesses read as zero or are dropped.

use super::{DATA_STORE_BYTES, INSTRUCTION_STORE_WORDS};

/// Resolves a program counter to an instruction-store slot.
///
/// `None` when `pc` is at or beyond [`INSTRUCTION_STORE_WORDS`].
#[must_use]
pub const fn instruction_slot(pc: u16) -> Option<usize> {
    let slot = pc as usize;
    if slot < INSTRUCTION_STORE_WORDS {
        Some(slot)
    } else {
        None
    }
}

/// Resolves a data address to a data-store slot.
///
/// `None` when `addr` is at or beyond [`DATA_STORE_BYTES`].
#[must_use]
pub const fn data_slot(addr: u16) -> Option<usize> {
    let slot = addr as usize;
    if slot < DATA_STORE_BYTES {
        Some(slot)
    } else {
        None
    }
}

/// Converts a signed immediate into the 16-bit data address it names.
///
/// Negative immediates wrap to the top of the address space and therefore
/// land outside the data store.
#[must_use]
pub const fn immediate_address(imm: i8) -> u16 {
    imm as i16 as u16
}
