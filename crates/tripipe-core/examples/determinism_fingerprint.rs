//! Run fingerprint generator for cross-host determinism comparison.
//!
//! Runs a fixed branch-heavy program to completion and prints an FNV-1a hash
//! over the final registers, flags, `PC`, data store and counters.

use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;
use tripipe_core::{encode, run_until_drained, CoreConfig, CoreState, RunStop};

const PROGRAM: [u16; 11] = [
    encode(0x3, 1, 12), // MOVI R1 12
    encode(0x3, 2, 1),  // MOVI R2 1
    encode(0x3, 3, -1), // MOVI R3 -1
    encode(0x2, 2, 1),  // MUL R2 R1
    encode(0x6, 2, 1),  // EOR R2 R1
    encode(0x8, 2, 1),  // SAL R2 1
    encode(0xB, 2, 5),  // STR R2 5
    encode(0x0, 1, 3),  // ADD R1 R3
    encode(0x4, 1, 1),  // BEQZ R1 1
    encode(0x4, 0, -7), // BEQZ R0 -7
    encode(0xA, 4, 5),  // LDR R4 5
];

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn fingerprint() -> String {
    let mut state = CoreState::with_program(&PROGRAM).expect("program fits");
    let outcome = run_until_drained(&mut state, &CoreConfig::default(), |_, _| {});
    assert_eq!(outcome.stop, RunStop::Drained, "fingerprint program must drain");

    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    hash_bytes(&mut hash, &outcome.cycles.to_le_bytes());
    hash_bytes(&mut hash, state.arch.registers());
    hash_bytes(&mut hash, &[state.arch.sreg()]);
    hash_bytes(&mut hash, &state.arch.pc().to_le_bytes());
    hash_bytes(&mut hash, state.data.bytes());
    hash_bytes(&mut hash, &state.stats.retired.to_le_bytes());
    hash_bytes(&mut hash, &state.stats.flushes.to_le_bytes());

    format!("{hash:016x}")
}

fn main() {
    println!("{}", fingerprint());
}
