//! `SREG` update behaviors for different instruction classes.

use crate::state::{SREG_C, SREG_N, SREG_S, SREG_V, SREG_Z};

/// Describes how `SREG` should be updated after an instruction executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagsUpdate {
    /// No change to `SREG`.
    #[default]
    None,
    /// Rebuild `SREG` from scratch for `result`.
    ///
    /// `carry`, `overflow` and the sign flag are only ever set by `ADD`/`SUB`.
    Recompute {
        /// 8-bit result.
        result: u8,
        /// Carry out of bit 7.
        carry: bool,
        /// Signed overflow.
        overflow: bool,
        /// Produced by `ADD`/`SUB`; enables the sign flag.
        arithmetic: bool,
    },
}

impl FlagsUpdate {
    /// Zero/negative-only update for non-arithmetic results.
    #[must_use]
    pub const fn logical(result: u8) -> Self {
        Self::Recompute {
            result,
            carry: false,
            overflow: false,
            arithmetic: false,
        }
    }

    /// Full update for an `ADD`/`SUB` result.
    #[must_use]
    pub const fn arithmetic(result: u8, carry: bool, overflow: bool) -> Self {
        Self::Recompute {
            result,
            carry,
            overflow,
            arithmetic: true,
        }
    }

    /// Returns the new `SREG` value given the current one.
    #[must_use]
    pub const fn apply(self, sreg: u8) -> u8 {
        match self {
            Self::None => sreg,
            Self::Recompute {
                result,
                carry,
                overflow,
                arithmetic,
            } => {
                let negative = result & 0x80 != 0;
                let mut flags = 0;
                if result == 0 {
                    flags |= SREG_Z;
                }
                if negative {
                    flags |= SREG_N;
                }
                if carry {
                    flags |= SREG_C;
                }
                if overflow {
                    flags |= SREG_V;
                }
                if arithmetic && (negative ^ overflow) {
                    flags |= SREG_S;
                }
                flags
            }
        }
    }
}
