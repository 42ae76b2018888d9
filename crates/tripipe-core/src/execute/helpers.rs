//! 8-bit ALU helpers for instruction execution.

/// Result of an 8-bit add or subtract with its carry and overflow bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArithResult {
    /// Wrapped 8-bit result.
    pub value: u8,
    /// Bit 8 of the 9-bit widened computation.
    pub carry: bool,
    /// Two's-complement overflow.
    pub overflow: bool,
}

/// Wrapping add; carry is bit 8 of the unsigned widened sum.
#[must_use]
pub const fn add8(a: u8, b: u8) -> ArithResult {
    let value = a.wrapping_add(b);
    let wide = a as u16 + b as u16;
    ArithResult {
        value,
        carry: wide & 0x100 != 0,
        overflow: overflow8(a, b, value),
    }
}

/// Wrapping subtract; carry is bit 8 of the sign-extended widened difference.
#[must_use]
pub const fn sub8(a: u8, b: u8) -> ArithResult {
    let value = a.wrapping_sub(b);
    let wide = ((a as i8 as i16) - (b as i8 as i16)) as u16;
    ArithResult {
        value,
        carry: wide & 0x100 != 0,
        overflow: overflow8(a, b, value),
    }
}

/// Overflow test shared by `ADD` and `SUB`: both operands differ in sign from the result.
const fn overflow8(a: u8, b: u8, result: u8) -> bool {
    ((a ^ result) & (b ^ result)) & 0x80 != 0
}

/// Logical left shift; amounts of eight or more shift everything out.
#[must_use]
pub const fn shift_left(value: u8, amount: u8) -> u8 {
    if amount >= 8 {
        0
    } else {
        value << amount
    }
}

/// Arithmetic right shift; amounts of eight or more leave only sign bits.
#[must_use]
pub const fn shift_right_arithmetic(value: u8, amount: u8) -> u8 {
    let shift = if amount >= 8 { 7 } else { amount };
    ((value as i8) >> shift) as u8
}

/// 8-bit pattern of a signed immediate used as an ALU operand.
#[must_use]
pub const fn immediate_operand(imm: i8) -> u8 {
    imm as u8
}
