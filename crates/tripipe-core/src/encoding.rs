/// Bit position of the opcode field (`OP`, bits 15..12).
pub const OPCODE_SHIFT: u16 = 12;
/// Bit position of the source-register field (`RS`, bits 11..6).
pub const RS_SHIFT: u16 = 6;
/// Mask for a 6-bit register or immediate field.
pub const FIELD_MASK: u16 = 0x003F;
/// Mask for the 4-bit opcode field.
pub const OPCODE_MASK: u16 = 0x000F;

/// Assigned opcodes (`OP` field, bits 15..12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Opcode {
    Add = 0x0,
    Sub = 0x1,
    Mul = 0x2,
    Movi = 0x3,
    Beqz = 0x4,
    Andi = 0x5,
    Eor = 0x6,
    Br = 0x7,
    Sal = 0x8,
    Sar = 0x9,
    Ldr = 0xA,
    Str = 0xB,
}

impl Opcode {
    /// Converts a 4-bit opcode value into an assigned opcode.
    ///
    /// `None` means the value is reserved (`0xC..=0xF`) or wider than four bits.
    #[must_use]
    pub const fn from_u4(op: u8) -> Option<Self> {
        match op {
            0x0 => Some(Self::Add),
            0x1 => Some(Self::Sub),
            0x2 => Some(Self::Mul),
            0x3 => Some(Self::Movi),
            0x4 => Some(Self::Beqz),
            0x5 => Some(Self::Andi),
            0x6 => Some(Self::Eor),
            0x7 => Some(Self::Br),
            0x8 => Some(Self::Sal),
            0x9 => Some(Self::Sar),
            0xA => Some(Self::Ldr),
            0xB => Some(Self::Str),
            _ => None,
        }
    }

    /// Returns the 4-bit opcode value.
    #[must_use]
    pub const fn as_u4(self) -> u8 {
        self as u8
    }

    /// Canonical upper-case mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Movi => "MOVI",
            Self::Beqz => "BEQZ",
            Self::Andi => "ANDI",
            Self::Eor => "EOR",
            Self::Br => "BR",
            Self::Sal => "SAL",
            Self::Sar => "SAR",
            Self::Ldr => "LDR",
            Self::Str => "STR",
        }
    }

    /// How the low six bits of an instruction with this opcode are read.
    #[must_use]
    pub const fn operand_form(self) -> OperandForm {
        operand_form(self.as_u4())
    }
}

/// Interpretation of the low six bits of an instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum OperandForm {
    /// Low bits hold an unsigned second-register index.
    TwoRegister,
    /// Low bits hold a signed 6-bit immediate.
    RegisterImmediate,
}

/// Single source-of-truth assigned opcode table.
///
/// Any opcode value not present here is reserved.
pub const OPCODE_ENCODING_TABLE: &[(u8, Opcode)] = &[
    (0x0, Opcode::Add),
    (0x1, Opcode::Sub),
    (0x2, Opcode::Mul),
    (0x3, Opcode::Movi),
    (0x4, Opcode::Beqz),
    (0x5, Opcode::Andi),
    (0x6, Opcode::Eor),
    (0x7, Opcode::Br),
    (0x8, Opcode::Sal),
    (0x9, Opcode::Sar),
    (0xA, Opcode::Ldr),
    (0xB, Opcode::Str),
];

/// Operand form for a raw opcode value.
///
/// Reserved opcodes read their low bits as a register index.
#[must_use]
pub const fn operand_form(op: u8) -> OperandForm {
    match op {
        0x3 | 0x4 | 0x5 | 0x8 | 0x9 | 0xA | 0xB => OperandForm::RegisterImmediate,
        _ => OperandForm::TwoRegister,
    }
}

/// Splits an instruction word into `(OP, RS, low6)` without interpreting the low bits.
#[must_use]
pub const fn decode_fields(word: u16) -> (u8, u8, u8) {
    (
        ((word >> OPCODE_SHIFT) & OPCODE_MASK) as u8,
        ((word >> RS_SHIFT) & FIELD_MASK) as u8,
        (word & FIELD_MASK) as u8,
    )
}

/// Sign-extends a 6-bit two's-complement value into `-32..=31`.
#[must_use]
pub const fn sign_extend_6bit(low6: u8) -> i8 {
    ((low6 << 2) as i8) >> 2
}

/// Packs an instruction word.
///
/// Each field is masked to its width, so negative immediates pack as their
/// 6-bit two's-complement pattern.
#[must_use]
pub const fn encode(op: u8, rs: u8, rt_or_imm: i16) -> u16 {
    ((op as u16 & OPCODE_MASK) << OPCODE_SHIFT)
        | ((rs as u16 & FIELD_MASK) << RS_SHIFT)
        | (rt_or_imm as u16 & FIELD_MASK)
}
