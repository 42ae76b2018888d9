//! Line parser for tripipe assembly source.
//!
//! Every non-blank line is one instruction: a mnemonic followed by exactly
//! two operands. The first operand is always a register; the second is a
//! register or a signed six-bit immediate depending on the mnemonic.

use thiserror::Error;
use tripipe_core::{GeneralRegister, OperandForm};

use crate::mnemonic::{resolve_mnemonic, MnemonicResolution};

/// Smallest value the six-bit immediate field accepts.
pub const IMMEDIATE_MIN: i64 = -32;
/// Largest value the six-bit immediate field accepts.
pub const IMMEDIATE_MAX: i64 = 31;

/// Second operand of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Register direct (`R0`..`R63`).
    Register(GeneralRegister),
    /// Signed immediate in `[-32, 31]`.
    Immediate(i8),
}

impl Operand {
    /// Value placed in the low six bits of the instruction word.
    #[must_use]
    pub fn field(self) -> i16 {
        match self {
            Self::Register(reg) => i16::from(reg.number()),
            Self::Immediate(value) => i16::from(value),
        }
    }
}

/// A parsed instruction with both operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInstruction {
    /// The mnemonic string as written.
    pub mnemonic: String,
    /// Resolved `(OP, Opcode, OperandForm)` from the mnemonic table.
    pub resolution: MnemonicResolution,
    /// First operand (RS field).
    pub rs: GeneralRegister,
    /// Second operand (RT or IMM field).
    pub operand: Operand,
}

/// A single parsed source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Empty or comment-only line.
    Blank,
    /// Instruction line.
    Instruction {
        /// The parsed instruction.
        instruction: ParsedInstruction,
    },
}

/// Parse error tagged with its 1-indexed source line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// 1-indexed line number.
    pub line: usize,
    /// Kind of parse error.
    pub kind: ParseErrorKind,
}

impl ParseError {
    const fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

/// Classification of parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Mnemonic not in the instruction set.
    #[error("unknown mnemonic: {0}")]
    UnknownMnemonic(String),
    /// Instruction does not have exactly two operands.
    #[error("{mnemonic} expects 2 operands, found {found}")]
    OperandCount {
        /// The mnemonic as written.
        mnemonic: String,
        /// Number of operands supplied.
        found: usize,
    },
    /// Second operand has the wrong kind for the mnemonic.
    #[error("{mnemonic} expects {expected} as its second operand, found `{found}`")]
    FormMismatch {
        /// The mnemonic as written.
        mnemonic: String,
        /// What the mnemonic's operand form requires.
        expected: &'static str,
        /// The offending operand text.
        found: String,
    },
    /// Register name outside `R0`..`R63` or malformed.
    #[error("invalid register: {0}")]
    InvalidRegister(String),
    /// Malformed numeric literal.
    #[error("invalid immediate value: {0}")]
    InvalidImmediate(String),
    /// Immediate does not fit the signed six-bit field.
    #[error("immediate {0} out of range [-32, 31]")]
    ImmediateOutOfRange(i64),
}

/// Result of parsing a single line.
pub type ParseResult = Result<ParsedLine, ParseError>;

/// Parses a source line into a [`ParsedLine`].
///
/// # Errors
///
/// Returns a [`ParseError`] for unknown mnemonics, a wrong operand count,
/// an operand of the wrong kind, a bad register name, or an immediate that
/// is malformed or out of range.
pub fn parse_line(line: &str, line_number: usize) -> ParseResult {
    let tokens = tokenize(strip_comment(line));
    let Some((mnemonic, operands)) = tokens.split_first() else {
        return Ok(ParsedLine::Blank);
    };
    let mnemonic = *mnemonic;

    let resolution = resolve_mnemonic(mnemonic).ok_or_else(|| {
        ParseError::new(
            line_number,
            ParseErrorKind::UnknownMnemonic(mnemonic.to_string()),
        )
    })?;

    let [rs_token, second_token] = operands else {
        return Err(ParseError::new(
            line_number,
            ParseErrorKind::OperandCount {
                mnemonic: mnemonic.to_string(),
                found: operands.len(),
            },
        ));
    };

    let rs = parse_register(rs_token).map_err(|kind| ParseError::new(line_number, kind))?;
    let operand = match resolution.2 {
        OperandForm::TwoRegister => parse_register_operand(mnemonic, second_token),
        OperandForm::RegisterImmediate => parse_immediate_operand(mnemonic, second_token),
    }
    .map_err(|kind| ParseError::new(line_number, kind))?;

    Ok(ParsedLine::Instruction {
        instruction: ParsedInstruction {
            mnemonic: mnemonic.to_string(),
            resolution,
            rs,
            operand,
        },
    })
}

fn strip_comment(line: &str) -> &str {
    line.find([';', '#']).map_or(line, |pos| &line[..pos])
}

fn tokenize(text: &str) -> Vec<&str> {
    text.split([',', ' ', '\t'])
        .filter(|token| !token.is_empty())
        .collect()
}

fn parse_register_operand(mnemonic: &str, token: &str) -> Result<Operand, ParseErrorKind> {
    match parse_register(token) {
        Ok(reg) => Ok(Operand::Register(reg)),
        Err(_) if parse_numeric_value(token).is_ok() => Err(ParseErrorKind::FormMismatch {
            mnemonic: mnemonic.to_string(),
            expected: "a register",
            found: token.to_string(),
        }),
        Err(kind) => Err(kind),
    }
}

fn parse_immediate_operand(mnemonic: &str, token: &str) -> Result<Operand, ParseErrorKind> {
    if parse_register(token).is_ok() {
        return Err(ParseErrorKind::FormMismatch {
            mnemonic: mnemonic.to_string(),
            expected: "an immediate",
            found: token.to_string(),
        });
    }

    let value = parse_numeric_value(token)?;
    if !(IMMEDIATE_MIN..=IMMEDIATE_MAX).contains(&value) {
        return Err(ParseErrorKind::ImmediateOutOfRange(value));
    }
    i8::try_from(value)
        .map(Operand::Immediate)
        .map_err(|_| ParseErrorKind::ImmediateOutOfRange(value))
}

fn parse_register(token: &str) -> Result<GeneralRegister, ParseErrorKind> {
    let invalid = || ParseErrorKind::InvalidRegister(token.to_string());
    let digits = token
        .strip_prefix('R')
        .or_else(|| token.strip_prefix('r'))
        .ok_or_else(invalid)?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    digits
        .parse::<u8>()
        .ok()
        .and_then(GeneralRegister::new)
        .ok_or_else(invalid)
}

#[allow(clippy::option_if_let_else)]
fn parse_numeric_value(token: &str) -> Result<i64, ParseErrorKind> {
    let err = || ParseErrorKind::InvalidImmediate(token.to_string());

    let (negative, unsigned) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    if unsigned.is_empty() || unsigned.starts_with(['+', '-']) {
        return Err(err());
    }

    let magnitude = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).map_err(|_| err())?,
        None => unsigned.parse::<i64>().map_err(|_| err())?,
    };

    Ok(if negative { -magnitude } else { magnitude })
}
