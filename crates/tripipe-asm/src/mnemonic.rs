//! Mnemonic resolution derived from the core opcode table.

use std::sync::OnceLock;

use tripipe_core::{Opcode, OperandForm, OPCODE_ENCODING_TABLE};

/// Lookup result for a parsed mnemonic: `(OP, Opcode, OperandForm)`.
pub type MnemonicResolution = (u8, Opcode, OperandForm);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MnemonicEntry {
    name: &'static str,
    op: u8,
    opcode: Opcode,
    form: OperandForm,
}

const MNEMONIC_ENTRIES: &[MnemonicEntry] = &[
    MnemonicEntry {
        name: "ADD",
        op: 0x0,
        opcode: Opcode::Add,
        form: OperandForm::TwoRegister,
    },
    MnemonicEntry {
        name: "SUB",
        op: 0x1,
        opcode: Opcode::Sub,
        form: OperandForm::TwoRegister,
    },
    MnemonicEntry {
        name: "MUL",
        op: 0x2,
        opcode: Opcode::Mul,
        form: OperandForm::TwoRegister,
    },
    MnemonicEntry {
        name: "MOVI",
        op: 0x3,
        opcode: Opcode::Movi,
        form: OperandForm::RegisterImmediate,
    },
    MnemonicEntry {
        name: "BEQZ",
        op: 0x4,
        opcode: Opcode::Beqz,
        form: OperandForm::RegisterImmediate,
    },
    MnemonicEntry {
        name: "ANDI",
        op: 0x5,
        opcode: Opcode::Andi,
        form: OperandForm::RegisterImmediate,
    },
    MnemonicEntry {
        name: "EOR",
        op: 0x6,
        opcode: Opcode::Eor,
        form: OperandForm::TwoRegister,
    },
    MnemonicEntry {
        name: "BR",
        op: 0x7,
        opcode: Opcode::Br,
        form: OperandForm::TwoRegister,
    },
    MnemonicEntry {
        name: "SAL",
        op: 0x8,
        opcode: Opcode::Sal,
        form: OperandForm::RegisterImmediate,
    },
    MnemonicEntry {
        name: "SAR",
        op: 0x9,
        opcode: Opcode::Sar,
        form: OperandForm::RegisterImmediate,
    },
    MnemonicEntry {
        name: "LDR",
        op: 0xA,
        opcode: Opcode::Ldr,
        form: OperandForm::RegisterImmediate,
    },
    MnemonicEntry {
        name: "STR",
        op: 0xB,
        opcode: Opcode::Str,
        form: OperandForm::RegisterImmediate,
    },
];

fn entries_verified_against_core() -> &'static [MnemonicEntry] {
    static VERIFIED_ENTRIES: OnceLock<Vec<MnemonicEntry>> = OnceLock::new();
    VERIFIED_ENTRIES.get_or_init(|| {
        for entry in MNEMONIC_ENTRIES {
            let matches_core = OPCODE_ENCODING_TABLE.iter().any(|(op, opcode)| {
                *op == entry.op
                    && *opcode == entry.opcode
                    && opcode.mnemonic() == entry.name
                    && opcode.operand_form() == entry.form
            });
            assert!(
                matches_core,
                "mnemonic table diverged from tripipe-core table"
            );
        }
        MNEMONIC_ENTRIES.to_vec()
    })
}

/// Resolves a mnemonic string to its `(OP, Opcode, OperandForm)` tuple.
///
/// Matching is ASCII case-insensitive.
#[must_use]
pub fn resolve_mnemonic(name: &str) -> Option<MnemonicResolution> {
    entries_verified_against_core()
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
        .map(|entry| (entry.op, entry.opcode, entry.form))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use tripipe_core::{Opcode, OperandForm, OPCODE_ENCODING_TABLE};

    use super::{resolve_mnemonic, MNEMONIC_ENTRIES};

    #[test]
    fn every_mnemonic_resolves_to_expected_op_and_form() {
        for entry in MNEMONIC_ENTRIES {
            assert_eq!(
                resolve_mnemonic(entry.name),
                Some((entry.op, entry.opcode, entry.form))
            );
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(
            resolve_mnemonic("movi"),
            Some((0x3, Opcode::Movi, OperandForm::RegisterImmediate))
        );
        assert_eq!(
            resolve_mnemonic("bEqZ"),
            Some((0x4, Opcode::Beqz, OperandForm::RegisterImmediate))
        );
    }

    #[test]
    fn unknown_mnemonic_returns_none() {
        assert_eq!(resolve_mnemonic("NOP"), None);
        assert_eq!(resolve_mnemonic("HALT"), None);
        assert_eq!(resolve_mnemonic(""), None);
    }

    #[test]
    fn mnemonic_table_covers_all_assigned_opcodes() {
        let table_ops: HashSet<_> = MNEMONIC_ENTRIES.iter().map(|entry| entry.op).collect();
        let core_ops: HashSet<_> = OPCODE_ENCODING_TABLE.iter().map(|(op, _)| *op).collect();

        assert_eq!(core_ops.len(), 12);
        assert_eq!(table_ops, core_ops);
    }
}
