/// Number of architecturally visible general-purpose registers (`R0..R63`).
pub const GENERAL_REGISTER_COUNT: usize = 64;
/// `SREG` bit for signed comparison sign (`N ^ V`).
pub const SREG_S: u8 = 1 << 0;
/// `SREG` bit for negative result.
pub const SREG_N: u8 = 1 << 1;
/// `SREG` bit for signed overflow.
pub const SREG_V: u8 = 1 << 2;
/// `SREG` bit for carry.
pub const SREG_C: u8 = 1 << 3;
/// `SREG` bit for zero result.
pub const SREG_Z: u8 = 1 << 4;
/// Mask of architecturally active `SREG` bits (`C/V/N/S/Z`).
pub const SREG_ACTIVE_MASK: u8 = SREG_C | SREG_V | SREG_N | SREG_S | SREG_Z;

/// General-purpose register index taken from a 6-bit instruction field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct GeneralRegister(u8);

impl GeneralRegister {
    /// The hard-wired zero register.
    pub const R0: Self = Self(0);

    /// Creates a register index, rejecting values outside `0..=63`.
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < GENERAL_REGISTER_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Decodes a 6-bit register field; upper bits are discarded.
    #[must_use]
    pub const fn from_u6(bits: u8) -> Self {
        Self(bits & 0x3F)
    }

    /// Returns the register number (`0..=63`).
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Returns the array index for this register.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns true for the hard-wired zero register.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for GeneralRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Register file, status register and program counter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ArchitecturalState {
    gpr: Box<[u8]>,
    sreg: u8,
    pc: u16,
}

impl Default for ArchitecturalState {
    fn default() -> Self {
        Self {
            gpr: vec![0; GENERAL_REGISTER_COUNT].into_boxed_slice(),
            sreg: 0,
            pc: 0,
        }
    }
}

impl ArchitecturalState {
    /// Reads a general-purpose register.
    #[must_use]
    pub fn gpr(&self, reg: GeneralRegister) -> u8 {
        self.gpr[reg.index()]
    }

    /// Writes a general-purpose register.
    ///
    /// Writes to `R0` are suppressed; returns whether the write landed.
    pub fn set_gpr(&mut self, reg: GeneralRegister, value: u8) -> bool {
        if reg.is_zero() {
            return false;
        }
        self.gpr[reg.index()] = value;
        true
    }

    /// Read-only view of all 64 registers in index order.
    #[must_use]
    pub fn registers(&self) -> &[u8] {
        &self.gpr
    }

    /// Reads the `SREG` register.
    #[must_use]
    pub const fn sreg(&self) -> u8 {
        self.sreg
    }

    /// Writes the `SREG` register.
    pub const fn set_sreg(&mut self, value: u8) {
        self.sreg = value & SREG_ACTIVE_MASK;
    }

    /// Returns `true` when a specific `SREG` bit is set.
    #[must_use]
    pub const fn flag_is_set(&self, flag: u8) -> bool {
        (self.sreg & flag) != 0
    }

    /// Reads the `PC` register.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Writes the `PC` register.
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }
}
