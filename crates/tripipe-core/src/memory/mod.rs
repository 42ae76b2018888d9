//! Harvard instruction and data stores.

/// Bounds policy helpers for both stores.
pub mod access;

pub use access::{data_slot, immediate_address, instruction_slot};

use crate::error::ImageError;

/// Program-counter value that marks the end of the program.
pub const INSTRUCTION_STORE_BOUND: u16 = 1024;
/// Number of 16-bit slots in the instruction store.
pub const INSTRUCTION_STORE_WORDS: usize = INSTRUCTION_STORE_BOUND as usize;
/// Number of bytes in the data store.
pub const DATA_STORE_BYTES: usize = 2048;

/// Word-addressed instruction store; zero slots mean "no instruction".
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct InstructionStore {
    words: Box<[u16]>,
}

impl Default for InstructionStore {
    fn default() -> Self {
        Self {
            words: vec![0; INSTRUCTION_STORE_WORDS].into_boxed_slice(),
        }
    }
}

impl InstructionStore {
    /// Builds a store with `program` placed from slot 0; remaining slots are zero.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::TooManyWords`] when `program` does not fit.
    pub fn from_words(program: &[u16]) -> Result<Self, ImageError> {
        if program.len() > INSTRUCTION_STORE_WORDS {
            return Err(ImageError::TooManyWords {
                words: program.len(),
                capacity: INSTRUCTION_STORE_WORDS,
            });
        }
        let mut store = Self::default();
        store.words[..program.len()].copy_from_slice(program);
        Ok(store)
    }

    /// Builds a store from a big-endian binary image.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::OddLength`] for a truncated trailing word and
    /// [`ImageError::TooManyWords`] when the image does not fit.
    pub fn from_image(bytes: &[u8]) -> Result<Self, ImageError> {
        Self::from_words(&decode_image(bytes)?)
    }

    /// Reads the word at `pc`, or the zero sentinel when `pc` is out of range.
    #[must_use]
    pub fn word(&self, pc: u16) -> u16 {
        instruction_slot(pc).map_or(0, |slot| self.words[slot])
    }

    /// Read-only view of every slot.
    #[must_use]
    pub fn words(&self) -> &[u16] {
        &self.words
    }
}

/// Byte-addressed data store with silent out-of-range handling.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DataStore {
    bytes: Box<[u8]>,
}

impl Default for DataStore {
    fn default() -> Self {
        Self {
            bytes: vec![0; DATA_STORE_BYTES].into_boxed_slice(),
        }
    }
}

impl DataStore {
    /// Reads a byte; addresses at or beyond [`DATA_STORE_BYTES`] read as zero.
    #[must_use]
    pub fn read(&self, addr: u16) -> u8 {
        data_slot(addr).map_or(0, |slot| self.bytes[slot])
    }

    /// Writes a byte; out-of-range writes are dropped. Returns whether it landed.
    pub fn write(&mut self, addr: u16, value: u8) -> bool {
        match data_slot(addr) {
            Some(slot) => {
                self.bytes[slot] = value;
                true
            }
            None => false,
        }
    }

    /// Read-only view of every byte.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Zeroes the whole store.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }
}

/// Splits a big-endian binary image into instruction words.
///
/// # Errors
///
/// Returns [`ImageError::OddLength`] when `bytes` has a dangling byte.
pub fn decode_image(bytes: &[u8]) -> Result<Vec<u16>, ImageError> {
    if bytes.len() % 2 != 0 {
        return Err(ImageError::OddLength { len: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect())
}

/// Serializes instruction words into a big-endian binary image.
#[must_use]
pub fn encode_image(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_be_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::{
        decode_image, encode_image, DataStore, InstructionStore, DATA_STORE_BYTES,
        INSTRUCTION_STORE_BOUND, INSTRUCTION_STORE_WORDS,
    };
    use crate::error::ImageError;

    #[test]
    fn stores_are_zeroed_at_their_fixed_sizes() {
        let instructions = InstructionStore::default();
        let data = DataStore::default();

        assert_eq!(instructions.words().len(), INSTRUCTION_STORE_WORDS);
        assert_eq!(data.bytes().len(), DATA_STORE_BYTES);
        assert!(instructions.words().iter().all(|word| *word == 0));
        assert!(data.bytes().iter().all(|byte| *byte == 0));
        assert_eq!(INSTRUCTION_STORE_BOUND, 1024);
    }

    #[test]
    fn program_is_placed_from_slot_zero() {
        let store = InstructionStore::from_words(&[0x30C5, 0x0042]).expect("fits");

        assert_eq!(store.word(0), 0x30C5);
        assert_eq!(store.word(1), 0x0042);
        assert_eq!(store.word(2), 0);
        assert_eq!(store.word(INSTRUCTION_STORE_BOUND), 0);
    }

    #[test]
    fn oversized_program_is_rejected() {
        let program = vec![0x3041; INSTRUCTION_STORE_WORDS + 1];
        assert_eq!(
            InstructionStore::from_words(&program),
            Err(ImageError::TooManyWords {
                words: 1025,
                capacity: 1024
            })
        );
        assert!(InstructionStore::from_words(&program[..INSTRUCTION_STORE_WORDS]).is_ok());
    }

    #[test]
    fn data_store_reads_zero_and_drops_writes_out_of_range() {
        let mut data = DataStore::default();

        assert!(data.write(2047, 0x5A));
        assert_eq!(data.read(2047), 0x5A);
        assert!(!data.write(2048, 0x5A));
        assert_eq!(data.read(2048), 0);
        assert_eq!(data.read(u16::MAX), 0);

        data.clear();
        assert_eq!(data.read(2047), 0);
    }

    #[test]
    fn image_words_are_big_endian() {
        assert_eq!(encode_image(&[0x30C5, 0x0042]), [0x30, 0xC5, 0x00, 0x42]);
        assert_eq!(
            decode_image(&[0x30, 0xC5, 0x00, 0x42]),
            Ok(vec![0x30C5, 0x0042])
        );
    }

    #[test]
    fn odd_length_image_is_rejected() {
        assert_eq!(
            decode_image(&[0x30, 0xC5, 0x00]),
            Err(ImageError::OddLength { len: 3 })
        );
        assert!(InstructionStore::from_image(&[0x00]).is_err());
    }
}
