use thiserror::Error;

/// Load-time failures when building an instruction store from a binary image.
///
/// Cycle advancement itself never fails; these surface only before a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ImageError {
    /// Image byte count is not a whole number of 16-bit words.
    #[error("image length {len} is not a multiple of two bytes")]
    OddLength {
        /// Image length in bytes.
        len: usize,
    },
    /// Program does not fit in the instruction store.
    #[error("program has {words} words but the instruction store holds {capacity}")]
    TooManyWords {
        /// Number of words supplied.
        words: usize,
        /// Instruction-store capacity in words.
        capacity: usize,
    },
}
