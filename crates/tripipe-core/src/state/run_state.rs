/// Host-observable pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Instructions are in flight or the program counter is still in range.
    #[default]
    Running,
    /// Every latch is empty and the program counter has reached the store bound.
    Drained,
}

impl RunState {
    /// Returns true once the pipeline has fully drained.
    #[must_use]
    pub const fn is_drained(self) -> bool {
        matches!(self, Self::Drained)
    }
}
