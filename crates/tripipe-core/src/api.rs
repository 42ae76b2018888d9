//! Public host-facing API for embedding the pipeline core.
//!
//! A host builds a [`CoreState`] from a program, then drives it with
//! [`step_cycle`] or [`run_until_drained`].

use tracing::info;

use crate::error::ImageError;
use crate::memory::{DataStore, InstructionStore};
use crate::pipeline::{advance_cycle, is_drained};
use crate::state::{ArchitecturalState, ExecuteShadow, IdExLatch, IfIdLatch, RunState};

/// Default cycle budget for [`run_until_drained`].
pub const DEFAULT_MAX_CYCLES: u64 = 1_000_000;

/// Top-level immutable configuration for a core instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreConfig {
    /// Cycles [`run_until_drained`] may spend before giving up.
    pub max_cycles: u64,
    /// Enables trace callback dispatch.
    pub tracing_enabled: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_cycles: DEFAULT_MAX_CYCLES,
            tracing_enabled: false,
        }
    }
}

/// Counters accumulated while the pipeline advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreStats {
    /// Cycles advanced since load or reset.
    pub cycles: u64,
    /// Instructions that completed execute.
    pub retired: u64,
    /// Taken `BEQZ`/`BR` transfers.
    pub flushes: u64,
    /// `STR` writes that landed inside the data store.
    pub data_writes: u64,
}

/// Complete host-visible core state.
///
/// Fields are public so reporters and tests can inspect latches directly; the
/// pipeline itself only mutates them through the stage functions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreState {
    /// Register file, `SREG` and `PC`.
    pub arch: ArchitecturalState,
    /// Program words; zero marks the end of the program.
    pub instructions: InstructionStore,
    /// Byte-addressed data store.
    pub data: DataStore,
    /// Fetch-to-decode latch.
    pub if_id: IfIdLatch,
    /// Decode-to-execute latch.
    pub id_ex: IdExLatch,
    /// What execute picked up in the most recent cycle.
    pub ex_shadow: ExecuteShadow,
    /// Whether the pipeline has drained.
    pub run_state: RunState,
    /// Counters since load or reset.
    pub stats: CoreStats,
}

impl CoreState {
    /// Creates a core with `program` loaded from instruction address zero.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::TooManyWords`] if `program` does not fit.
    pub fn with_program(program: &[u16]) -> Result<Self, ImageError> {
        let instructions = InstructionStore::from_words(program)?;
        info!(words = program.len(), "program loaded");
        Ok(Self {
            instructions,
            ..Self::default()
        })
    }

    /// Creates a core from a big-endian binary image.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError`] if the image has an odd length or is too large.
    pub fn from_image(bytes: &[u8]) -> Result<Self, ImageError> {
        let instructions = InstructionStore::from_image(bytes)?;
        info!(bytes = bytes.len(), "image loaded");
        Ok(Self {
            instructions,
            ..Self::default()
        })
    }

    /// Returns every piece of run state to power-on values.
    ///
    /// The instruction store is kept so the same program can be re-run.
    pub fn reset(&mut self) {
        self.arch = ArchitecturalState::default();
        self.data.clear();
        self.if_id = IfIdLatch::default();
        self.id_ex = IdExLatch::default();
        self.ex_shadow = ExecuteShadow::default();
        self.run_state = RunState::Running;
        self.stats = CoreStats::default();
    }
}

/// Result of a single [`step_cycle`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// One cycle advanced; the pipeline still has work.
    Advanced,
    /// The pipeline has fully drained.
    Drained,
}

/// Why [`run_until_drained`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStop {
    /// Pipeline drained after the last fetch.
    Drained,
    /// `max_cycles` reached before draining.
    BudgetExhausted,
}

/// Aggregated outcome from running cycles until a stop condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunOutcome {
    /// Cycles advanced during this call.
    pub cycles: u64,
    /// Stop condition that ended the run.
    pub stop: RunStop,
}

/// Stable snapshot wire-version identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u16)]
pub enum SnapshotVersion {
    /// Initial schema revision.
    V1 = 1,
}

impl SnapshotVersion {
    /// Converts wire value to known snapshot version.
    #[must_use]
    pub const fn from_u16(version: u16) -> Option<Self> {
        match version {
            1 => Some(Self::V1),
            _ => None,
        }
    }
}

/// Serializable full-state snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreSnapshot {
    /// Snapshot schema version.
    pub version: SnapshotVersion,
    /// Full host-visible core state.
    pub state: CoreState,
}

impl CoreSnapshot {
    /// Captures the current state under the newest schema version.
    #[must_use]
    pub fn capture(state: &CoreState) -> Self {
        Self {
            version: SnapshotVersion::V1,
            state: state.clone(),
        }
    }
}

/// Trace events emitted in pipeline order when tracing is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// Instruction placed in `IF/ID`.
    Fetched {
        /// Fetch address.
        pc: u16,
        /// Raw instruction word.
        instruction: u16,
    },
    /// Zero word read; no more instructions will be fetched.
    EndOfProgram {
        /// Address of the sentinel.
        pc: u16,
    },
    /// Instruction promoted into `ID/EX`.
    Decoded {
        /// Fetch-time program counter.
        pc: u16,
        /// Raw instruction word.
        instruction: u16,
    },
    /// Instruction finished execute.
    Retired {
        /// Fetch-time program counter.
        pc: u16,
        /// Raw instruction word.
        instruction: u16,
    },
    /// Taken control transfer discarded `IF/ID` and `ID/EX`.
    Flushed {
        /// Fetch-time program counter of the branch.
        pc: u16,
        /// New program counter.
        target: u16,
    },
    /// Register file write that was not suppressed.
    RegisterWrite {
        /// Register number.
        reg: u8,
        /// Value written.
        value: u8,
    },
    /// Data store write that landed in range.
    DataWrite {
        /// Byte address.
        addr: u16,
        /// Value written.
        value: u8,
    },
}

/// Sink trait for trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn on_event(&mut self, _event: TraceEvent) {}
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// Advances one cycle and reports whether the pipeline has drained.
///
/// Once drained, further calls return [`StepOutcome::Drained`] without
/// touching state. Events reach `trace` only when
/// [`CoreConfig::tracing_enabled`] is set.
pub fn step_cycle(
    state: &mut CoreState,
    config: &CoreConfig,
    trace: Option<&mut dyn TraceSink>,
) -> StepOutcome {
    if state.run_state.is_drained() {
        return StepOutcome::Drained;
    }

    let mut null_sink = NullTraceSink;
    let sink: &mut dyn TraceSink = match trace {
        Some(sink) if config.tracing_enabled => sink,
        _ => &mut null_sink,
    };
    advance_cycle(state, sink);

    if is_drained(state) {
        state.run_state = RunState::Drained;
        StepOutcome::Drained
    } else {
        StepOutcome::Advanced
    }
}

/// Runs cycles until the pipeline drains or `config.max_cycles` is spent.
///
/// `observer` is called after every cycle that leaves work in flight, with a
/// 1-based count of such cycles; the draining cycle is not observed.
pub fn run_until_drained<F>(state: &mut CoreState, config: &CoreConfig, mut observer: F) -> RunOutcome
where
    F: FnMut(u64, &CoreState),
{
    let mut cycles = 0;
    if state.run_state.is_drained() {
        return RunOutcome {
            cycles,
            stop: RunStop::Drained,
        };
    }

    while cycles < config.max_cycles {
        let step = step_cycle(state, config, None);
        cycles += 1;
        if step == StepOutcome::Drained {
            info!(cycles, retired = state.stats.retired, "pipeline drained");
            return RunOutcome {
                cycles,
                stop: RunStop::Drained,
            };
        }
        observer(cycles, state);
    }

    info!(cycles, "cycle budget exhausted");
    RunOutcome {
        cycles,
        stop: RunStop::BudgetExhausted,
    }
}
