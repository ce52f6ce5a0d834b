//! Pipeline engine selection and type erasure.
//!
//! This module defines the trait the cycle driver runs against and the enum
//! dispatch that lets the non-generic simulator own either engine variant:
//! 1. **`PipelineEngine`** — one clock cycle of the whole pipeline.
//! 2. **`EngineKind`** — configuration-level variant selection.
//! 3. **`EngineDispatch`** — type-erased engine storage.

use serde::Deserialize;

use crate::config::Config;
use crate::core::Cpu;
use crate::core::pipeline::multi::MultiFuEngine;
use crate::core::pipeline::scalar::ScalarEngine;

/// What a cycle left the pipeline in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The pipeline is still working.
    Running,
    /// A HALT retired through writeback; the simulation is complete.
    Halted,
}

/// Pipeline variant selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum EngineKind {
    /// Single function unit: fetch, decode, execute, memory, writeback.
    Scalar,
    /// Three parallel function units behind a shared writeback port
    /// (default).
    #[default]
    MultiFu,
}

/// One pipeline engine: everything downstream of the architectural state.
///
/// A cycle runs the stages in reverse order (writeback first, fetch last) so
/// each stage consumes this cycle's value of its input latch before the
/// upstream stage overwrites it.
pub trait PipelineEngine {
    /// Runs one clock cycle against the CPU state.
    fn cycle(&mut self, cpu: &mut Cpu) -> CycleOutcome;
}

/// Type-erased pipeline engine for storage in the simulator.
#[derive(Debug)]
pub enum EngineDispatch {
    /// Single-FU pipeline.
    Scalar(ScalarEngine),
    /// Multi-FU pipeline.
    MultiFu(Box<MultiFuEngine>),
}

impl EngineDispatch {
    /// Builds the engine the configuration selects.
    pub fn new(config: &Config) -> Self {
        match config.pipeline.variant {
            EngineKind::Scalar => Self::Scalar(ScalarEngine::new()),
            EngineKind::MultiFu => Self::MultiFu(Box::new(MultiFuEngine::new(config))),
        }
    }
}

impl PipelineEngine for EngineDispatch {
    fn cycle(&mut self, cpu: &mut Cpu) -> CycleOutcome {
        match self {
            Self::Scalar(engine) => engine.cycle(cpu),
            Self::MultiFu(engine) => engine.cycle(cpu),
        }
    }
}
