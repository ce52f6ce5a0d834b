//! Configuration system for the APEX simulator.
//!
//! This module defines all configuration structures used to parameterize a
//! simulation. It provides:
//! 1. **Defaults:** Baseline machine constants (register count, memory size,
//!    PC base, function-unit latencies).
//! 2. **Structures:** Hierarchical config for general, machine, and pipeline
//!    settings.
//! 3. **Loading:** JSON deserialization for configuration files.
//!
//! Configuration is supplied as JSON via `--config`, or `Config::default()`
//! when no file is given.

use serde::Deserialize;

use crate::common::error::SimError;
use crate::core::pipeline::engine::EngineKind;

/// Default configuration constants for the simulator.
mod defaults {
    /// PC value of the first code-memory slot; code index = (pc − base) / 4.
    pub const PC_BASE: i32 = 4000;

    /// Architectural register count.
    pub const REG_FILE_SIZE: usize = 16;

    /// Data-memory size in words.
    pub const DATA_MEMORY_WORDS: usize = 4096;

    /// Integer FU latency in cycles.
    pub const INT_LATENCY: u64 = 1;

    /// Multiplier FU latency in cycles.
    pub const MUL_LATENCY: u64 = 3;

    /// Load/store FU latency in cycles.
    pub const LS_LATENCY: u64 = 4;

    /// Completion-queue capacity.
    ///
    /// Must cover the maximum simultaneously in-flight instructions past
    /// dispatch, bounded by 1 + MUL_LATENCY + LS_LATENCY for the default
    /// latencies.
    pub const COMPLETION_QUEUE_DEPTH: usize = 8;
}

/// Top-level simulator configuration.
///
/// Deserializing from JSON (all sections and fields are optional and fall
/// back to the defaults):
///
/// ```
/// use apexsim_core::config::Config;
/// use apexsim_core::core::pipeline::engine::EngineKind;
///
/// let json = r#"{
///     "general": { "trace": false },
///     "machine": { "reg_file_size": 32, "data_memory_words": 4096 },
///     "pipeline": { "variant": "Scalar", "mul_latency": 3 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.machine.reg_file_size, 32);
/// assert_eq!(config.pipeline.variant, EngineKind::Scalar);
/// assert_eq!(config.pipeline.ls_latency, 4);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Architectural machine parameters.
    #[serde(default)]
    pub machine: MachineConfig,
    /// Pipeline variant and timing parameters.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Deserializes a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] when the JSON does not match the schema.
    pub fn from_json(text: &str) -> Result<Self, SimError> {
        serde_json::from_str(text).map_err(|e| SimError::Config(e.to_string()))
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralConfig {
    /// Print the per-cycle stage trace (the Display/Single_Step modes force
    /// this on).
    #[serde(default)]
    pub trace: bool,
}

/// Architectural machine parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineConfig {
    /// Number of architectural registers.
    #[serde(default = "MachineConfig::default_reg_file_size")]
    pub reg_file_size: usize,

    /// Data-memory size in words.
    #[serde(default = "MachineConfig::default_data_memory_words")]
    pub data_memory_words: usize,

    /// PC value of the first instruction.
    #[serde(default = "MachineConfig::default_pc_base")]
    pub pc_base: i32,
}

impl MachineConfig {
    fn default_reg_file_size() -> usize {
        defaults::REG_FILE_SIZE
    }

    fn default_data_memory_words() -> usize {
        defaults::DATA_MEMORY_WORDS
    }

    fn default_pc_base() -> i32 {
        defaults::PC_BASE
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            reg_file_size: defaults::REG_FILE_SIZE,
            data_memory_words: defaults::DATA_MEMORY_WORDS,
            pc_base: defaults::PC_BASE,
        }
    }
}

/// Pipeline variant selection and per-FU timing.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Which pipeline engine to run.
    #[serde(default)]
    pub variant: EngineKind,

    /// Integer FU latency in cycles.
    #[serde(default = "PipelineConfig::default_int_latency")]
    pub int_latency: u64,

    /// Multiplier FU latency in cycles.
    #[serde(default = "PipelineConfig::default_mul_latency")]
    pub mul_latency: u64,

    /// Load/store FU latency in cycles.
    #[serde(default = "PipelineConfig::default_ls_latency")]
    pub ls_latency: u64,

    /// Completion-queue capacity; must be at least the maximum number of
    /// instructions in flight past dispatch.
    #[serde(default = "PipelineConfig::default_completion_queue_depth")]
    pub completion_queue_depth: usize,
}

impl PipelineConfig {
    fn default_int_latency() -> u64 {
        defaults::INT_LATENCY
    }

    fn default_mul_latency() -> u64 {
        defaults::MUL_LATENCY
    }

    fn default_ls_latency() -> u64 {
        defaults::LS_LATENCY
    }

    fn default_completion_queue_depth() -> usize {
        defaults::COMPLETION_QUEUE_DEPTH
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            variant: EngineKind::default(),
            int_latency: defaults::INT_LATENCY,
            mul_latency: defaults::MUL_LATENCY,
            ls_latency: defaults::LS_LATENCY,
            completion_queue_depth: defaults::COMPLETION_QUEUE_DEPTH,
        }
    }
}
