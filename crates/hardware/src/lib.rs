//! APEX Pipeline Simulator Library.
//!
//! This crate implements a cycle-accurate simulator for the APEX educational
//! instruction set: an in-order five-stage pipeline with scoreboard-based
//! hazard tracking, in two variants.
//!
//! # Architecture
//!
//! * **Scalar**: fetch, decode/RF, execute, memory, writeback — one
//!   instruction per stage.
//! * **Multi-FU**: decode dispatches to parallel Integer (1 cycle),
//!   Multiplier (3 cycles), and Load/Store (4 cycles) units; a completion
//!   queue keeps writeback in program order across the latencies; a
//!   zero-flag-pending hazard gates conditional branches.
//!
//! # Modules
//!
//! * `common`: errors, the register file, and data memory.
//! * `config`: configuration loading and defaults.
//! * `core`: architectural state, execution units, and the pipeline engines.
//! * `isa`: the APEX opcode set and instruction record.
//! * `sim`: the assembly loader and the simulation run loop.
//! * `stats`: run statistics collection.

/// Errors, the architectural register file, and flat data memory.
pub mod common;

/// Configuration structures, defaults, and JSON loading.
pub mod config;

/// CPU state, execution units, and the two pipeline engine variants.
pub mod core;

/// APEX instruction set definitions and disassembly.
pub mod isa;

/// Program loading and the cycle-driver run loop.
pub mod sim;

/// Simulation statistics collection and reporting.
pub mod stats;
