//! Shared helpers for the pipeline integration tests.

#![allow(dead_code)]

use apexsim_core::config::Config;
use apexsim_core::core::pipeline::engine::EngineKind;
use apexsim_core::sim::loader::parse_program;
use apexsim_core::sim::{RunOutcome, Simulator};

/// Builds a simulator over `asm` with the default machine and the given
/// engine variant.
pub fn simulator(variant: EngineKind, asm: &str) -> Simulator {
    let mut config = Config::default();
    config.pipeline.variant = variant;
    let program = parse_program(asm).expect("test program parses");
    Simulator::new(program, &config).expect("test program fits the machine")
}

/// Runs `asm` to a retired HALT and returns the finished simulator.
///
/// Panics if the program does not halt within 500 cycles, which in these
/// tests means the pipeline wedged.
pub fn run_to_halt(variant: EngineKind, asm: &str) -> Simulator {
    let mut sim = simulator(variant, asm);
    assert_eq!(sim.run(Some(500)), RunOutcome::HaltRetired, "program did not halt");
    sim
}
