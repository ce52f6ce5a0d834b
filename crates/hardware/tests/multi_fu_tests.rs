//! End-to-end tests for the multi-FU pipeline variant: latency accounting,
//! shared-writeback arbitration, zero-flag serialization, and flushes.

mod common;

use apexsim_core::core::pipeline::engine::{CycleOutcome, EngineKind};
use apexsim_core::sim::RunOutcome;
use proptest::prelude::*;
use rstest::rstest;

use common::{run_to_halt, simulator};

const VARIANT: EngineKind = EngineKind::MultiFu;

#[test]
fn test_in_order_writeback_across_units() {
    // The ADD enters the integer unit after the MUL entered the multiplier,
    // so it must wait at the completion-queue head: R4 may only commit
    // after R3.
    let mut sim = simulator(
        VARIANT,
        "MOVC R1,#2\n\
         MOVC R2,#3\n\
         MUL R3,R1,R2\n\
         ADD R4,R1,R2\n\
         HALT",
    );

    loop {
        let outcome = sim.step();
        let cpu = sim.cpu();
        let r4_committed = cpu.regs.read(4) == 5 && !cpu.regs.is_pending(4);
        if r4_committed {
            assert_eq!(cpu.regs.read(3), 6, "R4 committed before R3");
            assert!(!cpu.regs.is_pending(3));
        }
        if outcome == CycleOutcome::Halted {
            break;
        }
        assert!(sim.cpu().clock < 500, "program did not halt");
    }

    assert_eq!(sim.cpu().regs.read(3), 6);
    assert_eq!(sim.cpu().regs.read(4), 5);
}

// Pins the per-unit latencies (integer 1, multiplier 3, load/store 4): the
// same four-instruction skeleton halts later the longer its third
// instruction occupies its unit.
#[rstest]
#[case::integer("ADD R3,R1,R2", 8)]
#[case::multiplier("MUL R3,R1,R2", 10)]
#[case::load_store("LDR R3,R1,R2", 11)]
fn test_unit_latencies(#[case] body: &str, #[case] expected_clock: u64) {
    let asm = format!("MOVC R1,#2\nMOVC R2,#3\n{body}\nHALT");
    let sim = run_to_halt(VARIANT, &asm);
    assert_eq!(sim.cpu().clock, expected_clock);
    assert_eq!(sim.cpu().stats.instructions_retired, 4);
}

#[test]
fn test_zero_flag_forwarding_across_branch() {
    let sim = run_to_halt(
        VARIANT,
        "MOVC R1,#0\n\
         MOVC R2,#0\n\
         CMP R1,R2\n\
         BZ,#8\n\
         MOVC R5,#99\n\
         MOVC R6,#42\n\
         HALT",
    );
    assert_eq!(sim.cpu().regs.read(5), 0, "fall-through retired despite the flush");
    assert_eq!(sim.cpu().regs.read(6), 42);
    assert_eq!(sim.cpu().stats.branches_taken, 1);
    assert!(sim.cpu().stats.squashed >= 1);
}

#[test]
fn test_branch_waits_for_multiplier_flag_writer() {
    // The MUL produces 0, so Z must be set when the BZ resolves. The BZ
    // reaches decode while the MUL is still mid-flight in the multiplier,
    // so it has to hold there; taking the branch on the stale initial Z
    // (clear) would leave R5 = 99.
    let sim = run_to_halt(
        VARIANT,
        "MOVC R1,#0\n\
         MOVC R2,#5\n\
         MUL R3,R1,R2\n\
         BZ,#8\n\
         MOVC R5,#99\n\
         MOVC R6,#42\n\
         HALT",
    );
    assert_eq!(sim.cpu().regs.read(3), 0);
    assert_eq!(sim.cpu().regs.read(5), 0);
    assert_eq!(sim.cpu().regs.read(6), 42);
    assert!(sim.cpu().stats.stalls_control > 0);
    assert_eq!(sim.cpu().stats.branches_taken, 1);
}

#[test]
fn test_bnz_not_taken() {
    let sim = run_to_halt(
        VARIANT,
        "MOVC R1,#0\n\
         MOVC R2,#0\n\
         CMP R1,R2\n\
         BNZ,#8\n\
         MOVC R5,#11\n\
         HALT",
    );
    assert_eq!(sim.cpu().regs.read(5), 11);
    assert_eq!(sim.cpu().stats.branches_not_taken, 1);
    assert_eq!(sim.cpu().stats.branches_taken, 0);
}

#[test]
fn test_store_load_round_trip() {
    let sim = run_to_halt(
        VARIANT,
        "MOVC R1,#77\n\
         MOVC R2,#0\n\
         STORE R1,R2,#20\n\
         LOAD R3,R2,#20\n\
         HALT",
    );
    assert_eq!(sim.memory_word(20), 77);
    assert_eq!(sim.cpu().regs.read(3), 77);
}

#[test]
fn test_str_ldr_round_trip() {
    let sim = run_to_halt(
        VARIANT,
        "MOVC R1,#30\n\
         MOVC R2,#4\n\
         MOVC R7,#-5\n\
         STR R7,R1,R2\n\
         LDR R4,R1,R2\n\
         HALT",
    );
    assert_eq!(sim.memory_word(34), -5);
    assert_eq!(sim.cpu().regs.read(4), -5);
}

#[test]
fn test_back_to_back_mul_serializes() {
    let sim = run_to_halt(
        VARIANT,
        "MOVC R1,#2\n\
         MOVC R2,#3\n\
         MUL R3,R1,R2\n\
         MUL R4,R3,R1\n\
         HALT",
    );
    assert_eq!(sim.cpu().regs.read(3), 6);
    assert_eq!(sim.cpu().regs.read(4), 12);
    // The second MUL sat in decode until R3 committed.
    assert!(sim.cpu().stats.stalls_data > 0);
}

#[test]
fn test_structural_stall_on_busy_unit() {
    // Two independent loads: the second has no register hazard but must
    // wait for the load/store unit.
    let sim = run_to_halt(
        VARIANT,
        "MOVC R1,#0\n\
         MOVC R2,#0\n\
         LOAD R3,R1,#40\n\
         LOAD R4,R2,#44\n\
         HALT",
    );
    assert_eq!(sim.cpu().stats.instructions_retired, 5);
    assert!(sim.cpu().stats.stalls_structural > 0);
}

#[test]
fn test_halt_freezes_fetch() {
    let sim = run_to_halt(
        VARIANT,
        "MOVC R1,#7\n\
         HALT\n\
         MOVC R2,#9",
    );
    assert_eq!(sim.cpu().regs.read(2), 0);
    assert_eq!(sim.cpu().stats.instructions_retired, 2);
}

#[test]
fn test_division_by_zero_yields_zero() {
    let sim = run_to_halt(
        VARIANT,
        "MOVC R1,#84\n\
         MOVC R2,#0\n\
         DIV R3,R1,R2\n\
         HALT",
    );
    assert_eq!(sim.cpu().regs.read(3), 0);
}

#[test]
fn test_haltless_program_hits_the_cycle_cap() {
    let mut sim = simulator(VARIANT, "MOVC R1,#1\nADD R2,R1,R1");
    assert_eq!(sim.run(Some(60)), RunOutcome::CycleLimit);
    assert_eq!(sim.cpu().regs.read(2), 2);
}

proptest! {
    // STORE of V to A followed by LOAD from A recovers V, for any word
    // value and any in-range address.
    #[test]
    fn prop_store_then_load_recovers_value(value in -100_000i32..100_000, addr in 0i32..2000) {
        let asm = format!(
            "MOVC R1,#{value}\n\
             MOVC R2,#0\n\
             STORE R1,R2,#{addr}\n\
             LOAD R3,R2,#{addr}\n\
             HALT"
        );
        let sim = run_to_halt(VARIANT, &asm);
        prop_assert_eq!(sim.memory_word(addr), value);
        prop_assert_eq!(sim.cpu().regs.read(3), value);
    }
}
