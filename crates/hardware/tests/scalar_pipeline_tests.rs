//! End-to-end tests for the single-FU pipeline variant.

mod common;

use apexsim_core::core::pipeline::engine::EngineKind;
use apexsim_core::sim::RunOutcome;
use rstest::rstest;

use common::{run_to_halt, simulator};

const VARIANT: EngineKind = EngineKind::Scalar;

#[test]
fn test_raw_hazard_stalls_until_writeback() {
    let sim = run_to_halt(
        VARIANT,
        "MOVC R1,#5\n\
         MOVC R2,#7\n\
         ADD R3,R1,R2\n\
         HALT",
    );
    assert_eq!(sim.cpu().regs.read(3), 12);
    assert_eq!(sim.cpu().stats.instructions_retired, 4);
    // Pipeline fill plus the RAW stalls: this cannot finish in fewer than
    // seven cycles.
    assert!(sim.cpu().clock >= 7, "halted after {} cycles", sim.cpu().clock);
    assert!(sim.cpu().stats.stalls_data > 0);
}

#[rstest]
#[case("ADD", 5, 7, 12)]
#[case("SUB", 5, 7, -2)]
#[case("MUL", 6, 7, 42)]
#[case("DIV", 84, 2, 42)]
#[case("AND", 12, 10, 8)]
#[case("OR", 12, 10, 14)]
#[case("XOR", 12, 10, 6)]
fn test_register_ops_through_the_pipeline(
    #[case] op: &str,
    #[case] a: i32,
    #[case] b: i32,
    #[case] expected: i32,
) {
    let asm = format!("MOVC R1,#{a}\nMOVC R2,#{b}\n{op} R3,R1,R2\nHALT");
    let sim = run_to_halt(VARIANT, &asm);
    assert_eq!(sim.cpu().regs.read(3), expected);
}

#[test]
fn test_movc_addl_identity() {
    let sim = run_to_halt(
        VARIANT,
        "MOVC R1,#17\n\
         ADDL R1,R1,#0\n\
         HALT",
    );
    assert_eq!(sim.cpu().regs.read(1), 17);
}

#[test]
fn test_taken_branch_flushes_fall_through() {
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
    // The fall-through MOVC R5 must never retire.
    assert_eq!(sim.cpu().regs.read(5), 0);
    assert_eq!(sim.cpu().regs.read(6), 42);
    assert_eq!(sim.cpu().stats.branches_taken, 1);
}

#[test]
fn test_branch_taken_on_arithmetic_zero() {
    // SUB produces 0, so writeback sets Z and the BZ must take. A stale
    // initial Z (false) would fall through instead.
    let sim = run_to_halt(
        VARIANT,
        "MOVC R1,#3\n\
         MOVC R2,#3\n\
         SUB R4,R1,R2\n\
         BZ,#8\n\
         MOVC R5,#99\n\
         MOVC R6,#42\n\
         HALT",
    );
    assert_eq!(sim.cpu().regs.read(4), 0);
    assert_eq!(sim.cpu().regs.read(5), 0);
    assert_eq!(sim.cpu().regs.read(6), 42);
}

#[test]
fn test_bnz_not_taken_falls_through() {
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
fn test_halt_freezes_fetch() {
    let sim = run_to_halt(
        VARIANT,
        "MOVC R1,#7\n\
         HALT\n\
         MOVC R2,#9",
    );
    // Nothing after HALT is ever fetched.
    assert_eq!(sim.cpu().regs.read(1), 7);
    assert_eq!(sim.cpu().regs.read(2), 0);
    assert_eq!(sim.cpu().stats.instructions_retired, 2);
}

#[test]
fn test_second_producer_stalls() {
    let mut sim = simulator(
        VARIANT,
        "MOVC R1,#1\n\
         MOVC R1,#2\n\
         HALT",
    );
    assert_eq!(sim.run(Some(100)), RunOutcome::HaltRetired);
    assert_eq!(sim.cpu().regs.read(1), 2);
    // The second MOVC had to wait for the first writer to commit.
    assert!(sim.cpu().stats.stalls_data > 0);
}

#[test]
fn test_haltless_program_hits_the_cycle_cap() {
    let mut sim = simulator(VARIANT, "MOVC R1,#1\nMOVC R2,#2");
    assert_eq!(sim.run(Some(60)), RunOutcome::CycleLimit);
    assert_eq!(sim.cpu().regs.read(1), 1);
    assert_eq!(sim.cpu().regs.read(2), 2);
}
