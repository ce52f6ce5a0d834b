//! Writeback: commit an instruction's results to architectural state.
//!
//! Shared by both engine variants. Destination-producing opcodes write the
//! result buffer to the register file and clear the pending flag; zero-flag
//! producers finalize Z here (and only here — the unified policy: CMP
//! compares its operand values, arithmetic tests its result for zero).

use crate::core::Cpu;
use crate::core::pipeline::engine::CycleOutcome;
use crate::core::pipeline::latch::StageEntry;
use crate::isa::Opcode;

/// Retires one instruction out of the writeback latch.
///
/// Returns [`CycleOutcome::Halted`] when the retired instruction is HALT,
/// which ends the simulation.
pub fn retire(cpu: &mut Cpu, entry: &StageEntry) -> CycleOutcome {
    let op = entry.inst.opcode;

    if op.writes_register() {
        cpu.regs.commit(entry.inst.rd, entry.result_buffer);
    }

    if op.writes_zero_flag() {
        cpu.zero_flag = match op {
            Opcode::Cmp => entry.rs1_value == entry.rs2_value,
            _ => entry.result_buffer == 0,
        };
    }

    cpu.stats.instructions_retired += 1;
    tracing::trace!(pc = entry.pc, inst = %entry.inst, "retired");

    if op == Opcode::Halt {
        CycleOutcome::Halted
    } else {
        CycleOutcome::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::isa::Instruction;

    fn cpu() -> Cpu {
        Cpu::new(Vec::new(), &Config::default())
    }

    #[test]
    fn test_commit_clears_reservation() {
        let mut cpu = cpu();
        cpu.regs.reserve(3);

        let mut entry = StageEntry::new(
            4000,
            Instruction {
                opcode: Opcode::Add,
                rd: 3,
                rs1: 1,
                rs2: 2,
                ..Instruction::default()
            },
        );
        entry.result_buffer = 12;

        assert_eq!(retire(&mut cpu, &entry), CycleOutcome::Running);
        assert_eq!(cpu.regs.read(3), 12);
        assert!(!cpu.regs.is_pending(3));
        assert_eq!(cpu.stats.instructions_retired, 1);
        // 12 != 0, so the zero flag is cleared.
        assert!(!cpu.zero_flag);
    }

    #[test]
    fn test_cmp_sets_zero_flag_from_operands() {
        let mut cpu = cpu();
        let mut entry = StageEntry::new(4000, Instruction::new(Opcode::Cmp));
        entry.rs1_value = 7;
        entry.rs2_value = 7;
        let _ = retire(&mut cpu, &entry);
        assert!(cpu.zero_flag);

        entry.rs2_value = 8;
        let _ = retire(&mut cpu, &entry);
        assert!(!cpu.zero_flag);
    }

    #[test]
    fn test_store_touches_no_register_state() {
        let mut cpu = cpu();
        let entry = StageEntry::new(4000, Instruction::new(Opcode::Store));
        let _ = retire(&mut cpu, &entry);
        assert_eq!(cpu.regs.read(0), 0);
        assert_eq!(cpu.stats.instructions_retired, 1);
    }

    #[test]
    fn test_halt_reports_completion() {
        let mut cpu = cpu();
        let entry = StageEntry::new(4000, Instruction::new(Opcode::Halt));
        assert_eq!(retire(&mut cpu, &entry), CycleOutcome::Halted);
    }
}
