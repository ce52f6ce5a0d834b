//! Single-FU pipeline engine.
//!
//! The classic five-stage in-order pipeline: fetch → decode/RF → execute →
//! memory → writeback, one instruction per stage. Hazards are resolved
//! purely by scoreboard stalling in decode; there is no forwarding network.
//! Branches resolve in execute, which is safe because decode holds BZ/BNZ
//! until no zero-flag writer is in flight and writeback (which finalizes Z)
//! runs before execute in the cycle sweep.

use crate::core::Cpu;
use crate::core::pipeline::decode::{self, StallReason};
use crate::core::pipeline::engine::{CycleOutcome, PipelineEngine};
use crate::core::pipeline::frontend::Frontend;
use crate::core::pipeline::latch::{Latch, print_stage};
use crate::core::pipeline::writeback;
use crate::core::units::{alu, lsu};

/// The single-FU engine: frontend plus the execute, memory, and writeback
/// latches.
#[derive(Debug, Default)]
pub struct ScalarEngine {
    frontend: Frontend,
    execute: Latch,
    memory: Latch,
    writeback: Latch,
}

impl ScalarEngine {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self {
            frontend: Frontend::new(),
            execute: Latch::empty(),
            memory: Latch::empty(),
            writeback: Latch::empty(),
        }
    }

    fn writeback_stage(&mut self, cpu: &mut Cpu) -> CycleOutcome {
        match self.writeback.take() {
            Some(entry) => {
                if cpu.trace {
                    print_stage("Writeback", Some(&entry));
                }
                writeback::retire(cpu, &entry)
            }
            None => {
                if cpu.trace {
                    print_stage("Writeback", None);
                }
                CycleOutcome::Running
            }
        }
    }

    fn memory_stage(&mut self, cpu: &mut Cpu) {
        let Some(mut entry) = self.memory.take() else {
            if cpu.trace {
                print_stage("Memory", None);
            }
            return;
        };

        lsu::access(&mut entry, &mut cpu.mem);

        // Handing off toward writeback: the entry's zero-flag write is no
        // longer "in flight" for decode's branch gate; the sweep order
        // guarantees writeback finalizes Z before any branch issued now can
        // reach execute.
        if entry.inst.opcode.writes_zero_flag() {
            cpu.z_writer_handed_off();
        }

        if cpu.trace {
            print_stage("Memory", Some(&entry));
        }
        self.writeback.load(entry);
    }

    fn execute_stage(&mut self, cpu: &mut Cpu) {
        let Some(mut entry) = self.execute.take() else {
            if cpu.trace {
                print_stage("Execute", None);
            }
            return;
        };

        let op = entry.inst.opcode;
        if op.is_branch() {
            if alu::branch_taken(op, cpu.zero_flag) {
                let target = entry.pc.wrapping_add(entry.inst.imm);
                cpu.stats.branches_taken += 1;
                self.frontend.take_branch(cpu, target);
            } else {
                cpu.stats.branches_not_taken += 1;
            }
        } else if op.is_memory() {
            entry.memory_address =
                lsu::effective_address(op, entry.rs1_value, entry.rs2_value, entry.inst.imm);
        } else {
            entry.result_buffer =
                alu::compute(op, entry.rs1_value, entry.rs2_value, entry.inst.imm);
        }

        if cpu.trace {
            print_stage("Execute", Some(&entry));
        }
        self.memory.load(entry);
    }

    fn decode_stage(&mut self, cpu: &mut Cpu) {
        let Some(entry) = self.frontend.decode.get() else {
            if cpu.trace {
                print_stage("Decode/RF", None);
            }
            return;
        };

        let inst = entry.inst;
        let stall = if decode::register_hazard(cpu, &inst) {
            Some(StallReason::Data)
        } else if inst.opcode.is_branch() && !cpu.z_stable() {
            Some(StallReason::Control)
        } else {
            None
        };

        if cpu.trace {
            print_stage("Decode/RF", self.frontend.decode.get());
        }

        match stall {
            None => {
                if let Some(mut entry) = self.frontend.decode.take() {
                    decode::read_sources(cpu, &mut entry);
                    decode::issue(cpu, &entry.inst);
                    self.execute.load(entry);
                }
                self.frontend.decode_stalled = false;
            }
            Some(reason) => {
                self.frontend.decode_stalled = true;
                decode::count_stall(cpu, reason);
            }
        }
    }
}

impl PipelineEngine for ScalarEngine {
    fn cycle(&mut self, cpu: &mut Cpu) -> CycleOutcome {
        if self.writeback_stage(cpu) == CycleOutcome::Halted {
            return CycleOutcome::Halted;
        }
        self.memory_stage(cpu);
        self.execute_stage(cpu);
        self.decode_stage(cpu);
        self.frontend.fetch_stage(cpu);
        CycleOutcome::Running
    }
}
