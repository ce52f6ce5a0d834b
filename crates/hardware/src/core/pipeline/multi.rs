//! Multi-FU pipeline engine.
//!
//! Decode dispatches through an execute gateway to one of three parallel
//! function units — Integer (1 cycle), Multiplier (3 cycles), Load/Store
//! (4 cycles) — which share a single writeback port. A completion queue of
//! FU-class tags, filled in dispatch order, arbitrates the port so that
//! writeback stays in program order across the heterogeneous latencies.

use crate::config::Config;
use crate::core::Cpu;
use crate::core::pipeline::completion::CompletionQueue;
use crate::core::pipeline::decode::{self, StallReason};
use crate::core::pipeline::engine::{CycleOutcome, PipelineEngine};
use crate::core::pipeline::frontend::Frontend;
use crate::core::pipeline::latch::{Latch, StageEntry, print_stage};
use crate::core::pipeline::writeback;
use crate::core::units::{alu, lsu};
use crate::isa::FuClass;

/// One function unit: an input latch, a cycle counter, and a busy bit.
///
/// Lifecycle per instruction: on the first tick after arrival the unit
/// performs the full computation (including any data-memory side effects),
/// asserts busy, and enqueues its class tag in the completion queue. It then
/// counts up to its latency, and hands off to the writeback latch once the
/// count is reached, its tag is at the queue head, and the port is free.
#[derive(Debug)]
pub struct FunctionUnit {
    class: FuClass,
    latency: u64,
    latch: Latch,
    counter: u64,
    busy: bool,
}

impl FunctionUnit {
    fn new(class: FuClass, latency: u64) -> Self {
        Self {
            class,
            latency: latency.max(1),
            latch: Latch::empty(),
            counter: 1,
            busy: false,
        }
    }

    /// Whether an instruction occupies this unit; decode stalls on it.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    fn name(&self) -> &'static str {
        match self.class {
            FuClass::Integer => "Integer FU",
            FuClass::Multiplier => "Multiplier FU",
            FuClass::LoadStore => "Load/Store FU",
        }
    }

    fn accept(&mut self, entry: StageEntry) {
        debug_assert!(!self.busy, "dispatch into a busy function unit");
        self.counter = 1;
        self.latch.load(entry);
    }

    fn tick(
        &mut self,
        cpu: &mut Cpu,
        frontend: &mut Frontend,
        queue: &mut CompletionQueue,
        writeback: &mut Latch,
    ) {
        if cpu.trace {
            print_stage(self.name(), self.latch.get());
        }
        if !self.latch.is_occupied() {
            return;
        }

        if !self.busy {
            // First tick after arrival: the whole computation happens now;
            // the remaining cycles only model latency.
            self.busy = true;
            self.execute(cpu, frontend);
            queue.push(self.class);
        }

        let may_forward = self.counter >= self.latency
            && queue.head() == Some(self.class)
            && !writeback.is_occupied();

        if may_forward {
            if let Some(entry) = self.latch.take() {
                if entry.inst.opcode.writes_zero_flag() {
                    cpu.z_writer_handed_off();
                }
                tracing::trace!(pc = entry.pc, unit = self.name(), "handoff to writeback");
                writeback.load(entry);
            }
            let popped = queue.pop_if(self.class);
            debug_assert!(popped, "handoff without owning the queue head");
            self.counter = 1;
            self.busy = false;
        } else if self.counter < self.latency {
            self.counter += 1;
        }
    }

    fn execute(&mut self, cpu: &mut Cpu, frontend: &mut Frontend) {
        let Some(entry) = self.latch.get_mut() else {
            return;
        };
        let op = entry.inst.opcode;
        match self.class {
            FuClass::Integer => {
                if op.is_branch() {
                    if alu::branch_taken(op, cpu.zero_flag) {
                        let target = entry.pc.wrapping_add(entry.inst.imm);
                        cpu.stats.branches_taken += 1;
                        frontend.take_branch(cpu, target);
                    } else {
                        cpu.stats.branches_not_taken += 1;
                    }
                } else {
                    entry.result_buffer =
                        alu::compute(op, entry.rs1_value, entry.rs2_value, entry.inst.imm);
                }
            }
            FuClass::Multiplier => {
                entry.result_buffer =
                    alu::compute(op, entry.rs1_value, entry.rs2_value, entry.inst.imm);
            }
            FuClass::LoadStore => {
                entry.memory_address =
                    lsu::effective_address(op, entry.rs1_value, entry.rs2_value, entry.inst.imm);
                lsu::access(entry, &mut cpu.mem);
            }
        }
    }
}

/// The multi-FU engine.
#[derive(Debug)]
pub struct MultiFuEngine {
    frontend: Frontend,
    /// Dispatch gateway latch between decode and the function units.
    execute: Latch,
    int_fu: FunctionUnit,
    mul_fu: FunctionUnit,
    ls_fu: FunctionUnit,
    writeback: Latch,
    completion: CompletionQueue,
}

impl MultiFuEngine {
    /// Creates an empty pipeline with the configured latencies.
    pub fn new(config: &Config) -> Self {
        Self {
            frontend: Frontend::new(),
            execute: Latch::empty(),
            int_fu: FunctionUnit::new(FuClass::Integer, config.pipeline.int_latency),
            mul_fu: FunctionUnit::new(FuClass::Multiplier, config.pipeline.mul_latency),
            ls_fu: FunctionUnit::new(FuClass::LoadStore, config.pipeline.ls_latency),
            writeback: Latch::empty(),
            completion: CompletionQueue::new(config.pipeline.completion_queue_depth),
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

    /// Routes the execute-gateway latch to its function unit, then ticks all
    /// three units in a fixed order. The order cannot affect correctness:
    /// each unit owns its input latch, and the completion queue serializes
    /// the shared writeback port.
    fn dispatch_and_tick(&mut self, cpu: &mut Cpu) {
        if let Some(entry) = self.execute.take() {
            match entry.inst.opcode.fu_class() {
                FuClass::Integer => self.int_fu.accept(entry),
                FuClass::Multiplier => self.mul_fu.accept(entry),
                FuClass::LoadStore => self.ls_fu.accept(entry),
            }
        }

        self.int_fu
            .tick(cpu, &mut self.frontend, &mut self.completion, &mut self.writeback);
        self.mul_fu
            .tick(cpu, &mut self.frontend, &mut self.completion, &mut self.writeback);
        self.ls_fu
            .tick(cpu, &mut self.frontend, &mut self.completion, &mut self.writeback);
    }

    fn decode_stage(&mut self, cpu: &mut Cpu) {
        let Some(entry) = self.frontend.decode.get() else {
            if cpu.trace {
                print_stage("Decode/RF", None);
            }
            return;
        };

        let inst = entry.inst;
        let fu_busy = match inst.opcode.fu_class() {
            FuClass::Integer => self.int_fu.is_busy(),
            FuClass::Multiplier => self.mul_fu.is_busy(),
            FuClass::LoadStore => self.ls_fu.is_busy(),
        };

        let stall = if decode::register_hazard(cpu, &inst) {
            Some(StallReason::Data)
        } else if inst.opcode.is_branch() && !cpu.z_stable() {
            Some(StallReason::Control)
        } else if fu_busy {
            Some(StallReason::Structural)
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

impl PipelineEngine for MultiFuEngine {
    fn cycle(&mut self, cpu: &mut Cpu) -> CycleOutcome {
        if self.writeback_stage(cpu) == CycleOutcome::Halted {
            return CycleOutcome::Halted;
        }
        self.dispatch_and_tick(cpu);
        self.decode_stage(cpu);
        self.frontend.fetch_stage(cpu);
        CycleOutcome::Running
    }
}
