//! Decode/register-read logic shared by both engine variants.
//!
//! Decode resolves source operands against the register file, reserves the
//! destination, and either forwards the instruction downstream or holds it.
//! The engines differ only in their structural checks (the multi-FU variant
//! additionally requires the target function unit to be idle), so the
//! register and zero-flag hazard tests live here.

use crate::core::Cpu;
use crate::core::pipeline::latch::StageEntry;
use crate::isa::Instruction;

/// Why decode is holding its instruction this cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StallReason {
    /// A named source register — or the destination — has a producer in
    /// flight.
    Data,
    /// The target function unit is busy.
    Structural,
    /// A branch is waiting for an in-flight zero-flag writer.
    Control,
}

/// Checks the register-file hazards for an instruction sitting in decode.
///
/// All named sources must be free, and so must the destination: reserving a
/// register that already has a producer in flight would break the
/// one-producer-per-register invariant the scoreboard relies on.
pub fn register_hazard(cpu: &Cpu, inst: &Instruction) -> bool {
    let op = inst.opcode;
    (op.reads_rs1() && cpu.regs.is_pending(inst.rs1))
        || (op.reads_rs2() && cpu.regs.is_pending(inst.rs2))
        || (op.reads_rs3() && cpu.regs.is_pending(inst.rs3))
        || (op.writes_register() && cpu.regs.is_pending(inst.rd))
}

/// Reads the source operand values into the stage entry.
pub fn read_sources(cpu: &Cpu, entry: &mut StageEntry) {
    let op = entry.inst.opcode;
    if op.reads_rs1() {
        entry.rs1_value = cpu.regs.read(entry.inst.rs1);
    }
    if op.reads_rs2() {
        entry.rs2_value = cpu.regs.read(entry.inst.rs2);
    }
    if op.reads_rs3() {
        entry.rs3_value = cpu.regs.read(entry.inst.rs3);
    }
}

/// Books the side effects of issuing an instruction out of decode: reserve
/// the destination and count a zero-flag writer entering flight.
pub fn issue(cpu: &mut Cpu, inst: &Instruction) {
    if inst.opcode.writes_register() {
        cpu.regs.reserve(inst.rd);
    }
    if inst.opcode.writes_zero_flag() {
        cpu.z_writer_issued();
    }
}

/// Records a decode stall in the statistics.
pub fn count_stall(cpu: &mut Cpu, reason: StallReason) {
    match reason {
        StallReason::Data => cpu.stats.stalls_data += 1,
        StallReason::Structural => cpu.stats.stalls_structural += 1,
        StallReason::Control => cpu.stats.stalls_control += 1,
    }
    tracing::trace!(?reason, "decode stalled");
}
