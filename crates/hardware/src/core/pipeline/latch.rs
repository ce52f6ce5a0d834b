//! Stage latches: the registers between pipeline stages.
//!
//! A latch holds at most one in-flight instruction together with its dynamic
//! fields (read operand values, result buffer, computed memory address). The
//! original implementation carried a `has_insn` presence bit beside the
//! instruction; here presence is the `Option` itself, so a latch can never
//! claim to hold an instruction it does not.

use crate::isa::Instruction;

/// An instruction in flight, as carried between stages.
#[derive(Clone, Copy, Debug)]
pub struct StageEntry {
    /// PC the instruction was fetched from.
    pub pc: i32,
    /// The static instruction record.
    pub inst: Instruction,
    /// Value read from rs1 at decode.
    pub rs1_value: i32,
    /// Value read from rs2 at decode.
    pub rs2_value: i32,
    /// Value read from rs3 at decode (STR).
    pub rs3_value: i32,
    /// Computed result, committed to rd at writeback.
    pub result_buffer: i32,
    /// Effective address for memory opcodes.
    pub memory_address: i32,
}

impl StageEntry {
    /// Creates an entry for a freshly fetched instruction.
    pub fn new(pc: i32, inst: Instruction) -> Self {
        Self {
            pc,
            inst,
            rs1_value: 0,
            rs2_value: 0,
            rs3_value: 0,
            result_buffer: 0,
            memory_address: 0,
        }
    }
}

/// A single-entry stage latch.
///
/// Populated by the upstream stage, consumed (taken) by the downstream
/// stage. The reverse-order cycle sweep guarantees a value loaded this cycle
/// is only observed next cycle.
#[derive(Clone, Debug, Default)]
pub struct Latch {
    slot: Option<StageEntry>,
}

impl Latch {
    /// Creates an empty latch.
    pub const fn empty() -> Self {
        Self { slot: None }
    }

    /// Whether the latch holds an instruction.
    pub fn is_occupied(&self) -> bool {
        self.slot.is_some()
    }

    /// Loads an entry into the latch.
    ///
    /// A latch never legally holds two instructions; loading over an
    /// occupied latch is a pipeline bug.
    pub fn load(&mut self, entry: StageEntry) {
        debug_assert!(self.slot.is_none(), "latch overwritten while occupied");
        self.slot = Some(entry);
    }

    /// Takes the entry out, leaving the latch empty.
    pub fn take(&mut self) -> Option<StageEntry> {
        self.slot.take()
    }

    /// Borrows the entry, if present.
    pub fn get(&self) -> Option<&StageEntry> {
        self.slot.as_ref()
    }

    /// Mutably borrows the entry, if present.
    pub fn get_mut(&mut self) -> Option<&mut StageEntry> {
        self.slot.as_mut()
    }

    /// Discards the entry (branch flush).
    pub fn clear(&mut self) {
        self.slot = None;
    }
}

/// Prints one stage-trace line: the entry's pc and disassembly, or `EMPTY`.
pub(crate) fn print_stage(name: &str, entry: Option<&StageEntry>) {
    match entry {
        Some(e) => println!("{:<15}: pc({}) {}", name, e.pc, e.inst),
        None => println!("{name:<15}: EMPTY"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::Opcode;

    #[test]
    fn test_load_take_cycle() {
        let mut latch = Latch::empty();
        assert!(!latch.is_occupied());

        latch.load(StageEntry::new(4000, Instruction::new(Opcode::Nop)));
        assert!(latch.is_occupied());

        let entry = latch.take();
        assert_eq!(entry.map(|e| e.pc), Some(4000));
        assert!(!latch.is_occupied());
        assert!(latch.take().is_none());
    }

    #[test]
    fn test_clear_discards() {
        let mut latch = Latch::empty();
        latch.load(StageEntry::new(4004, Instruction::new(Opcode::Movc)));
        latch.clear();
        assert!(!latch.is_occupied());
    }
}
