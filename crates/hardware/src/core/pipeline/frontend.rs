//! Pipeline frontend: the fetch stage and its latches.
//!
//! Owns the fetch and decode latches plus the control bits fetch needs:
//! whether fetching is enabled (HALT freezes it), whether a taken branch
//! redirected the PC last cycle (fetch skips one cycle so the target is
//! fetched on the next), and whether decode is holding its instruction.

use crate::core::Cpu;
use crate::core::pipeline::latch::{Latch, StageEntry, print_stage};
use crate::isa::Opcode;

/// Fetch state and the fetch/decode latches, shared by both engine variants.
#[derive(Debug)]
pub struct Frontend {
    /// Fetch output latch.
    pub fetch: Latch,
    /// Decode input latch.
    pub decode: Latch,
    /// Decode is stalled and holding its latch.
    pub decode_stalled: bool,
    fetch_enabled: bool,
    redirect_pending: bool,
}

impl Default for Frontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend {
    /// Creates a frontend with fetch enabled.
    pub fn new() -> Self {
        Self {
            fetch: Latch::empty(),
            decode: Latch::empty(),
            decode_stalled: false,
            fetch_enabled: true,
            redirect_pending: false,
        }
    }

    /// Runs the fetch stage for this cycle.
    ///
    /// * Decode stalled: re-read the instruction at the current PC into the
    ///   fetch latch for display, without advancing the PC or forwarding.
    /// * Redirect pending: consume the flag and do nothing; the branch
    ///   target is fetched next cycle.
    /// * Otherwise read code memory at the PC, advance by 4, forward to the
    ///   decode latch, and freeze fetch once HALT comes through.
    pub fn fetch_stage(&mut self, cpu: &mut Cpu) {
        if self.decode_stalled {
            if let Some(inst) = cpu.code_at(cpu.pc) {
                self.fetch.clear();
                self.fetch.load(StageEntry::new(cpu.pc, inst));
            }
            if cpu.trace {
                print_stage("Fetch", self.fetch.get());
            }
            return;
        }

        if !self.fetch_enabled {
            if cpu.trace {
                print_stage("Fetch", None);
            }
            return;
        }

        if self.redirect_pending {
            // Skip this cycle; the target instruction appears next cycle.
            self.redirect_pending = false;
            return;
        }

        let Some(inst) = cpu.code_at(cpu.pc) else {
            // Ran off the end of code memory (no HALT); stop fetching and
            // let the cycle cap end the run.
            self.fetch_enabled = false;
            if cpu.trace {
                print_stage("Fetch", None);
            }
            return;
        };

        let entry = StageEntry::new(cpu.pc, inst);
        self.fetch.clear();
        self.fetch.load(entry);
        cpu.pc = cpu.pc.wrapping_add(4);
        self.decode.load(entry);

        if cpu.trace {
            print_stage("Fetch", self.fetch.get());
        }

        if inst.opcode == Opcode::Halt {
            self.fetch_enabled = false;
        }
    }

    /// Redirects fetch to a taken branch's target.
    ///
    /// Sets the PC, arms the one-cycle fetch skip, flushes the decode latch
    /// (the wrong-path instruction never issued, so it holds no
    /// reservations), and re-enables fetch in case HALT had frozen it on the
    /// wrong path.
    pub fn take_branch(&mut self, cpu: &mut Cpu, target: i32) {
        tracing::debug!(target_pc = target, "branch taken, flushing frontend");
        cpu.pc = target;
        self.redirect_pending = true;
        if self.decode.is_occupied() {
            cpu.stats.squashed += 1;
        }
        self.decode.clear();
        self.decode_stalled = false;
        self.fetch_enabled = true;
    }
}
