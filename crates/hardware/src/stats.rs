//! Simulation statistics collection and reporting.
//!
//! This module tracks performance counters for a simulation run. It provides:
//! 1. **Cycle and IPC:** Total cycles, retired instructions, and derived
//!    metrics (IPC, CPI).
//! 2. **Stalls:** Decode stall counts broken down by reason (data,
//!    structural, control).
//! 3. **Branches:** Taken/not-taken outcomes and flushed instructions.

use std::time::Instant;

/// Counters collected over one simulation run.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Number of instructions retired through writeback.
    pub instructions_retired: u64,

    /// Decode stalls waiting on a pending source or destination register.
    pub stalls_data: u64,
    /// Decode stalls waiting on a busy function unit.
    pub stalls_structural: u64,
    /// Decode stalls holding a branch while a zero-flag writer is in flight.
    pub stalls_control: u64,

    /// Conditional branches that redirected fetch.
    pub branches_taken: u64,
    /// Conditional branches that fell through.
    pub branches_not_taken: u64,
    /// Instructions flushed from the decode latch by a taken branch.
    pub squashed: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            stalls_data: 0,
            stalls_structural: 0,
            stalls_control: 0,
            branches_taken: 0,
            branches_not_taken: 0,
            squashed: 0,
        }
    }
}

impl SimStats {
    /// Prints the statistics report to stdout.
    ///
    /// Divisions are guarded: a zero cycle or instruction count is clamped
    /// to one before computing rates.
    pub fn print(&self) {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = self.cycles.max(1);
        let instr = self.instructions_retired.max(1);
        let ipc = self.instructions_retired as f64 / cyc as f64;
        let cpi = cyc as f64 / instr as f64;
        let total_stalls = self.stalls_data + self.stalls_structural + self.stalls_control;

        println!("\n==========================================================");
        println!("APEX PIPELINE SIMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {seconds:.4} s");
        println!("sim_cycles               {}", self.cycles);
        println!("sim_insts                {}", self.instructions_retired);
        println!("sim_ipc                  {ipc:.4}");
        println!("sim_cpi                  {cpi:.4}");
        println!("----------------------------------------------------------");
        println!(
            "  stalls.data            {} ({:.2}%)",
            self.stalls_data,
            (self.stalls_data as f64 / cyc as f64) * 100.0
        );
        println!(
            "  stalls.structural      {} ({:.2}%)",
            self.stalls_structural,
            (self.stalls_structural as f64 / cyc as f64) * 100.0
        );
        println!(
            "  stalls.control         {} ({:.2}%)",
            self.stalls_control,
            (self.stalls_control as f64 / cyc as f64) * 100.0
        );
        println!("  stalls.total           {total_stalls}");
        println!("----------------------------------------------------------");
        println!("  branch.taken           {}", self.branches_taken);
        println!("  branch.not_taken       {}", self.branches_not_taken);
        println!("  branch.squashed        {}", self.squashed);
        println!("==========================================================");
    }
}
