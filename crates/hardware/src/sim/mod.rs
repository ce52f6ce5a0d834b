//! Simulation harness: program loading and the cycle driver.
//!
//! * `loader`: APEX assembly text → code memory.
//! * [`Simulator`]: owns the architectural state and the selected pipeline
//!   engine, and runs the per-cycle sweep until HALT retires, a cycle cap is
//!   reached, or an interactive session quits.

pub mod loader;

use std::io::{self, BufRead, Write};

use crate::common::error::SimError;
use crate::config::Config;
use crate::core::Cpu;
use crate::core::pipeline::engine::{CycleOutcome, EngineDispatch, PipelineEngine};
use crate::isa::Instruction;

/// How a simulation run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// A HALT instruction retired; the clean ending.
    HaltRetired,
    /// The caller-supplied cycle cap was reached.
    CycleLimit,
    /// The user quit an interactive session.
    UserQuit,
}

/// One simulation: architectural state plus a pipeline engine.
#[derive(Debug)]
pub struct Simulator {
    cpu: Cpu,
    engine: EngineDispatch,
}

impl Simulator {
    /// Builds a simulator for `program` under `config`.
    ///
    /// # Errors
    ///
    /// [`SimError::Program`] when an instruction names a register the
    /// configured register file does not have.
    pub fn new(program: Vec<Instruction>, config: &Config) -> Result<Self, SimError> {
        let reg_count = config.machine.reg_file_size;
        for (index, inst) in program.iter().enumerate() {
            let max = inst.rd.max(inst.rs1).max(inst.rs2).max(inst.rs3);
            if max >= reg_count {
                return Err(SimError::Program {
                    index,
                    msg: format!("register R{max} exceeds the {reg_count}-register file"),
                });
            }
        }
        Ok(Self {
            cpu: Cpu::new(program, config),
            engine: EngineDispatch::new(config),
        })
    }

    /// Read access to the architectural state.
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Mutable access to the architectural state (test setup, tracing).
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// Runs one clock cycle.
    pub fn step(&mut self) -> CycleOutcome {
        if self.cpu.trace {
            println!("--------------------------------------------");
            println!("Clock Cycle #: {}", self.cpu.clock);
            println!("--------------------------------------------");
        }
        let outcome = self.engine.cycle(&mut self.cpu);
        if outcome == CycleOutcome::Running {
            if self.cpu.trace {
                println!("--------------------------------------------");
                println!("Z Flag : {}", i32::from(self.cpu.zero_flag));
                println!("--------------------------------------------");
            }
            self.cpu.clock += 1;
        }
        self.cpu.stats.cycles = self.cpu.clock;
        outcome
    }

    /// Runs until HALT retires or the optional cycle cap is reached.
    ///
    /// Prints the `Simulation Complete`/`Simulation Stopped` summary line
    /// either way; neither ending is an error.
    pub fn run(&mut self, cycle_cap: Option<u64>) -> RunOutcome {
        loop {
            if self.step() == CycleOutcome::Halted {
                self.print_complete();
                return RunOutcome::HaltRetired;
            }
            if let Some(cap) = cycle_cap {
                if self.cpu.clock >= cap {
                    self.print_stopped();
                    return RunOutcome::CycleLimit;
                }
            }
        }
    }

    /// Runs interactively: one cycle per line of input, `q` to quit.
    ///
    /// End-of-input counts as quitting, so a closed stdin cannot wedge the
    /// session.
    pub fn run_interactive(&mut self) -> RunOutcome {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            if self.step() == CycleOutcome::Halted {
                self.print_complete();
                return RunOutcome::HaltRetired;
            }

            println!("Press <Enter> to advance CPU Clock or <q> to quit:");
            let _ = io::stdout().flush();
            match lines.next() {
                Some(Ok(line)) if !line.trim().eq_ignore_ascii_case("q") => {}
                _ => {
                    self.print_stopped();
                    return RunOutcome::UserQuit;
                }
            }
        }
    }

    /// Prints the architectural register file.
    pub fn print_register_file(&self) {
        self.cpu.regs.dump();
    }

    /// Prints the data-memory dump.
    pub fn print_data_memory(&self) {
        self.cpu.mem.dump();
    }

    /// Reads one data-memory word (the ShowMem mode).
    pub fn memory_word(&self, addr: i32) -> i32 {
        self.cpu.mem.read(addr)
    }

    fn print_complete(&self) {
        println!(
            "APEX_CPU: Simulation Complete, cycles = {} instructions = {}",
            self.cpu.clock, self.cpu.stats.instructions_retired
        );
    }

    fn print_stopped(&self) {
        println!(
            "APEX_CPU: Simulation Stopped, cycles = {} instructions = {}",
            self.cpu.clock, self.cpu.stats.instructions_retired
        );
    }
}

/// Prints the load banner and code-memory table (the Initialize mode).
pub fn print_code_memory(program: &[Instruction], config: &Config) {
    eprintln!(
        "APEX_CPU: Initialized APEX CPU, loaded {} instructions",
        program.len()
    );
    eprintln!("APEX_CPU: PC initialized to {}", config.machine.pc_base);
    println!(
        "{:<9}\t {:<9} {:<9} {:<9} {:<9} {:<9}",
        "opcode", "rd", "rs1", "rs2", "rs3", "imm"
    );
    for inst in program {
        println!(
            "{:<9}\t {:<9} {:<9} {:<9} {:<9} {:<9}",
            inst.opcode.mnemonic(),
            inst.rd,
            inst.rs1,
            inst.rs2,
            inst.rs3,
            inst.imm
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::loader::parse_program;

    #[test]
    fn test_register_bounds_are_validated() {
        let config = Config::default();
        let program = parse_program("MOVC R99,#1\nHALT").unwrap();
        assert!(Simulator::new(program, &config).is_err());
    }

    #[test]
    fn test_cycle_cap_stops_a_haltless_program() {
        let config = Config::default();
        let program = parse_program("MOVC R1,#1\nMOVC R2,#2").unwrap();
        let mut sim = Simulator::new(program, &config).unwrap();
        assert_eq!(sim.run(Some(50)), RunOutcome::CycleLimit);
        assert_eq!(sim.cpu().regs.read(1), 1);
        assert_eq!(sim.cpu().regs.read(2), 2);
    }
}
