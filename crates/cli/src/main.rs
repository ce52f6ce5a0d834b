//! APEX pipeline simulator CLI.
//!
//! One subcommand per run mode:
//! 1. **initialize** — load a program, print the code-memory table, exit.
//! 2. **simulate** — run silently for a cycle cap; dump registers and memory.
//! 3. **display** — run with the per-cycle stage trace; dump registers and memory.
//! 4. **single-step** — trace one cycle per keypress, `q` quits; dump state.
//! 5. **show-mem** — run to HALT; print one data-memory word.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use apexsim_core::common::error::SimError;
use apexsim_core::config::Config;
use apexsim_core::core::pipeline::engine::EngineKind;
use apexsim_core::sim::{self, Simulator, loader};

#[derive(Parser, Debug)]
#[command(
    name = "apexsim",
    author,
    version,
    about = "APEX CPU pipeline simulator",
    long_about = "Cycle-accurate simulator for the APEX five-stage pipeline.\n\nExamples:\n  apexsim simulate programs/sum.asm 100\n  apexsim display programs/sum.asm 50 --variant scalar\n  apexsim single-step programs/sum.asm\n  apexsim show-mem programs/sum.asm 20"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pipeline variant to simulate (defaults to the configuration's, which
    /// is multi-FU).
    #[arg(long, global = true, value_enum)]
    variant: Option<Variant>,

    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the statistics report after the run.
    #[arg(long, global = true)]
    stats: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Variant {
    /// Single function unit; memory as a dedicated stage.
    Scalar,
    /// Integer, multiplier, and load/store units behind a shared writeback
    /// port.
    Multi,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a program and print the code-memory table.
    Initialize {
        /// APEX assembly file.
        program: PathBuf,
    },

    /// Run silently up to a cycle cap, then dump architectural state.
    Simulate {
        /// APEX assembly file.
        program: PathBuf,
        /// Cycle cap.
        cycles: u64,
    },

    /// Run with the per-cycle stage trace up to a cycle cap.
    Display {
        /// APEX assembly file.
        program: PathBuf,
        /// Cycle cap.
        cycles: u64,
    },

    /// Run one traced cycle per keypress; `q` quits.
    SingleStep {
        /// APEX assembly file.
        program: PathBuf,
    },

    /// Run to HALT and print a single data-memory word.
    ShowMem {
        /// APEX assembly file.
        program: PathBuf,
        /// Word address to print.
        address: i32,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    eprintln!("APEX CPU Pipeline Simulator");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("APEX_Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SimError> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(variant) = cli.variant {
        config.pipeline.variant = match variant {
            Variant::Scalar => EngineKind::Scalar,
            Variant::Multi => EngineKind::MultiFu,
        };
    }

    match cli.command {
        Commands::Initialize { program } => {
            let code = loader::load_program(&program)?;
            // Validate against the machine limits before declaring success.
            let _ = Simulator::new(code.clone(), &config)?;
            sim::print_code_memory(&code, &config);
            println!("APEX Simulator initialized successfully");
            Ok(())
        }

        Commands::Simulate { program, cycles } => {
            let mut sim = build(&program, &config, false)?;
            let _ = sim.run(Some(cycles));
            sim.print_register_file();
            sim.print_data_memory();
            finish(&sim, cli.stats);
            Ok(())
        }

        Commands::Display { program, cycles } => {
            let mut sim = build(&program, &config, true)?;
            let _ = sim.run(Some(cycles));
            sim.print_register_file();
            sim.print_data_memory();
            finish(&sim, cli.stats);
            Ok(())
        }

        Commands::SingleStep { program } => {
            let mut sim = build(&program, &config, true)?;
            let _ = sim.run_interactive();
            sim.print_register_file();
            sim.print_data_memory();
            finish(&sim, cli.stats);
            Ok(())
        }

        Commands::ShowMem { program, address } => {
            let mut sim = build(&program, &config, false)?;
            let _ = sim.run(None);
            println!("==========STATE OF DATA MEMORY==============");
            println!("MEM[{}] : {}", address, sim.memory_word(address));
            finish(&sim, cli.stats);
            Ok(())
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config, SimError> {
    match path {
        None => Ok(Config::default()),
        Some(p) => {
            let text = std::fs::read_to_string(p).map_err(|source| SimError::Io {
                path: p.display().to_string(),
                source,
            })?;
            Config::from_json(&text)
        }
    }
}

fn build(program: &std::path::Path, config: &Config, trace: bool) -> Result<Simulator, SimError> {
    let code = loader::load_program(program)?;
    let mut sim = Simulator::new(code, config)?;
    sim.cpu_mut().trace = trace || config.general.trace;
    Ok(sim)
}

fn finish(sim: &Simulator, stats: bool) {
    if stats {
        sim.cpu().stats.print();
    }
}
