//! PPU program runner CLI.
//!
//! This binary drives single program runs on a PPU. It performs:
//! 1. **Run:** Load an executable, release the reset, wait for completion, halt the PPU and
//!    print its mailbox. A nonzero exit code fails the command.
//! 2. **Symbols:** Print the program size and symbol table of an executable.
//!
//! Runs execute against the in-process target model; `--halt-after`, `--exit-code` and
//! `--mailbox` script the behaviour of the simulated program.

use std::error::Error as _;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ppuctl_core::common::Error;
use ppuctl_core::config::Config;
use ppuctl_core::image::ElfImage;
use ppuctl_core::ppu::{Controller, ExitCode};
use ppuctl_core::sim::{HaltAfter, SimulatedTarget};

#[derive(Parser, Debug)]
#[command(
    name = "run-ppu-program",
    author,
    version,
    about = "Load, run and stop a program on a PPU",
    long_about = "Load an unstripped PPU executable, start it, wait for it to finish and report its exit code and mailbox.\n\nExamples:\n  run-ppu-program run build/test_counter.elf\n  run-ppu-program run --wait 50000000 --ppu-id 1 build/test_counter.elf\n  run-ppu-program symbols build/test_counter.elf"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a program to completion.
    Run {
        /// PPU executable (ELF, unstripped).
        program: PathBuf,

        /// Cycle budget for completion (default: 10000000, or the configuration file). 0 waits
        /// without a budget, like --no-timeout.
        #[arg(long, conflicts_with = "no_timeout")]
        wait: Option<u64>,

        /// Wait for completion without a cycle budget.
        #[arg(long)]
        no_timeout: bool,

        /// PPU instance to run on (default: 0, or the configuration file).
        #[arg(long)]
        ppu_id: Option<u8>,

        /// Do not read back and print the mailbox.
        #[arg(long)]
        no_mailbox: bool,

        /// JSON configuration file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Cycles the simulated program runs before going to sleep.
        #[arg(long, default_value_t = 0)]
        halt_after: u64,

        /// Exit code the simulated program leaves behind.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        exit_code: i32,

        /// Mailbox text the simulated program leaves behind.
        #[arg(long)]
        mailbox: Option<String>,
    },

    /// Print the program size and symbol table of an executable.
    Symbols {
        /// PPU executable (ELF, unstripped).
        program: PathBuf,
    },
}

/// Overrides applied on top of the configuration file.
struct RunArgs {
    wait: Option<u64>,
    no_timeout: bool,
    ppu_id: Option<u8>,
    no_mailbox: bool,
    config: Option<PathBuf>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            program,
            wait,
            no_timeout,
            ppu_id,
            no_mailbox,
            config,
            halt_after,
            exit_code,
            mailbox,
        } => {
            let mut firmware = HaltAfter::new(halt_after).with_exit_code(exit_code);
            if let Some(text) = mailbox {
                firmware = firmware.with_mailbox(text);
            }
            let args = RunArgs {
                wait,
                no_timeout,
                ppu_id,
                no_mailbox,
                config,
            };
            cmd_run(&program, &args, firmware)
        }
        Commands::Symbols { program } => cmd_symbols(&program),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        let mut source = e.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the configuration from the optional file and the command-line overrides.
fn load_config(args: &RunArgs) -> Result<Config, Error> {
    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    if let Some(wait) = args.wait {
        config.run.timeout_cycles = (wait != 0).then_some(wait);
    }
    if args.no_timeout {
        config.run.timeout_cycles = None;
    }
    if let Some(ppu) = args.ppu_id {
        config.run.ppu = ppu;
    }
    if args.no_mailbox {
        config.run.print_mailbox = false;
    }
    Ok(config)
}

/// Runs `program` on the simulated target and prints its mailbox.
///
/// Exits the process with code 1 if the program reports a nonzero exit code.
fn cmd_run(program: &Path, args: &RunArgs, firmware: HaltAfter) -> Result<(), Error> {
    let controller = Controller::new(load_config(args)?)?;
    let ppu = controller.config().run.ppu_id()?;
    let mut target = SimulatedTarget::new().with_firmware(ppu, firmware);

    let result = controller.run_program(&mut target, program)?;
    if let Some(text) = result.mailbox.as_deref().filter(|text| !text.is_empty()) {
        println!("{text}");
    }
    info!(cycles = target.now(), exit_code = %result.exit_code, "run finished");

    if result.exit_code != ExitCode::SUCCESS {
        eprintln!("Error: PPU program exited with code {}", result.exit_code);
        process::exit(1);
    }
    Ok(())
}

/// Prints the program size and every symbol with its kind and word range.
fn cmd_symbols(program: &Path) -> Result<(), Error> {
    let elf = ElfImage::open(program)?;
    let image = elf.read_program()?;
    let symbols = elf.read_symbols()?;

    println!("Program: {} words", image.size());
    println!("{:<32} {:<8} Range", "Symbol", "Type");
    for (name, symbol) in &symbols {
        println!("{name:<32} {:<8} {}", symbol.kind.to_string(), symbol.range);
    }
    Ok(())
}
