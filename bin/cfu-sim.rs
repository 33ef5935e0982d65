use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use simd8_cfu::simulator::config::config::{apply_cli_overrides, load_config, render_config, AppConfig, CliOverrides};
use simd8_cfu::simulator::host::{CfuBackend, SoftwareBackend};
use simd8_cfu::simulator::program::{parse_word, Program};
use simd8_cfu::simulator::selftest::run_selftest;
use simd8_cfu::simulator::sim::mode::Backend;
use simd8_cfu::simulator::utils::log::init_log;
use simd8_cfu::simulator::Simulator;
use simd8_cfu::{Funct, Mode, Simd8Cfu};
use std::path::PathBuf;

/// cfu-sim - SIMD8 weight-clustering CFU simulator
#[derive(Parser, Debug)]
#[command(name = "cfu-sim")]
#[command(version)]
#[command(about = "Cycle-level simulator of the SIMD8 weight-clustering CFU", long_about = None)]
struct Args {
  /// Configuration file (TOML)
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  /// Quiet mode (warnings and errors only)
  #[arg(short, long, global = true)]
  quiet: bool,

  /// Backend: hardware or software
  #[arg(short, long, value_name = "BACKEND", global = true)]
  backend: Option<String>,

  #[command(subcommand)]
  command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
  /// Run a host program
  Run {
    program: PathBuf,

    /// Enable step mode (interactive stepping)
    #[arg(short, long)]
    step: bool,

    /// Output trace file path (JSON lines, one record per cycle)
    #[arg(long, value_name = "FILE")]
    trace_file: Option<String>,

    /// Compare MAC reads against the software CFU
    #[arg(long)]
    check: bool,
  },
  /// Run the built-in CFU check
  Selftest,
  /// Execute one instruction on a fresh unit
  Exec {
    #[arg(value_parser = parse_word)]
    funct3: u32,
    #[arg(value_parser = parse_word)]
    funct7: u32,
    #[arg(value_parser = parse_word)]
    rs1: u32,
    #[arg(value_parser = parse_word)]
    rs2: u32,
  },
  /// Print the effective configuration
  Config,
}

fn load(args: &Args, cli: CliOverrides) -> anyhow::Result<AppConfig> {
  let mut config = load_config(args.config.as_deref())
    .with_context(|| format!("loading configuration {:?}", args.config))?;
  apply_cli_overrides(&mut config, &cli);
  Ok(config)
}

fn new_backend(backend: Backend) -> Box<dyn CfuBackend> {
  match backend {
    Backend::Hardware => Box::new(Simd8Cfu::default()),
    Backend::Software => Box::new(SoftwareBackend::new()),
  }
}

fn main() -> anyhow::Result<()> {
  let args = Args::parse();
  let base = CliOverrides {
    quiet: args.quiet,
    backend: args.backend.clone(),
    ..Default::default()
  };

  match &args.command {
    Cmd::Run {
      program,
      step,
      trace_file,
      check,
    } => {
      let config = load(
        &args,
        CliOverrides {
          step: *step,
          trace_file: trace_file.clone(),
          check: *check,
          ..base
        },
      )?;
      let sim_config = config.sim_config()?;
      init_log(sim_config.quiet);

      let src = std::fs::read_to_string(program).with_context(|| format!("reading {}", program.display()))?;
      let program = Program::parse(&src).with_context(|| format!("parsing {}", program.display()))?;

      let mut simulator = Simulator::new(sim_config)?;
      let report = simulator.run(&program)?;
      println!("{}", serde_json::to_string_pretty(&report)?);
      if !report.passed() {
        bail!("{} expect failures, {} mismatches", report.expect_failed, report.mismatches);
      }
    },
    Cmd::Selftest => {
      let config = load(&args, base)?;
      let sim_config = config.sim_config()?;
      init_log(sim_config.quiet);

      let report = run_selftest(new_backend(sim_config.backend));
      for round in &report.rounds {
        println!(
          "round {}: {} (expected {}, got {})",
          round.round,
          if round.ok() { "OK" } else { "FAIL" },
          round.expected,
          round.actual
        );
      }
      if !report.all_passed() {
        bail!("{} of {} rounds failed", report.failed(), report.rounds.len());
      }
    },
    Cmd::Exec {
      funct3,
      funct7,
      rs1,
      rs2,
    } => {
      let config = load(&args, base)?;
      let sim_config = config.sim_config()?;
      init_log(sim_config.quiet);

      let funct = u8::try_from(*funct3)
        .ok()
        .and_then(|f| Funct::try_from(f).ok())
        .with_context(|| format!("invalid unit selector {}", funct3))?;
      if *funct7 > 0x7F {
        bail!("funct7 {:#x} does not fit in 7 bits", funct7);
      }
      let mut backend = new_backend(sim_config.backend);
      let resp = backend.issue(funct, Mode::new(*funct7 as u8), *rs1, *rs2);
      println!("{:#010x} ({})", resp.output, resp.output as i32);
    },
    Cmd::Config => {
      let config = load(&args, base)?;
      print!("{}", render_config(&config)?);
    },
  }

  Ok(())
}
