//! # PreservaLife monitor simulator
//!
//! ```bash
//! # Random command traces with invariant checking
//! preservalife simulate --max-steps 50 --max-samples 1000 --seed 42
//!
//! # Generate samples from a layout sheet and export the history
//! preservalife demo --layout layout.csv --samples 25 --output "Oxygen Metrics.csv"
//!
//! # Validate a layout sheet
//! preservalife check-layout layout.csv
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use preservalife_sim::config::Config;
use preservalife_sim::invariants;
use preservalife_sim::layout::LayoutTable;
use preservalife_sim::sampler::RandomSampler;
use preservalife_sim::session::{self, Session};
use preservalife_sim::simulator;
use preservalife_sim::spreadsheet;
use preservalife_sim::types::QualityTier;

/// PreservaLife renal-perfusion monitor simulator
#[derive(Parser)]
#[command(name = "preservalife")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run random command traces and check session invariants
    Simulate {
        /// Commands per trace
        #[arg(long)]
        max_steps: Option<usize>,

        /// Number of traces
        #[arg(long)]
        max_samples: Option<usize>,

        /// Random seed (defaults to wall-clock nanoseconds)
        #[arg(long)]
        seed: Option<u64>,

        /// Print every step of the first trace
        #[arg(long)]
        trace: bool,
    },

    /// Generate samples, print the readout and export the history
    Demo {
        /// Layout sheet (7×6, no header); the built-in grid when omitted
        #[arg(short, long, value_name = "FILE")]
        layout: Option<PathBuf>,

        /// Number of samples to generate
        #[arg(short = 'n', long, default_value = "5")]
        samples: usize,

        /// Quality tier to sample from (high, medium, low)
        #[arg(short, long)]
        tier: Option<QualityTier>,

        /// Random seed (defaults to entropy)
        #[arg(long)]
        seed: Option<u64>,

        /// Export file path
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Import a layout sheet and print all 42 labelled bounds
    CheckLayout {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Simulate {
            max_steps,
            max_samples,
            seed,
            trace,
        } => run_simulate(&config, max_steps, max_samples, seed, trace),
        Commands::Demo {
            layout,
            samples,
            tier,
            seed,
            output,
        } => run_demo(&config, layout, samples, tier, seed, output),
        Commands::CheckLayout { file } => run_check_layout(file),
    }
}

fn run_simulate(
    config: &Config,
    max_steps: Option<usize>,
    max_samples: Option<usize>,
    seed: Option<u64>,
    trace: bool,
) -> Result<()> {
    let max_steps = max_steps.or(config.simulation.max_steps).unwrap_or(20);
    let max_samples = max_samples.or(config.simulation.max_samples).unwrap_or(10000);
    let seed = match seed.or(config.simulation.seed) {
        Some(seed) => seed,
        None => std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .context("system clock before UNIX epoch")?
            .as_nanos() as u64,
    };

    println!("PreservaLife Monitor Simulator");
    println!("==============================");
    println!(
        "Running {} traces of {} steps each (seed: {})",
        max_samples, max_steps, seed
    );
    if trace {
        println!("Trace mode: showing first trace\n");
    }

    println!("Checking invariants:");
    for (name, _) in invariants::ALL_INVARIANTS {
        println!("  - {}", name);
    }

    let result = simulator::run_simulation(max_steps, max_samples, seed, trace);
    println!("{}", result);

    if result.violation.is_some() {
        anyhow::bail!("invariant violation found");
    }
    Ok(())
}

fn run_demo(
    config: &Config,
    layout: Option<PathBuf>,
    samples: usize,
    tier: Option<QualityTier>,
    seed: Option<u64>,
    output: Option<PathBuf>,
) -> Result<()> {
    let table = match layout.or_else(|| config.session.layout.clone()) {
        Some(path) => spreadsheet::read_layout_file(&path)
            .with_context(|| format!("Failed to import layout: {}", path.display()))?,
        None => {
            info!("no layout file given, using built-in demo layout");
            LayoutTable::demo()
        }
    };

    let mut state = Session {
        setpoints: config.session.setpoints(),
        tier: tier.or(config.session.tier).unwrap_or_default(),
        ..Session::with_layout(table)
    };

    let mut sampler = match seed {
        Some(seed) => RandomSampler::seeded(seed),
        None => RandomSampler::from_entropy(),
    };

    for _ in 0..samples {
        let now = chrono::Local::now().time();
        state = session::on_generate(&state, &mut sampler, now)?.session;
    }

    println!("PreservaLife Kidney Monitoring");
    println!("==============================");
    println!("{}", state.readout());
    println!();
    for record in state.history.iter() {
        println!("  {}", record);
    }

    let path = output.unwrap_or_else(|| PathBuf::from(spreadsheet::export_file_name()));
    let bytes = spreadsheet::export_history(&state.history.snapshot())?;
    spreadsheet::write_file_atomic(&path, &bytes)
        .with_context(|| format!("Failed to export history: {}", path.display()))?;
    println!("\nExported {} rows to {}", state.history.len(), path.display());
    Ok(())
}

fn run_check_layout(file: PathBuf) -> Result<()> {
    let table = spreadsheet::read_layout_file(&file)
        .with_context(|| format!("Failed to import layout: {}", file.display()))?;

    println!("{}: layout OK ({} labels)", file.display(), table.len());
    for (label, value) in table.entries()? {
        println!("  {:<36} {}", label, value);
    }
    Ok(())
}
