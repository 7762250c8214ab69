#![deny(unused_crate_dependencies)]

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use shoc_w3_core::{
    run_reproducibility_suite,
    scenario::{check_convective_properties, W3_BOUND},
    BaselineAction, ConvectiveProfile, HarnessConfig,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// SHOC third-moment harness
#[derive(Parser, Debug)]
#[command(name = "w3-harness")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Property and reproducibility checks for the SHOC w3 kernel", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check physical invariants on the convective boundary-layer profile
    Property {
        /// Number of columns (thl_sec scaled by column + 1)
        #[arg(short, long, default_value_t = 2)]
        columns: usize,
    },
    /// Generate or compare a bit-for-bit reference trace
    Bfb {
        /// YAML config file (CLI flags override it)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// What to do with the reference trace
        #[arg(short = 'a', long, value_enum)]
        baseline_action: Option<ActionArg>,

        /// Reference trace path
        #[arg(short = 'f', long)]
        baseline_file: Option<PathBuf>,

        /// Seed for the input generator
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ActionArg {
    None,
    Compare,
    Generate,
}

impl From<ActionArg> for BaselineAction {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::None => BaselineAction::None,
            ActionArg::Compare => BaselineAction::Compare,
            ActionArg::Generate => BaselineAction::Generate,
        }
    }
}

fn run_property(columns: usize) -> anyhow::Result<()> {
    let (general, reduced) = ConvectiveProfile::default()
        .compute_both(columns)
        .context("building convective profile")?;

    println!(
        "=== Convective Profile: {} columns, {} levels ===\n",
        columns,
        general.num_levels()
    );
    print!("{:>9}", "interface");
    for c in 0..columns {
        print!("{:>14}", format!("col {}", c + 1));
    }
    println!();
    for k in 0..general.num_interfaces() {
        print!("{:>9}", k);
        for c in 0..columns {
            print!("{:>14.6e}", general.w3.get(k, c));
        }
        println!();
    }
    println!();

    let violations = check_convective_properties(&general, &reduced);
    info!(columns, violations = violations.len(), "Property check finished");
    if violations.is_empty() {
        println!("✓ boundaries zero in both closure modes");
        println!("✓ |w3| < {} at interior interfaces", W3_BOUND);
        println!("✓ positive skewness in every column");
        println!("✓ |w3| grows with column index");
        println!("✓ reduced-tke closure yields w3 = 0");
        return Ok(());
    }

    for violation in &violations {
        warn!(%violation, "Property violated");
        println!("✗ {violation}");
    }
    bail!("{} property violation(s)", violations.len())
}

fn run_bfb(
    config: Option<PathBuf>,
    baseline_action: Option<ActionArg>,
    baseline_file: Option<PathBuf>,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let mut config = match config {
        Some(path) => HarnessConfig::load(&path)?,
        None => HarnessConfig::default(),
    };
    if let Some(action) = baseline_action {
        config.baseline.action = action.into();
    }
    if let Some(path) = baseline_file {
        config.baseline.path = path;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }
    info!(
        action = %config.baseline.action,
        path = %config.baseline.path.display(),
        seed = config.seed,
        "Starting reproducibility run"
    );

    let report = run_reproducibility_suite(&config).with_context(|| {
        format!(
            "baseline {} against {}",
            config.baseline.action,
            config.baseline.path.display()
        )
    })?;

    info!(cases = report.cases, values = report.values, "Reproducibility run finished");
    println!(
        "{}: {} cases, {} w3 values (seed {}, closure {})",
        report.action, report.cases, report.values, config.seed, config.closure
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Property { columns } => run_property(columns),
        Commands::Bfb {
            config,
            baseline_action,
            baseline_file,
            seed,
        } => run_bfb(config, baseline_action, baseline_file, seed),
    }
}
