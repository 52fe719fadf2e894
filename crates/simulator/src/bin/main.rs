//! Multisig Simulator CLI
//!
//! Runs seeded registry workloads and the scripted scenarios.

use clap::{Parser, Subcommand};
use multisig_simulator::{Scenario, Simulator, SimulatorConfig, WorkloadConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "multisig-sim")]
#[command(about = "Workload simulator for the quorum registry and batch relay")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a seeded random workload and check invariants
    Run {
        /// TOML configuration file; flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Number of operations
        #[arg(long)]
        steps: Option<u64>,

        /// Number of owners, not counting the relay
        #[arg(long)]
        owners: Option<usize>,

        /// Confirmations required to execute
        #[arg(long)]
        threshold: Option<usize>,

        /// Number of accounts outside the owner set
        #[arg(long)]
        outsiders: Option<usize>,

        /// Genesis balance of every owner and outsider
        #[arg(long)]
        initial_balance: Option<u64>,

        /// Leave the relay out of the owner set
        #[arg(long)]
        relay_not_owner: bool,

        /// Only direct registry calls, no relay or outsider traffic
        #[arg(long)]
        direct_only: bool,
    },

    /// Run a scripted scenario (a, b, c, d or all)
    Scenario {
        #[arg(default_value = "all")]
        name: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Run {
            config,
            seed,
            steps,
            owners,
            threshold,
            outsiders,
            initial_balance,
            relay_not_owner,
            direct_only,
        } => {
            let mut config = match config {
                Some(path) => SimulatorConfig::load(&path)?,
                None => SimulatorConfig::default(),
            };
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            if let Some(steps) = steps {
                config = config.with_steps(steps);
            }
            if let Some(owners) = owners {
                config.owners = owners;
            }
            if let Some(threshold) = threshold {
                config.threshold = threshold;
            }
            if let Some(outsiders) = outsiders {
                config = config.with_outsiders(outsiders);
            }
            if let Some(balance) = initial_balance {
                config = config.with_initial_balance(balance);
            }
            if relay_not_owner {
                config = config.with_relay_is_owner(false);
            }
            if direct_only {
                config = config.with_workload(WorkloadConfig::direct_only());
            }

            let report = Simulator::new(config)?.run()?;
            report.print();
            if !report.is_clean() {
                return Err(format!("{} invariant violations", report.violations.len()).into());
            }
        }

        Commands::Scenario { name } => {
            let scenarios = if name.eq_ignore_ascii_case("all") {
                Scenario::ALL.to_vec()
            } else {
                vec![name.parse::<Scenario>()?]
            };
            for scenario in scenarios {
                scenario.run()?;
                println!("scenario {}: {} ... ok", scenario, scenario.description());
            }
        }
    }

    Ok(())
}
