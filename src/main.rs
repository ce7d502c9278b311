use anyhow::Result;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bank_management::{AccountRegistry, BankConfig, Shell, VERSION};

/// Console bank: authority desk and ATM
#[derive(Parser, Debug)]
#[command(name = "bank-management", version)]
struct Cli {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for account numbers (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Print account details as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => BankConfig::from_file(path)?,
        None => BankConfig::default(),
    };
    if cli.seed.is_some() {
        config.rng_seed = cli.seed;
    }
    if cli.json {
        config.json_display = true;
    }

    // Logs go to stderr so they never interleave with the menus on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(io::stderr)
        .init();

    info!(version = VERSION, seeded = config.rng_seed.is_some(), "Starting bank-management");

    let registry = match config.rng_seed {
        Some(seed) => AccountRegistry::with_seed(seed),
        None => AccountRegistry::new(),
    };

    let stdin = io::stdin();
    let mut shell = Shell::new(registry, config, stdin.lock(), io::stdout());
    shell.run()?;

    info!(accounts = shell.registry().len(), "Session ended, all accounts discarded");
    Ok(())
}
