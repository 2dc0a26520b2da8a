use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use secure_ledger::cli::run_menu;
use secure_ledger::config::paths::{
    LedgerPaths, DATA_FILE_ENV, DEFAULT_DATA_FILE, DEFAULT_KEY_FILE, KEY_FILE_ENV,
};
use secure_ledger::services::{Ledger, LoadStatus};

#[derive(Parser)]
#[command(
    name = "ledger",
    version,
    about = "Single-user bank ledger with encrypted account records",
    long_about = "Keeps bank accounts in a JSON file where holder names, balances \
                  and transaction history are stored only as encrypted tokens. \
                  Runs an interactive menu for creating accounts, deposits, \
                  withdrawals, transfers and receipts."
)]
struct Cli {
    /// Path to the raw symmetric key (created on first run)
    #[arg(long, env = KEY_FILE_ENV, default_value = DEFAULT_KEY_FILE)]
    key_file: PathBuf,

    /// Path to the encrypted JSON data file
    #[arg(long, env = DATA_FILE_ENV, default_value = DEFAULT_DATA_FILE)]
    data_file: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let paths = LedgerPaths::new(cli.key_file, cli.data_file);
    paths.ensure_parent_dirs()?;

    let mut ledger = Ledger::new(paths).context("failed to initialise the ledger")?;
    match ledger.load().context("failed to load the data file")? {
        LoadStatus::Corrupt => {
            println!("Error: Could not decode JSON data. The file might be corrupted.");
        }
        LoadStatus::Loaded { .. } | LoadStatus::Missing => {}
    }

    let stdin = io::stdin();
    run_menu(&mut ledger, stdin.lock(), io::stdout())?;

    Ok(())
}

fn init_tracing() {
    // Warnings only by default so log lines don't interleave with the menu
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
