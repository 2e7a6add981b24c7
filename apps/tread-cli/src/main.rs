//! # tread
//!
//! Inventory and promotional pricing for a tire & wheel shop.
//!
//! ```bash
//! tread quote --price 2900 --type buy_x_get_y --value1 3 --value2 1
//! tread tires list --search 205/55
//! tread stock out tire 12 4 --notes "Walk-in sale"
//! tread import tires ./stock.json
//! ```

use clap::Parser;
use std::io;
use std::process::ExitCode;

use tread_cli::cli::Cli;
use tread_cli::config::AppConfig;
use tread_cli::{init_tracing, run};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(e.exit_code());
        }
    };
    init_tracing(&config.logging.filter);

    let mut stdout = io::stdout().lock();
    match run(cli, &config, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
