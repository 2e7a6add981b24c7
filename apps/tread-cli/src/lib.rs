//! # Tread CLI Library
//!
//! Everything behind the `tread` binary. `main.rs` only parses arguments,
//! loads configuration and maps errors to exit codes.
//!
//! ## Module Organization
//! ```text
//! tread_cli/
//! ├── lib.rs          ◄─── You are here (startup & routing)
//! ├── cli.rs          ◄─── clap argument definitions
//! ├── config.rs       ◄─── tread.toml + TREAD_* environment
//! ├── error.rs        ◄─── AppError and exit codes
//! └── commands/
//!     ├── mod.rs      ◄─── Context, dispatch, shared formatting
//!     └── ...         ◄─── One module per subcommand
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Parse arguments (clap)                                              │
//! │  2. Load config: defaults → tread.toml → TREAD_* env                    │
//! │  3. Initialize tracing (stderr; RUST_LOG wins over config)              │
//! │  4. quote? ── yes ──► compute and print, no database                    │
//! │        │                                                                │
//! │        no                                                               │
//! │        ▼                                                                │
//! │  5. Open database: --db, else config, else platform data dir            │
//! │     (migrations run on connect)                                         │
//! │  6. Dispatch to the command handler                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tread_db::{Database, DbConfig};

use cli::{Cli, Command};
use commands::Context;
use config::AppConfig;
use error::AppResult;

/// Runs one parsed command against `out`.
pub async fn run<W: Write>(cli: Cli, config: &AppConfig, out: &mut W) -> AppResult<()> {
    let command = match cli.command {
        Command::Quote(args) => return commands::quote::run(args, cli.json, out),
        command => command,
    };

    let db = open_database(cli.db, config).await?;
    let ctx = Context { db, json: cli.json };
    let result = commands::dispatch(command, &ctx, out).await;
    ctx.db.close().await;
    result
}

async fn open_database(flag: Option<PathBuf>, config: &AppConfig) -> AppResult<Database> {
    let path = match flag {
        Some(path) => path,
        None => config.database_path()?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    debug!(path = %path.display(), "Opening database");

    let db = Database::new(DbConfig::new(path.clone()).max_connections(config.database.max_connections)).await?;
    info!(path = %path.display(), "Database ready");
    Ok(db)
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Output goes to
/// stderr so `--json` output on stdout stays parseable.
pub fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
