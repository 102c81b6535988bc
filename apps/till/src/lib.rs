//! # Tally Till Library
//!
//! The till application: configuration, logging, the per-cashier
//! [`Session`] and the command layer a front end talks to.
//!
//! ## Module Organization
//! ```text
//! tally_till/
//! ├── lib.rs          ◄─── You are here (logging, database path)
//! ├── config.rs       ◄─── AppConfig (defaults + TALLY_* environment)
//! ├── session.rs      ◄─── Session (owned cart + checkout committer)
//! ├── commands.rs     ◄─── Commands and response DTOs
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! The terminal front end in `main.rs` is one client of [`commands`]; any
//! other presentation layer would call the same functions.

pub mod commands;
pub mod config;
pub mod error;
pub mod session;

use directories::ProjectDirs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub use config::AppConfig;
pub use error::{ApiError, ErrorCode};
pub use session::Session;

/// Default log filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,tally=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so they don't interleave with the till's own output.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tally_checkout=trace` - Trace a single crate
/// - Default: [`DEFAULT_LOG_FILTER`]
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines the database file path.
///
/// ## Resolution
/// 1. `config.db_path` (from `--db` or `TALLY_DB_PATH`)
/// 2. Platform data directory:
///    - **macOS**: `~/Library/Application Support/com.tally.pos/tally.db`
///    - **Windows**: `%APPDATA%\tally\pos\data\tally.db`
///    - **Linux**: `~/.local/share/pos/tally.db`
pub fn database_path(config: &AppConfig) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = &config.db_path {
        return Ok(path.clone());
    }

    let proj_dirs = ProjectDirs::from("com", "tally", "pos").ok_or("Could not determine app data directory")?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("tally.db"))
}
