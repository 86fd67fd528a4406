//! Depined keep-alive agent
//!
//! Keeps a Depined widget session marked as connected and logs the account's
//! epoch earnings after every successful ping.
//!
//! # Features
//!
//! - **Ping loop**: posts `{"connected": true}` every 90s ± 5s
//! - **Earnings**: fetches and logs `data.earnings` after each successful ping
//! - **Token sources**: interactive prompt (default) or a `token.txt` file
//!
//! # Usage
//!
//! ```bash
//! # Paste the token when asked
//! depined-ping
//!
//! # Read it from ./token.txt instead
//! depined-ping --source file
//!
//! # More detail
//! RUST_LOG=debug depined-ping --source file --token-file ~/depined/token.txt
//! ```

mod cli;
mod client;
mod commands;
mod config;
mod credential;
mod earnings;
mod error;
mod scheduler;
mod utils;

use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() {
    pretty_env_logger::formatted_timed_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();
    log::info!("Application started version={}", env!("CARGO_PKG_VERSION"));
    let cli = Cli::parse();

    if let Err(e) = commands::run(cli).await {
        log::error!("Application error: {}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
