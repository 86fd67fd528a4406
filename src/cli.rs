//! Command-line interface definitions.
//!
//! The only choice offered to the operator is where the bearer token comes
//! from. Endpoints, intervals and the token file name are fixed.

use clap::{Parser, ValueEnum};

/// Main CLI structure for the Depined keep-alive agent.
#[derive(Parser, Debug)]
#[command(
    name = "depined-ping",
    version,
    about = "Keeps a Depined widget session connected and logs epoch earnings"
)]
pub struct Cli {
    /// Where to read the bearer token from
    #[arg(long, value_enum, default_value_t = TokenSource::Prompt)]
    pub source: TokenSource,
}

/// Available credential sources.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TokenSource {
    /// Ask for the token on the terminal
    Prompt,
    /// Read the token from `token.txt` in the working directory
    File,
}
