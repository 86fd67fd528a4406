//! Wiring of the agent.
//!
//! Obtains the credential, builds the HTTP client, and runs the scheduler
//! until Ctrl-C. The credential is resolved before anything touches the
//! network, so a missing token ends the process without a single request.
//!
//! The Ctrl-C handler is only installed after the token has been read. While
//! the prompt is waiting, SIGINT keeps its default action and terminates the
//! process.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::cli::{Cli, TokenSource};
use crate::client::DepinedClient;
use crate::config::{DEFAULT_TOKEN_FILE, Settings};
use crate::credential::{CredentialSource, FileSource, PromptSource};
use crate::earnings::EarningsReporter;
use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::utils;

/// Executes the agent as configured by the parsed CLI arguments.
///
/// Returns once Ctrl-C has been received and all loops have stopped.
///
/// # Errors
///
/// Returns an error if:
/// - No token could be obtained
/// - The token cannot be used as a header value
/// - The HTTP client cannot be built
pub async fn run(cli: Cli) -> Result<()> {
    let scheduler = {
        let source: Box<dyn CredentialSource> = match cli.source {
            TokenSource::Prompt => Box::new(PromptSource::stdio()),
            TokenSource::File => Box::new(FileSource::new(DEFAULT_TOKEN_FILE)),
        };
        connect(source.as_ref(), Settings::default())?
    };

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Received Ctrl-C, shutting down");
            shutdown.cancel();
        }
    });

    start(&scheduler, cancel).await;
    Ok(())
}

/// Obtains the credential from `source` and builds a ready-to-run scheduler.
///
/// Performs no network activity.
pub fn connect(source: &dyn CredentialSource, settings: Settings) -> Result<Scheduler> {
    let token = source.obtain()?;
    let client = Arc::new(DepinedClient::new(&token, settings.clone())?);

    log::info!(
        "Depined keep-alive agent started at={} user_agent={}",
        utils::now_timestamp(),
        client.user_agent()
    );

    let reporter = EarningsReporter::new(client.clone());
    Ok(Scheduler::new(client, reporter, settings))
}

/// Runs the scheduler until `cancel` fires and returns the ping cycle count.
pub async fn start(scheduler: &Scheduler, cancel: CancellationToken) -> u64 {
    let cycles = scheduler.run(cancel).await;
    log::info!("Agent stopped after {} ping cycles", cycles);
    cycles
}
