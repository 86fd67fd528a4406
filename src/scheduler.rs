//! Keep-alive scheduling.
//!
//! Three independent loops run side by side until the shared
//! [`CancellationToken`] fires:
//!
//! - **Ping**: posts `{"connected": true}` roughly every 90 seconds (±5s of
//!   jitter) and reports earnings after every successful ping
//! - **Heartbeat**: wakes every 3 seconds, no external effect
//! - **Browser state**: wakes every 30 seconds, no external effect
//!
//! A failed ping cycle is logged and the loop moves on to its next sleep. The
//! loops never wait on each other and share nothing but read-only state.

use std::sync::Arc;
use std::time::Duration;

use log::Level;
use rand::Rng;
use tokio::time;
use tokio_util::sync::CancellationToken;
use wreq::StatusCode;

use crate::client::{ConnectPayload, DepinedClient};
use crate::config::Settings;
use crate::earnings::EarningsReporter;
use crate::error::{AgentError, Result};
use crate::utils;

/// Runs the ping, heartbeat and browser-state loops.
pub struct Scheduler {
    client: Arc<DepinedClient>,
    reporter: EarningsReporter,
    settings: Settings,
}

impl Scheduler {
    pub fn new(client: Arc<DepinedClient>, reporter: EarningsReporter, settings: Settings) -> Self {
        Self {
            client,
            reporter,
            settings,
        }
    }

    /// Runs all three loops until `cancel` fires.
    ///
    /// Returns the number of ping cycles that were executed.
    pub async fn run(&self, cancel: CancellationToken) -> u64 {
        let (cycles, (), ()) = tokio::join!(
            self.run_ping_loop(cancel.clone()),
            self.run_heartbeat(cancel.clone()),
            self.run_browser_state(cancel),
        );
        cycles
    }

    /// Executes one ping cycle.
    ///
    /// # Returns
    ///
    /// `Ok` only when the API answered 200 with a JSON body. In that case the
    /// earnings reporter has run exactly once and its formatted figure (if
    /// any) is returned.
    ///
    /// # Errors
    ///
    /// - [`AgentError::Transport`] if the request could not be made
    /// - [`AgentError::UnexpectedStatus`] for any status other than 200
    /// - [`AgentError::MalformedResponse`] if a 200 body is not JSON
    pub async fn ping_once(&self) -> Result<Option<String>> {
        let payload = ConnectPayload::CONNECTED;
        log::info!(
            "Sending request payload: {}",
            serde_json::to_string(&payload).unwrap_or_default()
        );

        let response = self.client.widget_connect(&payload).await?;
        log::info!("Response Status: {}", response.status.as_u16());

        if response.status != StatusCode::OK {
            return Err(AgentError::UnexpectedStatus {
                status: response.status,
                body: response.text,
            });
        }

        response.json()?;
        log::info!("Ping successful!");
        Ok(self.reporter.report().await)
    }

    /// Pings, sleeps a jittered interval, and repeats until `cancel` fires.
    ///
    /// An in-flight ping is abandoned on cancellation. Returns the number of
    /// completed ping cycles.
    pub async fn run_ping_loop(&self, cancel: CancellationToken) -> u64 {
        let mut cycles = 0u64;
        log::info!(
            "Ping loop started interval_s={} jitter_s={}",
            self.settings.ping_interval.as_secs_f64(),
            self.settings.ping_jitter.as_secs_f64()
        );

        while !cancel.is_cancelled() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = self.ping_once() => {
                    cycles += 1;
                    if let Err(e) = result {
                        let (level, message) = failure_log(&e);
                        log::log!(level, "{}", message);
                    }
                }
            }

            let delay = jittered_interval(
                self.settings.ping_interval,
                self.settings.ping_jitter,
                &mut rand::thread_rng(),
            );
            log::info!(
                "Next ping in {:.1}s at {}",
                delay.as_secs_f64(),
                utils::clock_after(delay)
            );

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = time::sleep(delay) => {}
            }
        }

        log::info!("Ping loop stopped cycles={}", cycles);
        cycles
    }

    /// Wakes every heartbeat interval; performs no external action.
    pub async fn run_heartbeat(&self, cancel: CancellationToken) {
        idle_loop("heartbeat", self.settings.heartbeat_interval, cancel).await;
    }

    /// Wakes every browser-check interval; performs no external action.
    pub async fn run_browser_state(&self, cancel: CancellationToken) {
        idle_loop("browser-state", self.settings.browser_check_interval, cancel).await;
    }
}

async fn idle_loop(name: &str, period: Duration, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = time::sleep(period) => log::trace!("Idle tick loop={}", name),
        }
    }
    log::debug!("Idle loop stopped loop={}", name);
}

/// Log level and line for a failed ping cycle.
pub fn failure_log(err: &AgentError) -> (Level, String) {
    match err {
        AgentError::UnexpectedStatus { status, body } => (
            Level::Warn,
            format!("API call failed with status: {}, Response: {}", status.as_u16(), body),
        ),
        AgentError::MalformedResponse { body, .. } => {
            (Level::Warn, format!("Failed to parse JSON response: {body}"))
        }
        other => (Level::Error, format!("Polling error: {other}")),
    }
}

/// `base` shifted by a uniform offset in `[-jitter, +jitter]`, never negative.
pub fn jittered_interval<R: Rng>(base: Duration, jitter: Duration, rng: &mut R) -> Duration {
    let spread = jitter.as_secs_f64();
    let offset = if spread > 0.0 {
        rng.gen_range(-spread..=spread)
    } else {
        0.0
    };
    Duration::from_secs_f64((base.as_secs_f64() + offset).max(0.0))
}
