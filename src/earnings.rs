//! Epoch earnings reporting.
//!
//! The reporter is a best-effort side task of a successful ping: it reads the
//! earnings endpoint, logs the figure and forgets it. Nothing it does can fail
//! the ping cycle that invoked it.

use std::sync::Arc;

use serde_json::Value;
use wreq::StatusCode;

use crate::client::DepinedClient;
use crate::error::{AgentError, Result};
use crate::utils;

/// Fetches and logs the current epoch earnings.
pub struct EarningsReporter {
    client: Arc<DepinedClient>,
}

impl EarningsReporter {
    pub fn new(client: Arc<DepinedClient>) -> Self {
        Self { client }
    }

    /// Fetches earnings and logs them.
    ///
    /// Never fails. Non-200 statuses are logged as warnings, transport and
    /// parse failures as errors.
    ///
    /// # Returns
    ///
    /// The formatted figure that was logged (e.g. `"2,500.50"`), or `None`
    /// if the fetch did not produce one.
    pub async fn report(&self) -> Option<String> {
        match self.fetch().await {
            Ok(earnings) => {
                let formatted = utils::format_earnings(earnings);
                log::info!("Earnings: ({})", formatted);
                Some(formatted)
            }
            Err(AgentError::UnexpectedStatus { status, .. }) => {
                log::warn!("Failed to fetch earnings. Status: {}", status.as_u16());
                None
            }
            Err(e) => {
                log::error!("Error fetching earnings: {}", e);
                None
            }
        }
    }

    async fn fetch(&self) -> Result<f64> {
        let response = self.client.epoch_earnings().await?;
        if response.status != StatusCode::OK {
            return Err(AgentError::UnexpectedStatus {
                status: response.status,
                body: response.text,
            });
        }
        extract_earnings(&response.json()?)
    }
}

/// Reads `data.earnings` from an earnings response body.
///
/// Only an absent `data` object or an absent `earnings` field counts as `0`.
///
/// # Errors
///
/// Returns [`AgentError::MalformedResponse`] when the body or `data` is not
/// an object, or when `earnings` is present but is not a number (including
/// `null`).
pub fn extract_earnings(body: &Value) -> Result<f64> {
    let malformed = |reason: String| AgentError::MalformedResponse {
        body: body.to_string(),
        reason,
    };

    let root = body
        .as_object()
        .ok_or_else(|| malformed("body is not an object".into()))?;
    let Some(data) = root.get("data") else {
        return Ok(0.0);
    };
    let data = data
        .as_object()
        .ok_or_else(|| malformed(format!("data is not an object: {data}")))?;
    match data.get("earnings") {
        None => Ok(0.0),
        Some(value) => value
            .as_f64()
            .ok_or_else(|| malformed(format!("earnings is not a number: {value}"))),
    }
}
