//! Timesheet API client.
//!
//! The backend exposes a single remote-procedure endpoint; the client POSTs
//! the [`ClockPayload`] envelope and relays the response body verbatim to
//! the front end.

use std::time::Duration;

use timepunch_core::ClockPayload;
use tracing::{debug, info};

use crate::error::{ServerError, ServerResult};

/// HTTP client for the timesheet backend.
#[derive(Debug)]
pub struct TimesheetClient {
    http_client: reqwest::Client,
    api_url: String,
}

impl TimesheetClient {
    /// Creates a new client for the given API URL.
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            http_client,
            api_url: api_url.into(),
        }
    }

    /// Forwards a clock action and returns the backend's response body.
    pub async fn clock(&self, payload: &ClockPayload) -> ServerResult<String> {
        debug!(
            action = %payload.args.action,
            employee_id = %payload.args.employee_id,
            "forwarding clock action"
        );

        let response = self
            .http_client
            .post(&self.api_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServerError::Timesheet("request timeout".to_string())
                } else {
                    ServerError::Timesheet(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServerError::Timesheet(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ServerError::Timesheet(format!(
                "API error ({}): {}",
                status, body
            )));
        }

        info!(action = %payload.args.action, "clock action recorded");
        Ok(body)
    }
}
