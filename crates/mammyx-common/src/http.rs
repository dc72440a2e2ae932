//! Rate-paced HTTP client.
//!
//! External evidence services (ClinicalTrials.gov, Open Targets) are queried
//! once per gene in a tight loop, so the client itself carries the pacing
//! policy: a minimum interval between consecutive sends. Callers never sleep;
//! they just send through this wrapper.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::trace;

use crate::error::MammyxError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimum spacing between consecutive requests through one client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacingPolicy {
    pub min_interval: Duration,
}

impl PacingPolicy {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval }
    }

    /// No pacing at all (tests, local endpoints).
    pub fn none() -> Self {
        Self { min_interval: Duration::ZERO }
    }
}

/// A `reqwest::Client` that enforces a minimum inter-call interval.
///
/// Pacing is applied at send time, so request construction stays the plain
/// builder pattern. The interval is measured between the starts of
/// consecutive sends; results are never reordered because all callers are
/// sequential.
#[derive(Debug, Clone)]
pub struct PacedClient {
    client: Client,
    policy: PacingPolicy,
    last_send: Arc<Mutex<Option<Instant>>>,
}

impl PacedClient {
    pub fn new(policy: PacingPolicy) -> Result<Self, MammyxError> {
        let client = ClientBuilder::new()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            policy,
            last_send: Arc::new(Mutex::new(None)),
        })
    }

    pub fn policy(&self) -> PacingPolicy {
        self.policy
    }

    pub fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.post(url)
    }

    /// Send a built request, first waiting out the remainder of the pacing
    /// interval since the previous send through this client.
    pub async fn send(&self, request: reqwest::RequestBuilder) -> reqwest::Result<reqwest::Response> {
        self.pace().await;
        request.send().await
    }

    /// Wait until at least `min_interval` has passed since the last call.
    /// Public so tests can exercise the policy without a network.
    pub async fn pace(&self) {
        let mut last = self.last_send.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.policy.min_interval {
                let wait = self.policy.min_interval - elapsed;
                trace!(wait_ms = wait.as_millis() as u64, "pacing before next request");
                sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }
}
