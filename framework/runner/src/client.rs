use std::time::Duration;

use anyhow::Context;
use gust_core::prelude::Outcome;
use rand::Rng;
use url::Url;

use crate::action::{Action, ActionKind, Method};

/// Default cap on how long any single request may take before it counts as failed.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Issues the requests described by actions and classifies the results.
///
/// This is the only place where transport errors exist. They are converted into [Outcome]
/// values here and never escape to a virtual user's loop, so an individual bad response or
/// dropped connection cannot stop a user or the run.
#[derive(Debug, Clone)]
pub struct ActionClient {
    base: Url,
    client: reqwest::Client,
}

impl ActionClient {
    pub fn new(target: &str) -> anyhow::Result<Self> {
        let base = Url::parse(target)
            .with_context(|| format!("Invalid target URL: {}", target))?;
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { base, client })
    }

    pub fn target(&self) -> &Url {
        &self.base
    }

    /// Execute one action against the target and classify the result.
    ///
    /// A latency-injection action pauses before its request goes out. A packet-drop action uses
    /// its own near-zero timeout and maps the resulting transport error to an expected failure,
    /// so running it is never observable as an error by the caller.
    pub async fn execute(&self, action: &Action) -> Outcome {
        if let ActionKind::InjectLatency { min, max } = action.kind() {
            tokio::time::sleep(draw_pause(*min, *max)).await;
        }

        let url = match self.base.join(action.path()) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Cannot resolve path {} for {}: {}", action.path(), action.name(), e);
                return Outcome::UnexpectedFailure;
            }
        };

        let method = match action.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut request = self.client.request(method, url);
        if !action.query().is_empty() {
            request = request.query(action.query());
        }
        if let Some(body) = action.body() {
            request = request.json(body);
        }
        if let ActionKind::InjectFailure { timeout } = action.kind() {
            request = request.timeout(*timeout);
        }

        match request.send().await {
            Ok(response) => action.classify_status(response.status().as_u16()),
            Err(e) if matches!(action.kind(), ActionKind::InjectFailure { .. }) => {
                // The whole point of this action is to force a timeout or dropped connection.
                log::trace!("{} dropped as intended: {}", action.name(), e);
                Outcome::ExpectedFailure
            }
            Err(e) => {
                log::debug!("{} failed: {}", action.name(), e);
                Outcome::UnexpectedFailure
            }
        }
    }
}

fn draw_pause(min: Duration, max: Duration) -> Duration {
    let min_s = min.as_secs_f64();
    let max_s = max.as_secs_f64();
    if min_s >= max_s {
        return min;
    }

    let drawn = rand::thread_rng().gen_range(min_s..=max_s);
    Duration::from_secs_f64(drawn)
}
