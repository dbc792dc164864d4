use std::time::Duration;

use gust_core::prelude::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// How an action behaves beyond its plain request template.
///
/// Chaos actions deliberately degrade the simulated user's connection rather than exercise a
/// new endpoint.
#[derive(Debug, Clone)]
pub(crate) enum ActionKind {
    Standard,
    /// Pause for a random duration drawn from `[min, max]` before issuing the request, to model
    /// a user on a high-latency connection. The pause is wider than the standard think time and
    /// suspends only the user running the action.
    InjectLatency { min: Duration, max: Duration },
    /// Issue the request with a deliberately near-zero timeout to model a packet drop. The
    /// resulting timeout or connection error is an expected, swallowed condition.
    InjectFailure { timeout: Duration },
}

/// A declarative description of one thing a virtual user can do.
///
/// An action is a request template plus a relative selection weight and a success predicate.
/// Keeping actions declarative means the weighted-selection algorithm and the network execution
/// step stay decoupled, so selection can be tested with a fake action list.
#[derive(Debug, Clone)]
pub struct Action {
    name: String,
    weight: u32,
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    /// Explicit success set. When absent, any 2xx status is a success.
    expected_statuses: Option<Vec<u16>>,
    kind: ActionKind,
}

impl Action {
    pub fn get(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, Method::Get, path)
    }

    pub fn post(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, Method::Post, path)
    }

    fn new(name: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight: 1,
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            expected_statuses: None,
            kind: ActionKind::Standard,
        }
    }

    /// Set the relative selection weight for this action. The probability of an action being
    /// selected is its weight over the sum of all weights in the profile.
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_query(mut self, pairs: &[(&str, &str)]) -> Self {
        self.query = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    pub fn with_json_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Declare the exact set of response statuses that count as success for this action,
    /// replacing the default "any 2xx" predicate. Anything outside the set is an unexpected
    /// failure.
    pub fn expect_statuses(mut self, statuses: &[u16]) -> Self {
        self.expected_statuses = Some(statuses.to_vec());
        self
    }

    /// Turn this action into a latency-injection chaos action, pausing for a random duration in
    /// `[min, max]` before the request is issued.
    pub fn with_injected_latency(mut self, min: Duration, max: Duration) -> Self {
        self.kind = ActionKind::InjectLatency { min, max };
        self
    }

    /// Turn this action into a packet-drop chaos action. The request is issued with the given
    /// timeout and the resulting failure is recorded as expected, never surfaced as an error.
    pub fn with_drop_timeout(mut self, timeout: Duration) -> Self {
        self.kind = ActionKind::InjectFailure { timeout };
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub(crate) fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub(crate) fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// Classify a response status against this action's success predicate.
    pub fn classify_status(&self, status: u16) -> Outcome {
        match &self.expected_statuses {
            Some(expected) if expected.contains(&status) => Outcome::Success,
            Some(_) => Outcome::UnexpectedFailure,
            None if (200..300).contains(&status) => Outcome::Success,
            None => Outcome::UnexpectedFailure,
        }
    }
}
