//! Rate-limited, retrying LegiScan HTTP client.
//!
//! One global minimum-interval throttle (a single moving timestamp) covers
//! every call in the process; the remote API enforces its rate ceiling
//! irrespective of which worksheet triggered the call.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::Value;

use billtrack_core::Config;

use crate::error::ClientError;
use crate::stats::ClientStats;

const RETRY_BUDGET: u32 = 5;
const BACKOFF_BASE: Duration = Duration::from_millis(500);
const RETRYABLE_STATUS: [u16; 5] = [429, 500, 502, 503, 504];

pub struct LegiScanClient {
    agent: ureq::Agent,
    base: String,
    key: String,
    min_interval: Duration,
    retry_budget: u32,
    backoff_base: Duration,
    last_call: Mutex<Option<Instant>>,
    stats: Arc<ClientStats>,
}

impl LegiScanClient {
    pub fn new(
        key: impl Into<String>,
        min_interval: Duration,
        request_timeout: Duration,
        stats: Arc<ClientStats>,
    ) -> Self {
        LegiScanClient {
            agent: ureq::AgentBuilder::new().timeout(request_timeout).build(),
            base: "https://api.legiscan.com".to_string(),
            key: key.into(),
            min_interval,
            retry_budget: RETRY_BUDGET,
            backoff_base: BACKOFF_BASE,
            last_call: Mutex::new(None),
            stats,
        }
    }

    pub fn from_config(cfg: &Config, stats: Arc<ClientStats>) -> Self {
        Self::new(
            cfg.legiscan_key.clone(),
            cfg.upstream_min_interval,
            cfg.request_timeout,
            stats,
        )
    }

    #[cfg(test)]
    pub(crate) fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    #[cfg(test)]
    pub(crate) fn with_retry(mut self, budget: u32, backoff: Duration) -> Self {
        self.retry_budget = budget;
        self.backoff_base = backoff;
        self
    }

    pub fn stats(&self) -> Arc<ClientStats> {
        self.stats.clone()
    }

    pub(crate) fn op_url(&self, op: &str, params: &str) -> String {
        format!("{}/?key={}&op={}{}", self.base, self.key, op, params)
    }

    /// Fetch a LegiScan envelope.
    ///
    /// `Ok(None)` means "data unavailable this pass" (non-OK application
    /// status); callers must not treat it as an empty result set. Transport
    /// and protocol failures surface as errors after the retry budget.
    pub fn fetch(&self, url: &str) -> Result<Option<Value>, ClientError> {
        self.wait_for_slot();
        let result = self.call_with_retry(url);
        self.note_call();
        let response = result?;

        let body: Value = response.into_json().map_err(|e| ClientError::Protocol {
            url: url.to_string(),
            reason: format!("malformed JSON body: {e}"),
        })?;

        if let Some(status) = body.get("status").and_then(Value::as_str) {
            if status != "OK" {
                let message = body
                    .pointer("/alert/message")
                    .and_then(Value::as_str)
                    .unwrap_or("unspecified");
                tracing::error!("upstream status '{status}' for {url}: {message}");
                return Ok(None);
            }
        }
        Ok(Some(body))
    }

    /// Like [`fetch`](Self::fetch) but errors are logged and folded into
    /// `None`; this is the soft-fail surface the sync pass consumes.
    pub fn fetch_soft(&self, url: &str) -> Option<Value> {
        match self.fetch(url) {
            Ok(body) => body,
            Err(err) => {
                tracing::error!("upstream fetch failed: {err}");
                None
            }
        }
    }

    fn call_with_retry(&self, url: &str) -> Result<ureq::Response, ClientError> {
        let mut attempt = 0;
        loop {
            self.stats.record_upstream_call();
            // Retryable statuses and transport faults (DNS, refused
            // connections, timeouts) share one backoff budget.
            let reason = match self.agent.get(url).call() {
                Ok(response) => return Ok(response),
                Err(ureq::Error::Status(code, _)) if RETRYABLE_STATUS.contains(&code) => {
                    format!("HTTP {code}")
                }
                Err(ureq::Error::Status(code, _)) => {
                    return Err(ClientError::Protocol {
                        url: url.to_string(),
                        reason: format!("HTTP {code}"),
                    });
                }
                Err(err @ ureq::Error::Transport(_)) => err.to_string(),
            };
            attempt += 1;
            if attempt >= self.retry_budget {
                return Err(ClientError::Transport {
                    url: url.to_string(),
                    reason: format!("{reason} after {attempt} attempts"),
                });
            }
            let delay = self.backoff_base * 2u32.saturating_pow(attempt - 1);
            tracing::warn!("upstream failed ({reason}) for {url}; retrying in {delay:?}");
            std::thread::sleep(delay);
        }
    }

    fn wait_for_slot(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        let last = *self.last_call.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(last) = last {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                std::thread::sleep(self.min_interval - elapsed);
            }
        }
    }

    fn note_call(&self) {
        *self.last_call.lock().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(min_interval: Duration) -> LegiScanClient {
        LegiScanClient::new(
            "test-key",
            min_interval,
            Duration::from_secs(5),
            Arc::new(ClientStats::default()),
        )
    }

    #[test]
    fn op_url_embeds_key_and_params() {
        let c = client(Duration::ZERO);
        assert_eq!(
            c.op_url("getMasterList", "&id=123"),
            "https://api.legiscan.com/?key=test-key&op=getMasterList&id=123"
        );
    }

    #[test]
    fn throttle_spaces_consecutive_calls() {
        let c = client(Duration::from_millis(40));
        c.note_call();
        let before = Instant::now();
        c.wait_for_slot();
        assert!(before.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn disabled_throttle_does_not_sleep() {
        let c = client(Duration::ZERO);
        c.note_call();
        let before = Instant::now();
        c.wait_for_slot();
        assert!(before.elapsed() < Duration::from_millis(10));
    }

    fn dead_endpoint_client() -> LegiScanClient {
        // Reserved TEST-NET address; every connection attempt fails.
        LegiScanClient::new(
            "test-key",
            Duration::ZERO,
            Duration::from_millis(200),
            Arc::new(ClientStats::default()),
        )
        .with_base("http://192.0.2.1:9")
        .with_retry(2, Duration::from_millis(1))
    }

    #[test]
    fn transport_failure_surfaces_as_error() {
        let c = dead_endpoint_client();
        let url = c.op_url("getSessionList", "");
        match c.fetch(&url) {
            Err(ClientError::Transport { .. }) => {}
            other => panic!("expected transport error, got {other:?}"),
        }
        assert!(c.fetch_soft(&url).is_none());
    }

    #[test]
    fn transport_failures_are_retried_up_to_the_budget() {
        let c = dead_endpoint_client();
        let url = c.op_url("getSessionList", "");
        let err = c.fetch(&url).unwrap_err();
        assert!(err.to_string().contains("after 2 attempts"), "got {err}");
        assert_eq!(c.stats().snapshot().upstream_calls, 2);
    }
}
