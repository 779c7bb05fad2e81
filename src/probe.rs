use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::ProbeConfig;
use crate::http::HttpTransport;
use crate::verify::types::{ProbeOutcome, VerificationRequest};

/// Endpoint Prober
///
/// One POST per verification, bounded by a hard timeout. A failed or slow
/// probe is the measurement: nothing here retries, and nothing here returns
/// an error. Every failure mode comes back as a populated `ProbeOutcome`.
pub struct EndpointProber {
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
}

impl EndpointProber {
    pub fn new(transport: Arc<dyn HttpTransport>, config: &ProbeConfig) -> Self {
        Self {
            transport,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    pub async fn probe(&self, request: &VerificationRequest) -> ProbeOutcome {
        let url = request.endpoint_url();
        let payload = Value::Object(request.test_payload().clone());

        let start = Instant::now();
        // Dropping the future on expiry cancels the in-flight request
        let result = tokio::time::timeout(self.timeout, self.transport.post_json(url, &payload)).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(Ok(reply)) => ProbeOutcome::from_reply(latency_ms, reply),
            Ok(Err(e)) => ProbeOutcome::unreachable(latency_ms, format!("endpoint unreachable: {}", e)),
            Err(_) => ProbeOutcome::unreachable(
                latency_ms,
                format!("endpoint timed out after {}ms", self.timeout.as_millis()),
            ),
        };

        match &outcome.error {
            None => debug!("Probe {} → HTTP {} in {}ms", url, outcome.status_code, latency_ms),
            Some(e) => info!("Probe {} failed after {}ms: {}", url, latency_ms, e),
        }
        outcome
    }
}
