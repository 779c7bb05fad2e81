use std::sync::Arc;

use tracing::{debug, info};

use crate::accuracy;
use crate::config::Config;
use crate::error::TrustResult;
use crate::http::{HttpTransport, ReqwestTransport};
use crate::probe::EndpointProber;
use crate::reference::{PublicPriceSource, ReferencePriceSource};
use crate::score::{latency_score, reliability_score};
use crate::trust;
use crate::verify::types::{ScoreBreakdown, VerificationRequest, VerificationResult};

/// Core verification engine - probe, score, compose.
///
/// Holds no per-verification state; share it behind an `Arc` and call
/// `verify` from as many tasks as needed.
pub struct TrustVerifier {
    pub config: Arc<Config>,
    prober: EndpointProber,
    reference: Arc<dyn ReferencePriceSource>,
}

impl TrustVerifier {
    /// Production wiring: reqwest transport shared by the prober and the
    /// public price source.
    pub fn new(config: Arc<Config>) -> TrustResult<Self> {
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(&config.probe.user_agent)?);
        let reference = Arc::new(PublicPriceSource::new(transport.clone(), &config.reference));
        Ok(Self::with_parts(config, transport, reference))
    }

    pub fn with_parts(
        config: Arc<Config>,
        transport: Arc<dyn HttpTransport>,
        reference: Arc<dyn ReferencePriceSource>,
    ) -> Self {
        let prober = EndpointProber::new(transport, &config.probe);
        Self {
            config,
            prober,
            reference,
        }
    }

    /// Verify one endpoint. Always yields a complete result; failures show up
    /// in the score, grade and badge.
    pub async fn verify(&self, request: &VerificationRequest) -> VerificationResult {
        info!("🔍 Verifying {}", request.endpoint_url());

        let probe = self.prober.probe(request).await;
        if probe.is_unreachable() {
            info!("❌ {} unreachable, verification failed", request.endpoint_url());
            return trust::failed(probe);
        }

        let latency = latency_score(probe.latency_ms);
        let reliability = reliability_score(probe.status_code, probe.succeeded);

        let accuracy = if self
            .config
            .wants_cross_validation(request.endpoint_type(), request.comparison_sources())
        {
            let check = accuracy::cross_validate(
                self.reference.as_ref(),
                probe.body.as_ref(),
                request.test_payload(),
                &self.config,
            )
            .await;
            debug!("Accuracy check for {}: {:?}", request.endpoint_url(), check);
            check.score(&self.config.accuracy)
        } else {
            self.config.accuracy.baseline
        };

        let result = trust::compose(ScoreBreakdown::new(accuracy, latency, reliability), probe);
        info!(
            "🏅 {} → {:.1} ({}, {}, {})",
            request.endpoint_url(),
            result.overall_score(),
            result.grade(),
            result.recommendation(),
            result.badge().title()
        );
        result
    }
}
